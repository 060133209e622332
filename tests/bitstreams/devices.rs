// This file is part of fpgapr, a library to parse FPGA bitstream containers and drive partial reconfiguration.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// fpgapr is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// fpgapr is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

use crate::common::{MockFme, logger};
use fpgapr::devices::abi::{DriverVariant, PORT_REGION_FLAG_MMAP, PORT_REGION_FLAG_READ};
use fpgapr::devices::device::{FpgaDevice, FpgaPort, PortInfo, PortRegionInfo};
use fpgapr::devices::{DeviceKind, DeviceReport, fme_info, fpga_info, port_info, resolve_device};
use fpgapr::error::FpgaPrError;
use googletest::prelude::*;
use rstest::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

struct MockPort {
    calls: RefCell<Vec<String>>,
    path: PathBuf,
    num_regions: u32,
}

impl MockPort {
    fn new(num_regions: u32) -> Self {
        MockPort {
            calls: RefCell::new(Vec::new()),
            path: PathBuf::from("/dev/intel-fpga-port.0"),
            num_regions,
        }
    }
}

impl FpgaDevice for MockPort {
    fn path(&self) -> &Path {
        &self.path
    }

    fn driver(&self) -> DriverVariant {
        DriverVariant::IntelFpga
    }

    fn get_api_version(&self) -> Result<i32, FpgaPrError> {
        self.calls.borrow_mut().push("get_api_version".to_string());
        Ok(0)
    }

    fn check_extension(&self, extension: u32) -> Result<i32, FpgaPrError> {
        self.calls
            .borrow_mut()
            .push(format!("check_extension({extension})"));
        Ok(0)
    }

    fn close(&mut self) {}
}

impl FpgaPort for MockPort {
    fn port_reset(&self) -> Result<i32, FpgaPrError> {
        self.calls.borrow_mut().push("port_reset".to_string());
        Ok(0)
    }

    fn port_get_info(&self) -> Result<PortInfo, FpgaPrError> {
        self.calls.borrow_mut().push("port_get_info".to_string());
        Ok(PortInfo {
            flags: 0,
            num_regions: self.num_regions,
            num_umsgs: 8,
            capability: Some(1),
            num_uafu_irqs: Some(0),
        })
    }

    fn port_get_region_info(&self, index: u32) -> Result<PortRegionInfo, FpgaPrError> {
        self.calls
            .borrow_mut()
            .push(format!("port_get_region_info({index})"));
        if index >= self.num_regions {
            return Err(FpgaPrError::Argument(format!("no region {index}")));
        }
        Ok(PortRegionInfo {
            index,
            flags: PORT_REGION_FLAG_READ | PORT_REGION_FLAG_MMAP,
            size: 0x40000,
            offset: u64::from(index) << 32,
        })
    }
}

#[gtest]
fn port_report_walks_every_region() {
    let port = MockPort::new(2);
    let report = port_info(&port).unwrap();
    expect_that!(report.driver, eq("intel-fpga"));
    expect_that!(report.info.num_regions, eq(2));
    expect_that!(report.regions.len(), eq(2));
    expect_that!(report.regions[1].offset, eq(1u64 << 32));
    expect_that!(
        port.calls.borrow().as_slice(),
        elements_are![
            eq("get_api_version"),
            eq("check_extension(0)"),
            eq("port_reset"),
            eq("port_get_info"),
            eq("port_get_region_info(0)"),
            eq("port_get_region_info(1)")
        ]
    );
}

#[gtest]
fn fme_report() {
    let fme = MockFme::new(0);
    let report = fme_info(&fme).unwrap();
    expect_that!(report.driver, eq("dfl"));
    expect_that!(report.api_version, eq(0));
    expect_that!(
        &fme.calls(),
        elements_are![eq("get_api_version"), eq("check_extension(0)")]
    );
    let json = serde_json::to_value(DeviceReport::Fme(report)).unwrap();
    expect_that!(json["kind"].as_str(), some(eq("Fme")));
}

#[gtest]
#[rstest]
fn fme_report_keeps_unexpected_api_version(#[from(logger)] _logger: ()) {
    let fme = MockFme::new(0).with_api_version(3);
    let report = fme_info(&fme).unwrap();
    expect_that!(report.api_version, eq(3));
    expect_that!(report.extension, eq(0));
}

#[gtest]
#[rstest]
#[case::dfl_fme("/dev/dfl-fme.0", DeviceKind::Fme, DriverVariant::Dfl)]
#[case::dfl_port("/dev/dfl-port.1", DeviceKind::Port, DriverVariant::Dfl)]
#[case::legacy_fme("/dev/intel-fpga-fme.0", DeviceKind::Fme, DriverVariant::IntelFpga)]
#[case::legacy_port("/dev/intel-fpga-port.2", DeviceKind::Port, DriverVariant::IntelFpga)]
fn device_kind_from_prefix(
    #[case] path: &str,
    #[case] kind: DeviceKind,
    #[case] variant: DriverVariant,
) {
    let (k, abi) = resolve_device(Path::new(path)).unwrap();
    expect_that!(k, eq(kind));
    expect_that!(abi.variant, eq(variant));
}

#[gtest]
#[rstest]
#[case::unknown("/dev/fpga0", "FpgaPrError::UnknownDeviceKind:")]
#[case::missing_node("/dev/dfl-port.4242", "FpgaPrError::IOOpen:")]
fn fpga_info_errors(#[case] path: &str, #[case] expected: &str) {
    expect_that!(
        &fpga_info(Path::new(path)),
        err(displays_as(contains_substring(expected)))
    );
}
