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

//! Accelerator port device.

use crate::devices::DeviceKind;
use crate::devices::abi::{DriverAbi, DriverVariant, dfl, intel_fpga};
use crate::devices::device::{FpgaDevice, FpgaPort, PortInfo, PortRegionInfo};
use crate::devices::handle::DeviceHandle;
use crate::error::FpgaPrError;
use std::path::Path;

#[derive(Debug)]
pub struct PortDevice {
    handle: DeviceHandle,
}

impl PortDevice {
    /// Open the port node at `path` using the ABI of `abi`.
    pub fn open(path: &Path, abi: &'static DriverAbi) -> Result<Self, FpgaPrError> {
        Ok(PortDevice {
            handle: DeviceHandle::open(path, abi, DeviceKind::Port)?,
        })
    }
}

impl FpgaDevice for PortDevice {
    fn path(&self) -> &Path {
        self.handle.path()
    }

    fn driver(&self) -> DriverVariant {
        self.handle.abi().variant
    }

    fn get_api_version(&self) -> Result<i32, FpgaPrError> {
        self.handle
            .ioctl("GetAPIVersion", self.handle.abi().ioctls.get_api_version)
    }

    fn check_extension(&self, extension: u32) -> Result<i32, FpgaPrError> {
        self.handle.ioctl_with_value(
            "CheckExtension",
            self.handle.abi().ioctls.check_extension,
            libc::c_ulong::from(extension),
        )
    }

    fn close(&mut self) {
        self.handle.close();
    }
}

impl FpgaPort for PortDevice {
    fn port_reset(&self) -> Result<i32, FpgaPrError> {
        self.handle
            .ioctl("PortReset", self.handle.abi().ioctls.port_reset)
    }

    fn port_get_info(&self) -> Result<PortInfo, FpgaPrError> {
        let request = self.handle.abi().ioctls.port_get_info;
        match self.driver() {
            DriverVariant::Dfl => {
                let mut info = dfl::PortInfo::new();
                self.handle
                    .ioctl_with_record("PortGetInfo", request, &mut info)?;
                Ok(PortInfo {
                    flags: info.flags,
                    num_regions: info.num_regions,
                    num_umsgs: info.num_umsgs,
                    capability: None,
                    num_uafu_irqs: None,
                })
            }
            DriverVariant::IntelFpga => {
                let mut info = intel_fpga::PortInfo::new();
                self.handle
                    .ioctl_with_record("PortGetInfo", request, &mut info)?;
                Ok(PortInfo {
                    flags: info.flags,
                    num_regions: info.num_regions,
                    num_umsgs: info.num_umsgs,
                    capability: Some(info.capability),
                    num_uafu_irqs: Some(info.num_uafu_irqs),
                })
            }
        }
    }

    fn port_get_region_info(&self, index: u32) -> Result<PortRegionInfo, FpgaPrError> {
        // Same record for both drivers.
        let mut region = match self.driver() {
            DriverVariant::Dfl => dfl::PortRegionInfo::new(index),
            DriverVariant::IntelFpga => intel_fpga::PortRegionInfo::new(index),
        };
        self.handle.ioctl_with_record(
            "PortGetRegionInfo",
            self.handle.abi().ioctls.port_get_region_info,
            &mut region,
        )?;
        Ok(PortRegionInfo {
            index: region.index,
            flags: region.flags,
            size: region.size,
            offset: region.offset,
        })
    }
}
