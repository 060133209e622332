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

//! FPGA device nodes exposed by the DFL and intel-fpga kernel drivers.
//!
//! The node name decides both the device kind and the driver generation:
//!
//! | prefix                  | kind | driver     |
//! |-------------------------|------|------------|
//! | `/dev/dfl-fme.`         | FME  | DFL        |
//! | `/dev/dfl-port.`        | Port | DFL        |
//! | `/dev/intel-fpga-fme.`  | FME  | intel-fpga |
//! | `/dev/intel-fpga-port.` | Port | intel-fpga |
//!
//! The node itself is never probed to decide this. Once open, every call dispatches on the
//! driver recorded at open time.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgapr::devices::{open_port, device::{FpgaDevice, FpgaPort}};
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgapr::error::FpgaPrError> {
//! let mut port = open_port(Path::new("/dev/dfl-port.0"))?;
//! let info = port.port_get_info()?;
//! for index in 0..info.num_regions {
//!     println!("{:?}", port.port_get_region_info(index)?);
//! }
//! port.close();
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod device;
pub mod fme;
pub mod handle;
pub mod port;

use crate::devices::abi::{DRIVERS, DriverAbi, FPGA_API_VERSION};
use crate::devices::device::{FpgaDevice, FpgaFme, FpgaPort, PortInfo, PortRegionInfo};
use crate::devices::fme::FmeDevice;
use crate::devices::port::PortDevice;
use crate::error::FpgaPrError;
use log::{debug, trace, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceKind {
    /// FPGA Management Engine.
    Fme,
    /// Accelerator function port.
    Port,
}

/// Work out the kind and driver of the node at `path` from its name.
///
/// # Returns: `Result<(DeviceKind, &DriverAbi), FpgaPrError>`
/// * `Ok((DeviceKind, &DriverAbi))` - The kind and the driver ABI to use
/// * `Err(FpgaPrError::UnknownDeviceKind)` - `path` matches no known prefix
pub fn resolve_device(path: &Path) -> Result<(DeviceKind, &'static DriverAbi), FpgaPrError> {
    let name = path.to_string_lossy();
    for abi in DRIVERS {
        if name.starts_with(abi.fme_prefix) {
            return Ok((DeviceKind::Fme, abi));
        }
        if name.starts_with(abi.port_prefix) {
            return Ok((DeviceKind::Port, abi));
        }
    }
    Err(FpgaPrError::UnknownDeviceKind(format!(
        "{path:?} is neither a DFL nor an intel-fpga device node"
    )))
}

/// Open an FME node.
///
/// # Returns: `Result<FmeDevice, FpgaPrError>`
/// * `Ok(FmeDevice)` - The open device
/// * `Err(FpgaPrError::UnknownDeviceKind)` - `path` is not named like an FME node
/// * `Err(FpgaPrError::IOOpen)` - The node could not be opened for exclusive use
pub fn open_fme(path: &Path) -> Result<FmeDevice, FpgaPrError> {
    match resolve_device(path)? {
        (DeviceKind::Fme, abi) => FmeDevice::open(path, abi),
        (DeviceKind::Port, _) => Err(FpgaPrError::UnknownDeviceKind(format!(
            "{path:?} is a port, expected an FME"
        ))),
    }
}

/// Open a port node.
///
/// # Returns: `Result<PortDevice, FpgaPrError>`
/// * `Ok(PortDevice)` - The open device
/// * `Err(FpgaPrError::UnknownDeviceKind)` - `path` is not named like a port node
/// * `Err(FpgaPrError::IOOpen)` - The node could not be opened for exclusive use
pub fn open_port(path: &Path) -> Result<PortDevice, FpgaPrError> {
    match resolve_device(path)? {
        (DeviceKind::Port, abi) => PortDevice::open(path, abi),
        (DeviceKind::Fme, _) => Err(FpgaPrError::UnknownDeviceKind(format!(
            "{path:?} is an FME, expected a port"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FmeReport {
    pub path: PathBuf,
    pub driver: &'static str,
    pub api_version: i32,
    pub extension: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub path: PathBuf,
    pub driver: &'static str,
    pub api_version: i32,
    pub extension: i32,
    pub reset: i32,
    pub info: PortInfo,
    pub regions: Vec<PortRegionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DeviceReport {
    Fme(FmeReport),
    Port(PortReport),
}

/// Read the API version, warning when the driver speaks a version this crate was not
/// written against. The report is still produced.
fn checked_api_version<D: FpgaDevice + ?Sized>(device: &D) -> Result<i32, FpgaPrError> {
    let version = device.get_api_version()?;
    if version != FPGA_API_VERSION {
        warn!(
            "{:?} reports API version {version}, expected {FPGA_API_VERSION}",
            device.path()
        );
    }
    Ok(version)
}

/// Query an FME for its API version and extension support.
pub fn fme_info(fme: &dyn FpgaFme) -> Result<FmeReport, FpgaPrError> {
    let report = FmeReport {
        path: fme.path().to_path_buf(),
        driver: DriverAbi::for_variant(fme.driver()).name,
        api_version: checked_api_version(fme)?,
        extension: fme.check_extension(0)?,
    };
    debug!("{report:?}");
    Ok(report)
}

/// Reset a port and collect its information and every region it reports.
pub fn port_info(port: &dyn FpgaPort) -> Result<PortReport, FpgaPrError> {
    let api_version = checked_api_version(port)?;
    let extension = port.check_extension(0)?;
    let reset = port.port_reset()?;
    let info = port.port_get_info()?;
    trace!("{:?} has {} regions", port.path(), info.num_regions);
    let regions = (0..info.num_regions)
        .map(|index| port.port_get_region_info(index))
        .collect::<Result<Vec<_>, _>>()?;
    let report = PortReport {
        path: port.path().to_path_buf(),
        driver: DriverAbi::for_variant(port.driver()).name,
        api_version,
        extension,
        reset,
        info,
        regions,
    };
    debug!("{report:?}");
    Ok(report)
}

/// Open the node at `path`, report on it according to its kind and close it again.
pub fn fpga_info(path: &Path) -> Result<DeviceReport, FpgaPrError> {
    match resolve_device(path)? {
        (DeviceKind::Fme, abi) => {
            let mut fme = FmeDevice::open(path, abi)?;
            let report = fme_info(&fme);
            fme.close();
            report.map(DeviceReport::Fme)
        }
        (DeviceKind::Port, abi) => {
            let mut port = PortDevice::open(path, abi)?;
            let report = port_info(&port);
            port.close();
            report.map(DeviceReport::Port)
        }
    }
}
