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

//! Capability traits of FPGA device nodes.
//!
//! * [`FpgaDevice`] - queries common to FME and port nodes
//! * [`FpgaFme`] - the FPGA Management Engine, which performs partial reconfiguration
//! * [`FpgaPort`] - an accelerator port, which can be reset and queried for its regions
//!
//! All calls block in the kernel until the driver answers.

use crate::devices::abi::DriverVariant;
use crate::error::FpgaPrError;
use serde::Serialize;
use std::path::Path;

pub trait FpgaDevice {
    /// Path of the device node.
    fn path(&self) -> &Path;

    /// Driver generation, decided by the node name when the device was opened.
    fn driver(&self) -> DriverVariant;

    /// Report the version of the driver API.
    ///
    /// # Returns: `Result<i32, FpgaPrError>`
    /// * `Ok(i32)` - The API version, `0` for both supported drivers
    /// * `Err(FpgaPrError::HardwareOperationFailed)` - The ioctl failed
    /// * `Err(FpgaPrError::HandleClosed)` - The device has been closed
    fn get_api_version(&self) -> Result<i32, FpgaPrError>;

    /// Check whether the driver supports `extension`.
    ///
    /// # Returns: `Result<i32, FpgaPrError>`
    /// * `Ok(0)` - Not supported
    /// * `Ok(i32)` - Supported
    /// * `Err(FpgaPrError::HardwareOperationFailed)` - The ioctl failed
    fn check_extension(&self, extension: u32) -> Result<i32, FpgaPrError>;

    /// Release the device node. Calling it again does nothing.
    fn close(&mut self);
}

pub trait FpgaFme: FpgaDevice {
    /// Program `image` into the region behind port `port_id`.
    ///
    /// Once issued the operation cannot be interrupted. The driver's return value is passed
    /// through unchanged.
    ///
    /// # Returns: `Result<i32, FpgaPrError>`
    /// * `Ok(i32)` - The ioctl result, `0` on success
    /// * `Err(FpgaPrError::Argument)` - `image` is larger than the driver can accept
    /// * `Err(FpgaPrError::HardwareOperationFailed)` - The driver rejected the image
    fn port_pr(&self, port_id: u32, image: &[u8]) -> Result<i32, FpgaPrError>;
}

pub trait FpgaPort: FpgaDevice {
    /// Reset the port and its accelerator.
    fn port_reset(&self) -> Result<i32, FpgaPrError>;

    /// Port information. `num_regions` bounds the indices accepted by
    /// [`FpgaPort::port_get_region_info`].
    fn port_get_info(&self) -> Result<PortInfo, FpgaPrError>;

    /// Information about region `index`, see the `PORT_REGION_INDEX_*` constants.
    fn port_get_region_info(&self, index: u32) -> Result<PortRegionInfo, FpgaPrError>;
}

/// Port information in a driver independent form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub flags: u32,
    pub num_regions: u32,
    pub num_umsgs: u32,
    /// Only reported by the intel-fpga driver.
    pub capability: Option<u32>,
    /// Only reported by the intel-fpga driver.
    pub num_uafu_irqs: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortRegionInfo {
    pub index: u32,
    /// `PORT_REGION_FLAG_*` bits.
    pub flags: u32,
    pub size: u64,
    /// Offset of the region from the start of the device file, for `mmap`.
    pub offset: u64,
}
