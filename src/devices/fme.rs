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

//! FPGA Management Engine device.

use crate::devices::DeviceKind;
use crate::devices::abi::{DriverAbi, DriverVariant, dfl, intel_fpga};
use crate::devices::device::{FpgaDevice, FpgaFme};
use crate::devices::handle::DeviceHandle;
use crate::error::FpgaPrError;
use log::{debug, info};
use std::path::Path;

#[derive(Debug)]
pub struct FmeDevice {
    handle: DeviceHandle,
}

impl FmeDevice {
    /// Open the FME node at `path` using the ABI of `abi`.
    pub fn open(path: &Path, abi: &'static DriverAbi) -> Result<Self, FpgaPrError> {
        Ok(FmeDevice {
            handle: DeviceHandle::open(path, abi, DeviceKind::Fme)?,
        })
    }
}

impl FpgaDevice for FmeDevice {
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

impl FpgaFme for FmeDevice {
    fn port_pr(&self, port_id: u32, image: &[u8]) -> Result<i32, FpgaPrError> {
        let buffer_size = u32::try_from(image.len()).map_err(|_| {
            FpgaPrError::Argument(format!(
                "bitstream of {} bytes exceeds the 32-bit PR buffer size",
                image.len()
            ))
        })?;
        let buffer_address = image.as_ptr() as u64;
        let request = self.handle.abi().ioctls.fme_port_pr;
        debug!(
            "Issuing PR of {buffer_size} bytes to port {port_id} through {:?}",
            self.path()
        );
        let (ret, status) = match self.driver() {
            DriverVariant::Dfl => {
                let mut pr = dfl::FmePortPr::new(port_id, buffer_address, buffer_size);
                (self.handle.ioctl_with_record("FMEPortPR", request, &mut pr)?, None)
            }
            DriverVariant::IntelFpga => {
                let mut pr = intel_fpga::FmePortPr::new(port_id, buffer_address, buffer_size);
                let ret = self.handle.ioctl_with_record("FMEPortPR", request, &mut pr)?;
                (ret, Some(pr.status))
            }
        };
        info!(
            "PR of {buffer_size} bytes to port {port_id} through {:?}: {}",
            self.path(),
            pr_summary(ret, status)
        );
        Ok(ret)
    }
}

/// Result of a PR for the log. The legacy driver also reports an error status word, which
/// can be non-zero even when the ioctl itself succeeded.
fn pr_summary(ret: i32, status: Option<u64>) -> String {
    match status {
        Some(status) => format!("returned {ret}, status {status:#x}"),
        None => format!("returned {ret}"),
    }
}
