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

//! Open device node plus the raw ioctl plumbing shared by FME and port devices.
//!
//! This is the only place that calls into the kernel. Callers hand in a request number from
//! [`crate::devices::abi`] and, where the request takes one, a `#[repr(C)]` record from the
//! same module.

use crate::devices::DeviceKind;
use crate::devices::abi::DriverAbi;
use crate::error::FpgaPrError;
use log::trace;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct DeviceHandle {
    path: PathBuf,
    abi: &'static DriverAbi,
    kind: DeviceKind,
    file: Option<File>,
}

impl DeviceHandle {
    /// Open `path` read/write for exclusive use.
    ///
    /// # Returns: `Result<DeviceHandle, FpgaPrError>`
    /// * `Ok(DeviceHandle)` - The open node
    /// * `Err(FpgaPrError::IOOpen)` - The node is missing, busy or not accessible
    pub(crate) fn open(
        path: &Path,
        abi: &'static DriverAbi,
        kind: DeviceKind,
    ) -> Result<Self, FpgaPrError> {
        trace!("Opening {kind:?} node {path:?} with the {} driver ABI", abi.name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_EXCL)
            .open(path)
            .map_err(|e| FpgaPrError::IOOpen {
                file: path.to_path_buf(),
                e,
            })?;
        Ok(DeviceHandle {
            path: path.to_path_buf(),
            abi,
            kind,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn abi(&self) -> &'static DriverAbi {
        self.abi
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Release the node. Safe to call more than once.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            trace!("Closed {:?}", self.path);
        }
    }

    fn fd(&self) -> Result<RawFd, FpgaPrError> {
        self.file
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or_else(|| FpgaPrError::HandleClosed(self.path.clone()))
    }

    fn check(&self, op: &'static str, ret: libc::c_int) -> Result<i32, FpgaPrError> {
        if ret < 0 {
            return Err(FpgaPrError::hardware(op, &self.path));
        }
        trace!("{op} on {:?} returned {ret}", self.path);
        Ok(ret)
    }

    /// Issue a request that takes no argument.
    pub(crate) fn ioctl(&self, op: &'static str, request: u32) -> Result<i32, FpgaPrError> {
        let fd = self.fd()?;
        // SAFETY: fd is owned by self.file and open for the duration of the call. The
        // request carries no argument, so the kernel reads or writes no user memory.
        let ret = unsafe { libc::ioctl(fd, request as _) };
        self.check(op, ret)
    }

    /// Issue a request that takes an integer argument.
    pub(crate) fn ioctl_with_value(
        &self,
        op: &'static str,
        request: u32,
        value: libc::c_ulong,
    ) -> Result<i32, FpgaPrError> {
        let fd = self.fd()?;
        // SAFETY: fd is open as above. The argument is passed by value and is never
        // dereferenced by the kernel.
        let ret = unsafe { libc::ioctl(fd, request as _, value) };
        self.check(op, ret)
    }

    /// Issue a request whose argument is a pointer to `record`.
    ///
    /// `T` must be one of the `#[repr(C)]` records in [`crate::devices::abi`] matching
    /// `request`, with `argsz` set by its constructor.
    pub(crate) fn ioctl_with_record<T>(
        &self,
        op: &'static str,
        request: u32,
        record: &mut T,
    ) -> Result<i32, FpgaPrError> {
        let fd = self.fd()?;
        // SAFETY: record is a live, exclusively borrowed #[repr(C)] value whose layout is
        // the one the driver expects for this request (checked by the const asserts in the
        // abi module). The driver copies at most argsz bytes in and out of it, and argsz
        // equals size_of::<T>(). Any buffer address inside the record is borrowed by the
        // caller for longer than this call.
        let ret = unsafe { libc::ioctl(fd, request as _, &raw mut *record) };
        self.check(op, ret)
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.close();
    }
}
