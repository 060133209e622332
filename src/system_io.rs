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

//! Error Wrapping File System I/O Helpers
//!
//! This module provides convenient wrappers around standard Rust file system operations,
//! with automatic conversion to `FpgaPrError` types. All functions include trace logging
//! for debugging and provide detailed error context including file paths and operation types.
//!
//! Includes: open, read, directory creation and whole-file copy.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgapr::system_io::{fs_copy, fs_create_dir};
//! # use std::path::Path;
//!
//! # fn example() -> Result<(), fpgapr::error::FpgaPrError> {
//! fs_create_dir(Path::new("/srv/intel.com/fpga/69528db6eb31577a8c3668f9faa081f6"))?;
//! fs_copy(
//!     Path::new("nlb0.gbs"),
//!     Path::new("/srv/intel.com/fpga/69528db6eb31577a8c3668f9faa081f6/nlb0.gbs"),
//! )?;
//! # Ok(())
//! # }
//! ```

use crate::error::FpgaPrError;
use log::trace;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::Read;
use std::path::Path;

/// Read the contents of a file to a String.
///
/// This is a convenient wrapper around `std::fs::File::read_to_string` that provides
/// trace logging and automatic error conversion to `FpgaPrError::IORead`.
///
/// # Arguments
///
/// * `file_path` - Path to the file to read
///
/// # Returns: `Result<String, FpgaPrError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(FpgaPrError::IORead)` - If the file cannot be read (doesn't exist, permissions, etc.)
pub fn fs_read(file_path: &Path) -> Result<String, FpgaPrError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(FpgaPrError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Read the contents of a file into memory.
///
/// Same as [`fs_read`] but without the UTF-8 requirement, for binary containers.
pub fn fs_read_bytes(file_path: &Path) -> Result<Vec<u8>, FpgaPrError> {
    trace!("Attempting to read bytes from {file_path:?}");
    std::fs::read(file_path).map_err(|e| FpgaPrError::IORead {
        file: file_path.into(),
        e,
    })
}

/// Open a file read-only.
///
/// # Returns: `Result<File, FpgaPrError>`
/// * `Ok(File)` - The opened file, positioned at offset 0
/// * `Err(FpgaPrError::IOOpen)` - If the file cannot be opened
pub fn fs_open(file_path: &Path) -> Result<File, FpgaPrError> {
    trace!("Attempting to open {file_path:?}");
    File::open(file_path).map_err(|e| FpgaPrError::IOOpen {
        file: file_path.into(),
        e,
    })
}

/// Recursively create directories up to the specified path.
///
/// This is a convenient wrapper around `std::fs::create_dir_all` that provides trace
/// logging and automatic error conversion to `FpgaPrError::IOCreate`. It will create all
/// missing parent directories in the path.
///
/// # Arguments
///
/// * `path` - The directory path to create (including all parents)
///
/// # Returns: `Result<(), FpgaPrError>`
/// * `Ok(())` - Directory created (or already existed)
/// * `Err(FpgaPrError::IOCreate)` - If directory creation fails (permissions, etc.)
pub fn fs_create_dir(path: &Path) -> Result<(), FpgaPrError> {
    trace!("Attempting to Create '{path:?}'");
    let result = create_dir_all(path);
    match result {
        Ok(_) => {
            trace!("Directory created at {path:?}.");
            Ok(())
        }
        Err(e) => Err(FpgaPrError::IOCreate {
            file: path.into(),
            e,
        }),
    }
}

/// Copy a file byte for byte, replacing any existing destination.
///
/// The destination is truncated before writing, so an older, longer file at the same
/// path leaves nothing behind. Permissions are not carried over from the source.
///
/// # Arguments
///
/// * `source` - File to copy from
/// * `destination` - File to create or overwrite. Its parent directory must exist.
///
/// # Returns: `Result<u64, FpgaPrError>`
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(FpgaPrError::IOOpen)` - If the source cannot be opened
/// * `Err(FpgaPrError::IOCreate)` - If the destination cannot be created
/// * `Err(FpgaPrError::IOWrite)` - If copying the contents fails
pub fn fs_copy(source: &Path, destination: &Path) -> Result<u64, FpgaPrError> {
    trace!("Attempting to copy {source:?} to {destination:?}");
    let mut src = fs_open(source)?;
    let mut dst = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(destination)
        .map_err(|e| FpgaPrError::IOCreate {
            file: destination.into(),
            e,
        })?;
    let copied = std::io::copy(&mut src, &mut dst).map_err(|e| FpgaPrError::IOWrite {
        file: destination.into(),
        e,
    })?;
    trace!("Copied {copied} bytes.");
    Ok(copied)
}
