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

//! Install path naming and installation of bitstream files.
//!
//! Installed bitstreams are grouped by the FPGA interface they target:
//!
//! ```text
//! <base>/<interface-uuid>/<accelerator-uuid-or-hash><extension>
//! ```
//!
//! GBS files are named after their accelerator type UUID, AOCX files after the
//! `.acl.rand_hash` descriptor. The extension is kept exactly as the source file had it.

use crate::bitstream::{file_extension, open_bitstream};
use crate::config::system_config;
use crate::error::FpgaPrError;
use crate::system_io::{fs_copy, fs_create_dir};
use log::{debug, info};
use std::path::{Component, Path, PathBuf};

/// Result of an install request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub destination: PathBuf,
    /// `false` for a dry run.
    pub copied: bool,
}

/// Compute where a bitstream is installed. Pure: the file system is not consulted.
///
/// `interface_uuid` and `id` come from the container itself, so each must name exactly one
/// entry below its parent. Absolute paths, separators and `.`/`..` are refused.
///
/// # Arguments
///
/// * `base_dir` - Root of the install tree, usually `/srv/intel.com/fpga`
/// * `interface_uuid` - Interface UUID of the bitstream
/// * `id` - Accelerator type UUID (GBS) or content hash (AOCX)
/// * `extension` - Extension of the source file including its leading dot, or `""`
///
/// # Returns: `Result<PathBuf, FpgaPrError>`
/// * `Ok(PathBuf)` - `base_dir/interface_uuid/id+extension`
/// * `Err(FpgaPrError::Argument)` - A name would leave its directory
///
/// # Examples
///
/// ```rust
/// # use fpgapr::install::install_path;
/// # use std::path::{Path, PathBuf};
/// let path = install_path(Path::new("/srv/intel.com/fpga"), "ABCD", "1234", ".gbs").unwrap();
/// assert_eq!(path, PathBuf::from("/srv/intel.com/fpga/ABCD/1234.gbs"));
/// assert!(install_path(Path::new("/srv/intel.com/fpga"), "/etc", "1234", ".gbs").is_err());
/// ```
pub fn install_path(
    base_dir: &Path,
    interface_uuid: &str,
    id: &str,
    extension: &str,
) -> Result<PathBuf, FpgaPrError> {
    let file_name = format!("{id}{extension}");
    Ok(base_dir
        .join(single_component("interface UUID", interface_uuid)?)
        .join(single_component("install name", &file_name)?))
}

fn single_component<'a>(what: &str, name: &'a str) -> Result<&'a str, FpgaPrError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains('/') => Ok(name),
        _ => Err(FpgaPrError::Argument(format!(
            "{what} {name:?} is not a plain file name"
        ))),
    }
}

/// Install `source` under `base_dir`.
///
/// The container is opened and validated to learn its identity. Unless `dry_run` is set, all
/// missing directories are created and the file is copied over any existing one. A dry run
/// touches nothing and may report a destination whose directory does not exist yet.
///
/// # Returns: `Result<InstallOutcome, FpgaPrError>`
/// * `Ok(InstallOutcome)` - The destination, and whether it was written
/// * `Err(FpgaPrError::UnsupportedContainerFormat)` - `source` is neither GBS nor AOCX
/// * `Err(FpgaPrError::NoEmbeddedBitstream)` - An AOCX file without an embedded GBS
/// * `Err(FpgaPrError::Argument)` - The container names an install path outside `base_dir`
/// * `Err(FpgaPrError::IOCreate)` / `Err(FpgaPrError::IOWrite)` - The copy failed
pub fn install_bitstream(
    source: &Path,
    base_dir: &Path,
    dry_run: bool,
) -> Result<InstallOutcome, FpgaPrError> {
    let destination = {
        let bitstream = open_bitstream(source)?;
        install_path(
            base_dir,
            bitstream.interface_uuid()?,
            bitstream.install_id()?,
            &file_extension(source),
        )?
    };
    if dry_run {
        info!("Dry run: would install {source:?} to {destination:?}");
        return Ok(InstallOutcome {
            destination,
            copied: false,
        });
    }
    if let Some(dir) = destination.parent() {
        fs_create_dir(dir)?;
    }
    let bytes = fs_copy(source, &destination)?;
    debug!("Copied {bytes} bytes");
    info!("Installed {source:?} to {destination:?}");
    Ok(InstallOutcome {
        destination,
        copied: true,
    })
}

/// [`install_bitstream`] under the configured install directory.
pub fn install_bitstream_default(
    source: &Path,
    dry_run: bool,
) -> Result<InstallOutcome, FpgaPrError> {
    let base_dir = system_config::bitstream_install_dir()?;
    install_bitstream(source, Path::new(&base_dir), dry_run)
}
