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

//! Bitstream container formats and format dispatch.
//!
//! Two formats are understood:
//!
//! * [`gbs`] - the primary container: header, JSON metadata and the raw image.
//! * [`aocx`] - an ELF wrapper carrying OpenCL board descriptors and, optionally, a gzip
//!   compressed GBS file.
//!
//! [`open_bitstream`] picks the reader from the file extension and falls back to sniffing the
//! first bytes of the file when the extension is not recognised.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgapr::bitstream::open_bitstream;
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgapr::error::FpgaPrError> {
//! let bitstream = open_bitstream(Path::new("vector_add.aocx"))?;
//! let info = bitstream.info(Path::new("/srv/intel.com/fpga"))?;
//! println!("{}", info.install_path.display());
//! # Ok(())
//! # }
//! ```

pub mod aocx;
pub mod gbs;

use crate::bitstream::aocx::AocxFile;
use crate::bitstream::gbs::GbsFile;
use crate::bitstream::gbs::body::ReadAt;
use crate::bitstream::gbs::header::{FILE_HEADER_LENGTH, has_gbs_magic};
use crate::error::FpgaPrError;
use crate::install::install_path;
use crate::system_io::fs_open;
use log::{debug, trace};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// An opened bitstream file of either format.
#[derive(Debug)]
pub enum BitstreamFile {
    Gbs { path: PathBuf, gbs: GbsFile<File> },
    Aocx { path: PathBuf, aocx: AocxFile },
}

/// Summary of a bitstream file, as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BitstreamInfo {
    pub path: PathBuf,
    pub interface_uuid: String,
    pub accelerator_type_uuid: String,
    pub install_path: PathBuf,
    /// Format specific details, e.g. `Size`, `Board`, `Hash`.
    pub extra: BTreeMap<String, String>,
}

/// Extension of the final path component from its last dot, dot included. `""` if there
/// is no dot.
pub fn file_extension(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.rfind('.')
        .map(|i| name[i..].to_string())
        .unwrap_or_default()
}

/// Open a GBS or AOCX file.
///
/// `.gbs` and `.aocx` files are opened with the matching reader. Anything else is identified
/// from its first bytes: the GBS magic GUIDs or the ELF magic.
///
/// # Arguments
///
/// * `path` - The bitstream file
///
/// # Returns: `Result<BitstreamFile, FpgaPrError>`
/// * `Ok(BitstreamFile)` - The opened and validated container
/// * `Err(FpgaPrError::UnsupportedContainerFormat)` - Neither extension nor content is known
/// * `Err(..)` - Any error from [`GbsFile::open`] or [`AocxFile::open`]
pub fn open_bitstream(path: &Path) -> Result<BitstreamFile, FpgaPrError> {
    let bitstream = match file_extension(path).as_str() {
        ".gbs" => open_gbs(path)?,
        ".aocx" => open_aocx(path)?,
        ext => {
            trace!("Unknown extension {ext:?}, checking the content of {path:?}");
            let file = fs_open(path)?;
            let mut magic = [0u8; FILE_HEADER_LENGTH as usize];
            let n = file
                .read_full_at(&mut magic, 0)
                .map_err(|e| FpgaPrError::IORead {
                    file: path.to_path_buf(),
                    e,
                })?;
            drop(file);
            if has_gbs_magic(&magic[..n]) {
                open_gbs(path)?
            } else if magic[..n].starts_with(ELF_MAGIC) {
                open_aocx(path)?
            } else {
                return Err(FpgaPrError::UnsupportedContainerFormat(path.to_path_buf()));
            }
        }
    };
    debug!("Opened {path:?} as {}", bitstream.format());
    Ok(bitstream)
}

fn open_gbs(path: &Path) -> Result<BitstreamFile, FpgaPrError> {
    Ok(BitstreamFile::Gbs {
        path: path.to_path_buf(),
        gbs: GbsFile::open(path)?,
    })
}

fn open_aocx(path: &Path) -> Result<BitstreamFile, FpgaPrError> {
    Ok(BitstreamFile::Aocx {
        path: path.to_path_buf(),
        aocx: AocxFile::open(path)?,
    })
}

impl BitstreamFile {
    pub fn path(&self) -> &Path {
        match self {
            BitstreamFile::Gbs { path, .. } | BitstreamFile::Aocx { path, .. } => path,
        }
    }

    pub fn format(&self) -> &'static str {
        match self {
            BitstreamFile::Gbs { .. } => "GBS",
            BitstreamFile::Aocx { .. } => "AOCX",
        }
    }

    /// Interface UUID of the GBS image, embedded or not.
    pub fn interface_uuid(&self) -> Result<&str, FpgaPrError> {
        match self {
            BitstreamFile::Gbs { gbs, .. } => Ok(gbs.interface_uuid()),
            BitstreamFile::Aocx { aocx, .. } => Ok(aocx.gbs()?.interface_uuid()),
        }
    }

    pub fn accelerator_type_uuid(&self) -> Result<&str, FpgaPrError> {
        match self {
            BitstreamFile::Gbs { gbs, .. } => Ok(gbs.accelerator_type_uuid()),
            BitstreamFile::Aocx { aocx, .. } => Ok(aocx.gbs()?.accelerator_type_uuid()),
        }
    }

    /// Name an installed copy is stored under: the accelerator type UUID for GBS, the
    /// content hash for AOCX.
    pub fn install_id(&self) -> Result<&str, FpgaPrError> {
        match self {
            BitstreamFile::Gbs { gbs, .. } => Ok(gbs.accelerator_type_uuid()),
            BitstreamFile::Aocx { aocx, .. } => {
                aocx.gbs()?;
                Ok(&aocx.hash)
            }
        }
    }

    /// Size of the raw image in bytes. An AOCX file without a GBS carries no image.
    pub fn image_size(&self) -> u64 {
        match self {
            BitstreamFile::Gbs { gbs, .. } => gbs.size(),
            BitstreamFile::Aocx { aocx, .. } => aocx.gbs().map_or(0, |gbs| gbs.size()),
        }
    }

    /// The raw image, read fully into memory.
    ///
    /// # Returns: `Result<Vec<u8>, FpgaPrError>`
    /// * `Ok(Vec<u8>)` - Exactly [`BitstreamFile::image_size`] bytes
    /// * `Err(FpgaPrError::EmptyBitstream)` - The container carries no image
    /// * `Err(FpgaPrError::ShortRead)` - The file ended before the image did
    pub fn image(&self) -> Result<Vec<u8>, FpgaPrError> {
        if self.image_size() == 0 {
            return Err(FpgaPrError::EmptyBitstream(self.path().to_path_buf()));
        }
        match self {
            BitstreamFile::Gbs { gbs, .. } => gbs.bitstream().data(),
            BitstreamFile::Aocx { aocx, .. } => aocx.gbs()?.bitstream().data(),
        }
    }

    /// Summarise the file for an install tree rooted at `base_dir`.
    ///
    /// # Returns: `Result<BitstreamInfo, FpgaPrError>`
    /// * `Ok(BitstreamInfo)` - The report
    /// * `Err(FpgaPrError::NoEmbeddedBitstream)` - An AOCX file without an embedded GBS
    /// * `Err(FpgaPrError::Argument)` - The UUIDs or hash do not form a plain install name
    pub fn info(&self, base_dir: &Path) -> Result<BitstreamInfo, FpgaPrError> {
        let mut extra = BTreeMap::new();
        if let BitstreamFile::Aocx { aocx, .. } = self {
            extra.insert("Board".to_string(), aocx.board.clone());
            extra.insert("Target".to_string(), aocx.target.clone());
            extra.insert("Hash".to_string(), aocx.hash.clone());
            extra.insert("Version".to_string(), aocx.version.clone());
        }
        let interface_uuid = self.interface_uuid()?;
        extra.insert("Size".to_string(), self.image_size().to_string());
        Ok(BitstreamInfo {
            path: self.path().to_path_buf(),
            interface_uuid: interface_uuid.to_string(),
            accelerator_type_uuid: self.accelerator_type_uuid()?.to_string(),
            install_path: install_path(
                base_dir,
                interface_uuid,
                self.install_id()?,
                &file_extension(self.path()),
            )?,
            extra,
        })
    }

    /// Release the underlying file. AOCX files are read into memory on open and hold none.
    pub fn close(&mut self) {
        if let BitstreamFile::Gbs { gbs, .. } = self {
            gbs.close();
        }
    }
}
