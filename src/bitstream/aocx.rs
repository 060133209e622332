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

//! Reader for AOCX files, the ELF wrapper produced by the OpenCL FPGA toolchain.
//!
//! Descriptor sections (`.acl.board`, `.acl.target`, ...) are copied into string fields.
//! The `.acl.fpga.bin` section is itself an ELF image whose `.acl.gbs.gz` section is a
//! gzip compressed GBS file:
//!
//! ```text
//! aocx (ELF)
//! ├── .acl.board, .acl.target, .acl.rand_hash, ...   descriptor strings
//! └── .acl.fpga.bin (ELF)
//!     └── .acl.gbs.gz                                gzip(GBS)
//! ```
//!
//! The nested GBS is decompressed into memory and parsed with the same rules as a
//! standalone GBS file. It is held by the [`AocxFile`], never merged into it.

use crate::bitstream::gbs::GbsFile;
use crate::error::FpgaPrError;
use crate::system_io::fs_read_bytes;
use flate2::read::GzDecoder;
use goblin::elf::Elf;
use log::{debug, trace};
use std::io::Read;
use std::path::{Path, PathBuf};

pub static FPGA_BIN_SECTION: &str = ".acl.fpga.bin";
pub static GBS_GZ_SECTION: &str = ".acl.gbs.gz";

/// An opened AOCX file. Missing descriptor sections leave their field empty.
#[derive(Debug, Default)]
pub struct AocxFile {
    pub auto_discovery: String,
    pub auto_discovery_xml: String,
    pub board: String,
    pub board_package: String,
    pub board_spec_xml: String,
    pub compilation_environment: String,
    pub hash: String,
    pub kernel_arg_info_xml: String,
    pub quartus_input_hash: String,
    pub quartus_report: String,
    pub target: String,
    pub version: String,
    gbs: Option<GbsFile<Vec<u8>>>,
    path: Option<PathBuf>,
}

impl AocxFile {
    /// Read the named file and parse it as AOCX.
    pub fn open(path: &Path) -> Result<Self, FpgaPrError> {
        trace!("Opening AOCX file {path:?}");
        let bytes = fs_read_bytes(path)?;
        let mut aocx = Self::from_bytes(&bytes)?;
        aocx.path = Some(path.to_path_buf());
        Ok(aocx)
    }

    /// Parse an AOCX image held in memory.
    ///
    /// # Returns: `Result<AocxFile, FpgaPrError>`
    /// * `Ok(AocxFile)` - Descriptors, plus the embedded GBS if `.acl.fpga.bin` is present
    /// * `Err(FpgaPrError::Elf)` - The wrapper or `.acl.fpga.bin` is not a valid ELF image
    /// * `Err(FpgaPrError::MissingEmbeddedPayload)` - `.acl.fpga.bin` has no `.acl.gbs.gz`
    /// * `Err(FpgaPrError::Decompress)` - `.acl.gbs.gz` is not valid gzip
    /// * `Err(FpgaPrError::Embedded)` - The decompressed GBS failed validation
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FpgaPrError> {
        let elf = Elf::parse(bytes).map_err(|e| FpgaPrError::Elf {
            stage: "AOCX wrapper",
            e,
        })?;
        let mut aocx = AocxFile::default();
        for (name, data) in sections(&elf, bytes) {
            if name == FPGA_BIN_SECTION {
                let data = data.ok_or_else(|| FpgaPrError::Read {
                    what: ".acl.fpga.bin section",
                    e: std::io::ErrorKind::UnexpectedEof.into(),
                })?;
                aocx.gbs = Some(parse_fpga_bin(data)?);
                continue;
            }
            if let Some(field) = aocx.descriptor_mut(name) {
                // Unreadable descriptors are treated as absent.
                *field = data
                    .map(|d| String::from_utf8_lossy(d).into_owned())
                    .unwrap_or_default();
            }
        }
        debug!(
            "AOCX board {:?}, target {:?}, hash {:?}, embedded GBS: {}",
            aocx.board,
            aocx.target,
            aocx.hash,
            aocx.gbs.is_some()
        );
        Ok(aocx)
    }

    /// Field filled by the descriptor section `name`, if it is one.
    fn descriptor_mut(&mut self, name: &str) -> Option<&mut String> {
        let field = match name {
            ".acl.autodiscovery" => &mut self.auto_discovery,
            ".acl.autodiscovery.xml" => &mut self.auto_discovery_xml,
            ".acl.board" => &mut self.board,
            ".acl.board_package" => &mut self.board_package,
            ".acl.board_spec.xml" => &mut self.board_spec_xml,
            ".acl.compilation_env" => &mut self.compilation_environment,
            ".acl.rand_hash" => &mut self.hash,
            ".acl.kernel_arg_info.xml" => &mut self.kernel_arg_info_xml,
            ".acl.quartus_input_hash" => &mut self.quartus_input_hash,
            ".acl.quartus_report" => &mut self.quartus_report,
            ".acl.target" => &mut self.target,
            ".acl.version" => &mut self.version,
            _ => return None,
        };
        Some(field)
    }

    /// The embedded GBS file.
    ///
    /// # Returns: `Result<&GbsFile<Vec<u8>>, FpgaPrError>`
    /// * `Ok(&GbsFile)` - The GBS decoded from `.acl.fpga.bin`
    /// * `Err(FpgaPrError::NoEmbeddedBitstream)` - The file has no `.acl.fpga.bin` section
    pub fn gbs(&self) -> Result<&GbsFile<Vec<u8>>, FpgaPrError> {
        self.gbs.as_ref().ok_or_else(|| {
            FpgaPrError::NoEmbeddedBitstream(self.path.clone().unwrap_or_default())
        })
    }

    pub fn has_gbs(&self) -> bool {
        self.gbs.is_some()
    }
}

/// Section names paired with their bytes (`None` when the bytes lie outside the image).
fn sections<'a>(
    elf: &'a Elf<'a>,
    bytes: &'a [u8],
) -> impl Iterator<Item = (&'a str, Option<&'a [u8]>)> + 'a {
    elf.section_headers.iter().filter_map(move |sh| {
        let name = elf.shdr_strtab.get_at(sh.sh_name)?;
        let data = sh.file_range().and_then(|range| bytes.get(range));
        Some((name, data))
    })
}

fn parse_fpga_bin(data: &[u8]) -> Result<GbsFile<Vec<u8>>, FpgaPrError> {
    let elf = Elf::parse(data).map_err(|e| FpgaPrError::Elf {
        stage: ".acl.fpga.bin",
        e,
    })?;
    let compressed = sections(&elf, data)
        .find(|(name, _)| *name == GBS_GZ_SECTION)
        .and_then(|(_, d)| d)
        .ok_or(FpgaPrError::MissingEmbeddedPayload {
            section: ".acl.gbs.gz",
            container: ".acl.fpga.bin",
        })?;
    trace!("Decompressing {} bytes of {GBS_GZ_SECTION}", compressed.len());
    let mut gbs_bytes = Vec::new();
    GzDecoder::new(compressed)
        .read_to_end(&mut gbs_bytes)
        .map_err(|e| FpgaPrError::Decompress {
            section: ".acl.gbs.gz",
            e,
        })?;
    GbsFile::from_reader(gbs_bytes).map_err(|e| FpgaPrError::Embedded {
        section: ".acl.gbs.gz",
        source: Box::new(e),
    })
}
