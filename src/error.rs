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

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FpgaPrError {
    #[error(
        "FpgaPrError::CorruptHeader: Wrong magic in GBS file: {guid1:#x} {guid2:#x} \
        Expected {expected1:#x} {expected2:#x}"
    )]
    CorruptHeader {
        guid1: u64,
        guid2: u64,
        expected1: u64,
        expected2: u64,
    },
    #[error("FpgaPrError::InvalidMetadataLength: Incorrect length of GBS metadata {0}")]
    InvalidMetadataLength(u32),
    #[error("FpgaPrError::MetadataParseError: Unable to parse GBS metadata: {0}")]
    MetadataParseError(String),
    #[error(
        "FpgaPrError::CorruptLayout: file of {file_len} bytes cannot hold a {header_len} byte \
        header and {metadata_len} bytes of metadata"
    )]
    CorruptLayout {
        file_len: u64,
        header_len: u64,
        metadata_len: u64,
    },
    #[error("FpgaPrError::ShortRead: Read {actual} of {expected} bytes of the {what}")]
    ShortRead {
        what: &'static str,
        expected: u64,
        actual: u64,
    },
    #[error("FpgaPrError::Read: An IO error occurred when reading the {what}: {e}")]
    Read {
        what: &'static str,
        e: std::io::Error,
    },
    #[error("FpgaPrError::Write: An IO error occurred when writing the {what}: {e}")]
    Write {
        what: &'static str,
        e: std::io::Error,
    },
    #[error("FpgaPrError::UnsupportedContainerFormat: unknown file format of file {0:?}")]
    UnsupportedContainerFormat(PathBuf),
    #[error("FpgaPrError::Elf: Unable to read {stage} as an ELF image: {e}")]
    Elf {
        stage: &'static str,
        e: goblin::error::Error,
    },
    #[error("FpgaPrError::MissingEmbeddedPayload: no {section} section in {container}")]
    MissingEmbeddedPayload {
        section: &'static str,
        container: &'static str,
    },
    #[error("FpgaPrError::Decompress: Unable to uncompress {section}: {e}")]
    Decompress {
        section: &'static str,
        e: std::io::Error,
    },
    #[error("FpgaPrError::Embedded: Unable to parse the bitstream embedded in {section}: {source}")]
    Embedded {
        section: &'static str,
        source: Box<FpgaPrError>,
    },
    #[error("FpgaPrError::NoEmbeddedBitstream: can't read GBS from AOCX file {0:?}")]
    NoEmbeddedBitstream(PathBuf),
    #[error("FpgaPrError::EmptyBitstream: {0:?} carries no bitstream image")]
    EmptyBitstream(PathBuf),
    #[error("FpgaPrError::UnknownDeviceKind: {0}")]
    UnknownDeviceKind(String),
    #[error("FpgaPrError::HardwareOperationFailed: {op} on {device:?} failed with code {code}: {e}")]
    HardwareOperationFailed {
        op: &'static str,
        device: PathBuf,
        code: i32,
        e: std::io::Error,
    },
    #[error("FpgaPrError::HandleClosed: {0:?} has already been closed")]
    HandleClosed(PathBuf),
    #[error("FpgaPrError::Argument: {0}")]
    Argument(String),
    #[error("FpgaPrError::IOOpen: An IO error occurred when opening {file:?}: {e}")]
    IOOpen { file: PathBuf, e: std::io::Error },
    #[error("FpgaPrError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("FpgaPrError::IOWrite: An IO error occurred when writing to {file:?}: {e}")]
    IOWrite { file: PathBuf, e: std::io::Error },
    #[error("FpgaPrError::IOCreate: An IO error occurred when creating {file:?}: {e}")]
    IOCreate { file: PathBuf, e: std::io::Error },
    #[error("FpgaPrError::TomlDe: Failed to parse config {toml_string:?}: {e}")]
    TomlDe {
        toml_string: String,
        e: toml::de::Error,
    },
    #[error("FpgaPrError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl FpgaPrError {
    /// Capture `errno` of the ioctl that just returned a negative value.
    pub(crate) fn hardware(op: &'static str, device: impl Into<PathBuf>) -> Self {
        let e = std::io::Error::last_os_error();
        FpgaPrError::HardwareOperationFailed {
            op,
            device: device.into(),
            code: e.raw_os_error().unwrap_or(-1),
            e,
        }
    }
}
