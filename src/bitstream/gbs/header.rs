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

//! Fixed-size header at the start of every GBS file.
//!
//! ```text
//! offset  size  field
//! 0       8     GUID1           0x414750466e6f6558 (little-endian)
//! 8       8     GUID2           0x31303076534247b7
//! 16      4     MetadataLength
//! ```

use crate::bitstream::gbs::body::ReadAt;
use crate::error::FpgaPrError;
use log::trace;

pub const BITSTREAM_GUID1: u64 = 0x4147_5046_6e6f_6558;
pub const BITSTREAM_GUID2: u64 = 0x3130_3076_5342_47b7;

/// Size in bytes of the encoded header.
pub const FILE_HEADER_LENGTH: u64 = 20;

/// Upper bound (exclusive) on the metadata length a header may declare.
pub const MAX_METADATA_LENGTH: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamHeader {
    pub guid1: u64,
    pub guid2: u64,
    pub metadata_length: u32,
}

impl BitstreamHeader {
    /// Header for a new container carrying `metadata_length` bytes of metadata.
    pub fn new(metadata_length: u32) -> Self {
        BitstreamHeader {
            guid1: BITSTREAM_GUID1,
            guid2: BITSTREAM_GUID2,
            metadata_length,
        }
    }

    /// Decode a header without validating it.
    pub fn decode(bytes: &[u8; FILE_HEADER_LENGTH as usize]) -> Self {
        let mut guid1 = [0u8; 8];
        let mut guid2 = [0u8; 8];
        let mut metadata_length = [0u8; 4];
        guid1.copy_from_slice(&bytes[0..8]);
        guid2.copy_from_slice(&bytes[8..16]);
        metadata_length.copy_from_slice(&bytes[16..20]);
        BitstreamHeader {
            guid1: u64::from_le_bytes(guid1),
            guid2: u64::from_le_bytes(guid2),
            metadata_length: u32::from_le_bytes(metadata_length),
        }
    }

    pub fn encode(&self) -> [u8; FILE_HEADER_LENGTH as usize] {
        let mut out = [0u8; FILE_HEADER_LENGTH as usize];
        out[0..8].copy_from_slice(&self.guid1.to_le_bytes());
        out[8..16].copy_from_slice(&self.guid2.to_le_bytes());
        out[16..20].copy_from_slice(&self.metadata_length.to_le_bytes());
        out
    }

    /// Check both magic GUIDs.
    ///
    /// # Returns: `Result<(), FpgaPrError>`
    /// * `Ok(())` - Both GUIDs match the GBS constants
    /// * `Err(FpgaPrError::CorruptHeader)` - Either GUID differs
    pub fn validate_magic(&self) -> Result<(), FpgaPrError> {
        if self.guid1 != BITSTREAM_GUID1 || self.guid2 != BITSTREAM_GUID2 {
            return Err(FpgaPrError::CorruptHeader {
                guid1: self.guid1,
                guid2: self.guid2,
                expected1: BITSTREAM_GUID1,
                expected2: BITSTREAM_GUID2,
            });
        }
        Ok(())
    }

    /// Check the declared metadata length lies in `[1, 4096)`.
    pub fn validate_metadata_length(&self) -> Result<(), FpgaPrError> {
        if self.metadata_length == 0 || self.metadata_length >= MAX_METADATA_LENGTH {
            return Err(FpgaPrError::InvalidMetadataLength(self.metadata_length));
        }
        Ok(())
    }
}

/// Read and validate the header at offset 0 of `source`.
///
/// Exactly [`FILE_HEADER_LENGTH`] bytes are read; nothing past the header is touched.
///
/// # Returns: `Result<BitstreamHeader, FpgaPrError>`
/// * `Ok(BitstreamHeader)` - A header with valid magic and metadata length
/// * `Err(FpgaPrError::ShortRead)` - The source is shorter than a header
/// * `Err(FpgaPrError::CorruptHeader)` - Wrong magic
/// * `Err(FpgaPrError::InvalidMetadataLength)` - Metadata length is 0 or ≥ 4096
pub fn read_header<R: ReadAt + ?Sized>(source: &R) -> Result<BitstreamHeader, FpgaPrError> {
    let mut buf = [0u8; FILE_HEADER_LENGTH as usize];
    let n = source
        .read_full_at(&mut buf, 0)
        .map_err(|e| FpgaPrError::Read { what: "header", e })?;
    if n < buf.len() {
        return Err(FpgaPrError::ShortRead {
            what: "header",
            expected: FILE_HEADER_LENGTH,
            actual: n as u64,
        });
    }
    let header = BitstreamHeader::decode(&buf);
    trace!("Decoded GBS header {header:x?}");
    header.validate_magic()?;
    header.validate_metadata_length()?;
    Ok(header)
}

/// Whether `bytes` start with the GBS magic.
pub fn has_gbs_magic(bytes: &[u8]) -> bool {
    match bytes.get(0..FILE_HEADER_LENGTH as usize) {
        Some(prefix) => {
            let mut buf = [0u8; FILE_HEADER_LENGTH as usize];
            buf.copy_from_slice(prefix);
            BitstreamHeader::decode(&buf).validate_magic().is_ok()
        }
        None => false,
    }
}
