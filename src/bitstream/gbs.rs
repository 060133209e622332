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

//! Reader for GBS (Green BitStream) files.
//!
//! A GBS file is a 20 byte [`header`], a JSON [`metadata`] block whose length the header
//! declares, and the raw bitstream image running to the end of the file:
//!
//! ```text
//! ┌──────────────┬─────────────────────────┬──────────────────────────────┐
//! │ header (20B) │ metadata (1..4095 B)    │ raw bitstream (Size bytes)   │
//! └──────────────┴─────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Opening a file validates the header and decodes the metadata but leaves the image on
//! disk; see [`body`] for how it is read.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgapr::bitstream::gbs::GbsFile;
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgapr::error::FpgaPrError> {
//! let mut gbs = GbsFile::open(Path::new("nlb_mode_0.gbs"))?;
//! println!("interface:   {}", gbs.interface_uuid());
//! println!("accelerator: {}", gbs.accelerator_type_uuid());
//! let image = gbs.bitstream().data()?;
//! gbs.close();
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod header;
pub mod metadata;

use crate::error::FpgaPrError;
use crate::system_io::fs_open;
use body::{Bitstream, BodyLayout, ReadAt};
use header::{BitstreamHeader, FILE_HEADER_LENGTH, read_header};
use log::{debug, trace};
use metadata::{BitstreamMetadata, read_metadata};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// An open GBS file over the resource `R`.
#[derive(Debug)]
pub struct GbsFile<R: ReadAt> {
    pub header: BitstreamHeader,
    pub metadata: BitstreamMetadata,
    metadata_raw: Vec<u8>,
    layout: BodyLayout,
    source: Option<R>,
    owns_source: bool,
}

impl GbsFile<File> {
    /// Open the named file and prepare it for use as GBS.
    ///
    /// The file is owned by the returned value and released by [`GbsFile::close`] or on drop.
    ///
    /// # Returns: `Result<GbsFile<File>, FpgaPrError>`
    /// * `Ok(GbsFile)` - A validated container
    /// * `Err(FpgaPrError::IOOpen)` - The file cannot be opened
    /// * `Err(..)` - Any error from [`GbsFile::from_reader`]
    pub fn open(path: &Path) -> Result<Self, FpgaPrError> {
        trace!("Opening GBS file {path:?}");
        let file = fs_open(path)?;
        let mut gbs = Self::from_reader(file)?;
        gbs.owns_source = true;
        Ok(gbs)
    }
}

impl<R: ReadAt> GbsFile<R> {
    /// Parse a GBS container starting at offset 0 of `source`.
    ///
    /// The header is checked first, then the metadata length and the body layout, and only
    /// then are the metadata bytes read and decoded. Closing the result does not release `source`; pass
    /// a reference (`&File`, `&[u8]`) to keep using the resource afterwards.
    ///
    /// # Returns: `Result<GbsFile<R>, FpgaPrError>`
    /// * `Ok(GbsFile)` - A validated container
    /// * `Err(FpgaPrError::ShortRead)` - The header is truncated
    /// * `Err(FpgaPrError::CorruptHeader)` - Wrong magic GUIDs
    /// * `Err(FpgaPrError::InvalidMetadataLength)` - Metadata length is 0 or ≥ 4096
    /// * `Err(FpgaPrError::ShortRead)` - The file ends before the metadata does
    /// * `Err(FpgaPrError::MetadataParseError)` - Metadata is not the expected JSON
    /// * `Err(FpgaPrError::CorruptLayout)` - The file shrank below header plus metadata
    pub fn from_reader(source: R) -> Result<Self, FpgaPrError> {
        let header = read_header(&source)?;
        let (metadata, metadata_raw) = read_metadata(&source, &header)?;
        let file_len = source.size().map_err(|e| FpgaPrError::Read {
            what: "container size",
            e,
        })?;
        let layout = BodyLayout::compute(
            file_len,
            FILE_HEADER_LENGTH,
            u64::from(header.metadata_length),
        )?;
        debug!(
            "GBS bitstream of {} bytes at offset {}",
            layout.size, layout.offset
        );
        Ok(GbsFile {
            header,
            metadata,
            metadata_raw,
            layout,
            source: Some(source),
            owns_source: false,
        })
    }

    /// The raw bitstream image.
    pub fn bitstream(&self) -> Bitstream<'_, R> {
        Bitstream::new(self.source.as_ref(), self.layout)
    }

    /// Size of the raw bitstream image in bytes.
    pub fn size(&self) -> u64 {
        self.layout.size
    }

    pub fn interface_uuid(&self) -> &str {
        self.metadata.interface_uuid()
    }

    pub fn accelerator_type_uuid(&self) -> &str {
        self.metadata.accelerator_type_uuid()
    }

    /// The metadata exactly as stored in the file.
    pub fn metadata_bytes(&self) -> &[u8] {
        &self.metadata_raw
    }

    /// Release the underlying file if this container opened it.
    ///
    /// Calling this more than once, or on a container built with
    /// [`GbsFile::from_reader`], has no effect.
    pub fn close(&mut self) {
        if self.owns_source && self.source.take().is_some() {
            trace!("Closed GBS source");
        }
    }

    /// Write the container back out: header, the original metadata bytes, then the image.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<u64, FpgaPrError> {
        let image = self.bitstream().data()?;
        let write_err = |e| FpgaPrError::Write {
            what: "GBS container",
            e,
        };
        out.write_all(&self.header.encode()).map_err(write_err)?;
        out.write_all(&self.metadata_raw).map_err(write_err)?;
        out.write_all(&image).map_err(write_err)?;
        Ok(FILE_HEADER_LENGTH + self.metadata_raw.len() as u64 + image.len() as u64)
    }
}

/// Assemble a GBS container from its metadata and image.
///
/// # Returns: `Result<Vec<u8>, FpgaPrError>`
/// * `Ok(Vec<u8>)` - The encoded container
/// * `Err(FpgaPrError::InvalidMetadataLength)` - `metadata` is empty or ≥ 4096 bytes
pub fn build_container(metadata: &[u8], image: &[u8]) -> Result<Vec<u8>, FpgaPrError> {
    let metadata_length = u32::try_from(metadata.len())
        .map_err(|_| FpgaPrError::InvalidMetadataLength(u32::MAX))?;
    let header = BitstreamHeader::new(metadata_length);
    header.validate_metadata_length()?;
    let mut out = Vec::with_capacity(FILE_HEADER_LENGTH as usize + metadata.len() + image.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(metadata);
    out.extend_from_slice(image);
    Ok(out)
}
