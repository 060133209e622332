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

//! Lazy access to the raw image trailing the header and metadata.
//!
//! The body is never buffered when a container is opened. Callers either take a
//! [`BitstreamReader`] with [`Bitstream::open`], which has its own cursor and can be
//! created any number of times, or materialise the whole image with [`Bitstream::data`].

use crate::error::FpgaPrError;
use log::trace;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::fs::FileExt;

/// A random-access readable resource.
///
/// Reads take `&self` and an explicit offset, so any number of independent views can
/// share one resource without fighting over a seek position.
pub trait ReadAt {
    /// Read up to `buf.len()` bytes at `offset`. Returns 0 at end of input.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Total length of the resource in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Fill as much of `buf` as the resource allows, returning the number of bytes read.
    /// Unlike `read_exact`, running out of input is not an error.
    fn read_full_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_at(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl ReadAt for File {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        FileExt::read_at(self, buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        self.metadata().map(|m| m.len())
    }
}

impl ReadAt for [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at(buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }
}

/// Placement of the image inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLayout {
    pub offset: u64,
    pub size: u64,
}

impl BodyLayout {
    /// Locate the body of a container of `file_len` bytes.
    ///
    /// # Returns: `Result<BodyLayout, FpgaPrError>`
    /// * `Ok(BodyLayout)` - `offset = header_len + metadata_len`, `size = file_len - offset`
    /// * `Err(FpgaPrError::CorruptLayout)` - The file is shorter than header plus metadata
    pub fn compute(file_len: u64, header_len: u64, metadata_len: u64) -> Result<Self, FpgaPrError> {
        let offset = header_len + metadata_len;
        let size = file_len
            .checked_sub(offset)
            .ok_or(FpgaPrError::CorruptLayout {
                file_len,
                header_len,
                metadata_len,
            })?;
        Ok(BodyLayout { offset, size })
    }
}

/// Borrowed view of the raw bitstream (RBF) inside a GBS container.
#[derive(Debug)]
pub struct Bitstream<'a, R: ReadAt + ?Sized> {
    source: Option<&'a R>,
    layout: BodyLayout,
}

impl<'a, R: ReadAt + ?Sized> Bitstream<'a, R> {
    pub(crate) fn new(source: Option<&'a R>, layout: BodyLayout) -> Self {
        Bitstream { source, layout }
    }

    /// Size of the image in bytes.
    pub fn size(&self) -> u64 {
        self.layout.size
    }

    /// Byte offset of the image within the container.
    pub fn offset(&self) -> u64 {
        self.layout.offset
    }

    fn source(&self) -> Result<&'a R, FpgaPrError> {
        self.source.ok_or_else(|| {
            FpgaPrError::Internal("the bitstream's container has been closed".to_string())
        })
    }

    /// Open a new reader positioned at the start of the image.
    ///
    /// Each reader keeps its own cursor. Reads run until the underlying resource ends.
    pub fn open(&self) -> Result<BitstreamReader<'a, R>, FpgaPrError> {
        Ok(BitstreamReader {
            source: self.source()?,
            base: self.layout.offset,
            size: self.layout.size,
            pos: 0,
        })
    }

    /// Read the whole image into a buffer of exactly [`Bitstream::size`] bytes.
    ///
    /// # Returns: `Result<Vec<u8>, FpgaPrError>`
    /// * `Ok(Vec<u8>)` - The image
    /// * `Err(FpgaPrError::ShortRead)` - The resource ended before `size` bytes were read
    /// * `Err(FpgaPrError::Read)` - The resource failed to read
    pub fn data(&self) -> Result<Vec<u8>, FpgaPrError> {
        let size = usize::try_from(self.layout.size).map_err(|_| {
            FpgaPrError::Argument(format!(
                "bitstream of {} bytes does not fit in memory",
                self.layout.size
            ))
        })?;
        let mut dat = vec![0u8; size];
        let n = self
            .source()?
            .read_full_at(&mut dat, self.layout.offset)
            .map_err(|e| FpgaPrError::Read {
                what: "bitstream",
                e,
            })?;
        trace!("Read {n} of {size} bitstream bytes");
        if n < size {
            return Err(FpgaPrError::ShortRead {
                what: "bitstream",
                expected: size as u64,
                actual: n as u64,
            });
        }
        Ok(dat)
    }
}

/// Independent `Read + Seek` cursor over a bitstream image.
#[derive(Debug)]
pub struct BitstreamReader<'a, R: ReadAt + ?Sized> {
    source: &'a R,
    base: u64,
    size: u64,
    pos: u64,
}

impl<R: ReadAt + ?Sized> Read for BitstreamReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(offset) = self.base.checked_add(self.pos) else {
            return Ok(0);
        };
        let n = self.source.read_at(buf, offset)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: ReadAt + ?Sized> Seek for BitstreamReader<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
            SeekFrom::End(d) => self.size.checked_add_signed(d),
        };
        match new {
            Some(p) => {
                self.pos = p;
                Ok(p)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
