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

//! Partial reconfiguration of an FPGA region.
//!
//! A PR run goes through these steps in order and never retries:
//!
//! ```text
//! open FME -> open bitstream -> read image -> dry run? stop : PORT_PR(0, image) -> close
//! ```
//!
//! The image is always programmed into port 0 of the FME.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgapr::pr::{PrOutcome, do_pr};
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgapr::error::FpgaPrError> {
//! // Validate everything without touching the hardware first.
//! do_pr(Path::new("/dev/dfl-fme.0"), Path::new("nlb_mode_3.gbs"), true)?;
//! if let PrOutcome::Programmed { result } =
//!     do_pr(Path::new("/dev/dfl-fme.0"), Path::new("nlb_mode_3.gbs"), false)?
//! {
//!     println!("PR returned {result}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::bitstream::open_bitstream;
use crate::devices::device::{FpgaDevice, FpgaFme};
use crate::devices::open_fme;
use crate::error::FpgaPrError;
use log::info;
use std::path::Path;

/// Port every image is programmed into. One port per FME is assumed.
pub const PR_PORT_ID: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrOutcome {
    /// The image was read and checked but not programmed.
    DryRun { image_size: u64 },
    /// The driver's return value for the PR request.
    Programmed { result: i32 },
}

/// Program `bitstream` into the FME node at `fme_path`.
///
/// The FME is opened first and closed on every exit path.
///
/// # Arguments
///
/// * `fme_path` - An FME node, e.g. `/dev/dfl-fme.0` or `/dev/intel-fpga-fme.0`
/// * `bitstream` - A GBS or AOCX file
/// * `dry_run` - Stop after reading the image
///
/// # Returns: `Result<PrOutcome, FpgaPrError>`
/// * `Ok(PrOutcome)` - See [`program_fme`]
/// * `Err(FpgaPrError::UnknownDeviceKind)` - `fme_path` is not an FME node
/// * `Err(FpgaPrError::IOOpen)` - The FME could not be opened
/// * `Err(..)` - Any error from [`program_fme`]
pub fn do_pr(fme_path: &Path, bitstream: &Path, dry_run: bool) -> Result<PrOutcome, FpgaPrError> {
    info!("Trying to program {bitstream:?} to port {PR_PORT_ID} of {fme_path:?}");
    let mut fme = open_fme(fme_path)?;
    let outcome = program_fme(&fme, bitstream, dry_run);
    fme.close();
    outcome
}

/// Program `bitstream` through an already open FME.
///
/// No call reaches `fme` before the image has been read in full, and none at all in a dry
/// run.
///
/// # Returns: `Result<PrOutcome, FpgaPrError>`
/// * `Ok(PrOutcome::DryRun)` - `dry_run` was set and the image is valid
/// * `Ok(PrOutcome::Programmed)` - PR was issued; `result` is the driver's answer
/// * `Err(FpgaPrError::EmptyBitstream)` - The container carries no image
/// * `Err(FpgaPrError::Argument)` - The image is too large for the PR request
/// * `Err(FpgaPrError::HardwareOperationFailed)` - The driver rejected the request
pub fn program_fme(
    fme: &dyn FpgaFme,
    bitstream: &Path,
    dry_run: bool,
) -> Result<PrOutcome, FpgaPrError> {
    let mut file = open_bitstream(bitstream)?;
    let image = file.image();
    file.close();
    let image = image?;
    let image_size = image.len() as u64;
    if u32::try_from(image_size).is_err() {
        return Err(FpgaPrError::Argument(format!(
            "bitstream of {image_size} bytes exceeds the 32-bit PR buffer size"
        )));
    }
    if dry_run {
        info!("Dry run: skipping programming of {image_size} bytes");
        return Ok(PrOutcome::DryRun { image_size });
    }
    info!("{:?} reports API version {}", fme.path(), fme.get_api_version()?);
    let result = fme.port_pr(PR_PORT_ID, &image)?;
    info!("PR of {bitstream:?} returned {result}");
    Ok(PrOutcome::Programmed { result })
}
