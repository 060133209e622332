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

//! Argument records of the legacy intel-fpga driver, `<linux/intel-fpga.h>`.
//!
//! Port region and DMA records are identical to the DFL ones. Port info carries two
//! extra fields and the PR record returns a status word.

use std::mem::size_of;

pub use super::dfl::{PortDmaMap, PortDmaUnmap, PortRegionInfo};

/// `struct fpga_port_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortInfo {
    pub argsz: u32,
    pub flags: u32,
    pub capability: u32,
    pub num_regions: u32,
    pub num_umsgs: u32,
    pub num_uafu_irqs: u32,
}

/// `struct fpga_fme_port_pr`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmePortPr {
    pub argsz: u32,
    pub flags: u32,
    pub port_id: u32,
    pub buffer_size: u32,
    pub buffer_address: u64,
    /// Output: PR error status, zero on success.
    pub status: u64,
}

const _: () = assert!(size_of::<PortInfo>() == 24);
const _: () = assert!(size_of::<FmePortPr>() == 32);

impl PortInfo {
    pub fn new() -> Self {
        PortInfo {
            argsz: size_of::<Self>() as u32,
            ..Default::default()
        }
    }
}

impl FmePortPr {
    pub fn new(port_id: u32, buffer_address: u64, buffer_size: u32) -> Self {
        FmePortPr {
            argsz: size_of::<Self>() as u32,
            port_id,
            buffer_size,
            buffer_address,
            ..Default::default()
        }
    }
}
