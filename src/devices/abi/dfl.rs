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

//! Argument records of the upstream DFL driver, `<uapi/linux/fpga-dfl.h>`.
//!
//! Every record starts with `argsz`, the record size the driver validates, and `flags`,
//! which must be zero on input. The constructors zero every field and set `argsz`.

use std::mem::size_of;

/// `struct dfl_fpga_port_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortInfo {
    pub argsz: u32,
    pub flags: u32,
    pub num_regions: u32,
    pub num_umsgs: u32,
}

/// `struct dfl_fpga_port_region_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortRegionInfo {
    pub argsz: u32,
    pub flags: u32,
    pub index: u32,
    pub padding: u32,
    pub size: u64,
    pub offset: u64,
}

/// `struct dfl_fpga_port_dma_map`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortDmaMap {
    pub argsz: u32,
    pub flags: u32,
    pub user_addr: u64,
    pub length: u64,
    pub iova: u64,
}

/// `struct dfl_fpga_port_dma_unmap`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortDmaUnmap {
    pub argsz: u32,
    pub flags: u32,
    pub iova: u64,
}

/// `struct dfl_fpga_fme_port_pr`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmePortPr {
    pub argsz: u32,
    pub flags: u32,
    pub port_id: u32,
    pub buffer_size: u32,
    pub buffer_address: u64,
}

const _: () = assert!(size_of::<PortInfo>() == 16);
const _: () = assert!(size_of::<PortRegionInfo>() == 32);
const _: () = assert!(size_of::<PortDmaMap>() == 32);
const _: () = assert!(size_of::<PortDmaUnmap>() == 16);
const _: () = assert!(size_of::<FmePortPr>() == 24);

impl PortInfo {
    pub fn new() -> Self {
        PortInfo {
            argsz: size_of::<Self>() as u32,
            ..Default::default()
        }
    }
}

impl PortRegionInfo {
    pub fn new(index: u32) -> Self {
        PortRegionInfo {
            argsz: size_of::<Self>() as u32,
            index,
            ..Default::default()
        }
    }
}

impl PortDmaMap {
    pub fn new(user_addr: u64, length: u64) -> Self {
        PortDmaMap {
            argsz: size_of::<Self>() as u32,
            user_addr,
            length,
            ..Default::default()
        }
    }
}

impl PortDmaUnmap {
    pub fn new(iova: u64) -> Self {
        PortDmaUnmap {
            argsz: size_of::<Self>() as u32,
            iova,
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
