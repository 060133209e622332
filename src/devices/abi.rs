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

//! ioctl opcodes and argument record layouts of the supported FPGA kernel drivers.
//!
//! Two driver generations are supported:
//!
//! * [`DFL`] - the upstream Device Feature List driver (`<uapi/linux/fpga-dfl.h>`),
//!   nodes `/dev/dfl-fme.N` and `/dev/dfl-port.N`.
//! * [`INTEL_FPGA`] - the legacy out-of-tree OPAE driver (`<linux/intel-fpga.h>`),
//!   nodes `/dev/intel-fpga-fme.N` and `/dev/intel-fpga-port.N`.
//!
//! Both drivers share the ioctl magic `0xB6` and request numbers, but the argument records
//! of `PORT_GET_INFO` and `FME_PORT_PR` differ in size. The records live in [`dfl`] and
//! [`intel_fpga`]; nothing outside this module hardcodes an opcode or a layout.

pub mod dfl;
pub mod intel_fpga;

/// Driver generation a device node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverVariant {
    /// Upstream DFL driver.
    Dfl,
    /// Legacy intel-fpga driver.
    IntelFpga,
}

/// ioctl request numbers of one driver generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoctlTable {
    pub get_api_version: u32,
    pub check_extension: u32,
    pub port_reset: u32,
    pub port_get_info: u32,
    pub port_get_region_info: u32,
    pub port_dma_map: u32,
    pub port_dma_unmap: u32,
    pub fme_port_pr: u32,
}

/// Everything needed to talk to one driver generation.
#[derive(Debug, PartialEq, Eq)]
pub struct DriverAbi {
    pub variant: DriverVariant,
    pub name: &'static str,
    pub fme_prefix: &'static str,
    pub port_prefix: &'static str,
    pub ioctls: IoctlTable,
}

pub const FPGA_MAGIC: u32 = 0xB6;
const FPGA_BASE: u32 = 0;
const PORT_BASE: u32 = 0x40;
const FME_BASE: u32 = 0x80;

/// `_IO(FPGA_MAGIC, nr)`. The records are passed by pointer but the drivers register their
/// requests without size or direction bits.
const fn io(nr: u32) -> u32 {
    (FPGA_MAGIC << 8) | nr
}

const SHARED_IOCTLS: IoctlTable = IoctlTable {
    get_api_version: io(FPGA_BASE),
    check_extension: io(FPGA_BASE + 1),
    port_reset: io(PORT_BASE),
    port_get_info: io(PORT_BASE + 1),
    port_get_region_info: io(PORT_BASE + 2),
    port_dma_map: io(PORT_BASE + 3),
    port_dma_unmap: io(PORT_BASE + 4),
    fme_port_pr: io(FME_BASE),
};

pub static DFL: DriverAbi = DriverAbi {
    variant: DriverVariant::Dfl,
    name: "dfl",
    fme_prefix: "/dev/dfl-fme.",
    port_prefix: "/dev/dfl-port.",
    ioctls: SHARED_IOCTLS,
};

pub static INTEL_FPGA: DriverAbi = DriverAbi {
    variant: DriverVariant::IntelFpga,
    name: "intel-fpga",
    fme_prefix: "/dev/intel-fpga-fme.",
    port_prefix: "/dev/intel-fpga-port.",
    ioctls: SHARED_IOCTLS,
};

/// All supported drivers, in lookup order.
pub static DRIVERS: [&DriverAbi; 2] = [&DFL, &INTEL_FPGA];

/// Version reported by `GET_API_VERSION` on both drivers.
pub const FPGA_API_VERSION: i32 = 0;

// Region flags and indices of PORT_GET_REGION_INFO.
pub const PORT_REGION_FLAG_READ: u32 = 1 << 0;
pub const PORT_REGION_FLAG_WRITE: u32 = 1 << 1;
pub const PORT_REGION_FLAG_MMAP: u32 = 1 << 2;
pub const PORT_REGION_INDEX_AFU: u32 = 0;
pub const PORT_REGION_INDEX_STP: u32 = 1;

impl DriverAbi {
    pub fn for_variant(variant: DriverVariant) -> &'static DriverAbi {
        match variant {
            DriverVariant::Dfl => &DFL,
            DriverVariant::IntelFpga => &INTEL_FPGA,
        }
    }
}
