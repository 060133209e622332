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

//! fpgapr parses FPGA bitstream containers and performs partial reconfiguration (PR) of
//! FPGA regions through the Linux DFL and intel-fpga drivers.
//!
//! # Overview
//!
//! * [`bitstream`] - readers for GBS files and AOCX files, which wrap a GBS in an ELF image
//! * [`devices`] - FME and port device nodes, their ioctl ABI and informational reports
//! * [`pr`] - programs a bitstream through an FME, with a dry run mode
//! * [`install`] - names and copies bitstreams into the install tree
//! * [`config`] - TOML configuration of host paths
//!
//! All operations are synchronous. Device nodes are opened for exclusive use and callers are
//! expected to serialise access to a physical device.
//!
//! # Logging
//!
//! fpgapr logs through the [`log`] facade and leaves the choice of logger to the embedding
//! program, e.g. `env_logger::Builder::from_env(Env::default().default_filter_or("info"))`.

pub mod bitstream;
pub mod config;
pub mod devices;
pub mod error;
pub mod install;
pub mod pr;
pub mod system_io;
