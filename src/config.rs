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

//! Configuration for fpgapr.
//!
//! Paths that depend on the host installation are read from TOML files, with the user
//! config (`/etc/fpgapr/config.toml`) overriding the vendor config
//! (`/usr/lib/fpgapr/config.toml`), which in turn overrides the hardcoded defaults in
//! [`system_config`].
//!
//! ```toml
//! [system_paths]
//! bitstream_install_dir = "/srv/intel.com/fpga"
//! ```

pub mod config_files;
pub mod system_config;

/// The vendor-provided config file. Overridden by [`USER_CONFIG_PATH`].
pub static VENDOR_CONFIG_PATH: &str = "/usr/lib/fpgapr/config.toml";

/// The administrator's config file.
pub static USER_CONFIG_PATH: &str = "/etc/fpgapr/config.toml";
