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

use crate::config::config_files::{SystemPaths, system_paths_config_from_file};
use crate::config::{USER_CONFIG_PATH, VENDOR_CONFIG_PATH};
use crate::error::FpgaPrError;
use log::{trace, warn};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

// These are hardcoded backups to prevent crashing and lockups when accessing the config file
// or Mutex values
pub static BITSTREAM_INSTALL_DIR: &str = "/srv/intel.com/fpga";

#[derive(Debug)]
pub struct SystemConfig {
    pub(crate) bitstream_install_dir: Mutex<String>,
}

static CONFIG: OnceLock<Mutex<SystemConfig>> = OnceLock::new();

impl SystemConfig {
    fn bitstream_install_dir(&self) -> Result<String, FpgaPrError> {
        let guard = match self.bitstream_install_dir.try_lock() {
            Ok(guard) => guard,
            Err(e) => {
                return Err(FpgaPrError::Internal(format!(
                    "Failed when locking bitstream_install_dir for read access: {e}"
                )));
            }
        };
        Ok(guard.clone())
    }
}

/// User config overrides vendor config and vendor config overrides hardcoded defaults
fn init_system_config() -> Mutex<SystemConfig> {
    let vendor_config = system_paths_config_from_file(Path::new(VENDOR_CONFIG_PATH))
        .unwrap_or_else(|e| {
            warn!("Using hardcoded paths for vendor config because loading config failed: {e}");
            SystemPaths::default()
        });
    let user_config = system_paths_config_from_file(Path::new(USER_CONFIG_PATH))
        .unwrap_or_else(|e| {
            warn!("Using hardcoded paths for user config because loading config failed: {e}");
            SystemPaths::default()
        });
    trace!("Merging user_config: {user_config:?} with vendor_config {vendor_config:?}");
    let merged = user_config.merge(vendor_config);
    let ret = Mutex::new(merged.into());
    trace!("Resulting config: {ret:?}");
    ret
}

pub fn system_config() -> &'static Mutex<SystemConfig> {
    CONFIG.get_or_init(init_system_config)
}

pub fn system_config_guard() -> Result<MutexGuard<'static, SystemConfig>, FpgaPrError> {
    match system_config().try_lock() {
        Ok(guard) => Ok(guard),
        Err(e) => Err(FpgaPrError::Internal(format!(
            "Failed when locking config for read access: {e}"
        ))),
    }
}

/// Base directory under which bitstreams are installed, see [`crate::install`].
pub fn bitstream_install_dir() -> Result<String, FpgaPrError> {
    let guard = system_config_guard()?;
    guard.bitstream_install_dir()
}

pub fn set_bitstream_install_dir(dir: String) -> Result<(), FpgaPrError> {
    let config = system_config_guard()?;

    *config.bitstream_install_dir.lock().map_err(|e| {
        FpgaPrError::Internal(format!("Failed to lock bitstream_install_dir: {e}"))
    })? = dir;

    Ok(())
}
