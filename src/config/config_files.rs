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

use crate::config::system_config;
use crate::error::FpgaPrError;
use crate::system_io::fs_read;
use log::trace;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;

/// This is the top level struct which holds all sections
#[derive(Debug, Deserialize)]
pub(crate) struct TomlConfig {
    system_paths: Option<SystemPaths>,
}

/// This is the "system_paths" section struct
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SystemPaths {
    pub(crate) bitstream_install_dir: Option<String>,
}

impl From<SystemPaths> for system_config::SystemConfig {
    fn from(value: SystemPaths) -> Self {
        trace!("Creating Config (with Mutex) from {value:?}");
        system_config::SystemConfig {
            bitstream_install_dir: Mutex::new(value.bitstream_install_dir.unwrap_or_else(|| {
                trace!("No bitstream_install_dir provided. Using hardcoded value.");
                system_config::BITSTREAM_INSTALL_DIR.to_string()
            })),
        }
    }
}

impl SystemPaths {
    pub(crate) fn merge(self, fallback: SystemPaths) -> SystemPaths {
        SystemPaths {
            bitstream_install_dir: self.bitstream_install_dir.or(fallback.bitstream_install_dir),
        }
    }
}

fn toml_str_to_config(toml_string: &str) -> Result<TomlConfig, FpgaPrError> {
    toml::from_str(toml_string).map_err(|e| FpgaPrError::TomlDe {
        toml_string: toml_string.into(),
        e,
    })
}

pub(crate) fn system_paths_from_str(toml_string: &str) -> Result<SystemPaths, FpgaPrError> {
    match toml_str_to_config(toml_string)?.system_paths {
        Some(system_paths) => Ok(system_paths),
        None => Err(FpgaPrError::Internal(
            "config file did not contain a `[system_paths]` section.".to_string(),
        )),
    }
}

pub(crate) fn system_paths_config_from_file(file_path: &Path) -> Result<SystemPaths, FpgaPrError> {
    if !file_path.is_file() {
        return Err(FpgaPrError::Internal(format!(
            "Config file not found in {file_path:?}"
        )));
    }
    system_paths_from_str(&fs_read(file_path)?)
}
