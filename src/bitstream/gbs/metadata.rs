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

//! JSON metadata carried between the GBS header and the bitstream body.
//!
//! Decoding is forward compatible: unknown keys are ignored and absent keys take
//! their default (empty string, zero, empty list).

use crate::bitstream::gbs::body::ReadAt;
use crate::bitstream::gbs::header::{BitstreamHeader, FILE_HEADER_LENGTH};
use crate::error::FpgaPrError;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BitstreamMetadata {
    pub version: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub platform_name: String,
    pub afu_image: AfuImage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AfuImage {
    #[serde(skip_serializing_if = "is_zero")]
    pub magic_no: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interface_uuid: String,
    pub afu_top_interface: AfuTopInterface,
    pub power: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_frequency_high: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_frequency_low: Option<serde_json::Value>,
    pub accelerator_clusters: Vec<AcceleratorCluster>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AfuTopInterface {
    pub class: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub module_ports: Vec<ModulePort>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulePort {
    pub params: ModulePortParams,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulePortParams {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clock: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AcceleratorCluster {
    pub accelerator_type_uuid: String,
    pub name: String,
    pub total_contexts: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl BitstreamMetadata {
    /// Decode the first JSON value in `bytes`. Anything after it is ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, FpgaPrError> {
        let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Self>();
        match values.next() {
            Some(Ok(metadata)) => Ok(metadata),
            Some(Err(e)) => Err(FpgaPrError::MetadataParseError(e.to_string())),
            None => Err(FpgaPrError::MetadataParseError(
                "metadata holds no JSON value".to_string(),
            )),
        }
    }

    /// UUID of the FPGA interface (shell) this image targets.
    pub fn interface_uuid(&self) -> &str {
        &self.afu_image.interface_uuid
    }

    /// Accelerator type UUID of the first accelerator cluster, or `""` if there is none.
    pub fn accelerator_type_uuid(&self) -> &str {
        self.afu_image
            .accelerator_clusters
            .first()
            .map_or("", |c| c.accelerator_type_uuid.as_str())
    }
}

/// Read the metadata window announced by a validated `header` and decode it.
///
/// Returns the raw bytes alongside the decoded record so the container can be written
/// back unchanged.
pub fn read_metadata<R: ReadAt + ?Sized>(
    source: &R,
    header: &BitstreamHeader,
) -> Result<(BitstreamMetadata, Vec<u8>), FpgaPrError> {
    // Length is bounded to [1, 4096) before this allocation.
    header.validate_metadata_length()?;
    let mut raw = vec![0u8; header.metadata_length as usize];
    let n = source
        .read_full_at(&mut raw, FILE_HEADER_LENGTH)
        .map_err(|e| FpgaPrError::Read {
            what: "metadata",
            e,
        })?;
    if n < raw.len() {
        return Err(FpgaPrError::ShortRead {
            what: "metadata",
            expected: raw.len() as u64,
            actual: n as u64,
        });
    }
    let metadata = BitstreamMetadata::decode(&raw)?;
    debug!(
        "GBS metadata: version {}, interface {:?}, accelerator {:?}",
        metadata.version,
        metadata.interface_uuid(),
        metadata.accelerator_type_uuid()
    );
    Ok((metadata, raw))
}
