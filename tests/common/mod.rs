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

//! Builders for test containers and a recording FME.

use flate2::Compression;
use flate2::write::GzEncoder;
use fpgapr::bitstream::gbs::build_container;
use fpgapr::devices::abi::DriverVariant;
use fpgapr::devices::device::{FpgaDevice, FpgaFme};
use fpgapr::error::FpgaPrError;
use rstest::*;
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};

pub static METADATA: &str = r#"{"version":1,"afu-image":{"interface-uuid":"ABCD","accelerator-clusters":[{"accelerator-type-uuid":"1234","name":"x","total-contexts":1}]}}"#;

pub static NLB_METADATA: &str = r#"{
    "version": 1,
    "platform-name": "DCP",
    "afu-image": {
        "magic-no": 488605312,
        "interface-uuid": "69528db6-eb31-577a-8c36-68f9faa081f6",
        "afu-top-interface": {"class": "ccip_std_afu", "module-ports": []},
        "power": 0,
        "clock-frequency-high": "auto",
        "accelerator-clusters": [
            {"accelerator-type-uuid": "d8424dc4-a4a3-c413-f89e-433683f9040b", "name": "nlb_400", "total-contexts": 1}
        ]
    }
}"#;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[fixture]
pub fn logger() {
    init_logger();
}

/// A GBS file with the given metadata and `body_len` bytes of patterned body.
pub fn gbs_bytes(metadata: &str, body_len: usize) -> Vec<u8> {
    let body: Vec<u8> = (0..body_len).map(|i| (i % 251) as u8).collect();
    build_container(metadata.as_bytes(), &body).unwrap()
}

/// A GBS file with an arbitrary header, for feeding bad values to the reader.
pub fn raw_gbs_bytes(guid1: u64, guid2: u64, metadata_length: u32, rest: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&guid1.to_le_bytes());
    out.extend_from_slice(&guid2.to_le_bytes());
    out.extend_from_slice(&metadata_length.to_le_bytes());
    out.extend_from_slice(rest);
    out
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const ELF64_HEADER_SIZE: usize = 64;
const ELF64_SHDR_SIZE: usize = 64;

/// Minimal little-endian ELF64 relocatable image holding named PROGBITS sections.
#[derive(Default)]
pub struct ElfBuilder {
    sections: Vec<(String, Vec<u8>)>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: &str, data: &[u8]) -> Self {
        self.sections.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _) in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let mut out = vec![0u8; ELF64_HEADER_SIZE];
        let mut data_offsets = Vec::new();
        for (_, data) in &self.sections {
            data_offsets.push(out.len() as u64);
            out.extend_from_slice(data);
        }
        let shstrtab_offset = out.len() as u64;
        out.extend_from_slice(&shstrtab);
        while out.len() % 8 != 0 {
            out.push(0);
        }

        let shoff = out.len() as u64;
        out.extend_from_slice(&[0u8; ELF64_SHDR_SIZE]);
        for (i, (_, data)) in self.sections.iter().enumerate() {
            push_shdr(
                &mut out,
                name_offsets[i],
                SHT_PROGBITS,
                data_offsets[i],
                data.len() as u64,
            );
        }
        push_shdr(
            &mut out,
            shstrtab_name,
            SHT_STRTAB,
            shstrtab_offset,
            shstrtab.len() as u64,
        );
        let shnum = (self.sections.len() + 2) as u16;

        out[0..4].copy_from_slice(b"\x7fELF");
        out[4] = 2; // ELFCLASS64
        out[5] = 1; // ELFDATA2LSB
        out[6] = 1; // EV_CURRENT
        out[16..18].copy_from_slice(&1u16.to_le_bytes()); // ET_REL
        out[18..20].copy_from_slice(&62u16.to_le_bytes()); // EM_X86_64
        out[20..24].copy_from_slice(&1u32.to_le_bytes());
        out[40..48].copy_from_slice(&shoff.to_le_bytes());
        out[52..54].copy_from_slice(&(ELF64_HEADER_SIZE as u16).to_le_bytes());
        out[54..56].copy_from_slice(&56u16.to_le_bytes());
        out[58..60].copy_from_slice(&(ELF64_SHDR_SIZE as u16).to_le_bytes());
        out[60..62].copy_from_slice(&shnum.to_le_bytes());
        out[62..64].copy_from_slice(&(shnum - 1).to_le_bytes());
        out
    }
}

fn push_shdr(out: &mut Vec<u8>, name: u32, sh_type: u32, offset: u64, size: u64) {
    out.extend_from_slice(&name.to_le_bytes());
    out.extend_from_slice(&sh_type.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes()); // flags
    out.extend_from_slice(&0u64.to_le_bytes()); // addr
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // link
    out.extend_from_slice(&0u32.to_le_bytes()); // info
    out.extend_from_slice(&1u64.to_le_bytes()); // addralign
    out.extend_from_slice(&0u64.to_le_bytes()); // entsize
}

/// An AOCX file with typical descriptors and `gbs` embedded as `.acl.fpga.bin/.acl.gbs.gz`.
pub fn aocx_bytes(gbs: Option<&[u8]>) -> Vec<u8> {
    let mut builder = ElfBuilder::new()
        .section(".acl.board", b"pac_a10")
        .section(".acl.target", b"fpga")
        .section(".acl.rand_hash", b"f1e2d3c4b5a6")
        .section(".acl.version", b"18.1.2");
    if let Some(gbs) = gbs {
        let fpga_bin = ElfBuilder::new()
            .section(".acl.gbs.gz", &gzip(gbs))
            .build();
        builder = builder.section(".acl.fpga.bin", &fpga_bin);
    }
    builder.build()
}

/// FME that records every call instead of talking to a driver.
pub struct MockFme {
    pub calls: RefCell<Vec<String>>,
    pub pr_images: RefCell<Vec<usize>>,
    pub pr_result: i32,
    api_version: i32,
    path: PathBuf,
}

impl MockFme {
    pub fn new(pr_result: i32) -> Self {
        MockFme {
            calls: RefCell::new(Vec::new()),
            pr_images: RefCell::new(Vec::new()),
            pr_result,
            api_version: 0,
            path: PathBuf::from("/dev/dfl-fme.0"),
        }
    }

    pub fn with_api_version(mut self, api_version: i32) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl FpgaDevice for MockFme {
    fn path(&self) -> &Path {
        &self.path
    }

    fn driver(&self) -> DriverVariant {
        DriverVariant::Dfl
    }

    fn get_api_version(&self) -> Result<i32, FpgaPrError> {
        self.calls.borrow_mut().push("get_api_version".to_string());
        Ok(self.api_version)
    }

    fn check_extension(&self, extension: u32) -> Result<i32, FpgaPrError> {
        self.calls
            .borrow_mut()
            .push(format!("check_extension({extension})"));
        Ok(0)
    }

    fn close(&mut self) {
        self.calls.borrow_mut().push("close".to_string());
    }
}

impl FpgaFme for MockFme {
    fn port_pr(&self, port_id: u32, image: &[u8]) -> Result<i32, FpgaPrError> {
        self.calls.borrow_mut().push(format!("port_pr({port_id})"));
        self.pr_images.borrow_mut().push(image.len());
        if self.pr_result < 0 {
            return Err(FpgaPrError::HardwareOperationFailed {
                op: "FMEPortPR",
                device: self.path.clone(),
                code: -self.pr_result,
                e: std::io::Error::from_raw_os_error(-self.pr_result),
            });
        }
        Ok(self.pr_result)
    }
}
