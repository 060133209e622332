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

use crate::common::{ElfBuilder, METADATA, aocx_bytes, gbs_bytes, gzip, logger, write_file};
use fpgapr::bitstream::aocx::AocxFile;
use fpgapr::error::FpgaPrError;
use googletest::prelude::*;
use rstest::*;

#[gtest]
#[rstest]
fn descriptors_and_embedded_gbs(#[from(logger)] _logger: ()) {
    let gbs = gbs_bytes(METADATA, 100);
    let aocx = AocxFile::from_bytes(&aocx_bytes(Some(&gbs))).unwrap();
    expect_that!(aocx.board.as_str(), eq("pac_a10"));
    expect_that!(aocx.target.as_str(), eq("fpga"));
    expect_that!(aocx.hash.as_str(), eq("f1e2d3c4b5a6"));
    expect_that!(aocx.version.as_str(), eq("18.1.2"));
    expect_that!(aocx.quartus_report.as_str(), eq(""));
    expect_that!(aocx.has_gbs(), eq(true));

    let embedded = aocx.gbs().unwrap();
    expect_that!(embedded.interface_uuid(), eq("ABCD"));
    expect_that!(embedded.accelerator_type_uuid(), eq("1234"));
    expect_that!(embedded.size(), eq(100));
    expect_that!(&embedded.bitstream().data().unwrap(), eq(&gbs[gbs.len() - 100..].to_vec()));
}

#[gtest]
fn every_descriptor_section_is_mapped() {
    let bytes = ElfBuilder::new()
        .section(".acl.autodiscovery", b"ad")
        .section(".acl.autodiscovery.xml", b"<ad/>")
        .section(".acl.board", b"board")
        .section(".acl.board_package", b"/opt/board")
        .section(".acl.board_spec.xml", b"<spec/>")
        .section(".acl.compilation_env", b"env")
        .section(".acl.rand_hash", b"hash")
        .section(".acl.kernel_arg_info.xml", b"<args/>")
        .section(".acl.quartus_input_hash", b"qih")
        .section(".acl.quartus_report", b"report")
        .section(".acl.target", b"target")
        .section(".acl.version", b"ver")
        .section(".acl.unrelated", b"ignored")
        .build();
    let aocx = AocxFile::from_bytes(&bytes).unwrap();
    let fields = [
        (&aocx.auto_discovery, "ad"),
        (&aocx.auto_discovery_xml, "<ad/>"),
        (&aocx.board, "board"),
        (&aocx.board_package, "/opt/board"),
        (&aocx.board_spec_xml, "<spec/>"),
        (&aocx.compilation_environment, "env"),
        (&aocx.hash, "hash"),
        (&aocx.kernel_arg_info_xml, "<args/>"),
        (&aocx.quartus_input_hash, "qih"),
        (&aocx.quartus_report, "report"),
        (&aocx.target, "target"),
        (&aocx.version, "ver"),
    ];
    for (field, expected) in fields {
        expect_that!(field.as_str(), eq(expected));
    }
    expect_that!(aocx.has_gbs(), eq(false));
}

#[gtest]
fn wrapper_without_fpga_bin_has_no_embedded_bitstream() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "descriptors_only.aocx", &aocx_bytes(None));
    let aocx = AocxFile::open(&path).unwrap();
    expect_that!(
        &aocx.gbs(),
        err(displays_as(contains_substring("FpgaPrError::NoEmbeddedBitstream:")))
    );
    expect_that!(
        &aocx.gbs(),
        err(displays_as(contains_substring("descriptors_only.aocx")))
    );
}

#[gtest]
#[rstest]
#[case::no_gbs_gz(
    ElfBuilder::new().section(".acl.something", b"x").build(),
    "FpgaPrError::MissingEmbeddedPayload:"
)]
#[case::fpga_bin_not_elf(b"garbage".to_vec(), "FpgaPrError::Elf:")]
#[case::not_gzip(
    ElfBuilder::new().section(".acl.gbs.gz", b"plain bytes").build(),
    "FpgaPrError::Decompress:"
)]
#[case::gzip_of_non_gbs(
    ElfBuilder::new().section(".acl.gbs.gz", &gzip(b"this is not a gbs file at all")).build(),
    "FpgaPrError::CorruptHeader:"
)]
#[case::truncated_embedded_gbs(
    ElfBuilder::new().section(".acl.gbs.gz", &gzip(&gbs_bytes(METADATA, 0)[..30])).build(),
    "FpgaPrError::ShortRead:"
)]
fn broken_fpga_bin(#[case] fpga_bin: Vec<u8>, #[case] expected: &str) {
    let bytes = ElfBuilder::new()
        .section(".acl.board", b"pac_a10")
        .section(".acl.fpga.bin", &fpga_bin)
        .build();
    let res = AocxFile::from_bytes(&bytes);
    expect_that!(&res, err(displays_as(contains_substring(expected))));
}

#[gtest]
fn embedded_errors_name_the_section() {
    let fpga_bin = ElfBuilder::new()
        .section(".acl.gbs.gz", &gzip(b"0123456789012345678901234567890123456789"))
        .build();
    let bytes = ElfBuilder::new().section(".acl.fpga.bin", &fpga_bin).build();
    match AocxFile::from_bytes(&bytes) {
        Err(FpgaPrError::Embedded { section, source }) => {
            expect_that!(section, eq(".acl.gbs.gz"));
            assert!(matches!(*source, FpgaPrError::CorruptHeader { .. }));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[gtest]
fn not_an_elf_file() {
    expect_that!(
        &AocxFile::from_bytes(b"\x7fELF but not really"),
        err(displays_as(contains_substring("FpgaPrError::Elf:")))
    );
}
