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

use crate::common::{METADATA, aocx_bytes, gbs_bytes, logger, write_file};
use fpgapr::config::system_config::{bitstream_install_dir, set_bitstream_install_dir};
use fpgapr::install::{install_bitstream, install_bitstream_default, install_path};
use googletest::prelude::*;
use rstest::*;
use std::fs;
use std::path::{Path, PathBuf};

#[gtest]
#[rstest]
#[case::gbs("ABCD", "1234", ".gbs", "/srv/intel.com/fpga/ABCD/1234.gbs")]
#[case::aocx("ABCD", "f1e2d3", ".aocx", "/srv/intel.com/fpga/ABCD/f1e2d3.aocx")]
#[case::no_extension("ABCD", "1234", "", "/srv/intel.com/fpga/ABCD/1234")]
fn install_path_cases(
    #[case] interface_uuid: &str,
    #[case] id: &str,
    #[case] extension: &str,
    #[case] expected: &str,
) {
    let base = Path::new("/srv/intel.com/fpga");
    let first = install_path(base, interface_uuid, id, extension).unwrap();
    let second = install_path(base, interface_uuid, id, extension).unwrap();
    expect_that!(&first, eq(&PathBuf::from(expected)));
    expect_that!(&first, eq(&second));
}

#[gtest]
#[rstest]
#[case::absolute_interface("/etc", "1234")]
#[case::parent_interface("..", "1234")]
#[case::nested_interface("ABCD/../../..", "1234")]
#[case::absolute_id("ABCD", "/tmp/evil")]
#[case::parent_id("ABCD", "../../evil")]
fn install_path_rejects_escaping_names(#[case] interface_uuid: &str, #[case] id: &str) {
    expect_that!(
        &install_path(Path::new("/srv/intel.com/fpga"), interface_uuid, id, ".gbs"),
        err(displays_as(contains_substring("FpgaPrError::Argument:")))
    );
}

fn metadata_with(interface_uuid: &str, accelerator_type_uuid: &str) -> String {
    serde_json::json!({
        "version": 1,
        "afu-image": {
            "interface-uuid": interface_uuid,
            "accelerator-clusters": [
                {"accelerator-type-uuid": accelerator_type_uuid, "name": "x", "total-contexts": 1}
            ]
        }
    })
    .to_string()
}

#[gtest]
#[rstest]
fn crafted_metadata_cannot_install_outside_base(#[from(logger)] _logger: ()) {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let elsewhere_uuid = elsewhere.path().to_string_lossy().into_owned();
    for (name, metadata) in [
        ("absolute.gbs", metadata_with(&elsewhere_uuid, "x")),
        ("parent.gbs", metadata_with("..", "x")),
        ("id.gbs", metadata_with("ABCD", "../../x")),
    ] {
        let source = write_file(src_dir.path(), name, &gbs_bytes(&metadata, 4));
        expect_that!(
            &install_bitstream(&source, base.path(), false),
            err(displays_as(contains_substring("FpgaPrError::Argument:")))
        );
    }
    expect_that!(fs::read_dir(base.path()).unwrap().count(), eq(0));
    expect_that!(fs::read_dir(elsewhere.path()).unwrap().count(), eq(0));
    expect_that!(
        fs::exists(base.path().parent().unwrap().join("x.gbs")).unwrap(),
        eq(false)
    );
}

#[gtest]
#[rstest]
fn install_copies_and_overwrites(#[from(logger)] _logger: ()) {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let bytes = gbs_bytes(METADATA, 64);
    let source = write_file(src_dir.path(), "nlb.gbs", &bytes);
    let destination = base.path().join("ABCD").join("1234.gbs");
    fs::create_dir_all(destination.parent().unwrap()).unwrap();
    fs::write(&destination, b"stale contents that are longer than nothing").unwrap();

    let outcome = install_bitstream(&source, base.path(), false).unwrap();
    expect_that!(&outcome.destination, eq(&destination));
    expect_that!(outcome.copied, eq(true));
    expect_that!(&fs::read(&destination).unwrap(), eq(&bytes));
}

#[gtest]
fn install_creates_missing_directories() {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("not").join("yet");
    let source = write_file(
        src_dir.path(),
        "kernel.aocx",
        &aocx_bytes(Some(&gbs_bytes(METADATA, 3))),
    );
    let outcome = install_bitstream(&source, &root, false).unwrap();
    expect_that!(
        &outcome.destination,
        eq(&root.join("ABCD").join("f1e2d3c4b5a6.aocx"))
    );
    assert!(outcome.destination.is_file());
}

#[gtest]
fn dry_run_touches_nothing() {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let source = write_file(src_dir.path(), "nlb.gbs", &gbs_bytes(METADATA, 1));
    let outcome = install_bitstream(&source, base.path(), true).unwrap();
    expect_that!(outcome.copied, eq(false));
    expect_that!(
        &outcome.destination,
        eq(&base.path().join("ABCD").join("1234.gbs"))
    );
    assert!(!base.path().join("ABCD").exists());
}

#[gtest]
fn install_rejects_unknown_files() {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let source = write_file(src_dir.path(), "readme.md", b"# not a bitstream");
    expect_that!(
        &install_bitstream(&source, base.path(), false),
        err(displays_as(contains_substring(
            "FpgaPrError::UnsupportedContainerFormat:"
        )))
    );
    let aocx = write_file(src_dir.path(), "bare.aocx", &aocx_bytes(None));
    expect_that!(
        &install_bitstream(&aocx, base.path(), true),
        err(displays_as(contains_substring("FpgaPrError::NoEmbeddedBitstream:")))
    );
}

#[gtest]
fn install_default_uses_configured_dir() {
    let src_dir = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    let source = write_file(src_dir.path(), "nlb.gbs", &gbs_bytes(METADATA, 1));
    let base_dir = base.path().to_string_lossy().into_owned();
    set_bitstream_install_dir(base_dir.clone()).unwrap();
    expect_that!(bitstream_install_dir().unwrap().as_str(), eq(base_dir.as_str()));
    let outcome = install_bitstream_default(&source, true).unwrap();
    expect_that!(
        &outcome.destination,
        eq(&base.path().join("ABCD").join("1234.gbs"))
    );
}
