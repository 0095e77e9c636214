//! Integration tests for the `annotate` subcommand.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use common::{sample_pdf, write_file};

fn cmd() -> Command {
    Command::cargo_bin("tagbox").unwrap()
}

#[test]
fn single_file_writes_one_record_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(dir.path(), "paper.pdf", &sample_pdf(true));

    cmd()
        .arg("annotate")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pages, 4 regions"));

    let record = dir.path().join("output/annotations/paper_000.xml");
    let xml = fs::read_to_string(record).unwrap();
    assert!(xml.contains("<filename>paper_000.jpeg</filename>"));
    assert!(xml.contains("<width>1275</width>"));
    assert!(xml.contains("<name>table</name>"));
    assert!(xml.contains("<xmin>10</xmin>"));
    assert!(xml.contains("<ymax>70</ymax>"));
    assert_eq!(xml.matches("<name>figure</name>").count(), 3);
}

#[test]
fn pixel_coordinates_and_custom_output() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(dir.path(), "paper.pdf", &sample_pdf(true));
    let out = dir.path().join("dataset");

    cmd()
        .args(["annotate", "--dpi", "72", "--coords", "pixel", "-o"])
        .arg(&out)
        .arg(&pdf)
        .assert()
        .success();

    let xml = fs::read_to_string(out.join("annotations/paper_000.xml")).unwrap();
    assert!(xml.contains("<width>612</width>"));
    // Table at y 20..70 flips to 722..772 from the top.
    assert!(xml.contains("<ymin>722</ymin>"));
    assert!(xml.contains("<ymax>772</ymax>"));
}

#[test]
fn json_format_writes_one_file_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(dir.path(), "paper.pdf", &sample_pdf(true));

    cmd()
        .args(["annotate", "--format", "json"])
        .arg(&pdf)
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("output/annotations/paper.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["source"], "paper");
    assert_eq!(value["page_count"], 1);
    assert_eq!(value["pages"][0]["annotations"][0]["category"], "table");
    assert_eq!(value["pages"][0]["annotations"].as_array().unwrap().len(), 4);
}

#[test]
fn directory_batch_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.pdf", &sample_pdf(true));
    write_file(dir.path(), "b.pdf", b"not a pdf at all");
    write_file(dir.path(), "c.pdf", &sample_pdf(false));
    write_file(dir.path(), "readme.txt", b"ignored");

    cmd()
        .arg("annotate")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("b.pdf"))
        .stderr(predicate::str::contains("1 of 3 documents failed"));

    let annotations = dir.path().join("output/annotations");
    assert!(annotations.join("a_000.xml").exists());
    assert!(annotations.join("c_000.xml").exists());
    assert!(!annotations.join("b_000.xml").exists());

    let untagged = fs::read_to_string(annotations.join("c_000.xml")).unwrap();
    assert_eq!(untagged.matches("<object>").count(), 2);
}

#[test]
fn out_of_range_pages_fail_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(dir.path(), "paper.pdf", &sample_pdf(true));

    cmd()
        .args(["annotate", "--pages", "3"])
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds"));
}

#[test]
fn missing_input_fails() {
    cmd()
        .args(["annotate", "/nonexistent/tagbox/input.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input not found"));
}

#[test]
fn empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .arg("annotate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PDF files found"));
}
