//! Integration tests for group processing
//!
//! Tests the batch layer across different scenarios:
//! - Multi-file groups merged into shared epoch-aligned buckets
//! - Corrupt or truncated siblings skipped without aborting the group
//! - Empty groups reported as no data
//! - Output directory creation and CSV row format

use dlf_parser::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 2023-11-14T22:13:20Z
const START_SECS: u64 = 1_700_000_000;

fn write_channel(path: &Path, start_secs: u64, period_ms: u32, values: &[f64], declared: u32) {
    let header = RawHeader {
        title: "Outlet temperature".to_string(),
        id: "TT-1".to_string(),
        eng_units: "degC".to_string(),
        sample_period: period_ms,
        start_time: FILETIME_UNIX_OFFSET + start_secs * TICKS_PER_SECOND,
        data_length: declared,
        ..RawHeader::default()
    };
    let mut data = header.encode().to_vec();
    for v in values {
        data.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, data).expect("Failed to write channel file");
}

fn group_dir(temp_dir: &TempDir, name: &str) -> PathBuf {
    let dir = temp_dir.path().join(name);
    fs::create_dir_all(&dir).expect("Failed to create group folder");
    dir
}

fn options(output_dir: &Path, bucket: BucketWidth) -> BatchOptions {
    BatchOptions {
        export: ExportOptions {
            output_dir: Some(output_dir.to_path_buf()),
            bucket,
            local_time: false,
        },
        workers: 3,
    }
}

#[test]
fn test_group_merges_files_into_shared_buckets() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_UNIT01");

    // 10 s period, buckets of 20 s: two samples per bucket per file
    write_channel(&group.join("chan.001"), START_SECS, 10_000, &[1.0, 3.0, 5.0, 7.0], 4);
    write_channel(&group.join("chan.002"), START_SECS, 10_000, &[3.0, 5.0], 2);

    let out = temp_dir.path().join("out");
    let report = process_group(&group, &options(&out, BucketWidth::Seconds20), &CancelFlag::new())
        .expect("Group processing should succeed");

    assert_eq!(report.data_files, 2);
    assert_eq!(report.decoded_files(), 2);
    assert_eq!(report.total_samples, 6);
    let csv_path = out.join("TR2_UNIT01.csv");
    assert_eq!(
        report.outcome,
        GroupOutcome::Exported {
            csv_path: Some(csv_path.clone()),
            points: 2
        }
    );

    // 1_700_000_000 is a multiple of 20: file 1 spans two buckets, file 2 only the first
    let content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Time,Value",
            "14/11/2023 22:13:20,3.0",
            "14/11/2023 22:13:40,6.0"
        ]
    );
}

#[test]
fn test_corrupt_sibling_is_skipped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_UNIT02");

    write_channel(&group.join("a.001"), START_SECS, 1_000, &[2.0, 4.0], 2);
    fs::write(group.join("b.002"), [0u8; 40]).unwrap();
    write_channel(&group.join("c.003"), START_SECS, 0, &[9.0], 1);
    write_channel(&group.join("d.004"), START_SECS, 1_000, &[6.0, f64::NAN, 8.0], 10);

    let out = temp_dir.path().join("out");
    let report = process_group(&group, &options(&out, BucketWidth::Minute1), &CancelFlag::new())
        .expect("Group processing should succeed");

    assert_eq!(report.data_files, 4);
    assert_eq!(report.decoded_files(), 2);
    let failed: Vec<(String, &str)> = report
        .failures
        .iter()
        .map(|f| {
            (
                f.path.file_name().unwrap().to_string_lossy().into_owned(),
                f.error.kind(),
            )
        })
        .collect();
    assert_eq!(
        failed,
        vec![
            ("b.002".to_string(), "truncated"),
            ("c.003".to_string(), "invalid-sample-period")
        ]
    );

    let truncated = &report.files[1];
    assert_eq!(truncated.samples, 2);
    assert_eq!(truncated.nan_count, 1);
    assert_eq!(truncated.missing, 7);

    // 2, 4, 6, 8 all fall into the minute starting at 1_699_999_980
    let content = fs::read_to_string(out.join("TR2_UNIT02.csv")).unwrap();
    assert_eq!(content, "Time,Value\r\n14/11/2023 22:13:00,5.0\r\n");
}

#[test]
fn test_group_without_data_files_is_no_data() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_EMPTY");
    fs::write(group.join("readme.txt"), b"not a channel").unwrap();

    let out = temp_dir.path().join("out");
    let report = process_group(&group, &options(&out, BucketWidth::Seconds20), &CancelFlag::new())
        .expect("Group processing should succeed");

    assert_eq!(report.outcome, GroupOutcome::NoData);
    assert!(!out.join("TR2_EMPTY.csv").exists(), "No CSV for an empty group");
}

#[test]
fn test_group_with_only_failures_is_no_data() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_BROKEN");
    fs::write(group.join("x.001"), b"short").unwrap();
    write_channel(&group.join("y.002"), START_SECS, 1_000, &[f64::NAN, f64::NAN], 2);

    let out = temp_dir.path().join("out");
    let report = process_group(&group, &options(&out, BucketWidth::Seconds20), &CancelFlag::new())
        .expect("Group processing should succeed");

    assert_eq!(report.outcome, GroupOutcome::NoData);
    assert_eq!(report.failures.len(), 1);
    assert!(!out.join("TR2_BROKEN.csv").exists());
}

#[test]
fn test_process_groups_skips_cancelled_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_UNIT03");
    write_channel(&group.join("a.001"), START_SECS, 1_000, &[1.0], 1);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let out = temp_dir.path().join("out");
    let reports = process_groups(&[group], &options(&out, BucketWidth::Seconds20), &cancel);
    assert!(reports.is_empty());
    assert!(!out.exists());
}

#[test]
fn test_decode_group_preserves_file_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let group = group_dir(&temp_dir, "TR2_ORDER");
    for i in 0..12u32 {
        write_channel(
            &group.join(format!("ch.{i:03}")),
            START_SECS + u64::from(i),
            1_000,
            &[f64::from(i)],
            1,
        );
    }

    let files = list_data_files(&group).unwrap();
    let decoded = decode_group(&files, 4, &CancelFlag::new());
    assert!(!decoded.cancelled);
    let firsts: Vec<f64> = decoded
        .files
        .iter()
        .map(|f| f.decode.samples[0].value)
        .collect();
    let expected: Vec<f64> = (0..12).map(f64::from).collect();
    assert_eq!(firsts, expected);
}
