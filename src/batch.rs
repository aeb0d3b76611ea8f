//! Batch processing of group folders
//!
//! A group is a folder of channel files for one logger unit. Files are
//! decoded on worker threads, each into its own buffer; a single consumer
//! collects the results, and aggregation only starts once every file of the
//! group has reported.

use crate::aggregate::{aggregate, merge_samples};
use crate::error::DecodeError;
use crate::export::ExportOptions;
use crate::parser::{decode_file, FileDecode, FileSummary};
use crate::types::AggregatePoint;
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub export: ExportOptions,
    /// Decode worker threads per group
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            export: ExportOptions::default(),
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

/// Cooperative cancellation, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A file that could not be decoded
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: DecodeError,
}

/// Decoded files of a group, in file-name order
#[derive(Debug, Default)]
pub struct GroupDecode {
    pub files: Vec<FileDecode>,
    pub failures: Vec<FileFailure>,
    /// Set when cancellation stopped the group before every file was decoded
    pub cancelled: bool,
}

/// How a group ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Aggregate computed (and written, when `csv_path` is set)
    Exported {
        csv_path: Option<PathBuf>,
        points: usize,
    },
    /// No data files, or none of them produced a sample
    NoData,
    Cancelled,
}

/// Result of processing one group folder
#[derive(Debug)]
pub struct GroupReport {
    pub group: PathBuf,
    pub data_files: usize,
    pub files: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
    pub total_samples: usize,
    pub outcome: GroupOutcome,
}

impl GroupReport {
    fn new(group: &Path) -> Self {
        Self {
            group: group.to_path_buf(),
            data_files: 0,
            files: Vec::new(),
            failures: Vec::new(),
            total_samples: 0,
            outcome: GroupOutcome::NoData,
        }
    }

    pub fn decoded_files(&self) -> usize {
        self.files.len()
    }

    pub fn is_exported(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Exported { .. })
    }
}

/// True when the extension is non-empty and entirely ASCII digits (`.001`, `.17`)
pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Data files of a group folder in lexicographic file-name order
pub fn list_data_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("Failed to read group folder: {folder:?}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read entry in '{}': {}", folder.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_data_file(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Subfolders of `root` whose name contains `name_filter`, sorted by name
pub fn list_groups(root: &Path, name_filter: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(root).with_context(|| format!("Failed to read source folder: {root:?}"))?;

    let mut groups = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in source folder: {root:?}"))?
            .path();
        if !path.is_dir() {
            continue;
        }
        let matches = match (name_filter, path.file_name().and_then(|n| n.to_str())) {
            (None, _) => true,
            (Some(filter), Some(name)) => name.contains(filter),
            (Some(_), None) => false,
        };
        if matches {
            groups.push(path);
        }
    }
    groups.sort();
    Ok(groups)
}

/// Decode a group's files on `workers` threads.
///
/// See [`decode_group_with_progress`].
pub fn decode_group(files: &[PathBuf], workers: usize, cancel: &CancelFlag) -> GroupDecode {
    decode_group_with_progress(files, workers, cancel, |_, _| {})
}

/// Decode a group's files on `workers` threads, calling `progress(done, total)`
/// from the collecting thread as each file finishes.
///
/// Workers take files from a shared queue and check `cancel` before each
/// one. Results are put back in the order of `files`.
pub fn decode_group_with_progress<F>(
    files: &[PathBuf],
    workers: usize,
    cancel: &CancelFlag,
    mut progress: F,
) -> GroupDecode
where
    F: FnMut(usize, usize),
{
    let total = files.len();
    let workers = workers.clamp(1, total.max(1));

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &Path)>();
    for (index, path) in files.iter().enumerate() {
        if job_tx.send((index, path.as_path())).is_err() {
            break;
        }
    }
    drop(job_tx);

    let (result_tx, result_rx) = crossbeam_channel::unbounded();

    let mut results = std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, path) in job_rx.iter() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let result = decode_file(path);
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut collected = Vec::with_capacity(total);
        for item in result_rx.iter() {
            collected.push(item);
            progress(collected.len(), total);
        }
        collected
    });

    results.sort_by_key(|(index, _)| *index);

    let mut group = GroupDecode {
        cancelled: results.len() < total,
        ..GroupDecode::default()
    };
    for (index, result) in results {
        match result {
            Ok(file) => group.files.push(file),
            Err(error) => group.failures.push(FileFailure {
                path: files[index].clone(),
                error,
            }),
        }
    }
    group
}

/// Decode, merge and aggregate one group folder without writing anything
pub fn aggregate_group(
    folder: &Path,
    options: &BatchOptions,
    cancel: &CancelFlag,
) -> Result<(GroupReport, Vec<AggregatePoint>)> {
    let mut report = GroupReport::new(folder);

    let data_files = list_data_files(folder)?;
    report.data_files = data_files.len();
    if data_files.is_empty() {
        log::warn!("No data files found in {}", folder.display());
        return Ok((report, Vec::new()));
    }

    let decoded = decode_group_with_progress(&data_files, options.workers, cancel, |done, total| {
        log::debug!("{}: decoded {done} of {total} files", folder.display());
    });
    for failure in &decoded.failures {
        log::warn!(
            "Skipping {} ({}): {}",
            failure.path.display(),
            failure.error.kind(),
            failure.error
        );
    }
    report.failures = decoded.failures;
    if decoded.cancelled {
        log::warn!("Cancelled while decoding {}", folder.display());
        report.outcome = GroupOutcome::Cancelled;
        return Ok((report, Vec::new()));
    }

    let mut per_file = Vec::with_capacity(decoded.files.len());
    for file in decoded.files {
        report.files.push(file.summary());
        per_file.push(file.decode.samples);
    }

    let samples = merge_samples(per_file);
    report.total_samples = samples.len();
    if samples.is_empty() {
        log::warn!("No samples found in {}", folder.display());
        return Ok((report, Vec::new()));
    }

    let points = aggregate(&samples, options.export.bucket.seconds());
    report.outcome = GroupOutcome::Exported {
        csv_path: None,
        points: points.len(),
    };
    Ok((report, points))
}

/// Process one group folder end to end and write its CSV
#[cfg(feature = "csv")]
pub fn process_group(folder: &Path, options: &BatchOptions, cancel: &CancelFlag) -> Result<GroupReport> {
    let (mut report, points) = aggregate_group(folder, options, cancel)?;
    if !report.is_exported() {
        return Ok(report);
    }

    let csv_path = crate::export::export_to_csv(folder, &points, &options.export)?;
    log::info!(
        "Export complete: {} ({} points from {} of {} files)",
        csv_path.display(),
        points.len(),
        report.decoded_files(),
        report.data_files
    );
    report.outcome = GroupOutcome::Exported {
        csv_path: Some(csv_path),
        points: points.len(),
    };
    Ok(report)
}

/// Process several groups in order, checking `cancel` between groups.
///
/// A group that fails outright (unreadable folder, CSV not writable) is
/// logged and skipped.
#[cfg(feature = "csv")]
pub fn process_groups(groups: &[PathBuf], options: &BatchOptions, cancel: &CancelFlag) -> Vec<GroupReport> {
    let mut reports = Vec::with_capacity(groups.len());
    for group in groups {
        if cancel.is_cancelled() {
            break;
        }
        match process_group(group, options, cancel) {
            Ok(report) => reports.push(report),
            Err(e) => log::error!("Error exporting {}: {:#}", group.display(), e),
        }
    }
    reports
}
