//! CLI binary for DLF Parser
//!
//! This provides the command-line interface for the DLF parser library.

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use dlf_parser::{
    list_groups, process_groups, BatchOptions, BucketWidth, CancelFlag, ExportOptions,
    GroupOutcome, LastFolder, DEFAULT_CONFIG_FILE,
};
use glob::glob;
use std::path::PathBuf;

const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let matches = Command::new("DLF Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode data logger channel files and export time-bucketed CSV summaries, one per group folder.")
        .arg(
            Arg::new("groups")
                .help("Group folders to export (supports globbing). Each folder's numeric-extension files form one group")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .help("Source folder whose subfolders are exported as groups (remembered for later runs)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .help("Only export subfolders of --root whose name contains TEXT")
                .value_name("TEXT"),
        )
        .arg(
            Arg::new("period")
                .long("period")
                .help("Bucket width: 20s, 1m, 10m, 30m, 1h, 12h, 1d or a number of seconds")
                .value_name("WIDTH")
                .default_value("20s"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for CSV output files (default: parent of each group folder)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("local-time")
                .long("local-time")
                .help("Write bucket timestamps in the local time zone instead of UTC")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .help("Decode threads per group (default: available CPUs)")
                .value_name("N")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("File remembering the last --root folder")
                .value_name("FILE")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("headers")
                .long("headers")
                .help("Also write decoded headers of each group to <group>.headers.json (requires the json feature)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed decoding information")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    init_logging(debug);
    log::debug!("dlf_parser {} ({})", env!("CARGO_PKG_VERSION"), GIT_SHA);

    let bucket: BucketWidth = matches
        .get_one::<String>("period")
        .map(String::as_str)
        .unwrap_or("20s")
        .parse()?;

    let mut options = BatchOptions {
        export: ExportOptions {
            output_dir: matches.get_one::<String>("output-dir").map(PathBuf::from),
            bucket,
            local_time: matches.get_flag("local-time"),
        },
        ..BatchOptions::default()
    };
    if let Some(&workers) = matches.get_one::<usize>("workers") {
        options.workers = workers.max(1);
    }

    let last_folder = LastFolder::new(
        matches
            .get_one::<String>("config")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIG_FILE),
    );
    let filter = matches.get_one::<String>("filter").map(String::as_str);
    let patterns: Vec<&String> = matches
        .get_many::<String>("groups")
        .map(|values| values.collect())
        .unwrap_or_default();

    let mut groups = Vec::new();
    for pattern in &patterns {
        if pattern.contains('*') || pattern.contains('?') {
            match glob(pattern) {
                Ok(paths) => {
                    for path in paths {
                        match path {
                            Ok(path) if path.is_dir() => groups.push(path),
                            Ok(_) => {}
                            Err(e) => log::warn!("Error expanding glob pattern '{pattern}': {e}"),
                        }
                    }
                }
                Err(e) => log::warn!("Invalid glob pattern '{pattern}': {e}"),
            }
        } else {
            let path = PathBuf::from(pattern.as_str());
            if path.is_dir() {
                groups.push(path);
            } else {
                log::warn!("Not a folder, skipping: {}", path.display());
            }
        }
    }

    let root = match matches.get_one::<String>("root") {
        Some(root) => {
            let root = PathBuf::from(root);
            if let Err(e) = last_folder.store(&root) {
                log::warn!("{e:#}");
            }
            Some(root)
        }
        None if patterns.is_empty() => {
            let remembered = last_folder.load();
            if let Some(root) = &remembered {
                log::info!("Using remembered source folder: {}", root.display());
            }
            remembered
        }
        None => None,
    };
    if let Some(root) = root {
        groups.extend(list_groups(&root, filter)?);
    }

    if groups.is_empty() {
        return Err(anyhow!(
            "No group folders to process. Pass folders, or --root DIR (remembered in {:?})",
            last_folder.config_path()
        ));
    }

    log::info!(
        "Export started: {} group(s), {} buckets",
        groups.len(),
        options.export.bucket
    );

    let cancel = CancelFlag::new();
    let reports = process_groups(&groups, &options, &cancel);

    let mut exported = 0;
    for report in &reports {
        match &report.outcome {
            GroupOutcome::Exported { .. } => exported += 1,
            GroupOutcome::NoData => {
                log::warn!("No data exported for {}", report.group.display())
            }
            GroupOutcome::Cancelled => {}
        }

        if matches.get_flag("headers") {
            write_headers(report, &options.export);
        }
    }

    log::info!("Export finished: {exported} of {} group(s) written", groups.len());

    if exported == 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "json")]
fn write_headers(report: &dlf_parser::GroupReport, export_options: &ExportOptions) {
    if report.files.is_empty() {
        return;
    }
    let result = dlf_parser::compute_csv_path(&report.group, export_options).and_then(|csv_path| {
        let path = dlf_parser::compute_headers_path(&csv_path);
        dlf_parser::export_headers_to_json(&report.files, &path).map(|_| path)
    });
    match result {
        Ok(path) => log::info!("Headers written: {}", path.display()),
        Err(e) => log::warn!("{e:#}"),
    }
}

#[cfg(not(feature = "json"))]
fn write_headers(_report: &dlf_parser::GroupReport, _export_options: &ExportOptions) {
    log::warn!("--headers needs a build with the json feature");
}
