//! Export functionality for aggregated channel data
//!
//! Writes one `Time,Value` CSV per group, plus an optional JSON dump of the
//! decoded headers when the `json` feature is enabled.

#[cfg(feature = "csv")]
use crate::conversion::format_value;
#[cfg(feature = "csv")]
use crate::types::AggregatePoint;
use crate::Result;
use anyhow::anyhow;
#[cfg(any(feature = "csv", feature = "json"))]
use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Timestamp layout of the `Time` column
pub const CSV_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Bucket width offered to users; the aggregator itself accepts any
/// positive number of seconds through [`BucketWidth::Custom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketWidth {
    #[default]
    Seconds20,
    Minute1,
    Minutes10,
    Minutes30,
    Hour1,
    Hours12,
    Day1,
    Custom(u64),
}

impl BucketWidth {
    pub const PRESETS: [BucketWidth; 7] = [
        BucketWidth::Seconds20,
        BucketWidth::Minute1,
        BucketWidth::Minutes10,
        BucketWidth::Minutes30,
        BucketWidth::Hour1,
        BucketWidth::Hours12,
        BucketWidth::Day1,
    ];

    pub fn seconds(self) -> u64 {
        match self {
            BucketWidth::Seconds20 => 20,
            BucketWidth::Minute1 => 60,
            BucketWidth::Minutes10 => 600,
            BucketWidth::Minutes30 => 1_800,
            BucketWidth::Hour1 => 3_600,
            BucketWidth::Hours12 => 43_200,
            BucketWidth::Day1 => 86_400,
            BucketWidth::Custom(secs) => secs,
        }
    }

    /// Preset matching `seconds`, or `Custom`
    pub fn from_seconds(seconds: u64) -> Self {
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.seconds() == seconds)
            .unwrap_or(BucketWidth::Custom(seconds))
    }

    fn label(self) -> Option<&'static str> {
        match self {
            BucketWidth::Seconds20 => Some("20s"),
            BucketWidth::Minute1 => Some("1m"),
            BucketWidth::Minutes10 => Some("10m"),
            BucketWidth::Minutes30 => Some("30m"),
            BucketWidth::Hour1 => Some("1h"),
            BucketWidth::Hours12 => Some("12h"),
            BucketWidth::Day1 => Some("1d"),
            BucketWidth::Custom(_) => None,
        }
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "{}s", self.seconds()),
        }
    }
}

impl FromStr for BucketWidth {
    type Err = anyhow::Error;

    /// Accepts `20s`, `1m`, `10m`, `30m`, `1h`, `12h`, `1d`, or a plain
    /// positive number of seconds (`90`, `90s`)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(preset) = Self::PRESETS.into_iter().find(|p| p.label() == Some(s.as_str())) {
            return Ok(preset);
        }
        let digits = s.strip_suffix('s').unwrap_or(&s);
        let seconds: u64 = digits
            .parse()
            .map_err(|_| anyhow!("Invalid export period '{s}' (expected 20s, 1m, 10m, 30m, 1h, 12h, 1d or seconds)"))?;
        if seconds == 0 {
            return Err(anyhow!("Export period must be positive"));
        }
        Ok(Self::from_seconds(seconds))
    }
}

/// Export options for controlling CSV output
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Output directory; defaults to the group folder's parent
    pub output_dir: Option<PathBuf>,
    pub bucket: BucketWidth,
    /// Render bucket starts in the local time zone instead of UTC
    pub local_time: bool,
}

/// Compute the CSV path for a group folder
pub fn compute_csv_path(group_folder: &Path, export_options: &ExportOptions) -> Result<PathBuf> {
    let name = group_folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Group folder has no usable name: {group_folder:?}"))?;

    let dir = match &export_options.output_dir {
        Some(dir) => dir.clone(),
        None => group_folder
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    Ok(dir.join(format!("{name}.csv")))
}

/// Format a bucket start for the `Time` column
pub fn format_timestamp(instant: DateTime<Utc>, local_time: bool) -> String {
    if local_time {
        instant
            .with_timezone(&Local)
            .format(CSV_TIME_FORMAT)
            .to_string()
    } else {
        instant.format(CSV_TIME_FORMAT).to_string()
    }
}

/// Write aggregated points as `Time,Value` rows
#[cfg(feature = "csv")]
pub fn write_csv<W: std::io::Write>(
    writer: W,
    points: &[AggregatePoint],
    local_time: bool,
) -> Result<()> {
    // CRLF rows, same as earlier exports of these groups
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv_writer.write_record(["Time", "Value"])?;
    for point in points {
        csv_writer.write_record([
            format_timestamp(point.bucket_start, local_time),
            format_value(point.value),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export a group's aggregate to `<output_dir>/<group name>.csv`
#[cfg(feature = "csv")]
pub fn export_to_csv(
    group_folder: &Path,
    points: &[AggregatePoint],
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let csv_path = compute_csv_path(group_folder, export_options)?;
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {parent:?}"))?;
    }

    let file = std::fs::File::create(&csv_path)
        .with_context(|| format!("Failed to create CSV file: {csv_path:?}"))?;
    write_csv(std::io::BufWriter::new(file), points, export_options.local_time)
        .with_context(|| format!("Failed to write CSV file: {csv_path:?}"))?;

    Ok(csv_path)
}

/// Dump the headers of a group's decoded files as pretty JSON
#[cfg(feature = "json")]
pub fn export_headers_to_json(files: &[crate::parser::FileSummary], output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create header file: {output_path:?}"))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), files)
        .with_context(|| format!("Failed to write header file: {output_path:?}"))?;
    Ok(())
}

/// Path of the header dump next to a group's CSV
pub fn compute_headers_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("headers.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "csv")]
    fn point(secs: i64, value: f64) -> AggregatePoint {
        AggregatePoint {
            bucket_start: DateTime::from_timestamp(secs, 0).unwrap(),
            value,
        }
    }

    #[test]
    fn test_bucket_width_parse() {
        assert_eq!("20s".parse::<BucketWidth>().unwrap(), BucketWidth::Seconds20);
        assert_eq!("1H".parse::<BucketWidth>().unwrap(), BucketWidth::Hour1);
        assert_eq!("86400".parse::<BucketWidth>().unwrap(), BucketWidth::Day1);
        assert_eq!("90s".parse::<BucketWidth>().unwrap(), BucketWidth::Custom(90));
        assert!("0".parse::<BucketWidth>().is_err());
        assert!("fortnight".parse::<BucketWidth>().is_err());
    }

    #[test]
    fn test_bucket_width_presets() {
        let seconds: Vec<u64> = BucketWidth::PRESETS.iter().map(|b| b.seconds()).collect();
        assert_eq!(seconds, vec![20, 60, 600, 1800, 3600, 43200, 86400]);
        assert_eq!(BucketWidth::Custom(45).to_string(), "45s");
        assert_eq!(BucketWidth::Minutes30.to_string(), "30m");
    }

    #[test]
    fn test_csv_path_defaults_to_parent() {
        let options = ExportOptions::default();
        let path = compute_csv_path(Path::new("/data/TR2_UNIT04"), &options).unwrap();
        assert_eq!(path, PathBuf::from("/data/TR2_UNIT04.csv"));

        let options = ExportOptions {
            output_dir: Some(PathBuf::from("/out")),
            ..ExportOptions::default()
        };
        let path = compute_csv_path(Path::new("/data/TR2_UNIT04"), &options).unwrap();
        assert_eq!(path, PathBuf::from("/out/TR2_UNIT04.csv"));
    }

    #[test]
    fn test_format_timestamp_utc() {
        // 2023-11-14T22:13:20Z
        let instant = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_timestamp(instant, false), "14/11/2023 22:13:20");
    }

    #[test]
    fn test_format_timestamp_local() {
        use chrono::{NaiveDateTime, TimeZone};

        let instant = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let text = format_timestamp(instant, true);
        let naive = NaiveDateTime::parse_from_str(&text, CSV_TIME_FORMAT).unwrap();
        let back = Local.from_local_datetime(&naive).earliest().unwrap();
        assert_eq!(back.with_timezone(&Utc), instant);
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_write_csv_rows() {
        let mut out = Vec::new();
        write_csv(&mut out, &[point(0, 2.0), point(20, 1.001)], false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Time,Value\r\n01/01/1970 00:00:00,2.0\r\n01/01/1970 00:00:20,1.001\r\n"
        );
    }
}
