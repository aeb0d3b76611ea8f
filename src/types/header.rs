#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the fixed header record at the start of every channel file
pub const HEADER_SIZE: usize = 304;

/// Size of one encoded sample
pub const SAMPLE_SIZE: usize = 8;

/// Calibration range of a channel.
///
/// Carried through untouched: sample values in the file are already in
/// engineering units for the channels this crate exports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scales {
    pub raw_zero: f32,
    pub raw_full: f32,
    pub eng_zero: f32,
    pub eng_full: f32,
}

/// Decoded channel file header
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawHeader {
    pub title: String,
    pub scales: Scales,
    pub id: String,
    /// `Type` field of the record
    pub file_kind: u16,
    pub version: u16,
    pub start_ev_no: i64,
    pub log_name: String,
    pub mode: u32,
    pub area: u16,
    /// `Priv` field of the record
    pub privilege: u16,
    pub file_type: u16,
    /// Milliseconds between consecutive samples
    pub sample_period: u32,
    pub eng_units: String,
    pub format: u32,
    /// FILETIME of the first sample
    pub start_time: u64,
    pub end_time: u64,
    /// Declared number of samples following the header
    pub data_length: u32,
    pub file_pointer: u32,
    pub end_ev_no: i64,
}

impl RawHeader {
    /// Channel label for log lines: the title, or the log name when the
    /// title is blank
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.log_name
        } else {
            &self.title
        }
    }
}
