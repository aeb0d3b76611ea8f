use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One decoded reading. `value` is finite and rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Mean of all samples falling into one bucket
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregatePoint {
    pub bucket_start: DateTime<Utc>,
    pub value: f64,
}

/// Output of the sample stream decoder for one file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleDecode {
    /// Kept samples in file order
    pub samples: Vec<Sample>,
    /// Slots holding NaN or infinite values, dropped
    pub nan_count: u64,
    /// Declared slots missing because the file is shorter than its header says
    pub missing: u64,
}

impl SampleDecode {
    pub fn is_truncated(&self) -> bool {
        self.missing > 0
    }
}
