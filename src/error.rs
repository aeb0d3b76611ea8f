use std::io;
use thiserror::Error;

/// Failures converting a FILETIME tick count into a UTC instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    /// Tick count lies before 1970-01-01T00:00:00Z
    #[error("tick count {0} is before the Unix epoch")]
    NegativeResult(u64),
    /// Instant is outside the representable range
    #[error("timestamp out of representable range")]
    Overflow,
}

/// Per-file decode failures.
///
/// None of these are fatal for a batch: the orchestrator records the
/// failure against the file and moves on to its siblings.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// File could not be opened or read
    #[error("I/O error: {0}")]
    IoFailure(#[from] io::Error),
    /// Fewer bytes than a complete header
    #[error("truncated header: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    /// `start_time` does not convert to a valid instant
    #[error("no anchor time: {0}")]
    NoAnchorTime(ClockError),
    /// Sample period of zero milliseconds
    #[error("invalid sample period: {0} ms")]
    InvalidSamplePeriod(u32),
    /// Timestamp of sample `index` overflows the representable range
    #[error("timestamp overflow at sample {index}")]
    TimestampOverflow { index: u64 },
}

impl DecodeError {
    /// Short label used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::IoFailure(_) => "io",
            DecodeError::Truncated { .. } => "truncated",
            DecodeError::NoAnchorTime(_) => "no-anchor-time",
            DecodeError::InvalidSamplePeriod(_) => "invalid-sample-period",
            DecodeError::TimestampOverflow { .. } => "timestamp-overflow",
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: DecodeError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DecodeError::IoFailure(_)));
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_display_messages() {
        let err = DecodeError::Truncated {
            expected: 304,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "truncated header: expected 304 bytes, found 12"
        );
        let err = DecodeError::NoAnchorTime(ClockError::NegativeResult(5));
        assert_eq!(
            err.to_string(),
            "no anchor time: tick count 5 is before the Unix epoch"
        );
    }
}
