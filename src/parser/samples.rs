use crate::clock::{offset_millis, to_utc};
use crate::conversion::round3;
use crate::error::{DecodeError, DecodeResult};
use crate::parser::header::read_full;
use crate::types::{RawHeader, Sample, SampleDecode, SAMPLE_SIZE};
use std::io::Read;

/// Decode the sample array that follows the header.
///
/// `source` must be positioned right after the header. Sample `i` of the
/// declared layout is stamped `start_time + i * sample_period`, so dropped
/// NaN slots never shift later samples. A short read ends decoding early and
/// is reported through [`SampleDecode::missing`], not as an error.
pub fn decode_samples<R: Read>(mut source: R, header: &RawHeader) -> DecodeResult<SampleDecode> {
    if header.sample_period == 0 {
        return Err(DecodeError::InvalidSamplePeriod(header.sample_period));
    }
    let start = to_utc(header.start_time).map_err(DecodeError::NoAnchorTime)?;
    let period_ms = u64::from(header.sample_period);
    let declared = u64::from(header.data_length);

    let mut decode = SampleDecode {
        // data_length comes straight from the file, so bound the reservation
        samples: Vec::with_capacity(header.data_length.min(1 << 20) as usize),
        ..SampleDecode::default()
    };

    let mut slot = [0u8; SAMPLE_SIZE];
    for index in 0..declared {
        let filled = read_full(&mut source, &mut slot)?;
        if filled < SAMPLE_SIZE {
            decode.missing = declared - index;
            log::warn!(
                "'{}': only {} of {} declared samples present",
                header.label(),
                index,
                declared
            );
            break;
        }

        let raw = f64::from_le_bytes(slot);
        if !raw.is_finite() {
            decode.nan_count += 1;
            continue;
        }

        let timestamp = index
            .checked_mul(period_ms)
            .ok_or(DecodeError::TimestampOverflow { index })
            .and_then(|offset| {
                offset_millis(start, offset).map_err(|_| DecodeError::TimestampOverflow { index })
            })?;

        decode.samples.push(Sample {
            timestamp,
            value: round3(raw),
        });
    }

    if decode.nan_count > 0 {
        log::debug!(
            "'{}': discarded {} NaN samples",
            header.label(),
            decode.nan_count
        );
    }

    Ok(decode)
}
