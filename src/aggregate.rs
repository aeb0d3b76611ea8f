//! Bucket aggregation
//!
//! Samples from every file of a group are merged into one chronological
//! series and reduced into fixed-width buckets. Buckets are aligned to the
//! Unix epoch, not to any file's start time, so samples from different files
//! can share a bucket.

use crate::conversion::round3;
use crate::types::{AggregatePoint, Sample};
use chrono::DateTime;
use std::collections::BTreeMap;

/// Concatenate per-file sample lists and sort them by timestamp.
///
/// The sort is stable: samples with equal timestamps keep file order.
pub fn merge_samples(per_file: Vec<Vec<Sample>>) -> Vec<Sample> {
    let total = per_file.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for samples in per_file {
        merged.extend(samples);
    }
    merged.sort_by_key(|s| s.timestamp);
    merged
}

/// Start of the bucket containing `millis`, in Unix epoch seconds
fn bucket_key(millis: i64, bucket_seconds: i64) -> i64 {
    millis.div_euclid(1000).div_euclid(bucket_seconds) * bucket_seconds
}

/// Average samples into `bucket_seconds`-wide buckets.
///
/// Output is ordered by bucket start regardless of input order. Each value
/// is the mean of the (already rounded) sample values, rounded to 3 decimals.
///
/// # Panics
/// If `bucket_seconds` is zero.
pub fn aggregate(samples: &[Sample], bucket_seconds: u64) -> Vec<AggregatePoint> {
    assert!(bucket_seconds > 0, "bucket width must be positive");
    let width = i64::try_from(bucket_seconds).unwrap_or(i64::MAX);

    // (sum, count) per bucket start
    let mut buckets: BTreeMap<i64, (f64, u64)> = BTreeMap::new();
    for sample in samples {
        let key = bucket_key(sample.timestamp.timestamp_millis(), width);
        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += sample.value;
        entry.1 += 1;
    }

    // Sums of near-MAX values overflow; those buckets are redone as a sum of
    // value / count, which stays within the range of the inputs
    let mut rescaled: BTreeMap<i64, f64> = BTreeMap::new();
    if buckets.values().any(|(sum, _)| !sum.is_finite()) {
        for sample in samples {
            let key = bucket_key(sample.timestamp.timestamp_millis(), width);
            if let Some(&(sum, count)) = buckets.get(&key) {
                if !sum.is_finite() {
                    *rescaled.entry(key).or_insert(0.0) += sample.value / count as f64;
                }
            }
        }
    }

    buckets
        .into_iter()
        .filter_map(|(start, (sum, count))| {
            let bucket_start = DateTime::from_timestamp(start, 0)?;
            let mean = rescaled
                .get(&start)
                .copied()
                .unwrap_or(sum / count as f64);
            Some(AggregatePoint {
                bucket_start,
                value: round3(mean),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample(secs: i64, value: f64) -> Sample {
        Sample {
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            value,
        }
    }

    #[test]
    fn test_two_samples_one_bucket() {
        let points = aggregate(&[sample(0, 1.0), sample(10, 3.0)], 20);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bucket_start.timestamp(), 0);
        assert_eq!(points[0].value, 2.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], 60).is_empty());
    }

    #[test]
    #[should_panic(expected = "bucket width must be positive")]
    fn test_zero_width_panics() {
        aggregate(&[sample(0, 1.0)], 0);
    }

    #[test]
    fn test_epoch_aligned_buckets() {
        let samples = [
            sample(1_699_999_979, 5.0),
            sample(1_699_999_980, 1.0),
            sample(1_700_000_010, 2.0),
            sample(1_700_000_040, 9.0),
        ];
        let points = aggregate(&samples, 60);
        let starts: Vec<i64> = points.iter().map(|p| p.bucket_start.timestamp()).collect();
        assert_eq!(starts, vec![1_699_999_920, 1_699_999_980, 1_700_000_040]);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![5.0, 1.5, 9.0]);
    }

    #[test]
    fn test_output_sorted_regardless_of_input_order() {
        let points = aggregate(&[sample(100, 1.0), sample(0, 2.0), sample(50, 3.0)], 20);
        let starts: Vec<i64> = points.iter().map(|p| p.bucket_start.timestamp()).collect();
        assert_eq!(starts, vec![0, 40, 100]);
    }

    #[test]
    fn test_sub_second_sample_stays_in_its_bucket() {
        let late = Sample {
            timestamp: DateTime::<Utc>::from_timestamp(19, 0).unwrap() + Duration::milliseconds(999),
            value: 4.0,
        };
        let points = aggregate(&[late, sample(20, 8.0)], 20);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket_start.timestamp(), 0);
        assert_eq!(points[1].bucket_start.timestamp(), 20);
    }

    #[test]
    fn test_mean_is_rounded() {
        let points = aggregate(&[sample(0, 1.0), sample(1, 1.0), sample(2, 2.0)], 20);
        assert_eq!(points[0].value, 1.333);
    }

    #[test]
    fn test_mean_of_huge_values_is_finite() {
        let points = aggregate(
            &[sample(0, f64::MAX), sample(1, f64::MAX), sample(40, 1e306)],
            20,
        );
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, f64::MAX);
        assert_eq!(points[1].value, 1e306);
        assert!(points.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn test_merge_sorts_across_files() {
        let merged = merge_samples(vec![
            vec![sample(30, 1.0), sample(40, 2.0)],
            vec![sample(10, 3.0), sample(35, 4.0)],
        ]);
        let times: Vec<i64> = merged.iter().map(|s| s.timestamp.timestamp()).collect();
        assert_eq!(times, vec![10, 30, 35, 40]);
    }
}
