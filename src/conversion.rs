//! Value conversion utilities
//!
//! Rounding and text rendering shared by the decoder, the aggregator and
//! the CSV sink. All of them must agree for exported CSVs to match the
//! reference output.

/// Scale for the 3 decimal places kept on sample and aggregate values
const VALUE_SCALE: f64 = 1000.0;

/// Round to 3 decimal places, halves away from zero on the scaled value.
///
/// `1.0005` scales to exactly `1000.5` in binary and rounds up to `1.001`;
/// `1.0004` rounds down to `1.0`. Finite input always gives finite output:
/// magnitudes too large to scale are returned unchanged.
pub fn round3(value: f64) -> f64 {
    let scaled = value * VALUE_SCALE;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / VALUE_SCALE
}

/// Render a value the way the reference CSVs do: shortest representation
/// that round-trips, always with a fractional part (`2.0`, `1.001`, `-0.25`).
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}
