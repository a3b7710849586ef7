pub const MIN_RATING: i16 = 0;
pub const MAX_RATING: i16 = 5;

/// Rounds to the nearest integer and clamps into `[0, 5]`.
///
/// Returns `None` for NaN and infinities; those carry no usable proficiency
/// signal and must not reach storage as a clamped bound.
pub fn clamp_rating(x: f64) -> Option<i16> {
    if !x.is_finite() {
        return None;
    }
    let rounded = x.round().clamp(MIN_RATING as f64, MAX_RATING as f64);
    Some(rounded as i16)
}

/// Clamps into `[0, 1]`. Absent or non-finite input stays absent.
pub fn clamp_confidence(x: Option<f64>) -> Option<f64> {
    x.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 1.0))
}
