use libm::roundf;

/// Convert a distance in physical units into a whole number of half-period
/// toggles, rounding to the nearest toggle.
pub(crate) fn to_steps(value: f32, steps_per_unit: f32) -> i64 {
    roundf(value * steps_per_unit) as i64
}

/// Limit `value` to `ceiling`, returning `None` when it was already in range.
pub(crate) fn clamp_to_ceiling(value: f32, ceiling: f32) -> Option<f32> {
    if value > ceiling {
        Some(ceiling)
    } else {
        None
    }
}
