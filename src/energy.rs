//! Cumulative energy from a power time series.

use crate::models::Reading;

const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Energy in joules for the interval between two readings, using the
/// average of both power samples (trapezoidal rule).
pub fn joules_between(earlier: &Reading, later: &Reading) -> f64 {
    let gap = later.timestamp - earlier.timestamp;
    // Microseconds overflow i64 only past ~292k years
    let elapsed_secs = match gap.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => gap.num_milliseconds() as f64 / 1000.0,
    };
    let avg_power_w = (earlier.power_w + later.power_w) / 2.0;
    avg_power_w * elapsed_secs
}

/// Total energy in kWh over the readings. Input order does not matter.
pub fn total_kwh(readings: &[Reading]) -> f64 {
    if readings.len() < 2 {
        return 0.0;
    }

    let mut sorted = readings.to_vec();
    crate::models::reading::sort_ascending(&mut sorted);

    let total_joules: f64 = sorted
        .windows(2)
        .map(|pair| joules_between(&pair[0], &pair[1]))
        .sum();

    total_joules / JOULES_PER_KWH
}
