//! Channels derived from the logged samples

use crate::types::GpsSample;

const KMH_TO_MS: f64 = 1.0 / 3.6;

/// Longitudinal acceleration in m/s² between consecutive samples
///
/// Entry `i` is `(v[i] - v[i-1]) / (t[i] - t[i-1])` with speed converted from
/// km/h to m/s and time from ms to s, so braking is negative. The first
/// sample has no predecessor and gets 0. Samples with no time difference
/// also get 0.
pub fn acceleration(samples: &[GpsSample]) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    if samples.is_empty() {
        return out;
    }
    out.push(0.0);

    for pair in samples.windows(2) {
        let dt_ms = pair[1].time_ms as f64 - pair[0].time_ms as f64;
        if dt_ms == 0.0 {
            out.push(0.0);
            continue;
        }
        let dv = (pair[1].speed_kmh - pair[0].speed_kmh) * KMH_TO_MS;
        out.push(dv / (dt_ms / 1000.0));
    }
    out
}

/// Brake pressure estimate as a percentage of `max_decel` (m/s², positive)
///
/// For a deceleration `a < 0` the value is `|a| / max_decel * 100`, so it
/// grows with braking force and reads 100 at `max_decel`. Harder braking
/// clamps to 100. Acceleration, coasting and a non-positive `max_decel`
/// map to 0.
pub fn brake_channel(acceleration: &[f64], max_decel: f64) -> Vec<f64> {
    acceleration
        .iter()
        .map(|&a| {
            if a < 0.0 && max_decel > 0.0 {
                (-a / max_decel * 100.0).min(100.0)
            } else {
                0.0
            }
        })
        .collect()
}
