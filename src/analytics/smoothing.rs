use crate::data::model::{Reading, valid_readings};

/// Centered moving average over `window` readings.
///
/// Positions whose window would run past either end are always missing; the
/// window is never shrunk at the edges. Inside the window missing readings
/// are skipped, and a window with no present readings yields missing.
///
/// Returns `None` when there are fewer readings than the window (or the
/// window is zero). The output is aligned index-for-index with `values`.
pub fn compute_moving_average(values: &[Reading], window: usize) -> Option<Vec<Reading>> {
    if window == 0 || values.len() < window {
        return None;
    }

    let half = window / 2;
    let len = values.len();

    let smoothed = (0..len)
        .map(|i| {
            if i < half || i >= len - half {
                return None;
            }
            let slice = &values[i - half..=i + half];
            let (sum, count) = valid_readings(slice).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect();

    Some(smoothed)
}
