use std::time::Duration;

/// Shortest interval that still yields a meaningful rate.
pub const MIN_ELAPSED: Duration = Duration::from_micros(1);

/// Instantaneous frames-per-second for one iteration that took `elapsed`.
///
/// Returns `None` when `elapsed` is below [`MIN_ELAPSED`].
pub fn instantaneous_fps(elapsed: Duration) -> Option<f64> {
    if elapsed < MIN_ELAPSED {
        return None;
    }
    Some(1.0 / elapsed.as_secs_f64())
}
