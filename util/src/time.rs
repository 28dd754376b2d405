//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a chrono duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a number of seconds into a std duration.
///
/// Negative and non-finite values give a zero duration, since they can't be slept for.
pub fn secs_to_std(seconds: f64) -> std::time::Duration {
    if seconds.is_finite() && seconds > 0.0 {
        std::time::Duration::from_secs_f64(seconds)
    }
    else {
        std::time::Duration::from_secs(0)
    }
}

/// Block the calling thread for the given number of seconds.
///
/// Does nothing for non-positive durations.
pub fn sleep_s(seconds: f64) {
    let dur = secs_to_std(seconds);
    if dur > std::time::Duration::from_secs(0) {
        std::thread::sleep(dur);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_secs_to_std() {
        assert_eq!(secs_to_std(0.5), std::time::Duration::from_millis(500));
        assert_eq!(secs_to_std(-1.0), std::time::Duration::from_secs(0));
        assert_eq!(secs_to_std(f64::NAN), std::time::Duration::from_secs(0));
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
