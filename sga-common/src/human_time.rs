//! Elapsed-time display formatting
//!
//! The progress display shows wall-clock time since submission as a
//! zero-padded minutes/seconds pair, independent of any percentage.

use std::time::Duration;

/// Split an elapsed duration into displayed (minutes, seconds).
///
/// Minutes are unbounded; seconds are the remainder within the minute.
///
/// # Examples
///
/// ```
/// use sga_common::human_time::elapsed_parts;
/// use std::time::Duration;
///
/// assert_eq!(elapsed_parts(Duration::from_secs(0)), (0, 0));
/// assert_eq!(elapsed_parts(Duration::from_secs(67)), (1, 7));
/// assert_eq!(elapsed_parts(Duration::from_secs(3600)), (60, 0));
/// ```
pub fn elapsed_parts(elapsed: Duration) -> (u64, u64) {
    let total = elapsed.as_secs();
    (total / 60, total % 60)
}

/// Render an elapsed duration as `MMmSSs` (`00m00s`, `05m07s`).
///
/// Both fields are zero-padded to two digits; past 99 minutes the minute
/// field simply widens.
///
/// # Examples
///
/// ```
/// use sga_common::human_time::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_secs(0)), "00m00s");
/// assert_eq!(format_elapsed(Duration::from_secs(307)), "05m07s");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let (minutes, seconds) = elapsed_parts(elapsed);
    format!("{:02}m{:02}s", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "00m00s");
    }

    #[test]
    fn test_sub_minute() {
        assert_eq!(format_elapsed(Duration::from_secs(9)), "00m09s");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "00m59s");
    }

    #[test]
    fn test_minute_rollover() {
        assert_eq!(format_elapsed(Duration::from_secs(60)), "01m00s");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "01m01s");
    }

    #[test]
    fn test_subsecond_precision_truncates() {
        assert_eq!(format_elapsed(Duration::from_millis(59_900)), "00m59s");
    }

    #[test]
    fn test_long_jobs_widen_minutes() {
        assert_eq!(format_elapsed(Duration::from_secs(100 * 60 + 5)), "100m05s");
    }
}
