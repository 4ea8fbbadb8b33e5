//! Conversions from raw kernel counters to durations, timestamps, and bytes.

use chrono::{DateTime, Duration, Local};

use crate::error::{Error, Result};

/// Clock ticks to wall-clock duration, whole seconds (`ticks / tps`).
pub fn ticks_to_duration(ticks: u64, ticks_per_second: u64) -> Duration {
    Duration::seconds((ticks / ticks_per_second) as i64)
}

/// Absolute start time of a process: boot time plus its start offset in
/// clock ticks.
pub fn start_time(
    boot_time: DateTime<Local>,
    start_ticks: u64,
    ticks_per_second: u64,
) -> DateTime<Local> {
    boot_time + ticks_to_duration(start_ticks, ticks_per_second)
}

/// Resident pages to bytes.
pub fn pages_to_bytes(pages: u64, page_size: u64) -> u64 {
    pages * page_size
}

/// Cumulative CPU percentage over the process's lifetime:
/// `(utime + stime) / uptime_in_ticks * 100`. A zero measured uptime is a
/// defined failure, not infinity.
pub fn cpu_percent(
    utime_ticks: u64,
    stime_ticks: u64,
    uptime: Duration,
    ticks_per_second: u64,
) -> Result<f64> {
    let uptime_secs = uptime.num_seconds();
    if uptime_secs == 0 {
        return Err(Error::ZeroUptime);
    }
    let uptime_ticks = uptime_secs as f64 * ticks_per_second as f64;
    Ok((utime_ticks + stime_ticks) as f64 / uptime_ticks * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ticks_to_duration_truncates_to_seconds() {
        assert_eq!(ticks_to_duration(0, 100), Duration::seconds(0));
        assert_eq!(ticks_to_duration(99, 100), Duration::seconds(0));
        assert_eq!(ticks_to_duration(100, 100), Duration::seconds(1));
        assert_eq!(ticks_to_duration(12_345, 100), Duration::seconds(123));
    }

    #[test]
    fn test_start_time_anchors_on_boot_time() {
        let boot = Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            start_time(boot, 360_000, 100),
            boot + Duration::seconds(3600)
        );
    }

    #[test]
    fn test_pages_to_bytes() {
        assert_eq!(pages_to_bytes(0, 4096), 0);
        assert_eq!(pages_to_bytes(3, 4096), 12_288);
    }

    #[test]
    fn test_cpu_percent_hundred() {
        // 50 + 50 ticks over 1 second at 100 ticks/second is 100%.
        let percent = cpu_percent(50, 50, Duration::seconds(1), 100).unwrap();
        assert_eq!(percent, 100.0);
    }

    #[test]
    fn test_cpu_percent_partial() {
        let percent = cpu_percent(10, 10, Duration::seconds(2), 100).unwrap();
        assert_eq!(percent, 10.0);
    }

    #[test]
    fn test_cpu_percent_zero_uptime_fails() {
        let err = cpu_percent(50, 50, Duration::zero(), 100).unwrap_err();
        assert!(matches!(err, Error::ZeroUptime));
    }
}
