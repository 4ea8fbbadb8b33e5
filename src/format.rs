//! Display formatting helpers for table cells.

use chrono::{DateTime, Local};

pub const SECS_PER_DAY: i64 = 24 * 60 * 60;
/// One year is fixed at 365.25 days, a month at one twelfth of that
/// (30.4375 days). A fixed-point calendar approximation, not calendar
/// arithmetic.
pub const SECS_PER_YEAR: i64 = 365 * SECS_PER_DAY + SECS_PER_DAY / 4;
pub const SECS_PER_MONTH: i64 = SECS_PER_YEAR / 12;

/// Formats a byte count with binary (IEC) units: "512 B", "1.0 KiB",
/// "79 MiB", "4.2 GiB". One decimal below 10 units, none above.
pub fn iec_bytes(bytes: u64) -> String {
    const SUFFIXES: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    if bytes < 10 {
        return format!("{} B", bytes);
    }
    let exp = ((bytes as f64).log2() / 10.0).floor() as usize;
    let exp = exp.min(SUFFIXES.len() - 1);
    let val = ((bytes as f64) / (1u64 << (10 * exp)) as f64 * 10.0 + 0.5).floor() / 10.0;
    if val < 10.0 {
        format!("{:.1} {}", val, SUFFIXES[exp])
    } else {
        format!("{:.0} {}", val, SUFFIXES[exp])
    }
}

/// Renders whole seconds in the short h/m/s form: "0s", "59s", "1m0s",
/// "23h59m59s". Hours are not capped at 24.
pub fn short_duration(secs: i64) -> String {
    if secs < 0 {
        return format!("-{}", short_duration(-secs));
    }
    let hours = secs / 3600;
    let minutes = secs % 3600 / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Multi-unit duration form: "23h59m59s", "1d0s", "1M0d0s", "1y0M0d0s".
/// Each unit boundary is computed by integer division with the remainder
/// carried to the next-smaller unit.
pub fn long_duration(secs: i64) -> String {
    if secs < 0 {
        return format!("-{}", long_duration(-secs));
    }
    if secs < SECS_PER_DAY {
        return short_duration(secs);
    }
    if secs < SECS_PER_MONTH {
        return format!(
            "{}d{}",
            secs / SECS_PER_DAY,
            short_duration(secs % SECS_PER_DAY)
        );
    }
    if secs < SECS_PER_YEAR {
        let months = secs / SECS_PER_MONTH;
        let rest = secs % SECS_PER_MONTH;
        return format!(
            "{}M{}d{}",
            months,
            rest / SECS_PER_DAY,
            short_duration(rest % SECS_PER_DAY)
        );
    }
    let years = secs / SECS_PER_YEAR;
    let mut rest = secs % SECS_PER_YEAR;
    let months = rest / SECS_PER_MONTH;
    rest %= SECS_PER_MONTH;
    format!(
        "{}y{}M{}d{}",
        years,
        months,
        rest / SECS_PER_DAY,
        short_duration(rest % SECS_PER_DAY)
    )
}

/// Describes `t` relative to `now`: "now", "3 days ago", "2 hours from now".
pub fn relative_time(t: DateTime<Local>, now: DateTime<Local>) -> String {
    let diff = now.signed_duration_since(t);
    let (secs, suffix) = if diff >= chrono::Duration::zero() {
        (diff.num_seconds(), "ago")
    } else {
        ((-diff).num_seconds(), "from now")
    };
    if secs < 2 {
        return "now".to_string();
    }
    let (amount, unit) = if secs < 60 {
        (secs, "second")
    } else if secs < 3600 {
        (secs / 60, "minute")
    } else if secs < SECS_PER_DAY {
        (secs / 3600, "hour")
    } else if secs < 7 * SECS_PER_DAY {
        (secs / SECS_PER_DAY, "day")
    } else if secs < SECS_PER_MONTH {
        (secs / (7 * SECS_PER_DAY), "week")
    } else if secs < SECS_PER_YEAR {
        (secs / SECS_PER_MONTH, "month")
    } else {
        (secs / SECS_PER_YEAR, "year")
    };
    if amount == 1 {
        format!("1 {unit} {suffix}")
    } else {
        format!("{amount} {unit}s {suffix}")
    }
}
