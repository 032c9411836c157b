use chrono::{Local, TimeZone};

/// Render a duration since boot as `H:MM:SS`, prefixed with the day count
/// once uptime passes 24 hours (`3 days, 4:05:06`).
pub fn format_uptime(total_secs: u64) -> String {
    const DAY: u64 = 24 * 60 * 60;

    let days = total_secs / DAY;
    let rest = total_secs % DAY;
    let hours = rest / 3600;
    let minutes = (rest % 3600) / 60;
    let seconds = rest % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Render an epoch timestamp as `YYYY-MM-DD HH:MM:SS` in local time.
/// Returns `None` if the value does not map to a valid local time.
pub fn format_boot_time(epoch_secs: u64) -> Option<String> {
    Local
        .timestamp_opt(epoch_secs as i64, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn uptime_under_a_day() {
        assert_eq!(format_uptime(0), "0:00:00");
        assert_eq!(format_uptime(59), "0:00:59");
        assert_eq!(format_uptime(3 * 3600 + 7 * 60 + 9), "3:07:09");
    }

    #[test]
    fn uptime_day_singular_plural() {
        assert_eq!(format_uptime(86_400), "1 day, 0:00:00");
        assert_eq!(format_uptime(2 * 86_400 + 3661), "2 days, 1:01:01");
    }

    #[test]
    fn boot_time_round_trips() {
        let now = Local::now().timestamp() as u64;
        let rendered = format_boot_time(now).unwrap();
        let parsed = NaiveDateTime::parse_from_str(&rendered, "%Y-%m-%d %H:%M:%S");
        assert!(parsed.is_ok(), "unparseable boot time: {rendered}");
    }
}
