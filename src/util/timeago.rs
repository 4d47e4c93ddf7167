//! Relative and absolute rendering of backend timestamps (nanoseconds since the epoch).

use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const SAME_YEAR: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none]");
const OTHER_YEAR: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Short relative age (`<1m`, `42s`, `5m`, `3h`, `6d`), falling back to an
/// absolute date for anything a week old or older.
pub fn time_ago(timestamp_nanos: u64, now_nanos: u64) -> String {
    let delta = now_nanos.saturating_sub(timestamp_nanos) / NANOS_PER_SECOND;
    match delta {
        d if d < 30 => "<1m".to_string(),
        d if d < MINUTE => format!("{d}s"),
        d if d < HOUR => format!("{}m", d / MINUTE),
        d if d < DAY => format!("{}h", d / HOUR),
        d if d < 7 * DAY => format!("{}d", d / DAY),
        _ => absolute_date(timestamp_nanos, now_nanos),
    }
}

/// `Mar 4` within the current year, `Mar 4, 2024` otherwise.
pub fn absolute_date(timestamp_nanos: u64, now_nanos: u64) -> String {
    let (Some(then), Some(now)) = (to_datetime(timestamp_nanos), to_datetime(now_nanos)) else {
        return String::new();
    };
    let format = if then.year() == now.year() {
        SAME_YEAR
    } else {
        OTHER_YEAR
    };
    then.format(format).unwrap_or_default()
}

fn to_datetime(nanos: u64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).ok()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn nanos(value: OffsetDateTime) -> u64 {
        u64::try_from(value.unix_timestamp_nanos()).expect("post-epoch timestamp")
    }

    #[test]
    fn relative_buckets() {
        let now = nanos(datetime!(2026-10-18 12:00 UTC));
        let ago = |seconds: u64| now - seconds * NANOS_PER_SECOND;

        assert_eq!(time_ago(ago(5), now), "<1m");
        assert_eq!(time_ago(ago(45), now), "45s");
        assert_eq!(time_ago(ago(11 * MINUTE), now), "11m");
        assert_eq!(time_ago(ago(3 * HOUR + 59), now), "3h");
        assert_eq!(time_ago(ago(6 * DAY), now), "6d");
    }

    #[test]
    fn future_timestamps_count_as_now() {
        let now = nanos(datetime!(2026-10-18 12:00 UTC));
        assert_eq!(time_ago(now + NANOS_PER_SECOND * 90, now), "<1m");
    }

    #[test]
    fn older_than_a_week_uses_dates() {
        let now = nanos(datetime!(2026-10-18 12:00 UTC));

        assert_eq!(time_ago(nanos(datetime!(2026-03-04 08:00 UTC)), now), "Mar 4");
        assert_eq!(
            time_ago(nanos(datetime!(2024-12-25 08:00 UTC)), now),
            "Dec 25, 2024"
        );
    }
}
