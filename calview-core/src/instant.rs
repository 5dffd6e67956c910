//! Zoned instants and calendar-day arithmetic.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// A point in time carrying the zone it should be read in.
pub type Instant = DateTime<Tz>;

/// Midnight of the instant's calendar day, in the instant's own zone.
pub fn start_of_day(instant: &Instant) -> Instant {
    let tz = instant.timezone();
    let midnight = instant.date_naive().and_time(NaiveTime::MIN);
    first_valid_local(tz, midnight).unwrap_or(*instant)
}

/// Midnight of `date` in `tz`.
pub fn midnight(tz: Tz, date: NaiveDate) -> Instant {
    let midnight = date.and_time(NaiveTime::MIN);
    first_valid_local(tz, midnight).unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Add whole calendar days, keeping the wall-clock time where the zone allows it.
pub fn add_days(instant: &Instant, days: u64) -> Instant {
    instant
        .checked_add_days(Days::new(days))
        .unwrap_or_else(|| *instant + Duration::days(days as i64))
}

/// Subtract whole calendar days, keeping the wall-clock time where the zone allows it.
pub fn sub_days(instant: &Instant, days: u64) -> Instant {
    instant
        .checked_sub_days(Days::new(days))
        .unwrap_or_else(|| *instant - Duration::days(days as i64))
}

/// Start of the calendar day after the instant's day.
pub fn next_day(instant: &Instant) -> Instant {
    match instant.date_naive().succ_opt() {
        Some(date) => midnight(instant.timezone(), date),
        None => add_days(instant, 1),
    }
}

/// Start of the calendar day before the instant's day.
pub fn previous_day(instant: &Instant) -> Instant {
    match instant.date_naive().pred_opt() {
        Some(date) => midnight(instant.timezone(), date),
        None => sub_days(instant, 1),
    }
}

// Local midnight can fall into a DST gap (e.g. America/Santiago); the day then
// starts at the first representable local time after it.
fn first_valid_local(tz: Tz, local: NaiveDateTime) -> Option<Instant> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => (1..=12).find_map(|step| {
            tz.from_local_datetime(&(local + Duration::minutes(15 * step)))
                .earliest()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::{America, Europe, UTC};

    #[test]
    fn test_start_of_day_uses_instant_zone() {
        let instant = Europe::Paris.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();
        let day = start_of_day(&instant);

        assert_eq!(day, Europe::Paris.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        // 23:00 UTC on the previous day
        assert_eq!(day.with_timezone(&UTC).hour(), 23);
    }

    #[test]
    fn test_start_of_day_skips_dst_gap_at_midnight() {
        // Santiago springs forward at 00:00 -> 01:00 on 2023-09-03
        let instant = America::Santiago.with_ymd_and_hms(2023, 9, 3, 12, 0, 0).unwrap();
        let day = start_of_day(&instant);

        assert_eq!(day.date_naive(), instant.date_naive());
        assert_eq!(day.hour(), 1);
    }

    #[test]
    fn test_add_days_keeps_wall_clock_across_dst() {
        let before = Europe::Paris.with_ymd_and_hms(2024, 3, 30, 9, 0, 0).unwrap();
        let after = add_days(&before, 1);

        assert_eq!(after, Europe::Paris.with_ymd_and_hms(2024, 3, 31, 9, 0, 0).unwrap());
        assert_eq!((after - before).num_hours(), 23);
        assert_eq!(sub_days(&after, 1), before);
    }

    #[test]
    fn test_neighbour_days_start_at_their_first_valid_time() {
        let gap_day = America::Santiago.with_ymd_and_hms(2023, 9, 3, 1, 0, 0).unwrap();

        let previous = previous_day(&gap_day);
        assert_eq!(previous, America::Santiago.with_ymd_and_hms(2023, 9, 2, 0, 0, 0).unwrap());
        assert_eq!(next_day(&previous), gap_day);
        assert_eq!(
            next_day(&gap_day),
            America::Santiago.with_ymd_and_hms(2023, 9, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_midnight_builds_local_day_start() {
        let date = NaiveDate::from_ymd_opt(1984, 1, 7).unwrap();
        assert_eq!(midnight(UTC, date), UTC.with_ymd_and_hms(1984, 1, 7, 0, 0, 0).unwrap());
    }
}
