//! Weekly expiry calendar math.
//!
//! NIFTY weekly contracts expire on a fixed weekday. The applicable expiry
//! for a new order is the next occurrence of that weekday on or after
//! "now"; past the cutoff hour on expiry day itself, the following week's
//! contract applies. Pure calendar arithmetic, no I/O.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

/// Maps the config's 0=Sunday..6=Saturday index to a chrono weekday.
#[must_use]
pub fn weekday_from_index(index: u8) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Computes the nearest weekly expiry date for `now`.
///
/// Returns the next occurrence of `expiry_weekday` on or after `now`'s
/// date. When `now` falls on the expiry weekday but the hour is strictly
/// past `cutoff_hour`, the contract has ceased trading and the following
/// week's occurrence is returned instead.
#[must_use]
pub fn nearest_weekly_expiry(
    now: NaiveDateTime,
    expiry_weekday: Weekday,
    cutoff_hour: u32,
) -> chrono::NaiveDate {
    let today = now.date();
    let mut days_ahead = (expiry_weekday.num_days_from_sunday() + 7
        - today.weekday().num_days_from_sunday())
        % 7;
    if days_ahead == 0 && now.hour() > cutoff_hour {
        days_ahead = 7;
    }
    today + chrono::Duration::days(i64::from(days_ahead))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn midweek_resolves_to_coming_thursday() {
        // 2026-08-25 is a Tuesday; the coming Thursday is the 27th.
        let expiry = nearest_weekly_expiry(at(2026, 8, 25, 11), Weekday::Thu, 16);
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 8, 27).unwrap());
    }

    #[test]
    fn expiry_day_before_cutoff_stays_on_today() {
        let expiry = nearest_weekly_expiry(at(2026, 8, 27, 14), Weekday::Thu, 16);
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 8, 27).unwrap());
    }

    #[test]
    fn expiry_day_at_cutoff_hour_still_counts_as_today() {
        // Strictly-greater-than comparison: 16:59 is inside hour 16.
        let expiry = nearest_weekly_expiry(at(2026, 8, 27, 16), Weekday::Thu, 16);
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 8, 27).unwrap());
    }

    #[test]
    fn expiry_day_past_cutoff_rolls_a_week() {
        let expiry = nearest_weekly_expiry(at(2026, 8, 27, 17), Weekday::Thu, 16);
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 9, 3).unwrap());
    }

    #[test]
    fn friday_rolls_to_next_week() {
        let expiry = nearest_weekly_expiry(at(2026, 8, 28, 10), Weekday::Thu, 16);
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 9, 3).unwrap());
    }

    #[test]
    fn non_expiry_weekday_always_lands_within_seven_days_on_target() {
        for day in 20..=31 {
            let now = at(2026, 8, day.min(31), 10);
            let expiry = nearest_weekly_expiry(now, Weekday::Thu, 16);
            assert_eq!(expiry.weekday(), Weekday::Thu);
            let delta = (expiry - now.date()).num_days();
            assert!((0..7).contains(&delta), "day {day}: delta {delta}");
        }
    }

    #[test]
    fn weekday_index_mapping() {
        assert_eq!(weekday_from_index(0), Weekday::Sun);
        assert_eq!(weekday_from_index(2), Weekday::Tue);
        assert_eq!(weekday_from_index(4), Weekday::Thu);
        assert_eq!(weekday_from_index(6), Weekday::Sat);
    }
}
