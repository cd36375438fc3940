use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Applicants younger than this are refused.
pub const MINIMUM_AGE: i32 = 18;

/// Parse a `YYYY-MM-DD` birth date.
///
/// Returns `None` when the shape is wrong or the date does not exist on the
/// calendar (e.g. `2001-02-30`).
#[must_use]
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    if !Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").is_ok_and(|regex| regex.is_match(value)) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Whole years elapsed between `birth` and `today`.
///
/// The year difference is reduced by one while this year's birthday is still
/// ahead. Birth dates in the future yield a negative age.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_only_completed_years() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(2006, 6, 15), today), 18);
        assert_eq!(age_on(date(2006, 6, 16), today), 17);
        assert_eq!(age_on(date(2006, 7, 1), today), 17);
        assert_eq!(age_on(date(2006, 5, 31), today), 18);
    }

    #[test]
    fn leap_day_birthday_waits_for_march_in_common_years() {
        let birth = date(2004, 2, 29);
        assert_eq!(age_on(birth, date(2022, 2, 28)), 17);
        assert_eq!(age_on(birth, date(2022, 3, 1)), 18);
    }

    #[test]
    fn future_birth_date_is_negative() {
        assert!(age_on(date(2030, 1, 1), date(2024, 6, 15)) < 0);
    }

    #[test]
    fn parse_birth_date_requires_iso_shape() {
        assert_eq!(parse_birth_date("1990-01-31"), Some(date(1990, 1, 31)));
        assert_eq!(parse_birth_date("1990-1-31"), None);
        assert_eq!(parse_birth_date("01/31/1990"), None);
        assert_eq!(parse_birth_date("1990-02-30"), None);
        assert_eq!(parse_birth_date(""), None);
    }

    #[test]
    fn parse_birth_date_rejects_non_ascii_digits() {
        assert_eq!(parse_birth_date("١٩٩٠-٠١-٣١"), None);
        assert_eq!(parse_birth_date("１９９０-０１-３１"), None);
    }
}
