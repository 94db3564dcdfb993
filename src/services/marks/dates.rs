use time::{Date, Month};

/// Parses a `YYYY/MM/DD` release date. Month and day may omit the leading zero.
///
/// `None` marks the date as unparsable; callers order it before every real date,
/// which `Option<Date>`'s own ordering already does.
pub(crate) fn parse_release_date(raw: &str) -> Option<Date> {
    let mut parts = raw.trim().split('/');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    if !(1..=2).contains(&month.len()) || !all_digits(month) {
        return None;
    }
    if !(1..=2).contains(&day.len()) || !all_digits(day) {
        return None;
    }

    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()
}

fn all_digits(value: &str) -> bool {
    value.chars().all(|ch| ch.is_ascii_digit())
}
