use chrono::{DateTime, Datelike, Months, Utc};

const DAY_MS: f64 = 86_400_000.0;

/// Human relative time between `at` and `now`, e.g. "3 days ago" or "in a minute".
///
/// Whole calendar months are counted first; only the remainder is converted
/// with the average gregorian month length.
pub fn from_now(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let future = at > now;
    let (from, to) = if future { (now, at) } else { (at, now) };

    let (whole, anchor) = whole_months(from, to);
    let rest_days = to.signed_duration_since(anchor).num_milliseconds() as f64 / DAY_MS;
    let total_days = (f64::from(whole) * 146_097.0 / 4800.0).round() + rest_days;
    let total_months = f64::from(whole) + rest_days * 4800.0 / 146_097.0;

    let seconds = (total_days * 86_400.0).round();
    let minutes = (total_days * 1440.0).round();
    let hours = (total_days * 24.0).round();
    let days = total_days.round();
    let months = total_months.round();
    let years = (total_months / 12.0).round();

    let text = if seconds <= 44.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes as u64)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours as u64)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days as u64)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months as u64)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years as u64)
    };

    if future {
        format!("in {}", text)
    } else {
        format!("{} ago", text)
    }
}

/// Calendar months from `from` to `to`, and `from` moved forward by that many.
fn whole_months(from: DateTime<Utc>, to: DateTime<Utc>) -> (u32, DateTime<Utc>) {
    let span = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut whole = u32::try_from(span).unwrap_or(0);
    while whole > 0 {
        match from.checked_add_months(Months::new(whole)) {
            Some(anchor) if anchor <= to => return (whole, anchor),
            _ => whole -= 1,
        }
    }
    (0, from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ago(delta: Duration) -> String {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        from_now(now - delta, now)
    }

    #[test]
    fn past_thresholds() {
        assert_eq!(ago(Duration::seconds(10)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(50)), "a minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::minutes(50)), "an hour ago");
        assert_eq!(ago(Duration::hours(5)), "5 hours ago");
        assert_eq!(ago(Duration::hours(23)), "a day ago");
        assert_eq!(ago(Duration::days(3)), "3 days ago");
        assert_eq!(ago(Duration::days(30)), "a month ago");
        assert_eq!(ago(Duration::days(95)), "3 months ago");
        assert_eq!(ago(Duration::days(365)), "a year ago");
        assert_eq!(ago(Duration::days(365 * 3)), "3 years ago");
    }

    #[test]
    fn months_follow_the_calendar() {
        // 44.5 days, but a whole February plus half of March
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap();
        assert_eq!(from_now(at, now), "2 months ago");

        // month end clamps to the shorter month
        let at = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(from_now(at, now), "a month ago");
    }

    #[test]
    fn future_is_prefixed() {
        assert_eq!(ago(Duration::minutes(-10)), "in 10 minutes");
    }
}
