use chrono::{DateTime, TimeZone};

pub(super) fn current_time<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Current time is {}", now.format("%I:%M %p"))
}

pub(super) fn current_date<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Today is {}", now.format("%A, %d %B %Y"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{current_date, current_time};

    #[test]
    fn formats_twelve_hour_time() {
        let afternoon = Utc.with_ymd_and_hms(2026, 3, 7, 15, 4, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2026, 3, 7, 9, 30, 0).unwrap();

        assert_eq!(current_time(afternoon), "Current time is 03:04 PM");
        assert_eq!(current_time(morning), "Current time is 09:30 AM");
    }

    #[test]
    fn formats_long_date() {
        let day = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(current_date(day), "Today is Saturday, 07 March 2026");
    }
}
