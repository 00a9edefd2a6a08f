//! Distance units and the "today" query window
//!
//! Distance is reported in miles everywhere above the provider layer.
//! Providers whose native SDK hands back meters convert with
//! [`meters_to_miles`].

use chrono::{DateTime, Local, TimeZone};

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// Convert a distance in meters to miles
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Local calendar-day window used for "today" queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    /// Start of the local day (midnight, or the earliest valid instant after a DST gap)
    pub start: DateTime<Local>,
    /// Query moment
    pub end: DateTime<Local>,
}

impl DayRange {
    /// Window from the start of the current local day until now
    pub fn today() -> Self {
        Self::ending_at(Local::now())
    }

    /// Window from the start of `now`'s local day until `now`
    pub fn ending_at(now: DateTime<Local>) -> Self {
        let start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
            .unwrap_or(now);

        Self { start, end: now }
    }

    /// RFC 3339 rendering of both bounds, as native SDKs expect them
    pub fn to_rfc3339(&self) -> (String, String) {
        (self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_one_mile_of_meters() {
        assert!((meters_to_miles(1609.344) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_meters() {
        assert_eq!(meters_to_miles(0.0), 0.0);
    }

    #[test]
    fn test_half_marathon() {
        let miles = meters_to_miles(21_097.5);
        assert!((miles - 13.109).abs() < 0.001);
    }

    #[test]
    fn test_day_range_starts_at_midnight() {
        let now = Local
            .with_ymd_and_hms(2024, 6, 12, 15, 42, 7)
            .earliest()
            .unwrap();
        let range = DayRange::ending_at(now);

        assert_eq!(range.end, now);
        assert_eq!(range.start.date_naive(), now.date_naive());
        assert_eq!(range.start.hour(), 0);
        assert_eq!(range.start.minute(), 0);
        assert_eq!(range.start.second(), 0);
        assert!(range.start <= range.end);
    }

    #[test]
    fn test_day_range_at_midnight_is_empty() {
        let now = Local
            .with_ymd_and_hms(2024, 6, 12, 0, 0, 0)
            .earliest()
            .unwrap();
        let range = DayRange::ending_at(now);
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn test_today_ends_now() {
        let before = Local::now();
        let range = DayRange::today();
        assert!(range.end >= before);
        assert!(range.start <= range.end);
    }

    #[test]
    fn test_rfc3339_bounds() {
        let now = Local
            .with_ymd_and_hms(2024, 6, 12, 8, 0, 0)
            .earliest()
            .unwrap();
        let (start, end) = DayRange::ending_at(now).to_rfc3339();
        assert!(start.starts_with("2024-06-12T00:00:00"));
        assert!(end.starts_with("2024-06-12T08:00:00"));
    }
}
