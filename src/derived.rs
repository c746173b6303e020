//! Derived fields. Everything here is recomputed from its inputs on every
//! call; nothing is cached alongside the records it describes.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const DISPLAY_DATE: &str = "%-d %B %Y";
const DISPLAY_TIME: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Partial,
        PaymentStatus::Paid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partial payment",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a quote from what has been paid so far.
///
/// The checks run in a fixed order: a non-positive advance is always
/// `Pending`, even when the amount itself is zero or negative.
pub fn payment_status(amount: f64, advance: f64) -> PaymentStatus {
    if advance <= 0.0 {
        PaymentStatus::Pending
    } else if advance >= amount {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}

/// Balance still owed. Over-payment yields a negative value.
pub fn remaining(amount: f64, advance: f64) -> f64 {
    amount - advance
}

/// Share of the amount already paid, rounded to a whole percent.
/// `None` when the amount is zero.
pub fn payment_ratio(amount: f64, advance: f64) -> Option<i64> {
    if amount == 0.0 {
        return None;
    }
    Some((advance / amount * 100.0).round() as i64)
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// "5 August 2025" for single-day events, "5 August 2025 - 7 August 2025" otherwise.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        display_date(start)
    } else {
        format!("{} - {}", display_date(start), display_date(end))
    }
}

pub fn time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} - {}", start.format(DISPLAY_TIME), end.format(DISPLAY_TIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10000.0, 0.0, PaymentStatus::Pending)]
    #[case(10000.0, 10000.0, PaymentStatus::Paid)]
    #[case(10000.0, 5000.0, PaymentStatus::Partial)]
    #[case(10000.0, 12000.0, PaymentStatus::Paid)]
    #[case(10000.0, -50.0, PaymentStatus::Pending)]
    #[case(0.0, 0.0, PaymentStatus::Pending)]
    #[case(0.0, 10.0, PaymentStatus::Paid)]
    fn status_follows_amount_and_advance(
        #[case] amount: f64,
        #[case] advance: f64,
        #[case] expected: PaymentStatus,
    ) {
        assert_eq!(payment_status(amount, advance), expected);
    }

    #[test]
    fn status_for_any_positive_amount() {
        for amount in [1.0, 99.5, 8500.0, 1_000_000.0] {
            assert_eq!(payment_status(amount, 0.0), PaymentStatus::Pending);
            assert_eq!(payment_status(amount, amount), PaymentStatus::Paid);
            assert_eq!(payment_status(amount, amount / 2.0), PaymentStatus::Partial);
        }
    }

    #[test]
    fn remaining_is_not_clamped() {
        assert_eq!(remaining(10000.0, 5000.0), 5000.0);
        assert_eq!(remaining(15000.0, 15000.0), 0.0);
        assert_eq!(remaining(8000.0, 9000.0), -1000.0);
    }

    #[test]
    fn ratio_rounds_to_whole_percent() {
        assert_eq!(payment_ratio(10000.0, 5000.0), Some(50));
        assert_eq!(payment_ratio(3.0, 1.0), Some(33));
        assert_eq!(payment_ratio(8500.0, 3000.0), Some(35));
        assert_eq!(payment_ratio(0.0, 100.0), None);
    }

    #[test]
    fn single_day_range_shows_one_date() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        assert_eq!(date_range(day, day), "5 August 2025");
    }

    #[test]
    fn multi_day_range_joins_both_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 7).unwrap();
        assert_eq!(date_range(start, end), "5 August 2025 - 7 August 2025");
    }

    #[test]
    fn time_range_uses_hours_and_minutes() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        assert_eq!(time_range(start, end), "09:00 - 18:30");
    }
}
