// ⚙️ Library Configuration
// Everything has a default; the binary overrides from command-line options.

use chrono::{DateTime, Duration, Utc};

/// Default loan length in days
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 30;

/// Longest loan the command line accepts (about a century)
pub const MAX_LOAN_PERIOD_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Days between a borrow and its due date
    pub loan_period_days: i64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }
}

impl LibraryConfig {
    /// Due date of a loan taken at `from`, or `None` when the period
    /// does not fit in a timestamp
    pub fn due_date(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Duration::try_days(self.loan_period_days).and_then(|period| from.checked_add_signed(period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_loan_period() {
        let config = LibraryConfig::default();
        assert_eq!(config.loan_period_days, 30);

        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            config.due_date(from),
            Some(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_due_date_out_of_range_is_none() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        // Too large for chrono::Duration itself
        let config = LibraryConfig {
            loan_period_days: 200_000_000_000,
        };
        assert_eq!(config.due_date(from), None);

        // A valid Duration that still overflows the calendar
        let config = LibraryConfig {
            loan_period_days: 100_000_000,
        };
        assert_eq!(config.due_date(from), None);

        let config = LibraryConfig {
            loan_period_days: MAX_LOAN_PERIOD_DAYS,
        };
        assert!(config.due_date(from).is_some());
    }
}
