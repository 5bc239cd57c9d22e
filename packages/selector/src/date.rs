//! Validation of user-supplied `YYYYMMDD` dates.
//!
//! A date is accepted when it is a real calendar date, not earlier than
//! the first published feed, not after today in the publisher's timezone,
//! and, if it is today, only once the daily publication hour has passed.

use chrono::{DateTime, NaiveDate, Timelike as _, Utc};
use chrono_tz::Tz;

/// Why a date answer was rejected. Every variant is recoverable: the
/// prompt shows the message and asks again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateValidationError {
    #[error("'{input}' is not a date in the format YYYYMMDD")]
    WrongFormat { input: String },

    #[error("'{input}' is not a valid calendar date")]
    InvalidCalendarDate { input: String },

    #[error("{date} is before the first available date ({earliest})")]
    BeforeEarliest { date: NaiveDate, earliest: NaiveDate },

    #[error("{date} is in the future (today is {today})")]
    InFuture { date: NaiveDate, today: NaiveDate },

    #[error("Today's data will be released after {hour}:00 ({timezone})")]
    NotYetPublished { hour: u32, timezone: Tz },
}

/// Bounds on which daily feeds exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRules {
    /// First date with a published feed.
    pub earliest: NaiveDate,
    /// Publisher's timezone; "today" is evaluated here.
    pub timezone: Tz,
    /// Local hour at which today's feed is published.
    pub publication_hour: u32,
}

impl DateRules {
    /// Validates `input` as of the instant `now`.
    ///
    /// # Errors
    ///
    /// Returns the first [`DateValidationError`] that applies.
    pub fn validate(&self, input: &str, now: DateTime<Tz>) -> Result<NaiveDate, DateValidationError> {
        let input = input.trim();
        let date = parse_compact_date(input)?;

        if date < self.earliest {
            return Err(DateValidationError::BeforeEarliest {
                date,
                earliest: self.earliest,
            });
        }

        let now = now.with_timezone(&self.timezone);
        let today = now.date_naive();

        if date > today {
            return Err(DateValidationError::InFuture { date, today });
        }
        if date == today && now.hour() < self.publication_hour {
            return Err(DateValidationError::NotYetPublished {
                hour: self.publication_hour,
                timezone: self.timezone,
            });
        }

        Ok(date)
    }

    /// Validates `input` against the current wall clock.
    ///
    /// # Errors
    ///
    /// See [`DateRules::validate`].
    pub fn validate_now(&self, input: &str) -> Result<NaiveDate, DateValidationError> {
        self.validate(input, Utc::now().with_timezone(&self.timezone))
    }
}

fn parse_compact_date(input: &str) -> Result<NaiveDate, DateValidationError> {
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateValidationError::WrongFormat {
            input: input.to_owned(),
        });
    }

    let invalid = || DateValidationError::InvalidCalendarDate {
        input: input.to_owned(),
    };
    let year: i32 = input[..4].parse().map_err(|_| invalid())?;
    let month: u32 = input[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = input[6..].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use chrono_tz::Europe::Rome;

    use super::*;

    fn rules() -> DateRules {
        DateRules {
            earliest: NaiveDate::from_ymd_opt(2020, 2, 24).unwrap(),
            timezone: Rome,
            publication_hour: 17,
        }
    }

    fn evening() -> DateTime<Tz> {
        Rome.with_ymd_and_hms(2021, 6, 5, 18, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_earliest_date() {
        assert_eq!(rules().validate("20200224", evening()), Ok(ymd(2020, 2, 24)));
    }

    #[test]
    fn rejects_day_before_earliest() {
        assert!(matches!(
            rules().validate("20200223", evening()),
            Err(DateValidationError::BeforeEarliest { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input_without_panicking() {
        for input in ["2020022a", "2020224", "202002245", "", "total", "2020-02-24", "２０２００２２４"] {
            assert!(
                matches!(
                    rules().validate(input, evening()),
                    Err(DateValidationError::WrongFormat { .. })
                ),
                "{input} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        for input in ["20210230", "20211301", "20210000", "20210431"] {
            assert!(matches!(
                rules().validate(input, evening()),
                Err(DateValidationError::InvalidCalendarDate { .. })
            ));
        }
    }

    #[test]
    fn accepts_leap_day() {
        let now = Rome.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(rules().validate("20240229", now), Ok(ymd(2024, 2, 29)));
        assert_eq!(rules().validate("20200229", now), Ok(ymd(2020, 2, 29)));
    }

    #[test]
    fn rejects_future_dates() {
        assert!(matches!(
            rules().validate("20210606", evening()),
            Err(DateValidationError::InFuture { .. })
        ));
    }

    #[test]
    fn today_requires_publication_hour() {
        assert_eq!(rules().validate("20210605", evening()), Ok(ymd(2021, 6, 5)));

        let morning = Rome.with_ymd_and_hms(2021, 6, 5, 10, 0, 0).unwrap();
        assert_eq!(
            rules().validate("20210605", morning),
            Err(DateValidationError::NotYetPublished {
                hour: 17,
                timezone: Rome
            })
        );
        assert_eq!(rules().validate("20210604", morning), Ok(ymd(2021, 6, 4)));
    }

    #[test]
    fn today_is_evaluated_in_publisher_timezone() {
        // 23:30 UTC on June 5th is already 01:30 on June 6th in Rome.
        let utc_late = Utc.with_ymd_and_hms(2021, 6, 5, 23, 30, 0).unwrap();
        let now = utc_late.with_timezone(&chrono_tz::UTC);
        assert!(matches!(
            rules().validate("20210606", now),
            Err(DateValidationError::NotYetPublished { .. })
        ));
    }
}
