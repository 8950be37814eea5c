//! Create-market form input.

use crate::error::{Error, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Raw create-market input as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketForm {
    pub question: String,
    /// `YYYY-MM-DD`.
    pub resolve_date: String,
    /// `HH:MM` or `HH:MM:SS`, local time.
    pub resolve_time: String,
}

/// Validated create-market input, consumed by the payload builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDraft {
    pub question: String,
    pub resolve_epoch_seconds: i64,
}

impl MarketForm {
    pub fn new(
        question: impl Into<String>,
        resolve_date: impl Into<String>,
        resolve_time: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            resolve_date: resolve_date.into(),
            resolve_time: resolve_time.into(),
        }
    }

    /// Whether any required field is blank.
    pub fn has_missing_fields(&self) -> bool {
        [&self.question, &self.resolve_date, &self.resolve_time]
            .iter()
            .any(|field| field.trim().is_empty())
    }

    /// Resolution date and time combined in the local time zone.
    pub fn resolve_epoch_seconds(&self) -> Result<i64> {
        let date = NaiveDate::parse_from_str(self.resolve_date.trim(), "%Y-%m-%d").map_err(|_| {
            Error::validation(format!("Invalid resolution date '{}'", self.resolve_date))
        })?;

        let time_str = self.resolve_time.trim();
        let time = NaiveTime::parse_from_str(time_str, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
            .map_err(|_| {
                Error::validation(format!("Invalid resolution time '{}'", self.resolve_time))
            })?;

        Local
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| Error::validation("Resolution time does not exist in the local time zone"))
    }

    /// Validate against `now_epoch_seconds` and produce a draft.
    pub fn to_draft(&self, now_epoch_seconds: i64) -> Result<MarketDraft> {
        if self.has_missing_fields() {
            return Err(Error::validation(
                "Question, resolution date and resolution time are required",
            ));
        }

        let resolve_epoch_seconds = self.resolve_epoch_seconds()?;
        if resolve_epoch_seconds <= now_epoch_seconds {
            return Err(Error::validation("Resolution time must be in the future"));
        }

        Ok(MarketDraft {
            question: self.question.clone(),
            resolve_epoch_seconds,
        })
    }

    /// Reset after a submission.
    pub fn clear(&mut self) {
        self.question.clear();
        self.resolve_date.clear();
        self.resolve_time.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn test_future_resolution() {
        let form = MarketForm::new("Will it rain?", "2999-01-01", "12:00");
        let draft = form.to_draft(now()).unwrap();

        assert_eq!(draft.question, "Will it rain?");
        assert!(draft.resolve_epoch_seconds > now());
    }

    #[test]
    fn test_past_resolution_rejected() {
        let form = MarketForm::new("Will it rain?", "2001-09-09", "01:46");
        let err = form.to_draft(now()).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("future")));
    }

    #[test]
    fn test_resolution_equal_to_now_rejected() {
        let form = MarketForm::new("Q", "2030-06-15", "08:30:00");
        let ts = form.resolve_epoch_seconds().unwrap();

        assert!(form.to_draft(ts).is_err());
        assert!(form.to_draft(ts - 1).is_ok());
    }

    #[test]
    fn test_seconds_are_optional() {
        let short = MarketForm::new("Q", "2030-06-15", "08:30");
        let long = MarketForm::new("Q", "2030-06-15", "08:30:00");
        assert_eq!(
            short.resolve_epoch_seconds().unwrap(),
            long.resolve_epoch_seconds().unwrap()
        );
    }

    #[test]
    fn test_missing_fields() {
        let form = MarketForm::new("  ", "2999-01-01", "12:00");
        assert!(form.has_missing_fields());
        assert!(matches!(form.to_draft(now()), Err(Error::Validation(_))));
    }

    #[test]
    fn test_malformed_date() {
        let form = MarketForm::new("Q", "01/01/2999", "12:00");
        assert!(matches!(form.to_draft(now()), Err(Error::Validation(msg)) if msg.contains("date")));
    }

    #[test]
    fn test_clear() {
        let mut form = MarketForm::new("Q", "2999-01-01", "12:00");
        form.clear();
        assert_eq!(form, MarketForm::default());
    }
}
