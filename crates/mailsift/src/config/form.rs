//! Turns the raw values a user types into the form into typed scan inputs.

use chrono::{DateTime, NaiveDate};

use crate::criteria::{Criteria, DEFAULT_REQUIRED_TERMS};
use crate::email::ScanMode;
use crate::error::ConfigError;

/// Form state as entered: free-text lists and the optional mode inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    /// Comma-separated keywords; blank means "no keyword filter".
    pub keywords: String,
    /// Comma-separated terms that must all be present.
    pub required_terms: String,
    /// Count-limited mode when set.
    pub max_messages: Option<usize>,
    /// Date-limited mode when both dates are set.
    pub since: Option<String>,
    pub until: Option<String>,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            required_terms: DEFAULT_REQUIRED_TERMS.join(", "),
            max_messages: None,
            since: None,
            until: None,
        }
    }
}

impl FormInput {
    pub fn criteria(&self, max_pages: usize) -> Criteria {
        Criteria::new(parse_list(&self.keywords), parse_list(&self.required_terms))
            .with_max_pages(max_pages)
    }

    /// Resolves the selected mode. Count and date limits are mutually exclusive.
    pub fn mode(&self) -> Result<ScanMode, ConfigError> {
        match (self.max_messages, self.since.as_deref(), self.until.as_deref()) {
            (None, None, None) => Ok(ScanMode::All),
            (Some(0), None, None) => Err(ConfigError::Validation {
                message: "maximum number of emails must be at least 1".to_string(),
            }),
            (Some(max_messages), None, None) => Ok(ScanMode::CountLimited { max_messages }),
            (None, Some(since), Some(until)) => {
                let start = parse_date(since)?;
                let end = parse_date(until)?;
                if start > end {
                    return Err(ConfigError::InvalidDateRange {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
                Ok(ScanMode::DateLimited { start, end })
            }
            (None, _, _) => Err(ConfigError::Validation {
                message: "date-limited mode needs both a start and an end date".to_string(),
            }),
            (Some(_), _, _) => Err(ConfigError::Validation {
                message: "choose either a message limit or a date range, not both".to_string(),
            }),
        }
    }
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `YYYY-MM-DD` or an ISO 8601 timestamp into a calendar date.
fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }

    Err(ConfigError::InvalidDate {
        value: value.to_string(),
    })
}
