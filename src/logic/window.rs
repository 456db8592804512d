use crate::error::{OrchardOpsError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Last day included in a trailing analysis window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowEnd {
    /// Window runs up to and including today
    #[default]
    Today,
    /// Window stops at yesterday, leaving out the partial current day
    Yesterday,
}

impl WindowEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowEnd::Today => "today",
            WindowEnd::Yesterday => "yesterday",
        }
    }
}

/// Trailing date range used to request history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub days: u32,
    pub end: WindowEnd,
}

impl AnalysisWindow {
    pub fn new(days: u32, end: WindowEnd) -> Self {
        Self { days, end }
    }

    /// Inclusive `(from, to)` dates relative to the caller's `today`
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let to = match self.end {
            WindowEnd::Today => Some(today),
            WindowEnd::Yesterday => today.checked_sub_days(Days::new(1)),
        };
        let from = to.and_then(|to| to.checked_sub_days(Days::new(u64::from(self.days))));

        match (from, to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(OrchardOpsError::Config(format!(
                "a {}-day window ending {} is out of range",
                self.days,
                self.end.as_str()
            ))),
        }
    }
}
