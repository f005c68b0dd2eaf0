//! Report error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors in report parameters or aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportInputError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start of the window.
        start: DateTime<Utc>,
        /// End of the window.
        end: DateTime<Utc>,
    },

    /// Row limit must be at least one.
    #[error("Limit must be a positive integer")]
    InvalidLimit,

    /// A group total does not fit in minor units.
    #[error("Total overflow while aggregating")]
    Overflow,
}
