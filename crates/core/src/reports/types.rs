//! Report data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settle_shared::types::{AccountId, Money, ObligationId};

use super::error::ReportInputError;

/// Row limit for the top-paying accounts report when none is given.
pub const DEFAULT_TOP_ACCOUNTS_LIMIT: u64 = 2;

/// Inclusive payment-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a window covering `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReportInputError> {
        if start > end {
            return Err(ReportInputError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Start of the window (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the window (inclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Parameters of the top-paying accounts report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopAccountsQuery {
    /// Payment-date window.
    pub range: DateRange,
    /// Maximum number of rows returned.
    pub limit: u64,
}

impl TopAccountsQuery {
    /// Creates a query, falling back to [`DEFAULT_TOP_ACCOUNTS_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimit` if `limit` is zero.
    pub fn new(range: DateRange, limit: Option<u64>) -> Result<Self, ReportInputError> {
        Self::with_default(range, limit, DEFAULT_TOP_ACCOUNTS_LIMIT)
    }

    /// Creates a query, falling back to `default_limit` when `limit` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimit` if the effective limit is zero.
    pub fn with_default(
        range: DateRange,
        limit: Option<u64>,
        default_limit: u64,
    ) -> Result<Self, ReportInputError> {
        let limit = limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(ReportInputError::InvalidLimit);
        }
        Ok(Self { range, limit })
    }
}

/// What paid obligations are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKey {
    /// Category of the payee account on the obligation's relationship.
    PayeeCategory,
    /// Payer account on the obligation's relationship.
    PayerAccount,
}

/// A paid obligation flattened with the account data the reports group on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidObligation {
    /// Obligation ID.
    pub obligation_id: ObligationId,
    /// Price paid.
    pub price: Money,
    /// When the obligation was paid.
    pub payment_date: DateTime<Utc>,
    /// Payer account ID.
    pub payer_id: AccountId,
    /// Payer display name.
    pub payer_name: String,
    /// Payee category (e.g. profession).
    pub payee_category: String,
}

/// Resolved value of an [`AggregationKey`] for one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    /// A payee category.
    Category {
        /// Category name.
        category: String,
    },
    /// A payer account.
    Account {
        /// Account ID.
        account_id: AccountId,
        /// Display name.
        display_name: String,
    },
}

/// Sum of prices for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    /// Group.
    pub key: GroupKey,
    /// Sum of prices in the group.
    pub total: Money,
}

/// Result of the top-earning category report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEarnings {
    /// Category with the highest earnings.
    pub category: String,
    /// Earnings of that category in the window.
    pub total_earned: Money,
}

/// One row of the top-paying accounts report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayment {
    /// Payer account ID.
    pub account_id: AccountId,
    /// Payer display name.
    pub display_name: String,
    /// Total paid in the window.
    pub total_paid: Money,
}
