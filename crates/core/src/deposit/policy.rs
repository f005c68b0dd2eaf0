//! Deposit cap arithmetic.
//!
//! All comparisons are exact integer math: `amount <= outstanding * pct / 100`
//! is evaluated as `amount * 100 <= outstanding * pct` in `i128`.

use serde::{Deserialize, Serialize};
use settle_shared::config::DepositConfig;
use settle_shared::types::Money;

use super::error::DepositRejection;

/// Default share of outstanding obligations that may be deposited.
pub const DEFAULT_CAP_PERCENT: u8 = 25;

/// Decides whether a deposit fits under the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPolicy {
    cap_percent: u8,
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CAP_PERCENT)
    }
}

impl From<DepositConfig> for DepositPolicy {
    fn from(config: DepositConfig) -> Self {
        Self::new(config.cap_percent)
    }
}

impl DepositPolicy {
    /// Creates a policy allowing deposits up to `cap_percent`% of the outstanding total.
    #[must_use]
    pub const fn new(cap_percent: u8) -> Self {
        Self { cap_percent }
    }

    /// Returns the configured percentage.
    #[must_use]
    pub const fn cap_percent(&self) -> u8 {
        self.cap_percent
    }

    /// Sums outstanding obligation prices.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the total does not fit in minor units.
    pub fn outstanding_total<I>(prices: I) -> Result<Money, DepositRejection>
    where
        I: IntoIterator<Item = Money>,
    {
        Money::checked_sum(prices).ok_or(DepositRejection::Overflow)
    }

    /// Largest deposit accepted for `outstanding`, rounded down to whole minor units.
    #[must_use]
    pub fn cap(&self, outstanding: Money) -> Money {
        let scaled = i128::from(outstanding.minor().max(0)) * i128::from(self.cap_percent) / 100;
        // outstanding <= i64::MAX and cap_percent <= 255, so the quotient can
        // only exceed i64 for caps above 100%.
        Money::from_minor(i64::try_from(scaled).unwrap_or(i64::MAX))
    }

    /// Checks `amount` against the cap for `outstanding`.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` for zero/negative deposits and
    /// `CapExceeded` when the amount is above the cap.
    pub fn authorize(&self, amount: Money, outstanding: Money) -> Result<(), DepositRejection> {
        if !amount.is_positive() {
            return Err(DepositRejection::NonPositiveAmount(amount));
        }

        let requested = i128::from(amount.minor()) * 100;
        let allowed = i128::from(outstanding.minor().max(0)) * i128::from(self.cap_percent);

        if requested > allowed {
            return Err(DepositRejection::CapExceeded {
                cap: self.cap(outstanding),
                requested: amount,
                outstanding,
            });
        }

        Ok(())
    }

    /// Balance after crediting `amount`.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the balance cannot hold the credit.
    pub fn credit(balance: Money, amount: Money) -> Result<Money, DepositRejection> {
        balance.checked_add(amount).ok_or(DepositRejection::Overflow)
    }
}
