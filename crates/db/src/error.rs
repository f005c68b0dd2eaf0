//! Failure taxonomy shared by every repository in this crate.

use sea_orm::{DbErr, RuntimeErr, sqlx};
use settle_core::deposit::DepositRejection;
use settle_core::reports::ReportInputError;
use settle_core::settlement::SettlementRejection;
use settle_shared::AppError;
use settle_shared::types::Money;
use uuid::Uuid;

/// `PostgreSQL` SQLSTATEs for serialization failure and deadlock.
const RETRYABLE_SQLSTATES: &[&str] = &["40001", "40P01"];

/// `SQLite` primary result codes `SQLITE_BUSY` and `SQLITE_LOCKED`.
const RETRYABLE_SQLITE_CODES: &[i32] = &[5, 6];

/// Driver message fragments checked when no error code is available.
const RETRYABLE_MARKERS: &[&str] = &[
    "40001",
    "40p01",
    "could not serialize",
    "deadlock detected",
    "database is locked",
    "database table is locked",
];

/// Outcome of a failed engine, guard, reporter or store operation.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Entity absent, or not visible to the acting account.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The obligation was paid before.
    #[error("Obligation {0} is already settled")]
    AlreadySettled(Uuid),

    /// The payer cannot cover the price.
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        /// Payer balance.
        available: Money,
        /// Obligation price.
        required: Money,
    },

    /// Deposit is above the cap derived from outstanding obligations.
    #[error("Can't deposit {requested}: limit is {cap} ({outstanding} outstanding)")]
    DepositCapExceeded {
        /// Largest accepted deposit.
        cap: Money,
        /// Rejected amount.
        requested: Money,
        /// Outstanding unpaid total the cap was derived from.
        outstanding: Money,
    },

    /// Malformed or out-of-range input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store failed; the transaction was rolled back.
    #[error("Store failure: {0}")]
    StoreFailure(#[from] DbErr),
}

impl PaymentError {
    pub(crate) fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::DepositCapExceeded { .. } => "DEPOSIT_CAP_EXCEEDED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StoreFailure(_) => "STORE_FAILURE",
        }
    }

    /// Returns true if repeating the call may succeed.
    ///
    /// Only transaction conflicts and pool exhaustion qualify; business
    /// failures are final for the current state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StoreFailure(DbErr::ConnectionAcquire(_)) => true,
            Self::StoreFailure(err) => match driver_error(err) {
                Some(sqlx::Error::PoolTimedOut) => true,
                Some(sqlx::Error::Database(db_err)) => match db_err.code() {
                    Some(code) => is_conflict_code(&code),
                    None => message_marks_conflict(err),
                },
                _ => message_marks_conflict(err),
            },
            _ => false,
        }
    }
}

fn driver_error(err: &DbErr) -> Option<&sqlx::Error> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(inner))
        | DbErr::Exec(RuntimeErr::SqlxError(inner))
        | DbErr::Query(RuntimeErr::SqlxError(inner)) => Some(inner),
        _ => None,
    }
}

fn message_marks_conflict(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    RETRYABLE_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Classifies a driver error code: a five-character SQLSTATE on `PostgreSQL`,
/// a numeric extended result code (at most four digits) on `SQLite`.
fn is_conflict_code(code: &str) -> bool {
    if code.len() == 5 {
        return RETRYABLE_SQLSTATES.contains(&code);
    }
    code.parse::<i32>()
        .is_ok_and(|extended| RETRYABLE_SQLITE_CODES.contains(&(extended & 0xff)))
}

impl From<SettlementRejection> for PaymentError {
    fn from(rejection: SettlementRejection) -> Self {
        match rejection {
            SettlementRejection::AlreadySettled(id) => Self::AlreadySettled(id.into_inner()),
            SettlementRejection::InsufficientFunds {
                available,
                required,
            } => Self::InsufficientFunds {
                available,
                required,
            },
            other @ (SettlementRejection::InvalidPrice(_)
            | SettlementRejection::BalanceOverflow) => Self::Validation(other.to_string()),
        }
    }
}

impl From<DepositRejection> for PaymentError {
    fn from(rejection: DepositRejection) -> Self {
        match rejection {
            DepositRejection::CapExceeded {
                cap,
                requested,
                outstanding,
            } => Self::DepositCapExceeded {
                cap,
                requested,
                outstanding,
            },
            other @ (DepositRejection::NonPositiveAmount(_) | DepositRejection::Overflow) => {
                Self::Validation(other.to_string())
            }
        }
    }
}

impl From<ReportInputError> for PaymentError {
    fn from(err: ReportInputError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::NotFound(_) => Self::NotFound(message),
            PaymentError::AlreadySettled(_) => Self::Conflict(message),
            PaymentError::InsufficientFunds { .. } | PaymentError::DepositCapExceeded { .. } => {
                Self::BusinessRule(message)
            }
            PaymentError::Validation(_) => Self::Validation(message),
            PaymentError::StoreFailure(_) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_shared::types::ObligationId;

    #[test]
    fn test_rejections_map_to_named_kinds() {
        let id = ObligationId::new();
        assert!(matches!(
            PaymentError::from(SettlementRejection::AlreadySettled(id)),
            PaymentError::AlreadySettled(got) if got == id.into_inner()
        ));
        assert!(matches!(
            PaymentError::from(DepositRejection::CapExceeded {
                cap: Money::from_minor(100),
                requested: Money::from_minor(101),
                outstanding: Money::from_minor(400),
            }),
            PaymentError::DepositCapExceeded { cap, .. } if cap == Money::from_minor(100)
        ));
        assert!(matches!(
            PaymentError::from(DepositRejection::NonPositiveAmount(Money::ZERO)),
            PaymentError::Validation(_)
        ));
        assert!(matches!(
            PaymentError::from(ReportInputError::InvalidLimit),
            PaymentError::Validation(_)
        ));
    }

    #[test]
    fn test_app_error_mapping() {
        let cases = [
            (PaymentError::not_found("Obligation", Uuid::nil()), 404),
            (PaymentError::AlreadySettled(Uuid::nil()), 409),
            (
                PaymentError::InsufficientFunds {
                    available: Money::from_minor(100),
                    required: Money::from_minor(150),
                },
                422,
            ),
            (PaymentError::Validation("bad".into()), 400),
            (PaymentError::StoreFailure(DbErr::Custom("boom".into())), 500),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            PaymentError::not_found("Obligation", Uuid::nil()).to_string(),
            "Not found: Obligation 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_cap_message_carries_cap() {
        let err = PaymentError::DepositCapExceeded {
            cap: Money::from_minor(10_025),
            requested: Money::from_minor(20_000),
            outstanding: Money::from_minor(40_100),
        };
        assert_eq!(
            err.to_string(),
            "Can't deposit 200.00: limit is 100.25 (401.00 outstanding)"
        );
    }

    #[test]
    fn test_retryable_only_for_conflicts() {
        assert!(
            PaymentError::StoreFailure(DbErr::Custom(
                "error returned from database: (code: 5) database is locked".into()
            ))
            .is_retryable()
        );
        assert!(
            PaymentError::StoreFailure(DbErr::Custom(
                "could not serialize access due to concurrent update".into()
            ))
            .is_retryable()
        );
        assert!(!PaymentError::StoreFailure(DbErr::Custom("syntax error".into())).is_retryable());
        assert!(!PaymentError::AlreadySettled(Uuid::nil()).is_retryable());
    }

    #[rstest::rstest]
    #[case("40001", true)]
    #[case("40P01", true)]
    #[case("23505", false)]
    #[case("22021", false)]
    #[case("5", true)]
    #[case("517", true)]
    #[case("6", true)]
    #[case("262", true)]
    #[case("19", false)]
    #[case("2067", false)]
    fn test_conflict_codes(#[case] code: &str, #[case] retryable: bool) {
        assert_eq!(is_conflict_code(code), retryable);
    }

    #[test]
    fn test_pool_timeout_is_retryable() {
        let err = DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut));
        assert!(PaymentError::StoreFailure(err).is_retryable());
    }
}
