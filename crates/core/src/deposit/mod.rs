//! Deposit cap rules.
//!
//! A deposit is only allowed up to a fixed share of the account's outstanding
//! unpaid obligations (as payer). The share defaults to 25%.

pub mod error;
pub mod policy;

pub use error::DepositRejection;
pub use policy::{DEFAULT_CAP_PERCENT, DepositPolicy};
