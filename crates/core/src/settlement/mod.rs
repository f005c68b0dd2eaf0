//! Settlement rules.
//!
//! Pure checks and balance arithmetic for paying a single obligation:
//! - Precondition ordering (already paid before funds)
//! - Money-conserving transfer between payer and payee
//! - Error types for rejected settlements

pub mod error;
pub mod rules;

#[cfg(test)]
mod rules_props;

pub use error::SettlementRejection;
pub use rules::{ObligationState, Transfer, check_settleable, transfer};
