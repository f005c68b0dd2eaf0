//! Core business logic for the settlement engine.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain rules and calculations live here; the `settle-db` crate loads
//! state inside a transaction and asks these modules what to do with it.
//!
//! # Modules
//!
//! - `settlement` - Preconditions and money-conserving transfers for paying an obligation
//! - `deposit` - Deposit cap derived from outstanding obligations
//! - `reports` - Ranked aggregates over paid obligations

pub mod deposit;
pub mod reports;
pub mod settlement;
