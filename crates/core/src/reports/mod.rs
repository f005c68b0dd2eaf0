//! Earnings and payment report generation.
//!
//! This module provides pure business logic for the aggregation reports:
//! - Top-earning payee category over a payment-date window
//! - Top-paying payer accounts over a payment-date window

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportInputError;
pub use service::ReportService;
pub use types::*;
