//! Property-based tests for settlement rules.

use proptest::prelude::*;
use settle_shared::types::{Money, ObligationId};

use super::error::SettlementRejection;
use super::rules::{ObligationState, check_settleable, transfer};

/// Balances up to 10,000,000.00 in minor units.
fn balance() -> impl Strategy<Value = Money> {
    (0i64..1_000_000_000).prop_map(Money::from_minor)
}

fn price() -> impl Strategy<Value = Money> {
    (1i64..1_000_000_000).prop_map(Money::from_minor)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Money is neither created nor destroyed by a transfer.
    #[test]
    fn prop_transfer_conserves_money(payer in balance(), payee in balance(), amount in price()) {
        match transfer(payer, payee, amount) {
            Ok(t) => {
                prop_assert_eq!(t.payer_before.checked_sub(amount), Some(t.payer_after));
                prop_assert_eq!(t.payee_before.checked_add(amount), Some(t.payee_after));
                prop_assert_eq!(
                    t.payer_after.checked_add(t.payee_after),
                    payer.checked_add(payee)
                );
            }
            Err(SettlementRejection::InsufficientFunds { available, required }) => {
                prop_assert!(available < required);
            }
            Err(other) => prop_assert!(false, "unexpected rejection: {other}"),
        }
    }

    /// A successful transfer never leaves the payer negative.
    #[test]
    fn prop_transfer_never_negative(payer in balance(), payee in balance(), amount in price()) {
        if let Ok(t) = transfer(payer, payee, amount) {
            prop_assert!(!t.payer_after.is_negative());
        }
    }

    /// The precondition check and the transfer agree on funds.
    #[test]
    fn prop_check_agrees_with_transfer(payer in balance(), payee in balance(), amount in price()) {
        let obligation = ObligationState { id: ObligationId::new(), price: amount, paid: false };
        prop_assert_eq!(
            check_settleable(&obligation, payer).is_ok(),
            transfer(payer, payee, amount).is_ok()
        );
    }

    /// A paid obligation is always rejected as already settled.
    #[test]
    fn prop_paid_is_always_already_settled(payer in balance(), amount in price()) {
        let obligation = ObligationState { id: ObligationId::new(), price: amount, paid: true };
        prop_assert_eq!(
            check_settleable(&obligation, payer),
            Err(SettlementRejection::AlreadySettled(obligation.id))
        );
    }
}
