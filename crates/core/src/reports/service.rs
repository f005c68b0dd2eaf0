//! Report generation service.
//!
//! Ranking is deterministic: groups are ordered by total descending, then by
//! category name (or display name, then account ID) ascending.

use std::cmp::Ordering;
use std::collections::HashMap;

use settle_shared::types::Money;

use super::error::ReportInputError;
use super::types::{
    AccountPayment, AggregationKey, CategoryEarnings, DateRange, GroupKey, GroupTotal,
    PaidObligation,
};

/// Service for generating aggregation reports.
pub struct ReportService;

impl ReportService {
    /// Sums prices of rows inside `range`, grouped by `key`, highest total first.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if a group total does not fit in minor units.
    pub fn aggregate(
        rows: &[PaidObligation],
        range: &DateRange,
        key: AggregationKey,
    ) -> Result<Vec<GroupTotal>, ReportInputError> {
        let mut totals: HashMap<GroupKey, Money> = HashMap::new();

        for row in rows.iter().filter(|r| range.contains(r.payment_date)) {
            let group = match key {
                AggregationKey::PayeeCategory => GroupKey::Category {
                    category: row.payee_category.clone(),
                },
                AggregationKey::PayerAccount => GroupKey::Account {
                    account_id: row.payer_id,
                    display_name: row.payer_name.clone(),
                },
            };

            let total = totals.entry(group).or_insert(Money::ZERO);
            *total = total
                .checked_add(row.price)
                .ok_or(ReportInputError::Overflow)?;
        }

        let mut ranked: Vec<GroupTotal> = totals
            .into_iter()
            .map(|(key, total)| GroupTotal { key, total })
            .collect();
        ranked.sort_by(Self::rank);

        Ok(ranked)
    }

    /// Returns the payee category with the highest earnings in `range`.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if a category total does not fit in minor units.
    pub fn top_category(
        rows: &[PaidObligation],
        range: &DateRange,
    ) -> Result<Option<CategoryEarnings>, ReportInputError> {
        let ranked = Self::aggregate(rows, range, AggregationKey::PayeeCategory)?;

        Ok(ranked.into_iter().find_map(|group| match group.key {
            GroupKey::Category { category } => Some(CategoryEarnings {
                category,
                total_earned: group.total,
            }),
            GroupKey::Account { .. } => None,
        }))
    }

    /// Returns up to `limit` payer accounts ordered by total paid in `range`.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if an account total does not fit in minor units.
    pub fn top_accounts(
        rows: &[PaidObligation],
        range: &DateRange,
        limit: u64,
    ) -> Result<Vec<AccountPayment>, ReportInputError> {
        let ranked = Self::aggregate(rows, range, AggregationKey::PayerAccount)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(ranked
            .into_iter()
            .filter_map(|group| match group.key {
                GroupKey::Account {
                    account_id,
                    display_name,
                } => Some(AccountPayment {
                    account_id,
                    display_name,
                    total_paid: group.total,
                }),
                GroupKey::Category { .. } => None,
            })
            .take(limit)
            .collect())
    }

    fn rank(a: &GroupTotal, b: &GroupTotal) -> Ordering {
        b.total.cmp(&a.total).then_with(|| match (&a.key, &b.key) {
            (GroupKey::Category { category: x }, GroupKey::Category { category: y }) => x.cmp(y),
            (
                GroupKey::Account {
                    account_id: id_a,
                    display_name: name_a,
                },
                GroupKey::Account {
                    account_id: id_b,
                    display_name: name_b,
                },
            ) => name_a.cmp(name_b).then_with(|| id_a.cmp(id_b)),
            // Only one key kind is ever aggregated at a time.
            (GroupKey::Category { .. }, GroupKey::Account { .. }) => Ordering::Less,
            (GroupKey::Account { .. }, GroupKey::Category { .. }) => Ordering::Greater,
        })
    }
}
