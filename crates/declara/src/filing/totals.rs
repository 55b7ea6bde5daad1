use rust_decimal::Decimal;
use serde::Serialize;

use super::credits::CreditColumns;
use super::domain::{CategoryAmounts, DeclarationRow, ExcessWithdrawal};

/// Column-wise sums across a filing run, recomputed on every generation and
/// never persisted. Identity columns (dates, tax ids, ownership flags) and
/// certificate numbers are not quantities and are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeclarationTotals {
    pub shares: u64,
    pub amounts: CategoryAmounts,
    pub credits: CreditColumns,
    pub excess_balance: Decimal,
    pub row_count: usize,
    pub excess_row_count: usize,
}

/// Sum all numeric columns. Order-independent; an empty filing yields
/// all-zero totals with a zero row count.
pub fn aggregate(rows: &[DeclarationRow], excess: &[ExcessWithdrawal]) -> DeclarationTotals {
    let mut totals = DeclarationTotals {
        row_count: rows.len(),
        excess_row_count: excess.len(),
        ..DeclarationTotals::default()
    };

    for row in rows {
        totals.shares += row.shares;
        totals.amounts.accumulate(&row.amounts);
        totals.credits.accumulate(&row.credits);
    }

    for withdrawal in excess {
        totals.excess_balance += withdrawal.balance;
    }

    totals
}
