use rust_decimal::Decimal;

use super::super::domain::{round_unit, CategoryAmounts, RegimeConfig};
use super::policy::{taxable_destination, TaxableDestination};
use super::{CreditColumns, CreditError};

/// First fiscal year the credit regime exists for.
pub(crate) const CREDIT_REGIME_FIRST_YEAR: i32 = 2017;

/// Statutory gross-up factor converting a net distributed amount into its
/// associated creditable tax: `rate / (1 - rate)`.
pub fn credit_rate(regime: &RegimeConfig) -> Result<Decimal, CreditError> {
    if regime.corporate_rate <= Decimal::ZERO || regime.corporate_rate >= Decimal::ONE {
        return Err(CreditError::RateOutOfRange {
            rate: regime.corporate_rate,
        });
    }
    if regime.fiscal_year < CREDIT_REGIME_FIRST_YEAR {
        return Err(CreditError::FiscalYearTooEarly {
            year: regime.fiscal_year,
        });
    }

    Ok(regime.corporate_rate / (Decimal::ONE - regime.corporate_rate))
}

/// Credit earned on the taxable (creditable) income buckets.
///
/// The base sums the three creditable buckets; the non-creditable bucket
/// contributes nothing. A zero base short-circuits before the rate is even
/// validated, so empty rows never produce division noise.
pub fn credits_on_taxable_income(
    amounts: &CategoryAmounts,
    regime: &RegimeConfig,
) -> Result<CreditColumns, CreditError> {
    let mut columns = CreditColumns::zeroed();
    let base = amounts.credit_base();
    if base.is_zero() {
        return Ok(columns);
    }

    let total = round_unit(base * credit_rate(regime)?);
    match taxable_destination(regime) {
        TaxableDestination::AccumulatedPre2020 => columns.accumulated_pre2020 = total,
        TaxableDestination::AccumulatedPre2020Refundable => {
            columns.accumulated_pre2020_refundable = total
        }
        TaxableDestination::AccumulatedPost2020 => columns.accumulated_post2020 = total,
        TaxableDestination::AccumulatedPost2020Refundable => {
            columns.accumulated_post2020_refundable = total
        }
        TaxableDestination::Restitution => columns.restitution = total,
        TaxableDestination::RestitutionRefundable => columns.restitution_refundable = total,
    }

    Ok(columns)
}

/// Credit earned on the exempt-income bucket (column 9).
///
/// Only the refund right selects the destination here; exempt-income credits
/// are treated as restitution-eligible across the board in the current model.
pub fn credits_on_exempt_income(
    amounts: &CategoryAmounts,
    regime: &RegimeConfig,
) -> Result<CreditColumns, CreditError> {
    let mut columns = CreditColumns::zeroed();
    let base = amounts.exempt_with_credit;
    if base.is_zero() {
        return Ok(columns);
    }

    let total = round_unit(base * credit_rate(regime)?);
    if regime.refund_right {
        columns.exempt_refundable = total;
    } else {
        columns.exempt = total;
    }

    Ok(columns)
}
