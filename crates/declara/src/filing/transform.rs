use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::credits::{CreditEngine, CreditError};
use super::domain::{
    round_unit, CategoryAmounts, DeclarationRow, OwnershipKind, QualificationRecord, TaxId,
};

/// Map one qualification record into a declaration row.
///
/// Buckets 8..16 are the record's total multiplied by each allocation factor;
/// bucket 5 is whatever the factors left unallocated (ordinary creditable
/// income). All monetary outputs are rounded to whole currency units. With
/// the lenient credit policy this never fails for structurally valid input.
pub fn build_row(
    record: &QualificationRecord,
    receiver: TaxId,
    shares: u64,
    ownership: OwnershipKind,
    engine: &CreditEngine,
) -> Result<DeclarationRow, CreditError> {
    let amounts = category_amounts(record);
    let credits = engine.compute(&amounts, record.regime.as_ref())?;

    Ok(DeclarationRow {
        transaction_date: transaction_date(&record.period, record.last_modified),
        receiver,
        ownership,
        shares,
        amounts,
        credits,
        certificate: record.certificate.clone(),
    })
}

fn category_amounts(record: &QualificationRecord) -> CategoryAmounts {
    let total = record.total_amount;
    let factors = &record.factors;

    let mut amounts = CategoryAmounts::zeroed();
    amounts.affected_without_credit = round_unit(total * factors.affected_without_credit);
    amounts.exempt_with_credit = round_unit(total * factors.exempt_with_credit);
    amounts.exempt_final_taxes = round_unit(total * factors.exempt_final_taxes);
    amounts.non_income = round_unit(total * factors.non_income);
    amounts.capital_return = round_unit(total * factors.capital_return);
    amounts.presumptive = round_unit(total * factors.presumptive);
    amounts.substitute_regime = round_unit(total * factors.substitute_regime);
    amounts.deemed_distribution = round_unit(total * factors.deemed_distribution);
    amounts.other = round_unit(total * factors.other);

    let unallocated = (total - amounts.allocated_total()).max(Decimal::ZERO);
    amounts.affected_with_credit = round_unit(unallocated);

    amounts
}

/// Derive the transaction date from the record's period string.
///
/// `YYYY-MM-DD` is used verbatim and `YYYY-Qn` maps to the last calendar day
/// of the quarter; anything else falls back to the record's last-modified
/// date. Malformed periods are expected input, not an error.
fn transaction_date(period: &str, fallback: NaiveDate) -> NaiveDate {
    let trimmed = period.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date;
    }

    quarter_end(trimmed).unwrap_or(fallback)
}

fn quarter_end(period: &str) -> Option<NaiveDate> {
    let (year, quarter) = period
        .split_once("-Q")
        .or_else(|| period.split_once("-q"))?;
    let year: i32 = year.parse().ok()?;

    match quarter {
        "1" => NaiveDate::from_ymd_opt(year, 3, 31),
        "2" => NaiveDate::from_ymd_opt(year, 6, 30),
        "3" => NaiveDate::from_ymd_opt(year, 9, 30),
        "4" => NaiveDate::from_ymd_opt(year, 12, 31),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 14).expect("valid date")
    }

    #[test]
    fn explicit_dates_pass_through() {
        assert_eq!(
            transaction_date("2024-07-09", fallback()),
            NaiveDate::from_ymd_opt(2024, 7, 9).unwrap()
        );
    }

    #[test]
    fn quarters_map_to_quarter_end() {
        assert_eq!(
            transaction_date("2024-Q1", fallback()),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
        assert_eq!(
            transaction_date("2024-Q3", fallback()),
            NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
        );
        assert_eq!(
            transaction_date("2024-q4", fallback()),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn malformed_periods_fall_back_to_last_modified() {
        assert_eq!(transaction_date("FY24", fallback()), fallback());
        assert_eq!(transaction_date("2024-Q7", fallback()), fallback());
        assert_eq!(transaction_date("", fallback()), fallback());
    }
}
