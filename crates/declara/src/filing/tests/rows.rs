use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::common::*;
use crate::filing::credits::CreditError;
use crate::filing::domain::{AllocationFactors, OwnershipKind, TaxId};
use crate::filing::transform::build_row;

fn receiver() -> TaxId {
    TaxId("12345678-5".to_string())
}

#[test]
fn reference_record_allocates_and_credits_as_filed() {
    let row = build_row(
        &reference_record(),
        receiver(),
        120,
        OwnershipKind::UsufructHolder,
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.amounts.affected_without_credit, Decimal::from(500_000));
    assert_eq!(row.amounts.affected_with_credit, Decimal::from(500_000));
    assert_eq!(row.credits.accumulated_post2020, Decimal::from(184_932));

    let other_destinations: Decimal = row
        .credits
        .taxable_group()
        .iter()
        .copied()
        .sum::<Decimal>()
        - row.credits.accumulated_post2020;
    assert!(other_destinations.is_zero());

    assert_eq!(row.shares, 120);
    assert_eq!(row.ownership, OwnershipKind::UsufructHolder);
    assert_eq!(row.receiver, receiver());
}

#[test]
fn quarter_periods_land_on_quarter_end() {
    let row = build_row(
        &reference_record(),
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(
        row.transaction_date,
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    );
}

#[test]
fn malformed_period_falls_back_to_last_modified() {
    let mut source = reference_record();
    source.period = "fiscal year twenty-four".to_string();

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.transaction_date, source.last_modified);
}

#[test]
fn bucket_amounts_round_to_whole_units() {
    let factors = AllocationFactors {
        affected_without_credit: Decimal::new(3333, 4),
        ..AllocationFactors::default()
    };
    let source = record("qual-rounding", Decimal::from(1_000), factors, None);

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.amounts.affected_without_credit, Decimal::from(333));
    assert_eq!(row.amounts.affected_with_credit, Decimal::from(667));
}

#[test]
fn derived_bucket_never_goes_negative() {
    let factors = AllocationFactors {
        affected_without_credit: Decimal::new(6, 1),
        exempt_final_taxes: Decimal::new(6, 1),
        ..AllocationFactors::default()
    };
    let source = record("qual-overalloc", Decimal::from(100), factors, None);

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.amounts.affected_with_credit, Decimal::ZERO);
}

#[test]
fn records_without_a_regime_get_zero_credits() {
    let mut source = reference_record();
    source.regime = None;

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert!(row
        .credits
        .ordered()
        .iter()
        .all(|value| value.is_zero()));
}

#[test]
fn invalid_regime_zeroes_credits_under_the_lenient_policy() {
    let mut source = reference_record();
    if let Some(config) = source.regime.as_mut() {
        config.fiscal_year = 2012;
    }

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("lenient policy keeps the row");

    assert!(row.credits.ordered().iter().all(|value| value.is_zero()));
    assert_eq!(row.amounts.affected_without_credit, Decimal::from(500_000));
}

#[test]
fn invalid_regime_aborts_the_row_under_the_strict_policy() {
    let mut source = reference_record();
    if let Some(config) = source.regime.as_mut() {
        config.fiscal_year = 2012;
    }

    let error = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &strict_engine(),
    )
    .expect_err("strict policy propagates");

    assert!(matches!(error, CreditError::FiscalYearTooEarly { year: 2012 }));
}

#[test]
fn certificate_numbers_pass_through_to_the_row() {
    let mut source = reference_record();
    source.certificate = Some("CERT-2024-0117".to_string());

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.certificate.as_deref(), Some("CERT-2024-0117"));
}

#[test]
fn exempt_allocation_feeds_the_exempt_credit() {
    let factors = AllocationFactors {
        exempt_with_credit: Decimal::new(4, 1),
        ..AllocationFactors::default()
    };
    let source = record(
        "qual-exempt",
        Decimal::from(1_000_000),
        factors,
        Some(regime(2024, true, false)),
    );

    let row = build_row(
        &source,
        receiver(),
        0,
        OwnershipKind::default(),
        &lenient_engine(),
    )
    .expect("row builds");

    assert_eq!(row.amounts.exempt_with_credit, Decimal::from(400_000));
    // 600,000 unallocated stays creditable; 0.27/0.73 grosses both bases up.
    assert_eq!(row.amounts.affected_with_credit, Decimal::from(600_000));
    assert_eq!(
        row.credits.accumulated_post2020_refundable,
        Decimal::from(221_918)
    );
    assert_eq!(row.credits.exempt_refundable, Decimal::from(147_945));
    assert!(row.credits.exempt.is_zero());
}
