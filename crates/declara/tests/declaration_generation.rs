//! Integration specifications for the declaration generation pipeline.
//!
//! Scenarios exercise the public service facade end to end, from raw
//! qualification records to the rendered authority file and the sibling CSV
//! surface, without reaching into private modules.

mod common {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use declara::filing::{
        AllocationFactors, Declarant, FilingOverrides, FilingRequest, QualificationRecord,
        RegimeConfig, TaxId, TaxRegime,
    };

    pub(super) fn declarant() -> Declarant {
        Declarant {
            tax_id: TaxId("76543210-K".to_string()),
            legal_name: "Andes Custody SpA".to_string(),
            address: "Av. Apoquindo 3000, of. 501".to_string(),
            commune: "Las Condes".to_string(),
            email: "filings@andescustody.cl".to_string(),
            phone: "+56 2 2345 6789".to_string(),
        }
    }

    pub(super) fn regime_2024() -> RegimeConfig {
        RegimeConfig {
            regime: TaxRegime::General,
            corporate_rate: Decimal::new(27, 2),
            fiscal_year: 2024,
            refund_right: false,
            restitution: false,
        }
    }

    pub(super) fn dividend_record(id: &str, period: &str, total: i64) -> QualificationRecord {
        QualificationRecord {
            id: id.to_string(),
            total_amount: Decimal::from(total),
            currency: "CLP".to_string(),
            period: period.to_string(),
            factors: AllocationFactors {
                affected_without_credit: Decimal::new(5, 1),
                ..AllocationFactors::default()
            },
            regime: Some(regime_2024()),
            certificate: None,
            last_modified: NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date"),
        }
    }

    pub(super) fn request(records: Vec<QualificationRecord>) -> FilingRequest {
        FilingRequest {
            declarant: declarant(),
            fiscal_year_label: "2024".to_string(),
            records,
            overrides: FilingOverrides::default(),
            excess_withdrawals: Vec::new(),
        }
    }
}

use common::*;
use declara::filing::template::skeleton_line_count;
use declara::filing::{
    DeclarationService, ExcessWithdrawal, InvalidRegimePolicy, TaxId,
};
use rust_decimal::Decimal;

fn service() -> DeclarationService {
    DeclarationService::new(InvalidRegimePolicy::ZeroCredits)
}

#[test]
fn a_full_filing_round_trips_records_into_the_authority_file() {
    let mut filing_request = request(vec![
        dividend_record("qual-001", "2024-Q3", 1_000_000),
        dividend_record("qual-002", "2024-06-15", 400_000),
    ]);
    filing_request.excess_withdrawals = vec![ExcessWithdrawal {
        receiver: TaxId("11111111-1".to_string()),
        balance: Decimal::from(55_000),
    }];

    let filing = service().generate(filing_request).expect("filing builds");
    let content = filing.render();
    let lines: Vec<&str> = content
        .strip_suffix("\r\n")
        .expect("file ends in CRLF")
        .split("\r\n")
        .collect();

    assert_eq!(lines.len(), skeleton_line_count() + 2 + 1);

    // the 27%/2024 regime routes the credit into the 2020+ no-refund column
    let q3_line = lines
        .iter()
        .find(|line| line.starts_with("30.09.2024;"))
        .expect("quarter row rendered");
    assert!(q3_line.contains(";184932;"));

    let explicit_date_line = lines
        .iter()
        .find(|line| line.starts_with("15.06.2024;"))
        .expect("explicit-date row rendered");
    assert!(explicit_date_line.contains(";73973;"));

    let summary: Vec<&str> = lines.last().expect("summary row").split(';').collect();
    assert_eq!(summary[0], "TOTALS");
    assert_eq!(*summary.last().expect("row count"), "2");
}

#[test]
fn an_empty_filing_still_produces_the_complete_skeleton() {
    let filing = service().generate(request(Vec::new())).expect("filing builds");
    let content = filing.render();
    let lines: Vec<&str> = content
        .strip_suffix("\r\n")
        .expect("file ends in CRLF")
        .split("\r\n")
        .collect();

    assert_eq!(lines.len(), skeleton_line_count());
    assert!(lines.iter().any(|line| line.starts_with("SECTION A")));
    assert!(lines.iter().any(|line| line.starts_with("SECTION B")));
    assert!(lines.iter().any(|line| line.starts_with("SECTION C")));

    let summary: Vec<&str> = lines.last().expect("summary row").split(';').collect();
    assert_eq!(*summary.last().expect("row count"), "0");
}

#[test]
fn totals_do_not_depend_on_record_order() {
    let records = vec![
        dividend_record("qual-001", "2024-Q1", 250_000),
        dividend_record("qual-002", "2024-Q2", 750_000),
        dividend_record("qual-003", "2024-Q3", 125_000),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = service().generate(request(records)).expect("filing builds");
    let backward = service().generate(request(reversed)).expect("filing builds");

    assert_eq!(forward.totals, backward.totals);
    assert_eq!(forward.totals.row_count, 3);
}

#[test]
fn the_csv_surface_mirrors_the_authority_file() {
    let filing = service()
        .generate(request(vec![dividend_record("qual-001", "2024-Q3", 1_000_000)]))
        .expect("filing builds");

    let mut buffer = Vec::new();
    filing.write_csv(&mut buffer, true).expect("csv writes");
    let text = String::from_utf8(buffer).expect("utf-8 output");

    assert!(text.starts_with('\u{feff}'));
    assert!(text.contains("30.09.2024;"));
    assert!(text.contains(";184932;"));
    assert!(text.contains("\r\n"));

    let grid = filing.grid();
    let data_row = grid
        .iter()
        .find(|cells| cells.first().map(String::as_str) == Some("30.09.2024"))
        .expect("grid carries the data row");
    assert_eq!(data_row.len(), 34);
}
