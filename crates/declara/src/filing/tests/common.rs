use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::filing::credits::{CreditEngine, InvalidRegimePolicy};
use crate::filing::domain::{
    AllocationFactors, Declarant, ExcessWithdrawal, FilingOverrides, FilingRequest,
    QualificationRecord, RegimeConfig, TaxId, TaxRegime,
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

pub(super) fn regime(fiscal_year: i32, refund_right: bool, restitution: bool) -> RegimeConfig {
    RegimeConfig {
        regime: TaxRegime::General,
        corporate_rate: Decimal::new(27, 2),
        fiscal_year,
        refund_right,
        restitution,
    }
}

pub(super) fn record(
    id: &str,
    total_amount: Decimal,
    factors: AllocationFactors,
    regime_config: Option<RegimeConfig>,
) -> QualificationRecord {
    QualificationRecord {
        id: id.to_string(),
        total_amount,
        currency: "CLP".to_string(),
        period: "2024-Q3".to_string(),
        factors,
        regime: regime_config,
        certificate: None,
        last_modified: NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date"),
    }
}

/// The reference scenario used throughout the suites: a 1,000,000 event with
/// half allocated to the no-credit bucket under a 27% regime in 2024.
pub(super) fn reference_record() -> QualificationRecord {
    let factors = AllocationFactors {
        affected_without_credit: Decimal::new(5, 1),
        ..AllocationFactors::default()
    };
    record(
        "qual-001",
        Decimal::from(1_000_000),
        factors,
        Some(regime(2024, false, false)),
    )
}

pub(super) fn filing_request(records: Vec<QualificationRecord>) -> FilingRequest {
    FilingRequest {
        declarant: declarant(),
        fiscal_year_label: "2024".to_string(),
        records,
        overrides: FilingOverrides::default(),
        excess_withdrawals: Vec::new(),
    }
}

pub(super) fn excess(receiver: &str, balance: i64) -> ExcessWithdrawal {
    ExcessWithdrawal {
        receiver: TaxId(receiver.to_string()),
        balance: Decimal::from(balance),
    }
}

pub(super) fn lenient_engine() -> CreditEngine {
    CreditEngine::new(InvalidRegimePolicy::ZeroCredits)
}

pub(super) fn strict_engine() -> CreditEngine {
    CreditEngine::new(InvalidRegimePolicy::Propagate)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("body is json")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}
