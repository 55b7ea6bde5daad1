use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::credits::CreditColumns;

/// Date rendering used everywhere the authority file shows a date.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Round a monetary value to whole currency units, half away from zero.
/// Sub-unit amounts are not legal anywhere in the declaration.
pub(crate) fn round_unit(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// National tax identifier in its canonical `BODY-VERIFIER` form.
///
/// Checksum validation happens upstream; this wrapper only knows how to split
/// the identifier into the two physical columns the authority file expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxId(pub String);

impl TaxId {
    /// Split into numeric body and check character.
    ///
    /// Identifiers without an explicit dash fall back to treating the last
    /// character as the verifier, matching how bulk imports arrive.
    pub fn split(&self) -> (&str, &str) {
        let raw = self.0.trim();
        if let Some((body, verifier)) = raw.rsplit_once('-') {
            return (body, verifier);
        }
        match raw.char_indices().last() {
            Some((index, _)) if index > 0 => raw.split_at(index),
            _ => (raw, ""),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Identity of the filing entity, immutable for a given filing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarant {
    pub tax_id: TaxId,
    pub legal_name: String,
    pub address: String,
    pub commune: String,
    pub email: String,
    pub phone: String,
}

/// Statutory tax regimes a filer can declare under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    General,
    Simplified,
}

impl TaxRegime {
    pub const fn label(self) -> &'static str {
        match self {
            TaxRegime::General => "general",
            TaxRegime::Simplified => "simplified",
        }
    }
}

/// Filer tax-regime configuration driving the credit formulas.
///
/// `corporate_rate` must sit strictly inside (0, 1); `fiscal_year` must be
/// 2017 or later (the credit regime did not exist before then). Both are
/// validated by the credit calculator, not at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub regime: TaxRegime,
    pub corporate_rate: Decimal,
    pub fiscal_year: i32,
    pub refund_right: bool,
    pub restitution: bool,
}

/// How a receiver holds the underlying shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipKind {
    UsufructHolder,
    BareOwner,
}

impl OwnershipKind {
    pub const fn code(self) -> u8 {
        match self {
            OwnershipKind::UsufructHolder => 1,
            OwnershipKind::BareOwner => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            OwnershipKind::UsufructHolder => "usufruct holder",
            OwnershipKind::BareOwner => "bare owner",
        }
    }
}

impl Default for OwnershipKind {
    fn default() -> Self {
        OwnershipKind::UsufructHolder
    }
}

/// Allocation fractions a qualification record carries, one per statutory
/// special-treatment bucket (declaration columns 8 through 16). Fractions are
/// in [0, 1] and sum to at most 1; both constraints are enforced upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationFactors {
    pub affected_without_credit: Decimal,
    pub exempt_with_credit: Decimal,
    pub exempt_final_taxes: Decimal,
    pub non_income: Decimal,
    pub capital_return: Decimal,
    pub presumptive: Decimal,
    pub substitute_regime: Decimal,
    pub deemed_distribution: Decimal,
    pub other: Decimal,
}

/// The twelve monetary buckets of declaration columns 5 through 16.
///
/// Column 5 is derived (whatever the factors leave unallocated is ordinary
/// creditable income). Columns 6 and 7 belong to legacy and voluntary-payment
/// accumulations whose allocation rules were never wired up upstream; they
/// are carried so the layout stays complete but are always zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmounts {
    pub affected_with_credit: Decimal,
    pub affected_with_legacy_credit: Decimal,
    pub affected_with_voluntary_credit: Decimal,
    pub affected_without_credit: Decimal,
    pub exempt_with_credit: Decimal,
    pub exempt_final_taxes: Decimal,
    pub non_income: Decimal,
    pub capital_return: Decimal,
    pub presumptive: Decimal,
    pub substitute_regime: Decimal,
    pub deemed_distribution: Decimal,
    pub other: Decimal,
}

impl CategoryAmounts {
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Base for the taxable-income credit: the three creditable buckets.
    pub fn credit_base(&self) -> Decimal {
        self.affected_with_credit + self.affected_with_legacy_credit + self.affected_with_voluntary_credit
    }

    /// Sum of the nine factor-driven buckets (columns 8..16).
    pub fn allocated_total(&self) -> Decimal {
        self.affected_without_credit
            + self.exempt_with_credit
            + self.exempt_final_taxes
            + self.non_income
            + self.capital_return
            + self.presumptive
            + self.substitute_regime
            + self.deemed_distribution
            + self.other
    }

    /// Column order 5..16 as emitted by the authority file.
    pub fn ordered(&self) -> [Decimal; 12] {
        [
            self.affected_with_credit,
            self.affected_with_legacy_credit,
            self.affected_with_voluntary_credit,
            self.affected_without_credit,
            self.exempt_with_credit,
            self.exempt_final_taxes,
            self.non_income,
            self.capital_return,
            self.presumptive,
            self.substitute_regime,
            self.deemed_distribution,
            self.other,
        ]
    }

    pub fn accumulate(&mut self, other: &CategoryAmounts) {
        self.affected_with_credit += other.affected_with_credit;
        self.affected_with_legacy_credit += other.affected_with_legacy_credit;
        self.affected_with_voluntary_credit += other.affected_with_voluntary_credit;
        self.affected_without_credit += other.affected_without_credit;
        self.exempt_with_credit += other.exempt_with_credit;
        self.exempt_final_taxes += other.exempt_final_taxes;
        self.non_income += other.non_income;
        self.capital_return += other.capital_return;
        self.presumptive += other.presumptive;
        self.substitute_regime += other.substitute_regime;
        self.deemed_distribution += other.deemed_distribution;
        self.other += other.other;
    }
}

/// One dividend/withdrawal event with its statutory allocation, as persisted
/// by the (external) qualification store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRecord {
    pub id: String,
    pub total_amount: Decimal,
    pub currency: String,
    /// Period the distribution belongs to: `YYYY-MM-DD`, `YYYY-Qn`, or free
    /// text (which falls back to `last_modified`).
    pub period: String,
    pub factors: AllocationFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regime: Option<RegimeConfig>,
    /// Certificate number backing the distribution, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    pub last_modified: NaiveDate,
}

/// One fully computed line of the per-transaction section (logical columns
/// 1 through 33).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationRow {
    pub transaction_date: NaiveDate,
    pub receiver: TaxId,
    pub ownership: OwnershipKind,
    pub shares: u64,
    pub amounts: CategoryAmounts,
    pub credits: CreditColumns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

/// Excess-withdrawal balance carried per beneficiary (the separate
/// columns-34/35 row type of the declaration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcessWithdrawal {
    pub receiver: TaxId,
    pub balance: Decimal,
}

/// Per-filing overrides; every field defaults to the declarant profile or a
/// documented constant when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commune: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<TaxId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipKind>,
}

/// Everything the caller supplies for one filing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingRequest {
    pub declarant: Declarant,
    pub fiscal_year_label: String,
    pub records: Vec<QualificationRecord>,
    #[serde(default)]
    pub overrides: FilingOverrides,
    #[serde(default)]
    pub excess_withdrawals: Vec<ExcessWithdrawal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_id_splits_on_dash() {
        let id = TaxId("76543210-K".to_string());
        assert_eq!(id.split(), ("76543210", "K"));
    }

    #[test]
    fn tax_id_without_dash_uses_last_character() {
        let id = TaxId("765432105".to_string());
        assert_eq!(id.split(), ("76543210", "5"));
    }

    #[test]
    fn tax_id_degenerate_forms_stay_total() {
        assert_eq!(TaxId(String::new()).split(), ("", ""));
        assert_eq!(TaxId("7".to_string()).split(), ("7", ""));
        assert!(TaxId("  ".to_string()).is_blank());
    }

    #[test]
    fn round_unit_rounds_half_away_from_zero() {
        assert_eq!(round_unit(Decimal::new(15, 1)), Decimal::from(2));
        assert_eq!(round_unit(Decimal::new(14, 1)), Decimal::from(1));
        assert_eq!(round_unit(Decimal::new(500000, 1)), Decimal::from(50000));
    }
}
