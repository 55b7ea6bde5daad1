mod policy;
mod rules;

pub use policy::InvalidRegimePolicy;
pub use rules::{credit_rate, credits_on_exempt_income, credits_on_taxable_income};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{CategoryAmounts, RegimeConfig};

/// Validation failures raised while deriving statutory credits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CreditError {
    #[error("corporate tax rate {rate} is outside the open interval (0, 1)")]
    RateOutOfRange { rate: Decimal },
    #[error("fiscal year {year} predates the credit regime (first valid year 2017)")]
    FiscalYearTooEarly { year: i32 },
}

/// The sixteen computed credit amounts of declaration columns 17 through 32.
///
/// Columns 25..32 cover exempt-restitution, pre-2017 accumulated balances,
/// additional-tax and capital-return credits. Their fiscal formulas were
/// never implemented upstream; they are emitted as explicit zeros so the
/// layout stays complete. Do not fill them in without domain confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditColumns {
    pub accumulated_pre2020: Decimal,
    pub accumulated_pre2020_refundable: Decimal,
    pub accumulated_post2020: Decimal,
    pub accumulated_post2020_refundable: Decimal,
    pub restitution: Decimal,
    pub restitution_refundable: Decimal,
    pub exempt: Decimal,
    pub exempt_refundable: Decimal,
    pub exempt_restitution: Decimal,
    pub legacy_balance: Decimal,
    pub legacy_balance_refundable: Decimal,
    pub legacy_rate_adjusted: Decimal,
    pub legacy_rate_adjusted_refundable: Decimal,
    pub legacy_voluntary: Decimal,
    pub additional_tax: Decimal,
    pub capital_return: Decimal,
}

impl CreditColumns {
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Column order 17..32 as emitted by the authority file.
    pub fn ordered(&self) -> [Decimal; 16] {
        [
            self.accumulated_pre2020,
            self.accumulated_pre2020_refundable,
            self.accumulated_post2020,
            self.accumulated_post2020_refundable,
            self.restitution,
            self.restitution_refundable,
            self.exempt,
            self.exempt_refundable,
            self.exempt_restitution,
            self.legacy_balance,
            self.legacy_balance_refundable,
            self.legacy_rate_adjusted,
            self.legacy_rate_adjusted_refundable,
            self.legacy_voluntary,
            self.additional_tax,
            self.capital_return,
        ]
    }

    /// The six mutually-exclusive taxable-income destinations (columns 17..22).
    pub fn taxable_group(&self) -> [Decimal; 6] {
        [
            self.accumulated_pre2020,
            self.accumulated_pre2020_refundable,
            self.accumulated_post2020,
            self.accumulated_post2020_refundable,
            self.restitution,
            self.restitution_refundable,
        ]
    }

    pub fn accumulate(&mut self, other: &CreditColumns) {
        self.accumulated_pre2020 += other.accumulated_pre2020;
        self.accumulated_pre2020_refundable += other.accumulated_pre2020_refundable;
        self.accumulated_post2020 += other.accumulated_post2020;
        self.accumulated_post2020_refundable += other.accumulated_post2020_refundable;
        self.restitution += other.restitution;
        self.restitution_refundable += other.restitution_refundable;
        self.exempt += other.exempt;
        self.exempt_refundable += other.exempt_refundable;
        self.exempt_restitution += other.exempt_restitution;
        self.legacy_balance += other.legacy_balance;
        self.legacy_balance_refundable += other.legacy_balance_refundable;
        self.legacy_rate_adjusted += other.legacy_rate_adjusted;
        self.legacy_rate_adjusted_refundable += other.legacy_rate_adjusted_refundable;
        self.legacy_voluntary += other.legacy_voluntary;
        self.additional_tax += other.additional_tax;
        self.capital_return += other.capital_return;
    }
}

/// Stateless calculator applying the statutory credit formulas under a named
/// failure policy.
#[derive(Debug, Clone)]
pub struct CreditEngine {
    policy: InvalidRegimePolicy,
}

impl CreditEngine {
    pub fn new(policy: InvalidRegimePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InvalidRegimePolicy {
        self.policy
    }

    /// Derive all credit columns for one row.
    ///
    /// A record without a regime configuration legitimately earns no credits.
    /// An invalid configuration either downgrades to zero credits with a
    /// diagnostic or aborts the row, per the configured policy.
    pub fn compute(
        &self,
        amounts: &CategoryAmounts,
        regime: Option<&RegimeConfig>,
    ) -> Result<CreditColumns, CreditError> {
        let Some(regime) = regime else {
            return Ok(CreditColumns::zeroed());
        };

        match self.derive(amounts, regime) {
            Ok(columns) => Ok(columns),
            Err(error) => match self.policy {
                InvalidRegimePolicy::ZeroCredits => {
                    warn!(%error, fiscal_year = regime.fiscal_year, "invalid regime configuration, emitting zero credits");
                    Ok(CreditColumns::zeroed())
                }
                InvalidRegimePolicy::Propagate => Err(error),
            },
        }
    }

    fn derive(
        &self,
        amounts: &CategoryAmounts,
        regime: &RegimeConfig,
    ) -> Result<CreditColumns, CreditError> {
        let mut columns = rules::credits_on_taxable_income(amounts, regime)?;
        let exempt = rules::credits_on_exempt_income(amounts, regime)?;
        columns.exempt = exempt.exempt;
        columns.exempt_refundable = exempt.exempt_refundable;
        Ok(columns)
    }
}
