use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::credits::{CreditEngine, CreditError, InvalidRegimePolicy};
use super::domain::{Declarant, DeclarationRow, ExcessWithdrawal, FilingRequest};
use super::export::{self, ExportError};
use super::template;
use super::totals::{aggregate, DeclarationTotals};
use super::transform::build_row;

/// Error raised by the declaration service.
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("declarant profile incomplete: {}", issues.join("; "))]
    InvalidDeclarant { issues: Vec<String> },
    #[error(transparent)]
    Credit(#[from] CreditError),
}

/// Service composing the credit calculator, row transformer, aggregator, and
/// template serializer into one filing run.
#[derive(Debug, Clone)]
pub struct DeclarationService {
    engine: CreditEngine,
}

impl DeclarationService {
    pub fn new(policy: InvalidRegimePolicy) -> Self {
        Self {
            engine: CreditEngine::new(policy),
        }
    }

    pub fn policy(&self) -> InvalidRegimePolicy {
        self.engine.policy()
    }

    /// Build a complete filing from caller-supplied records.
    ///
    /// The declarant profile is validated up front and every problem is
    /// reported in one aggregate error, so a broken profile never produces a
    /// partially rendered file. Rows keep the input record order.
    pub fn generate(&self, request: FilingRequest) -> Result<Filing, DeclarationError> {
        let FilingRequest {
            mut declarant,
            fiscal_year_label,
            records,
            overrides,
            excess_withdrawals,
        } = request;

        let issues = declarant_issues(&declarant);
        if !issues.is_empty() {
            return Err(DeclarationError::InvalidDeclarant { issues });
        }

        if let Some(address) = overrides.address {
            declarant.address = address;
        }
        if let Some(commune) = overrides.commune {
            declarant.commune = commune;
        }
        if let Some(phone) = overrides.phone {
            declarant.phone = phone;
        }

        let receiver = overrides
            .receiver
            .unwrap_or_else(|| declarant.tax_id.clone());
        let shares = overrides.shares.unwrap_or(0);
        let ownership = overrides.ownership.unwrap_or_default();

        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            rows.push(build_row(
                record,
                receiver.clone(),
                shares,
                ownership,
                &self.engine,
            )?);
        }

        let totals = aggregate(&rows, &excess_withdrawals);

        Ok(Filing {
            declarant,
            fiscal_year_label,
            rows,
            excess_withdrawals,
            totals,
        })
    }
}

fn declarant_issues(declarant: &Declarant) -> Vec<String> {
    let mut issues = Vec::new();
    if declarant.tax_id.is_blank() {
        issues.push("missing declarant tax id".to_string());
    }
    if declarant.legal_name.trim().is_empty() {
        issues.push("missing declarant legal name".to_string());
    }
    issues
}

/// A fully computed filing run, ready for either output surface.
#[derive(Debug, Clone, Serialize)]
pub struct Filing {
    pub declarant: Declarant,
    pub fiscal_year_label: String,
    pub rows: Vec<DeclarationRow>,
    pub excess_withdrawals: Vec<ExcessWithdrawal>,
    pub totals: DeclarationTotals,
}

impl Filing {
    /// The authority's fixed-format text file.
    pub fn render(&self) -> String {
        template::render(
            &self.declarant,
            &self.fiscal_year_label,
            &self.rows,
            &self.excess_withdrawals,
            &self.totals,
        )
    }

    /// The same content as a cell grid for the workbook export surface.
    pub fn grid(&self) -> Vec<Vec<String>> {
        export::grid(
            &self.declarant,
            &self.fiscal_year_label,
            &self.rows,
            &self.excess_withdrawals,
            &self.totals,
        )
    }

    pub fn write_csv<W: Write>(&self, writer: W, include_bom: bool) -> Result<(), ExportError> {
        export::write_csv(writer, &self.grid(), include_bom)
    }

    pub fn file_name(&self, doc_type: &str, generated_on: NaiveDate, extension: &str) -> String {
        export::export_file_name(
            doc_type,
            &self.declarant,
            &self.fiscal_year_label,
            generated_on,
            extension,
        )
    }
}
