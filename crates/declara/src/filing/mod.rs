//! Declaration pipeline: credit calculation, row transformation, totals
//! aggregation, and fixed-format serialization.
//!
//! Every component is pure and stateless; the HTTP and CLI layers own all
//! I/O. A filing run flows caller records through `transform` (which invokes
//! `credits`), folds the rows through `totals`, and hands the result to
//! `template` or `export`.

pub mod credits;
pub mod domain;
pub mod export;
pub mod router;
pub mod service;
pub mod template;
pub mod totals;
pub mod transform;

#[cfg(test)]
mod tests;

pub use credits::{
    credit_rate, credits_on_exempt_income, credits_on_taxable_income, CreditColumns, CreditEngine,
    CreditError, InvalidRegimePolicy,
};
pub use domain::{
    AllocationFactors, CategoryAmounts, Declarant, DeclarationRow, ExcessWithdrawal,
    FilingOverrides, FilingRequest, OwnershipKind, QualificationRecord, RegimeConfig, TaxId,
    TaxRegime,
};
pub use export::{export_file_name, ExportError};
pub use router::{declaration_router, DeclarationPreview};
pub use service::{DeclarationError, DeclarationService, Filing};
pub use totals::{aggregate, DeclarationTotals};
pub use transform::build_row;
