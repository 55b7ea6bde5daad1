use rust_decimal::Decimal;

use super::domain::{Declarant, DeclarationRow, ExcessWithdrawal, DISPLAY_DATE_FORMAT};
use super::totals::DeclarationTotals;

/// Field delimiter mandated by the receiving authority.
pub const FIELD_DELIMITER: char = ';';

/// The consuming system rejects anything but CRLF line terminators.
pub const LINE_TERMINATOR: &str = "\r\n";

const TITLE: &str = "ANNUAL DECLARATION OF DIVIDEND DISTRIBUTIONS AND TAX CREDITS";
const SECTION_TRANSACTIONS: &str = "SECTION A;DISTRIBUTIONS AND ASSOCIATED CREDITS";
const SECTION_EXCESS: &str = "SECTION B;EXCESS WITHDRAWAL BALANCES";
const SECTION_SUMMARY: &str = "SECTION C;TOTALS";

/// One position of the authority template. The declaration file is this
/// ordered slot sequence rendered top to bottom; a schema change is an edit
/// to `TEMPLATE`, never offset arithmetic over raw lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateSlot {
    Blank,
    Text(&'static str),
    DeclarantTaxId,
    DeclarantName,
    DeclarantAddress,
    DeclarantCommune,
    DeclarantEmail,
    DeclarantPhone,
    FiscalYear,
    TransactionHeader,
    TransactionRows,
    ExcessHeader,
    ExcessRows,
    SummaryHeader,
    SummaryRow,
}

const TEMPLATE: &[TemplateSlot] = &[
    TemplateSlot::Text(TITLE),
    TemplateSlot::Blank,
    TemplateSlot::DeclarantTaxId,
    TemplateSlot::DeclarantName,
    TemplateSlot::DeclarantAddress,
    TemplateSlot::DeclarantCommune,
    TemplateSlot::DeclarantEmail,
    TemplateSlot::DeclarantPhone,
    TemplateSlot::FiscalYear,
    TemplateSlot::Blank,
    TemplateSlot::Text(SECTION_TRANSACTIONS),
    TemplateSlot::TransactionHeader,
    TemplateSlot::TransactionRows,
    TemplateSlot::Blank,
    TemplateSlot::Text(SECTION_EXCESS),
    TemplateSlot::ExcessHeader,
    TemplateSlot::ExcessRows,
    TemplateSlot::Blank,
    TemplateSlot::Text(SECTION_SUMMARY),
    TemplateSlot::SummaryHeader,
    TemplateSlot::SummaryRow,
];

/// Lines contributed by the skeleton alone; data and excess rows add one
/// line each on top.
pub fn skeleton_line_count() -> usize {
    TEMPLATE
        .iter()
        .filter(|slot| !matches!(slot, TemplateSlot::TransactionRows | TemplateSlot::ExcessRows))
        .count()
}

/// Serialize a complete filing into the authority's byte-exact text form.
///
/// Data rows keep their input order; the boilerplate blocks are emitted even
/// for an empty filing. Every line, including the last, ends in CRLF.
pub fn render(
    declarant: &Declarant,
    fiscal_year_label: &str,
    rows: &[DeclarationRow],
    excess: &[ExcessWithdrawal],
    totals: &DeclarationTotals,
) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(skeleton_line_count() + rows.len() + excess.len());
    let (tax_body, tax_verifier) = declarant.tax_id.split();

    for slot in TEMPLATE {
        match slot {
            TemplateSlot::Blank => lines.push(String::new()),
            TemplateSlot::Text(text) => lines.push((*text).to_string()),
            TemplateSlot::DeclarantTaxId => {
                lines.push(format!("DECLARANT TAX ID;{tax_body};{tax_verifier}"))
            }
            TemplateSlot::DeclarantName => {
                lines.push(format!("LEGAL NAME;{}", declarant.legal_name))
            }
            TemplateSlot::DeclarantAddress => lines.push(format!("ADDRESS;{}", declarant.address)),
            TemplateSlot::DeclarantCommune => lines.push(format!("COMMUNE;{}", declarant.commune)),
            TemplateSlot::DeclarantEmail => lines.push(format!("EMAIL;{}", declarant.email)),
            TemplateSlot::DeclarantPhone => lines.push(format!("PHONE;{}", declarant.phone)),
            TemplateSlot::FiscalYear => lines.push(format!("TAX YEAR;{fiscal_year_label}")),
            TemplateSlot::TransactionHeader => lines.push(join(transaction_header_fields())),
            TemplateSlot::TransactionRows => {
                lines.extend(rows.iter().map(|row| join(transaction_fields(row))))
            }
            TemplateSlot::ExcessHeader => lines.push(join(excess_header_fields())),
            TemplateSlot::ExcessRows => lines.extend(
                excess
                    .iter()
                    .map(|withdrawal| join(excess_fields(withdrawal))),
            ),
            TemplateSlot::SummaryHeader => lines.push(join(summary_header_fields())),
            TemplateSlot::SummaryRow => lines.push(join(summary_fields(totals))),
        }
    }

    let mut content = lines.join(LINE_TERMINATOR);
    content.push_str(LINE_TERMINATOR);
    content
}

fn join(fields: Vec<String>) -> String {
    let mut line = String::new();
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(field);
    }
    line
}

const AMOUNT_COLUMNS: [&str; 12] = [
    "AFFECTED WITH CREDIT",
    "AFFECTED LEGACY CREDIT",
    "AFFECTED VOLUNTARY CREDIT",
    "AFFECTED WITHOUT CREDIT",
    "EXEMPT WITH CREDIT",
    "EXEMPT FINAL TAXES",
    "NON-INCOME",
    "CAPITAL RETURN",
    "PRESUMPTIVE",
    "SUBSTITUTE REGIME",
    "DEEMED DISTRIBUTION",
    "OTHER",
];

const CREDIT_COLUMNS: [&str; 16] = [
    "CREDIT PRE-2020",
    "CREDIT PRE-2020 REFUNDABLE",
    "CREDIT 2020+",
    "CREDIT 2020+ REFUNDABLE",
    "CREDIT RESTITUTION",
    "CREDIT RESTITUTION REFUNDABLE",
    "CREDIT EXEMPT",
    "CREDIT EXEMPT REFUNDABLE",
    "CREDIT EXEMPT RESTITUTION",
    "LEGACY BALANCE CREDIT",
    "LEGACY BALANCE CREDIT REFUNDABLE",
    "LEGACY RATE-ADJUSTED CREDIT",
    "LEGACY RATE-ADJUSTED CREDIT REFUNDABLE",
    "LEGACY VOLUNTARY CREDIT",
    "ADDITIONAL TAX CREDIT",
    "CAPITAL RETURN CREDIT",
];

pub(crate) fn transaction_header_fields() -> Vec<String> {
    let mut fields = vec![
        "DATE".to_string(),
        "RECEIVER TAX ID".to_string(),
        "VERIFIER".to_string(),
        "OWNERSHIP".to_string(),
        "SHARES".to_string(),
    ];
    fields.extend(AMOUNT_COLUMNS.iter().map(|name| name.to_string()));
    fields.extend(CREDIT_COLUMNS.iter().map(|name| name.to_string()));
    fields.push("CERTIFICATE".to_string());
    fields
}

/// The receiver tax id expands into two physical fields, so one logical row
/// of 33 columns renders as 34 delimited values.
pub(crate) fn transaction_fields(row: &DeclarationRow) -> Vec<String> {
    let (body, verifier) = row.receiver.split();
    let mut fields = vec![
        row.transaction_date.format(DISPLAY_DATE_FORMAT).to_string(),
        body.to_string(),
        verifier.to_string(),
        row.ownership.code().to_string(),
        row.shares.to_string(),
    ];
    fields.extend(row.amounts.ordered().iter().map(format_amount));
    fields.extend(row.credits.ordered().iter().map(format_amount));
    fields.push(row.certificate.clone().unwrap_or_default());
    fields
}

pub(crate) fn excess_header_fields() -> Vec<String> {
    vec![
        "RECEIVER TAX ID".to_string(),
        "VERIFIER".to_string(),
        "BALANCE".to_string(),
    ]
}

pub(crate) fn excess_fields(withdrawal: &ExcessWithdrawal) -> Vec<String> {
    let (body, verifier) = withdrawal.receiver.split();
    vec![
        body.to_string(),
        verifier.to_string(),
        format_amount(&withdrawal.balance),
    ]
}

pub(crate) fn summary_header_fields() -> Vec<String> {
    let mut fields = vec!["SECTION".to_string(), "SHARES".to_string()];
    fields.extend(AMOUNT_COLUMNS.iter().map(|name| name.to_string()));
    fields.extend(CREDIT_COLUMNS.iter().map(|name| name.to_string()));
    fields.push("EXCESS BALANCE".to_string());
    fields.push("ROW COUNT".to_string());
    fields
}

pub(crate) fn summary_fields(totals: &DeclarationTotals) -> Vec<String> {
    let mut fields = vec!["TOTALS".to_string(), totals.shares.to_string()];
    fields.extend(totals.amounts.ordered().iter().map(format_amount));
    fields.extend(totals.credits.ordered().iter().map(format_amount));
    fields.push(format_amount(&totals.excess_balance));
    fields.push(totals.row_count.to_string());
    fields
}

fn format_amount(value: &Decimal) -> String {
    value.normalize().to_string()
}
