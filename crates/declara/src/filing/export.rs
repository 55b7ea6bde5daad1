use std::io::Write;

use chrono::NaiveDate;

use super::domain::{Declarant, DeclarationRow, ExcessWithdrawal};
use super::template;
use super::totals::DeclarationTotals;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Failures while writing the sibling CSV surface.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode export: {0}")]
    Csv(#[from] csv::Error),
}

/// The filing laid out as a grid of cells for an external workbook writer.
///
/// Cell values come from the same field builders as the authority file, so
/// the two surfaces cannot drift apart.
pub fn grid(
    declarant: &Declarant,
    fiscal_year_label: &str,
    rows: &[DeclarationRow],
    excess: &[ExcessWithdrawal],
    totals: &DeclarationTotals,
) -> Vec<Vec<String>> {
    let (tax_body, tax_verifier) = declarant.tax_id.split();
    let mut cells: Vec<Vec<String>> = vec![
        vec!["DECLARANT TAX ID".to_string(), tax_body.to_string(), tax_verifier.to_string()],
        vec!["LEGAL NAME".to_string(), declarant.legal_name.clone()],
        vec!["ADDRESS".to_string(), declarant.address.clone()],
        vec!["COMMUNE".to_string(), declarant.commune.clone()],
        vec!["EMAIL".to_string(), declarant.email.clone()],
        vec!["PHONE".to_string(), declarant.phone.clone()],
        vec!["TAX YEAR".to_string(), fiscal_year_label.to_string()],
        vec![String::new()],
        template::transaction_header_fields(),
    ];

    cells.extend(rows.iter().map(template::transaction_fields));
    cells.push(vec![String::new()]);
    cells.push(template::excess_header_fields());
    cells.extend(excess.iter().map(template::excess_fields));
    cells.push(vec![String::new()]);
    cells.push(template::summary_header_fields());
    cells.push(template::summary_fields(totals));
    cells
}

/// Write the grid as semicolon-delimited CSV with CRLF terminators.
///
/// The BOM prefix exists for spreadsheet tools that refuse to sniff UTF-8
/// without it; the authority file itself never carries one.
pub fn write_csv<W: Write>(
    mut writer: W,
    cells: &[Vec<String>],
    include_bom: bool,
) -> Result<(), ExportError> {
    if include_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(writer);

    for record in cells {
        csv_writer.write_record(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `{DocType}_{DeclarantTaxId}_{FiscalYear}_{ISODate}.{ext}` naming used by
/// every export surface.
pub fn export_file_name(
    doc_type: &str,
    declarant: &Declarant,
    fiscal_year_label: &str,
    generated_on: NaiveDate,
    extension: &str,
) -> String {
    format!(
        "{doc_type}_{tax_id}_{fiscal_year_label}_{date}.{extension}",
        tax_id = declarant.tax_id.0.trim(),
        date = generated_on.format("%Y-%m-%d"),
    )
}
