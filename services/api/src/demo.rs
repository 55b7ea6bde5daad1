use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;
use declara::error::AppError;
use declara::filing::{
    AllocationFactors, Declarant, DeclarationService, ExcessWithdrawal, Filing, FilingOverrides,
    FilingRequest, InvalidRegimePolicy, QualificationRecord, RegimeConfig, TaxId, TaxRegime,
};
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub(crate) struct DeclareArgs {
    /// Filing request document (JSON) with declarant, records, and overrides
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Output path; defaults to the conventional export file name
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Emit the spreadsheet-oriented CSV surface instead of the authority file
    #[arg(long)]
    pub(crate) csv: bool,
    /// Prefix the CSV surface with a UTF-8 byte order mark
    #[arg(long)]
    pub(crate) bom: bool,
    /// Abort the run on the first invalid regime instead of zeroing credits
    #[arg(long)]
    pub(crate) strict: bool,
    /// Generation date stamped into the file name (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) generated_on: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Fiscal year label used in the demo filing
    #[arg(long)]
    pub(crate) fiscal_year: Option<String>,
    /// Print every rendered line instead of the leading excerpt
    #[arg(long)]
    pub(crate) full_file: bool,
}

pub(crate) fn run_declare(args: DeclareArgs) -> Result<(), AppError> {
    let DeclareArgs {
        input,
        output,
        csv,
        bom,
        strict,
        generated_on,
    } = args;

    let raw = fs::read_to_string(&input)?;
    let request: FilingRequest = serde_json::from_str(&raw)
        .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;

    let policy = if strict {
        InvalidRegimePolicy::Propagate
    } else {
        InvalidRegimePolicy::ZeroCredits
    };
    let filing = DeclarationService::new(policy).generate(request)?;

    let generated_on = generated_on.unwrap_or_else(|| Local::now().date_naive());
    let extension = if csv { "csv" } else { "txt" };
    let path = output.unwrap_or_else(|| {
        PathBuf::from(filing.file_name("DIVDECL", generated_on, extension))
    });

    if csv {
        let mut file = fs::File::create(&path)?;
        filing.write_csv(&mut file, bom)?;
        file.flush()?;
    } else {
        fs::write(&path, filing.render())?;
    }

    println!("Declaration written to {}", path.display());
    print_totals(&filing);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let fiscal_year = args.fiscal_year.unwrap_or_else(|| "2024".to_string());

    println!("Dividend declaration demo (fiscal year {fiscal_year})");
    let request = sample_filing_request(&fiscal_year);
    println!(
        "- {} qualification records, {} excess-withdrawal balances",
        request.records.len(),
        request.excess_withdrawals.len()
    );

    let service = DeclarationService::new(InvalidRegimePolicy::ZeroCredits);
    let filing = service.generate(request)?;
    print_totals(&filing);

    let content = filing.render();
    let excerpt: Vec<&str> = if args.full_file {
        content.lines().collect()
    } else {
        content.lines().take(14).collect()
    };

    println!("\nRendered file ({} bytes):", content.len());
    for line in excerpt {
        println!("  {line}");
    }
    if !args.full_file {
        println!("  ...");
    }

    Ok(())
}

fn print_totals(filing: &Filing) {
    let totals = &filing.totals;
    println!(
        "- {} rows | credit base total {} | 2020+ credit {} | restitution credit {}",
        totals.row_count,
        totals.amounts.credit_base(),
        totals.credits.accumulated_post2020 + totals.credits.accumulated_post2020_refundable,
        totals.credits.restitution + totals.credits.restitution_refundable,
    );
    println!(
        "- exempt credit {} | excess balances {} across {} receivers",
        totals.credits.exempt + totals.credits.exempt_refundable,
        totals.excess_balance,
        totals.excess_row_count,
    );
}

/// A realistic mixed filing: a creditable dividend, an exempt distribution,
/// and one record whose regime is broken on purpose so the lenient policy
/// path is visible in demos.
pub(crate) fn sample_filing_request(fiscal_year: &str) -> FilingRequest {
    let declarant = Declarant {
        tax_id: TaxId("76543210-K".to_string()),
        legal_name: "Andes Custody SpA".to_string(),
        address: "Av. Apoquindo 3000, of. 501".to_string(),
        commune: "Las Condes".to_string(),
        email: "filings@andescustody.cl".to_string(),
        phone: "+56 2 2345 6789".to_string(),
    };

    let general_regime = RegimeConfig {
        regime: TaxRegime::General,
        corporate_rate: Decimal::new(27, 2),
        fiscal_year: 2024,
        refund_right: false,
        restitution: false,
    };

    let simplified_regime = RegimeConfig {
        regime: TaxRegime::Simplified,
        corporate_rate: Decimal::new(25, 2),
        fiscal_year: 2024,
        refund_right: true,
        restitution: false,
    };

    let mut broken_regime = general_regime.clone();
    broken_regime.fiscal_year = 2015;

    let records = vec![
        QualificationRecord {
            id: "qual-001".to_string(),
            total_amount: Decimal::from(1_000_000),
            currency: "CLP".to_string(),
            period: "2024-Q3".to_string(),
            factors: AllocationFactors {
                affected_without_credit: Decimal::new(5, 1),
                ..AllocationFactors::default()
            },
            regime: Some(general_regime),
            certificate: Some("CERT-2024-0117".to_string()),
            last_modified: NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date"),
        },
        QualificationRecord {
            id: "qual-002".to_string(),
            total_amount: Decimal::from(600_000),
            currency: "CLP".to_string(),
            period: "2024-11-08".to_string(),
            factors: AllocationFactors {
                exempt_with_credit: Decimal::new(3, 1),
                non_income: Decimal::new(2, 1),
                ..AllocationFactors::default()
            },
            regime: Some(simplified_regime),
            certificate: None,
            last_modified: NaiveDate::from_ymd_opt(2025, 1, 22).expect("valid date"),
        },
        QualificationRecord {
            id: "qual-003".to_string(),
            total_amount: Decimal::from(250_000),
            currency: "CLP".to_string(),
            period: "pending reconciliation".to_string(),
            factors: AllocationFactors::default(),
            regime: Some(broken_regime),
            certificate: None,
            last_modified: NaiveDate::from_ymd_opt(2025, 2, 3).expect("valid date"),
        },
    ];

    FilingRequest {
        declarant,
        fiscal_year_label: fiscal_year.to_string(),
        records,
        overrides: FilingOverrides {
            shares: Some(1_000),
            ..FilingOverrides::default()
        },
        excess_withdrawals: vec![ExcessWithdrawal {
            receiver: TaxId("11222333-4".to_string()),
            balance: Decimal::from(150_000),
        }],
    }
}
