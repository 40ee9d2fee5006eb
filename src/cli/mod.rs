pub mod extract;
pub mod inspect;
pub mod sheets;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::confidence::{Confidence, ConfidenceLevel, Severity};
use crate::error::{Result, TallyError};
use crate::extract::ParsedFile;
use crate::models::{ParseHints, TxnType};
use crate::table::SheetTable;
use crate::vocab;

/// Hints an extraction can pick up from a sheet's tab name: a month word
/// fixes day/month order for ambiguous dates, an income/expense word fixes
/// the sheet type, and a four-digit year anchors bare month cells. The
/// engine itself never derives these; the CLI is the caller that does.
pub(crate) fn hints_for_sheet(name: &str, year_flag: Option<i32>) -> ParseHints {
    ParseHints {
        default_year: year_flag.or_else(|| year_in_text(name)),
        month_hint: vocab::month_in_text(name),
        sheet_type: sheet_type_from_name(name),
    }
}

fn sheet_type_from_name(name: &str) -> Option<TxnType> {
    if vocab::matches_income_keyword(name) {
        Some(TxnType::Income)
    } else if vocab::matches_expense_keyword(name) {
        Some(TxnType::Expense)
    } else {
        None
    }
}

pub(crate) fn year_in_text(text: &str) -> Option<i32> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter_map(|w| w.parse::<i32>().ok())
        .find(|y| (1990..=2100).contains(y))
}

/// Case-insensitive sheet lookup, the same matching `extract` uses.
pub(crate) fn find_sheet<'a>(parsed: &'a ParsedFile, name: &str) -> Result<&'a SheetTable> {
    parsed
        .tables
        .iter()
        .find(|t| t.name.trim().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| TallyError::UnknownSheet(name.to_string()))
}

pub(crate) fn confidence_summary(conf: &Confidence) -> String {
    let label = match conf.level {
        ConfidenceLevel::High => "high".green().bold(),
        ConfidenceLevel::Medium => "medium".yellow().bold(),
        ConfidenceLevel::Low => "low".red().bold(),
    };
    let mut out = format!("Confidence: {label} ({}/100)", conf.score);
    for issue in &conf.issues {
        let sev = match issue.severity {
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        out.push_str(&format!("\n  {sev}: {}", issue.message));
    }
    out
}

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Layout inference and transaction extraction for messy spreadsheet exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the worksheets in a file with their selection scores.
    Sheets {
        /// Path to a CSV/TSV/XLSX file
        file: String,
    },
    /// Show the detected layout and column mapping for one or more sheets.
    Inspect {
        /// Path to a CSV/TSV/XLSX file
        file: String,
        /// Sheet name to inspect (repeatable; default: the auto-selected one)
        #[arg(long)]
        sheet: Vec<String>,
    },
    /// Extract normalized transactions.
    Extract {
        /// Path to a CSV/TSV/XLSX file
        file: String,
        /// Sheet name to extract from (repeatable; default: the auto-selected one)
        #[arg(long)]
        sheet: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Year to assume for period cells that carry none of their own
        #[arg(long)]
        year: Option<i32>,
        /// Write the output to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}
