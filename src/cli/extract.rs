use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::confidence;
use crate::error::{Result, TallyError};
use crate::extract;
use crate::fmt;
use crate::loader;
use crate::models::{Transaction, TxnType};

use super::OutputFormat;

pub fn run(
    file: &str,
    sheets: &[String],
    format: OutputFormat,
    year: Option<i32>,
    output: Option<String>,
) -> Result<()> {
    if output.is_some() {
        // keep ANSI codes out of files
        colored::control::set_override(false);
    }
    let tables = loader::load_tables(Path::new(file))?;
    let parsed = extract::parse(tables)?;

    let names: Vec<String> = if sheets.is_empty() {
        vec![parsed.tables[parsed.selected].name.clone()]
    } else {
        sheets.to_vec()
    };

    // Each sheet gets hints from its own tab name, so "March 2024" and
    // "Expenses" tabs in one workbook each parse under their own context.
    let mut all = Vec::new();
    let mut parts = Vec::new();
    for name in &names {
        let sheet = super::find_sheet(&parsed, name)?;
        let hints = super::hints_for_sheet(&sheet.name, year);
        let selection = vec![sheet.name.clone()];
        let (txns, conf) = extract::extract_with_confidence(&parsed, &selection, &hints)?;
        all.extend(txns);
        parts.push(conf);
    }
    let conf = confidence::combine(parts);

    let body = render(&all, format)?;
    match output {
        Some(path) => write_output(&body, &path, all.len())?,
        None => println!("{}", body.trim_end_matches('\n')),
    }
    eprintln!("{}", super::confidence_summary(&conf));
    Ok(())
}

fn render(txns: &[Transaction], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(txns)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(txns).map_err(|e| TallyError::Other(e.to_string()))
        }
        OutputFormat::Csv => render_csv(txns),
    }
}

fn render_table(txns: &[Transaction]) -> String {
    if txns.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Category", "Type", "Amount"]);
    let mut net = 0.0;
    for txn in txns {
        net += txn.signed_amount;
        let type_cell = match txn.txn_type {
            TxnType::Income => Cell::new(txn.txn_type.label().green()),
            TxnType::Expense => Cell::new(txn.txn_type.label().red()),
        };
        let amount = fmt::money(txn.signed_amount);
        let amount_cell = if txn.signed_amount < 0.0 {
            Cell::new(amount.red())
        } else {
            Cell::new(amount.green())
        };
        table.add_row(vec![
            Cell::new(&txn.date),
            Cell::new(&txn.description),
            Cell::new(&txn.category),
            type_cell,
            amount_cell,
        ]);
    }
    format!("{} transactions (net: {})\n{table}", txns.len(), fmt::money(net))
}

fn render_csv(txns: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for txn in txns {
        wtr.serialize(txn)?;
    }
    let bytes = wtr.into_inner().map_err(|e| TallyError::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TallyError::Other(e.to_string()))
}

fn write_output(body: &str, path: &str, count: usize) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let body = if body.ends_with('\n') { body.to_string() } else { format!("{body}\n") };
    std::fs::write(path, body)?;
    println!("Wrote {count} transactions to {}", path.display());
    Ok(())
}
