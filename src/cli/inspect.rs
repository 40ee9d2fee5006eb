use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::classifier;
use crate::error::Result;
use crate::extract::{self, LayoutMapping};
use crate::loader;
use crate::mixed::MixedAnalysis;
use crate::summary::SummaryMapping;
use crate::table::SheetTable;

pub fn run(file: &str, sheets: &[String]) -> Result<()> {
    let tables = loader::load_tables(Path::new(file))?;
    let parsed = extract::parse(tables)?;

    let names: Vec<String> = if sheets.is_empty() {
        vec![parsed.tables[parsed.selected].name.clone()]
    } else {
        sheets.to_vec()
    };

    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let sheet = super::find_sheet(&parsed, name)?;

        let format = classifier::classify(sheet);
        println!(
            "{}: {} layout, {} rows x {} cols",
            sheet.name.bold(),
            format.label(),
            sheet.row_count(),
            sheet.column_count()
        );

        match extract::mapping_for(sheet, format) {
            LayoutMapping::Transaction(m) => {
                let mut table = Table::new();
                table.set_header(vec!["Role", "Column", "Header"]);
                for (role, col) in [
                    ("date", m.date_col),
                    ("description", m.description_col),
                    ("amount", m.amount_col),
                    ("category", m.category_col),
                ] {
                    table.add_row(vec![
                        Cell::new(role),
                        Cell::new(col.map_or("-".to_string(), |c| c.to_string())),
                        Cell::new(col.map_or("", |c| m.header[c].as_str())),
                    ]);
                }
                println!("{table}");
                println!(
                    "Sign convention: positive amounts read as expenses unless a \
                     keyword, literal type, or sheet override marks them income"
                );
            }
            LayoutMapping::Summary(m) => print_summary_mapping(sheet, &m),
            LayoutMapping::Mixed(a) => {
                print_mixed_analysis(&a);
                println!(
                    "Sign convention: naive sign (negative cells are expenses, \
                     positive cells income) unless a sheet override applies"
                );
            }
        }

        let hints = super::hints_for_sheet(&sheet.name, None);
        let selection = vec![sheet.name.clone()];
        let (_, conf) = extract::extract_with_confidence(&parsed, &selection, &hints)?;
        println!("{}", super::confidence_summary(&conf));
    }
    Ok(())
}

fn print_summary_mapping(sheet: &SheetTable, m: &SummaryMapping) {
    let period = match (m.year_col, m.month_col, m.date_col) {
        (Some(y), Some(mo), _) => format!("Year col {y} + Month col {mo}"),
        (_, _, Some(d)) => format!("date col {d}"),
        _ => "none (rows fall back to today)".to_string(),
    };
    println!("Period key: {period}");

    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "Classified as"]);
    for cat in &m.expense_categories {
        table.add_row(vec![
            Cell::new(cat.col),
            Cell::new(&cat.name),
            Cell::new("expense".red()),
        ]);
    }
    for cat in &m.income_categories {
        table.add_row(vec![
            Cell::new(cat.col),
            Cell::new(&cat.name),
            Cell::new("income".green()),
        ]);
    }
    for total in &m.total_columns {
        let parts: Vec<&str> = total
            .parts
            .iter()
            .map(|&c| sheet.header[c].as_str())
            .collect();
        table.add_row(vec![
            Cell::new(total.col),
            Cell::new(&total.name),
            Cell::new(format!("{} total = {}", total.kind.label(), parts.join(" + "))),
        ]);
    }
    println!("{table}");
}

fn print_mixed_analysis(a: &MixedAnalysis) {
    let names: Vec<&str> = a.category_cols.iter().map(|c| c.name.as_str()).collect();
    println!("Date key: column {}", a.date_col);
    println!("Categories: {}", names.join(", "));
    println!(
        "Rows: {} detail, {} summary, {} total; sheet reads as {}",
        a.detail_rows.len(),
        a.summary_rows.len(),
        a.total_rows.len(),
        a.sheet_type.label()
    );
}
