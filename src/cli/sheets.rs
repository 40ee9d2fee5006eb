use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::extract;
use crate::loader;

pub fn run(file: &str) -> Result<()> {
    let tables = loader::load_tables(Path::new(file))?;
    let parsed = extract::parse(tables)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Sheet", "Rows", "Cols", "Score", ""]);
    for score in &parsed.scores {
        let sheet = &parsed.tables[score.index];
        let marker = if score.index == parsed.selected { "*" } else { "" };
        let note = if score.denylisted {
            "denylisted".red().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&score.name),
            Cell::new(sheet.row_count()),
            Cell::new(sheet.column_count()),
            Cell::new(score.score),
            Cell::new(note),
        ]);
    }
    println!("Sheets in {file} (* = auto-selected)\n{table}");
    println!(
        "\nSelected: {} ({} layout)",
        parsed.tables[parsed.selected].name.bold(),
        parsed.format.label()
    );
    Ok(())
}
