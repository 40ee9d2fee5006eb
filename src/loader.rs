use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{Result, TallyError};
use crate::table::SheetTable;

/// Reads a spreadsheet export into raw sheet tables. CSV yields a single
/// sheet named after the file; workbook formats yield one table per sheet.
/// The first line of each sheet lands in the header slot; whether it really
/// is a header is decided later by the selector.
pub fn load_tables(path: &Path) -> Result<Vec<SheetTable>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" | "tsv" => load_csv(path, &ext),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => load_workbook(path),
        other => Err(TallyError::UnsupportedFormat(format!(
            "{} (expected csv, tsv or a workbook format)",
            if other.is_empty() { "no extension" } else { other }
        ))),
    }
}

fn sheet_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

fn load_csv(path: &Path, ext: &str) -> Result<Vec<SheetTable>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(if ext == "tsv" { b'\t' } else { b',' })
        .from_reader(std::io::BufReader::new(file));

    let mut lines: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        lines.push(record.iter().map(|s| s.to_string()).collect());
    }

    let mut lines = lines.into_iter();
    let header = lines.next().unwrap_or_default();
    Ok(vec![SheetTable::new(sheet_name_for(path), header, lines.collect())])
}

fn load_workbook(path: &Path) -> Result<Vec<SheetTable>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| TallyError::Workbook(format!("failed to open {}: {e}", path.display())))?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let Ok(range) = workbook.worksheet_range(&name) else {
            continue;
        };
        let mut lines = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());
        let header = lines.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = lines.collect();
        tables.push(SheetTable::new(name, header, rows));
    }
    Ok(tables)
}

/// Renders one workbook cell the way it would look in a CSV export. Whole
/// floats drop their ".0" so years and serials survive integer parsing;
/// date cells come through as their serial number and are decoded by the
/// date normalizer like any other serial.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
