use crate::amounts;
use crate::dates;
use crate::table::SheetTable;
use crate::vocab;

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Description,
    Amount,
    Category,
    Unassigned,
}

/// Resolved column indices for a transaction-log sheet. Absent roles stay
/// `None`; present indices are distinct by construction.
#[derive(Debug, Clone, Default)]
pub struct TxnMapping {
    pub date_col: Option<usize>,
    pub description_col: Option<usize>,
    pub amount_col: Option<usize>,
    pub category_col: Option<usize>,
    pub header: Vec<String>,
}

impl TxnMapping {
    pub fn role_of(&self, col: usize) -> ColumnRole {
        if self.date_col == Some(col) {
            ColumnRole::Date
        } else if self.description_col == Some(col) {
            ColumnRole::Description
        } else if self.amount_col == Some(col) {
            ColumnRole::Amount
        } else if self.category_col == Some(col) {
            ColumnRole::Category
        } else {
            ColumnRole::Unassigned
        }
    }

    fn taken(&self, col: usize) -> bool {
        self.role_of(col) != ColumnRole::Unassigned
    }
}

fn header_match(table: &SheetTable, taken: &TxnMapping, test: fn(&str) -> bool) -> Option<usize> {
    (0..table.column_count()).find(|&col| !taken.taken(col) && test(&table.header[col]))
}

fn value_match(
    table: &SheetTable,
    taken: &TxnMapping,
    qualifies: impl Fn(&[&str]) -> bool,
) -> Option<usize> {
    (0..table.column_count()).find(|&col| {
        if taken.taken(col) {
            return false;
        }
        let sample = table.sample_column(col, SAMPLE_ROWS);
        !sample.is_empty() && qualifies(&sample)
    })
}

fn date_like_sample(sample: &[&str]) -> bool {
    sample.iter().filter(|v| dates::is_date_like(v)).count() * 2 >= sample.len()
}

fn category_literal_sample(sample: &[&str]) -> bool {
    let hits = sample
        .iter()
        .filter(|v| {
            let lower = v.trim().to_lowercase();
            matches!(lower.as_str(), "income" | "expense" | "expenses")
        })
        .count();
    hits * 2 >= sample.len()
}

fn text_like_sample(sample: &[&str]) -> bool {
    let hits = sample
        .iter()
        .filter(|v| v.len() > 2 && !amounts::is_amount_like(v) && !dates::is_date_like(v))
        .count();
    hits as f64 / sample.len() as f64 >= 0.4
}

/// Infers the four transaction-log roles: header vocabulary first, then
/// value sampling for whatever the headers left unresolved.
pub fn map_transaction_columns(table: &SheetTable) -> TxnMapping {
    let mut mapping = TxnMapping {
        header: table.header.clone(),
        ..Default::default()
    };

    mapping.date_col = header_match(table, &mapping, vocab::is_date_header);
    mapping.description_col = header_match(table, &mapping, vocab::is_description_header);
    mapping.amount_col = header_match(table, &mapping, vocab::is_amount_header);
    mapping.category_col = header_match(table, &mapping, vocab::is_category_header);

    if mapping.date_col.is_none() {
        mapping.date_col = value_match(table, &mapping, date_like_sample);
    }
    if mapping.amount_col.is_none() {
        mapping.amount_col = value_match(table, &mapping, |s| amounts::is_amount_like_column(s));
    }
    if mapping.category_col.is_none() {
        mapping.category_col = value_match(table, &mapping, category_literal_sample);
    }
    if mapping.description_col.is_none() {
        mapping.description_col = value_match(table, &mapping, text_like_sample);
    }

    mapping
}
