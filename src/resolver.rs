use crate::amounts;
use crate::models::TxnType;
use crate::table::SheetTable;
use crate::vocab;

const PAIR_SAMPLE_ROWS: usize = 50;

/// How a signed cell value maps to income or expense when nothing
/// stronger (override, literal, keyword) has settled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignConvention {
    /// Transaction logs habitually record spending as positive numbers,
    /// so an unexplained value of either sign reads as an expense.
    ExpenseBias,
    /// Negative is money out, positive is money in.
    NaiveSign,
}

/// Resolves a transaction's type. Checks run strongest first: a sheet
/// override beats a literal category cell, which beats keyword matches
/// on category then description, which beat the sign fallback.
pub fn resolve_type(
    override_type: Option<TxnType>,
    category: &str,
    description: &str,
    amount: f64,
    convention: SignConvention,
) -> TxnType {
    if let Some(t) = override_type {
        return t;
    }
    if let Some(t) = literal_type(category) {
        return t;
    }
    if let Some(t) = keyword_type(category).or_else(|| keyword_type(description)) {
        return t;
    }
    match convention {
        SignConvention::ExpenseBias => TxnType::Expense,
        SignConvention::NaiveSign => {
            if amount < 0.0 {
                TxnType::Expense
            } else {
                TxnType::Income
            }
        }
    }
}

/// A category cell that literally says what the row is.
pub fn literal_type(category: &str) -> Option<TxnType> {
    let c = category.trim().to_lowercase();
    match c.as_str() {
        "income" => Some(TxnType::Income),
        "expense" | "expenses" => Some(TxnType::Expense),
        _ => None,
    }
}

/// Keyword scan over free text. Income keywords win when both sides
/// match ("salary payment" is money in, not a bill).
pub fn keyword_type(text: &str) -> Option<TxnType> {
    if text.trim().is_empty() {
        return None;
    }
    if vocab::matches_income_keyword(text) {
        return Some(TxnType::Income);
    }
    if vocab::matches_expense_keyword(text) {
        return Some(TxnType::Expense);
    }
    None
}

/// Sheets sometimes carry side-by-side "Income" and "Expense" rollup
/// columns with only one of them actually filled in. When exactly one
/// side holds data, that side names the whole sheet's type.
pub fn paired_header_override(table: &SheetTable) -> Option<TxnType> {
    let mut income_cols = Vec::new();
    let mut expense_cols = Vec::new();
    for (col, header) in table.header.iter().enumerate() {
        if !vocab::is_aggregate_or_type_header(header) {
            continue;
        }
        if vocab::matches_income_keyword(header) {
            income_cols.push(col);
        } else if vocab::matches_expense_keyword(header) {
            expense_cols.push(col);
        }
    }
    if income_cols.is_empty() || expense_cols.is_empty() {
        return None;
    }

    let income_filled = populated_cells(table, &income_cols);
    let expense_filled = populated_cells(table, &expense_cols);
    match (income_filled > 0, expense_filled > 0) {
        (true, false) => Some(TxnType::Income),
        (false, true) => Some(TxnType::Expense),
        _ => None,
    }
}

fn populated_cells(table: &SheetTable, cols: &[usize]) -> usize {
    let mut filled = 0;
    for row in 0..table.row_count().min(PAIR_SAMPLE_ROWS) {
        for &col in cols {
            if amounts::parse_amount(table.cell(row, col)) != 0.0 {
                filled += 1;
            }
        }
    }
    filled
}
