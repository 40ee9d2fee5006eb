use std::collections::HashSet;

use crate::amounts;
use crate::dates;
use crate::models::TxnType;
use crate::table::SheetTable;
use crate::vocab;

const SAMPLE_ROWS: usize = 5;
/// Rows examined by sum detection and category sign analysis.
const SUM_SAMPLE_ROWS: usize = 50;
/// Longest consecutive run of columns a total may sum. Real sheets total
/// 2-6 columns; the cap keeps the search linear-ish.
const MAX_WINDOW: usize = 8;
const SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalKind {
    Expense,
    Income,
    Net,
}

impl TotalKind {
    pub fn label(&self) -> &'static str {
        match self {
            TotalKind::Expense => "expense",
            TotalKind::Income => "income",
            TotalKind::Net => "net",
        }
    }
}

/// A column proven to be the per-row sum of other category columns.
/// Excluded from emission; its parts inherit its kind.
#[derive(Debug, Clone)]
pub struct TotalColumn {
    pub col: usize,
    pub name: String,
    pub kind: TotalKind,
    pub parts: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct CategoryColumn {
    pub col: usize,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryMapping {
    pub year_col: Option<usize>,
    pub month_col: Option<usize>,
    pub date_col: Option<usize>,
    pub expense_categories: Vec<CategoryColumn>,
    pub income_categories: Vec<CategoryColumn>,
    pub total_columns: Vec<TotalColumn>,
}

impl SummaryMapping {
    /// True when the mapping can place rows in time at all.
    pub fn has_period(&self) -> bool {
        (self.year_col.is_some() && self.month_col.is_some()) || self.date_col.is_some()
    }
}

/// Infers the pivot-sheet schema: a period key, category columns split into
/// expense and income, and total columns to exclude.
pub fn map_summary_columns(table: &SheetTable) -> SummaryMapping {
    let mut mapping = SummaryMapping::default();

    mapping.year_col = table.header.iter().position(|h| vocab::is_year_header(h));
    mapping.month_col = table.header.iter().position(|h| vocab::is_month_header(h));
    if mapping.year_col.is_none() || mapping.month_col.is_none() {
        mapping.date_col = find_date_column(table, mapping.year_col, mapping.month_col);
    }

    let period: HashSet<usize> = [mapping.year_col, mapping.month_col, mapping.date_col]
        .iter()
        .flatten()
        .copied()
        .collect();

    let candidates: Vec<usize> = (0..table.column_count())
        .filter(|col| !period.contains(col))
        .filter(|&col| !table.header[col].trim().is_empty())
        .filter(|&col| amounts::is_amount_like_column(&table.sample_column(col, SAMPLE_ROWS)))
        .collect();

    let depth = table.row_count().min(SUM_SAMPLE_ROWS);
    let values: Vec<Vec<f64>> = (0..depth)
        .map(|row| {
            candidates
                .iter()
                .map(|&col| amounts::parse_amount(table.cell(row, col)))
                .collect()
        })
        .collect();

    // Totals first, scanning right to left: totals conventionally sit to
    // the right of the columns they sum, and removing them from the pool
    // keeps later windows honest.
    let mut is_total = vec![false; candidates.len()];
    for idx in (0..candidates.len()).rev() {
        let col = candidates[idx];
        let name = table.header[col].trim();
        let min_len = if vocab::is_aggregate_or_type_header(name) { 1 } else { 2 };
        if let Some(parts) = find_sum_parts(&values, candidates.len(), idx, &is_total, min_len) {
            is_total[idx] = true;
            mapping.total_columns.push(TotalColumn {
                col,
                name: name.to_string(),
                kind: total_kind(name),
                parts: parts.iter().map(|&i| candidates[i]).collect(),
            });
        }
    }
    mapping.total_columns.reverse();

    let expense_parts: HashSet<usize> = total_parts(&mapping.total_columns, TotalKind::Expense);
    let income_parts: HashSet<usize> = total_parts(&mapping.total_columns, TotalKind::Income);

    for (idx, &col) in candidates.iter().enumerate() {
        if is_total[idx] {
            continue;
        }
        let name = table.header[col].trim().to_string();
        let column_values: Vec<f64> = values.iter().map(|row| row[idx]).collect();
        let kind = categorize_column(&name, col, &column_values, &expense_parts, &income_parts);
        let entry = CategoryColumn { col, name };
        match kind {
            TxnType::Expense => mapping.expense_categories.push(entry),
            TxnType::Income => mapping.income_categories.push(entry),
        }
    }

    mapping
}

fn find_date_column(table: &SheetTable, skip_a: Option<usize>, skip_b: Option<usize>) -> Option<usize> {
    (0..table.column_count())
        .filter(|col| Some(*col) != skip_a && Some(*col) != skip_b)
        .find(|&col| {
            if vocab::is_period_header(&table.header[col]) {
                return true;
            }
            let sample = table.sample_column(col, SAMPLE_ROWS);
            !sample.is_empty()
                && sample.iter().filter(|v| dates::is_date_like(v)).count() * 2 >= sample.len()
        })
}

/// Greedy consecutive-window search for columns whose per-row sum matches
/// the target within tolerance on enough non-trivial rows. Longer windows
/// are preferred at each start so a full total is not shadowed by one of
/// its own sub-sums.
fn find_sum_parts(
    values: &[Vec<f64>],
    column_count: usize,
    target: usize,
    is_total: &[bool],
    min_len: usize,
) -> Option<Vec<usize>> {
    let nontrivial: Vec<usize> = (0..values.len())
        .filter(|&row| values[row][target] != 0.0)
        .collect();
    if nontrivial.len() < 3 {
        return None;
    }
    let required = 3.max((0.3 * nontrivial.len() as f64).ceil() as usize);

    for start in 0..column_count {
        let longest = MAX_WINDOW.min(column_count - start);
        for len in (min_len..=longest).rev() {
            let window = start..start + len;
            if window.contains(&target) || window.clone().any(|i| is_total[i]) {
                continue;
            }
            let matches = nontrivial
                .iter()
                .filter(|&&row| {
                    let sum: f64 = window.clone().map(|i| values[row][i]).sum();
                    let target_value = values[row][target];
                    (sum - target_value).abs() <= SUM_TOLERANCE * target_value.abs() + 1e-9
                })
                .count();
            if matches >= required {
                return Some(window.collect());
            }
        }
    }
    None
}

fn total_kind(name: &str) -> TotalKind {
    if vocab::matches_income_keyword(name) {
        TotalKind::Income
    } else if vocab::matches_expense_keyword(name) {
        TotalKind::Expense
    } else {
        TotalKind::Net
    }
}

fn total_parts(totals: &[TotalColumn], kind: TotalKind) -> HashSet<usize> {
    totals
        .iter()
        .filter(|t| t.kind == kind)
        .flat_map(|t| t.parts.iter().copied())
        .collect()
}

/// Expense-or-income decision for one category column, strongest signal
/// first: total membership, name keywords, cell signs (meaningful only when
/// the sheet actually writes negatives), then the contribution heuristics.
fn categorize_column(
    name: &str,
    col: usize,
    values: &[f64],
    expense_parts: &HashSet<usize>,
    income_parts: &HashSet<usize>,
) -> TxnType {
    if expense_parts.contains(&col) {
        return TxnType::Expense;
    }
    if income_parts.contains(&col) {
        return TxnType::Income;
    }
    if vocab::matches_income_keyword(name) {
        return TxnType::Income;
    }
    if vocab::matches_expense_keyword(name) {
        return TxnType::Expense;
    }
    if let Some(kind) = sign_signal(values) {
        return kind;
    }
    let nonzero: Vec<f64> = values.iter().copied().filter(|v| *v != 0.0).collect();
    let avg_abs = if nonzero.is_empty() {
        0.0
    } else {
        nonzero.iter().map(|v| v.abs()).sum::<f64>() / nonzero.len() as f64
    };
    if vocab::looks_like_person_name(name) || avg_abs > 1000.0 {
        TxnType::Income
    } else {
        TxnType::Expense
    }
}

/// Sign of the column total, counted only when the sheet uses negative
/// numbers at all; all-positive pivots say nothing about direction.
fn sign_signal(values: &[f64]) -> Option<TxnType> {
    if !values.iter().any(|v| *v < 0.0) {
        return None;
    }
    let total: f64 = values.iter().sum();
    if total < 0.0 {
        Some(TxnType::Expense)
    } else if total > 0.0 {
        Some(TxnType::Income)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(header: &[&str], rows: &[&[&str]]) -> SheetTable {
        SheetTable::new(
            "Sheet1",
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn cols(categories: &[CategoryColumn]) -> Vec<usize> {
        categories.iter().map(|c| c.col).collect()
    }

    #[test]
    fn test_total_columns_and_their_parts() {
        let table = t(
            &["Year", "Month", "Rent", "Salary", "Expense", "Income"],
            &[
                &["2024", "1", "900", "3000", "900", "3000"],
                &["2024", "2", "910", "3000", "910", "3000"],
                &["2024", "3", "905", "3100", "905", "3100"],
                &["2024", "4", "900", "3000", "900", "3000"],
            ],
        );
        let m = map_summary_columns(&table);
        assert_eq!(m.year_col, Some(0));
        assert_eq!(m.month_col, Some(1));
        assert_eq!(m.date_col, None);

        assert_eq!(m.total_columns.len(), 2);
        let expense_total = m.total_columns.iter().find(|t| t.name == "Expense").unwrap();
        assert_eq!(expense_total.kind, TotalKind::Expense);
        assert_eq!(expense_total.parts, vec![2]);
        let income_total = m.total_columns.iter().find(|t| t.name == "Income").unwrap();
        assert_eq!(income_total.kind, TotalKind::Income);
        assert_eq!(income_total.parts, vec![3]);

        assert_eq!(cols(&m.expense_categories), vec![2]);
        assert_eq!(cols(&m.income_categories), vec![3]);
    }

    #[test]
    fn test_disjointness_of_mapping_sets() {
        let table = t(
            &["Year", "Month", "Rent", "Food", "Fuel", "Total"],
            &[
                &["2024", "1", "900", "400", "80", "1380"],
                &["2024", "2", "900", "420", "90", "1410"],
                &["2024", "3", "900", "390", "85", "1375"],
            ],
        );
        let m = map_summary_columns(&table);
        let mut seen = HashSet::new();
        for col in cols(&m.expense_categories)
            .into_iter()
            .chain(cols(&m.income_categories))
            .chain(m.total_columns.iter().map(|t| t.col))
        {
            assert!(seen.insert(col), "column {col} appears in two sets");
        }
        let total = m.total_columns.iter().find(|t| t.name == "Total").unwrap();
        assert_eq!(total.kind, TotalKind::Net);
        assert_eq!(total.parts, vec![2, 3, 4]);
    }

    #[test]
    fn test_sum_detection_honors_tolerance() {
        // Totals rounded to whole units still match within 1%.
        let table = t(
            &["Month", "A", "B", "Spending"],
            &[
                &["1", "100.40", "200.10", "300"],
                &["2", "150.20", "249.90", "400"],
                &["3", "99.70", "200.20", "300"],
            ],
        );
        let m = map_summary_columns(&table);
        assert_eq!(m.total_columns.len(), 1);
        assert_eq!(m.total_columns[0].parts, vec![1, 2]);
    }

    #[test]
    fn test_category_fallbacks() {
        // Groceries: expense keyword. Alice: person name. ACME payout: large
        // average. Refunds: income keyword. Misc: the final default.
        let table = t(
            &["Month", "Groceries", "Alice", "ACME payout", "Refunds", "Misc"],
            &[
                &["1", "400", "250", "2500", "30", "15"],
                &["2", "380", "250", "2600", "0", "12"],
                &["3", "410", "260", "2400", "25", "18"],
            ],
        );
        let m = map_summary_columns(&table);
        assert_eq!(cols(&m.expense_categories), vec![1, 5]);
        assert_eq!(cols(&m.income_categories), vec![2, 3, 4]);
        assert!(m.total_columns.is_empty());
    }

    #[test]
    fn test_negative_totals_mean_expense() {
        let table = t(
            &["Month", "Mystery"],
            &[&["1", "-40"], &["2", "-35"], &["3", "12"]],
        );
        let m = map_summary_columns(&table);
        assert_eq!(cols(&m.expense_categories), vec![1]);
    }

    #[test]
    fn test_date_column_fallback() {
        let table = t(
            &["Period", "Food", "Rent"],
            &[&["2024/1", "400", "900"], &["2024/2", "380", "900"]],
        );
        let m = map_summary_columns(&table);
        assert_eq!(m.date_col, Some(0));
        assert!(m.has_period());

        let unnamed = t(
            &["", "Food"],
            &[&["January", "400"], &["February", "380"]],
        );
        let m = map_summary_columns(&unnamed);
        assert_eq!(m.date_col, Some(0));
    }

    #[test]
    fn test_empty_table() {
        let m = map_summary_columns(&t(&[], &[]));
        assert!(!m.has_period());
        assert!(m.expense_categories.is_empty());
        assert!(m.total_columns.is_empty());
    }
}
