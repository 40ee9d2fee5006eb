use crate::amounts;
use crate::dates;
use crate::summary::CategoryColumn;
use crate::table::SheetTable;
use crate::vocab;

const SAMPLE_ROWS: usize = 5;
/// Detail rows inspected when deriving the sheet's dominant sign.
const SIGN_SAMPLE_ROWS: usize = 50;

/// Time granularity of one row in a mixed sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Detail,
    Summary,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedSheetType {
    Expense,
    Income,
    Mixed,
}

impl MixedSheetType {
    pub fn label(&self) -> &'static str {
        match self {
            MixedSheetType::Expense => "expense",
            MixedSheetType::Income => "income",
            MixedSheetType::Mixed => "mixed",
        }
    }
}

/// Row-level breakdown of a sheet that interleaves daily detail with
/// monthly rollups. The three row sets partition the sheet exactly.
#[derive(Debug, Clone)]
pub struct MixedAnalysis {
    pub date_col: usize,
    pub category_cols: Vec<CategoryColumn>,
    pub detail_rows: Vec<usize>,
    pub summary_rows: Vec<usize>,
    pub total_rows: Vec<usize>,
    pub sheet_type: MixedSheetType,
}

pub fn analyze_mixed(table: &SheetTable) -> MixedAnalysis {
    let category_cols: Vec<CategoryColumn> = (1..table.column_count())
        .filter(|&col| !vocab::is_aggregate_header(&table.header[col]))
        .filter(|&col| amounts::is_amount_like_column(&table.sample_column(col, SAMPLE_ROWS)))
        .map(|col| CategoryColumn { col, name: table.header[col].trim().to_string() })
        .collect();

    let has_aggregate_header = table.header.iter().any(|h| vocab::is_aggregate_or_type_header(h));

    let mut detail_rows = Vec::new();
    let mut summary_rows = Vec::new();
    let mut total_rows = Vec::new();
    for row in 0..table.row_count() {
        match classify_row(table, row, &category_cols, has_aggregate_header) {
            RowKind::Detail => detail_rows.push(row),
            RowKind::Summary => summary_rows.push(row),
            RowKind::Total => total_rows.push(row),
        }
    }

    let sheet_type = derive_sheet_type(table, &detail_rows, &category_cols);

    MixedAnalysis {
        date_col: 0,
        category_cols,
        detail_rows,
        summary_rows,
        total_rows,
        sheet_type,
    }
}

/// Classifies one row by its date-key token. Unknown shapes land on detail:
/// over-splitting a rollup loses less than dropping a day's spending.
fn classify_row(
    table: &SheetTable,
    row: usize,
    category_cols: &[CategoryColumn],
    has_aggregate_header: bool,
) -> RowKind {
    let token = table.cell(row, 0).trim();
    if token.is_empty() {
        return RowKind::Total;
    }
    if dates::is_year_first(token) {
        return RowKind::Summary;
    }
    if dates::is_day_first(token) {
        return RowKind::Detail;
    }
    if dates::is_month_name_token(token) || dates::bare_month_number(token).is_some() {
        return RowKind::Summary;
    }
    if dates::is_excel_serial(token) {
        // A serial could be either grain. Dense rows on a sheet that also
        // carries aggregate headers read as monthly rollups.
        if has_aggregate_header && serial_row_is_dense(table, row, category_cols) {
            return RowKind::Summary;
        }
        return RowKind::Detail;
    }
    RowKind::Detail
}

fn serial_row_is_dense(table: &SheetTable, row: usize, category_cols: &[CategoryColumn]) -> bool {
    if category_cols.is_empty() {
        return false;
    }
    let populated = category_cols
        .iter()
        .filter(|c| amounts::parse_amount(table.cell(row, c.col)) != 0.0)
        .count();
    let required = 4.max((0.6 * category_cols.len() as f64).ceil() as usize);
    populated >= required
}

/// Dominant sign over populated detail cells. Two-to-one either way tags
/// the sheet; anything closer stays mixed.
fn derive_sheet_type(
    table: &SheetTable,
    detail_rows: &[usize],
    category_cols: &[CategoryColumn],
) -> MixedSheetType {
    let mut negatives = 0usize;
    let mut positives = 0usize;
    for &row in detail_rows.iter().take(SIGN_SAMPLE_ROWS) {
        for c in category_cols {
            let v = amounts::parse_amount(table.cell(row, c.col));
            if v < 0.0 {
                negatives += 1;
            } else if v > 0.0 {
                positives += 1;
            }
        }
    }
    if negatives > positives * 2 {
        MixedSheetType::Expense
    } else if positives > negatives * 2 {
        MixedSheetType::Income
    } else {
        MixedSheetType::Mixed
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

    #[test]
    fn test_rows_partition_exactly() {
        let table = t(
            &["When", "Food", "Rent"],
            &[
                &["2024/1", "400", "900"],
                &["03/01/2024", "12", ""],
                &["05/01/2024", "30", ""],
                &["", "442", "900"],
                &["February", "380", "900"],
                &["??", "5", ""],
            ],
        );
        let a = analyze_mixed(&table);
        assert_eq!(a.summary_rows, vec![0, 4]);
        assert_eq!(a.detail_rows, vec![1, 2, 5]);
        assert_eq!(a.total_rows, vec![3]);

        let mut all: Vec<usize> = a
            .detail_rows
            .iter()
            .chain(&a.summary_rows)
            .chain(&a.total_rows)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..table.row_count()).collect::<Vec<_>>());
    }

    #[test]
    fn test_bare_month_numbers_are_summary_rows() {
        let table = t(
            &["Month", "Food"],
            &[&["1", "400"], &["2", "380"], &["13/01/2024", "12"]],
        );
        let a = analyze_mixed(&table);
        assert_eq!(a.summary_rows, vec![0, 1]);
        assert_eq!(a.detail_rows, vec![2]);
    }

    #[test]
    fn test_serial_rows_need_aggregate_header_to_be_summary() {
        let rows: &[&[&str]] = &[
            &["45292", "10", "20", "30", "40", "50"],
            &["45293", "5", "", "", "", ""],
        ];
        let plain = t(&["Date", "A", "B", "C", "D", "E"], rows);
        let a = analyze_mixed(&plain);
        assert_eq!(a.detail_rows, vec![0, 1]);

        let with_totals = t(&["Date", "A", "B", "C", "D", "Total"], rows);
        let a = analyze_mixed(&with_totals);
        // dense serial row reads as a rollup, sparse one stays detail
        assert_eq!(a.summary_rows, vec![0]);
        assert_eq!(a.detail_rows, vec![1]);
    }

    #[test]
    fn test_sheet_type_from_sign_ratio() {
        let expense = t(
            &["When", "Food"],
            &[
                &["03/01/2024", "-12"],
                &["04/01/2024", "-30"],
                &["05/01/2024", "-7"],
            ],
        );
        assert_eq!(analyze_mixed(&expense).sheet_type, MixedSheetType::Expense);

        let income = t(
            &["When", "Pay"],
            &[&["03/01/2024", "1200"], &["04/01/2024", "800"]],
        );
        assert_eq!(analyze_mixed(&income).sheet_type, MixedSheetType::Income);

        let mixed = t(
            &["When", "Cash"],
            &[&["03/01/2024", "-12"], &["04/01/2024", "15"]],
        );
        assert_eq!(analyze_mixed(&mixed).sheet_type, MixedSheetType::Mixed);
    }

    #[test]
    fn test_aggregate_columns_are_not_categories() {
        let table = t(
            &["When", "Food", "Total", "Notes"],
            &[&["03/01/2024", "12", "12", "card"]],
        );
        let a = analyze_mixed(&table);
        let names: Vec<&str> = a.category_cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food"]);
    }
}
