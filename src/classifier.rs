use crate::amounts;
use crate::dates;
use crate::table::SheetTable;
use crate::vocab;

const SAMPLE_ROWS: usize = 5;
/// A date shape counts as present in the first column once this many values
/// match it.
const PRESENCE_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Transaction,
    Summary,
    Mixed,
}

impl SheetFormat {
    pub fn label(&self) -> &'static str {
        match self {
            SheetFormat::Transaction => "transaction",
            SheetFormat::Summary => "summary",
            SheetFormat::Mixed => "mixed",
        }
    }
}

/// Tally of date shapes over the first column's non-empty values.
#[derive(Debug, Default)]
struct ShapeCensus {
    year_first: usize,
    day_first: usize,
    month_name: usize,
    serial: usize,
}

impl ShapeCensus {
    fn of(values: &[&str]) -> Self {
        let mut census = ShapeCensus::default();
        for v in values {
            if dates::is_year_first(v) {
                census.year_first += 1;
            } else if dates::is_day_first(v) {
                census.day_first += 1;
            } else if dates::is_month_name_token(v) {
                census.month_name += 1;
            } else if dates::is_excel_serial(v) {
                census.serial += 1;
            }
        }
        census
    }
}

fn strict_role_header_count(header: &[String]) -> usize {
    let mut count = 0;
    if header.iter().any(|h| vocab::is_strict_date_header(h)) {
        count += 1;
    }
    if header.iter().any(|h| vocab::is_strict_description_header(h)) {
        count += 1;
    }
    if header.iter().any(|h| vocab::is_strict_amount_header(h)) {
        count += 1;
    }
    if header.iter().any(|h| vocab::is_strict_category_header(h)) {
        count += 1;
    }
    count
}

fn category_header_count(header: &[String]) -> usize {
    header
        .iter()
        .filter(|h| vocab::is_category_keyword_header(h))
        .count()
}

fn numeric_column_count(table: &SheetTable) -> usize {
    (0..table.column_count())
        .filter(|&col| amounts::is_amount_like_column(&table.sample_column(col, SAMPLE_ROWS)))
        .count()
}

fn has_date_like_column(table: &SheetTable) -> bool {
    (0..table.column_count()).any(|col| {
        if vocab::is_date_header(&table.header[col]) {
            return true;
        }
        let sample = table.sample_column(col, SAMPLE_ROWS);
        !sample.is_empty()
            && sample.iter().filter(|v| dates::is_date_like(v)).count() * 2 >= sample.len()
    })
}

fn has_year_month_headers(header: &[String]) -> bool {
    header.iter().any(|h| vocab::is_year_header(h)) && header.iter().any(|h| vocab::is_month_header(h))
}

/// Decides the sheet's layout. First matching rule wins; the order encodes
/// how specific each signal is, from explicit headers down to raw column
/// shape statistics.
pub fn classify(table: &SheetTable) -> SheetFormat {
    if strict_role_header_count(&table.header) >= 3 {
        return SheetFormat::Transaction;
    }

    let census = ShapeCensus::of(&table.column_values(0));
    let year_first = census.year_first >= PRESENCE_THRESHOLD;
    let day_first = census.day_first >= PRESENCE_THRESHOLD;
    let month_names = census.month_name >= PRESENCE_THRESHOLD;
    let serial = census.serial >= PRESENCE_THRESHOLD;

    // Summary-grain and detail-grain dates in one column mean interleaved
    // monthly and daily rows.
    if (year_first || month_names) && (day_first || serial) {
        return SheetFormat::Mixed;
    }
    if year_first || month_names {
        return SheetFormat::Summary;
    }
    if has_year_month_headers(&table.header) {
        return SheetFormat::Summary;
    }
    if (day_first || serial) && category_header_count(&table.header) >= 3 {
        return SheetFormat::Mixed;
    }

    let numeric = numeric_column_count(table);
    let categories = category_header_count(&table.header);
    if numeric >= 5
        || (numeric >= 3 && categories >= 3)
        || (has_date_like_column(table) && numeric >= 3)
    {
        return SheetFormat::Summary;
    }

    SheetFormat::Transaction
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
    fn test_strict_headers_mean_transaction_log() {
        let table = t(
            &["Date", "Description", "Category", "Amount"],
            &[&["2024-01-15", "Coffee", "Food", "-4.50"]],
        );
        assert_eq!(classify(&table), SheetFormat::Transaction);
    }

    #[test]
    fn test_year_first_alone_means_summary() {
        let table = t(
            &["Period", "Groceries", "Rent"],
            &[
                &["2024/1", "400", "900"],
                &["2024/2", "380", "900"],
                &["2024/3", "410", "900"],
            ],
        );
        assert_eq!(classify(&table), SheetFormat::Summary);
    }

    #[test]
    fn test_month_names_alone_mean_summary() {
        let table = t(
            &["", "Food", "Rent"],
            &[
                &["January", "400", "900"],
                &["February", "380", "900"],
                &["March", "410", "900"],
            ],
        );
        assert_eq!(classify(&table), SheetFormat::Summary);
    }

    #[test]
    fn test_interleaved_grains_mean_mixed() {
        let table = t(
            &["When", "Food", "Rent", "Fuel"],
            &[
                &["2024/1", "400", "900", "80"],
                &["03/01/2024", "12", "", ""],
                &["05/01/2024", "30", "", "40"],
                &["2024/2", "380", "900", "75"],
                &["08/02/2024", "25", "", ""],
                &["2024/3", "410", "900", "90"],
                &["11/03/2024", "18", "", ""],
            ],
        );
        assert_eq!(classify(&table), SheetFormat::Mixed);
    }

    #[test]
    fn test_year_month_headers_mean_summary() {
        let table = t(
            &["Year", "Month", "Rent", "Salary"],
            &[&["2024", "1", "900", "3000"], &["2024", "2", "900", "3000"]],
        );
        assert_eq!(classify(&table), SheetFormat::Summary);
    }

    #[test]
    fn test_detail_dates_with_category_headers_mean_mixed() {
        let table = t(
            &["Date", "Groceries", "Fuel", "Entertainment"],
            &[
                &["03/01/2024", "12.50", "", "8"],
                &["04/01/2024", "", "40", ""],
                &["05/01/2024", "23.10", "", ""],
            ],
        );
        assert_eq!(classify(&table), SheetFormat::Mixed);
    }

    #[test]
    fn test_wide_numeric_sheet_means_summary() {
        let table = t(
            &["Label", "A", "B", "C", "D", "E"],
            &[
                &["one", "1", "2", "3", "4", "5"],
                &["two", "1", "2", "3", "4", "5"],
            ],
        );
        assert_eq!(classify(&table), SheetFormat::Summary);
    }

    #[test]
    fn test_default_is_transaction() {
        let table = t(&["A", "B"], &[&["x", "y"]]);
        assert_eq!(classify(&table), SheetFormat::Transaction);
        let empty = t(&[], &[]);
        assert_eq!(classify(&empty), SheetFormat::Transaction);
    }
}
