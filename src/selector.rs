use crate::amounts;
use crate::dates;
use crate::table::SheetTable;
use crate::vocab;

const DENYLIST_PENALTY: i32 = -1000;
const NAME_BONUS: i32 = 50;
const HEADER_SCAN_ROWS: usize = 5;
const GAP_SCAN_ROWS: usize = 10;

/// One sheet's standing in the selection pass. Kept for CLI display, not
/// just the argmax.
#[derive(Debug, Clone)]
pub struct SheetScore {
    pub index: usize,
    pub name: String,
    pub score: i32,
    pub denylisted: bool,
}

/// Points for a candidate header row: one award per distinct role found.
fn header_row_score(cells: &[String]) -> i32 {
    let mut score = 0;
    if cells.iter().any(|c| vocab::is_date_header(c)) {
        score += 25;
    }
    if cells.iter().any(|c| vocab::is_amount_header(c)) {
        score += 25;
    }
    if cells.iter().any(|c| vocab::is_description_header(c)) {
        score += 20;
    }
    if cells.iter().any(|c| vocab::is_category_header(c)) {
        score += 20;
    }
    score
}

/// Looks at the nominal header plus the first few data rows and returns the
/// best-matching row (`None` keeps the nominal header) with its score.
/// Sheets often carry a title or blank padding above the real header.
pub fn find_header_row(table: &SheetTable) -> (Option<usize>, i32) {
    let mut best_row = None;
    let mut best_score = header_row_score(&table.header);
    for (i, row) in table.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let score = header_row_score(row);
        if score > best_score {
            best_row = Some(i);
            best_score = score;
        }
    }
    (best_row, best_score)
}

fn name_score(name: &str) -> (i32, bool) {
    if vocab::is_denylisted_sheet(name) {
        return (DENYLIST_PENALTY, true);
    }
    let trimmed = name.trim();
    if vocab::month_in_text(trimmed).is_some() || trimmed.eq_ignore_ascii_case("transactions") {
        return (NAME_BONUS, false);
    }
    (0, false)
}

pub fn score_sheets(tables: &[SheetTable]) -> Vec<SheetScore> {
    tables
        .iter()
        .enumerate()
        .map(|(index, table)| {
            let (name_pts, denylisted) = name_score(&table.name);
            let (_, header_pts) = find_header_row(table);
            let data_pts = table.row_count().min(20) as i32;
            SheetScore {
                index,
                name: table.name.clone(),
                score: name_pts + header_pts + data_pts,
                denylisted,
            }
        })
        .collect()
}

/// Index of the winning sheet; ties go to the earlier sheet.
pub fn best_sheet(scores: &[SheetScore]) -> usize {
    scores
        .iter()
        .max_by(|a, b| a.score.cmp(&b.score).then(b.index.cmp(&a.index)))
        .map(|s| s.index)
        .unwrap_or(0)
}

/// A nominal header whose cells parse as dates or amounts is the first
/// data line of a headerless export, not a header.
fn header_is_data(header: &[String]) -> bool {
    header
        .iter()
        .any(|c| dates::is_date_like(c) || amounts::is_amount_like(c))
}

/// Applies header promotion and the multi-region split, yielding the
/// working table every downstream component sees.
pub fn normalize_sheet(table: &SheetTable) -> SheetTable {
    let (header_row, header_score) = find_header_row(table);
    let (header, rows): (Vec<String>, Vec<Vec<String>>) = match header_row {
        Some(i) => (table.rows[i].clone(), table.rows[i + 1..].to_vec()),
        None if header_score == 0 && header_is_data(&table.header) => {
            let mut rows = Vec::with_capacity(table.rows.len() + 1);
            rows.push(table.header.clone());
            rows.extend(table.rows.iter().cloned());
            (vec![String::new(); table.header.len()], rows)
        }
        None => (table.header.clone(), table.rows.clone()),
    };
    let working = SheetTable::new(table.name.clone(), header, rows);

    if let Some(gap) = find_region_gap(&working) {
        let header = working.header[..gap].to_vec();
        let rows = working.rows.iter().map(|r| r[..gap].to_vec()).collect();
        return SheetTable::new(working.name, header, rows);
    }
    working
}

/// A fully empty column (header and the first ten data rows) with real
/// content on its right marks a second, unrelated data region packed into
/// the same sheet. Only the first region is kept.
fn find_region_gap(table: &SheetTable) -> Option<usize> {
    let depth = table.row_count().min(GAP_SCAN_ROWS);
    for col in 1..table.column_count() {
        let empty = table.header[col].trim().is_empty()
            && (0..depth).all(|row| table.cell(row, col).trim().is_empty());
        if !empty {
            continue;
        }
        let populated_right = (col + 1..table.column_count()).any(|c| {
            !table.header[c].trim().is_empty()
                || (0..depth).any(|row| !table.cell(row, c).trim().is_empty())
        });
        if populated_right {
            return Some(col);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str, header: &[&str], rows: &[&[&str]]) -> SheetTable {
        SheetTable::new(
            name,
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_denylisted_sheet_loses() {
        let tables = vec![
            t("Instructions", &["Date", "Amount"], &[&["2024-01-01", "5"]]),
            t("March", &["Date", "Amount"], &[&["2024-03-01", "5"]]),
        ];
        let scores = score_sheets(&tables);
        assert!(scores[0].denylisted);
        assert_eq!(best_sheet(&scores), 1);
    }

    #[test]
    fn test_transactions_name_bonus_breaks_even_content() {
        let tables = vec![
            t("Sheet1", &["Date", "Amount"], &[&["2024-01-01", "5"]]),
            t("Transactions", &["Date", "Amount"], &[&["2024-01-01", "5"]]),
        ];
        assert_eq!(best_sheet(&score_sheets(&tables)), 1);
    }

    #[test]
    fn test_tie_prefers_earlier_sheet() {
        let tables = vec![
            t("A", &["Date", "Amount"], &[&["x", "y"]]),
            t("B", &["Date", "Amount"], &[&["x", "y"]]),
        ];
        assert_eq!(best_sheet(&score_sheets(&tables)), 0);
    }

    #[test]
    fn test_header_promotion_drops_title_rows() {
        let table = t(
            "Budget",
            &["Family budget 2024", "", ""],
            &[
                &["", "", ""],
                &["Date", "Description", "Amount"],
                &["2024-01-01", "Coffee", "4.50"],
                &["2024-01-02", "Rent", "900"],
            ],
        );
        let norm = normalize_sheet(&table);
        assert_eq!(norm.header, vec!["Date", "Description", "Amount"]);
        assert_eq!(norm.row_count(), 2);
        assert_eq!(norm.cell(0, 1), "Coffee");
    }

    #[test]
    fn test_headerless_data_line_is_demoted() {
        let table = t(
            "export",
            &["15/01/2024", "Grocery Store", "45.20"],
            &[&["16/01/2024", "Coffee", "4.50"]],
        );
        let norm = normalize_sheet(&table);
        assert!(norm.header.iter().all(|h| h.is_empty()));
        assert_eq!(norm.row_count(), 2);
        assert_eq!(norm.cell(0, 1), "Grocery Store");
    }

    #[test]
    fn test_wordy_headers_survive_even_unrecognized() {
        let table = t(
            "export",
            &["Konto", "Buchungstext", "Betrag"],
            &[&["15/01/2024", "Miete", "900"]],
        );
        let norm = normalize_sheet(&table);
        assert_eq!(norm.header, vec!["Konto", "Buchungstext", "Betrag"]);
        assert_eq!(norm.row_count(), 1);
    }

    #[test]
    fn test_region_gap_keeps_first_block() {
        let table = t(
            "Sheet1",
            &["Date", "Amount", "", "Savings goal"],
            &[
                &["2024-01-01", "5", "", "1000"],
                &["2024-01-02", "7", "", ""],
            ],
        );
        let norm = normalize_sheet(&table);
        assert_eq!(norm.column_count(), 2);
        assert_eq!(norm.header, vec!["Date", "Amount"]);
        assert_eq!(norm.cell(1, 1), "7");
    }

    #[test]
    fn test_trailing_empty_columns_are_not_a_gap() {
        let table = t(
            "Sheet1",
            &["Date", "Amount", "", ""],
            &[&["2024-01-01", "5", "", ""]],
        );
        let norm = normalize_sheet(&table);
        assert_eq!(norm.column_count(), 4);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(best_sheet(&score_sheets(&[])), 0);
        let empty = t("Empty", &[], &[]);
        let norm = normalize_sheet(&empty);
        assert_eq!(norm.row_count(), 0);
    }
}
