use crate::amounts;
use crate::classifier::{self, SheetFormat};
use crate::columns::{self, TxnMapping};
use crate::confidence::{self, Confidence, ExtractStats, LayoutShape};
use crate::dates::{self, NormalizedDate};
use crate::error::{Result, TallyError};
use crate::mixed::{self, MixedAnalysis, MixedSheetType};
use crate::models::{ParseHints, Transaction, TxnType};
use crate::resolver::{self, SignConvention};
use crate::selector::{self, SheetScore};
use crate::summary::{self, SummaryMapping};
use crate::table::SheetTable;
use crate::vocab;

/// Column semantics resolved for one sheet, by layout family.
#[derive(Debug, Clone)]
pub enum LayoutMapping {
    Transaction(TxnMapping),
    Summary(SummaryMapping),
    Mixed(MixedAnalysis),
}

/// A parsed workbook: every sheet normalized and scored, plus the resolved
/// layout of the sheet that scored best.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub tables: Vec<SheetTable>,
    pub scores: Vec<SheetScore>,
    pub selected: usize,
    pub format: SheetFormat,
    pub mapping: LayoutMapping,
}

/// Scores and normalizes every sheet, picks the most promising one and
/// works out its layout. The only hard failure is a workbook with no
/// sheets at all; everything downstream degrades to lower confidence
/// instead of erroring.
pub fn parse(tables: Vec<SheetTable>) -> Result<ParsedFile> {
    if tables.is_empty() {
        return Err(TallyError::NoSheets);
    }
    let scores = selector::score_sheets(&tables);
    let tables: Vec<SheetTable> = tables.iter().map(selector::normalize_sheet).collect();
    let selected = selector::best_sheet(&scores);
    let format = classifier::classify(&tables[selected]);
    let mapping = mapping_for(&tables[selected], format);
    Ok(ParsedFile { tables, scores, selected, format, mapping })
}

pub fn mapping_for(table: &SheetTable, format: SheetFormat) -> LayoutMapping {
    match format {
        SheetFormat::Transaction => {
            LayoutMapping::Transaction(columns::map_transaction_columns(table))
        }
        SheetFormat::Summary => LayoutMapping::Summary(summary::map_summary_columns(table)),
        SheetFormat::Mixed => LayoutMapping::Mixed(mixed::analyze_mixed(table)),
    }
}

/// Pulls transactions out of the named sheets, or out of the auto-selected
/// sheet when no names are given. Each sheet is classified on its own, so
/// a workbook can mix transaction logs with summary tabs.
pub fn extract(
    parsed: &ParsedFile,
    selected_sheets: &[String],
    hints: &ParseHints,
) -> Result<Vec<Transaction>> {
    extract_with_confidence(parsed, selected_sheets, hints).map(|(txns, _)| txns)
}

pub fn extract_with_confidence(
    parsed: &ParsedFile,
    selected_sheets: &[String],
    hints: &ParseHints,
) -> Result<(Vec<Transaction>, Confidence)> {
    let indices = resolve_selection(parsed, selected_sheets)?;
    let mut all = Vec::new();
    let mut gradings = Vec::new();
    for idx in indices {
        let table = &parsed.tables[idx];
        let format = classifier::classify(table);
        let mapping = mapping_for(table, format);
        let (txns, shape, stats) = emit_sheet(table, &mapping, hints);
        all.extend(txns);
        gradings.push(confidence::score(&shape, &stats));
    }
    Ok((all, confidence::combine(gradings)))
}

fn resolve_selection(parsed: &ParsedFile, selected_sheets: &[String]) -> Result<Vec<usize>> {
    if selected_sheets.is_empty() {
        return Ok(vec![parsed.selected]);
    }
    selected_sheets
        .iter()
        .map(|name| {
            parsed
                .tables
                .iter()
                .position(|t| t.name.trim().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| TallyError::UnknownSheet(name.clone()))
        })
        .collect()
}

fn emit_sheet(
    table: &SheetTable,
    mapping: &LayoutMapping,
    hints: &ParseHints,
) -> (Vec<Transaction>, LayoutShape, ExtractStats) {
    match mapping {
        LayoutMapping::Transaction(m) => emit_transaction_log(table, m, hints),
        LayoutMapping::Summary(m) => emit_summary(table, m, hints),
        LayoutMapping::Mixed(a) => emit_mixed(table, a, hints),
    }
}

fn defaulted_today() -> NormalizedDate {
    NormalizedDate { date: dates::today(), ambiguous: false, defaulted: true }
}

fn note_date(stats: &mut ExtractStats, nd: &NormalizedDate) {
    if nd.defaulted {
        stats.defaulted_dates += 1;
    } else {
        stats.dated += 1;
        if nd.ambiguous {
            stats.ambiguous_dates += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction logs: one row, one transaction.
// ---------------------------------------------------------------------------

fn emit_transaction_log(
    table: &SheetTable,
    m: &TxnMapping,
    hints: &ParseHints,
) -> (Vec<Transaction>, LayoutShape, ExtractStats) {
    let shape = LayoutShape {
        format: SheetFormat::Transaction,
        has_date_col: m.date_col.is_some(),
        has_amount_col: m.amount_col.is_some(),
        has_text_col: m.description_col.is_some() || m.category_col.is_some(),
        emittable: m.amount_col.is_some(),
    };
    let mut stats = ExtractStats::default();
    let mut txns = Vec::new();
    let amount_col = match m.amount_col {
        Some(col) => col,
        None => return (txns, shape, stats),
    };
    let override_type = hints.sheet_type.or_else(|| resolver::paired_header_override(table));

    for row in 0..table.row_count() {
        let raw_amount = table.cell(row, amount_col).trim();
        let amount = match amounts::try_parse_amount(raw_amount) {
            Some(v) => v,
            None => {
                if !raw_amount.is_empty() {
                    stats.zero_skipped += 1;
                }
                continue;
            }
        };
        if amount == 0.0 {
            continue;
        }

        let nd = match m.date_col {
            Some(col) => dates::normalize_date(table.cell(row, col), hints),
            None => defaulted_today(),
        };
        let description = m
            .description_col
            .map(|col| table.cell(row, col).trim().to_string())
            .unwrap_or_default();
        let category = m
            .category_col
            .map(|col| table.cell(row, col).trim().to_string())
            .unwrap_or_default();

        let txn_type = resolver::resolve_type(
            override_type,
            &category,
            &description,
            amount,
            SignConvention::ExpenseBias,
        );
        if amount < 0.0 && txn_type == TxnType::Income {
            stats.sign_mismatches += 1;
        }
        note_date(&mut stats, &nd);
        txns.push(Transaction::new(nd.iso(), description, category, amount, txn_type));
        stats.emitted += 1;
    }
    (txns, shape, stats)
}

// ---------------------------------------------------------------------------
// Summary grids: one row per period, one transaction per populated
// category cell. Total columns never emit; their parts already did.
// ---------------------------------------------------------------------------

fn emit_summary(
    table: &SheetTable,
    m: &SummaryMapping,
    hints: &ParseHints,
) -> (Vec<Transaction>, LayoutShape, ExtractStats) {
    let emittable = !m.expense_categories.is_empty() || !m.income_categories.is_empty();
    let shape = LayoutShape {
        format: SheetFormat::Summary,
        has_date_col: m.has_period(),
        has_amount_col: emittable,
        has_text_col: true,
        emittable,
    };
    let mut stats = ExtractStats::default();
    let mut txns = Vec::new();
    let override_type = hints.sheet_type.or_else(|| resolver::paired_header_override(table));

    for row in 0..table.row_count() {
        if period_is_aggregate(table, row, m) {
            continue;
        }
        let nd = period_for_row(table, row, m, hints);
        for (cats, default_type) in [
            (&m.expense_categories, TxnType::Expense),
            (&m.income_categories, TxnType::Income),
        ] {
            for cat in cats.iter() {
                let raw = table.cell(row, cat.col).trim();
                let amount = match amounts::try_parse_amount(raw) {
                    Some(v) => v,
                    None => {
                        if !raw.is_empty() {
                            stats.zero_skipped += 1;
                        }
                        continue;
                    }
                };
                if amount == 0.0 {
                    continue;
                }
                let txn_type = override_type.unwrap_or(default_type);
                if amount < 0.0 && txn_type == TxnType::Income {
                    stats.sign_mismatches += 1;
                }
                note_date(&mut stats, &nd);
                txns.push(Transaction::new(
                    nd.iso(),
                    cat.name.clone(),
                    cat.name.clone(),
                    amount,
                    txn_type,
                ));
                stats.emitted += 1;
            }
        }
    }
    (txns, shape, stats)
}

/// Grand-total rows label their period cell "Total" or similar; emitting
/// them would double every category.
fn period_is_aggregate(table: &SheetTable, row: usize, m: &SummaryMapping) -> bool {
    [m.year_col, m.month_col, m.date_col]
        .iter()
        .flatten()
        .any(|&col| vocab::is_aggregate_header(table.cell(row, col)))
}

fn period_for_row(
    table: &SheetTable,
    row: usize,
    m: &SummaryMapping,
    hints: &ParseHints,
) -> NormalizedDate {
    if let (Some(yc), Some(mc)) = (m.year_col, m.month_col) {
        let year = year_from_cell(table.cell(row, yc)).or(hints.default_year);
        let month = month_from_cell(table.cell(row, mc));
        if let (Some(year), Some(month)) = (year, month) {
            if let Some(date) = chrono::NaiveDate::from_ymd_opt(year, month, 1) {
                return NormalizedDate { date, ambiguous: false, defaulted: false };
            }
        }
        return defaulted_today();
    }
    if let Some(dc) = m.date_col {
        return dates::normalize_date(table.cell(row, dc), hints);
    }
    defaulted_today()
}

fn year_from_cell(raw: &str) -> Option<i32> {
    let y: i32 = raw.trim().parse().ok()?;
    if (1900..=2100).contains(&y) {
        Some(y)
    } else if (0..=99).contains(&y) {
        Some(2000 + y)
    } else {
        None
    }
}

fn month_from_cell(raw: &str) -> Option<u32> {
    dates::bare_month_number(raw).or_else(|| vocab::month_from_token(raw))
}

// ---------------------------------------------------------------------------
// Mixed sheets: detail rows win; summary rows only stand in when the sheet
// has no detail at all. Total rows never emit.
// ---------------------------------------------------------------------------

fn emit_mixed(
    table: &SheetTable,
    a: &MixedAnalysis,
    hints: &ParseHints,
) -> (Vec<Transaction>, LayoutShape, ExtractStats) {
    let shape = LayoutShape {
        format: SheetFormat::Mixed,
        has_date_col: true,
        has_amount_col: !a.category_cols.is_empty(),
        has_text_col: true,
        emittable: !a.category_cols.is_empty(),
    };
    let mut stats = ExtractStats::default();
    let mut txns = Vec::new();

    let sheet_bias = match a.sheet_type {
        MixedSheetType::Expense => Some(TxnType::Expense),
        MixedSheetType::Income => Some(TxnType::Income),
        MixedSheetType::Mixed => None,
    };
    let override_type = hints
        .sheet_type
        .or_else(|| resolver::paired_header_override(table))
        .or(sheet_bias);

    let rows = if a.detail_rows.is_empty() { &a.summary_rows } else { &a.detail_rows };
    for &row in rows {
        let nd = dates::normalize_date(table.cell(row, a.date_col), hints);
        for cat in &a.category_cols {
            let raw = table.cell(row, cat.col).trim();
            let amount = match amounts::try_parse_amount(raw) {
                Some(v) => v,
                None => {
                    if !raw.is_empty() {
                        stats.zero_skipped += 1;
                    }
                    continue;
                }
            };
            if amount == 0.0 {
                continue;
            }
            let txn_type = resolver::resolve_type(
                override_type,
                &cat.name,
                &cat.name,
                amount,
                SignConvention::NaiveSign,
            );
            if (amount < 0.0 && txn_type == TxnType::Income)
                || (amount > 0.0 && txn_type == TxnType::Expense && override_type.is_none())
            {
                stats.sign_mismatches += 1;
            }
            note_date(&mut stats, &nd);
            txns.push(Transaction::new(
                nd.iso(),
                cat.name.clone(),
                cat.name.clone(),
                amount,
                txn_type,
            ));
            stats.emitted += 1;
        }
    }
    (txns, shape, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::ConfidenceLevel;

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
    fn test_parse_requires_at_least_one_sheet() {
        match parse(Vec::new()) {
            Err(TallyError::NoSheets) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_transaction_log_end_to_end() {
        let table = t(
            "Transactions",
            &["Date", "Description", "Category", "Amount"],
            &[
                &["2024-01-15", "Grocery Store", "", "45.20"],
                &["2024-01-16", "Monthly Salary", "", "2,500.00"],
                &["2024-01-17", "Coffee", "", "(4.50)"],
                &["2024-01-18", "pending", "", ""],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        assert_eq!(parsed.format, SheetFormat::Transaction);

        let hints = ParseHints::default();
        let txns = extract(&parsed, &[], &hints).unwrap();
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].date, "2024-01-15");
        assert_eq!(txns[0].txn_type, TxnType::Expense);
        assert_eq!(txns[0].signed_amount, -45.2);

        assert_eq!(txns[1].txn_type, TxnType::Income);
        assert_eq!(txns[1].amount, 2500.0);
        assert_eq!(txns[1].signed_amount, 2500.0);

        assert_eq!(txns[2].txn_type, TxnType::Expense);
        assert_eq!(txns[2].signed_amount, -4.5);

        for txn in &txns {
            assert_eq!(txn.amount, txn.signed_amount.abs());
        }
    }

    #[test]
    fn test_repeated_extraction_yields_identical_rows() {
        let table = t(
            "Transactions",
            &["Date", "Description", "Category", "Amount"],
            &[
                &["2024-01-15", "Grocery Store", "Food", "45.20"],
                &["2024-01-16", "Monthly Salary", "Income", "2,500.00"],
                &["2024-01-17", "Coffee", "", "(4.50)"],
            ],
        );
        let hints = ParseHints::default();

        let parsed = parse(vec![table.clone()]).unwrap();
        let (first, first_conf) = extract_with_confidence(&parsed, &[], &hints).unwrap();
        let parsed = parse(vec![table]).unwrap();
        let (second, second_conf) = extract_with_confidence(&parsed, &[], &hints).unwrap();

        // ids are minted fresh on every run; every other field must match
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.date, b.date);
            assert_eq!(a.description, b.description);
            assert_eq!(a.category, b.category);
            assert_eq!(a.amount, b.amount);
            assert_eq!(a.signed_amount, b.signed_amount);
            assert_eq!(a.txn_type, b.txn_type);
        }
        assert_eq!(first_conf.score, second_conf.score);
        assert_eq!(first_conf.level, second_conf.level);
    }

    #[test]
    fn test_summary_sheet_end_to_end() {
        let table = t(
            "2024 Overview",
            &["Year", "Month", "Rent", "Salary", "Expense", "Income"],
            &[
                &["2024", "January", "900", "3000", "900", "3000"],
                &["2024", "February", "910", "3000", "910", "3000"],
                &["2024", "March", "905", "3100", "905", "3100"],
                &["", "Total", "2715", "9100", "2715", "9100"],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        assert_eq!(parsed.format, SheetFormat::Summary);

        let txns = extract(&parsed, &[], &ParseHints::default()).unwrap();
        // three months, one rent and one salary each; total columns and the
        // grand-total row stay out
        assert_eq!(txns.len(), 6);
        assert!(txns.iter().all(|t| t.category == "Rent" || t.category == "Salary"));

        let rent: Vec<_> = txns.iter().filter(|t| t.category == "Rent").collect();
        assert_eq!(rent.len(), 3);
        assert_eq!(rent[0].date, "2024-01-01");
        assert_eq!(rent[1].date, "2024-02-01");
        assert!(rent.iter().all(|t| t.txn_type == TxnType::Expense && t.signed_amount < 0.0));

        let salary: Vec<_> = txns.iter().filter(|t| t.category == "Salary").collect();
        assert!(salary.iter().all(|t| t.txn_type == TxnType::Income && t.signed_amount > 0.0));
    }

    #[test]
    fn test_mixed_sheet_prefers_detail_rows() {
        let table = t(
            "Spending",
            &["Date", "Food", "Rent"],
            &[
                &["2024/1", "442", "900"],
                &["03/01/2024", "12", ""],
                &["04/01/2024", "30", ""],
                &["2024/2", "380", "900"],
                &["05/02/2024", "25", ""],
                &["2024/3", "410", "900"],
                &["", "1232", "2700"],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        assert_eq!(parsed.format, SheetFormat::Mixed);

        let hints = ParseHints { sheet_type: Some(TxnType::Expense), ..Default::default() };
        let txns = extract(&parsed, &[], &hints).unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].date, "2024-01-03");
        assert_eq!(txns[1].date, "2024-01-04");
        assert_eq!(txns[2].date, "2024-02-05");
        assert!(txns.iter().all(|t| t.category == "Food"));
        assert!(txns.iter().all(|t| t.txn_type == TxnType::Expense && t.signed_amount < 0.0));
    }

    #[test]
    fn test_mixed_sheet_falls_back_to_summary_rows() {
        let table = t(
            "Spending",
            &["Date", "Food"],
            &[
                &["2024/1", "442"],
                &["2024/2", "380"],
                &["2024/3", "410"],
                &["", "1232"],
            ],
        );
        let analysis = mixed::analyze_mixed(&table);
        let (txns, _, _) = emit_mixed(&table, &analysis, &ParseHints::default());
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].date, "2024-01-01");
    }

    #[test]
    fn test_extract_by_sheet_name() {
        let notes = t("Notes", &["Text"], &[&["remember the milk"]]);
        let log = t(
            "March",
            &["Date", "Description", "Amount"],
            &[&["2024-03-02", "Bus ticket", "3.50"]],
        );
        let parsed = parse(vec![notes, log]).unwrap();
        assert_eq!(parsed.selected, 1);

        let txns = extract(&parsed, &["march".to_string()], &ParseHints::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Bus ticket");

        match extract(&parsed, &["April".to_string()], &ParseHints::default()) {
            Err(TallyError::UnknownSheet(name)) => assert_eq!(name, "April"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_zero_amounts_are_never_emitted() {
        let table = t(
            "Transactions",
            &["Date", "Description", "Amount"],
            &[
                &["2024-01-15", "freebie", "0"],
                &["2024-01-16", "n/a", "pending"],
                &["2024-01-17", "lunch", "9.80"],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        let txns = extract(&parsed, &[], &ParseHints::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert!(txns.iter().all(|t| t.amount != 0.0));
    }

    #[test]
    fn test_confidence_reported_alongside_transactions() {
        let table = t(
            "Transactions",
            &["Date", "Description", "Category", "Amount"],
            &[
                &["2024-01-15", "Groceries", "food", "45.20"],
                &["2024-01-16", "Rent", "housing", "900.00"],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        let (txns, conf) =
            extract_with_confidence(&parsed, &[], &ParseHints::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(conf.score, 100);
        assert_eq!(conf.level, ConfidenceLevel::High);
        assert!(conf.issues.is_empty());
    }

    #[test]
    fn test_headerless_csv_still_extracts() {
        let table = t(
            "export",
            &["15/01/2024", "Grocery Store", "45.20"],
            &[
                &["16/01/2024", "Coffee", "4.50"],
                &["17/01/2024", "Book shop", "12.00"],
            ],
        );
        let parsed = parse(vec![table]).unwrap();
        assert_eq!(parsed.format, SheetFormat::Transaction);
        let txns = extract(&parsed, &[], &ParseHints::default()).unwrap();
        // the first line is data here and must not be swallowed
        assert_eq!(txns.len(), 3);
        assert!(txns.iter().any(|t| t.description == "Grocery Store"));
        assert_eq!(txns[0].date, "2024-01-15");
    }
}
