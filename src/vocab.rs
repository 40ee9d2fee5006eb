use regex::Regex;

// ---------------------------------------------------------------------------
// Static vocabularies. These are configuration, not state: const tables read
// by the matchers below and never mutated at runtime.
// ---------------------------------------------------------------------------

/// Headers longer than this never match a role vocabulary; keeps sentence
/// cells in messy sheets from being mistaken for headers.
pub const MAX_HEADER_LEN: usize = 40;

/// Sheet names that mark decorative/non-data sheets.
pub const SHEET_NAME_DENYLIST: &[&str] = &[
    "instruction",
    "summary",
    "dashboard",
    "readme",
    "read me",
    "template",
    "net worth",
    "networth",
    "net-worth",
    "overview",
    "chart",
    "pivot",
    "settings",
    "config",
    "lookup",
    "notes",
    "categories",
    "help",
    "about",
    "index",
];

/// Month-name table used for date parsing, sheet-name hints and the
/// classifier's month-token check. Abbreviations listed after full names so
/// full names win where both would match.
pub const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sept", 9),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Strict single-word header sets. The format classifier's first rule only
/// accepts exact (lowercased, trimmed) matches against these.
pub const STRICT_DATE_HEADERS: &[&str] = &["date", "day", "datum", "fecha"];
pub const STRICT_DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "desc",
    "memo",
    "payee",
    "merchant",
    "details",
    "narration",
    "item",
    "vendor",
];
pub const STRICT_AMOUNT_HEADERS: &[&str] = &[
    "amount", "amt", "total", "sum", "value", "debit", "credit", "price", "cost", "importe",
    "betrag",
];
pub const STRICT_CATEGORY_HEADERS: &[&str] = &[
    "category",
    "cat",
    "type",
    "group",
    "tag",
    "categoria",
    "kategorie",
];

/// Common budget-category words. A header containing one of these counts as
/// a "category-keyword header" for format classification.
pub const CATEGORY_KEYWORDS: &[&str] = &[
    "grocer",
    "food",
    "dining",
    "restaurant",
    "coffee",
    "rent",
    "mortgage",
    "utilities",
    "electric",
    "water",
    "fuel",
    "petrol",
    "transport",
    "travel",
    "entertainment",
    "shopping",
    "clothing",
    "insurance",
    "medical",
    "health",
    "phone",
    "internet",
    "subscription",
    "salary",
    "income",
    "savings",
    "education",
    "childcare",
    "gym",
    "gifts",
    "holiday",
    "household",
    "personal",
    "bills",
    "misc",
];

/// Keyword vocabularies for income/expense type resolution. Substring match
/// against lowercased category or description text.
pub const EXPENSE_KEYWORDS: &[&str] = &[
    "rent",
    "mortgage",
    "grocer",
    "food",
    "dining",
    "restaurant",
    "coffee",
    "utilities",
    "electric",
    "water",
    "fuel",
    "petrol",
    "transport",
    "taxi",
    "uber",
    "car",
    "insurance",
    "medical",
    "health",
    "pharmacy",
    "shopping",
    "clothing",
    "clothes",
    "entertainment",
    "movie",
    "subscription",
    "phone",
    "internet",
    "hotel",
    "flight",
    "tax",
    "fee",
    "bill",
    "expense",
    "spending",
    "cost",
    "purchase",
];
pub const INCOME_KEYWORDS: &[&str] = &[
    "salary",
    "salarie",
    "wage",
    "payroll",
    "income",
    "bonus",
    "dividend",
    "interest",
    "refund",
    "reimburse",
    "rebate",
    "deposit",
    "revenue",
    "freelance",
    "invoice",
    "pension",
    "benefit",
    "grant",
    "earnings",
];

/// Headers that mark aggregate (total-like) columns rather than categories.
pub const AGGREGATE_KEYWORDS: &[&str] = &[
    "total",
    "sum",
    "subtotal",
    "grand",
    "net",
    "balance",
    "cumulative",
    "running",
    "overall",
    "average",
];

// ---------------------------------------------------------------------------
// Header-role vocabularies (regex, anchored, case-insensitive). Compiled at
// the call site; the patterns are literals so compilation cannot fail on
// user input.
// ---------------------------------------------------------------------------

const DATE_HEADER_RE: &str = r"(?i)^(date|transaction date|trans\.? date|txn date|post(ed|ing)? date|posted|value date|when|datum|fecha)$";
const DESCRIPTION_HEADER_RE: &str = r"(?i)^(description|desc|memo|payee|merchant|narrative|narration|details?|item|name|vendor|transaction|concepto|beschreibung)$";
const AMOUNT_HEADER_RE: &str = r"(?i)^(amount|amt|total|sum|value|debit|credit|price|cost|charge|importe|betrag|montant)$";
const CATEGORY_HEADER_RE: &str = r"(?i)^(category|cat|type|group|bucket|tag|label|categor[ií]a|kategorie)$";

fn matches_pattern(cell: &str, pattern: &str) -> bool {
    let cell = cell.trim();
    if cell.is_empty() || cell.len() > MAX_HEADER_LEN {
        return false;
    }
    Regex::new(pattern)
        .map(|re| re.is_match(cell))
        .unwrap_or(false)
}

pub fn is_date_header(cell: &str) -> bool {
    matches_pattern(cell, DATE_HEADER_RE)
}

pub fn is_description_header(cell: &str) -> bool {
    matches_pattern(cell, DESCRIPTION_HEADER_RE)
}

pub fn is_amount_header(cell: &str) -> bool {
    matches_pattern(cell, AMOUNT_HEADER_RE)
}

pub fn is_category_header(cell: &str) -> bool {
    matches_pattern(cell, CATEGORY_HEADER_RE)
}

// ---------------------------------------------------------------------------
// Keyword matchers
// ---------------------------------------------------------------------------

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

fn equals_any(text: &str, words: &[&str]) -> bool {
    let lower = text.trim().to_lowercase();
    words.iter().any(|w| lower == *w)
}

pub fn is_strict_date_header(cell: &str) -> bool {
    equals_any(cell, STRICT_DATE_HEADERS)
}

pub fn is_strict_description_header(cell: &str) -> bool {
    equals_any(cell, STRICT_DESCRIPTION_HEADERS)
}

pub fn is_strict_amount_header(cell: &str) -> bool {
    equals_any(cell, STRICT_AMOUNT_HEADERS)
}

pub fn is_strict_category_header(cell: &str) -> bool {
    equals_any(cell, STRICT_CATEGORY_HEADERS)
}

pub fn is_category_keyword_header(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty() && cell.len() <= MAX_HEADER_LEN && contains_any(cell, CATEGORY_KEYWORDS)
}

pub fn matches_expense_keyword(text: &str) -> bool {
    contains_any(text, EXPENSE_KEYWORDS)
}

pub fn matches_income_keyword(text: &str) -> bool {
    contains_any(text, INCOME_KEYWORDS)
}

pub fn is_aggregate_header(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty() && cell.len() <= MAX_HEADER_LEN && contains_any(cell, AGGREGATE_KEYWORDS)
}

/// Aggregate in the wider sense used by sum-column detection: a header that
/// names either a total or an income/expense rollup ("Expenses", "Income").
pub fn is_aggregate_or_type_header(cell: &str) -> bool {
    is_aggregate_header(cell)
        || equals_any(
            cell,
            &["expense", "expenses", "income", "spending", "outgoings", "earnings", "incomings"],
        )
}

pub fn is_year_header(cell: &str) -> bool {
    equals_any(cell, &["year", "yr", "ano", "jahr"])
}

pub fn is_month_header(cell: &str) -> bool {
    equals_any(cell, &["month", "mon", "mes", "monat"])
}

pub fn is_period_header(cell: &str) -> bool {
    equals_any(cell, &["date", "period", "when"])
}

/// Exact month-name (or abbreviation) lookup for a single token.
pub fn month_from_token(token: &str) -> Option<u32> {
    let lower = token.trim().trim_end_matches(['.', ',']).to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, n)| *n)
}

/// Scans free text (a sheet/tab name, a cell like "Jan 2024") for a month
/// word. First hit wins.
pub fn month_in_text(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .find_map(month_from_token)
}

pub fn is_denylisted_sheet(name: &str) -> bool {
    contains_any(name, SHEET_NAME_DENYLIST)
}

/// Heuristic for shared-budget sheets where each participant has a column
/// of contributions: one or two capitalized alphabetic words that match no
/// other vocabulary.
pub fn looks_like_person_name(header: &str) -> bool {
    let header = header.trim();
    if header.is_empty() || header.len() > MAX_HEADER_LEN {
        return false;
    }
    let words: Vec<&str> = header.split_whitespace().collect();
    if words.is_empty() || words.len() > 2 {
        return false;
    }
    let capitalized = words.iter().all(|w| {
        w.len() >= 2
            && w.len() <= 12
            && w.chars().all(|c| c.is_alphabetic())
            && w.chars().next().is_some_and(|c| c.is_uppercase())
            && w.chars().skip(1).all(|c| c.is_lowercase())
    });
    capitalized
        && !contains_any(header, CATEGORY_KEYWORDS)
        && !contains_any(header, EXPENSE_KEYWORDS)
        && !contains_any(header, INCOME_KEYWORDS)
        && !contains_any(header, AGGREGATE_KEYWORDS)
        && month_in_text(header).is_none()
}
