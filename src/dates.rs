use chrono::{Duration, Local, NaiveDate};

use crate::models::ParseHints;
use crate::vocab;

/// Outcome of normalizing one raw date token. The flags feed the confidence
/// scorer; they are not errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    /// Day and month were both <= 12, so their order had to be guessed.
    pub ambiguous: bool,
    /// Input was unparseable and fell back to the current date.
    pub defaulted: bool,
}

impl NormalizedDate {
    fn clean(date: NaiveDate) -> Self {
        NormalizedDate { date, ambiguous: false, defaulted: false }
    }

    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Shape predicates. Cheap char-level parsers shared by the classifier, the
// mappers and the normalizer itself.
// ---------------------------------------------------------------------------

/// Excel stores dates as day counts. Only values in a plausible date window
/// are treated as serials so ordinary amounts do not turn into dates.
pub const SERIAL_MIN: f64 = 30_000.0;
pub const SERIAL_MAX: f64 = 100_000.0;

pub fn excel_serial_to_date(serial: f64) -> NaiveDate {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base + Duration::days(serial as i64)
}

pub fn is_excel_serial(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.contains(['/', '-', ':']) {
        return false;
    }
    match s.parse::<f64>() {
        Ok(v) => (SERIAL_MIN..=SERIAL_MAX).contains(&v),
        Err(_) => false,
    }
}

fn split_date_parts(s: &str) -> Option<Vec<u32>> {
    let parts: Vec<&str> = s.split(['-', '/']).map(str::trim).collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    parts.iter().map(|p| p.parse::<u32>().ok()).collect()
}

/// `YYYY/M` or `YYYY/M/D` (also `-` separated). Day defaults to 1.
pub fn parse_year_first(s: &str) -> Option<(i32, u32, u32)> {
    let parts = split_date_parts(s.trim())?;
    let year = parts[0];
    if !(1900..=2100).contains(&year) {
        return None;
    }
    let month = parts[1];
    if !(1..=12).contains(&month) {
        return None;
    }
    let day = *parts.get(2).unwrap_or(&1);
    if !(1..=31).contains(&day) {
        return None;
    }
    Some((year as i32, month, day))
}

pub fn is_year_first(s: &str) -> bool {
    parse_year_first(s).is_some()
}

/// `D/M/YYYY`-shaped (also `-` separated; may really be M/D/YYYY — the
/// normalizer decides the order). Returns the two leading components and
/// the year without interpreting them.
pub fn parse_day_first(s: &str) -> Option<(u32, u32, i32)> {
    let s = s.trim();
    let parts = split_date_parts(s)?;
    if parts.len() != 3 {
        return None;
    }
    let (a, b, year) = (parts[0], parts[1], parts[2]);
    if !(1900..=2100).contains(&year) {
        return None;
    }
    if !(1..=31).contains(&a) || !(1..=31).contains(&b) {
        return None;
    }
    if a > 12 && b > 12 {
        return None;
    }
    Some((a, b, year as i32))
}

pub fn is_day_first(s: &str) -> bool {
    parse_day_first(s).is_some()
}

/// A cell that is a month word, optionally with a year ("January",
/// "Jan-24", "March 2024"). Never matches full dates.
pub fn is_month_name_token(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.len() > 20 || is_year_first(s) || is_day_first(s) {
        return false;
    }
    if s.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).count() > 2 {
        return false;
    }
    vocab::month_in_text(s).is_some()
}

pub fn bare_month_number(s: &str) -> Option<u32> {
    let n = s.trim().parse::<u32>().ok()?;
    (1..=12).contains(&n).then_some(n)
}

/// Any shape the normalizer can turn into a calendar date without guessing
/// wildly. Used for column-role sampling and classifier rule checks.
pub fn is_date_like(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    is_excel_serial(s) || is_year_first(s) || is_day_first(s) || is_month_name_token(s)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Formats tried as a last resort, in order. Mirrors the shapes seen in
/// real exports that the structured parsers above do not cover.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
];

/// Turns one raw cell into a calendar date. Never fails: unparseable input
/// becomes the current date with `defaulted` set.
pub fn normalize_date(raw: &str, hints: &ParseHints) -> NormalizedDate {
    let s = raw.trim();
    if s.is_empty() {
        return NormalizedDate { date: today(), ambiguous: false, defaulted: true };
    }

    if is_excel_serial(s) {
        if let Ok(serial) = s.parse::<f64>() {
            return NormalizedDate::clean(excel_serial_to_date(serial));
        }
    }

    if let Some((y, m, d)) = parse_year_first(s) {
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return NormalizedDate::clean(date);
        }
    }

    if let Some((a, b, year)) = parse_day_first(s) {
        if let Some(nd) = resolve_day_month(a, b, year, hints) {
            return nd;
        }
    }

    if let Some(nd) = parse_month_token(s, hints) {
        return nd;
    }

    for fmt in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return NormalizedDate::clean(date);
        }
    }

    NormalizedDate { date: today(), ambiguous: false, defaulted: true }
}

/// Puts the two sub-year components of `a/b/YYYY` in order. A component
/// over 12 must be the day; otherwise the caller's month hint decides, and
/// day-first is the default.
fn resolve_day_month(a: u32, b: u32, year: i32, hints: &ParseHints) -> Option<NormalizedDate> {
    let (day, month, ambiguous) = if a > 12 {
        (a, b, false)
    } else if b > 12 {
        (b, a, false)
    } else {
        match hints.month_hint {
            Some(m) if b == m && a != m => (a, b, true),
            Some(m) if a == m && b != m => (b, a, true),
            _ => (a, b, true),
        }
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(NormalizedDate { date, ambiguous, defaulted: false })
}

/// Bare month names or numbers resolve to the first of that month in the
/// hinted year (or the current one). "Jan 2024" style tokens carry their
/// own year.
fn parse_month_token(s: &str, hints: &ParseHints) -> Option<NormalizedDate> {
    let month = if is_month_name_token(s) {
        vocab::month_in_text(s)?
    } else {
        bare_month_number(s)?
    };
    let embedded_year = s
        .split(|c: char| !c.is_ascii_digit())
        .filter(|w| !w.is_empty())
        .filter_map(|w| w.parse::<i32>().ok())
        .find_map(|n| match n {
            1900..=2100 => Some(n),
            0..=99 if !(1..=12).contains(&(n as u32)) || s.contains(['-', '\'']) => Some(2000 + n),
            _ => None,
        });
    let year = embedded_year
        .or(hints.default_year)
        .unwrap_or_else(|| chrono::Datelike::year(&today()));
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(NormalizedDate::clean(date))
}
