/// Strips currency decoration: symbols and thousands separators anywhere
/// (quotes show up in CSV exports that double-wrap cells), plus a short
/// alphabetic currency code ("kr", "USD") hugging either end of the number.
fn clean(raw: &str) -> String {
    let s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '"' | '\'' | '$' | '€' | '£' | '¥' | '₹'))
        .collect();
    let lead = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let s = if (1..=3).contains(&lead) { s[lead..].to_string() } else { s };
    let trail = s.chars().rev().take_while(|c| c.is_ascii_alphabetic()).count();
    if (1..=3).contains(&trail) {
        s[..s.len() - trail].to_string()
    } else {
        s
    }
}

/// Parses a currency cell, if it is one. Handles `$1,234.56`, `€ 45`,
/// accounting-style `(120.00)` negatives and plain signed floats.
pub fn try_parse_amount(raw: &str) -> Option<f64> {
    let s = clean(raw);
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.parse::<f64>().ok().map(|v| -v.abs());
    }
    s.parse::<f64>().ok()
}

/// Lenient variant used on cells already mapped to an amount role: failure
/// is 0.0 (such transactions are filtered later), never an error.
pub fn parse_amount(raw: &str) -> f64 {
    try_parse_amount(raw).unwrap_or(0.0)
}

pub fn is_amount_like(raw: &str) -> bool {
    try_parse_amount(raw).is_some()
}

/// Share of sampled values that parse as amounts.
pub fn amount_like_ratio(values: &[&str]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let hits = values.iter().filter(|v| is_amount_like(v)).count();
    hits as f64 / values.len() as f64
}

/// Column-level test used by the mappers and the classifier: at least half
/// of the sampled values parse as currency-stripped numbers.
pub fn is_amount_like_column(values: &[&str]) -> bool {
    !values.is_empty() && amount_like_ratio(values) >= 0.5
}
