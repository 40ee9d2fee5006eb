use serde::Serialize;

use crate::classifier::SheetFormat;

const HIGH_THRESHOLD: u8 = 70;
const MEDIUM_THRESHOLD: u8 = 40;
/// Above this share of defaulted dates the extraction gets flagged.
const DEFAULTED_WARN_RATIO: f64 = 0.3;
const MISMATCH_WARN_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingDate,
    MissingAmount,
    AmbiguousDates,
    AmbiguousAmounts,
    MixedSigns,
    UnsupportedLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

/// Graded trust in an extraction run, with the reasons spelled out.
#[derive(Debug, Clone, Serialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub score: u8,
    pub issues: Vec<Issue>,
}

/// What the column mapping managed to pin down for one sheet.
#[derive(Debug, Clone, Copy)]
pub struct LayoutShape {
    pub format: SheetFormat,
    pub has_date_col: bool,
    pub has_amount_col: bool,
    pub has_text_col: bool,
    /// Whether any column at all can yield transaction amounts.
    pub emittable: bool,
}

/// Tallies gathered while emitting transactions from one sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractStats {
    pub emitted: usize,
    /// Emitted transactions whose date came from an actual parse.
    pub dated: usize,
    pub defaulted_dates: usize,
    pub ambiguous_dates: usize,
    pub sign_mismatches: usize,
    /// Rows holding text where an amount should be, parsed to zero.
    pub zero_skipped: usize,
}

pub fn score(shape: &LayoutShape, stats: &ExtractStats) -> Confidence {
    let mut score: u32 = 0;
    let mut issues = Vec::new();

    match shape.format {
        SheetFormat::Transaction => {
            if shape.has_date_col {
                score += 25;
            } else {
                issues.push(Issue {
                    kind: IssueKind::MissingDate,
                    severity: Severity::Error,
                    message: "no date column could be identified".to_string(),
                });
            }
            if shape.has_amount_col {
                score += 25;
            } else {
                issues.push(Issue {
                    kind: IssueKind::MissingAmount,
                    severity: Severity::Error,
                    message: "no amount column could be identified".to_string(),
                });
            }
            if shape.has_text_col {
                score += 15;
            }
        }
        SheetFormat::Summary | SheetFormat::Mixed => {
            score += 40;
        }
    }

    if stats.defaulted_dates == 0 {
        score += 15;
    } else if stats.emitted > 0
        && stats.defaulted_dates as f64 > DEFAULTED_WARN_RATIO * stats.emitted as f64
    {
        issues.push(Issue {
            kind: IssueKind::MissingDate,
            severity: Severity::Warning,
            message: format!(
                "{} of {} transactions fell back to today's date",
                stats.defaulted_dates, stats.emitted
            ),
        });
    }

    if stats.ambiguous_dates == 0 || stats.ambiguous_dates * 2 < stats.dated {
        score += 10;
    } else {
        issues.push(Issue {
            kind: IssueKind::AmbiguousDates,
            severity: Severity::Warning,
            message: format!(
                "{} of {} dates use an ambiguous day/month order",
                stats.ambiguous_dates, stats.dated
            ),
        });
    }

    if stats.sign_mismatches == 0
        || (stats.sign_mismatches as f64) < MISMATCH_WARN_RATIO * stats.emitted as f64
    {
        score += 10;
    } else {
        issues.push(Issue {
            kind: IssueKind::MixedSigns,
            severity: Severity::Warning,
            message: format!(
                "{} of {} transactions carry a sign that contradicts their type",
                stats.sign_mismatches, stats.emitted
            ),
        });
    }

    let candidates = stats.emitted + stats.zero_skipped;
    if stats.zero_skipped > 0 && stats.zero_skipped as f64 > DEFAULTED_WARN_RATIO * candidates as f64 {
        issues.push(Issue {
            kind: IssueKind::AmbiguousAmounts,
            severity: Severity::Warning,
            message: format!(
                "{} of {} candidate rows had no parseable amount",
                stats.zero_skipped, candidates
            ),
        });
    }

    if !shape.emittable {
        issues.push(Issue {
            kind: IssueKind::UnsupportedLayout,
            severity: Severity::Warning,
            message: "no columns with usable amounts were found".to_string(),
        });
    }

    let score = score.min(100) as u8;
    Confidence {
        level: level_for(score, &issues),
        score,
        issues,
    }
}

/// Folds per-sheet gradings into one: the weakest sheet sets the tone.
pub fn combine(parts: Vec<Confidence>) -> Confidence {
    let score = parts.iter().map(|c| c.score).min().unwrap_or(0);
    let issues: Vec<Issue> = parts.into_iter().flat_map(|c| c.issues).collect();
    Confidence {
        level: level_for(score, &issues),
        score,
        issues,
    }
}

fn level_for(score: u8, issues: &[Issue]) -> ConfidenceLevel {
    if issues.iter().any(|i| i.severity == Severity::Error) {
        return ConfidenceLevel::Low;
    }
    if score >= HIGH_THRESHOLD {
        ConfidenceLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
