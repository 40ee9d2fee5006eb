use serde::Serialize;

/// Direction of money movement. Stored alongside a signed amount so
/// downstream consumers never have to re-derive the sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    pub fn label(&self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
        }
    }
}

/// A normalized transaction emitted by one of the extraction paths.
/// Immutable once returned; the id is opaque and unique per emission.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub signed_amount: f64,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
}

impl Transaction {
    /// Builds a transaction from an unsigned magnitude and a resolved type,
    /// keeping `amount`, `signed_amount` and `txn_type` consistent.
    pub fn new(date: String, description: String, category: String, amount: f64, txn_type: TxnType) -> Self {
        let magnitude = amount.abs();
        let signed = match txn_type {
            TxnType::Expense => -magnitude,
            TxnType::Income => magnitude,
        };
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            description,
            category,
            amount: magnitude,
            signed_amount: signed,
            txn_type,
        }
    }
}

/// Caller-supplied context for one extraction run. All fields optional;
/// the engine never derives these itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseHints {
    /// Year to use for bare month tokens ("March", "11").
    pub default_year: Option<i32>,
    /// Month (1-12) the owning sheet represents, taken from its tab name.
    /// Decides day/month order for ambiguous numeric dates.
    pub month_hint: Option<u32>,
    /// Sheet-level income/expense override, e.g. from a tab named "Expenses".
    pub sheet_type: Option<TxnType>,
}
