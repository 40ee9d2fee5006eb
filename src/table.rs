/// One worksheet as a rectangular matrix of strings. Built once by the
/// loader (or a test) and never mutated; every inference step reads it
/// through shared references.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Normalizes ragged input: header and every row are right-padded with
    /// empty strings to the widest line seen.
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut width = header.len();
        for row in &rows {
            width = width.max(row.len());
        }
        let mut header = header;
        header.resize(width, String::new());
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        SheetTable { name: name.into(), header, rows }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell accessor that treats out-of-range as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// First `n` non-empty trimmed values of a column, in row order.
    pub fn sample_column(&self, col: usize, n: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(n)
            .collect()
    }

    /// Every non-empty trimmed value of a column.
    pub fn column_values(&self, col: usize) -> Vec<&str> {
        self.sample_column(col, usize::MAX)
    }
}
