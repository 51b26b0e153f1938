use std::fmt::Write;

use super::model::Row;

// ---------------------------------------------------------------------------
// Free-text search over rows
// ---------------------------------------------------------------------------

/// A prepared search: the lowercased needle plus a scratch buffer so that
/// matching a row does not allocate per cell.
pub struct RowMatcher {
    needle: String,
    buf: String,
}

impl RowMatcher {
    /// Returns `None` for an empty term, which means "no text filter".
    pub fn new(term: &str) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        Some(Self {
            needle: term.to_lowercase(),
            buf: String::with_capacity(24),
        })
    }

    /// Whether the key or any attribute contains the needle in its decimal form.
    ///
    /// The key is checked first, then attributes in column order.
    pub fn matches(&mut self, row: &Row) -> bool {
        if self.field_contains(row.number) {
            return true;
        }
        for &value in &row.values {
            if self.field_contains(value) {
                return true;
            }
        }
        false
    }

    fn field_contains(&mut self, value: i64) -> bool {
        self.buf.clear();
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "{value}");
        self.buf.contains(self.needle.as_str())
    }
}
