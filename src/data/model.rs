use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the key column every dataset must carry.
pub const KEY_COLUMN: &str = "number";

// ---------------------------------------------------------------------------
// Row – one record of the dataset
// ---------------------------------------------------------------------------

/// A single record: the integer key plus one value per filterable column.
///
/// `values` is positional and follows [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: i64,
    pub values: Vec<i64>,
}

impl Row {
    pub fn new(number: i64, values: Vec<i64>) -> Self {
        Self { number, values }
    }

    /// Value at the given column position.
    pub fn value(&self, col_idx: usize) -> Option<i64> {
        self.values.get(col_idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built; replaced wholesale on switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Display name (catalog name or file stem).
    pub name: String,
    /// Ordered filterable column names (excludes [`KEY_COLUMN`]).
    pub columns: Vec<String>,
    /// All rows, in file order.
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Position of a filterable column, `None` for unknown names.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DatasetDescriptor – catalog entry
// ---------------------------------------------------------------------------

/// Where a dataset lives and which filterable columns it is expected to have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    /// Local path of the CSV file.
    pub location: String,
    /// Expected filterable header. Informational; the file header wins.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl DatasetDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl fmt::Display for DatasetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_dataset;

    #[test]
    fn column_lookup() {
        let ds = sample_dataset();
        assert_eq!(ds.column_index("mod3"), Some(0));
        assert_eq!(ds.column_index("mod6"), Some(3));
        assert_eq!(ds.column_index("number"), None);
        assert!(!ds.has_column("mod7"));
    }

    #[test]
    fn row_value_by_position() {
        let ds = sample_dataset();
        assert_eq!(ds.rows[3].value(1), Some(0));
        assert_eq!(ds.rows[3].value(9), None);
    }
}
