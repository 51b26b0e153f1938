use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result, bail};

use super::model::{Dataset, DatasetDescriptor, KEY_COLUMN, Row};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset a catalog entry points at.
pub fn load_descriptor(descriptor: &DatasetDescriptor) -> Result<Dataset> {
    let dataset = load_file(&descriptor.name, Path::new(&descriptor.location))
        .with_context(|| format!("loading dataset {descriptor}"))?;

    if !descriptor.columns.is_empty() && descriptor.columns != dataset.columns {
        log::warn!(
            "Dataset '{}' header {:?} differs from catalog columns {:?}; using the header",
            descriptor.name,
            dataset.columns,
            descriptor.columns
        );
    }
    Ok(dataset)
}

/// Load a CSV file from disk.
pub fn load_file(name: &str, path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    parse_csv(name, file)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSV layout: header `number,<col1>,<col2>,...`, then one record per row.
///
/// * `number` may sit at any position and becomes the row key.
/// * Every other header becomes a filterable column, in header order.
/// * Every cell must be an integer; surrounding whitespace is ignored.
pub fn parse_csv<R: Read>(name: &str, input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let key_idx = headers
        .iter()
        .position(|h| h == KEY_COLUMN)
        .with_context(|| format!("CSV missing '{KEY_COLUMN}' column"))?;

    let mut seen = HashSet::new();
    for h in &headers {
        if !seen.insert(h.as_str()) {
            bail!("CSV header repeats column '{h}'");
        }
    }

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::new();
    let mut keys = HashSet::new();
    let mut duplicate_keys = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        // 1-based file line; the header is line 1.
        let line = row_no + 2;
        let record = result.with_context(|| format!("CSV line {line}"))?;

        let mut number = 0;
        let mut values = Vec::with_capacity(columns.len());
        for (col_idx, cell) in record.iter().enumerate() {
            let value = cell.parse::<i64>().with_context(|| {
                format!(
                    "CSV line {line}, column '{}': '{cell}' is not an integer",
                    headers[col_idx]
                )
            })?;
            if col_idx == key_idx {
                number = value;
            } else {
                values.push(value);
            }
        }

        if !keys.insert(number) {
            duplicate_keys += 1;
        }
        rows.push(Row::new(number, values));
    }

    if duplicate_keys > 0 {
        log::warn!("Dataset '{name}' has {duplicate_keys} rows with a repeated '{KEY_COLUMN}'");
    }

    Ok(Dataset::new(name, columns, rows))
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

/// Result of a background load, tagged with the generation that asked for it.
pub struct LoadOutcome {
    pub generation: u64,
    pub result: Result<Dataset>,
}

/// Parse `descriptor` on a worker thread; the outcome arrives on the receiver.
pub fn spawn_load(descriptor: DatasetDescriptor, generation: u64) -> Receiver<LoadOutcome> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_descriptor(&descriptor);
        // The receiver is gone when a newer load superseded this one.
        let _ = tx.send(LoadOutcome { generation, result });
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "number,mod3,mod4,mod5,mod6
1,1,1,1,1
2,2,2,2,2
3,0,3,3,3
4,1,0,4,4
5,2,1,0,5
";

    #[test]
    fn parses_sample() {
        let ds = parse_csv("Small Dataset", SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.columns, vec!["mod3", "mod4", "mod5", "mod6"]);
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.rows[0], Row::new(1, vec![1, 1, 1, 1]));
        assert_eq!(ds.rows[4], Row::new(5, vec![2, 1, 0, 5]));
    }

    #[test]
    fn key_column_may_move() {
        let ds = parse_csv("t", "a, number ,b\n7, 1, 9\n".as_bytes()).unwrap();
        assert_eq!(ds.columns, vec!["a", "b"]);
        assert_eq!(ds.rows[0], Row::new(1, vec![7, 9]));
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let ds = parse_csv("t", "number,mod3\n".as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.columns, vec!["mod3"]);
    }

    #[test]
    fn missing_key_column_fails() {
        let err = parse_csv("t", "id,mod3\n1,1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("number"));
    }

    #[test]
    fn non_integer_cell_fails_with_location() {
        let err = parse_csv("t", "number,mod3\n1,1\n2,x\n".as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("mod3"), "{msg}");
    }

    #[test]
    fn ragged_record_fails() {
        let err = parse_csv("t", "number,mod3\n1,1,1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn repeated_header_fails() {
        assert!(parse_csv("t", "number,a,a\n1,1,1\n".as_bytes()).is_err());
    }

    #[test]
    fn loads_descriptor_from_disk() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let desc = DatasetDescriptor::new(
            "Small Dataset",
            file.path().to_string_lossy(),
            &["mod3", "mod4", "mod5", "mod6"],
        );
        let ds = load_descriptor(&desc).unwrap();
        assert_eq!(ds.name, "Small Dataset");
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn missing_file_is_an_error() {
        let desc = DatasetDescriptor::new("gone", "/nonexistent/dataset.csv", &[]);
        assert!(load_descriptor(&desc).is_err());
    }

    #[test]
    fn background_load_reports_generation() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let desc = DatasetDescriptor::new("bg", file.path().to_string_lossy(), &[]);
        let outcome = spawn_load(desc, 7).recv().unwrap();
        assert_eq!(outcome.generation, 7);
        assert_eq!(outcome.result.unwrap().len(), 5);
    }
}
