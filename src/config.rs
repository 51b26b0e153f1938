use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::model::DatasetDescriptor;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings read from an optional JSON file; every field has a default.
///
/// ```json
/// { "page_size": 100, "visible_rows": 20, "search_debounce_ms": 300,
///   "default_dataset": "Small Dataset",
///   "datasets": [{ "name": "Small Dataset", "location": "dataset_small.csv",
///                  "columns": ["mod3", "mod4", "mod5", "mod6"] }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Rows per page.
    pub page_size: usize,
    /// Rows of a page actually rendered.
    pub visible_rows: usize,
    pub search_debounce_ms: u64,
    /// Dataset loaded at startup.
    pub default_dataset: String,
    pub datasets: Vec<DatasetDescriptor>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            visible_rows: 20,
            search_debounce_ms: 300,
            default_dataset: "Small Dataset".to_string(),
            datasets: vec![
                DatasetDescriptor::new(
                    "Small Dataset",
                    "dataset_small.csv",
                    &["mod3", "mod4", "mod5", "mod6"],
                ),
                DatasetDescriptor::new(
                    "Large Dataset",
                    "dataset_large.csv",
                    &["mod350", "mod8000", "mod20002"],
                ),
            ],
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.visible_rows == 0 || self.visible_rows > self.page_size {
            bail!(
                "visible_rows must be between 1 and page_size ({}), got {}",
                self.page_size,
                self.visible_rows
            );
        }
        let mut names = HashSet::new();
        for ds in &self.datasets {
            if ds.name.is_empty() {
                bail!("dataset at '{}' has an empty name", ds.location);
            }
            if !names.insert(ds.name.as_str()) {
                bail!("dataset name '{}' appears more than once", ds.name);
            }
        }
        if !names.contains(self.default_dataset.as_str()) {
            bail!("default_dataset '{}' is not in the catalog", self.default_dataset);
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn catalog_entry<'a>(cfg: &'a DashboardConfig, name: &str) -> Option<&'a DatasetDescriptor> {
        cfg.datasets.iter().find(|d| d.name == name)
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = DashboardConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.search_debounce(), Duration::from_millis(300));
        assert_eq!(catalog_entry(&cfg, "Large Dataset").unwrap().location, "dataset_large.csv");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = DashboardConfig::from_json(r#"{ "page_size": 50 }"#).unwrap();
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.visible_rows, 20);
        assert_eq!(cfg.datasets.len(), 2);
    }

    #[test]
    fn custom_catalog() {
        let cfg = DashboardConfig::from_json(
            r#"{ "default_dataset": "mine",
                 "datasets": [{ "name": "mine", "location": "data/mine.csv" }] }"#,
        )
        .unwrap();
        assert_eq!(cfg.datasets[0].columns, Vec::<String>::new());
        assert!(catalog_entry(&cfg, "Small Dataset").is_none());
    }

    #[test]
    fn rejects_window_larger_than_page() {
        let err = DashboardConfig::from_json(r#"{ "page_size": 10, "visible_rows": 11 }"#);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unknown_default_dataset() {
        assert!(DashboardConfig::from_json(r#"{ "default_dataset": "nope" }"#).is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let text = r#"{ "default_dataset": "a", "datasets": [
            { "name": "a", "location": "1.csv" },
            { "name": "a", "location": "2.csv" } ] }"#;
        assert!(DashboardConfig::from_json(text).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{ "visible_rows": 5 }}"#).unwrap();
        let cfg = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(cfg.visible_rows, 5);
    }
}
