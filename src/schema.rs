use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::Metric;

/// Garbage-collection statistics observed while a benchmark ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcStats {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
    pub margin_of_error: f64,
    pub std_dev: f64,
}

/// One benchmark's statistics for one run. `name` is the join key across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    pub name: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,

    #[serde(default)]
    pub margin_of_error: f64,
    #[serde(default)]
    pub std_dev: f64,

    #[serde(default)]
    pub gc: GcStats,
}

impl TestItem {
    pub fn new(name: impl Into<String>, max: f64, mean: f64, min: f64) -> Self {
        Self {
            name: name.into(),
            min,
            mean,
            max,
            margin_of_error: 0.0,
            std_dev: 0.0,
            gc: GcStats::default(),
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Max => self.max,
            Metric::Mean => self.mean,
            Metric::Min => self.min,
        }
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("min", self.min),
            ("mean", self.mean),
            ("max", self.max),
            ("margin_of_error", self.margin_of_error),
            ("std_dev", self.std_dev),
            ("gc.max", self.gc.max),
            ("gc.mean", self.gc.mean),
            ("gc.min", self.gc.min),
            ("gc.margin_of_error", self.gc.margin_of_error),
            ("gc.std_dev", self.gc.std_dev),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ReportError::invalid_run(format!(
                    "{}: {field} must be a finite non-negative number, got {value}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Read side of a captured benchmark run.
pub trait PerformanceTest {
    fn test_type(&self) -> &str;
    fn create_date(&self) -> &str;
    fn build_id(&self) -> &str;
    fn items(&self) -> &[TestItem];

    fn find(&self, name: &str) -> Option<&TestItem> {
        self.items().iter().find(|item| item.name == name)
    }
}

/// A benchmark run as stored in a JSON run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRun {
    pub test_type: String,
    pub create_date: String,
    pub build_id: String,
    pub items: Vec<TestItem>,
}

impl BenchRun {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| ReportError::io(path, e))?;
        let run: BenchRun = serde_json::from_slice(&data).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        run.validate()?;
        tracing::debug!(
            path = %path.display(),
            test_type = %run.test_type,
            items = run.items.len(),
            "loaded run"
        );
        Ok(run)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| ReportError::io(path, e))
    }

    /// Names must be unique and every statistic finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.name.as_str()) {
                return Err(ReportError::invalid_run(format!(
                    "duplicate test name {} in {} run {}",
                    item.name, self.test_type, self.build_id
                )));
            }
            item.validate()?;
        }
        Ok(())
    }
}

impl PerformanceTest for BenchRun {
    fn test_type(&self) -> &str {
        &self.test_type
    }

    fn create_date(&self) -> &str {
        &self.create_date
    }

    fn build_id(&self) -> &str {
        &self.build_id
    }

    fn items(&self) -> &[TestItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(items: Vec<TestItem>) -> BenchRun {
        BenchRun {
            test_type: "Component".into(),
            create_date: "2026-10-01".into(),
            build_id: "1234".into(),
            items,
        }
    }

    #[test]
    fn test_find_by_name() {
        let r = run(vec![
            TestItem::new("A", 3.0, 2.0, 1.0),
            TestItem::new("B", 6.0, 5.0, 4.0),
        ]);
        assert_eq!(r.find("B").map(|i| i.mean), Some(5.0));
        assert!(r.find("C").is_none());
    }

    #[test]
    fn test_load_minimal_json_defaults_optional_stats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{
                "test_type": "E2E",
                "create_date": "2026-10-02",
                "build_id": "77",
                "items": [{ "name": "Query", "min": 1.5, "mean": 2.0, "max": 3.25 }]
            }"#,
        )
        .unwrap();

        let loaded = BenchRun::load(&path).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].max, 3.25);
        assert_eq!(loaded.items[0].gc, GcStats::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut item = TestItem::new("Insert", 10.0, 8.0, 6.0);
        item.gc.mean = 3.0;
        let original = run(vec![item]);

        original.save(&path).unwrap();
        assert_eq!(BenchRun::load(&path).unwrap(), original);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let r = run(vec![
            TestItem::new("A", 3.0, 2.0, 1.0),
            TestItem::new("A", 3.0, 2.0, 1.0),
        ]);
        assert!(matches!(r.validate(), Err(ReportError::InvalidRun(_))));
    }

    #[test]
    fn test_negative_statistic_rejected() {
        let r = run(vec![TestItem::new("A", 3.0, -2.0, 1.0)]);
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("mean"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            BenchRun::load(&path),
            Err(ReportError::Parse { .. })
        ));
    }
}
