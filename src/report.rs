//! Report generation: match, log, charts, latest summary, history.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::chart::{self, ChartSpec, PlottersSurface, Surface, CHART_HEIGHT, CHART_WIDTH};
use crate::error::{ReportError, Result};
use crate::history::{HistoryTracker, MAX_HISTORY_ENTRIES};
use crate::markdown;
use crate::matcher::{match_runs, Baseline, MatchedPair};
use crate::schema::PerformanceTest;
use crate::Metric;

/// Library namespace stripped from displayed test names by default.
pub const DEFAULT_NAME_PREFIX: &str = "Microsoft.OData.Performance.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Label of the baseline version, e.g. `"7.0"`.
    pub old_version: String,
    /// Regression threshold in percent; only used for chart annotation.
    pub threshold: u32,
    pub name_prefix: String,
    /// Prepended to chart, latest and history file names (`OData` gives
    /// `OData.<testType>.latest.md`).
    pub artifact_prefix: Option<String>,
    pub history_limit: usize,
}

impl ReportConfig {
    pub fn new(old_version: impl Into<String>, threshold: u32) -> Self {
        Self {
            old_version: old_version.into(),
            threshold,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            artifact_prefix: None,
            history_limit: MAX_HISTORY_ENTRIES,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.old_version.trim().is_empty() {
            return Err(ReportError::invalid_config("old version label is empty"));
        }
        if self.history_limit == 0 {
            return Err(ReportError::invalid_config("history limit must be at least 1"));
        }
        if let Some(prefix) = &self.artifact_prefix {
            if prefix.is_empty() || prefix.contains(['/', '\\']) {
                return Err(ReportError::invalid_config(format!(
                    "artifact prefix {prefix:?} is not a file name fragment"
                )));
            }
        }
        Ok(())
    }
}

/// Where each kind of artifact is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub logs_dir: PathBuf,
    pub images_dir: PathBuf,
    pub pages_dir: PathBuf,
}

impl OutputLayout {
    /// Everything in one directory.
    pub fn flat(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            logs_dir: root.clone(),
            images_dir: root.clone(),
            pages_dir: root,
        }
    }

    /// `logs/` and `images/` under `root`, pages in `root`; matches the relative
    /// links written into the latest summary and the history index.
    pub fn site(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            logs_dir: root.join("logs"),
            images_dir: root.join("images"),
            pages_dir: root,
        }
    }
}

/// File names of one report's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub log_file: String,
    pub latest_file: String,
    pub history_file: String,
    chart_stem: String,
}

impl ArtifactNames {
    /// Names the artifacts after `run`, which the generator passes as the latest run.
    ///
    /// The legacy report tool took test type, date and build id from the baseline
    /// run instead, so its log files are named after the older build.
    pub fn new<R: PerformanceTest + ?Sized>(config: &ReportConfig, run: &R) -> Self {
        let test_type = run.test_type();
        let stem = match &config.artifact_prefix {
            Some(prefix) => format!("{prefix}.{test_type}"),
            None => test_type.to_string(),
        };
        Self {
            log_file: format!("{}.md", log_title(config, run)),
            latest_file: format!("{stem}.latest.md"),
            history_file: format!("{stem}.History.md"),
            chart_stem: stem,
        }
    }

    pub fn chart_file(&self, metric: Metric) -> String {
        format!("{}.{}.png", self.chart_stem, metric.as_str())
    }

    pub fn chart_files(&self) -> [String; 3] {
        Metric::ALL.map(|m| self.chart_file(m))
    }
}

fn log_title<R: PerformanceTest + ?Sized>(config: &ReportConfig, run: &R) -> String {
    format!(
        "{}.{}.{}.{}",
        config.old_version,
        run.test_type(),
        run.create_date(),
        run.build_id()
    )
}

/// Paths written by one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub log_path: PathBuf,
    pub chart_paths: Vec<PathBuf>,
    pub latest_path: PathBuf,
    pub history_path: PathBuf,
    pub history_len: usize,
    pub compared: usize,
    pub missing_baselines: usize,
}

/// Builds the report for one baseline/latest comparison.
///
/// Runs against the same test type and output layout must not overlap; the
/// latest summary, charts and history are rewritten without locking.
pub struct ReportGenerator<'a> {
    baseline: &'a dyn PerformanceTest,
    latest: &'a dyn PerformanceTest,
    config: ReportConfig,
    layout: OutputLayout,
    names: ArtifactNames,
    matched: OnceCell<Vec<MatchedPair<'a>>>,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(
        baseline: &'a dyn PerformanceTest,
        latest: &'a dyn PerformanceTest,
        config: ReportConfig,
        layout: OutputLayout,
    ) -> Result<Self> {
        config.validate()?;
        if baseline.test_type() != latest.test_type() {
            tracing::warn!(
                baseline = baseline.test_type(),
                latest = latest.test_type(),
                "comparing runs of different test types"
            );
        }
        let names = ArtifactNames::new(&config, latest);
        Ok(Self {
            baseline,
            latest,
            config,
            layout,
            names,
            matched: OnceCell::new(),
        })
    }

    pub fn names(&self) -> &ArtifactNames {
        &self.names
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Matched pairs, computed on first use.
    pub fn matched(&self) -> &[MatchedPair<'a>] {
        self.matched.get_or_init(|| match_runs(self.baseline, self.latest))
    }

    pub fn log_path(&self) -> PathBuf {
        self.layout.logs_dir.join(&self.names.log_file)
    }

    pub fn chart_path(&self, metric: Metric) -> PathBuf {
        self.layout.images_dir.join(self.names.chart_file(metric))
    }

    pub fn latest_path(&self) -> PathBuf {
        self.layout.pages_dir.join(&self.names.latest_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.layout.pages_dir.join(&self.names.history_file)
    }

    /// Runs every step with PNG charts.
    pub fn generate(&self) -> Result<ReportOutcome> {
        self.generate_with(|width, height| PlottersSurface::new(width, height))
    }

    /// Runs every step, drawing charts on surfaces from `new_surface`.
    ///
    /// Steps run in order and the first failure aborts the run.
    pub fn generate_with<S, F>(&self, mut new_surface: F) -> Result<ReportOutcome>
    where
        S: Surface,
        F: FnMut(u32, u32) -> S,
    {
        let pairs = self.matched();
        let missing_baselines = pairs
            .iter()
            .filter(|p| p.baseline == Baseline::Missing)
            .count();
        tracing::info!(
            test_type = self.latest.test_type(),
            compared = pairs.len(),
            missing_baselines,
            "matched runs"
        );

        let log_path = self.write_log()?;
        let mut chart_paths = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let mut surface = new_surface(CHART_WIDTH, CHART_HEIGHT);
            chart_paths.push(self.write_chart(&mut surface, metric)?);
        }
        let latest_path = self.write_latest()?;
        let history = self.update_history()?;

        Ok(ReportOutcome {
            log_path,
            chart_paths,
            latest_path,
            history_path: self.history_path(),
            history_len: history.len(),
            compared: pairs.len(),
            missing_baselines,
        })
    }

    pub fn write_log(&self) -> Result<PathBuf> {
        let path = self.log_path();
        let title = log_title(&self.config, self.latest);
        let md = markdown::render_log(&title, self.matched(), &self.config.name_prefix);
        markdown::write_file(&path, &md)?;
        tracing::info!(path = %path.display(), "wrote run log");
        Ok(path)
    }

    pub fn write_chart<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        metric: Metric,
    ) -> Result<PathBuf> {
        let deltas: Vec<Option<f64>> = self.matched().iter().map(|p| p.delta(metric)).collect();
        let spec = ChartSpec {
            metric,
            threshold: self.config.threshold,
            test_type: self.latest.test_type(),
            create_date: self.latest.create_date(),
            build_id: self.latest.build_id(),
            old_version: &self.config.old_version,
        };
        chart::render_chart(surface, &spec, &deltas)?;

        let path = self.chart_path(metric);
        ensure_dir(&self.layout.images_dir)?;
        surface.save_png(&path)?;
        tracing::info!(path = %path.display(), metric = metric.label(), "wrote chart");
        Ok(path)
    }

    pub fn write_latest(&self) -> Result<PathBuf> {
        let path = self.latest_path();
        let md = markdown::render_latest(
            &self.config.old_version,
            &self.names.chart_files(),
            self.matched(),
            &self.config.name_prefix,
        );
        markdown::write_file(&path, &md)?;
        tracing::info!(path = %path.display(), "wrote latest summary");
        Ok(path)
    }

    pub fn update_history(&self) -> Result<Vec<String>> {
        let tracker =
            HistoryTracker::new(self.history_path()).with_limit(self.config.history_limit);
        let entries = tracker.record(self.latest.create_date(), &self.names.log_file)?;
        tracing::info!(
            path = %tracker.path().display(),
            entries = entries.len(),
            "updated history"
        );
        Ok(entries)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))
}
