pub mod chart;
pub mod error;
pub mod fixtures;
pub mod history;
pub mod markdown;
pub mod matcher;
pub mod percent;
pub mod report;
pub mod schema;

pub use error::{ReportError, Result};
pub use matcher::{match_runs, Baseline, MatchedPair};
pub use percent::format_percentage;
pub use report::{OutputLayout, ReportConfig, ReportGenerator, ReportOutcome};
pub use schema::{BenchRun, PerformanceTest, TestItem};

/// Timing statistic compared between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Slowest observed iteration.
    Max,
    /// Average iteration.
    Mean,
    /// Fastest observed iteration.
    Min,
}

impl Metric {
    /// Report order: table column groups and chart links follow it.
    pub const ALL: [Metric; 3] = [Metric::Max, Metric::Mean, Metric::Min];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Max => "Max",
            Metric::Mean => "Mean",
            Metric::Min => "Min",
        }
    }

    /// Lower-case form used in chart file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Max => "max",
            Metric::Mean => "mean",
            Metric::Min => "min",
        }
    }
}
