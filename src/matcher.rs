//! Pairs latest-run items with their baseline counterparts by name.

use crate::percent::{self, PercentageError};
use crate::schema::{PerformanceTest, TestItem};
use crate::Metric;

/// Baseline side of a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline<'a> {
    Found(&'a TestItem),
    /// The baseline run has no item with this name.
    Missing,
}

impl<'a> Baseline<'a> {
    pub fn item(&self) -> Option<&'a TestItem> {
        match self {
            Baseline::Found(item) => Some(item),
            Baseline::Missing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPair<'a> {
    pub baseline: Baseline<'a>,
    pub latest: &'a TestItem,
}

impl<'a> MatchedPair<'a> {
    pub fn name(&self) -> &'a str {
        &self.latest.name
    }

    /// Percentage change for `metric`; `None` when there is no usable baseline value.
    pub fn delta(&self, metric: Metric) -> Option<f64> {
        self.try_delta(metric).ok().flatten()
    }

    fn try_delta(&self, metric: Metric) -> Result<Option<f64>, PercentageError> {
        match self.baseline {
            Baseline::Found(base) => {
                percent::percentage_delta(base.value(metric), self.latest.value(metric)).map(Some)
            }
            Baseline::Missing => Ok(None),
        }
    }
}

/// One pair per latest item, in latest order. Baseline-only items are dropped.
pub fn match_runs<'a, B, L>(baseline: &'a B, latest: &'a L) -> Vec<MatchedPair<'a>>
where
    B: PerformanceTest + ?Sized,
    L: PerformanceTest + ?Sized,
{
    latest
        .items()
        .iter()
        .map(|item| {
            let base = match baseline.find(&item.name) {
                Some(found) => Baseline::Found(found),
                None => {
                    tracing::warn!(test = %item.name, "no baseline item");
                    Baseline::Missing
                }
            };
            MatchedPair {
                baseline: base,
                latest: item,
            }
        })
        .collect()
}
