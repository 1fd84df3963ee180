//! Deterministic synthetic runs for demos, benchmarks and tests.
//!
//! A baseline is generated from a seed; the matching latest run perturbs each
//! statistic by a bounded random drift, so the same seed always yields the same pair.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::schema::{BenchRun, GcStats, TestItem};

/// Display-name prefix used by generated test names.
pub const SAMPLE_NAMESPACE: &str = "Microsoft.OData.Performance.";

const SAMPLE_SUITES: &[&str] = &[
    "ReaderTests",
    "WriterTests",
    "UriParserTests",
    "SerializerTests",
];

const SAMPLE_CASES: &[&str] = &[
    "ReadFeed",
    "ReadEntry",
    "WriteFeed",
    "WriteEntry",
    "ParseFilter",
    "ParseOrderBy",
    "InsertEntity",
    "QueryCollection",
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub test_type: String,
    /// Number of benchmark items in the baseline.
    pub items: usize,
    pub seed: u64,
    /// Maximum per-statistic drift of the latest run, in percent.
    pub drift_pct: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            test_type: "Component".to_string(),
            items: 24,
            seed: 42,
            drift_pct: 15.0,
        }
    }
}

fn sample_name(i: usize) -> String {
    let suite = SAMPLE_SUITES[i % SAMPLE_SUITES.len()];
    let case = SAMPLE_CASES[(i / SAMPLE_SUITES.len()) % SAMPLE_CASES.len()];
    let round = i / (SAMPLE_SUITES.len() * SAMPLE_CASES.len());
    if round == 0 {
        format!("{SAMPLE_NAMESPACE}{suite}.{case}")
    } else {
        format!("{SAMPLE_NAMESPACE}{suite}.{case}{round}")
    }
}

fn sample_item(rng: &mut ChaCha8Rng, name: String) -> TestItem {
    let mean: f64 = rng.gen_range(5.0..500.0);
    let spread: f64 = rng.gen_range(0.02..0.25);
    let gc_mean: f64 = rng.gen_range(0.0..20.0);
    TestItem {
        name,
        min: round3(mean * (1.0 - spread)),
        mean: round3(mean),
        max: round3(mean * (1.0 + spread)),
        margin_of_error: round3(mean * spread / 4.0),
        std_dev: round3(mean * spread / 2.0),
        gc: GcStats {
            max: round3(gc_mean * 1.5),
            mean: round3(gc_mean),
            min: round3(gc_mean * 0.5),
            margin_of_error: round3(gc_mean * 0.05),
            std_dev: round3(gc_mean * 0.1),
        },
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub fn baseline_run(cfg: &SampleConfig) -> BenchRun {
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    BenchRun {
        test_type: cfg.test_type.clone(),
        create_date: "2026-10-01".to_string(),
        build_id: format!("{}", 1000 + cfg.seed),
        items: (0..cfg.items)
            .map(|i| sample_item(&mut rng, sample_name(i)))
            .collect(),
    }
}

/// Perturbs every statistic of `baseline` by up to `±drift_pct` percent.
///
/// Keeps item order, so the result pairs one-to-one with the baseline.
pub fn drifted_run(baseline: &BenchRun, cfg: &SampleConfig) -> BenchRun {
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed.wrapping_add(1));
    let drift = cfg.drift_pct.abs() / 100.0;
    let mut jitter = |v: f64| {
        if drift == 0.0 {
            return v;
        }
        round3(v * (1.0 + rng.gen_range(-drift..drift))).max(0.0)
    };

    let items = baseline
        .items
        .iter()
        .map(|item| TestItem {
            name: item.name.clone(),
            min: jitter(item.min),
            mean: jitter(item.mean),
            max: jitter(item.max),
            margin_of_error: item.margin_of_error,
            std_dev: item.std_dev,
            gc: GcStats {
                max: jitter(item.gc.max),
                mean: jitter(item.gc.mean),
                min: jitter(item.gc.min),
                ..item.gc
            },
        })
        .collect();

    BenchRun {
        test_type: baseline.test_type.clone(),
        create_date: "2026-10-02".to_string(),
        build_id: format!("{}", 1001 + cfg.seed),
        items,
    }
}

/// A baseline and a drifted latest run generated from `cfg`.
pub fn sample_pair(cfg: &SampleConfig) -> (BenchRun, BenchRun) {
    let baseline = baseline_run(cfg);
    let latest = drifted_run(&baseline, cfg);
    (baseline, latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let cfg = SampleConfig::default();
        assert_eq!(sample_pair(&cfg), sample_pair(&cfg));
    }

    #[test]
    fn test_seed_changes_values() {
        let a = baseline_run(&SampleConfig::default());
        let b = baseline_run(&SampleConfig {
            seed: 7,
            ..Default::default()
        });
        assert_ne!(a.items, b.items);
    }

    #[test]
    fn test_generated_runs_validate() {
        let cfg = SampleConfig {
            items: 100,
            drift_pct: 40.0,
            ..Default::default()
        };
        let (baseline, latest) = sample_pair(&cfg);
        baseline.validate().unwrap();
        latest.validate().unwrap();
        assert_eq!(latest.items.len(), 100);
    }

    #[test]
    fn test_drift_is_bounded() {
        let cfg = SampleConfig {
            drift_pct: 10.0,
            ..Default::default()
        };
        let (baseline, latest) = sample_pair(&cfg);
        for (b, c) in baseline.items.iter().zip(&latest.items) {
            assert_eq!(b.name, c.name);
            let ratio = c.mean / b.mean;
            assert!((0.89..=1.11).contains(&ratio), "{}: {ratio}", b.name);
        }
    }

    #[test]
    fn test_zero_drift_copies_statistics() {
        let cfg = SampleConfig {
            drift_pct: 0.0,
            ..Default::default()
        };
        let (baseline, latest) = sample_pair(&cfg);
        assert_eq!(baseline.items, latest.items);
    }
}
