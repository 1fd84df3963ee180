use clap::{Parser, Subcommand, ValueEnum};
use perf_regression_report::chart::register_font_file;
use perf_regression_report::error::{ReportError, Result};
use perf_regression_report::fixtures::{self, SampleConfig};
use perf_regression_report::history::HistoryTracker;
use perf_regression_report::markdown;
use perf_regression_report::report::DEFAULT_NAME_PREFIX;
use perf_regression_report::{match_runs, BenchRun, OutputLayout, ReportConfig, ReportGenerator};
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Compact,
    Full,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two runs and write the log, charts, latest summary and history.
    Generate {
        /// Baseline run file (JSON).
        #[arg(long, value_name = "FILE")]
        baseline: PathBuf,

        /// Latest run file (JSON).
        #[arg(long, value_name = "FILE")]
        latest: PathBuf,

        /// Version label of the baseline, shown in headers and chart titles.
        #[arg(long)]
        old_version: String,

        /// Regression threshold in percent, drawn on the charts.
        #[arg(long, default_value_t = 10)]
        threshold: u32,

        /// Output directory.
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Write logs to `<out>/logs` and charts to `<out>/images`.
        #[arg(long, default_value_t = false)]
        site_layout: bool,

        /// Namespace stripped from displayed test names.
        #[arg(long, default_value = DEFAULT_NAME_PREFIX)]
        name_prefix: String,

        /// Prefix for chart, latest and history file names (e.g. `OData`).
        #[arg(long)]
        artifact_prefix: Option<String>,

        /// Maximum number of history entries kept.
        #[arg(long, default_value_t = perf_regression_report::history::MAX_HISTORY_ENTRIES)]
        history_limit: usize,

        /// TrueType/OpenType font for chart text, instead of the bundled DejaVu Sans.
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,
    },

    /// Print the comparison table only.
    Table {
        #[arg(long, value_name = "FILE")]
        baseline: PathBuf,

        #[arg(long, value_name = "FILE")]
        latest: PathBuf,

        #[arg(long, default_value = DEFAULT_NAME_PREFIX)]
        name_prefix: String,

        /// Write the table to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// List the entries of a history index.
    History {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Write a deterministic baseline/latest pair of run files.
    Sample {
        /// Number of benchmark items.
        #[arg(long, short = 'n', default_value_t = 24)]
        items: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Maximum drift of the latest run, in percent.
        #[arg(long, default_value_t = 15.0)]
        drift: f64,

        #[arg(long, default_value = "Component")]
        test_type: String,

        #[arg(long, short = 'o', value_name = "DIR")]
        out_dir: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "perf-regression-report")]
#[command(about = "Baseline vs latest benchmark regression reports (markdown + PNG charts)")]
struct Args {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    cmd: Command,
}

fn setup_logging(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Full => subscriber.init(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level, args.log_format);

    match args.cmd {
        Command::Generate {
            baseline,
            latest,
            old_version,
            threshold,
            out,
            site_layout,
            name_prefix,
            artifact_prefix,
            history_limit,
            font,
        } => {
            if let Some(font) = &font {
                register_font_file(font)?;
            }
            let baseline = BenchRun::load(&baseline)?;
            let latest = BenchRun::load(&latest)?;

            let config = ReportConfig {
                name_prefix,
                artifact_prefix,
                history_limit,
                ..ReportConfig::new(old_version, threshold)
            };
            let layout = if site_layout {
                OutputLayout::site(out)
            } else {
                OutputLayout::flat(out)
            };

            let generator = ReportGenerator::new(&baseline, &latest, config, layout)?;
            let outcome = generator.generate()?;
            tracing::info!(
                compared = outcome.compared,
                missing_baselines = outcome.missing_baselines,
                history = outcome.history_len,
                "report complete"
            );
            println!("{}", outcome.latest_path.display());
        }
        Command::Table {
            baseline,
            latest,
            name_prefix,
            out,
        } => {
            let baseline = BenchRun::load(&baseline)?;
            let latest = BenchRun::load(&latest)?;
            let table = markdown::render_table(&match_runs(&baseline, &latest), &name_prefix);
            match out {
                Some(path) => markdown::write_file(&path, &table)?,
                None => print!("{table}"),
            }
        }
        Command::History { file } => {
            for entry in HistoryTracker::new(file).read_or_empty()? {
                println!("{entry}");
            }
        }
        Command::Sample {
            items,
            seed,
            drift,
            test_type,
            out_dir,
        } => {
            let cfg = SampleConfig {
                test_type,
                items,
                seed,
                drift_pct: drift,
            };
            let (baseline, latest) = fixtures::sample_pair(&cfg);

            fs::create_dir_all(&out_dir).map_err(|e| ReportError::io(&out_dir, e))?;
            let baseline_path = out_dir.join("baseline.json");
            let latest_path = out_dir.join("latest.json");
            baseline.save(&baseline_path)?;
            latest.save(&latest_path)?;

            tracing::info!(
                items,
                seed,
                drift,
                "wrote {} and {}",
                baseline_path.display(),
                latest_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_takes_file_flag() {
        let args = Args::try_parse_from([
            "perf-regression-report",
            "history",
            "--file",
            "Component.History.md",
        ])
        .unwrap();
        assert!(matches!(
            args.cmd,
            Command::History { file } if file == PathBuf::from("Component.History.md")
        ));
    }

    #[test]
    fn history_rejects_positional_file() {
        let parsed =
            Args::try_parse_from(["perf-regression-report", "history", "Component.History.md"]);
        assert!(parsed.is_err());
    }
}
