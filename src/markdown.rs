//! Markdown rendering for the per-run log and the latest summary.

use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::matcher::{Baseline, MatchedPair};
use crate::percent::{self, NOT_AVAILABLE};
use crate::Metric;

/// Shown in baseline cells when the baseline run has no such test.
pub const MISSING_VALUE: &str = "-";

/// Relative link target for chart images inside the latest summary.
pub const IMAGE_LINK_DIR: &str = "./images";

const TABLE_HEADER: &str = "| No. | TestName | Base Max | Latest Max | Max (%) | <=> | Base Mean | Latest Mean | Mean (%) | <=> | Base Min | Latest Min | Min (%) |";
const TABLE_ALIGNMENT: &str = "|:----|:---------|---------:|-----------:|--------:|-----|----------:|------------:|---------:|-----|---------:|-----------:|--------:|";

/// Display form of a test name: `prefix` removed, if present.
pub fn display_name<'n>(name: &'n str, prefix: &str) -> &'n str {
    if prefix.is_empty() {
        return name;
    }
    name.strip_prefix(prefix).unwrap_or(name)
}

fn metric_cells(pair: &MatchedPair<'_>, metric: Metric) -> [String; 3] {
    let latest = pair.latest.value(metric);
    match pair.baseline {
        Baseline::Found(base) => {
            let base = base.value(metric);
            [
                base.to_string(),
                latest.to_string(),
                percent::format_or_placeholder(base, latest),
            ]
        }
        Baseline::Missing => [
            MISSING_VALUE.to_string(),
            latest.to_string(),
            NOT_AVAILABLE.to_string(),
        ],
    }
}

/// One table row; `index` is 1-based.
pub fn render_row(index: usize, pair: &MatchedPair<'_>, name_prefix: &str) -> String {
    let groups: Vec<String> = Metric::ALL
        .iter()
        .map(|metric| metric_cells(pair, *metric).join("|"))
        .collect();
    format!(
        "|{index}|{}|{}|",
        display_name(pair.name(), name_prefix),
        groups.join("| |")
    )
}

/// Header, alignment row and one row per pair, newline terminated.
pub fn render_table(pairs: &[MatchedPair<'_>], name_prefix: &str) -> String {
    let mut md = String::new();
    md.push_str(TABLE_HEADER);
    md.push('\n');
    md.push_str(TABLE_ALIGNMENT);
    md.push('\n');
    for (i, pair) in pairs.iter().enumerate() {
        md.push_str(&render_row(i + 1, pair, name_prefix));
        md.push('\n');
    }
    md
}

/// Dated per-run log: title line, rule, then the comparison table.
pub fn render_log(title: &str, pairs: &[MatchedPair<'_>], name_prefix: &str) -> String {
    format!("### {title}\n---\n\n{}", render_table(pairs, name_prefix))
}

/// Latest summary: version header, one row of chart links, rule, comparison table.
///
/// `chart_files` are bare file names in [`Metric::ALL`] order.
pub fn render_latest(
    old_version: &str,
    chart_files: &[String; 3],
    pairs: &[MatchedPair<'_>],
    name_prefix: &str,
) -> String {
    let mut md = String::new();
    let headers: Vec<String> = Metric::ALL
        .iter()
        .map(|m| format!(" {old_version} {} ", m.label()))
        .collect();
    md.push_str(&format!("|{}|\n", headers.join("|")));
    md.push_str("|:---:|:----:|:---:|\n");

    let links: Vec<String> = chart_files
        .iter()
        .map(|file| format!("![image]({IMAGE_LINK_DIR}/{file})"))
        .collect();
    md.push_str(&format!("|{}|\n", links.join("|")));
    md.push_str("---\n");
    md.push_str(&render_table(pairs, name_prefix));
    md
}

/// Creates or truncates `path` with `contents`.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| ReportError::io(path, e))
}
