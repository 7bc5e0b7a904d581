//! CSV rendering and the on-disk result export.

use chrono::{DateTime, TimeZone};
use domain_scout_lib::{LookupResult, Run};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "domain,tld,status,protocol,diagnostic";

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_row(result: &LookupResult) -> String {
    let protocol = result.protocol.map(|p| p.to_string()).unwrap_or_default();
    let diagnostic = result.diagnostic.as_deref().unwrap_or("");

    format!(
        "{},{},{},{},{}",
        csv_field(&result.domain),
        csv_field(&result.tld),
        result.availability.as_str(),
        protocol,
        csv_field(diagnostic),
    )
}

/// Header plus one line per result, in the order given.
pub fn render_csv<'a, I>(results: I) -> String
where
    I: IntoIterator<Item = &'a LookupResult>,
{
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&csv_row(result));
        out.push('\n');
    }
    out
}

/// `domain_results_<YYYYmmdd_HHMMSS>.csv` in the current directory.
pub fn default_export_path<Tz>(now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from(format!(
        "domain_results_{}.csv",
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// An explicit output path always gets a file. Otherwise the file is only
/// worth writing when something is available or needs a second look.
pub fn should_export(run: &Run, explicit_output: bool) -> bool {
    explicit_output || run.available_count() > 0 || run.unknown_count() > 0
}

/// Write `run` (already sorted) as CSV to `path`.
pub fn write_csv(path: &Path, run: &Run) -> io::Result<()> {
    fs::write(path, render_csv(run.iter()))
}
