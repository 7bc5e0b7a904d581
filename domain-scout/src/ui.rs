//! Console display logic for the domain-scout CLI.
//!
//! Colored result lines, grouped `--pretty` output, the spinner, headers and
//! summaries. Everything here writes to stdout except the spinner, which
//! uses stderr so piped output stays clean.

use console::{pad_str, style, Alignment, Term};
use domain_scout_lib::{Availability, DomainInfo, LookupResult, Run};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

/// Diagnostics longer than this are cut in normal output.
const DIAGNOSTIC_WIDTH: usize = 60;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message. Returns `None` when stderr
    /// is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a run.
pub fn print_header(name_count: usize, tlds: &[String], concurrency: usize) {
    let total = name_count * tlds.len();
    println!(
        "{} {} {}",
        style("domain-scout").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "· {} name{} × {} TLD{} = {} lookup{}",
            name_count,
            plural(name_count),
            tlds.len(),
            plural(tlds.len()),
            total,
            plural(total)
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!(
            "TLDs: {} | Concurrency: {}",
            tlds.join(", "),
            concurrency
        ))
        .dim()
    );
    println!();
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ── Single result line ───────────────────────────────────────────────────────

/// Whether a result gets a line of its own. Taken domains are noise unless
/// asked for.
pub fn is_shown(result: &LookupResult, show_taken: bool) -> bool {
    show_taken || !result.is_taken()
}

/// Format and print a single result with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
pub fn print_result(
    result: &LookupResult,
    show_info: bool,
    debug: bool,
    counter: Option<(usize, usize)>,
) {
    let padded_domain = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    match result.availability {
        Availability::Available => {
            println!(
                "  {}{}  {}",
                prefix,
                style(&padded_domain).white(),
                style("AVAILABLE").green().bold(),
            );
        }
        Availability::Taken => {
            println!(
                "  {}{}  {}{}",
                prefix,
                style(&padded_domain).white(),
                style("TAKEN").red().bold(),
                info_suffix(result, show_info),
            );
        }
        Availability::Unknown => {
            println!(
                "  {}{}  {}  {}",
                prefix,
                style(&padded_domain).white(),
                style("UNKNOWN").yellow(),
                style(brief_diagnostic(result, debug)).dim(),
            );
        }
    }

    if debug {
        print_timing(result, "    ");
    }
}

/// Print a bare progress tick for results that are not shown.
pub fn print_progress(completed: usize, total: usize) {
    let term = Term::stderr();
    if term.is_term() {
        let _ = term.clear_line();
        let _ = term.write_str(&format!(
            "{}",
            style(format!("[{}/{}] checking...", completed, total)).dim()
        ));
    }
}

/// Clear any progress tick left on stderr.
pub fn clear_progress() {
    let term = Term::stderr();
    if term.is_term() {
        let _ = term.clear_line();
    }
}

fn info_suffix(result: &LookupResult, show_info: bool) -> String {
    if !show_info {
        return String::new();
    }
    result
        .info
        .as_ref()
        .map(|i| format!("  {}", style(format_domain_info(i)).dim()))
        .unwrap_or_default()
}

fn print_timing(result: &LookupResult, indent: &str) {
    if let Some(duration) = result.check_duration {
        let via = result
            .protocol
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}{} Checked in {}ms via {}",
            indent,
            style("└─").dim(),
            duration.as_millis(),
            via,
        );
    }
}

// ── Grouped output ───────────────────────────────────────────────────────────

/// Print results grouped by status: Available, Taken, Unknown.
///
/// Empty sections are omitted. Without `show_taken` the taken section only
/// shows its count.
pub fn print_grouped_results(run: &Run, show_info: bool, show_taken: bool, debug: bool) {
    let available: Vec<&LookupResult> = run.iter().filter(|r| r.is_available()).collect();
    let taken: Vec<&LookupResult> = run.iter().filter(|r| r.is_taken()).collect();
    let unknown: Vec<&LookupResult> = run.iter().filter(|r| r.is_unknown()).collect();

    if !available.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Available ({}) ", available.len()))
                .green()
                .bold(),
            style("─".repeat(40)).green().dim(),
        );
        for r in &available {
            print_grouped_line(r, show_info, debug);
        }
        println!();
    }

    if !taken.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Taken ({}) ", taken.len())).red().bold(),
            style("─".repeat(44)).red().dim(),
        );
        if show_taken {
            for r in &taken {
                print_grouped_line(r, show_info, debug);
            }
        } else {
            println!("    {}", style("(use --show-taken to list)").dim());
        }
        println!();
    }

    if !unknown.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Unknown ({}) ", unknown.len()))
                .yellow()
                .bold(),
            style("─".repeat(40)).yellow().dim(),
        );
        for r in &unknown {
            print_grouped_line(r, show_info, debug);
        }
        println!();
    }
}

fn print_grouped_line(result: &LookupResult, show_info: bool, debug: bool) {
    let padded = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    match result.availability {
        Availability::Available => println!("    {}", style(&padded).white()),
        Availability::Taken => {
            println!("    {}{}", style(&padded).white(), info_suffix(result, show_info))
        }
        Availability::Unknown => println!(
            "    {}  {}",
            style(&padded).white(),
            style(brief_diagnostic(result, debug)).dim()
        ),
    }

    if debug {
        print_timing(result, "      ");
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(run: &Run, duration: Duration) {
    let total = run.len();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        plural(total),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", run.available_count())).green(),
        style("|").dim(),
        style(format!("{} taken", run.taken_count())).red(),
        style("|").dim(),
        style(format!("{} unknown", run.unknown_count())).yellow(),
    );
}

/// List every available domain, one per line.
pub fn print_available_list(run: &Run) {
    if run.available_count() == 0 {
        println!("  {}", style("No available domains found.").dim());
        return;
    }

    println!();
    println!("  {}", style("Available domains:").green().bold());
    for result in run.available() {
        println!("    {}", style(&result.domain).green());
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Format domain info (registrar, dates) into a concise string.
pub fn format_domain_info(info: &DomainInfo) -> String {
    let mut parts = Vec::new();
    if let Some(registrar) = &info.registrar {
        parts.push(format!("Registrar: {}", registrar));
    }
    if let Some(created) = &info.creation_date {
        parts.push(format!("Created: {}", created));
    }
    if let Some(expires) = &info.expiration_date {
        parts.push(format!("Expires: {}", expires));
    }
    if parts.is_empty() {
        "No info available".to_string()
    } else {
        parts.join(", ")
    }
}

/// Parenthesized diagnostic for an unknown result, cut short unless debugging.
fn brief_diagnostic(result: &LookupResult, debug: bool) -> String {
    let Some(diagnostic) = &result.diagnostic else {
        return "(unknown status)".to_string();
    };

    if debug || diagnostic.chars().count() <= DIAGNOSTIC_WIDTH {
        format!("({})", diagnostic)
    } else {
        let cut: String = diagnostic.chars().take(DIAGNOSTIC_WIDTH).collect();
        format!("({}...)", cut.trim_end())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use domain_scout_lib::{Protocol, UNSUPPORTED_TLD};

    fn unknown(diagnostic: &str) -> LookupResult {
        LookupResult::unknown("a1.com", "com", Some(Protocol::Rdap), diagnostic)
    }

    #[test]
    fn test_brief_diagnostic_short_is_kept() {
        let r = LookupResult::unknown("a1.zzz", "zzz", None, UNSUPPORTED_TLD);
        assert_eq!(brief_diagnostic(&r, false), "(unsupported TLD)");
    }

    #[test]
    fn test_brief_diagnostic_long_is_cut() {
        let long = format!("ambiguous WHOIS response: {}", "x".repeat(200));
        let r = unknown(&long);

        let brief = brief_diagnostic(&r, false);
        assert!(brief.ends_with("...)"));
        assert!(brief.chars().count() <= DIAGNOSTIC_WIDTH + 5);

        assert_eq!(brief_diagnostic(&r, true), format!("({})", long));
    }

    #[test]
    fn test_brief_diagnostic_missing() {
        let r = LookupResult::new("a1.com", "com", None, Availability::Unknown);
        assert_eq!(brief_diagnostic(&r, false), "(unknown status)");
    }

    #[test]
    fn test_taken_hidden_unless_requested() {
        let taken =
            LookupResult::new("google.com", "com", Some(Protocol::Rdap), Availability::Taken);
        assert!(!is_shown(&taken, false));
        assert!(is_shown(&taken, true));
        assert!(is_shown(&unknown("HTTP 500"), false));
    }

    #[test]
    fn test_format_domain_info_all_fields() {
        let info = DomainInfo {
            registrar: Some("GoDaddy".to_string()),
            creation_date: Some("2020-01-01".to_string()),
            expiration_date: Some("2025-01-01".to_string()),
            ..Default::default()
        };
        let formatted = format_domain_info(&info);
        assert!(formatted.contains("Registrar: GoDaddy"));
        assert!(formatted.contains("Created: 2020-01-01"));
        assert!(formatted.contains("Expires: 2025-01-01"));
    }

    #[test]
    fn test_format_domain_info_empty() {
        assert_eq!(format_domain_info(&DomainInfo::default()), "No info available");
    }
}
