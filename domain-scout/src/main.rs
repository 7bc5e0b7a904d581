//! Domain Scout CLI Application
//!
//! Loads word lists, checks every name against every configured TLD using
//! RDAP or WHOIS, highlights what is free and exports the results as CSV.

mod export;
mod ui;

use chrono::Local;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_scout_lib::{
    cross_product, load_env_config, normalize_tlds, parse_timeout_string, CheckConfig,
    ConfigManager, DomainCandidate, DomainChecker, EnvConfig, FileConfig, Run, WordList,
    DEFAULT_TLDS,
};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Exit status after Ctrl-C, once partial results are written.
const EXIT_INTERRUPTED: i32 = 130;

/// CLI arguments for domain-scout
#[derive(Parser, Debug)]
#[command(name = "domain-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check word lists for available domains using RDAP with WHOIS fallback")]
#[command(
    long_about = "Check word lists for available domains.\n\nEvery name is checked against every TLD. RDAP is used where the registry offers it, WHOIS elsewhere. Results are AVAILABLE, TAKEN or UNKNOWN, and runs with anything available or unknown are exported to CSV."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Plain-text word list, one name per line
    #[arg(value_name = "WORDS_FILE", help_heading = "Name Sources")]
    pub words_file: Option<PathBuf>,

    /// JSON word list with "words", "prefixes" and "roots" arrays
    #[arg(long = "words", value_name = "JSON", help_heading = "Name Sources")]
    pub words_json: Option<PathBuf>,

    /// Name to check (repeatable)
    #[arg(
        short = 'n',
        long = "name",
        value_name = "NAME",
        action = clap::ArgAction::Append,
        help_heading = "Name Sources"
    )]
    pub names: Vec<String>,

    /// TLDs to check, comma-separated [default: com,ai,app,io,co]
    #[arg(
        short = 't',
        long = "tlds",
        value_name = "TLDS",
        value_delimiter = ',',
        help_heading = "Name Sources"
    )]
    pub tlds: Option<Vec<String>>,

    /// List the domains that would be checked and exit
    #[arg(long = "dry-run", help_heading = "Name Sources")]
    pub dry_run: bool,

    /// Max concurrent lookups [default: 10, max: 100]
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout such as 5s, 2m or 8 [default: 8s]
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Milliseconds between request starts, e.g. 400 for large WHOIS runs [default: 0]
    #[arg(long = "delay", value_name = "MS", help_heading = "Performance")]
    pub delay: Option<u64>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Group results by status after the run
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Show registrar and dates for taken domains
    #[arg(short = 'i', long = "info", help_heading = "Output Format")]
    pub info: bool,

    /// List taken domains too
    #[arg(long = "show-taken", help_heading = "Output Format")]
    pub show_taken: bool,

    /// CSV export path [default: domain_results_<timestamp>.csv]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Export"
    )]
    pub output: Option<PathBuf>,

    /// Do not write the CSV export file
    #[arg(long = "no-export", help_heading = "Export")]
    pub no_export: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show full diagnostics, timings and debug logs
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Effective settings after merging defaults, config file, env and CLI.
#[derive(Debug, Clone)]
struct Settings {
    check: CheckConfig,
    tlds: Vec<String>,
    export: bool,
}

/// What the checking loop hands back.
struct CheckOutcome {
    run: Run,
    total: usize,
    duration: Duration,
    interrupted: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.words_file.is_none() && args.words_json.is_none() && args.names.is_empty() {
        return Err(
            "You must specify a word list file, a JSON word list with --words, or names with --name"
                .to_string(),
        );
    }

    if args.json && args.csv {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    if args.no_export && args.output.is_some() {
        return Err("Cannot specify both --output and --no-export".to_string());
    }

    Ok(())
}

/// Main checking logic. Returns `Ok(false)` when the run was interrupted.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;
    let settings = resolve_settings(&args, &file_config, &env_config)?;
    let registry = file_config.build_registry()?;
    let names = load_names(&args)?;

    let unsupported: Vec<&str> = settings
        .tlds
        .iter()
        .filter(|tld| !registry.contains(tld))
        .map(String::as_str)
        .collect();
    if !unsupported.is_empty() {
        tracing::warn!(
            tlds = %unsupported.join(","),
            "TLDs without a registry entry will be reported as unknown"
        );
    }

    let candidates = cross_product(&names, &settings.tlds);

    if args.dry_run {
        print_dry_run(&candidates, args.json)?;
        return Ok(true);
    }

    tracing::info!(
        names = names.len(),
        tlds = settings.tlds.len(),
        concurrency = settings.check.concurrency,
        "starting run"
    );

    let checker = DomainChecker::with_config(Arc::new(registry), settings.check.clone())?;
    let outcome = run_check(&checker, candidates, &args, names.len(), &settings.tlds).await;
    let run = outcome.run.sorted();

    display_results(&run, &args, outcome.duration, checker.config().detailed_info)?;

    if outcome.interrupted {
        eprintln!(
            "Interrupted: {} of {} lookups completed",
            run.len(),
            outcome.total
        );
    }

    export_results(&run, &args, &settings)?;

    Ok(!outcome.interrupted)
}

/// `--config` wins over `DS_CONFIG`; without either, discovery runs.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let explicit = args.config.as_ref().or(env_config.config.as_ref());

    if let Some(path) = explicit {
        tracing::info!(path = %path, "using explicit config file");
    }

    config_manager
        .load(explicit.map(Path::new))
        .map_err(|e| e.to_string().into())
}

/// Merge settings with precedence CLI > env (DS_*) > config file > defaults.
fn resolve_settings(
    args: &Args,
    file_config: &FileConfig,
    env_config: &EnvConfig,
) -> Result<Settings, String> {
    let mut check = CheckConfig::default();
    let mut tlds: Vec<String> = DEFAULT_TLDS.iter().map(|t| t.to_string()).collect();
    let mut export = true;

    if let Some(defaults) = &file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            check = check.with_concurrency(concurrency);
        }
        if let Some(file_tlds) = &defaults.tlds {
            tlds = file_tlds.clone();
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            check = check.with_timeout(timeout);
        }
        if let Some(delay_ms) = defaults.delay_ms {
            check = check.with_request_delay(Duration::from_millis(delay_ms));
        }
        if let Some(detailed_info) = defaults.detailed_info {
            check = check.with_detailed_info(detailed_info);
        }
        if let Some(file_export) = defaults.export {
            export = file_export;
        }
    }

    if let Some(concurrency) = env_config.concurrency {
        check = check.with_concurrency(concurrency);
    }
    if let Some(env_tlds) = &env_config.tlds {
        tlds = env_tlds.clone();
    }
    if let Some(timeout) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        check = check.with_timeout(timeout);
    }
    if let Some(delay_ms) = env_config.delay_ms {
        check = check.with_request_delay(Duration::from_millis(delay_ms));
    }

    if let Some(concurrency) = args.concurrency {
        check = check.with_concurrency(concurrency);
    }
    if let Some(cli_tlds) = &args.tlds {
        tlds = cli_tlds.clone();
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        check = check.with_timeout(timeout);
    }
    if let Some(delay_ms) = args.delay {
        check = check.with_request_delay(Duration::from_millis(delay_ms));
    }
    // Flags only ever switch behavior on, so config values survive when absent
    if args.info {
        check = check.with_detailed_info(true);
    }
    if args.no_export {
        export = false;
    }
    if args.output.is_some() {
        export = true;
    }

    let tlds = normalize_tlds(&tlds);
    if tlds.is_empty() {
        return Err("No TLDs to check".to_string());
    }

    Ok(Settings { check, tlds, export })
}

/// Collect names from every source given, in order: text file, JSON file,
/// then `--name` values.
fn load_names(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut list = WordList::default();

    if let Some(path) = &args.words_file {
        tracing::info!(path = %path.display(), "reading word list");
        list.extend(WordList::from_text_file(path)?);
    }
    if let Some(path) = &args.words_json {
        tracing::info!(path = %path.display(), "reading JSON word list");
        list.extend(WordList::from_json_file(path)?);
    }
    list.words.extend(args.names.iter().cloned());

    let names = list.names();
    if names.is_empty() {
        return Err("No valid names found to check".into());
    }

    Ok(names)
}

fn print_dry_run(
    candidates: &[DomainCandidate],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let domains: Vec<String> = candidates.iter().map(DomainCandidate::fqdn).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
    } else {
        for domain in &domains {
            println!("{}", domain);
        }
    }
    eprintln!("{} domains would be checked", domains.len());
    Ok(())
}

/// Run every lookup, printing results as they complete, until the stream
/// ends or Ctrl-C arrives.
async fn run_check(
    checker: &DomainChecker,
    candidates: Vec<DomainCandidate>,
    args: &Args,
    name_count: usize,
    tlds: &[String],
) -> CheckOutcome {
    let total = candidates.len();
    let structured = args.json || args.csv;
    // Live lines only in the default text mode
    let live = !structured && !args.pretty;
    let show_info = checker.config().detailed_info;

    if !structured && (args.pretty || args.verbose) {
        ui::print_header(name_count, tlds, checker.config().concurrency);
    }

    let spinner = if live {
        None
    } else {
        ui::Spinner::start(format!("Checking {} domains...", total))
    };

    let start_time = Instant::now();
    let mut run = Run::default();
    let mut interrupted = false;

    let mut stream = checker.check_stream(candidates);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            next = stream.next() => {
                let Some(result) = next else { break };
                let completed = run.len() + 1;

                if live {
                    if ui::is_shown(&result, args.show_taken) {
                        ui::clear_progress();
                        ui::print_result(&result, show_info, args.debug, Some((completed, total)));
                    } else {
                        ui::print_progress(completed, total);
                    }
                }
                run.push(result);
            }
            _ = &mut ctrl_c => {
                tracing::warn!("interrupted, stopping run");
                interrupted = true;
                break;
            }
        }
    }

    if live {
        ui::clear_progress();
    }
    if let Some(s) = spinner {
        s.stop().await;
    }

    CheckOutcome {
        run,
        total,
        duration: start_time.elapsed(),
        interrupted,
    }
}

fn display_results(
    run: &Run,
    args: &Args,
    duration: Duration,
    show_info: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(run)?);
    } else if args.csv {
        print!("{}", export::render_csv(run.iter()));
    } else if args.pretty {
        ui::print_grouped_results(run, show_info, args.show_taken, args.debug);
        ui::print_summary(run, duration);
    } else {
        println!();
        ui::print_summary(run, duration);
        ui::print_available_list(run);
    }

    Ok(())
}

/// Write the CSV file when enabled and worth writing.
fn export_results(
    run: &Run,
    args: &Args,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    if !settings.export {
        return Ok(());
    }

    if !export::should_export(run, args.output.is_some()) {
        tracing::info!("no available or unknown domains, skipping export");
        return Ok(());
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| export::default_export_path(&Local::now()));

    export::write_csv(&path, run)
        .map_err(|e| format!("Failed to write results to '{}': {}", path.display(), e))?;

    if args.json || args.csv {
        eprintln!("Results saved to {}", path.display());
    } else {
        println!();
        println!("  Results saved to {}", path.display());
    }

    Ok(())
}
