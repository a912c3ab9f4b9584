use clap::Parser;
use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

mod analysis;
mod archive;
mod classfile;
mod config;
mod extract;
mod graph;
mod report;
mod scan;

use config::Config;
use scan::{CancelToken, ScanOptions, Scanner};

/// jardeps - static dependency and usage analysis for JVM class archives
#[derive(Parser, Debug)]
#[command(name = "jardeps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the jar/zip archive to analyze
    archive: PathBuf,

    /// Package prefix limiting the analysis scope (e.g. "com.example")
    #[arg(short, long)]
    package: Option<String>,

    /// Target classes for usage analysis (can be specified multiple
    /// times; defaults to every class in scope)
    #[arg(short, long)]
    target: Vec<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entry-name fragments to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full per-class dependency listing
    #[arg(long)]
    show_deps: bool,

    /// Parse entries one at a time instead of on the worker pool
    #[arg(long)]
    sequential: bool,

    /// Overall scan deadline in seconds; partial results are reported
    /// when it passes
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("jardeps v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run_scan(&config, &cli)?;

    Ok(())
}

fn run_scan(config: &Config, cli: &Cli) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let start_time = Instant::now();

    let options = ScanOptions {
        sequential: config.scan.sequential,
        cancel: match config.scan.timeout_secs {
            Some(secs) => CancelToken::with_deadline(Instant::now() + Duration::from_secs(secs)),
            None => CancelToken::none(),
        },
        targets: None,
    };

    let spinner = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("Scanning {}...", cli.archive.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };

    let scanner = Scanner::new(config.clone());
    let result = scanner.scan_with(&cli.archive, &options);
    spinner.finish_and_clear();

    let report = result.map_err(|e| miette::miette!("{}", e))?;

    let reporter = report::Reporter::new(cli.format.clone().into(), cli.output.clone())
        .with_dependencies(cli.show_deps || config.report.show_dependencies);
    reporter.report(&report)?;

    let elapsed = start_time.elapsed();
    if !cli.quiet {
        println!(
            "{}",
            format!(
                "Analyzed {} classes in {:.2}s",
                report.parsed_units,
                elapsed.as_secs_f64()
            )
            .dimmed()
        );
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations()?
    };

    // CLI arguments override the file
    if cli.package.is_some() {
        config.package_prefix = cli.package.clone();
    }
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if cli.sequential {
        config.scan.sequential = true;
    }
    if cli.timeout.is_some() {
        config.scan.timeout_secs = cli.timeout;
    }

    Ok(config)
}
