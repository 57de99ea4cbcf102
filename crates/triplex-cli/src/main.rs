//! Triplex CLI
//!
//! Command-line front end for filter scenarios:
//! - `check`: compile a scenario's filter and report build errors
//! - `explain`: print the compiled filter tree
//! - `filter`: scan a scenario's triplets and print the matches

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use triplex_filter::{FilterConfig, InvalidValuePolicy, ScanOutcome, Scenario};

#[derive(Parser)]
#[command(name = "triplex")]
#[command(author, version, about = "Triplex: typed filter trees over triplet matches")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the scenario's filter and report whether it builds.
    Check {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },

    /// Print the compiled filter tree, one node per line.
    Explain {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },

    /// Evaluate the filter against every triplet in the scenario.
    Filter(FilterArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Filter settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip candidates whose stored value fails to parse instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Stop after this many matches
    #[arg(long)]
    limit: Option<usize>,

    /// Emit the scan outcome as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { scenario } => cmd_check(&scenario),
        Commands::Explain { scenario } => cmd_explain(&scenario),
        Commands::Filter(args) => cmd_filter(&args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so `--json` output stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    Scenario::from_path(path).with_context(|| format!("loading scenario {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_check(path: &Path) -> Result<()> {
    let scenario = load_scenario(path)?;
    let tree = scenario
        .compile()
        .with_context(|| format!("compiling filter in {}", path.display()))?;
    println!(
        "{} {} ({} predicates, depth {})",
        "ok".green().bold(),
        path.display().to_string().bold(),
        tree.predicate_count(),
        tree.depth()
    );
    Ok(())
}

fn cmd_explain(path: &Path) -> Result<()> {
    let scenario = load_scenario(path)?;
    let tree = scenario
        .compile()
        .with_context(|| format!("compiling filter in {}", path.display()))?;
    let aliases = &scenario.aliases;
    println!(
        "{} ({})-[{}]->({})",
        "aliases:".bold(),
        aliases.subject,
        aliases.predicate,
        aliases.object
    );
    for line in tree.explain_lines() {
        println!("{line}");
    }
    Ok(())
}

fn cmd_filter(args: &FilterArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let scenario = load_scenario(&args.scenario)?;
    let outcome = scenario
        .run(&config)
        .with_context(|| format!("filtering {}", args.scenario.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &FilterArgs) -> Result<FilterConfig> {
    let mut config = match &args.config {
        Some(path) => FilterConfig::from_path(path)?,
        None => FilterConfig::default(),
    };
    if args.skip_invalid {
        config.on_invalid_value = InvalidValuePolicy::SkipCandidate;
    }
    if args.limit.is_some() {
        config.limit = args.limit;
    }
    Ok(config)
}

fn print_outcome(outcome: &ScanOutcome) {
    for t in &outcome.matches {
        println!(
            "{} {} {} {}",
            "match".green().bold(),
            t.subject,
            t.predicate.dimmed(),
            t.object
        );
    }
    for skipped in &outcome.skipped {
        eprintln!(
            "{} {} {} {}: {}",
            "skipped".yellow().bold(),
            skipped.candidate.subject,
            skipped.candidate.predicate.dimmed(),
            skipped.candidate.object,
            skipped.error
        );
    }
    println!(
        "{} matched, {} skipped, {} examined",
        outcome.matches.len().to_string().bold(),
        outcome.skipped.len(),
        outcome.examined
    );
}
