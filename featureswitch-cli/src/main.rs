//! featureswitch CLI - Feature set inspection and static feature stripping.
//!
//! # Commands
//!
//! - `featureswitch strip --features <file> <paths>...` - Remove disabled feature blocks
//! - `featureswitch features <file>` - Print the normalized feature set

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use featureswitch_strip::Dialect;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod error;

use commands::{features, strip};
use error::CliResult;

/// featureswitch - static and runtime feature switches
#[derive(Parser)]
#[command(name = "featureswitch")]
#[command(version)]
#[command(about = "Inspect feature sets and strip disabled feature blocks from source files")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} featureswitch features features.toml\n  {} featureswitch strip --features features.json --out-dir dist src\n  {} featureswitch strip --features features.json app.js > app.stripped.js",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the blocks of disabled features from source files
    #[command(alias = "s")]
    Strip(StripArgs),

    /// Print the normalized feature set as JSON
    #[command(alias = "f")]
    Features(FeaturesArgs),
}

#[derive(Args)]
struct StripArgs {
    /// Feature file (JSON, TOML or .env)
    #[arg(short, long)]
    features: PathBuf,

    /// Strip options file (JSON or TOML)
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// File extensions to process when walking directories
    #[arg(long, value_delimiter = ',', default_values_t = strip::default_extensions())]
    ext: Vec<String>,

    /// Write results under this directory, mirroring the input layout
    #[arg(long, conflicts_with = "in_place")]
    out_dir: Option<PathBuf>,

    /// Overwrite input files
    #[arg(long)]
    in_place: bool,

    /// Skip a block dialect (html_comments, html_elements, html_attributes, star_comments, slash_comments)
    #[arg(long, value_delimiter = ',', value_parser = parse_dialect)]
    disable: Vec<Dialect>,

    /// Replacement template for every dialect; ${FEATURE} is the feature name
    #[arg(long)]
    replace: Option<String>,

    /// Overlay features from environment variables with this prefix
    #[arg(long, env = "FEATURESWITCH_ENV_PREFIX")]
    env_prefix: Option<String>,

    /// Files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Args)]
struct FeaturesArgs {
    /// Feature file (JSON, TOML or .env)
    file: PathBuf,

    /// Overlay features from environment variables with this prefix
    #[arg(long, env = "FEATURESWITCH_ENV_PREFIX")]
    env_prefix: Option<String>,
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    s.parse().map_err(|e: featureswitch_strip::StripError| e.to_string())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, cli.quiet);

    let result: CliResult<()> = match cli.command {
        Commands::Strip(args) => strip::run(strip::StripCommand {
            features: args.features,
            options: args.options,
            extensions: args.ext,
            out_dir: args.out_dir,
            in_place: args.in_place,
            disable: args.disable,
            replace: args.replace,
            env_prefix: args.env_prefix,
            paths: args.paths,
            quiet: cli.quiet,
        }),
        Commands::Features(args) => features::run(&args.file, args.env_prefix.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
