//! Sheaf CLI: compile stylesheet bundles and serve them with HTTP caching.
//!
//! Provides `sheaf serve` to run the HTTP server, `sheaf build` to compile a
//! single bundle through the cache, and `sheaf status` to report each
//! bundle's fingerprint and staleness.

#![warn(missing_docs)]

mod build;
mod logging;
mod pipeline;
mod serve;
mod status;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Sheaf: cached stylesheet compilation over HTTP.
#[derive(Parser, Debug)]
#[command(name = "sheaf", version, about = "Cached stylesheet compiler and server")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `sheaf.toml`. Defaults to the nearest one above the
    /// current directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve every configured bundle over HTTP.
    Serve(ServeArgs),
    /// Compile one bundle and write the stylesheet out.
    Build(BuildArgs),
    /// Show fingerprint, artifact path and staleness of every bundle.
    Status(StatusArgs),
}

/// Arguments for the `sheaf serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding `[server].bind`.
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for the `sheaf build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Bundle name from `sheaf.toml`.
    pub bundle: String,

    /// Output file. Writes to stdout if omitted.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `sheaf status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    logging::init(&global);

    let result = match cli.command {
        Command::Serve(ref args) => serve::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
