//! Pharmacogenomic risk worker main executable

pub mod common;
pub mod err;
pub mod kb;
pub mod pgx;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Pharmacogenomic drug risk assessment",
    long_about = "This tool derives star allele diplotypes and metabolizer phenotypes from VCF \
    files and looks up drug risks"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Pharmacogenomics-related commands.
    Pgx(Pgx),
    /// Knowledge base related commands.
    Kb(Kb),
}

/// Parsing of "pgx *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Pgx {
    /// The sub command to run
    #[command(subcommand)]
    command: PgxCommands,
}

/// Enum supporting the parsing of "pgx *" sub commands.
#[derive(Debug, Subcommand)]
enum PgxCommands {
    Assess(pgx::cli::assess::Args),
    Parse(pgx::cli::parse::Args),
}

/// Parsing of "kb *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Kb {
    /// The sub command to run
    #[command(subcommand)]
    command: KbCommands,
}

/// Enum supporting the parsing of "kb *" sub commands.
#[derive(Debug, Subcommand)]
enum KbCommands {
    Check(kb::cli::check::Args),
    Dump(kb::cli::dump::Args),
    Drugs(kb::cli::drugs::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Pgx(pgx) => match &pgx.command {
                PgxCommands::Assess(args) => pgx::cli::assess::run(&cli.common, args)?,
                PgxCommands::Parse(args) => pgx::cli::parse::run(&cli.common, args)?,
            },
            Commands::Kb(kb) => match &kb.command {
                KbCommands::Check(args) => kb::cli::check::run(&cli.common, args)?,
                KbCommands::Dump(args) => kb::cli::dump::run(&cli.common, args)?,
                KbCommands::Drugs(args) => kb::cli::drugs::run(&cli.common, args)?,
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
