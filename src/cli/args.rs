//! Top-level argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::auth::AuthCommands;
use crate::cli::commands::case::CaseCommands;
use crate::cli::commands::code::CodeCommands;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::prosecutor::ProsecutorCommands;
use crate::cli::commands::report::ReportCommands;
use crate::cli::commands::summary::SummaryArgs;
use crate::core::config::HOME_ENV;

/// Casebook - track criminal cases, crime reports and their legal deadlines
#[derive(Parser, Debug)]
#[command(name = "casebook", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding the database, collections, accounts and session
    #[arg(long, global = true, env = HOME_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Verbose logging (debug level on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,
}

/// How command output is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, TSV when piped
    #[default]
    Auto,
    Table,
    Tsv,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register, sign in and out
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Manage criminal cases and their defendants
    #[command(subcommand)]
    Case(CaseCommands),

    /// Manage crime reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Manage the prosecutor directory
    #[command(subcommand)]
    Prosecutor(ProsecutorCommands),

    /// Browse the penal code catalog
    #[command(subcommand)]
    Code(CodeCommands),

    /// Counts per stage and deadlines needing attention
    Summary(SummaryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
