//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod filters;
pub mod helpers;
pub mod output;

use miette::Result;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
pub use filters::{CaseStageFilter, ReportStageFilter};

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Auth(cmd) => commands::auth::run(cmd, &global),
        Commands::Case(cmd) => commands::case::run(cmd, &global),
        Commands::Report(cmd) => commands::report::run(cmd, &global),
        Commands::Prosecutor(cmd) => commands::prosecutor::run(cmd, &global),
        Commands::Code(cmd) => commands::code::run(cmd, &global),
        Commands::Summary(args) => commands::summary::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
