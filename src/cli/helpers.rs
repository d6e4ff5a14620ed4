//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use std::io::{self, Write};

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::auth::LocalAuthenticator;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::context::AppContext;
use crate::core::identity::EntityId;
use crate::core::workflow::{check_transition, Stage};

/// Load config with the `--data-dir` override applied
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(dir) = &global.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config
}

pub fn authenticator(config: &Config) -> LocalAuthenticator {
    LocalAuthenticator::new(config.resolve_data_dir(None))
}

/// Open the application context for the signed-in user
pub fn open_context(global: &GlobalOpts) -> AppContext {
    let config = load_config(global);
    let auth = authenticator(&config);
    AppContext::open(config, &auth)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Ask for confirmation unless `yes` is set; false means the user declined
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    println!("{}", prompt);
    print!("Proceed? [y/N] ");
    io::stdout().flush().into_diagnostic()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).into_diagnostic()?;
    if input.trim().eq_ignore_ascii_case("y") {
        Ok(true)
    } else {
        println!("Aborted.");
        Ok(false)
    }
}

/// Enforce the stage policy unless `force` is set
pub fn check_stage_change<S: Stage>(from: S, to: S, force: bool) -> Result<()> {
    match check_transition(from, to) {
        Ok(()) => Ok(()),
        Err(e) if force => {
            print_warning(format!("{} (forced)", e));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve an optional prosecutor query to an id
pub fn resolve_prosecutor(ctx: &AppContext, query: Option<&str>) -> Result<Option<EntityId>> {
    match query {
        None => Ok(None),
        Some(q) if q.trim().is_empty() => Ok(None),
        Some(q) => Ok(Some(ctx.prosecutors.resolve(q)?)),
    }
}

pub fn print_success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}

pub fn print_warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CaseStage;

    #[test]
    fn test_truncate_str_counts_chars() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("Nguyễn Văn Bình", 8), "Nguyễ...");
    }

    #[test]
    fn test_confirm_with_yes() {
        assert!(confirm("Delete?", true).unwrap());
    }

    #[test]
    fn test_check_stage_change_force() {
        assert!(check_stage_change(CaseStage::Completed, CaseStage::Trial, false).is_err());
        assert!(check_stage_change(CaseStage::Completed, CaseStage::Trial, true).is_ok());
        assert!(check_stage_change(CaseStage::Investigation, CaseStage::Prosecution, false).is_ok());
    }
}
