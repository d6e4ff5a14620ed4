//! `casebook auth` command - Local accounts and sessions

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Password};
use miette::{IntoDiagnostic, Result};

use crate::auth::{Authenticator, LocalAuthenticator};
use crate::cli::helpers::{authenticator, load_config, print_success, print_warning};
use crate::cli::output::{print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Create an account and sign in
    Register {
        /// E-mail address (a bare name becomes name@casebook.local)
        #[arg(long, short = 'e')]
        email: String,

        /// Name shown in the CLI
        #[arg(long, short = 'n', default_value = "")]
        name: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "CASEBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        /// E-mail address
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "CASEBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out; records go back to the shared default scope
    Logout,

    /// Show the signed-in user
    Whoami,
}

pub fn run(cmd: AuthCommands, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let auth = authenticator(&config);
    match cmd {
        AuthCommands::Register {
            email,
            name,
            password,
        } => {
            let secret = match password {
                Some(p) => p,
                None => prompt_secret(true)?,
            };
            let user = auth.register(&email, &name, &secret)?;
            print_success(format!(
                "Registered {} and signed in as {}",
                style(&user.email).cyan(),
                style(&user.display_name).yellow()
            ));
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let secret = match password {
                Some(p) => p,
                None => prompt_secret(false)?,
            };
            let user = auth.sign_in(&email, &secret)?;
            print_success(format!(
                "Signed in as {} ({})",
                style(&user.display_name).yellow(),
                style(&user.email).cyan()
            ));
            Ok(())
        }
        AuthCommands::Logout => {
            if auth.current_user().is_none() {
                print_warning("Not signed in.");
                return Ok(());
            }
            auth.sign_out()?;
            print_success("Signed out");
            Ok(())
        }
        AuthCommands::Whoami => whoami(&auth, global),
    }
}

fn whoami(auth: &LocalAuthenticator, global: &GlobalOpts) -> Result<()> {
    let Some(user) = auth.current_user() else {
        println!("Not signed in (using the shared default scope)");
        return Ok(());
    };
    match global.format {
        OutputFormat::Json => print_json(&user),
        OutputFormat::Yaml => print_yaml(&user),
        _ => {
            println!(
                "{} <{}>  {}",
                style(&user.display_name).yellow(),
                user.email,
                style(&user.id).dim()
            );
            Ok(())
        }
    }
}

/// Prompt for a password; short ones are rejected by `register`
fn prompt_secret(confirm: bool) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().into_diagnostic()
}
