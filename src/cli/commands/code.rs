//! `casebook code` command - Penal Code catalog

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::print_warning;
use crate::cli::output::{print_json, print_table, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::export::Table;
use crate::reference::penal_code;
use crate::reference::Article;

#[derive(Subcommand, Debug)]
pub enum CodeCommands {
    /// List every article in the catalog
    List,

    /// Show one article
    Show {
        /// Article number
        article: u16,
    },

    /// Search by number, title or description
    Search {
        query: String,
    },
}

pub fn run(cmd: CodeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CodeCommands::List => print_articles(&penal_code::all().iter().collect::<Vec<_>>(), global),
        CodeCommands::Search { query } => print_articles(&penal_code::search(&query), global),
        CodeCommands::Show { article } => {
            let found = penal_code::lookup(article).ok_or_else(|| {
                miette::miette!(
                    help = "run `casebook code list` to see the catalog",
                    "Article {} is not in the catalog",
                    article
                )
            })?;
            match global.format {
                OutputFormat::Json => print_json(found),
                OutputFormat::Yaml => print_yaml(found),
                _ => {
                    println!("{}", style(found.display()).bold());
                    println!("{}", found.description);
                    Ok(())
                }
            }
        }
    }
}

fn print_articles(articles: &[&Article], global: &GlobalOpts) -> Result<()> {
    if articles.is_empty() {
        print_warning("No matching articles.");
        return Ok(());
    }
    let table = Table {
        headers: vec!["Article".to_string(), "Title".to_string(), "Description".to_string()],
        rows: articles
            .iter()
            .map(|a| {
                vec![
                    a.article.to_string(),
                    a.title.to_string(),
                    a.description.to_string(),
                ]
            })
            .collect(),
    };
    print_table(&table, articles, global.format)
}
