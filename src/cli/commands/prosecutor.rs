//! `casebook prosecutor` command - Prosecutor directory

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, open_context, print_success, print_warning};
use crate::cli::output::print_table;
use crate::cli::GlobalOpts;
use crate::core::context::AppContext;
use crate::entities::{Prosecutor, ProsecutorPatch};
use crate::export::Table;

#[derive(Subcommand, Debug)]
pub enum ProsecutorCommands {
    /// List prosecutors sorted by name
    List,

    /// Add a prosecutor
    Add(AddArgs),

    /// Edit a prosecutor
    Edit(EditArgs),

    /// Delete a prosecutor
    Delete(DeleteArgs),

    /// Search by name, title or department
    Search {
        /// Search term (blank lists everyone)
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Full name
    pub name: String,

    /// Rank or position
    #[arg(long, short = 't', default_value = "Procurator")]
    pub title: String,

    #[arg(long, short = 'd')]
    pub department: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Prosecutor id, id prefix or name
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd', conflicts_with = "no_department")]
    pub department: Option<String>,

    /// Clear the department
    #[arg(long)]
    pub no_department: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Prosecutor id, id prefix or name
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a prosecutor subcommand
pub fn run(cmd: ProsecutorCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = open_context(global);
    match cmd {
        ProsecutorCommands::List => {
            let all = ctx.prosecutors.try_list()?;
            print_prosecutors(&all, global)
        }
        ProsecutorCommands::Search { query } => {
            print_prosecutors(&ctx.prosecutors.search(&query), global)
        }
        ProsecutorCommands::Add(args) => {
            let mut prosecutor = Prosecutor::new(args.name, args.title);
            prosecutor.department = args.department;
            let added = ctx.prosecutors.add(prosecutor)?;
            print_success(format!(
                "Added prosecutor {} {}",
                style(added.id.as_ref().map(ToString::to_string).unwrap_or_default()).cyan(),
                style(&added.name).yellow()
            ));
            Ok(())
        }
        ProsecutorCommands::Edit(args) => {
            let id = ctx.prosecutors.resolve(&args.id)?;
            let patch = ProsecutorPatch {
                name: args.name,
                title: args.title,
                department: if args.no_department {
                    Some(None)
                } else {
                    args.department.map(Some)
                },
            };
            if patch.is_empty() {
                print_warning("Nothing to change.");
                return Ok(());
            }
            let updated = ctx.prosecutors.update(&id, &patch)?;
            print_success(format!(
                "Updated prosecutor {} {}",
                style(&id).cyan(),
                updated.name
            ));
            Ok(())
        }
        ProsecutorCommands::Delete(args) => run_delete(&ctx, args),
    }
}

fn run_delete(ctx: &AppContext, args: DeleteArgs) -> Result<()> {
    let id = ctx.prosecutors.resolve(&args.id)?;
    let name = ctx.prosecutors.display_name(&id);
    if !confirm(&format!("Delete prosecutor {} '{}'?", id, name), args.yes)? {
        return Ok(());
    }
    let removed = ctx.prosecutors.delete(&id)?;
    print_success(format!("Deleted prosecutor {}", removed.name));

    let references = ctx
        .cases
        .all()
        .iter()
        .filter(|c| c.prosecutor.as_ref() == Some(&id))
        .count()
        + ctx
            .reports
            .all()
            .iter()
            .filter(|r| r.prosecutor.as_ref() == Some(&id))
            .count();
    if references > 0 {
        print_warning(format!(
            "{} records still reference {}; they will show the raw id",
            references, id
        ));
    }
    Ok(())
}

fn print_prosecutors(prosecutors: &[Prosecutor], global: &GlobalOpts) -> Result<()> {
    if prosecutors.is_empty() {
        print_warning("No prosecutors found.");
        return Ok(());
    }
    let table = Table {
        headers: ["ID", "Name", "Title", "Department"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: prosecutors
            .iter()
            .map(|p| {
                vec![
                    p.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                    p.name.clone(),
                    p.title.clone(),
                    p.department.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    };
    print_table(&table, prosecutors, global.format)
}
