//! `casebook case` command - Criminal case management

use std::fs;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::CaseStageFilter;
use crate::cli::helpers::{
    check_stage_change, confirm, open_context, print_success, print_warning, resolve_prosecutor,
};
use crate::cli::output::{print_json, print_table, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::context::AppContext;
use crate::core::dates::DisplayDate;
use crate::core::deadline::{case_warnings, investigation_remaining, shortest_detention_remaining};
use crate::core::identity::EntityId;
use crate::entities::{Case, CaseDraft, CaseStage, DefendantDraft, PreventiveMeasure};
use crate::export::{case_table, default_file_name, to_tsv, CaseView};
use crate::store::RecordFilter;

#[derive(Subcommand, Debug)]
pub enum CaseCommands {
    /// Open a new case under investigation
    New(NewArgs),

    /// List cases with filtering
    List(ListArgs),

    /// Show a case with its defendants and deadline warnings
    Show(ShowArgs),

    /// Edit case details
    Edit(EditArgs),

    /// Move a case to another stage
    Transfer(TransferArgs),

    /// Extend the investigation deadline or a defendant's detention
    Extend(ExtendArgs),

    /// Manage defendants of a case
    #[command(subcommand)]
    Defendant(DefendantCommands),

    /// Delete a case permanently
    Delete(DeleteArgs),

    /// Cases under investigation with a deadline in the next 15 days
    Expiring,

    /// Export cases as a tab-separated file
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Case name (derived from the first defendant when omitted)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Charges (copied from the first defendant when omitted)
    #[arg(long, short = 'c')]
    pub charges: Option<String>,

    /// Investigation deadline (DD/MM/YYYY)
    #[arg(long, short = 'd')]
    pub deadline: Option<DisplayDate>,

    /// Assigned prosecutor (id, id prefix or name)
    #[arg(long, short = 'p')]
    pub prosecutor: Option<String>,

    #[arg(long, default_value = "")]
    pub notes: String,

    /// Defendant as NAME[;CHARGES][;DD/MM/YYYY] (repeatable; a date means detained until then)
    #[arg(long = "defendant", short = 'D')]
    pub defendants: Vec<DefendantDraft>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by stage
    #[arg(long, short = 's', default_value = "all")]
    pub stage: CaseStageFilter,

    /// Search in name, charges and defendants
    #[arg(long)]
    pub search: Option<String>,

    /// Only cases assigned to this prosecutor
    #[arg(long, short = 'p')]
    pub prosecutor: Option<String>,

    /// Column set
    #[arg(long, default_value = "all")]
    pub view: CaseView,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Case id, id prefix or name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Case id, id prefix or name
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub charges: Option<String>,

    /// New investigation deadline (DD/MM/YYYY)
    #[arg(long, short = 'd')]
    pub deadline: Option<DisplayDate>,

    /// Assign a prosecutor (id, id prefix or name)
    #[arg(long, short = 'p', conflicts_with = "no_prosecutor")]
    pub prosecutor: Option<String>,

    /// Remove the assigned prosecutor
    #[arg(long)]
    pub no_prosecutor: bool,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct TransferArgs {
    /// Case id, id prefix or name
    pub id: String,

    /// Target stage (prosecution, trial, completed, discontinued, suspended, transferred)
    pub stage: CaseStage,

    /// Allow transitions outside the normal workflow
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExtendArgs {
    /// Case id, id prefix or name
    pub id: String,

    /// New deadline (DD/MM/YYYY)
    pub until: DisplayDate,

    /// Extend this defendant's detention instead of the investigation
    #[arg(long)]
    pub defendant: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DefendantCommands {
    /// Add a defendant to a case
    Add {
        /// Case id, id prefix or name
        case: String,

        /// NAME[;CHARGES][;DD/MM/YYYY]
        defendant: DefendantDraft,
    },

    /// Remove a defendant from a case
    Remove {
        case: String,

        /// Defendant id, id prefix or exact name
        defendant: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,

        /// Allow removing the case's last defendant
        #[arg(long)]
        force: bool,
    },

    /// Set a defendant's preventive measure
    Measure {
        case: String,

        defendant: String,

        measure: MeasureKind,

        /// Detention deadline (required for `detained`)
        #[arg(long, required_if_eq("measure", "detained"))]
        until: Option<DisplayDate>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MeasureKind {
    AtLarge,
    Detained,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Case id, id prefix or name
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Which cases and columns to export
    #[arg(long, default_value = "all")]
    pub view: CaseView,

    /// Output file (default: cases-YYYY-MM-DD.txt in the export directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run a case subcommand
pub fn run(cmd: CaseCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = open_context(global);
    match cmd {
        CaseCommands::New(args) => run_new(&mut ctx, args),
        CaseCommands::List(args) => run_list(&ctx, args, global),
        CaseCommands::Show(args) => run_show(&ctx, args, global),
        CaseCommands::Edit(args) => run_edit(&mut ctx, args),
        CaseCommands::Transfer(args) => run_transfer(&mut ctx, args),
        CaseCommands::Extend(args) => run_extend(&mut ctx, args),
        CaseCommands::Defendant(cmd) => run_defendant(&mut ctx, cmd),
        CaseCommands::Delete(args) => run_delete(&mut ctx, args),
        CaseCommands::Expiring => run_expiring(&ctx, global),
        CaseCommands::Export(args) => run_export(&ctx, args),
    }
}

fn run_new(ctx: &mut AppContext, args: NewArgs) -> Result<()> {
    let draft = if args.interactive {
        prompt_draft(ctx, args)?
    } else {
        let deadline = args.deadline.ok_or_else(|| {
            miette::miette!("--deadline is required (DD/MM/YYYY), or use --interactive")
        })?;
        let mut draft = CaseDraft::new(args.name.unwrap_or_default(), deadline);
        draft.charges = args.charges.unwrap_or_default();
        draft.prosecutor = resolve_prosecutor(ctx, args.prosecutor.as_deref())?;
        draft.notes = args.notes;
        draft.defendants = args.defendants;
        draft
    };

    if draft.defendants.is_empty() {
        return Err(miette::miette!(
            help = "add one with --defendant \"NAME;CHARGES\"",
            "A new case needs at least one defendant"
        ));
    }
    let draft = draft.with_derived_defaults();

    let case = ctx.cases.add(draft);
    print_success(format!(
        "Created case {} {}",
        style(&case.id).cyan(),
        style(&case.name).yellow()
    ));
    Ok(())
}

fn prompt_draft(ctx: &AppContext, args: NewArgs) -> Result<CaseDraft> {
    let theme = ColorfulTheme::default();

    let name: String = Input::with_theme(&theme)
        .with_prompt("Case name (blank to derive from first defendant)")
        .allow_empty(true)
        .with_initial_text(args.name.unwrap_or_default())
        .interact_text()
        .into_diagnostic()?;

    let charges: String = Input::with_theme(&theme)
        .with_prompt("Charges")
        .allow_empty(true)
        .with_initial_text(args.charges.unwrap_or_default())
        .interact_text()
        .into_diagnostic()?;

    let deadline: DisplayDate = Input::with_theme(&theme)
        .with_prompt("Investigation deadline (DD/MM/YYYY)")
        .interact_text()
        .into_diagnostic()?;

    let prosecutor = select_prosecutor(ctx, &theme)?;

    let notes: String = Input::with_theme(&theme)
        .with_prompt("Notes")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let mut defendants = args.defendants;
    loop {
        let entry: String = Input::with_theme(&theme)
            .with_prompt("Defendant NAME;CHARGES;DD/MM/YYYY (blank to finish)")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        if entry.trim().is_empty() {
            break;
        }
        match entry.parse::<DefendantDraft>() {
            Ok(d) => defendants.push(d),
            Err(e) => print_warning(e),
        }
    }

    let mut draft = CaseDraft::new(name, deadline);
    draft.charges = charges;
    draft.prosecutor = prosecutor;
    draft.notes = notes;
    draft.defendants = defendants;
    Ok(draft)
}

fn select_prosecutor(
    ctx: &AppContext,
    theme: &ColorfulTheme,
) -> Result<Option<EntityId>> {
    let prosecutors = ctx.prosecutors.list();
    if prosecutors.is_empty() {
        return Ok(None);
    }
    let mut items = vec!["(none)".to_string()];
    items.extend(prosecutors.iter().map(|p| format!("{} ({})", p.name, p.title)));
    let selection = Select::with_theme(theme)
        .with_prompt("Prosecutor")
        .items(&items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    Ok(selection
        .checked_sub(1)
        .and_then(|i| prosecutors.get(i))
        .and_then(|p| p.id.clone()))
}

fn run_list(ctx: &AppContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let filter = RecordFilter {
        search: args.search,
        prosecutor: resolve_prosecutor(ctx, args.prosecutor.as_deref())?,
    };
    let cases: Vec<&Case> = ctx
        .cases
        .filter(&filter)
        .into_iter()
        .filter(|c| args.stage.matches(c.stage))
        .filter(|c| args.view.includes(c, ctx.today()))
        .collect();

    if args.count {
        println!("{}", cases.len());
        return Ok(());
    }
    if cases.is_empty() {
        print_warning("No cases found.");
        return Ok(());
    }

    let table = case_table(cases.iter().copied(), args.view, &ctx.prosecutors.names(), ctx.today());
    print_table(&table, &cases, global.format)
}

fn run_show(ctx: &AppContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let case = ctx.cases.find(&args.id)?;
    match global.format {
        OutputFormat::Json => print_json(case),
        OutputFormat::Yaml => print_yaml(case),
        _ => {
            print_case(ctx, case);
            Ok(())
        }
    }
}

fn print_case(ctx: &AppContext, case: &Case) {
    let today = ctx.today();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&case.id).cyan());
    println!("{}: {}", style("Case").bold(), style(&case.name).yellow());
    println!("{}: {}", style("Charges").bold(), case.charges);
    println!("{}: {}", style("Stage").bold(), case.stage.label());
    println!(
        "{}: {} ({} days)",
        style("Investigation deadline").bold(),
        case.investigation_deadline,
        investigation_remaining(case, today)
    );
    println!(
        "{}: {}",
        style("Prosecutor").bold(),
        ctx.prosecutors.names().display_opt(case.prosecutor.as_ref())
    );
    if let Some(date) = case.prosecution_transfer_date {
        println!("{}: {}", style("Sent to prosecution").bold(), date);
    }
    if let Some(date) = case.trial_transfer_date {
        println!("{}: {}", style("Sent to trial").bold(), date);
    }
    println!("{}: {}", style("Created").bold(), case.created_at);
    println!("{}", style("─".repeat(60)).dim());

    println!("{} ({})", style("Defendants").bold(), case.defendants.len());
    for d in &case.defendants {
        println!(
            "  {} {} - {} [{}]",
            style(&d.id).dim(),
            d.name,
            if d.charges.is_empty() { "-" } else { d.charges.as_str() },
            d.measure
        );
    }
    if let Some(days) = shortest_detention_remaining(case, today) {
        println!("  shortest detention: {} days", days);
    }

    let warnings = case_warnings(case, today);
    if !warnings.is_empty() {
        println!("{}", style("─".repeat(60)).dim());
        for w in warnings {
            println!("{} {}", style("!").yellow(), w);
        }
    }
    if !case.notes.is_empty() {
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", case.notes);
    }
}

fn run_edit(ctx: &mut AppContext, args: EditArgs) -> Result<()> {
    let mut case = ctx.cases.find(&args.id)?.clone();
    let mut changed = false;

    if let Some(name) = args.name {
        if name.trim().is_empty() {
            return Err(miette::miette!("Case name cannot be empty"));
        }
        case.name = name;
        changed = true;
    }
    if let Some(charges) = args.charges {
        case.charges = charges;
        changed = true;
    }
    if let Some(deadline) = args.deadline {
        case.investigation_deadline = deadline;
        changed = true;
    }
    if args.no_prosecutor {
        case.prosecutor = None;
        changed = true;
    } else if let Some(query) = args.prosecutor.as_deref() {
        case.prosecutor = resolve_prosecutor(ctx, Some(query))?;
        changed = true;
    }
    if let Some(notes) = args.notes {
        case.notes = notes;
        changed = true;
    }

    if !changed {
        print_warning("Nothing to change.");
        return Ok(());
    }
    let id = case.id.clone();
    ctx.cases.update(case)?;
    print_success(format!("Updated case {}", style(id).cyan()));
    Ok(())
}

fn run_transfer(ctx: &mut AppContext, args: TransferArgs) -> Result<()> {
    let current = ctx.cases.find(&args.id)?;
    let (id, from) = (current.id.clone(), current.stage);
    check_stage_change(from, args.stage, args.force)?;

    let case = ctx.cases.transfer_stage(&id, args.stage)?;
    print_success(format!(
        "Case {} moved {} → {}",
        style(&case.id).cyan(),
        from.label(),
        style(case.stage.label()).green()
    ));
    Ok(())
}

fn run_extend(ctx: &mut AppContext, args: ExtendArgs) -> Result<()> {
    let id = ctx.cases.find(&args.id)?.id.clone();
    match args.defendant {
        Some(defendant) => {
            ctx.cases.extend_detention(&id, &defendant, args.until)?;
            print_success(format!(
                "Detention of {} in case {} extended to {}",
                defendant,
                style(&id).cyan(),
                args.until
            ));
        }
        None => {
            ctx.cases.extend_investigation(&id, args.until)?;
            print_success(format!(
                "Investigation of case {} extended to {}",
                style(&id).cyan(),
                args.until
            ));
        }
    }
    Ok(())
}

fn run_defendant(ctx: &mut AppContext, cmd: DefendantCommands) -> Result<()> {
    match cmd {
        DefendantCommands::Add { case, defendant } => {
            let id = ctx.cases.find(&case)?.id.clone();
            let added = ctx.cases.add_defendant(&id, defendant)?;
            print_success(format!(
                "Added defendant {} {} to case {}",
                style(&added.id).cyan(),
                added.name,
                style(&id).cyan()
            ));
        }
        DefendantCommands::Remove {
            case,
            defendant,
            yes,
            force,
        } => {
            let current = ctx.cases.find(&case)?;
            let (id, last) = (current.id.clone(), current.defendants.len() <= 1);
            if last && !force {
                return Err(miette::miette!(
                    help = "use --force to leave the case without defendants",
                    "Case {} must keep at least one defendant",
                    id
                ));
            }
            if !confirm(
                &format!("Remove defendant '{}' from case {}?", defendant, id),
                yes,
            )? {
                return Ok(());
            }
            let removed = ctx.cases.remove_defendant(&id, &defendant)?;
            print_success(format!(
                "Removed defendant {} from case {}",
                removed.name,
                style(&id).cyan()
            ));
            if last {
                print_warning(format!("Case {} has no defendants left (forced)", id));
            }
        }
        DefendantCommands::Measure {
            case,
            defendant,
            measure,
            until,
        } => {
            let id = ctx.cases.find(&case)?.id.clone();
            let measure = match (measure, until) {
                (MeasureKind::AtLarge, _) => PreventiveMeasure::AtLarge,
                (MeasureKind::Detained, Some(detention_deadline)) => {
                    PreventiveMeasure::Detained { detention_deadline }
                }
                (MeasureKind::Detained, None) => {
                    return Err(miette::miette!("--until is required when detaining"))
                }
            };
            ctx.cases.set_preventive_measure(&id, &defendant, measure)?;
            print_success(format!("{} is now {}", defendant, measure));
        }
    }
    Ok(())
}

fn run_delete(ctx: &mut AppContext, args: DeleteArgs) -> Result<()> {
    let case = ctx.cases.find(&args.id)?;
    let id = case.id.clone();
    if !confirm(&format!("Delete case {} '{}'?", id, case.name), args.yes)? {
        return Ok(());
    }
    match ctx.cases.delete(&id) {
        Some(removed) => print_success(format!(
            "Deleted case {} {}",
            style(&removed.id).cyan(),
            removed.name
        )),
        None => print_warning(format!("Case {} was already gone", id)),
    }
    Ok(())
}

fn run_expiring(ctx: &AppContext, global: &GlobalOpts) -> Result<()> {
    let cases = ctx.cases.expiring_soon();
    if cases.is_empty() {
        println!("No deadlines in the next 15 days.");
        return Ok(());
    }
    let table = case_table(
        cases.iter().copied(),
        CaseView::Expiring,
        &ctx.prosecutors.names(),
        ctx.today(),
    );
    print_table(&table, &cases, global.format)
}

fn run_export(ctx: &AppContext, args: ExportArgs) -> Result<()> {
    let today = ctx.today();
    let table = case_table(ctx.cases.all(), args.view, &ctx.prosecutors.names(), today);
    let payload = to_tsv(&table).into_diagnostic()?;

    let path = args
        .output
        .unwrap_or_else(|| ctx.config().export_dir().join(default_file_name("cases", today)));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&path, payload).into_diagnostic()?;

    print_success(format!(
        "Exported {} cases to {}",
        table.rows.len(),
        style(path.display()).cyan()
    ));
    Ok(())
}
