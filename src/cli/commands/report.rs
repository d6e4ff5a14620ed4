//! `casebook report` command - Crime report management

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::ReportStageFilter;
use crate::cli::helpers::{
    check_stage_change, confirm, open_context, print_success, print_warning, resolve_prosecutor,
};
use crate::cli::output::{print_json, print_table, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::context::AppContext;
use crate::core::dates::DisplayDate;
use crate::core::deadline::{report_days_elapsed, report_warnings, resolution_remaining};
use crate::entities::{Report, ReportDraft, ReportStage};
use crate::export::{default_file_name, report_table, to_tsv, ReportView};
use crate::store::RecordFilter;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Register an incoming crime report
    New(NewArgs),

    /// List reports with filtering
    List(ListArgs),

    /// Show a report's details
    Show(ShowArgs),

    /// Edit report details
    Edit(EditArgs),

    /// Record the decision on a report
    Transfer(TransferArgs),

    /// Prosecute a report and open a case from it
    ToCase(ToCaseArgs),

    /// Delete a report permanently
    Delete(DeleteArgs),

    /// Pending reports received 30 or more days ago
    Expiring,

    /// Export reports as a tab-separated file
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Report name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'c', default_value = "")]
    pub charges: String,

    /// Date received (DD/MM/YYYY, default today)
    #[arg(long, short = 'r')]
    pub received: Option<DisplayDate>,

    /// Resolution deadline (DD/MM/YYYY)
    #[arg(long, short = 'd')]
    pub deadline: Option<DisplayDate>,

    /// Assigned prosecutor (id, id prefix or name)
    #[arg(long, short = 'p')]
    pub prosecutor: Option<String>,

    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by stage
    #[arg(long, short = 's', default_value = "all")]
    pub stage: ReportStageFilter,

    /// Search in name and charges
    #[arg(long)]
    pub search: Option<String>,

    /// Only reports assigned to this prosecutor
    #[arg(long, short = 'p')]
    pub prosecutor: Option<String>,

    /// Column set
    #[arg(long, default_value = "all")]
    pub view: ReportView,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Report id, id prefix or name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Report id, id prefix or name
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub charges: Option<String>,

    /// Date received (DD/MM/YYYY)
    #[arg(long, short = 'r')]
    pub received: Option<DisplayDate>,

    /// Resolution deadline (DD/MM/YYYY)
    #[arg(long, short = 'd', conflicts_with = "no_deadline")]
    pub deadline: Option<DisplayDate>,

    /// Remove the resolution deadline
    #[arg(long)]
    pub no_deadline: bool,

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
    /// Report id, id prefix or name
    pub id: String,

    /// Decision (prosecuted, not-prosecuted, suspended, transferred)
    pub stage: ReportStage,

    /// Allow transitions outside the normal workflow
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct ToCaseArgs {
    /// Report id, id prefix or name
    pub id: String,

    /// Convert even if the report is no longer pending
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Report id, id prefix or name
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Which reports and columns to export
    #[arg(long, default_value = "all")]
    pub view: ReportView,

    /// Output file (default: reports-YYYY-MM-DD.txt in the export directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run a report subcommand
pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = open_context(global);
    match cmd {
        ReportCommands::New(args) => run_new(&mut ctx, args),
        ReportCommands::List(args) => run_list(&ctx, args, global),
        ReportCommands::Show(args) => run_show(&ctx, args, global),
        ReportCommands::Edit(args) => run_edit(&mut ctx, args),
        ReportCommands::Transfer(args) => run_transfer(&mut ctx, args),
        ReportCommands::ToCase(args) => run_to_case(&mut ctx, args),
        ReportCommands::Delete(args) => run_delete(&mut ctx, args),
        ReportCommands::Expiring => run_expiring(&ctx, global),
        ReportCommands::Export(args) => run_export(&ctx, args),
    }
}

fn run_new(ctx: &mut AppContext, args: NewArgs) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(miette::miette!("Report name cannot be empty"));
    }
    let mut draft = ReportDraft::new(args.name, args.received.unwrap_or_else(|| ctx.today()));
    draft.charges = args.charges;
    draft.resolution_deadline = args.deadline;
    draft.prosecutor = resolve_prosecutor(ctx, args.prosecutor.as_deref())?;
    draft.notes = args.notes;

    let report = ctx.reports.add(draft);
    print_success(format!(
        "Created report {} {}",
        style(&report.id).cyan(),
        style(&report.name).yellow()
    ));
    Ok(())
}

fn run_list(ctx: &AppContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let filter = RecordFilter {
        search: args.search,
        prosecutor: resolve_prosecutor(ctx, args.prosecutor.as_deref())?,
    };
    let reports: Vec<&Report> = ctx
        .reports
        .filter(&filter)
        .into_iter()
        .filter(|r| args.stage.matches(r.stage))
        .filter(|r| args.view.includes(r, ctx.today()))
        .collect();

    if args.count {
        println!("{}", reports.len());
        return Ok(());
    }
    if reports.is_empty() {
        print_warning("No reports found.");
        return Ok(());
    }

    let table = report_table(
        reports.iter().copied(),
        args.view,
        &ctx.prosecutors.names(),
        ctx.today(),
    );
    print_table(&table, &reports, global.format)
}

fn run_show(ctx: &AppContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let report = ctx.reports.find(&args.id)?;
    match global.format {
        OutputFormat::Json => return print_json(report),
        OutputFormat::Yaml => return print_yaml(report),
        _ => {}
    }

    let today = ctx.today();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&report.id).cyan());
    println!("{}: {}", style("Report").bold(), style(&report.name).yellow());
    println!("{}: {}", style("Charges").bold(), report.charges);
    println!("{}: {}", style("Status").bold(), report.stage.label());
    println!(
        "{}: {} ({} days ago)",
        style("Received").bold(),
        report.report_date,
        report_days_elapsed(report, today)
    );
    if let Some(deadline) = report.resolution_deadline {
        let remaining = resolution_remaining(report, today).unwrap_or_default();
        println!(
            "{}: {} ({} days)",
            style("Resolution deadline").bold(),
            deadline,
            remaining
        );
    }
    println!(
        "{}: {}",
        style("Prosecutor").bold(),
        ctx.prosecutors.names().display_opt(report.prosecutor.as_ref())
    );
    if let Some(date) = report.prosecution_date {
        println!("{}: {}", style("Prosecuted on").bold(), date);
    }
    if let Some(date) = report.resolution_date {
        println!("{}: {}", style("Resolved on").bold(), date);
    }
    println!("{}: {}", style("Created").bold(), report.created_at);

    for warning in report_warnings(report, today) {
        println!("{} {}", style("!").yellow(), warning);
    }
    if !report.notes.is_empty() {
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", report.notes);
    }
    Ok(())
}

fn run_edit(ctx: &mut AppContext, args: EditArgs) -> Result<()> {
    let mut report = ctx.reports.find(&args.id)?.clone();
    let mut changed = false;

    if let Some(name) = args.name {
        if name.trim().is_empty() {
            return Err(miette::miette!("Report name cannot be empty"));
        }
        report.name = name;
        changed = true;
    }
    if let Some(charges) = args.charges {
        report.charges = charges;
        changed = true;
    }
    if let Some(received) = args.received {
        report.report_date = received;
        changed = true;
    }
    if args.no_deadline {
        report.resolution_deadline = None;
        changed = true;
    } else if let Some(deadline) = args.deadline {
        report.resolution_deadline = Some(deadline);
        changed = true;
    }
    if args.no_prosecutor {
        report.prosecutor = None;
        changed = true;
    } else if let Some(query) = args.prosecutor.as_deref() {
        report.prosecutor = resolve_prosecutor(ctx, Some(query))?;
        changed = true;
    }
    if let Some(notes) = args.notes {
        report.notes = notes;
        changed = true;
    }

    if !changed {
        print_warning("Nothing to change.");
        return Ok(());
    }
    let id = report.id.clone();
    ctx.reports.update(report)?;
    print_success(format!("Updated report {}", style(id).cyan()));
    Ok(())
}

fn run_transfer(ctx: &mut AppContext, args: TransferArgs) -> Result<()> {
    let current = ctx.reports.find(&args.id)?;
    let (id, from) = (current.id.clone(), current.stage);
    check_stage_change(from, args.stage, args.force)?;

    let report = ctx.reports.transfer_stage(&id, args.stage)?;
    print_success(format!(
        "Report {} moved {} → {}",
        style(&report.id).cyan(),
        from.label(),
        style(report.stage.label()).green()
    ));
    Ok(())
}

fn run_to_case(ctx: &mut AppContext, args: ToCaseArgs) -> Result<()> {
    let current = ctx.reports.find(&args.id)?;
    let (id, from) = (current.id.clone(), current.stage);
    if from != ReportStage::Prosecuted {
        check_stage_change(from, ReportStage::Prosecuted, args.force)?;
    } else if !args.force {
        return Err(miette::miette!(
            help = "use --force to open another case from it",
            "Report {} was already prosecuted",
            id
        ));
    }

    let case = ctx.transfer_report_to_case(&id)?;
    print_success(format!(
        "Report {} prosecuted; opened case {} {}",
        style(&id).cyan(),
        style(&case.id).cyan(),
        style(&case.name).yellow()
    ));
    println!(
        "   Investigation deadline set to {}; add defendants with `casebook case defendant add`",
        case.investigation_deadline
    );
    Ok(())
}

fn run_delete(ctx: &mut AppContext, args: DeleteArgs) -> Result<()> {
    let report = ctx.reports.find(&args.id)?;
    let id = report.id.clone();
    if !confirm(&format!("Delete report {} '{}'?", id, report.name), args.yes)? {
        return Ok(());
    }
    match ctx.reports.delete(&id) {
        Some(removed) => print_success(format!(
            "Deleted report {} {}",
            style(&removed.id).cyan(),
            removed.name
        )),
        None => print_warning(format!("Report {} was already gone", id)),
    }
    Ok(())
}

fn run_expiring(ctx: &AppContext, global: &GlobalOpts) -> Result<()> {
    let reports = ctx.reports.expiring_soon();
    if reports.is_empty() {
        println!("No overdue reports.");
        return Ok(());
    }
    let table = report_table(
        reports.iter().copied(),
        ReportView::Expiring,
        &ctx.prosecutors.names(),
        ctx.today(),
    );
    print_table(&table, &reports, global.format)
}

fn run_export(ctx: &AppContext, args: ExportArgs) -> Result<()> {
    let today = ctx.today();
    let table = report_table(ctx.reports.all(), args.view, &ctx.prosecutors.names(), today);
    let payload = to_tsv(&table).into_diagnostic()?;

    let path = args.output.unwrap_or_else(|| {
        ctx.config()
            .export_dir()
            .join(default_file_name("reports", today))
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&path, payload).into_diagnostic()?;

    print_success(format!(
        "Exported {} reports to {}",
        table.rows.len(),
        style(path.display()).cyan()
    ));
    Ok(())
}
