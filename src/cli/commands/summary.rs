//! `casebook summary` command - Counts and deadlines at a glance

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::open_context;
use crate::cli::output::{print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::context::AppContext;
use crate::core::deadline::{case_warnings, report_warnings, DeadlineWarning};
use crate::core::identity::EntityId;
use crate::core::workflow::Stage;
use crate::entities::{CaseStage, ReportStage};

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Only print the deadline warnings
    #[arg(long)]
    pub warnings_only: bool,
}

#[derive(Debug, Serialize)]
struct StageCount {
    stage: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RecordWarning {
    id: EntityId,
    name: String,
    #[serde(flatten)]
    warning: DeadlineWarning,
}

#[derive(Debug, Serialize)]
struct Summary {
    owner: String,
    today: String,
    cases: Vec<StageCount>,
    reports: Vec<StageCount>,
    warnings: Vec<RecordWarning>,
}

fn build(ctx: &AppContext) -> Summary {
    let today = ctx.today();
    let cases = CaseStage::ALL
        .iter()
        .map(|s| StageCount {
            stage: s.label().to_string(),
            count: ctx.cases.by_stage(*s).len(),
        })
        .collect();
    let reports = ReportStage::ALL
        .iter()
        .map(|s| StageCount {
            stage: s.label().to_string(),
            count: ctx.reports.by_stage(*s).len(),
        })
        .collect();

    let mut warnings = Vec::new();
    for case in ctx.cases.expiring_soon() {
        for warning in case_warnings(case, today) {
            warnings.push(RecordWarning {
                id: case.id.clone(),
                name: case.name.clone(),
                warning,
            });
        }
    }
    for report in ctx.reports.expiring_soon() {
        for warning in report_warnings(report, today) {
            warnings.push(RecordWarning {
                id: report.id.clone(),
                name: report.name.clone(),
                warning,
            });
        }
    }

    Summary {
        owner: ctx
            .user()
            .map(|u| u.email.clone())
            .unwrap_or_else(|| ctx.owner().to_string()),
        today: today.to_string(),
        cases,
        reports,
        warnings,
    }
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = open_context(global);
    let summary = build(&ctx);

    match global.format {
        OutputFormat::Json => return print_json(&summary),
        OutputFormat::Yaml => return print_yaml(&summary),
        _ => {}
    }

    if !args.warnings_only {
        println!(
            "{} {}  {}",
            style("Casebook").bold(),
            style(&summary.owner).cyan(),
            style(&summary.today).dim()
        );
        println!("{}", style("─".repeat(60)).dim());
        print_counts("Cases", &summary.cases);
        print_counts("Reports", &summary.reports);
        println!("{}", style("─".repeat(60)).dim());
    }

    if summary.warnings.is_empty() {
        println!("{} No deadlines need attention", style("✓").green());
    } else {
        for w in &summary.warnings {
            println!(
                "{} {} {}: {}",
                style("!").yellow(),
                style(&w.id).cyan(),
                w.name,
                w.warning
            );
        }
    }
    Ok(())
}

fn print_counts(title: &str, counts: &[StageCount]) {
    let total: usize = counts.iter().map(|c| c.count).sum();
    println!("{} ({})", style(title).bold(), total);
    for c in counts.iter().filter(|c| c.count > 0) {
        println!("  {:<24} {}", c.stage, c.count);
    }
}
