//! Table views and TSV export
//!
//! A view picks which records are shown and which columns they get. The same
//! [`Table`] feeds the terminal renderer and the spreadsheet export.

use clap::ValueEnum;
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::core::dates::DisplayDate;
use crate::core::deadline::{
    case_is_expiring, investigation_remaining, report_days_elapsed, report_is_overdue,
    shortest_detention_remaining,
};
use crate::entities::{Case, CaseStage, Report, ReportStage};
use crate::reference::NameIndex;

/// UTF-8 byte order mark, so spreadsheet tools pick the right encoding
pub const BOM: &str = "\u{FEFF}";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Header row plus rendered cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which subset of cases a table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CaseView {
    #[default]
    All,
    Investigation,
    Prosecution,
    Trial,
    /// Cases under investigation with a deadline inside the warning window
    Expiring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseColumn {
    Id,
    Name,
    Charges,
    InvestigationDeadline,
    TotalDefendants,
    ShortestDetention,
    Prosecutor,
    Notes,
    Stage,
    ProsecutionTransferDate,
    TrialTransferDate,
    InvestigationRemaining,
    ShortestDetentionRemaining,
}

impl CaseColumn {
    pub fn header(&self) -> &'static str {
        match self {
            CaseColumn::Id => "ID",
            CaseColumn::Name => "Case",
            CaseColumn::Charges => "Charges",
            CaseColumn::InvestigationDeadline => "Investigation deadline",
            CaseColumn::TotalDefendants => "Defendants",
            CaseColumn::ShortestDetention => "Shortest detention",
            CaseColumn::Prosecutor => "Prosecutor",
            CaseColumn::Notes => "Notes",
            CaseColumn::Stage => "Stage",
            CaseColumn::ProsecutionTransferDate => "Sent to prosecution",
            CaseColumn::TrialTransferDate => "Sent to trial",
            CaseColumn::InvestigationRemaining => "Investigation remaining",
            CaseColumn::ShortestDetentionRemaining => "Detention remaining",
        }
    }
}

impl CaseView {
    pub fn columns(&self) -> &'static [CaseColumn] {
        use CaseColumn::*;
        match self {
            CaseView::All => &[
                Id,
                Name,
                Charges,
                InvestigationDeadline,
                TotalDefendants,
                ShortestDetention,
                Prosecutor,
                Notes,
                Stage,
                ProsecutionTransferDate,
                TrialTransferDate,
            ],
            CaseView::Investigation => &[
                Id,
                Name,
                InvestigationDeadline,
                TotalDefendants,
                ShortestDetention,
                Prosecutor,
                Notes,
            ],
            CaseView::Prosecution => &[
                Id,
                Name,
                TotalDefendants,
                ShortestDetention,
                Prosecutor,
                Notes,
                ProsecutionTransferDate,
            ],
            CaseView::Trial => &[
                Id,
                Name,
                TotalDefendants,
                ShortestDetention,
                Prosecutor,
                Notes,
                TrialTransferDate,
            ],
            CaseView::Expiring => &[
                Id,
                Name,
                Stage,
                InvestigationRemaining,
                TotalDefendants,
                ShortestDetentionRemaining,
                Prosecutor,
                Notes,
            ],
        }
    }

    /// True if the case belongs in this view
    pub fn includes(&self, case: &Case, today: DisplayDate) -> bool {
        match self {
            CaseView::All => true,
            CaseView::Investigation => case.stage == CaseStage::Investigation,
            CaseView::Prosecution => case.stage == CaseStage::Prosecution,
            CaseView::Trial => case.stage == CaseStage::Trial,
            CaseView::Expiring => case_is_expiring(case, today),
        }
    }
}

/// Which subset of reports a table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportView {
    #[default]
    All,
    Pending,
    /// Pending reports past the overdue threshold
    Expiring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumn {
    Id,
    Name,
    Charges,
    ReportDate,
    DaysElapsed,
    ResolutionDeadline,
    Prosecutor,
    Notes,
    Stage,
}

impl ReportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            ReportColumn::Id => "ID",
            ReportColumn::Name => "Report",
            ReportColumn::Charges => "Charges",
            ReportColumn::ReportDate => "Received",
            ReportColumn::DaysElapsed => "Days pending",
            ReportColumn::ResolutionDeadline => "Resolution deadline",
            ReportColumn::Prosecutor => "Prosecutor",
            ReportColumn::Notes => "Notes",
            ReportColumn::Stage => "Status",
        }
    }
}

impl ReportView {
    pub fn columns(&self) -> &'static [ReportColumn] {
        use ReportColumn::*;
        match self {
            ReportView::All => &[
                Id,
                Name,
                Charges,
                ReportDate,
                ResolutionDeadline,
                Prosecutor,
                Notes,
                Stage,
            ],
            ReportView::Pending => &[
                Id,
                Name,
                Charges,
                ReportDate,
                ResolutionDeadline,
                Prosecutor,
                Notes,
            ],
            ReportView::Expiring => &[
                Id,
                Name,
                Charges,
                ReportDate,
                DaysElapsed,
                ResolutionDeadline,
                Prosecutor,
                Notes,
            ],
        }
    }

    pub fn includes(&self, report: &Report, today: DisplayDate) -> bool {
        match self {
            ReportView::All => true,
            ReportView::Pending => report.stage == ReportStage::Pending,
            ReportView::Expiring => report_is_overdue(report, today),
        }
    }
}

fn days(n: i64) -> String {
    format!("{} days", n)
}

fn opt_date(date: Option<DisplayDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn detention_cell(case: &Case, today: DisplayDate) -> String {
    shortest_detention_remaining(case, today)
        .map(days)
        .unwrap_or_else(|| "None".to_string())
}

fn case_cell(case: &Case, column: CaseColumn, names: &NameIndex, today: DisplayDate) -> String {
    match column {
        CaseColumn::Id => case.id.to_string(),
        CaseColumn::Name => case.name.clone(),
        CaseColumn::Charges => case.charges.clone(),
        CaseColumn::InvestigationDeadline => case.investigation_deadline.to_string(),
        CaseColumn::TotalDefendants => case.defendants.len().to_string(),
        CaseColumn::ShortestDetention | CaseColumn::ShortestDetentionRemaining => {
            detention_cell(case, today)
        }
        CaseColumn::Prosecutor => names.display_opt(case.prosecutor.as_ref()),
        CaseColumn::Notes => case.notes.clone(),
        CaseColumn::Stage => case.stage.label().to_string(),
        CaseColumn::ProsecutionTransferDate => opt_date(case.prosecution_transfer_date),
        CaseColumn::TrialTransferDate => opt_date(case.trial_transfer_date),
        CaseColumn::InvestigationRemaining => days(investigation_remaining(case, today)),
    }
}

fn report_cell(
    report: &Report,
    column: ReportColumn,
    names: &NameIndex,
    today: DisplayDate,
) -> String {
    match column {
        ReportColumn::Id => report.id.to_string(),
        ReportColumn::Name => report.name.clone(),
        ReportColumn::Charges => report.charges.clone(),
        ReportColumn::ReportDate => report.report_date.to_string(),
        ReportColumn::DaysElapsed => days(report_days_elapsed(report, today)),
        ReportColumn::ResolutionDeadline => opt_date(report.resolution_deadline),
        ReportColumn::Prosecutor => names.display_opt(report.prosecutor.as_ref()),
        ReportColumn::Notes => report.notes.clone(),
        ReportColumn::Stage => report.stage.label().to_string(),
    }
}

/// Build the table for `view` from the given cases, keeping their order
pub fn case_table<'a>(
    cases: impl IntoIterator<Item = &'a Case>,
    view: CaseView,
    names: &NameIndex,
    today: DisplayDate,
) -> Table {
    let columns = view.columns();
    Table {
        headers: columns.iter().map(|c| c.header().to_string()).collect(),
        rows: cases
            .into_iter()
            .filter(|case| view.includes(case, today))
            .map(|case| {
                columns
                    .iter()
                    .map(|col| case_cell(case, *col, names, today))
                    .collect()
            })
            .collect(),
    }
}

pub fn report_table<'a>(
    reports: impl IntoIterator<Item = &'a Report>,
    view: ReportView,
    names: &NameIndex,
    today: DisplayDate,
) -> Table {
    let columns = view.columns();
    Table {
        headers: columns.iter().map(|c| c.header().to_string()).collect(),
        rows: reports
            .into_iter()
            .filter(|report| view.includes(report, today))
            .map(|report| {
                columns
                    .iter()
                    .map(|col| report_cell(report, *col, names, today))
                    .collect()
            })
            .collect(),
    }
}

/// Tab-separated, BOM-prefixed payload with `\n` line endings
pub fn to_tsv(table: &Table) -> Result<String, ExportError> {
    Ok(format!("{}{}", BOM, tsv_body(table)?))
}

/// Tab-separated rows without the BOM, for piping to other tools
pub fn tsv_body(table: &Table) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Default export file name, e.g. `cases-2026-10-17.txt`
pub fn default_file_name(collection: &str, today: DisplayDate) -> String {
    format!("{}-{}.txt", collection, today.iso())
}
