//! Deadline evaluation for cases and reports
//!
//! Two separate rules apply:
//! - cases look forward: an investigation or detention deadline within
//!   [`WARNING_WINDOW_DAYS`] raises a warning, but only while the case is
//!   still under investigation;
//! - reports look backward: a pending report becomes overdue once
//!   [`REPORT_OVERDUE_DAYS`] have elapsed since it was received.

use serde::Serialize;

use crate::core::dates::{days_between, days_remaining, is_expiring_soon, DisplayDate};
use crate::core::identity::EntityId;
use crate::entities::{Case, CaseStage, Report, ReportStage};

pub use crate::core::dates::WARNING_WINDOW_DAYS;

/// Elapsed days after which a pending report is overdue
pub const REPORT_OVERDUE_DAYS: i64 = 30;

/// A single deadline that needs attention
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeadlineWarning {
    Investigation {
        deadline: DisplayDate,
        days_remaining: i64,
    },
    Detention {
        defendant: EntityId,
        defendant_name: String,
        deadline: DisplayDate,
        days_remaining: i64,
    },
    ReportOverdue {
        report_date: DisplayDate,
        days_elapsed: i64,
    },
}

impl std::fmt::Display for DeadlineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineWarning::Investigation {
                deadline,
                days_remaining,
            } => write!(
                f,
                "investigation deadline {} ({})",
                deadline,
                describe_remaining(*days_remaining)
            ),
            DeadlineWarning::Detention {
                defendant_name,
                deadline,
                days_remaining,
                ..
            } => write!(
                f,
                "detention of {} ends {} ({})",
                defendant_name,
                deadline,
                describe_remaining(*days_remaining)
            ),
            DeadlineWarning::ReportOverdue {
                report_date,
                days_elapsed,
            } => write!(
                f,
                "received {} and still pending after {} days",
                report_date, days_elapsed
            ),
        }
    }
}

fn describe_remaining(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        d if d > 0 => format!("{} days left", d),
        d => format!("{} days overdue", -d),
    }
}

/// Warnings for a case; empty unless the case is under investigation
pub fn case_warnings(case: &Case, today: DisplayDate) -> Vec<DeadlineWarning> {
    if case.stage != CaseStage::Investigation {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    if is_expiring_soon(case.investigation_deadline, today) {
        warnings.push(DeadlineWarning::Investigation {
            deadline: case.investigation_deadline,
            days_remaining: days_remaining(case.investigation_deadline, today),
        });
    }
    for (defendant, deadline) in case.detentions() {
        if is_expiring_soon(deadline, today) {
            warnings.push(DeadlineWarning::Detention {
                defendant: defendant.id.clone(),
                defendant_name: defendant.name.clone(),
                deadline,
                days_remaining: days_remaining(deadline, today),
            });
        }
    }
    warnings
}

/// True if the case is under investigation and any of its deadlines is expiring soon
pub fn case_is_expiring(case: &Case, today: DisplayDate) -> bool {
    case.stage == CaseStage::Investigation
        && (is_expiring_soon(case.investigation_deadline, today)
            || case
                .detentions()
                .any(|(_, deadline)| is_expiring_soon(deadline, today)))
}

/// Days left on the investigation deadline
pub fn investigation_remaining(case: &Case, today: DisplayDate) -> i64 {
    days_remaining(case.investigation_deadline, today)
}

/// Days left on the soonest detention deadline, if anyone is detained
pub fn shortest_detention_remaining(case: &Case, today: DisplayDate) -> Option<i64> {
    case.detentions()
        .map(|(_, deadline)| days_remaining(deadline, today))
        .min()
}

/// Days since the report was received
pub fn report_days_elapsed(report: &Report, today: DisplayDate) -> i64 {
    days_between(report.report_date, today)
}

/// True if the report is pending and was received at least [`REPORT_OVERDUE_DAYS`] ago
pub fn report_is_overdue(report: &Report, today: DisplayDate) -> bool {
    report.stage == ReportStage::Pending && report_days_elapsed(report, today) >= REPORT_OVERDUE_DAYS
}

/// Warnings for a report
pub fn report_warnings(report: &Report, today: DisplayDate) -> Vec<DeadlineWarning> {
    if report_is_overdue(report, today) {
        vec![DeadlineWarning::ReportOverdue {
            report_date: report.report_date,
            days_elapsed: report_days_elapsed(report, today),
        }]
    } else {
        Vec::new()
    }
}

/// Days left until the report's resolution deadline, if one is set
pub fn resolution_remaining(report: &Report, today: DisplayDate) -> Option<i64> {
    report
        .resolution_deadline
        .map(|deadline| days_remaining(deadline, today))
}
