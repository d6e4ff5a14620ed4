//! Stage filters shared by list commands

use clap::ValueEnum;

use crate::entities::{CaseStage, ReportStage};

/// Case stage filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CaseStageFilter {
    Investigation,
    Prosecution,
    Trial,
    Completed,
    Discontinued,
    Suspended,
    Transferred,
    /// Investigation, prosecution, trial or suspended
    Active,
    /// Completed, discontinued or transferred
    Closed,
    #[default]
    All,
}

impl CaseStageFilter {
    pub fn matches(&self, stage: CaseStage) -> bool {
        match self {
            CaseStageFilter::Investigation => stage == CaseStage::Investigation,
            CaseStageFilter::Prosecution => stage == CaseStage::Prosecution,
            CaseStageFilter::Trial => stage == CaseStage::Trial,
            CaseStageFilter::Completed => stage == CaseStage::Completed,
            CaseStageFilter::Discontinued => stage == CaseStage::Discontinued,
            CaseStageFilter::Suspended => stage == CaseStage::TemporarilySuspended,
            CaseStageFilter::Transferred => stage == CaseStage::Transferred,
            CaseStageFilter::Active => !CaseStageFilter::Closed.matches(stage),
            CaseStageFilter::Closed => matches!(
                stage,
                CaseStage::Completed | CaseStage::Discontinued | CaseStage::Transferred
            ),
            CaseStageFilter::All => true,
        }
    }
}

/// Report stage filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportStageFilter {
    Pending,
    Prosecuted,
    NotProsecuted,
    Suspended,
    Transferred,
    /// Any outcome other than pending
    Resolved,
    #[default]
    All,
}

impl ReportStageFilter {
    pub fn matches(&self, stage: ReportStage) -> bool {
        match self {
            ReportStageFilter::Pending => stage == ReportStage::Pending,
            ReportStageFilter::Prosecuted => stage == ReportStage::Prosecuted,
            ReportStageFilter::NotProsecuted => stage == ReportStage::NotProsecuted,
            ReportStageFilter::Suspended => stage == ReportStage::TemporarilySuspended,
            ReportStageFilter::Transferred => stage == ReportStage::Transferred,
            ReportStageFilter::Resolved => stage != ReportStage::Pending,
            ReportStageFilter::All => true,
        }
    }
}
