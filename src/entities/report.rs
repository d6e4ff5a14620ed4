//! Report entity type (incoming crime reports awaiting a decision)

use serde::{Deserialize, Serialize};

use crate::core::dates::DisplayDate;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::Stage;
use crate::storage::Collection;

/// Workflow stage of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    #[default]
    Pending,
    Prosecuted,
    NotProsecuted,
    TemporarilySuspended,
    Transferred,
}

impl ReportStage {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStage::Pending => "Pending",
            ReportStage::Prosecuted => "Prosecuted",
            ReportStage::NotProsecuted => "Not prosecuted",
            ReportStage::TemporarilySuspended => "Temporarily suspended",
            ReportStage::Transferred => "Transferred",
        }
    }

    /// Outcomes that close a report without prosecution
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            ReportStage::NotProsecuted | ReportStage::TemporarilySuspended | ReportStage::Transferred
        )
    }
}

impl std::fmt::Display for ReportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStage::Pending => write!(f, "pending"),
            ReportStage::Prosecuted => write!(f, "prosecuted"),
            ReportStage::NotProsecuted => write!(f, "not-prosecuted"),
            ReportStage::TemporarilySuspended => write!(f, "suspended"),
            ReportStage::Transferred => write!(f, "transferred"),
        }
    }
}

impl std::str::FromStr for ReportStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(ReportStage::Pending),
            "prosecuted" => Ok(ReportStage::Prosecuted),
            "not_prosecuted" => Ok(ReportStage::NotProsecuted),
            "suspended" | "temporarily_suspended" => Ok(ReportStage::TemporarilySuspended),
            "transferred" => Ok(ReportStage::Transferred),
            _ => Err(format!("Unknown report stage: {}", s)),
        }
    }
}

/// Report data as entered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub name: String,
    pub charges: String,
    pub report_date: DisplayDate,
    pub resolution_deadline: Option<DisplayDate>,
    pub prosecutor: Option<EntityId>,
    pub notes: String,
}

impl ReportDraft {
    pub fn new(name: impl Into<String>, report_date: DisplayDate) -> Self {
        Self {
            name: name.into(),
            charges: String::new(),
            report_date,
            resolution_deadline: None,
            prosecutor: None,
            notes: String::new(),
        }
    }
}

/// A crime report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: EntityId,

    pub name: String,

    #[serde(default)]
    pub charges: String,

    /// Date the report was received; the overdue rule counts from here
    pub report_date: DisplayDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_deadline: Option<DisplayDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosecutor: Option<EntityId>,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub stage: ReportStage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosecution_date: Option<DisplayDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<DisplayDate>,

    pub created_at: DisplayDate,
}

impl Report {
    pub fn from_draft(draft: ReportDraft, today: DisplayDate) -> Self {
        Self {
            id: EntityId::new(Self::PREFIX),
            name: draft.name,
            charges: draft.charges,
            report_date: draft.report_date,
            resolution_deadline: draft.resolution_deadline,
            prosecutor: draft.prosecutor,
            notes: draft.notes,
            stage: ReportStage::initial(),
            prosecution_date: None,
            resolution_date: None,
            created_at: today,
        }
    }
}

impl Record for Report {
    type Stage = ReportStage;

    const PREFIX: EntityPrefix = EntityPrefix::Rpt;
    const COLLECTION: Collection = Collection::Reports;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> ReportStage {
        self.stage
    }

    fn prosecutor(&self) -> Option<&EntityId> {
        self.prosecutor.as_ref()
    }

    fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.charges.to_lowercase().contains(&term)
    }
}
