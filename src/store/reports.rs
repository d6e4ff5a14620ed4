//! Report Store

use std::rc::Rc;

use crate::core::dates::{Clock, DisplayDate};
use crate::core::deadline::report_is_overdue;
use crate::core::identity::EntityId;
use crate::entities::{Report, ReportDraft, ReportStage};
use crate::storage::Persistence;

use super::{RecordCollection, RecordFilter, StoreError};

pub struct ReportStore {
    reports: RecordCollection<Report>,
}

impl ReportStore {
    pub fn load(persistence: Rc<Persistence>, owner: &str, clock: Rc<dyn Clock>) -> Self {
        Self {
            reports: RecordCollection::load(persistence, owner, clock),
        }
    }

    pub fn today(&self) -> DisplayDate {
        self.reports.today()
    }

    pub fn add(&mut self, draft: ReportDraft) -> &Report {
        let report = Report::from_draft(draft, self.today());
        self.reports.insert(report)
    }

    pub fn update(&mut self, report: Report) -> Result<(), StoreError> {
        self.reports.replace(report)
    }

    pub fn delete(&mut self, id: &EntityId) -> Option<Report> {
        self.reports.remove(id)
    }

    /// Set the stage; `prosecution_date` and `resolution_date` are stamped once
    pub fn transfer_stage(
        &mut self,
        id: &EntityId,
        stage: ReportStage,
    ) -> Result<&Report, StoreError> {
        self.reports.modify(id, |report, today| {
            report.stage = stage;
            if stage == ReportStage::Prosecuted {
                report.prosecution_date.get_or_insert(today);
            } else if stage.is_resolution() {
                report.resolution_date.get_or_insert(today);
            }
            Ok(())
        })
    }

    pub fn get(&self, id: &EntityId) -> Option<&Report> {
        self.reports.get(id)
    }

    pub fn find(&self, query: &str) -> Result<&Report, StoreError> {
        self.reports.find(query)
    }

    pub fn all(&self) -> &[Report] {
        self.reports.all()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn by_stage(&self, stage: ReportStage) -> Vec<&Report> {
        self.reports.by_stage(stage)
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<&Report> {
        self.reports.filter(filter)
    }

    /// Pending reports received at least 30 days ago
    pub fn expiring_soon(&self) -> Vec<&Report> {
        let today = self.today();
        self.reports
            .all()
            .iter()
            .filter(|report| report_is_overdue(report, today))
            .collect()
    }
}
