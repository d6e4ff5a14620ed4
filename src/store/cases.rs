//! Case Store

use std::rc::Rc;

use crate::core::dates::{Clock, DisplayDate};
use crate::core::deadline::case_is_expiring;
use crate::core::identity::EntityId;
use crate::entities::{Case, CaseDraft, CaseStage, Defendant, DefendantDraft, PreventiveMeasure};
use crate::storage::Persistence;

use super::{RecordCollection, RecordFilter, StoreError};

pub struct CaseStore {
    cases: RecordCollection<Case>,
}

impl CaseStore {
    pub fn load(persistence: Rc<Persistence>, owner: &str, clock: Rc<dyn Clock>) -> Self {
        Self {
            cases: RecordCollection::load(persistence, owner, clock),
        }
    }

    pub fn today(&self) -> DisplayDate {
        self.cases.today()
    }

    /// Create a case in `Investigation` with fresh ids for it and its defendants
    pub fn add(&mut self, draft: CaseDraft) -> &Case {
        let case = Case::from_draft(draft, self.today());
        self.cases.insert(case)
    }

    /// Replace a case wholesale
    pub fn update(&mut self, case: Case) -> Result<(), StoreError> {
        self.cases.replace(case)
    }

    pub fn delete(&mut self, id: &EntityId) -> Option<Case> {
        self.cases.remove(id)
    }

    /// Set the stage, stamping transfer dates the first time a stage is entered
    ///
    /// No policy is checked here; see [`crate::core::workflow`].
    pub fn transfer_stage(&mut self, id: &EntityId, stage: CaseStage) -> Result<&Case, StoreError> {
        self.cases.modify(id, |case, today| {
            case.stage = stage;
            match stage {
                CaseStage::Prosecution => {
                    case.prosecution_transfer_date.get_or_insert(today);
                }
                CaseStage::Trial => {
                    case.trial_transfer_date.get_or_insert(today);
                }
                _ => {}
            }
            Ok(())
        })
    }

    pub fn get(&self, id: &EntityId) -> Option<&Case> {
        self.cases.get(id)
    }

    pub fn find(&self, query: &str) -> Result<&Case, StoreError> {
        self.cases.find(query)
    }

    pub fn all(&self) -> &[Case] {
        self.cases.all()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn by_stage(&self, stage: CaseStage) -> Vec<&Case> {
        self.cases.by_stage(stage)
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<&Case> {
        self.cases.filter(filter)
    }

    /// Cases under investigation with an investigation or detention deadline
    /// inside the warning window
    pub fn expiring_soon(&self) -> Vec<&Case> {
        let today = self.today();
        self.cases
            .all()
            .iter()
            .filter(|case| case_is_expiring(case, today))
            .collect()
    }

    pub fn extend_investigation(
        &mut self,
        id: &EntityId,
        deadline: DisplayDate,
    ) -> Result<&Case, StoreError> {
        self.cases.modify(id, |case, _| {
            case.investigation_deadline = deadline;
            Ok(())
        })
    }

    /// Move a detained defendant's deadline; an at-large defendant becomes detained
    pub fn extend_detention(
        &mut self,
        case_id: &EntityId,
        defendant: &str,
        deadline: DisplayDate,
    ) -> Result<&Case, StoreError> {
        self.set_preventive_measure(
            case_id,
            defendant,
            PreventiveMeasure::Detained {
                detention_deadline: deadline,
            },
        )
    }

    pub fn set_preventive_measure(
        &mut self,
        case_id: &EntityId,
        defendant: &str,
        measure: PreventiveMeasure,
    ) -> Result<&Case, StoreError> {
        self.cases.modify(case_id, |case, _| {
            let target = locate_defendant(case, defendant)?;
            match measure {
                PreventiveMeasure::AtLarge => target.set_at_large(),
                PreventiveMeasure::Detained { detention_deadline } => {
                    target.detain(detention_deadline)
                }
            }
            Ok(())
        })
    }

    pub fn add_defendant(
        &mut self,
        case_id: &EntityId,
        draft: DefendantDraft,
    ) -> Result<&Defendant, StoreError> {
        let case = self.cases.modify(case_id, |case, _| {
            case.defendants.push(draft.into_defendant());
            Ok(())
        })?;
        case.defendants
            .last()
            .ok_or_else(|| StoreError::DefendantNotFound {
                case: case_id.to_string(),
                query: String::new(),
            })
    }

    pub fn remove_defendant(
        &mut self,
        case_id: &EntityId,
        defendant: &str,
    ) -> Result<Defendant, StoreError> {
        let mut removed = None;
        self.cases.modify(case_id, |case, _| {
            let id = locate_defendant(case, defendant)?.id.clone();
            case.defendants.retain(|d| {
                if d.id == id {
                    removed = Some(d.clone());
                    false
                } else {
                    true
                }
            });
            Ok(())
        })?;
        removed.ok_or_else(|| StoreError::DefendantNotFound {
            case: case_id.to_string(),
            query: defendant.to_string(),
        })
    }
}

fn locate_defendant<'a>(case: &'a mut Case, query: &str) -> Result<&'a mut Defendant, StoreError> {
    let case_id = case.id.to_string();
    case.defendant_mut(query)
        .ok_or_else(|| StoreError::DefendantNotFound {
            case: case_id,
            query: query.to_string(),
        })
}
