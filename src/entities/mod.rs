//! Entity type definitions

pub mod case;
pub mod prosecutor;
pub mod report;

pub use case::{Case, CaseDraft, CaseStage, Defendant, DefendantDraft, PreventiveMeasure};
pub use prosecutor::{Prosecutor, ProsecutorPatch};
pub use report::{Report, ReportDraft, ReportStage};
