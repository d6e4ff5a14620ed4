//! Stage transition policy
//!
//! Stores accept any stage change and only stamp transition dates. Which
//! transitions a user may trigger is decided here and enforced by the CLI,
//! which can bypass the policy with `--force`.

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::{CaseStage, ReportStage};

/// A workflow stage enumeration
pub trait Stage: Copy + Eq + std::hash::Hash + std::fmt::Display + std::fmt::Debug + 'static {
    /// Every stage, in workflow order
    const ALL: &'static [Self];

    /// Stage assigned to newly created records
    fn initial() -> Self;

    /// Stages reachable from this one under the normal policy
    fn allowed_transitions(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    fn is_valid_transition(from: Self, to: Self) -> bool {
        from.allowed_transitions().contains(&to)
    }
}

/// Errors raised when a requested transition breaks the policy
#[derive(Debug, Error, Diagnostic)]
pub enum TransitionError {
    #[error("Stage '{stage}' is terminal; no further transitions are allowed")]
    #[diagnostic(help("use --force to change the stage anyway"))]
    Terminal { stage: String },

    #[error("Invalid stage transition: {from} → {to}")]
    #[diagnostic(help("allowed from {from}: {allowed}; use --force to override"))]
    NotAllowed {
        from: String,
        to: String,
        allowed: String,
    },

    #[error("Record is already in stage '{stage}'")]
    Unchanged { stage: String },
}

/// Check a transition against the policy
pub fn check_transition<S: Stage>(from: S, to: S) -> Result<(), TransitionError> {
    if from == to {
        return Err(TransitionError::Unchanged {
            stage: from.to_string(),
        });
    }
    if from.is_terminal() {
        return Err(TransitionError::Terminal {
            stage: from.to_string(),
        });
    }
    if !S::is_valid_transition(from, to) {
        return Err(TransitionError::NotAllowed {
            from: from.to_string(),
            to: to.to_string(),
            allowed: from
                .allowed_transitions()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(())
}

impl Stage for CaseStage {
    const ALL: &'static [Self] = &[
        CaseStage::Investigation,
        CaseStage::Prosecution,
        CaseStage::Trial,
        CaseStage::Completed,
        CaseStage::Discontinued,
        CaseStage::TemporarilySuspended,
        CaseStage::Transferred,
    ];

    fn initial() -> Self {
        CaseStage::Investigation
    }

    fn allowed_transitions(self) -> &'static [Self] {
        use CaseStage::*;
        match self {
            // Normal forward step first, then the exceptional exits
            Investigation => &[Prosecution, Transferred, TemporarilySuspended, Discontinued],
            Prosecution => &[Trial, Transferred, TemporarilySuspended, Discontinued],
            Trial => &[Completed, Transferred, TemporarilySuspended, Discontinued],
            TemporarilySuspended => &[Transferred, Discontinued],
            Completed | Discontinued | Transferred => &[],
        }
    }
}

impl Stage for ReportStage {
    const ALL: &'static [Self] = &[
        ReportStage::Pending,
        ReportStage::Prosecuted,
        ReportStage::NotProsecuted,
        ReportStage::TemporarilySuspended,
        ReportStage::Transferred,
    ];

    fn initial() -> Self {
        ReportStage::Pending
    }

    fn allowed_transitions(self) -> &'static [Self] {
        use ReportStage::*;
        match self {
            Pending => &[Prosecuted, NotProsecuted, TemporarilySuspended, Transferred],
            Prosecuted | NotProsecuted | TemporarilySuspended | Transferred => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_forward_path() {
        assert!(check_transition(CaseStage::Investigation, CaseStage::Prosecution).is_ok());
        assert!(check_transition(CaseStage::Prosecution, CaseStage::Trial).is_ok());
        assert!(check_transition(CaseStage::Trial, CaseStage::Completed).is_ok());
    }

    #[test]
    fn test_case_skipping_stages_rejected() {
        let err = check_transition(CaseStage::Investigation, CaseStage::Trial).unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { .. }));
        assert!(check_transition(CaseStage::Investigation, CaseStage::Completed).is_err());
        assert!(check_transition(CaseStage::Trial, CaseStage::Prosecution).is_err());
    }

    #[test]
    fn test_case_exceptional_exits_from_active_stages() {
        for from in [CaseStage::Investigation, CaseStage::Prosecution, CaseStage::Trial] {
            for to in [
                CaseStage::Transferred,
                CaseStage::TemporarilySuspended,
                CaseStage::Discontinued,
            ] {
                assert!(check_transition(from, to).is_ok(), "{from} -> {to}");
            }
        }
        assert!(check_transition(CaseStage::TemporarilySuspended, CaseStage::Discontinued).is_ok());
        assert!(check_transition(CaseStage::TemporarilySuspended, CaseStage::Prosecution).is_err());
    }

    #[test]
    fn test_case_terminal_stages() {
        for stage in [CaseStage::Completed, CaseStage::Discontinued, CaseStage::Transferred] {
            assert!(stage.is_terminal());
            assert!(matches!(
                check_transition(stage, CaseStage::Investigation),
                Err(TransitionError::Terminal { .. })
            ));
        }
        assert!(!CaseStage::TemporarilySuspended.is_terminal());
    }

    #[test]
    fn test_same_stage_is_unchanged() {
        assert!(matches!(
            check_transition(CaseStage::Trial, CaseStage::Trial),
            Err(TransitionError::Unchanged { .. })
        ));
    }

    #[test]
    fn test_report_policy() {
        for to in &ReportStage::ALL[1..] {
            assert!(check_transition(ReportStage::Pending, *to).is_ok());
            assert!(to.is_terminal());
        }
        assert_eq!(ReportStage::initial(), ReportStage::Pending);
        assert_eq!(CaseStage::initial(), CaseStage::Investigation);
    }
}
