//! Library-level store properties, run against an in-memory context

use std::collections::HashSet;
use std::rc::Rc;

use casebook::core::dates::{add_days, days_between, DisplayDate, FixedClock};
use casebook::core::identity::{EntityId, EntityPrefix};
use casebook::core::{AppContext, Config};
use casebook::entities::{
    CaseDraft, CaseStage, DefendantDraft, PreventiveMeasure, Prosecutor, ReportDraft, ReportStage,
};
use casebook::reference::StoredProsecutors;
use casebook::storage::{Backend, JsonFileBackend, Persistence, SqliteBackend};
use tempfile::TempDir;

fn today() -> DisplayDate {
    "17/10/2026".parse().unwrap()
}

fn draft(deadline_in: i64) -> CaseDraft {
    let mut draft = CaseDraft::new("Case", add_days(today(), deadline_in));
    draft.defendants.push(DefendantDraft {
        name: "Defendant".to_string(),
        ..Default::default()
    });
    draft
}

#[test]
fn test_prosecution_date_stamped_once() {
    let mut ctx = AppContext::in_memory(today());
    let id = ctx.cases.add(draft(60)).id.clone();

    ctx.cases.transfer_stage(&id, CaseStage::Prosecution).unwrap();
    let first = ctx.cases.get(&id).unwrap().prosecution_transfer_date;
    assert_eq!(first, Some(today()));

    ctx.cases.transfer_stage(&id, CaseStage::Investigation).unwrap();
    ctx.cases.transfer_stage(&id, CaseStage::Prosecution).unwrap();
    assert_eq!(ctx.cases.get(&id).unwrap().prosecution_transfer_date, first);
}

#[test]
fn test_at_large_clears_detention() {
    let mut ctx = AppContext::in_memory(today());
    let mut d = draft(60);
    d.defendants[0].measure = PreventiveMeasure::Detained {
        detention_deadline: add_days(today(), 5),
    };
    let case = ctx.cases.add(d).clone();
    let defendant = case.defendants[0].id.to_string();

    ctx.cases
        .set_preventive_measure(&case.id, &defendant, PreventiveMeasure::AtLarge)
        .unwrap();
    let stored = ctx.cases.get(&case.id).unwrap();
    assert_eq!(stored.defendants[0].detention_deadline(), None);
    assert_eq!(stored.detentions().count(), 0);
}

#[test]
fn test_expiring_only_under_investigation() {
    let mut ctx = AppContext::in_memory(today());
    for stage in [
        CaseStage::Prosecution,
        CaseStage::Trial,
        CaseStage::Completed,
        CaseStage::TemporarilySuspended,
    ] {
        let id = ctx.cases.add(draft(-10)).id.clone();
        ctx.cases.transfer_stage(&id, stage).unwrap();
    }
    assert!(ctx.cases.expiring_soon().is_empty());

    ctx.cases.add(draft(-10));
    assert_eq!(ctx.cases.expiring_soon().len(), 1);
}

#[test]
fn test_days_between_antisymmetric() {
    for offset in [-400, -31, -1, 0, 1, 15, 366] {
        let other = add_days(today(), offset);
        assert_eq!(days_between(today(), other), -days_between(other, today()));
    }
}

#[test]
fn test_added_cases_have_distinct_ids() {
    let mut ctx = AppContext::in_memory(today());
    let mut seen = HashSet::new();
    for _ in 0..50 {
        let id = ctx.cases.add(draft(60)).id.clone();
        assert!(!id.to_string().is_empty());
        assert!(seen.insert(id.clone()));
        let matching: Vec<_> = ctx
            .cases
            .by_stage(CaseStage::Investigation)
            .into_iter()
            .filter(|c| c.id == id)
            .collect();
        assert_eq!(matching.len(), 1);
    }
}

#[test]
fn test_investigation_window_boundaries() {
    let mut ctx = AppContext::in_memory(today());
    let soon = ctx.cases.add(draft(10)).id.clone();
    ctx.cases.add(draft(20));
    let expiring: Vec<_> = ctx.cases.expiring_soon().iter().map(|c| c.id.clone()).collect();
    assert_eq!(expiring, vec![soon]);
}

#[test]
fn test_report_overdue_rule() {
    let mut ctx = AppContext::in_memory(today());
    let old = ctx
        .reports
        .add(ReportDraft::new("Old", add_days(today(), -31)))
        .id
        .clone();
    assert_eq!(ctx.reports.expiring_soon().len(), 1);

    ctx.reports.transfer_stage(&old, ReportStage::Prosecuted).unwrap();
    assert!(ctx.reports.expiring_soon().is_empty());
}

#[test]
fn test_delete_unknown_case() {
    let mut ctx = AppContext::in_memory(today());
    ctx.cases.add(draft(60));
    let before = ctx.cases.len();
    assert!(ctx.cases.delete(&EntityId::new(EntityPrefix::Case)).is_none());
    assert_eq!(ctx.cases.len(), before);
}

#[test]
fn test_report_to_case_payload() {
    let mut ctx = AppContext::in_memory(today());
    let p1 = ctx
        .prosecutors
        .add(Prosecutor::new("P1", "Procurator"))
        .unwrap()
        .id
        .unwrap();
    let mut report = ReportDraft::new("N", add_days(today(), -3));
    report.charges = "C".to_string();
    report.prosecutor = Some(p1.clone());
    let id = ctx.reports.add(report).id.clone();

    let case = ctx.transfer_report_to_case(&id).unwrap().clone();
    assert_eq!(case.name, "N");
    assert_eq!(case.charges, "C");
    assert_eq!(case.prosecutor, Some(p1));
    assert!(case.defendants.is_empty());
    assert_eq!(case.investigation_deadline, today());
}

#[test]
fn test_sqlite_then_json_round_trip_across_contexts() {
    let tmp = TempDir::new().unwrap();
    let open = || {
        let backends: Vec<Box<dyn Backend>> = vec![
            Box::new(SqliteBackend::open(&tmp.path().join("casebook.db")).unwrap()),
            Box::new(JsonFileBackend::new(tmp.path().join("collections"))),
        ];
        let persistence = Rc::new(Persistence::new(backends));
        let source = Box::new(StoredProsecutors::new(persistence.clone()));
        AppContext::from_parts(
            Config::default(),
            None,
            persistence,
            source,
            Rc::new(FixedClock(today())),
        )
    };

    let id = {
        let mut ctx = open();
        ctx.cases.add(draft(60)).id.clone()
    };
    let ctx = open();
    assert_eq!(ctx.cases.len(), 1);
    assert!(ctx.cases.get(&id).is_some());
    assert!(!tmp.path().join("collections").exists());
}
