//! Case command tests

mod common;

use common::{casebook, create_case, create_prosecutor, date_in, setup};
use predicates::prelude::*;

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_case_new_derives_name_and_charges() {
    let tmp = setup();

    casebook(&tmp)
        .args([
            "case",
            "new",
            "--deadline",
            &date_in(60),
            "--defendant",
            "Tran Van An;Theft of property",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created case"))
        .stdout(predicate::str::contains("Tran Van An - Theft of property"));

    casebook(&tmp)
        .args(["case", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tTheft of property\t"));
}

#[test]
fn test_case_new_without_charges_uses_placeholder() {
    let tmp = setup();
    casebook(&tmp)
        .args(["case", "new", "--deadline", &date_in(60), "--defendant", "Le Thi Hoa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Le Thi Hoa - Charges not determined"));
}

#[test]
fn test_case_new_requires_defendant() {
    let tmp = setup();
    casebook(&tmp)
        .args(["case", "new", "--name", "Empty", "--deadline", &date_in(60)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one defendant"));
}

#[test]
fn test_case_new_rejects_bad_date() {
    let tmp = setup();
    casebook(&tmp)
        .args(["case", "new", "--deadline", "2026-10-17", "--defendant", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DD/MM/YYYY"));
}

#[test]
fn test_case_new_with_prosecutor_shows_name() {
    let tmp = setup();
    create_prosecutor(&tmp, "Nguyen Thi Lan");

    casebook(&tmp)
        .args([
            "case",
            "new",
            "--deadline",
            &date_in(60),
            "--defendant",
            "A;Fraud",
            "--prosecutor",
            "lan",
        ])
        .assert()
        .success();

    casebook(&tmp)
        .args(["case", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nguyen Thi Lan"));
}

#[test]
fn test_case_new_unknown_prosecutor_fails() {
    let tmp = setup();
    casebook(&tmp)
        .args([
            "case",
            "new",
            "--deadline",
            &date_in(60),
            "--defendant",
            "A",
            "--prosecutor",
            "nobody",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prosecutor not found"));
}

// ============================================================================
// Listing and showing
// ============================================================================

#[test]
fn test_case_list_empty() {
    let tmp = setup();
    casebook(&tmp)
        .args(["case", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No cases found"));
}

#[test]
fn test_case_list_count_and_stage_filter() {
    let tmp = setup();
    let first = create_case(&tmp, "A;Theft", 60);
    create_case(&tmp, "B;Fraud", 60);

    casebook(&tmp)
        .args(["case", "transfer", &first, "prosecution"])
        .assert()
        .success();

    casebook(&tmp)
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
    casebook(&tmp)
        .args(["case", "list", "--stage", "investigation", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    casebook(&tmp)
        .args(["case", "list", "--view", "prosecution", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_case_list_json() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    let output = casebook(&tmp)
        .args(["case", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let cases: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cases[0]["id"], id);
    assert_eq!(cases[0]["stage"], "investigation");
    assert_eq!(cases[0]["defendants"][0]["preventive_measure"], "at_large");
}

#[test]
fn test_case_show_by_name_fragment() {
    let tmp = setup();
    create_case(&tmp, "Pham Quoc Bao;Robbery", 5);

    casebook(&tmp)
        .args(["case", "show", "quoc bao"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pham Quoc Bao - Robbery"))
        .stdout(predicate::str::contains("investigation deadline"));
}

#[test]
fn test_case_show_unknown() {
    let tmp = setup();
    casebook(&tmp)
        .args(["case", "show", "CASE-NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No case matches"));
}

// ============================================================================
// Workflow
// ============================================================================

#[test]
fn test_case_transfer_stamps_date_once() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "transfer", &id, "prosecution"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prosecution"));

    let output = casebook(&tmp)
        .args(["case", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let case: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(case["prosecution_transfer_date"], date_in(0));
    assert_eq!(case["stage"], "prosecution");
}

#[test]
fn test_case_transfer_out_of_policy_needs_force() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "transfer", &id, "trial"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid stage transition"));

    casebook(&tmp)
        .args(["case", "transfer", &id, "trial", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("forced"));
}

#[test]
fn test_case_terminal_stage() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "transfer", &id, "discontinued"])
        .assert()
        .success();
    casebook(&tmp)
        .args(["case", "transfer", &id, "prosecution"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("terminal"));
}

// ============================================================================
// Deadlines and defendants
// ============================================================================

#[test]
fn test_case_expiring_window() {
    let tmp = setup();
    create_case(&tmp, "Soon;Theft", 10);
    create_case(&tmp, "Later;Theft", 20);

    casebook(&tmp)
        .args(["case", "expiring", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Soon - Theft"))
        .stdout(predicate::str::contains("Later - Theft").not())
        .stdout(predicate::str::contains("10 days"));
}

#[test]
fn test_case_expiring_ignores_other_stages() {
    let tmp = setup();
    let id = create_case(&tmp, "Overdue;Theft", -3);
    casebook(&tmp)
        .args(["case", "transfer", &id, "prosecution"])
        .assert()
        .success();

    casebook(&tmp)
        .args(["case", "expiring"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deadlines"));
}

#[test]
fn test_case_detention_deadline_expiring() {
    let tmp = setup();
    let detained = format!("Hoang Minh;Robbery;{}", date_in(7));
    create_case(&tmp, &detained, 90);

    casebook(&tmp)
        .args(["case", "expiring", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hoang Minh - Robbery"))
        .stdout(predicate::str::contains("7 days"));
}

#[test]
fn test_case_extend_investigation() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 5);

    casebook(&tmp)
        .args(["case", "extend", &id, &date_in(45)])
        .assert()
        .success()
        .stdout(predicate::str::contains("extended"));

    casebook(&tmp)
        .args(["case", "expiring"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deadlines"));
}

#[test]
fn test_case_defendant_lifecycle() {
    let tmp = setup();
    let id = create_case(&tmp, "First;Theft", 60);

    casebook(&tmp)
        .args(["case", "defendant", "add", &id, "Second;Fraud"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added defendant"));

    casebook(&tmp)
        .args([
            "case",
            "defendant",
            "measure",
            &id,
            "Second",
            "detained",
            "--until",
            &date_in(3),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("detained until"));

    casebook(&tmp)
        .args(["case", "expiring", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 days"));

    casebook(&tmp)
        .args(["case", "defendant", "measure", &id, "Second", "at-large"])
        .assert()
        .success();

    let output = casebook(&tmp)
        .args(["case", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let case: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(case["defendants"].as_array().unwrap().len(), 2);
    assert!(case["defendants"][1].get("detention_deadline").is_none());

    casebook(&tmp)
        .args(["case", "defendant", "remove", &id, "Ghost", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no defendant matching"));
    casebook(&tmp)
        .args(["case", "defendant", "remove", &id, "Second", "--yes"])
        .assert()
        .success();
}

#[test]
fn test_case_keeps_last_defendant_unless_forced() {
    let tmp = setup();
    let id = create_case(&tmp, "Only;Theft", 60);

    casebook(&tmp)
        .args(["case", "defendant", "remove", &id, "Only", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must keep at least one defendant"));

    let output = casebook(&tmp)
        .args(["case", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let case: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(case["defendants"].as_array().unwrap().len(), 1);

    casebook(&tmp)
        .args(["case", "defendant", "remove", &id, "Only", "--yes", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no defendants left"));

    let output = casebook(&tmp)
        .args(["case", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let case: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(case["defendants"].as_array().unwrap().is_empty());
}

#[test]
fn test_case_detained_requires_until() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);
    casebook(&tmp)
        .args(["case", "defendant", "measure", &id, "A", "detained"])
        .assert()
        .failure();
}

// ============================================================================
// Edit and delete
// ============================================================================

#[test]
fn test_case_edit() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "edit", &id, "--name", "Renamed", "--notes", "Witness found"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated case"));

    casebook(&tmp)
        .args(["case", "show", "Renamed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Witness found"));

    casebook(&tmp)
        .args(["case", "edit", &id])
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_case_delete_with_yes() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "delete", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted case"));

    casebook(&tmp)
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_case_delete_declined() {
    let tmp = setup();
    let id = create_case(&tmp, "A;Theft", 60);

    casebook(&tmp)
        .args(["case", "delete", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted."));

    casebook(&tmp)
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}
