//! Account and owner scoping tests

mod common;

use common::{casebook, create_case, setup};
use predicates::prelude::*;

fn register(tmp: &tempfile::TempDir, email: &str) {
    casebook(tmp)
        .args(["auth", "register", "--email", email, "--password", "secret-pass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered"));
}

#[test]
fn test_whoami_signed_out() {
    let tmp = setup();
    casebook(&tmp)
        .args(["auth", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_register_and_whoami() {
    let tmp = setup();
    register(&tmp, "Lan@Example.vn");

    casebook(&tmp)
        .args(["auth", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lan@example.vn"));
}

#[test]
fn test_register_rejects_short_password() {
    let tmp = setup();
    casebook(&tmp)
        .args(["auth", "register", "--email", "a@b.c", "--password", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 6 characters"));
}

#[test]
fn test_login_wrong_password() {
    let tmp = setup();
    register(&tmp, "lan@example.vn");
    casebook(&tmp).args(["auth", "logout"]).assert().success();

    casebook(&tmp)
        .args(["auth", "login", "lan@example.vn", "--password", "wrong-pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid e-mail or password"));

    casebook(&tmp)
        .args(["auth", "login", "lan@example.vn", "--password", "secret-pass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in"));
}

#[test]
fn test_collections_are_scoped_per_user() {
    let tmp = setup();
    create_case(&tmp, "Shared;Theft", 60);

    register(&tmp, "lan@example.vn");
    casebook(&tmp)
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
    create_case(&tmp, "Private;Fraud", 60);

    casebook(&tmp).args(["auth", "logout"]).assert().success();
    casebook(&tmp)
        .args(["case", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shared - Theft"))
        .stdout(predicate::str::contains("Private").not());

    casebook(&tmp)
        .args(["auth", "login", "lan", "--password", "secret-pass"])
        .assert()
        .failure();
    casebook(&tmp)
        .args(["auth", "login", "lan@example.vn", "--password", "secret-pass"])
        .assert()
        .success();
    casebook(&tmp)
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}
