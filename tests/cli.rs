use assert_cmd::Command;
use predicates::prelude::*;

fn couchctl() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("couchctl").unwrap()
}

#[test]
fn test_help_exits_successfully() {
    couchctl().arg("--help").assert().success();
}

#[test]
fn test_version_exits_successfully() {
    couchctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("couchctl"));
}

#[test]
fn test_no_args_shows_usage() {
    couchctl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_subcommand_fails() {
    couchctl()
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_help_lists_all_subcommands() {
    let assert = couchctl().arg("--help").assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    for cmd in [
        "disk",
        "shards",
        "tasks",
        "dbinfo",
        "databases",
        "replicate",
        "completions",
    ] {
        assert!(
            output.contains(cmd),
            "Help output should list '{}' subcommand",
            cmd
        );
    }
}

#[test]
fn test_disk_help_shows_flags() {
    couchctl()
        .args(["disk", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--account"))
        .stdout(predicate::str::contains("--cluster"));
}

#[test]
fn test_shards_help_shows_legend_flag() {
    couchctl()
        .args(["shards", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--legend"));
}

#[test]
fn test_dbinfo_help_shows_sections() {
    couchctl()
        .args(["dbinfo", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--shards"))
        .stdout(predicate::str::contains("--indexes"))
        .stdout(predicate::str::contains("--conflicts"));
}

#[test]
fn test_disk_requires_account_and_cluster() {
    couchctl()
        .arg("disk")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_missing_credentials_fail_before_any_request() {
    couchctl()
        .args(["tasks", "some-account"])
        .env_remove("COUCHCTL_ADMIN_AUTH")
        .env_remove("COUCHCTL_AUTH")
        .assert()
        .failure()
        .stderr(predicate::str::contains("COUCHCTL_ADMIN_AUTH"));
}

#[test]
fn test_completions_bash() {
    couchctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("couchctl"));
}

#[test]
fn test_dbinfo_legend_requires_shards() {
    couchctl()
        .args(["dbinfo", "acct", "db", "--legend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--shards"));
}
