use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn modman(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modman").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("MODMAN_NO_LOG_FILE", "true")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    modman(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("download-fabric"))
        .stdout(predicate::str::contains("changelog"))
        .stdout(predicate::str::contains("aliases: info, show"));
}

#[test]
fn search_limit_is_capped_before_any_request() {
    let dir = TempDir::new().unwrap();
    modman(&dir)
        .args(["-L", "critical", "search", "lithium", "--limit", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 100"));
}

#[test]
fn invalid_log_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    modman(&dir)
        .args(["-L", "VERBOSE", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VERBOSE"));
}

#[test]
fn log_level_must_precede_the_subcommand() {
    let dir = TempDir::new().unwrap();
    modman(&dir).args(["list", "-L", "DEBUG"]).assert().failure();
}

#[test]
fn list_without_manifest_fails() {
    let dir = TempDir::new().unwrap();
    modman(&dir)
        .args(["-L", "critical", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No modman project found"));
}

#[test]
fn init_then_list_offline() {
    let dir = TempDir::new().unwrap();
    modman(&dir)
        .args(["init", "--no-auto", "--name", "smp", "fabric", "1.20.1"])
        .assert()
        .success();
    assert!(dir.path().join(".modman.json").is_file());

    modman(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No mods installed"));
}
