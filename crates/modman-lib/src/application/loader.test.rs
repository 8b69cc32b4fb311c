use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_env_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    assert!(load_env_files(dir.path()).is_ok());
}

#[test]
fn test_local_file_takes_precedence() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".env.local"),
        "MODMAN_LOADER_TEST_PRECEDENCE=local\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(".env"),
        "MODMAN_LOADER_TEST_PRECEDENCE=shared\nMODMAN_LOADER_TEST_SHARED_ONLY=yes\n",
    )
    .unwrap();

    load_env_files(dir.path()).unwrap();

    assert_eq!(
        std::env::var("MODMAN_LOADER_TEST_PRECEDENCE").unwrap(),
        "local"
    );
    assert_eq!(
        std::env::var("MODMAN_LOADER_TEST_SHARED_ONLY").unwrap(),
        "yes"
    );
}

#[test]
fn test_malformed_env_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "this line has no assignment\n").unwrap();

    let err = load_env_files(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvFileError { ref file, .. } if file == ".env"));
}
