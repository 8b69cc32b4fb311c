use super::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, LogLevel::Warning);
    assert_eq!(config.jobs, 4);
    assert_eq!(config.retries, 5);
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.api_url, DEFAULT_BASE_URL);
    assert!(!config.yes);
}

#[test]
fn test_validate_fills_workdir() {
    let mut config = AppConfig::default();
    config.validate().unwrap();
    assert!(config.workdir.is_some());
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut zero_jobs = AppConfig {
        jobs: 0,
        ..AppConfig::default()
    };
    assert!(matches!(
        zero_jobs.validate(),
        Err(ConfigError::ValidationFailed { .. })
    ));

    let dir = TempDir::new().unwrap();
    let mut missing_dir = AppConfig {
        workdir: Some(dir.path().join("nope")),
        ..AppConfig::default()
    };
    assert!(matches!(
        missing_dir.validate(),
        Err(ConfigError::InvalidWorkDir { .. })
    ));
}

#[test]
fn test_logger_config() {
    let config = AppConfig {
        log_level: LogLevel::Debug,
        color: ColorChoice::Never,
        log_file: Some(PathBuf::from("/tmp/custom.log")),
        ..AppConfig::default()
    };
    let logger = config.to_logger_config();
    assert_eq!(logger.level, LogLevel::Debug);
    assert!(!logger.color);
    assert_eq!(logger.file, Some(PathBuf::from("/tmp/custom.log")));

    let quiet = AppConfig {
        no_log_file: true,
        ..config
    };
    assert_eq!(quiet.to_logger_config().file, None);
}

#[test]
fn test_networking_config() {
    let config = AppConfig {
        jobs: 8,
        retries: 2,
        net_timeout: 10,
        ..AppConfig::default()
    };
    let networking = config.to_networking_config();
    assert_eq!(networking.jobs, 8);
    assert_eq!(networking.retries, 2);
    assert_eq!(networking.timeout_seconds, 10);
}
