use super::*;

#[test]
fn test_filter_directives_scope_level_to_own_crates() {
    let directives = filter_directives(LogLevel::Info);
    assert!(directives.starts_with("warn,"));
    assert!(directives.contains("modman=info"));
    assert!(directives.contains("modman_lib=info"));
    assert!(directives.contains("reqwest=warn"));
}

#[test]
fn test_critical_console_level_filters_as_error() {
    let directives = filter_directives(LogLevel::Critical);
    assert!(directives.contains("modman_lib=error"));
    assert!(EnvFilter::try_new(&directives).is_ok());
}

#[test]
fn test_file_layer_creates_parent_directories() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested").join("modman.log");

    assert!(file_layer(&path).is_ok());
    assert!(path.exists());
}
