use super::*;
use crate::display::mock::{DisplayCall, MockDisplayProvider};

#[test]
fn test_summary_states() {
    assert!(OperationSummary::new(3, 0).is_success());
    assert!(OperationSummary::new(2, 1).is_partial_success());
    assert!(OperationSummary::new(0, 2).is_failure());

    let nothing = OperationSummary::new(0, 0);
    assert!(!nothing.is_success() && !nothing.is_failure());
    assert_eq!(OperationSummary::new(2, 1).to_string(), "2 successful, 1 failed");
}

#[test]
fn test_display_summary_on_success() {
    let display = MockDisplayProvider::new();
    display.display_summary("install", &OperationSummary::new(1, 0));

    assert!(display.has_call(&DisplayCall::StatusComplete {
        task: "install completed".into()
    }));
    assert!(display.transcript().contains("1 mod processed"));
}

#[test]
fn test_display_summary_with_failures() {
    let display = MockDisplayProvider::new();
    display.display_summary("update", &OperationSummary::new(2, 1));
    assert_eq!(display.count_calls("status_warning"), 1);

    display.clear_calls();
    display.display_summary("update", &OperationSummary::new(0, 3));
    assert!(display.has_call(&DisplayCall::StatusError {
        item: "update".into(),
        details: "failed".into()
    }));
    assert!(display.transcript().contains("3 mods failed"));
}

#[test]
fn test_mock_records_tables() {
    let display = MockDisplayProvider::new();
    DisplayProvider::table(&display)
        .table(&["Slug", "State"], &[vec!["sodium".into(), "ok".into()]]);

    assert_eq!(display.count_calls("table"), 1);
    assert!(display.transcript().contains("sodium ok"));
}
