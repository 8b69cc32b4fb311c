//! Mock display provider for testing
//!
//! Records every display call so command tests can assert on user output.

use super::providers::*;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockDisplayProvider {
    calls: Arc<Mutex<Vec<DisplayCall>>>,
}

impl MockDisplayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_calls(&self) -> Vec<DisplayCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    pub fn has_call(&self, expected: &DisplayCall) -> bool {
        self.get_calls().contains(expected)
    }

    pub fn count_calls(&self, call_type: &str) -> usize {
        self.get_calls()
            .iter()
            .filter(|call| call.call_type() == call_type)
            .count()
    }

    /// Every recorded line of text, for substring assertions
    pub fn transcript(&self) -> String {
        self.get_calls()
            .iter()
            .map(DisplayCall::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn record(&self, call: DisplayCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DisplayProvider for MockDisplayProvider {
    fn status(&self) -> Box<dyn StatusProvider + '_> {
        Box::new(self.clone())
    }

    fn table(&self) -> Box<dyn StructuredProvider + '_> {
        Box::new(self.clone())
    }
}

/// Recorded display call
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    StatusChecking { task: String },
    StatusSuccess { item: String, details: String },
    StatusError { item: String, details: String },
    StatusWarning { message: String },
    StatusInfo { message: String },
    StatusMessage { text: String },
    StatusSubtle { text: String },
    StatusList { items: Vec<String> },
    StatusComplete { task: String },
    StatusSection { title: String },

    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    Properties { pairs: Vec<(String, String)> },
}

impl DisplayCall {
    pub fn call_type(&self) -> &'static str {
        match self {
            DisplayCall::StatusChecking { .. } => "status_checking",
            DisplayCall::StatusSuccess { .. } => "status_success",
            DisplayCall::StatusError { .. } => "status_error",
            DisplayCall::StatusWarning { .. } => "status_warning",
            DisplayCall::StatusInfo { .. } => "status_info",
            DisplayCall::StatusMessage { .. } => "status_message",
            DisplayCall::StatusSubtle { .. } => "status_subtle",
            DisplayCall::StatusList { .. } => "status_list",
            DisplayCall::StatusComplete { .. } => "status_complete",
            DisplayCall::StatusSection { .. } => "status_section",
            DisplayCall::Table { .. } => "table",
            DisplayCall::Properties { .. } => "properties",
        }
    }

    pub fn text(&self) -> String {
        match self {
            DisplayCall::StatusChecking { task } | DisplayCall::StatusComplete { task } => task.clone(),
            DisplayCall::StatusSuccess { item, details } | DisplayCall::StatusError { item, details } => {
                format!("{}: {}", item, details)
            }
            DisplayCall::StatusWarning { message } | DisplayCall::StatusInfo { message } => message.clone(),
            DisplayCall::StatusMessage { text }
            | DisplayCall::StatusSubtle { text } => text.clone(),
            DisplayCall::StatusSection { title } => title.clone(),
            DisplayCall::StatusList { items } => items.join("\n"),
            DisplayCall::Table { headers, rows } => std::iter::once(headers.join(" "))
                .chain(rows.iter().map(|row| row.join(" ")))
                .collect::<Vec<_>>()
                .join("\n"),
            DisplayCall::Properties { pairs } => pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl StatusProvider for MockDisplayProvider {
    fn checking(&self, task: &str) {
        self.record(DisplayCall::StatusChecking { task: task.to_string() });
    }

    fn success(&self, item: &str, details: &str) {
        self.record(DisplayCall::StatusSuccess {
            item: item.to_string(),
            details: details.to_string(),
        });
    }

    fn error(&self, item: &str, details: &str) {
        self.record(DisplayCall::StatusError {
            item: item.to_string(),
            details: details.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.record(DisplayCall::StatusWarning { message: message.to_string() });
    }

    fn info(&self, message: &str) {
        self.record(DisplayCall::StatusInfo { message: message.to_string() });
    }

    fn message(&self, text: &str) {
        self.record(DisplayCall::StatusMessage { text: text.to_string() });
    }

    fn subtle(&self, text: &str) {
        self.record(DisplayCall::StatusSubtle { text: text.to_string() });
    }

    fn list(&self, items: &[&str]) {
        self.record(DisplayCall::StatusList { items: owned(items) });
    }

    fn complete(&self, task: &str) {
        self.record(DisplayCall::StatusComplete { task: task.to_string() });
    }

    fn section(&self, title: &str) {
        self.record(DisplayCall::StatusSection { title: title.to_string() });
    }
}

impl StructuredProvider for MockDisplayProvider {
    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        self.record(DisplayCall::Table {
            headers: owned(headers),
            rows: rows.to_vec(),
        });
    }

    fn properties(&self, pairs: &[(&str, &str)]) {
        self.record(DisplayCall::Properties {
            pairs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}
