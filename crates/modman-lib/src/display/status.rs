//! Status lines for user feedback
//!
//! Replaces raw `println!` in command handlers with semantic, styled output.

use super::styling::StyleManager;
use std::io::{self, Write};

pub struct StatusDisplay<'a> {
    styling: &'a StyleManager,
}

fn join(item: &str, details: &str) -> String {
    if details.is_empty() {
        item.to_string()
    } else {
        format!("{}: {}", item, details)
    }
}

impl<'a> StatusDisplay<'a> {
    pub(crate) fn new(styling: &'a StyleManager) -> Self {
        Self { styling }
    }

    /// `→ Resolving sodium...`
    pub fn checking(&self, task: &str) {
        println!("{}", self.styling.format_working(&format!("{}...", task)));
        io::stdout().flush().unwrap_or(());
    }

    /// `✓ sodium: mc1.20.1-0.5.3`
    pub fn success(&self, item: &str, details: &str) {
        println!("{}", self.styling.format_success(&join(item, details)));
    }

    /// `✗ lithium: no compatible version`
    pub fn error(&self, item: &str, details: &str) {
        eprintln!("{}", self.styling.format_error(&join(item, details)));
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.styling.format_warning(message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.styling.format_info(message));
    }

    pub fn message(&self, text: &str) {
        println!("{}", text);
    }

    pub fn subtle(&self, text: &str) {
        println!("{}", self.styling.style_subtle(text));
    }

    pub fn list(&self, items: &[&str]) {
        for item in items {
            println!("  {} {}", self.styling.bullet(), item);
        }
    }

    pub fn complete(&self, task: &str) {
        println!("{}", self.styling.format_success(task));
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.styling.style_emphasis(title));
    }
}
