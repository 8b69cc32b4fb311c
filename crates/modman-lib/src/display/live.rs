//! Live display provider writing styled lines to the terminal

use super::providers::*;
use super::status::StatusDisplay;
use super::structured::StructuredDisplay;
use super::styling::StyleManager;

/// Owns the styling for one command run
pub struct LiveDisplayProvider {
    styling: StyleManager,
}

impl LiveDisplayProvider {
    pub fn new(color: bool) -> Self {
        Self {
            styling: StyleManager::new(color),
        }
    }

    pub fn styling(&self) -> &StyleManager {
        &self.styling
    }
}

impl DisplayProvider for LiveDisplayProvider {
    fn status(&self) -> Box<dyn StatusProvider + '_> {
        Box::new(LiveStatusProvider {
            display: StatusDisplay::new(&self.styling),
        })
    }

    fn table(&self) -> Box<dyn StructuredProvider + '_> {
        Box::new(LiveStructuredProvider {
            display: StructuredDisplay::new(&self.styling),
        })
    }
}

struct LiveStatusProvider<'a> {
    display: StatusDisplay<'a>,
}

impl StatusProvider for LiveStatusProvider<'_> {
    fn checking(&self, task: &str) {
        self.display.checking(task);
    }

    fn success(&self, item: &str, details: &str) {
        self.display.success(item, details);
    }

    fn error(&self, item: &str, details: &str) {
        self.display.error(item, details);
    }

    fn warning(&self, message: &str) {
        self.display.warning(message);
    }

    fn info(&self, message: &str) {
        self.display.info(message);
    }

    fn message(&self, text: &str) {
        self.display.message(text);
    }

    fn subtle(&self, text: &str) {
        self.display.subtle(text);
    }

    fn list(&self, items: &[&str]) {
        self.display.list(items);
    }

    fn complete(&self, task: &str) {
        self.display.complete(task);
    }

    fn section(&self, title: &str) {
        self.display.section(title);
    }
}

struct LiveStructuredProvider<'a> {
    display: StructuredDisplay<'a>,
}

impl StructuredProvider for LiveStructuredProvider<'_> {
    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let table = rows.iter().fold(self.display.table().header(headers), |table, row| {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            table.row(&cells)
        });
        table.render();
    }

    fn properties(&self, pairs: &[(&str, &str)]) {
        self.display.pairs(pairs);
    }
}
