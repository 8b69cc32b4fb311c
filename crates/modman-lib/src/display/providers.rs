//! Display provider traits for dependency injection
//!
//! Command handlers talk to the user only through these traits, so tests can
//! swap in the recording mock and assert on what would have been shown.

use std::fmt;

/// Provider trait for all user-facing communication
pub trait DisplayProvider: Send + Sync {
    fn status(&self) -> Box<dyn StatusProvider + '_>;

    fn table(&self) -> Box<dyn StructuredProvider + '_>;
}

pub trait StatusProvider {
    /// Working/checking line for a task in progress
    fn checking(&self, task: &str);

    fn success(&self, item: &str, details: &str);

    fn error(&self, item: &str, details: &str);

    fn warning(&self, message: &str);

    fn info(&self, message: &str);

    /// Plain line without a status symbol
    fn message(&self, text: &str);

    fn subtle(&self, text: &str);

    fn list(&self, items: &[&str]);

    fn complete(&self, task: &str);

    fn section(&self, title: &str);
}

pub trait StructuredProvider {
    fn table(&self, headers: &[&str], rows: &[Vec<String>]);

    fn properties(&self, pairs: &[(&str, &str)]);
}

/// Counts for a batch of per-mod operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
}

impl OperationSummary {
    pub fn new(successful: usize, failed: usize) -> Self {
        Self {
            successful,
            failed,
            total: successful + failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.successful > 0
    }

    pub fn is_partial_success(&self) -> bool {
        self.successful > 0 && self.failed > 0
    }

    pub fn is_failure(&self) -> bool {
        self.failed > 0 && self.successful == 0
    }
}

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} successful, {} failed", self.successful, self.failed)
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Display patterns shared by command handlers
pub trait DisplayProviderExt: DisplayProvider {
    fn display_summary(&self, operation: &str, summary: &OperationSummary) {
        let status = self.status();

        if summary.is_success() {
            status.complete(&format!("{} completed", operation));
            status.subtle(&format!(
                "   {} mod{} processed",
                summary.successful,
                plural(summary.successful)
            ));
        } else if summary.is_partial_success() {
            status.warning(&format!("{} completed with errors", operation));
            status.subtle(&format!("   {}", summary));
        } else if summary.is_failure() {
            status.error(operation, "failed");
            status.subtle(&format!(
                "   {} mod{} failed",
                summary.failed,
                plural(summary.failed)
            ));
        } else {
            status.info(&format!("{}: nothing to do", operation));
        }
    }
}

impl<T: DisplayProvider + ?Sized> DisplayProviderExt for T {}

#[cfg(test)]
mod tests {
    include!("providers.test.rs");
}
