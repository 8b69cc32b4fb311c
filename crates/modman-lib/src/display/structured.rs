//! Tables and key/value output

use super::styling::StyleManager;
use console::measure_text_width;

pub struct StructuredDisplay<'a> {
    styling: &'a StyleManager,
}

impl<'a> StructuredDisplay<'a> {
    pub(crate) fn new(styling: &'a StyleManager) -> Self {
        Self { styling }
    }

    pub fn table(&self) -> TableDisplay<'a> {
        TableDisplay::new(self.styling)
    }

    pub fn pairs(&self, pairs: &[(&str, &str)]) {
        let width = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in pairs {
            let padding = " ".repeat(width - key.len());
            println!("{}{} | {}", self.styling.style_subtle(key), padding, value);
        }
    }
}

/// Table builder; columns size to their widest cell
pub struct TableDisplay<'a> {
    styling: &'a StyleManager,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl<'a> TableDisplay<'a> {
    fn new(styling: &'a StyleManager) -> Self {
        Self {
            styling,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn header(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Render to a string without a trailing newline
    pub fn to_text(&self) -> String {
        render_table(self.styling, &self.headers, &self.rows)
    }

    pub fn render(self) {
        println!("{}", self.to_text());
    }
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(measure_text_width(cell));
    format!("{}{}", cell, " ".repeat(fill))
}

pub(crate) fn render_table(styling: &StyleManager, headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(measure_text_width(cell));
        }
    }

    let format_line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| pad(cells.get(i).map(String::as_str).unwrap_or(""), *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if !headers.is_empty() {
        lines.push(styling.style_emphasis(&format_line(headers)));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(styling.style_subtle(&rule.join("  ")));
    }
    lines.extend(rows.iter().map(|row| format_line(row)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    include!("structured.test.rs");
}
