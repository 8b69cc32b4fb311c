//! Semantic colours and symbols for terminal output

use console::Style;

/// Style manager owned by the display provider
#[derive(Debug, Clone)]
pub struct StyleManager {
    color: bool,
    success: Style,
    error: Style,
    warning: Style,
    info: Style,
    emphasis: Style,
    subtle: Style,
}

const CHECKMARK: &str = "✓";
const CROSS: &str = "✗";
const WARNING_SYMBOL: &str = "!";
const INFO_SYMBOL: &str = "·";
const ARROW: &str = "→";
const BULLET: &str = "•";

impl StyleManager {
    pub fn new(color: bool) -> Self {
        let styled = |style: Style| style.force_styling(color);
        Self {
            color,
            success: styled(Style::new().green()),
            error: styled(Style::new().red()),
            warning: styled(Style::new().yellow()),
            info: styled(Style::new().cyan()),
            emphasis: styled(Style::new().bold()),
            subtle: styled(Style::new().dim()),
        }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn style_success(&self, text: &str) -> String {
        self.success.apply_to(text).to_string()
    }

    pub fn style_error(&self, text: &str) -> String {
        self.error.apply_to(text).to_string()
    }

    pub fn style_warning(&self, text: &str) -> String {
        self.warning.apply_to(text).to_string()
    }

    pub fn style_info(&self, text: &str) -> String {
        self.info.apply_to(text).to_string()
    }

    pub fn style_emphasis(&self, text: &str) -> String {
        self.emphasis.apply_to(text).to_string()
    }

    pub fn style_subtle(&self, text: &str) -> String {
        self.subtle.apply_to(text).to_string()
    }

    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_success(CHECKMARK), message)
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_error(CROSS), message)
    }

    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_warning(WARNING_SYMBOL), message)
    }

    pub fn format_info(&self, message: &str) -> String {
        format!("{} {}", self.style_info(INFO_SYMBOL), message)
    }

    /// Working/progress line (info colour with arrow)
    pub fn format_working(&self, message: &str) -> String {
        format!("{} {}", self.style_info(ARROW), message)
    }

    pub fn bullet(&self) -> &'static str {
        BULLET
    }
}

#[cfg(test)]
mod tests {
    include!("styling.test.rs");
}
