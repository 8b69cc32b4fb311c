//! Standard environment variables for colour and CI detection

use crate::primitives::{ColorChoice, ConfigError};
use serde::Deserialize;

/// Environment variables that affect output and interactivity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// NO_COLOR (any non-empty value disables colour)
    pub no_color: Option<String>,
    /// FORCE_COLOR (0/false disables, 1/2/3/true enables)
    pub force_color: Option<String>,
    /// CLICOLOR (0 disables colour)
    pub clicolor: Option<String>,
    /// CI (any value means a CI run)
    pub ci: Option<String>,
}

impl EnvironmentConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    pub fn is_ci(&self) -> bool {
        self.ci.as_deref().is_some_and(|ci| !ci.is_empty() && ci != "0" && ci != "false")
    }

    /// Apply environment variables to an `auto` colour choice
    ///
    /// Precedence: CI < CLICOLOR < NO_COLOR < FORCE_COLOR. An explicit
    /// `--color always|never` is returned unchanged.
    pub fn apply_color_config(&self, color: ColorChoice) -> ColorChoice {
        if color != ColorChoice::Auto {
            return color;
        }

        let mut resolved = ColorChoice::Auto;
        if self.is_ci() {
            resolved = ColorChoice::Never;
        }
        if self.clicolor.as_deref() == Some("0") {
            resolved = ColorChoice::Never;
        }
        if self.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
            resolved = ColorChoice::Never;
        }
        match self.force_color.as_deref() {
            Some("0" | "false") => resolved = ColorChoice::Never,
            Some("1" | "2" | "3" | "true") => resolved = ColorChoice::Always,
            _ => {}
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}
