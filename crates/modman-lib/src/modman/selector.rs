//! Version selection against a game version and loader target

use crate::api::modrinth::{VersionRecord, VersionType};
use crate::primitives::ModLoader;
use std::fmt;
use thiserror::Error;

/// What every selected version must support
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub game_version: String,
    pub loader: ModLoader,
}

impl Target {
    pub fn new(game_version: impl Into<String>, loader: ModLoader) -> Self {
        Self {
            game_version: game_version.into(),
            loader,
        }
    }

    /// `Unknown` loaders never match, even against each other
    pub fn accepts(&self, candidate: &VersionRecord) -> bool {
        self.loader.is_known()
            && candidate.loaders.contains(&self.loader)
            && candidate
                .game_versions
                .iter()
                .any(|v| v == &self.game_version)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.loader, self.game_version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no version supports {target}")]
    NotFound { target: Target },

    #[error("version {pinned} does not exist or does not support {target}")]
    PinnedUnavailable { pinned: String, target: Target },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Channel {
    /// Prefer releases, fall back to pre-releases
    #[default]
    Stable,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub channel: Channel,
    /// Version id or version number that must be selected
    pub pinned: Option<String>,
}

impl SelectionPolicy {
    pub fn any() -> Self {
        Self {
            channel: Channel::Any,
            pinned: None,
        }
    }

    pub fn pinned(version: impl Into<String>) -> Self {
        Self {
            channel: Channel::Any,
            pinned: Some(version.into()),
        }
    }
}

/// First candidate in catalog order that supports the target
///
/// Candidates are expected newest first; nothing is re-sorted.
pub fn select<'a>(
    candidates: &'a [VersionRecord],
    target: &Target,
) -> Result<&'a VersionRecord, SelectError> {
    candidates
        .iter()
        .find(|candidate| target.accepts(candidate))
        .ok_or_else(|| SelectError::NotFound {
            target: target.clone(),
        })
}

pub fn select_with_policy<'a>(
    candidates: &'a [VersionRecord],
    target: &Target,
    policy: &SelectionPolicy,
) -> Result<&'a VersionRecord, SelectError> {
    if let Some(pinned) = &policy.pinned {
        return candidates
            .iter()
            .filter(|candidate| candidate.id == *pinned || candidate.version_number == *pinned)
            .find(|candidate| target.accepts(candidate))
            .ok_or_else(|| SelectError::PinnedUnavailable {
                pinned: pinned.clone(),
                target: target.clone(),
            });
    }

    match policy.channel {
        Channel::Any => select(candidates, target),
        Channel::Stable => candidates
            .iter()
            .filter(|candidate| target.accepts(candidate))
            .find(|candidate| candidate.version_type == VersionType::Release)
            .map_or_else(|| select(candidates, target), Ok),
    }
}

#[cfg(test)]
mod tests {
    include!("selector.test.rs");
}
