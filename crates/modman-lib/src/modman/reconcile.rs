//! Turns a resolved install set into an action plan against the manifest
//!
//! Nothing here touches the filesystem; the executor carries out the plan.

use crate::modman::integrity::IntegrityReport;
use crate::modman::manifest::{InstalledMod, ProjectManifest};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Download `target`; `reinstall` when the same version is already recorded
    Add { target: InstalledMod, reinstall: bool },
    Skip { slug: String },
    /// Replace `from` with `to`; `from`'s file goes only after `to` is verified
    Upgrade { from: InstalledMod, to: InstalledMod },
    Remove { entry: InstalledMod },
}

impl Action {
    pub fn slug(&self) -> &str {
        match self {
            Self::Add { target, .. } => &target.slug,
            Self::Skip { slug } => slug,
            Self::Upgrade { to, .. } => &to.slug,
            Self::Remove { entry } => &entry.slug,
        }
    }

    /// Entry that has to be fetched for this action
    pub fn download(&self) -> Option<&InstalledMod> {
        match self {
            Self::Add { target, .. } => Some(target),
            Self::Upgrade { to, .. } => Some(to),
            Self::Skip { .. } | Self::Remove { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add {
                target,
                reinstall: false,
            } => write!(f, "add {} {}", target.slug, target.version.version_number),
            Self::Add {
                target,
                reinstall: true,
            } => write!(f, "reinstall {} {}", target.slug, target.version.version_number),
            Self::Skip { slug } => write!(f, "skip {slug}"),
            Self::Upgrade { from, to } => write!(
                f,
                "upgrade {} {} -> {}",
                to.slug, from.version.version_number, to.version.version_number
            ),
            Self::Remove { entry } => write!(f, "remove {}", entry.slug),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Manifest as it will look if every action succeeds
    pub manifest: ProjectManifest,
    pub actions: Vec<Action>,
}

impl Reconciliation {
    pub fn downloads(&self) -> usize {
        self.actions.iter().filter(|a| a.download().is_some()).count()
    }

    pub fn is_noop(&self) -> bool {
        self.actions.iter().all(Action::is_skip)
    }
}

/// Plan installs of `to_install` on top of `manifest`
pub fn apply(
    manifest: &ProjectManifest,
    to_install: &[InstalledMod],
    force: &HashSet<String>,
    integrity: &IntegrityReport,
) -> Reconciliation {
    let mut projected = manifest.clone();
    let mut actions = Vec::with_capacity(to_install.len());
    let mut planned = HashSet::new();

    for target in to_install {
        if !planned.insert(target.slug.clone()) {
            continue;
        }

        let action = match manifest.find(&target.slug).or_else(|| manifest.find(&target.project_id)) {
            None => Action::Add {
                target: target.clone(),
                reinstall: false,
            },
            Some(existing) if existing.version_id == target.version_id => {
                let forced = force.contains(&existing.slug) || force.contains(&existing.project_id);
                if forced || !integrity.is_healthy(&existing.slug) {
                    Action::Add {
                        target: InstalledMod {
                            dependency_of: existing.dependency_of.clone(),
                            ..target.clone()
                        },
                        reinstall: true,
                    }
                } else {
                    Action::Skip {
                        slug: existing.slug.clone(),
                    }
                }
            }
            Some(existing) => Action::Upgrade {
                from: existing.clone(),
                to: InstalledMod {
                    dependency_of: existing.dependency_of.clone(),
                    ..target.clone()
                },
            },
        };

        if let Some(entry) = action.download() {
            projected.insert(entry.clone());
        }
        debug!("plan: {}", action);
        actions.push(action);
    }

    Reconciliation {
        manifest: projected,
        actions,
    }
}

/// Plan removal of `identifiers`; also returns identifiers that are not installed
pub fn remove(manifest: &ProjectManifest, identifiers: &[String]) -> (Reconciliation, Vec<String>) {
    let mut projected = manifest.clone();
    let mut actions = Vec::new();
    let mut missing = Vec::new();

    for identifier in identifiers {
        let key = projected.find_by_name(identifier).map(|m| m.slug.clone());
        match key.and_then(|key| projected.mods.remove(&key)) {
            Some(entry) => {
                debug!("plan: remove {}", entry.slug);
                actions.push(Action::Remove { entry });
            }
            None if actions.iter().any(|a| removes(a, identifier)) => {}
            None => missing.push(identifier.clone()),
        }
    }

    for action in &actions {
        release_dependents(&mut projected, action.slug());
    }

    (
        Reconciliation {
            manifest: projected,
            actions,
        },
        missing,
    )
}

fn removes(action: &Action, name: &str) -> bool {
    matches!(action, Action::Remove { entry } if entry.is_named(name))
}

/// Clear `dependency_of` on entries that pointed at `removed`; they stay installed
pub fn release_dependents(manifest: &mut ProjectManifest, removed: &str) -> Vec<String> {
    let mut released = Vec::new();
    for entry in manifest.mods.values_mut() {
        if entry.dependency_of.as_deref() == Some(removed) {
            entry.dependency_of = None;
            released.push(entry.slug.clone());
        }
    }
    released
}

#[cfg(test)]
mod tests {
    include!("reconcile.test.rs");
}
