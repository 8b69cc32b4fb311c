//! Breadth-first dependency resolution
//!
//! Expands requested mods into the full set of entries to install. Every
//! per-mod failure is collected; the walk always runs to completion.

use crate::api::modrinth::{CatalogClient, DependencyKind, VersionRecord, VersionType};
use crate::modman::errors::{ResolutionError, ResolutionFailure};
use crate::modman::graph::{DependencyGraph, ModNode, Requiredness};
use crate::modman::integrity::IntegrityReport;
use crate::modman::manifest::{InstalledMod, ProjectManifest};
use crate::modman::selector::{Channel, SelectError, SelectionPolicy, Target, select_with_policy};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, trace, warn};

/// One identifier as typed by the user, optionally pinned with `slug==version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequest {
    pub identifier: String,
    pub pinned: Option<String>,
}

impl RootRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            pinned: None,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.split_once("==") {
            Some((identifier, version)) if !version.trim().is_empty() => Self {
                identifier: identifier.trim().to_string(),
                pinned: Some(version.trim().to_string()),
            },
            Some((identifier, _)) => Self::new(identifier.trim()),
            None => Self::new(raw.trim()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalkRequest {
    pub roots: Vec<RootRequest>,
    pub include_optional: bool,
    /// Identifiers to re-resolve even when installed and healthy
    pub force: HashSet<String>,
    /// Re-select roots and stale entries from the catalog (update)
    pub refresh: bool,
    pub channel: Channel,
}

impl WalkRequest {
    pub fn install(roots: Vec<RootRequest>, include_optional: bool) -> Self {
        Self {
            roots,
            include_optional,
            ..Self::default()
        }
    }

    pub fn with_force(mut self, force: impl IntoIterator<Item = String>) -> Self {
        self.force.extend(force);
        self
    }

    pub fn refreshing(mut self, channel: Channel) -> Self {
        self.refresh = true;
        self.channel = channel;
        self
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    /// Entries to hand to the reconciler, in discovery order
    pub to_install: Vec<InstalledMod>,
    pub errors: Vec<ResolutionError>,
    pub graph: DependencyGraph,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Pending {
    identifier: String,
    requiredness: Requiredness,
    parent: Option<String>,
    root: String,
    pinned: Option<String>,
    is_root: bool,
}

struct Incompatibility {
    source: String,
    root: String,
    target: String,
}

struct Walker<'a> {
    request: &'a WalkRequest,
    manifest: &'a ProjectManifest,
    integrity: &'a IntegrityReport,
    catalog: &'a dyn CatalogClient,
    target: Target,
    visited: HashSet<String>,
    resolution: Resolution,
    incompatibilities: Vec<Incompatibility>,
}

/// Resolve `request` against the catalog and the current manifest
pub async fn resolve(
    request: &WalkRequest,
    manifest: &ProjectManifest,
    integrity: &IntegrityReport,
    catalog: &dyn CatalogClient,
) -> Resolution {
    let mut walker = Walker {
        request,
        manifest,
        integrity,
        catalog,
        target: manifest.target(),
        visited: HashSet::new(),
        resolution: Resolution::default(),
        incompatibilities: Vec::new(),
    };

    let mut queue: VecDeque<Pending> = request
        .roots
        .iter()
        .map(|root| Pending {
            identifier: root.identifier.clone(),
            requiredness: Requiredness::Required,
            parent: None,
            root: root.identifier.clone(),
            pinned: root.pinned.clone(),
            is_root: true,
        })
        .collect();

    while let Some(pending) = queue.pop_front() {
        walker.visit(pending, &mut queue).await;
    }

    walker.check_conflicts();

    for cycle in walker.resolution.graph.cycles() {
        debug!("dependency cycle: {}", cycle.join(" -> "));
    }
    info!(
        "resolved {} mods with {} errors",
        walker.resolution.to_install.len(),
        walker.resolution.errors.len()
    );
    walker.resolution
}

impl Walker<'_> {
    fn seen(&self, pending: &Pending, aliases: &[&str]) -> bool {
        aliases
            .iter()
            .any(|alias| *alias != pending.identifier && self.visited.contains(*alias))
    }

    fn mark_visited(&mut self, aliases: &[&str]) {
        for alias in aliases {
            self.visited.insert((*alias).to_string());
        }
    }

    /// Merge a repeat visit into the graph
    fn revisit(&mut self, pending: &Pending) {
        trace!("already visited: {}", pending.identifier);
        let graph = &mut self.resolution.graph;
        if pending.requiredness == Requiredness::Required {
            graph.promote(&pending.identifier);
        }
        if let Some(parent) = &pending.parent {
            if graph.contains(&pending.identifier) {
                if let Err(e) = graph.add_dependency(parent, &pending.identifier, pending.requiredness) {
                    trace!("edge {} -> {} not recorded: {}", parent, pending.identifier, e);
                }
            }
        }
    }

    fn is_forced(&self, installed: &InstalledMod) -> bool {
        self.request.force.contains(&installed.slug)
            || self.request.force.contains(&installed.project_id)
    }

    async fn visit(&mut self, pending: Pending, queue: &mut VecDeque<Pending>) {
        if self.visited.contains(&pending.identifier) {
            self.revisit(&pending);
            return;
        }
        self.visited.insert(pending.identifier.clone());

        let manifest = self.manifest;
        let installed = manifest.find(&pending.identifier);
        if let Some(installed) = installed {
            if self.seen(&pending, &[installed.slug.as_str(), installed.project_id.as_str()]) {
                self.revisit(&pending);
                return;
            }
            self.mark_visited(&[installed.slug.as_str(), installed.project_id.as_str()]);

            let stale = !installed.supports_game_version(&self.target.game_version);
            let refresh = self.request.refresh && (pending.is_root || stale);
            let healthy = self.integrity.is_healthy(&installed.slug);

            if !refresh && pending.pinned.is_none() {
                let entry = installed.clone();
                if healthy && !self.is_forced(installed) {
                    debug!("{} is installed and healthy, skipping", installed.slug);
                    self.record(&pending, entry, queue, false);
                } else {
                    debug!("{} is broken or forced, reusing {}", installed.slug, installed.version_id);
                    self.record(&pending, entry, queue, true);
                }
                return;
            }
        }

        let project = match self.catalog.get_project(&pending.identifier).await {
            Ok(project) => project,
            Err(e) => {
                self.fail(&pending, ResolutionFailure::Catalog(e.to_string()));
                return;
            }
        };
        if installed.is_none() && self.seen(&pending, &[project.slug.as_str(), project.id.as_str()])
        {
            self.revisit(&pending);
            return;
        }
        self.mark_visited(&[project.slug.as_str(), project.id.as_str()]);

        let versions = match self
            .catalog
            .list_versions(
                &project.id,
                Some(&self.target.game_version),
                Some(self.target.loader),
            )
            .await
        {
            Ok(versions) => versions,
            Err(e) => {
                self.fail(&pending, ResolutionFailure::Catalog(e.to_string()));
                return;
            }
        };

        let policy = self.policy_for(&pending, installed);
        let selected = match select_with_policy(&versions, &self.target, &policy) {
            Ok(version) => version,
            Err(SelectError::NotFound { target }) => {
                self.fail(
                    &pending,
                    ResolutionFailure::NoCompatibleVersion {
                        game_version: target.game_version,
                        loader: target.loader.to_string(),
                    },
                );
                return;
            }
            Err(SelectError::PinnedUnavailable { pinned, .. }) => {
                self.fail(&pending, ResolutionFailure::PinnedVersionUnavailable { pinned });
                return;
            }
        };

        if let Some(installed) = installed {
            let installed_compatible = self.target.accepts(&installed.version);
            if pending.pinned.is_none()
                && installed_compatible
                && published_after(&installed.version, selected)
            {
                info!(
                    "{} {} is newer than catalog pick {}, keeping it",
                    installed.slug, installed.version.version_number, selected.version_number
                );
                self.record(&pending, installed.clone(), queue, false);
                return;
            }
        }

        let dependency_of = installed
            .map(|m| m.dependency_of.clone())
            .unwrap_or_else(|| pending.parent.clone());
        match InstalledMod::from_selection(&project, selected, dependency_of) {
            Ok(entry) => self.record(&pending, entry, queue, true),
            Err(reason) => self.fail(&pending, reason),
        }
    }

    fn policy_for(&self, pending: &Pending, installed: Option<&InstalledMod>) -> SelectionPolicy {
        if let Some(pinned) = &pending.pinned {
            return SelectionPolicy::pinned(pinned.clone());
        }
        let prerelease_installed =
            installed.is_some_and(|m| m.version.version_type != VersionType::Release);
        let channel = if self.request.refresh && prerelease_installed {
            Channel::Any
        } else {
            self.request.channel
        };
        SelectionPolicy {
            channel,
            pinned: None,
        }
    }

    fn fail(&mut self, pending: &Pending, reason: ResolutionFailure) {
        warn!("could not resolve {}: {}", pending.identifier, reason);
        self.resolution
            .errors
            .push(ResolutionError::new(pending.identifier.clone(), reason));
    }

    /// Add a resolved entry to the graph and result, expanding its dependencies
    fn record(
        &mut self,
        pending: &Pending,
        entry: InstalledMod,
        queue: &mut VecDeque<Pending>,
        expand: bool,
    ) {
        let graph = &mut self.resolution.graph;
        graph.add_node(ModNode::new(
            entry.project_id.clone(),
            entry.slug.clone(),
            pending.requiredness,
            pending.root.clone(),
        ));
        graph.alias(pending.identifier.clone(), entry.project_id.clone());
        if let Some(parent) = &pending.parent {
            if let Err(e) = graph.add_dependency(parent, &entry.project_id, pending.requiredness) {
                trace!("edge {} -> {} not recorded: {}", parent, entry.slug, e);
            }
        }

        if expand {
            for dependency in &entry.version.dependencies {
                let Some(project_id) = &dependency.project_id else {
                    trace!("{}: dependency without project id ignored", entry.slug);
                    continue;
                };
                let requiredness = match dependency.dependency_type {
                    DependencyKind::Required => Requiredness::Required,
                    DependencyKind::Optional if self.request.include_optional => {
                        Requiredness::Optional
                    }
                    DependencyKind::Optional | DependencyKind::Embedded => continue,
                    DependencyKind::Incompatible => {
                        self.incompatibilities.push(Incompatibility {
                            source: entry.slug.clone(),
                            root: pending.root.clone(),
                            target: project_id.clone(),
                        });
                        continue;
                    }
                };
                queue.push_back(Pending {
                    identifier: project_id.clone(),
                    requiredness,
                    parent: Some(entry.slug.clone()),
                    root: pending.root.clone(),
                    pinned: None,
                    is_root: false,
                });
            }
        }

        self.resolution.to_install.push(entry);
    }

    /// Drop everything pulled in by a root whose mods clash with the server
    fn check_conflicts(&mut self) {
        let mut conflicting_roots = HashSet::new();

        for incompatible in &self.incompatibilities {
            let clash = self
                .manifest
                .find(&incompatible.target)
                .map(|m| m.slug.clone())
                .or_else(|| {
                    self.resolution
                        .to_install
                        .iter()
                        .find(|m| m.matches(&incompatible.target))
                        .map(|m| m.slug.clone())
                });
            if let Some(other) = clash {
                warn!("{} is incompatible with {}", incompatible.source, other);
                self.resolution.errors.push(ResolutionError::new(
                    incompatible.source.clone(),
                    ResolutionFailure::Conflict {
                        incompatible_with: other,
                    },
                ));
                conflicting_roots.insert(incompatible.root.clone());
            }
        }

        if conflicting_roots.is_empty() {
            return;
        }

        // Drop an entry only when every root reaching it conflicts
        let graph = &self.resolution.graph;
        let manifest = self.manifest;
        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.resolution.to_install)
            .into_iter()
            .partition(|entry| {
                let roots = graph.roots_reaching(&entry.project_id);
                !roots.is_empty()
                    && roots.iter().all(|root| conflicting_roots.contains(root))
                    && !manifest
                        .find(&entry.slug)
                        .is_some_and(|m| m.version_id == entry.version_id)
            });

        for entry in dropped {
            let root = graph
                .roots_reaching(&entry.project_id)
                .into_iter()
                .next()
                .unwrap_or_default();
            if !self.resolution.errors.iter().any(|e| e.identifier == entry.slug) {
                self.resolution.errors.push(ResolutionError::new(
                    entry.slug,
                    ResolutionFailure::SkippedByConflict { root },
                ));
            }
        }
        self.resolution.to_install = kept;
    }
}

/// Whether `installed` was published strictly later than `candidate`
///
/// Unparseable timestamps never count as newer.
fn published_after(installed: &VersionRecord, candidate: &VersionRecord) -> bool {
    match (installed.published_at(), candidate.published_at()) {
        (Some(installed), Some(candidate)) => installed > candidate,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    include!("walker.test.rs");
}
