//! Persisted installation state of one server directory
//!
//! The manifest lives in `.modman.json` at the server root. Writes go through
//! a temporary file in the same directory that is renamed over the old file,
//! so a crash never leaves a half-written manifest behind.

use crate::api::modrinth::{ProjectSummary, VersionRecord};
use crate::modman::errors::{ManifestError, ResolutionFailure};
use crate::modman::selector::Target;
use crate::primitives::ModLoader;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MANIFEST_FILE: &str = ".modman.json";
pub const MODS_DIR: &str = "mods";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub schema_version: u32,
    pub name: String,
    pub game_version: String,
    pub loader: ModLoader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_jar: Option<PathBuf>,
    #[serde(default)]
    pub mods: BTreeMap<String, InstalledMod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledMod {
    pub slug: String,
    pub project_id: String,
    pub title: String,
    pub version_id: String,
    pub file_name: String,
    /// sha512, lowercase hex
    pub checksum: String,
    pub download_url: String,
    pub client_supported: bool,
    pub server_supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_of: Option<String>,
    pub version: VersionRecord,
}

impl InstalledMod {
    /// Build an entry from a selected catalog version
    pub fn from_selection(
        project: &ProjectSummary,
        version: &VersionRecord,
        dependency_of: Option<String>,
    ) -> Result<Self, ResolutionFailure> {
        let file = version
            .primary_file()
            .ok_or_else(|| ResolutionFailure::NoFiles {
                version_id: version.id.clone(),
            })?;

        Ok(Self {
            slug: project.slug.clone(),
            project_id: project.id.clone(),
            title: project.title.clone(),
            version_id: version.id.clone(),
            file_name: file.filename.clone(),
            checksum: file.hashes.sha512.to_lowercase(),
            download_url: file.url.clone(),
            client_supported: project.client_side.is_supported(),
            server_supported: project.server_side.is_supported(),
            dependency_of,
            version: VersionRecord {
                changelog: None,
                ..version.clone()
            },
        })
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.slug == identifier || self.project_id == identifier
    }

    /// Looser match for uninstall: also the title (any case) or the jar name
    pub fn is_named(&self, name: &str) -> bool {
        self.matches(name) || self.title.eq_ignore_ascii_case(name) || self.file_name == name
    }

    /// Whether the installed version still lists the given game version
    pub fn supports_game_version(&self, game_version: &str) -> bool {
        self.version.game_versions.iter().any(|v| v == game_version)
    }
}

impl ProjectManifest {
    pub fn new(
        name: impl Into<String>,
        game_version: impl Into<String>,
        loader: ModLoader,
        loader_version: Option<String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            game_version: game_version.into(),
            loader,
            loader_version,
            server_jar: None,
            mods: BTreeMap::new(),
        }
    }

    pub fn target(&self) -> Target {
        Target::new(self.game_version.clone(), self.loader)
    }

    /// Look up an entry by slug or project id
    pub fn find(&self, identifier: &str) -> Option<&InstalledMod> {
        self.mods
            .get(identifier)
            .or_else(|| self.mods.values().find(|m| m.matches(identifier)))
    }

    /// Manifest key (slug) of the entry matching `identifier`
    pub fn key_of(&self, identifier: &str) -> Option<String> {
        self.find(identifier).map(|m| m.slug.clone())
    }

    /// [`find`](Self::find), falling back to titles and jar names
    pub fn find_by_name(&self, name: &str) -> Option<&InstalledMod> {
        self.find(name)
            .or_else(|| self.mods.values().find(|m| m.is_named(name)))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    pub fn insert(&mut self, entry: InstalledMod) -> Option<InstalledMod> {
        self.mods.insert(entry.slug.clone(), entry)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<InstalledMod> {
        let key = self.key_of(identifier)?;
        self.mods.remove(&key)
    }

    /// Entries whose installed version no longer lists the manifest game version
    pub fn stale_mods(&self) -> Vec<&InstalledMod> {
        self.mods
            .values()
            .filter(|m| !m.supports_game_version(&self.game_version))
            .collect()
    }

    /// Parse a manifest document, migrating older layouts
    pub fn from_json(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let corrupt = |reason: String| ManifestError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let value: Value = serde_json::from_str(contents).map_err(|e| corrupt(e.to_string()))?;

        match value.get("schema_version").and_then(Value::as_u64) {
            Some(found) if found > u64::from(SCHEMA_VERSION) => {
                Err(ManifestError::UnsupportedSchema {
                    found: found as u32,
                    supported: SCHEMA_VERSION,
                })
            }
            Some(_) => serde_json::from_value(value).map_err(|e| corrupt(e.to_string())),
            None if value.get("modman").is_some() => {
                migrate_legacy(&value).map_err(corrupt)
            }
            None => Err(corrupt("missing schema_version".to_string())),
        }
    }
}

/// Convert the untyped pre-schema layout:
/// `{"modman": {"name", "server": {"type", "version", "file"}}, "mods": {slug: {"project", "version"}}}`
fn migrate_legacy(value: &Value) -> Result<ProjectManifest, String> {
    let header = &value["modman"];
    let server = &header["server"];

    let game_version = server["version"]
        .as_str()
        .ok_or("legacy manifest has no server version")?;
    let loader = server["type"]
        .as_str()
        .map(|s| s.parse::<ModLoader>().unwrap_or(ModLoader::Unknown))
        .unwrap_or(ModLoader::Unknown);
    let name = header["name"]
        .as_str()
        .map(str::to_string)
        .or_else(|| {
            header["root"]
                .as_str()
                .and_then(|root| Path::new(root).file_name())
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "server".to_string());

    let mut manifest = ProjectManifest::new(name, game_version, loader, None);
    manifest.server_jar = server["file"].as_str().map(PathBuf::from);

    if let Some(mods) = value["mods"].as_object() {
        for (slug, entry) in mods {
            let project: ProjectSummary = serde_json::from_value(entry["project"].clone())
                .map_err(|e| format!("legacy entry {slug}: {e}"))?;
            let version: VersionRecord = serde_json::from_value(entry["version"].clone())
                .map_err(|e| format!("legacy entry {slug}: {e}"))?;
            let installed = InstalledMod::from_selection(&project, &version, None)
                .map_err(|e| format!("legacy entry {slug}: {e}"))?;
            manifest.insert(installed);
        }
    }

    info!(
        "migrated legacy manifest with {} mods to schema {}",
        manifest.mods.len(),
        SCHEMA_VERSION
    );
    Ok(manifest)
}

/// Load/save of the manifest for a server root
pub trait ManifestStore: Send + Sync {
    /// Find the server root containing a manifest, starting at `start` and walking up
    fn locate(&self, start: &Path) -> Result<PathBuf, ManifestError>;

    fn exists(&self, root: &Path) -> bool;

    fn load(&self, root: &Path) -> Result<ProjectManifest, ManifestError>;

    fn save(&self, manifest: &ProjectManifest, root: &Path) -> Result<(), ManifestError>;
}

/// `.modman.json` on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManifestStore;

impl JsonManifestStore {
    pub fn new() -> Self {
        Self
    }

    pub fn manifest_path(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE)
    }
}

impl ManifestStore for JsonManifestStore {
    fn locate(&self, start: &Path) -> Result<PathBuf, ManifestError> {
        start
            .ancestors()
            .find(|dir| Self::manifest_path(dir).is_file())
            .map(Path::to_path_buf)
            .ok_or_else(|| ManifestError::NotFound {
                path: start.to_path_buf(),
            })
    }

    fn exists(&self, root: &Path) -> bool {
        Self::manifest_path(root).is_file()
    }

    fn load(&self, root: &Path) -> Result<ProjectManifest, ManifestError> {
        let path = Self::manifest_path(root);
        let contents = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: root.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let manifest = ProjectManifest::from_json(&path, &contents)?;
        debug!(
            "loaded manifest {} ({} mods)",
            path.display(),
            manifest.mods.len()
        );
        Ok(manifest)
    }

    fn save(&self, manifest: &ProjectManifest, root: &Path) -> Result<(), ManifestError> {
        let path = Self::manifest_path(root);
        let io_err = |source| ManifestError::Io {
            path: path.clone(),
            source,
        };

        let mut document = serde_json::to_string_pretty(manifest)?;
        document.push('\n');

        let mut temp = tempfile::Builder::new()
            .prefix(".modman-")
            .suffix(".json.tmp")
            .tempfile_in(root)
            .map_err(io_err)?;
        temp.write_all(document.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!("saved manifest {}", path.display());
        Ok(())
    }
}

/// Warn about entries that no longer match the project target
pub fn warn_stale(manifest: &ProjectManifest) {
    for entry in manifest.stale_mods() {
        warn!(
            "{} {} does not list Minecraft {}; run `modman update`",
            entry.slug, entry.version.version_number, manifest.game_version
        );
    }
}

#[cfg(test)]
mod tests {
    include!("manifest.test.rs");
}
