//! On-disk verification of installed mod files

use crate::modman::manifest::{InstalledMod, ProjectManifest};
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Valid,
    Missing,
    Corrupt { actual: String },
    Unreadable { reason: String },
}

impl FileState {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "ok"),
            Self::Missing => write!(f, "missing"),
            Self::Corrupt { .. } => write!(f, "corrupt"),
            Self::Unreadable { .. } => write!(f, "unreadable"),
        }
    }
}

/// sha512 of a file, lowercase hex, read in chunks
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn check(entry: &InstalledMod, mods_dir: &Path) -> FileState {
    let path = mods_dir.join(&entry.file_name);
    match hash_file(&path) {
        Ok(actual) if actual.eq_ignore_ascii_case(&entry.checksum) => FileState::Valid,
        Ok(actual) => FileState::Corrupt { actual },
        Err(e) if e.kind() == io::ErrorKind::NotFound => FileState::Missing,
        Err(e) => FileState::Unreadable {
            reason: e.to_string(),
        },
    }
}

/// File state of every manifest entry, keyed by slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    states: BTreeMap<String, FileState>,
}

impl IntegrityReport {
    pub fn scan(manifest: &ProjectManifest, mods_dir: &Path) -> Self {
        let states: BTreeMap<String, FileState> = manifest
            .mods
            .values()
            .map(|entry| {
                let state = check(entry, mods_dir);
                trace!("{} -> {}", entry.file_name, state);
                (entry.slug.clone(), state)
            })
            .collect();

        let broken = states.values().filter(|s| !s.is_valid()).count();
        debug!(
            "integrity scan: {} entries, {} broken",
            states.len(),
            broken
        );
        Self { states }
    }

    /// Treat every entry as healthy without touching the disk
    #[cfg(test)]
    pub(crate) fn assume_valid(manifest: &ProjectManifest) -> Self {
        Self {
            states: manifest
                .mods
                .keys()
                .map(|slug| (slug.clone(), FileState::Valid))
                .collect(),
        }
    }

    pub fn state(&self, slug: &str) -> Option<&FileState> {
        self.states.get(slug)
    }

    /// Unscanned slugs are not healthy
    pub fn is_healthy(&self, slug: &str) -> bool {
        self.state(slug).is_some_and(FileState::is_valid)
    }

    pub fn broken(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, state)| !state.is_valid())
            .map(|(slug, _)| slug.as_str())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, slug: impl Into<String>, state: FileState) {
        self.states.insert(slug.into(), state);
    }
}

#[cfg(test)]
mod tests {
    include!("integrity.test.rs");
}
