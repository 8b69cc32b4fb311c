//! Per-mod failure types shared by the resolution and install pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single identifier could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    NoCompatibleVersion { game_version: String, loader: String },
    PinnedVersionUnavailable { pinned: String },
    NoFiles { version_id: String },
    Catalog(String),
    Conflict { incompatible_with: String },
    SkippedByConflict { root: String },
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompatibleVersion {
                game_version,
                loader,
            } => write!(f, "no version for Minecraft {game_version} on {loader}"),
            Self::PinnedVersionUnavailable { pinned } => {
                write!(f, "pinned version {pinned} is not compatible or does not exist")
            }
            Self::NoFiles { version_id } => write!(f, "version {version_id} has no files"),
            Self::Catalog(message) => write!(f, "{message}"),
            Self::Conflict { incompatible_with } => {
                write!(f, "incompatible with {incompatible_with}")
            }
            Self::SkippedByConflict { root } => {
                write!(f, "skipped because {root} has a conflict")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{identifier}: {reason}")]
pub struct ResolutionError {
    pub identifier: String,
    pub reason: ResolutionFailure,
}

impl ResolutionError {
    pub fn new(identifier: impl Into<String>, reason: ResolutionFailure) -> Self {
        Self {
            identifier: identifier.into(),
            reason,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.reason, ResolutionFailure::Conflict { .. })
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Checksum mismatch for {file_name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },

    #[error("Download failed: {source}")]
    Network {
        #[from]
        source: crate::networking::NetworkingError,
    },

    #[error("Download interrupted: {source}")]
    Transfer {
        #[from]
        source: reqwest::Error,
    },

    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No modman project found in {path} or any parent directory")]
    NotFound { path: PathBuf },

    #[error("Manifest {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Manifest schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Manifest I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

/// One entry of the end-of-run failure summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFailure {
    pub identifier: String,
    pub message: String,
}

impl ModFailure {
    pub fn new(identifier: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            identifier: identifier.into(),
            message: message.to_string(),
        }
    }
}

impl From<&ResolutionError> for ModFailure {
    fn from(error: &ResolutionError) -> Self {
        Self::new(error.identifier.clone(), &error.reason)
    }
}

impl fmt::Display for ModFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.message)
    }
}
