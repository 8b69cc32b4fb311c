//! Server jar detection for `init`

use crate::primitives::ModLoader;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

const INSTALL_PROPERTIES: &str = "install.properties";

#[derive(Debug, Error)]
pub enum ServerDetectError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid jar: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedServer {
    pub jar: PathBuf,
    pub loader: ModLoader,
    pub game_version: String,
    pub loader_version: Option<String>,
}

/// Parse the `key=value` lines of a Fabric launcher `install.properties`
fn parse_install_properties(contents: &str) -> (Option<String>, Option<String>) {
    let mut game_version = None;
    let mut loader_version = None;
    for line in contents.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "game-version" => game_version = Some(value.to_string()),
                "fabric-loader-version" => loader_version = Some(value.to_string()),
                _ => {}
            }
        }
    }
    (game_version, loader_version)
}

/// Inspect one jar; `None` when it is not a recognised server launcher
pub fn detect_server(jar: &Path) -> Result<Option<DetectedServer>, ServerDetectError> {
    let file = File::open(jar).map_err(|source| ServerDetectError::Io {
        path: jar.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| ServerDetectError::Archive {
        path: jar.to_path_buf(),
        source,
    })?;

    let mut contents = String::new();
    match archive.by_name(INSTALL_PROPERTIES) {
        Ok(mut entry) => {
            entry
                .read_to_string(&mut contents)
                .map_err(|source| ServerDetectError::Io {
                    path: jar.to_path_buf(),
                    source,
                })?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            trace!("{} has no {}", jar.display(), INSTALL_PROPERTIES);
            return Ok(None);
        }
        Err(source) => {
            return Err(ServerDetectError::Archive {
                path: jar.to_path_buf(),
                source,
            });
        }
    }

    let (game_version, loader_version) = parse_install_properties(&contents);
    Ok(game_version.map(|game_version| DetectedServer {
        jar: jar.to_path_buf(),
        loader: ModLoader::Fabric,
        game_version,
        loader_version,
    }))
}

/// Scan the top level of `dir` for a server launcher jar
///
/// Jars named `fabric-server*` are tried first; unreadable jars are skipped.
pub fn find_server_jar(dir: &Path) -> Result<Option<DetectedServer>, ServerDetectError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ServerDetectError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut jars: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jar"))
        .collect();
    jars.sort_by_key(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        (!name.starts_with("fabric-server"), name)
    });

    for jar in jars {
        match detect_server(&jar) {
            Ok(Some(found)) => {
                debug!("detected {} server {} in {}", found.loader, found.game_version, jar.display());
                return Ok(Some(found));
            }
            Ok(None) => {}
            Err(e) => debug!("skipping {}: {}", jar.display(), e),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    include!("server.test.rs");
}
