//! Client modpack export
//!
//! Collects the jars players need (entries the catalog marks as client
//! usable) and zips them next to the manifest.

use crate::modman::integrity::hash_file;
use crate::modman::manifest::ProjectManifest;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("{file_name} is recorded in the manifest but missing from mods/")]
    MissingFile { file_name: String },

    #[error("{file_name} does not match its recorded checksum, run `modman install` to repair it")]
    CorruptFile { file_name: String },

    #[error("Pack I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write archive: {source}")]
    Zip {
        #[from]
        source: zip::result::ZipError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Archive file name for a project, `<name>.zip`
pub fn archive_name(manifest: &ProjectManifest) -> String {
    let stem: String = manifest
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '-' })
        .collect();
    let stem = stem.trim_matches(|c| c == '-' || c == '.');
    if stem.is_empty() {
        "modpack.zip".to_string()
    } else {
        format!("{stem}.zip")
    }
}

/// Read the files to pack, in manifest order
///
/// Server-only entries are left out unless `include_server_side` is set.
pub fn collect(
    manifest: &ProjectManifest,
    mods_dir: &Path,
    include_server_side: bool,
) -> Result<Vec<PackEntry>, PackError> {
    let mut entries = Vec::new();
    for entry in manifest.mods.values() {
        if !entry.client_supported && !include_server_side {
            debug!("pack: skipping server-only {}", entry.slug);
            continue;
        }

        let path = mods_dir.join(&entry.file_name);
        if !path.is_file() {
            return Err(PackError::MissingFile {
                file_name: entry.file_name.clone(),
            });
        }
        let actual = hash_file(&path).map_err(|source| PackError::Io {
            path: path.clone(),
            source,
        })?;
        if !actual.eq_ignore_ascii_case(&entry.checksum) {
            return Err(PackError::CorruptFile {
                file_name: entry.file_name.clone(),
            });
        }

        let bytes = std::fs::read(&path).map_err(|source| PackError::Io {
            path: path.clone(),
            source,
        })?;
        entries.push(PackEntry {
            file_name: entry.file_name.clone(),
            bytes,
        });
    }
    Ok(entries)
}

/// Write `entries` as a deflated zip at `path`, replacing any previous archive
pub fn write_archive(entries: &[PackEntry], path: &Path) -> Result<(), PackError> {
    let io_error = |source| PackError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp = tempfile::Builder::new()
        .prefix(".modman-")
        .suffix(".zip.tmp")
        .tempfile_in(dir)
        .map_err(io_error)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(temp.reopen().map_err(io_error)?);
    for entry in entries {
        writer.start_file(entry.file_name.as_str(), options)?;
        writer.write_all(&entry.bytes).map_err(io_error)?;
    }
    writer.finish()?;

    temp.persist(path).map_err(|e| io_error(e.error))?;
    info!("wrote {} ({} mods)", path.display(), entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("pack.test.rs");
}
