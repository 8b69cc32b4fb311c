//! Temporary server directories for filesystem tests

use crate::modman::manifest::{InstalledMod, MODS_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway server root with a `mods/` directory, removed on drop
pub struct ServerDirFixture {
    pub temp_dir: TempDir,
}

impl ServerDirFixture {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        fs::create_dir_all(temp_dir.path().join(MODS_DIR))?;
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.path().join(MODS_DIR)
    }

    pub fn write_mod(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.mods_dir().join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn has_mod(&self, file_name: &str) -> bool {
        self.mods_dir().join(file_name).is_file()
    }

    /// Write the file an installed entry expects, with matching contents
    pub fn materialize(&self, entry: &InstalledMod, bytes: &[u8]) -> std::io::Result<PathBuf> {
        self.write_mod(&entry.file_name, bytes)
    }

    /// File names under `mods/`, sorted
    pub fn mod_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.mods_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
