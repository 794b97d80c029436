// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TypeSpec files being compiled and edited during one run.
//!
//! The store owns the directory the compiler reads. Every write goes through
//! [`TypeSpecFileStore::update_file`], which refuses names that escape the
//! directory, and every file carries a version so patches computed against
//! an older copy are rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sg_shell::{validate_path, GuardError, PathKind};
use thiserror::Error;
use walkdir::WalkDir;

/// Directories never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["node_modules", "tsp-output", "temp", ".git"];

const MAX_SANITIZED_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The name would resolve outside the store directory.
    #[error("refusing to write outside the TypeSpec directory: {0}")]
    Security(#[from] GuardError),

    #[error("unknown TypeSpec file: {name}")]
    UnknownFile { name: String },

    #[error("patch for {file} is based on version {expected}, file is at version {current}")]
    Stale { file: String, expected: u64, current: u64 },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileStoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        FileStoreError::Io { path: path.to_path_buf(), source }
    }
}

#[derive(Debug, Clone)]
struct TrackedFile {
    content: String,
    version: u64,
}

#[derive(Debug)]
pub struct TypeSpecFileStore {
    root: PathBuf,
    files: BTreeMap<String, TrackedFile>,
    /// Set when the store created `root` and must remove it.
    owned_dir: bool,
}

impl TypeSpecFileStore {
    /// Load every `.tsp` file below `dir`. Keys are `/`-separated paths
    /// relative to `dir`; every file starts at version 1.
    pub async fn load(dir: &Path) -> Result<Self, FileStoreError> {
        let mut files = BTreeMap::new();
        for path in typespec_paths(dir) {
            let Ok(relative) = path.strip_prefix(dir) else { continue };
            let name = relative.to_string_lossy().replace('\\', "/");
            let content =
                tokio::fs::read_to_string(&path).await.map_err(|e| FileStoreError::io(&path, e))?;
            files.insert(name, TrackedFile { content, version: 1 });
        }
        tracing::debug!(dir = %dir.display(), files = files.len(), "loaded TypeSpec files");
        Ok(Self { root: dir.to_path_buf(), files, owned_dir: false })
    }

    /// Write downloaded files into a fresh directory under
    /// `<sdk_dir>/temp/typespec/`. The directory is removed when the store
    /// is dropped. Files with unsafe names are skipped.
    pub async fn materialize(
        sdk_dir: &Path,
        typespec_location: &str,
        downloaded: BTreeMap<String, String>,
    ) -> Result<Self, FileStoreError> {
        let root = sdk_dir
            .join("temp")
            .join("typespec")
            .join(sanitize_dir_name(typespec_location))
            .join(unique_suffix());
        tokio::fs::create_dir_all(&root).await.map_err(|e| FileStoreError::io(&root, e))?;
        let mut store = Self { root, files: BTreeMap::new(), owned_dir: true };

        for (name, content) in downloaded {
            match store.update_file(&name, &content).await {
                Ok(_) => {}
                Err(FileStoreError::Security(e)) => {
                    tracing::warn!(file = %name, error = %e, "skipping file with invalid name");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            dir = %store.root.display(),
            files = store.files.len(),
            "materialized TypeSpec files"
        );
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Snapshot of every file's current content.
    pub fn contents(&self) -> BTreeMap<String, String> {
        self.files.iter().map(|(name, f)| (name.clone(), f.content.clone())).collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|f| f.content.as_str())
    }

    pub fn version(&self, name: &str) -> Option<u64> {
        self.files.get(name).map(|f| f.version)
    }

    /// Write `content` to `name` inside the store directory, creating the
    /// file if needed. Returns the new version.
    pub async fn update_file(&mut self, name: &str, content: &str) -> Result<u64, FileStoreError> {
        let name = validate_path(name, PathKind::FileName)?.replace('\\', "/");
        let path = self.root.join(&name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| FileStoreError::io(parent, e))?;
        }
        tokio::fs::write(&path, content).await.map_err(|e| FileStoreError::io(&path, e))?;

        let entry = self
            .files
            .entry(name)
            .and_modify(|f| {
                f.content = content.to_string();
                f.version += 1;
            })
            .or_insert_with(|| TrackedFile { content: content.to_string(), version: 1 });
        Ok(entry.version)
    }

    /// [`update_file`](Self::update_file) for an existing file, only if it
    /// is still at `from_version`.
    pub async fn update_if_version(
        &mut self,
        name: &str,
        from_version: u64,
        content: &str,
    ) -> Result<u64, FileStoreError> {
        let current = self
            .version(name)
            .ok_or_else(|| FileStoreError::UnknownFile { name: name.to_string() })?;
        if current != from_version {
            return Err(FileStoreError::Stale {
                file: name.to_string(),
                expected: from_version,
                current,
            });
        }
        self.update_file(name, content).await
    }
}

impl Drop for TypeSpecFileStore {
    fn drop(&mut self) {
        if !self.owned_dir {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            tracing::warn!(dir = %self.root.display(), error = %e, "failed to remove temp directory");
        }
    }
}

fn typespec_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !SKIPPED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tsp"))
        })
        .collect()
}

/// Turn a repository path into a single safe directory name.
pub(crate) fn sanitize_dir_name(location: &str) -> String {
    let replaced: String = location
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '.' | ' ' | ':' | '<' | '>' | '|' | '"' | '*' | '?' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_SANITIZED_LEN)
        .collect();
    let trimmed = replaced.trim_end_matches('_');
    if trimmed.is_empty() {
        "default".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_suffix() -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{stamp}_{}", sg_core::short(&id, 8))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
