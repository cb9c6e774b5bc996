//! Filesystem backends the generator reads build output from.
//!
//! Paths exchanged with a [`Filesystem`] are virtual: `/`-rooted and `/`-separated,
//! regardless of the host platform.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult};

/// Source of the file listing and content hashes for one generation run.
#[async_trait]
pub trait Filesystem: Send + Sync {
  /// List every regular file below `dir`, as `/`-rooted paths.
  async fn list(&self, dir: &str) -> ManifestResult<Vec<String>>;

  /// Content hash of a file previously returned by [`Filesystem::list`].
  async fn hash(&self, file: &str) -> ManifestResult<String>;

  /// Write a text file, creating parent directories as needed.
  async fn write(&self, file: &str, contents: &str) -> ManifestResult<()>;
}

/// Lowercase hex SHA-256 digest of a file's bytes.
pub fn content_hash(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

/// Symlinks are followed only when they resolve to a regular file; links to directories,
/// dangling links and loops are left out of listings.
async fn symlink_targets_file(path: &Path) -> bool {
  match tokio::fs::metadata(path).await {
    Ok(metadata) => metadata.is_file(),
    Err(err) => {
      debug!("Skipping unresolvable symlink {}: {err}", path.display());
      false
    }
  }
}

/// [`Filesystem`] backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryFilesystem {
  root: PathBuf,
  ignored: BTreeSet<String>,
}

impl DirectoryFilesystem {
  /// Serve files below `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ignored: BTreeSet::new(),
    }
  }

  /// Leave a virtual path out of every listing, e.g. a previously written manifest.
  pub fn ignoring(mut self, file: impl Into<String>) -> Self {
    self.ignored.insert(file.into());
    self
  }

  /// Directory the virtual paths are resolved against.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn resolve(&self, virtual_path: &str) -> PathBuf {
    virtual_path
      .split('/')
      .filter(|segment| !segment.is_empty())
      .fold(self.root.clone(), |path, segment| path.join(segment))
  }
}

#[async_trait]
impl Filesystem for DirectoryFilesystem {
  async fn list(&self, dir: &str) -> ManifestResult<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![(self.resolve(dir), dir.trim_end_matches('/').to_string())];

    while let Some((current, prefix)) = pending.pop() {
      let dir_error = |source| ManifestError::List {
        path: if prefix.is_empty() { "/".to_string() } else { prefix.clone() },
        source,
      };
      let mut entries = tokio::fs::read_dir(&current).await.map_err(dir_error)?;

      while let Some(entry) = entries.next_entry().await.map_err(dir_error)? {
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
          warn!("Skipping {}: file name is not valid UTF-8", path.display());
          continue;
        };
        let virtual_path = format!("{prefix}/{name}");
        let file_type = entry
          .file_type()
          .await
          .map_err(|source| ManifestError::List {
            path: virtual_path.clone(),
            source,
          })?;

        let is_file = if file_type.is_dir() {
          pending.push((path, virtual_path));
          continue;
        } else if file_type.is_symlink() {
          symlink_targets_file(&path).await
        } else {
          file_type.is_file()
        };

        if is_file && !self.ignored.contains(&virtual_path) {
          files.push(virtual_path);
        }
      }
    }

    debug!("Listed {} files below {}", files.len(), self.resolve(dir).display());
    Ok(files)
  }

  async fn hash(&self, file: &str) -> ManifestResult<String> {
    let bytes = tokio::fs::read(self.resolve(file))
      .await
      .map_err(|source| ManifestError::Hash {
        path: file.to_string(),
        source,
      })?;
    Ok(content_hash(&bytes))
  }

  async fn write(&self, file: &str, contents: &str) -> ManifestResult<()> {
    let write_error = |source| ManifestError::Write {
      path: file.to_string(),
      source,
    };
    let target = self.resolve(file);
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(&target, contents).await.map_err(write_error)
  }
}

/// [`Filesystem`] holding its files in memory.
///
/// Listings come back in insertion order, which makes it easy to exercise code that must
/// not depend on listing order.
#[derive(Debug, Default)]
pub struct InMemoryFilesystem {
  files: RwLock<Vec<(String, Vec<u8>)>>,
}

impl InMemoryFilesystem {
  /// Empty filesystem.
  pub fn new() -> Self {
    Self::default()
  }

  /// Filesystem pre-populated with `(path, contents)` pairs.
  pub fn from_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
  where
    P: Into<String>,
    C: AsRef<[u8]>,
  {
    let files = files
      .into_iter()
      .map(|(path, contents)| (path.into(), contents.as_ref().to_vec()))
      .collect();
    Self {
      files: RwLock::new(files),
    }
  }

  /// Contents of a file as text, if present.
  pub fn read_to_string(&self, file: &str) -> Option<String> {
    let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    files
      .iter()
      .find(|(path, _)| path == file)
      .map(|(_, contents)| String::from_utf8_lossy(contents).into_owned())
  }
}

#[async_trait]
impl Filesystem for InMemoryFilesystem {
  async fn list(&self, dir: &str) -> ManifestResult<Vec<String>> {
    let prefix = format!("{}/", dir.trim_end_matches('/'));
    let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(
      files
        .iter()
        .filter(|(path, _)| path.starts_with(&prefix))
        .map(|(path, _)| path.clone())
        .collect(),
    )
  }

  async fn hash(&self, file: &str) -> ManifestResult<String> {
    let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    files
      .iter()
      .find(|(path, _)| path == file)
      .map(|(_, contents)| content_hash(contents))
      .ok_or_else(|| ManifestError::Hash {
        path: file.to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
      })
  }

  async fn write(&self, file: &str, contents: &str) -> ManifestResult<()> {
    let mut files = self.files.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    match files.iter_mut().find(|(path, _)| path == file) {
      Some((_, existing)) => *existing = contents.as_bytes().to_vec(),
      None => files.push((file.to_string(), contents.as_bytes().to_vec())),
    }
    Ok(())
  }
}
