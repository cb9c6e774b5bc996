//! Error types shared by the configuration loader, the filesystem backends and the generator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Everything that can abort a manifest generation run.
///
/// Configuration problems and filesystem failures are both fatal; nothing here is retried.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// A duration string such as `maxAge` could not be parsed.
  #[error("not a valid duration: {input:?} ({reason})")]
  InvalidDuration {
    /// The full duration string from the configuration.
    input: String,
    /// What was wrong with it.
    reason: String,
  },

  /// The configuration file could not be read.
  #[error("failed to read configuration {}: {source}", path.display())]
  ConfigRead {
    /// Path of the configuration file.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// The configuration file was read but is not a valid configuration.
  #[error("failed to parse configuration {}: {source}", path.display())]
  ConfigParse {
    /// Path of the configuration file, or `<inline>` for in-memory sources.
    path: PathBuf,
    /// Underlying JSON or YAML error.
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A glob compiled into a regular expression the regex engine rejects.
  #[error("glob {glob:?} does not compile to a valid pattern: {source}")]
  InvalidPattern {
    /// The glob as written in the configuration.
    glob: String,
    /// Regex compilation error.
    #[source]
    source: regex::Error,
  },

  /// Listing a directory failed.
  #[error("failed to list {path}: {source}")]
  List {
    /// Directory being listed.
    path: String,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Reading a file for hashing failed.
  #[error("failed to hash {path}: {source}")]
  Hash {
    /// File being hashed.
    path: String,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Writing an output file failed.
  #[error("failed to write {path}: {source}")]
  Write {
    /// File being written.
    path: String,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
}

impl ManifestError {
  /// Returns `true` for errors caused by the configuration rather than the filesystem.
  pub fn is_configuration(&self) -> bool {
    matches!(
      self,
      Self::InvalidDuration { .. }
        | Self::ConfigRead { .. }
        | Self::ConfigParse { .. }
        | Self::InvalidPattern { .. }
    )
  }

  /// Returns `true` for failures reported by a [`crate::Filesystem`] backend.
  pub fn is_filesystem(&self) -> bool {
    !self.is_configuration()
  }

  pub(crate) fn invalid_duration(input: &str, reason: impl Into<String>) -> Self {
    Self::InvalidDuration {
      input: input.to_string(),
      reason: reason.into(),
    }
  }
}
