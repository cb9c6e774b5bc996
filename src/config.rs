//! Caching configuration as authored by the application developer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ManifestError, ManifestResult};

/// Conventional file name for the caching configuration.
pub const DEFAULT_CONFIG_FILE: &str = "ngsw-config.json";

/// Top-level caching configuration consumed by [`crate::ManifestGenerator`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  /// Application shell entry point, relative to the base href.
  pub index: String,
  /// Arbitrary data copied verbatim into the manifest.
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub app_data: Option<serde_json::Value>,
  /// Asset groups in precedence order; earlier groups claim files first.
  #[serde(default)]
  pub asset_groups: Vec<AssetGroupConfig>,
  /// Data groups describing runtime caching of dynamic requests.
  #[serde(default)]
  pub data_groups: Vec<DataGroupConfig>,
  /// Navigation URL rules; [`crate::manifest::DEFAULT_NAVIGATION_URLS`] when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub navigation_urls: Option<Vec<String>>,
}

/// When the resources of an asset group are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
  /// Fetch every resource up front.
  #[default]
  Prefetch,
  /// Cache resources only once they are requested.
  Lazy,
}

/// Caching strategy applied to a data group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
  /// Serve from cache whenever possible.
  #[default]
  Performance,
  /// Prefer the network, falling back to the cache.
  Freshness,
}

/// Named set of build output files tracked by content hash.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroupConfig {
  /// Unique group name.
  pub name: String,
  /// Install mode, `prefetch` when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub install_mode: Option<InstallMode>,
  /// Update mode, falling back to the install mode and then `prefetch`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub update_mode: Option<InstallMode>,
  /// Globs describing the group's resources.
  #[serde(default)]
  pub resources: AssetResources,
}

impl AssetGroupConfig {
  /// Effective install mode after defaults.
  pub fn resolved_install_mode(&self) -> InstallMode {
    self.install_mode.unwrap_or_default()
  }

  /// Effective update mode after defaults.
  pub fn resolved_update_mode(&self) -> InstallMode {
    self.update_mode.unwrap_or_else(|| self.resolved_install_mode())
  }
}

/// Resource globs of an asset group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetResources {
  /// Globs selecting files from the build output.
  pub files: Vec<String>,
  /// Deprecated alias of `files`, matched after it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub versioned_files: Option<Vec<String>>,
  /// URL globs for resources outside the build output; routing only.
  pub urls: Vec<String>,
}

impl AssetResources {
  /// Deprecated globs, empty when the field was not supplied.
  pub fn versioned_files(&self) -> &[String] {
    self.versioned_files.as_deref().unwrap_or_default()
  }
}

/// Runtime caching rule for requests matching a set of URL globs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGroupConfig {
  /// Unique group name.
  pub name: String,
  /// URL globs routed through this group.
  pub urls: Vec<String>,
  /// Cache format version, `1` when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<u32>,
  /// Cache policy parameters.
  pub cache_config: CacheConfig,
}

/// Cache policy of a data group.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
  /// Maximum number of cached responses.
  pub max_size: u64,
  /// Maximum age of a cached response as a duration string.
  pub max_age: String,
  /// Network timeout as a duration string.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout: Option<String>,
  /// Strategy, `performance` when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strategy: Option<CacheStrategy>,
}

/// Serialisation format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
  /// JSON, the default.
  Json,
  /// YAML, selected by a `.yaml` or `.yml` extension.
  Yaml,
}

impl ConfigFormat {
  /// Pick the format from a file extension.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
        Self::Yaml
      }
      _ => Self::Json,
    }
  }
}

impl Config {
  /// Read and parse a configuration file, choosing the format from its extension.
  pub fn from_path(path: impl AsRef<Path>) -> ManifestResult<Self> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ManifestError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content, ConfigFormat::from_path(path), path)
  }

  /// Parse a JSON configuration held in memory.
  pub fn from_json_str(content: &str) -> ManifestResult<Self> {
    Self::parse(content, ConfigFormat::Json, Path::new("<inline>"))
  }

  /// Parse a YAML configuration held in memory.
  pub fn from_yaml_str(content: &str) -> ManifestResult<Self> {
    Self::parse(content, ConfigFormat::Yaml, Path::new("<inline>"))
  }

  fn parse(content: &str, format: ConfigFormat, origin: &Path) -> ManifestResult<Self> {
    let parsed: Result<Self, Box<dyn std::error::Error + Send + Sync>> = match format {
      ConfigFormat::Json => serde_json::from_str(content).map_err(Into::into),
      ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(Into::into),
    };
    parsed.map_err(|source| ManifestError::ConfigParse {
      path: PathBuf::from(origin),
      source,
    })
  }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key maps to `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
  D: Deserializer<'de>,
{
  serde_json::Value::deserialize(deserializer).map(Some)
}
