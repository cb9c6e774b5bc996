//! Data structures making up the generated manifest.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::{CacheStrategy, InstallMode};

/// Manifest schema revision understood by the runtime cache controller.
pub const CONFIG_VERSION: u32 = 1;

/// Complete manifest returned by [`crate::ManifestGenerator::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  /// Always [`CONFIG_VERSION`].
  pub config_version: u32,
  /// Passthrough of the configuration's `appData`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub app_data: Option<serde_json::Value>,
  /// Application shell URL.
  pub index: String,
  /// Resolved asset groups in declaration order.
  pub asset_groups: Vec<AssetGroupManifest>,
  /// Resolved data groups in declaration order.
  pub data_groups: Vec<DataGroupManifest>,
  /// Content hash of every file claimed by an asset group.
  pub hash_table: HashTable,
  /// Ordered navigation rules.
  pub navigation_urls: Vec<NavigationUrl>,
}

/// Asset group entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroupManifest {
  /// Group name.
  pub name: String,
  /// Effective install mode.
  pub install_mode: InstallMode,
  /// Effective update mode.
  pub update_mode: InstallMode,
  /// Sorted URLs of the files claimed by the group.
  pub urls: Vec<String>,
  /// Regex sources for the group's external URL globs.
  pub patterns: Vec<String>,
}

/// Data group entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGroupManifest {
  /// Group name.
  pub name: String,
  /// Regex sources for the group's URL globs.
  pub patterns: Vec<String>,
  /// Effective caching strategy.
  pub strategy: CacheStrategy,
  /// Maximum number of cached responses.
  pub max_size: u64,
  /// Maximum age in milliseconds.
  pub max_age: u64,
  /// Network timeout in milliseconds.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
  /// Cache format version.
  pub version: u32,
}

/// One navigation rule; the runtime evaluates them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationUrl {
  /// `false` for exclusion rules.
  pub positive: bool,
  /// Anchored regex source.
  pub regex: String,
}

/// URL to content hash table with keys in ascending order.
///
/// Entries are sorted once on construction and serialised as a JSON object in that order,
/// so the output never depends on the order in which hashes were computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTable {
  entries: Vec<(String, String)>,
}

impl HashTable {
  /// Build a table from `(url, hash)` pairs in any order.
  ///
  /// If a URL appears more than once the last pair supplied wins.
  pub fn from_unordered(entries: impl IntoIterator<Item = (String, String)>) -> Self {
    let mut entries: Vec<(String, String)> = entries.into_iter().collect();
    entries.reverse();
    entries.sort_by(|left, right| left.0.cmp(&right.0));
    entries.dedup_by(|later, earlier| later.0 == earlier.0);
    Self { entries }
  }

  /// Hash recorded for a URL.
  pub fn get(&self, url: &str) -> Option<&str> {
    self
      .entries
      .binary_search_by(|(key, _)| key.as_str().cmp(url))
      .ok()
      .map(|index| self.entries[index].1.as_str())
  }

  /// URLs in ascending order.
  pub fn urls(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(url, _)| url.as_str())
  }

  /// `(url, hash)` pairs in ascending URL order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(url, hash)| (url.as_str(), hash.as_str()))
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no files were hashed.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Serialize for HashTable {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (url, hash) in &self.entries {
      map.serialize_entry(url, hash)?;
    }
    map.end()
  }
}
