//! Map data group configuration onto runtime routing rules.

use crate::config::DataGroupConfig;
use crate::duration::parse_duration;
use crate::error::ManifestResult;
use crate::models::DataGroupManifest;
use crate::patterns::url_to_regex;

/// Resolve a single data group. No filesystem access is involved.
pub fn resolve_data_group(
  group: &DataGroupConfig,
  base_href: &str,
) -> ManifestResult<DataGroupManifest> {
  let cache = &group.cache_config;
  Ok(DataGroupManifest {
    name: group.name.clone(),
    patterns: group
      .urls
      .iter()
      .map(|url| url_to_regex(url, base_href))
      .collect::<ManifestResult<_>>()?,
    strategy: cache.strategy.unwrap_or_default(),
    max_size: cache.max_size,
    max_age: parse_duration(&cache.max_age)?,
    timeout_ms: cache.timeout.as_deref().map(parse_duration).transpose()?,
    version: group.version.unwrap_or(1),
  })
}

/// Resolve every data group in declaration order.
pub fn resolve_data_groups(
  groups: &[DataGroupConfig],
  base_href: &str,
) -> ManifestResult<Vec<DataGroupManifest>> {
  groups
    .iter()
    .map(|group| resolve_data_group(group, base_href))
    .collect()
}
