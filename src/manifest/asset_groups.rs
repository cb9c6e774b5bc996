//! Partition the build output into asset groups.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::AssetGroupConfig;
use crate::error::ManifestResult;
use crate::models::AssetGroupManifest;
use crate::patterns::{GlobMatcher, join_urls, url_to_regex};

/// Asset group entry together with the virtual paths it claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssetGroup {
  /// Manifest entry for the group.
  pub manifest: AssetGroupManifest,
  /// Claimed paths, sorted. These are the files that need hashing.
  pub files: Vec<String>,
}

/// Resolve one asset group against the full listing.
///
/// Paths already in `seen` belong to an earlier group and are skipped; every path this
/// group claims is added to `seen`. `files` globs claim before `versionedFiles` globs.
pub fn resolve_asset_group(
  group: &AssetGroupConfig,
  listing: &[String],
  seen: &mut BTreeSet<String>,
  base_href: &str,
) -> ManifestResult<ResolvedAssetGroup> {
  let versioned_globs = group.resources.versioned_files();
  if !versioned_globs.is_empty() {
    warn!(
      "Asset group '{}' uses the deprecated 'versionedFiles' option, which now behaves \
       exactly like 'files'. Use 'files' instead.",
      group.name
    );
  }

  let file_matcher = GlobMatcher::compile(&group.resources.files)?;
  let versioned_matcher = GlobMatcher::compile(versioned_globs)?;

  let plain = claim(listing, &file_matcher, seen);
  let versioned = claim(listing, &versioned_matcher, seen);

  let mut files: Vec<String> = plain.into_iter().chain(versioned).collect();
  files.sort();
  files.dedup();

  debug!("Asset group '{}' claimed {} files", group.name, files.len());

  let manifest = AssetGroupManifest {
    name: group.name.clone(),
    install_mode: group.resolved_install_mode(),
    update_mode: group.resolved_update_mode(),
    urls: files.iter().map(|file| join_urls(base_href, file)).collect(),
    patterns: group
      .resources
      .urls
      .iter()
      .map(|url| url_to_regex(url, base_href))
      .collect::<ManifestResult<_>>()?,
  };

  Ok(ResolvedAssetGroup { manifest, files })
}

/// Resolve every asset group in declaration order with a fresh exclusion set.
pub fn resolve_asset_groups(
  groups: &[AssetGroupConfig],
  listing: &[String],
  base_href: &str,
) -> ManifestResult<Vec<ResolvedAssetGroup>> {
  let mut seen = BTreeSet::new();
  groups
    .iter()
    .map(|group| resolve_asset_group(group, listing, &mut seen, base_href))
    .collect()
}

fn claim(listing: &[String], matcher: &GlobMatcher, seen: &mut BTreeSet<String>) -> Vec<String> {
  let claimed: Vec<String> = listing
    .iter()
    .filter(|file| matcher.is_match(file))
    .filter(|file| !seen.contains(*file))
    .cloned()
    .collect();
  seen.extend(claimed.iter().cloned());
  claimed
}
