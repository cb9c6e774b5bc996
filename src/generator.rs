//! Manifest generator tying configuration, filesystem and resolution steps together.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::ManifestResult;
use crate::filesystem::Filesystem;
use crate::manifest::{
  DEFAULT_NAVIGATION_URLS, hash_files, process_navigation_urls, resolve_asset_groups,
  resolve_data_groups,
};
use crate::models::{CONFIG_VERSION, HashTable, Manifest};
use crate::patterns::join_urls;

/// Default number of concurrent hash calls.
pub const DEFAULT_HASH_CONCURRENCY: usize = 8;

/// Directory listed for asset group resolution.
const LISTING_ROOT: &str = "/";

/// Consumes caching configurations and turns them into manifests.
///
/// The generator holds only its filesystem, base href and hashing limit, so one instance can
/// process any number of configurations.
#[derive(Debug)]
pub struct ManifestGenerator<F> {
  filesystem: F,
  base_href: String,
  hash_concurrency: usize,
}

impl<F: Filesystem> ManifestGenerator<F> {
  /// Create a generator serving URLs below `base_href`.
  pub fn new(filesystem: F, base_href: impl Into<String>) -> Self {
    Self {
      filesystem,
      base_href: base_href.into(),
      hash_concurrency: DEFAULT_HASH_CONCURRENCY,
    }
  }

  /// Limit the number of in-flight hash calls. `1` hashes sequentially.
  pub fn with_hash_concurrency(mut self, limit: usize) -> Self {
    self.hash_concurrency = limit.max(1);
    self
  }

  /// Filesystem the generator reads from.
  pub fn filesystem(&self) -> &F {
    &self.filesystem
  }

  /// Base href every URL in the manifest is resolved against.
  pub fn base_href(&self) -> &str {
    &self.base_href
  }

  /// Produce the manifest for `config` from the current filesystem contents.
  pub async fn process(&self, config: &Config) -> ManifestResult<Manifest> {
    let data_groups = resolve_data_groups(&config.data_groups, &self.base_href)?;
    let navigation_urls = match &config.navigation_urls {
      Some(urls) => process_navigation_urls(&self.base_href, urls)?,
      None => process_navigation_urls(&self.base_href, &DEFAULT_NAVIGATION_URLS)?,
    };

    let listing = self.filesystem.list(LISTING_ROOT).await?;
    debug!("Resolving {} asset groups over {} files", config.asset_groups.len(), listing.len());

    let resolved = resolve_asset_groups(&config.asset_groups, &listing, &self.base_href)?;
    let claimed: Vec<String> = resolved
      .iter()
      .flat_map(|group| group.files.iter().cloned())
      .collect();
    let hashes = hash_files(
      &self.filesystem,
      &self.base_href,
      &claimed,
      self.hash_concurrency,
    )
    .await?;
    let hash_table = HashTable::from_unordered(hashes);

    info!(
      "Generated manifest with {} asset groups, {} data groups and {} hashed files",
      resolved.len(),
      data_groups.len(),
      hash_table.len()
    );

    Ok(Manifest {
      config_version: CONFIG_VERSION,
      app_data: config.app_data.clone(),
      index: join_urls(&self.base_href, &config.index),
      asset_groups: resolved.into_iter().map(|group| group.manifest).collect(),
      data_groups,
      hash_table,
      navigation_urls,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{
    AssetGroupConfig, AssetResources, CacheConfig, CacheStrategy, DataGroupConfig, InstallMode,
  };
  use crate::error::ManifestError;
  use crate::filesystem::{InMemoryFilesystem, content_hash};
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn config(asset_groups: Vec<AssetGroupConfig>) -> Config {
    Config {
      index: "/index.html".into(),
      app_data: None,
      asset_groups,
      data_groups: Vec::new(),
      navigation_urls: None,
    }
  }

  fn group(name: &str, files: &[&str]) -> AssetGroupConfig {
    AssetGroupConfig {
      name: name.into(),
      install_mode: None,
      update_mode: None,
      resources: AssetResources {
        files: files.iter().map(|glob| glob.to_string()).collect(),
        ..AssetResources::default()
      },
    }
  }

  #[tokio::test]
  async fn resolves_a_single_group_end_to_end() -> ManifestResult<()> {
    let filesystem =
      InMemoryFilesystem::from_files([("/a.js", "a"), ("/b.js", "b"), ("/c.txt", "c")]);
    let generator = ManifestGenerator::new(filesystem, "/");

    let manifest = generator.process(&config(vec![group("app", &["/*.js"])])).await?;

    assert_eq!(manifest.config_version, 1);
    assert_eq!(manifest.index, "/index.html");
    let app = &manifest.asset_groups[0];
    assert_eq!(app.urls, vec!["/a.js", "/b.js"]);
    assert_eq!(app.install_mode, InstallMode::Prefetch);
    assert_eq!(app.update_mode, InstallMode::Prefetch);
    assert_eq!(manifest.hash_table.urls().collect::<Vec<_>>(), vec!["/a.js", "/b.js"]);
    assert_eq!(manifest.hash_table.get("/a.js"), Some(content_hash(b"a").as_str()));
    assert_eq!(manifest.navigation_urls.len(), 4);
    Ok(())
  }

  #[tokio::test]
  async fn hash_table_is_sorted_regardless_of_input_order() -> ManifestResult<()> {
    let filesystem = InMemoryFilesystem::from_files([
      ("/z/last.js", "z"),
      ("/m.css", "m"),
      ("/a/first.png", "a"),
      ("/index.html", "i"),
    ]);
    let generator = ManifestGenerator::new(filesystem, "/base").with_hash_concurrency(3);
    let groups = vec![group("styles", &["/*.css"]), group("rest", &["/**"])];

    let manifest = generator.process(&config(groups)).await?;

    assert_eq!(manifest.hash_table.urls().collect::<Vec<_>>(), vec![
      "/base/a/first.png",
      "/base/index.html",
      "/base/m.css",
      "/base/z/last.js",
    ]);
    assert_eq!(manifest.asset_groups[0].urls, vec!["/base/m.css"]);
    assert_eq!(manifest.asset_groups[1].urls, vec![
      "/base/a/first.png",
      "/base/index.html",
      "/base/z/last.js",
    ]);

    let json = serde_json::to_string(&manifest.hash_table).unwrap();
    let positions: Vec<usize> = manifest
      .hash_table
      .urls()
      .map(|url| json.find(url).unwrap())
      .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
  }

  #[tokio::test]
  async fn sequential_and_concurrent_hashing_agree() -> ManifestResult<()> {
    let files: Vec<(String, String)> = (0..40)
      .map(|index| (format!("/chunk-{index:02}.js"), format!("chunk {index}")))
      .collect();
    let groups = vec![group("app", &["/chunk-0*.js"]), group("lazy", &["/*.js"])];

    let sequential = ManifestGenerator::new(InMemoryFilesystem::from_files(files.clone()), "/")
      .with_hash_concurrency(1)
      .process(&config(groups.clone()))
      .await?;
    let concurrent = ManifestGenerator::new(InMemoryFilesystem::from_files(files), "/")
      .with_hash_concurrency(16)
      .process(&config(groups))
      .await?;

    assert_eq!(sequential, concurrent);
    assert_eq!(sequential.hash_table.len(), 40);
    Ok(())
  }

  #[tokio::test]
  async fn every_claimed_file_is_hashed_exactly_once() -> ManifestResult<()> {
    let filesystem = InMemoryFilesystem::from_files([
      ("/index.html", "i"),
      ("/main.js", "m"),
      ("/assets/a.png", "a"),
      ("/readme.md", "r"),
    ]);
    let groups = vec![
      group("shell", &["/index.html", "/*.js"]),
      group("assets", &["/assets/**", "/*.js"]),
    ];

    let manifest = ManifestGenerator::new(filesystem, "/").process(&config(groups)).await?;

    let grouped: Vec<&str> = manifest
      .asset_groups
      .iter()
      .flat_map(|group| group.urls.iter().map(String::as_str))
      .collect();
    assert_eq!(grouped.len(), 3);
    let mut table: Vec<&str> = manifest.hash_table.urls().collect();
    let mut sorted_grouped = grouped.clone();
    sorted_grouped.sort();
    table.sort();
    assert_eq!(table, sorted_grouped);
    assert!(manifest.hash_table.get("/readme.md").is_none());
    Ok(())
  }

  #[tokio::test]
  async fn composes_data_groups_navigation_and_app_data() -> ManifestResult<()> {
    let mut config = config(Vec::new());
    config.index = "index.html".into();
    config.app_data = Some(serde_json::json!({ "release": "2.1.0" }));
    config.navigation_urls = Some(vec!["/**".into(), "!/api/**".into()]);
    config.data_groups = vec![DataGroupConfig {
      name: "api".into(),
      urls: vec!["/api/**".into()],
      version: None,
      cache_config: CacheConfig {
        max_size: 20,
        max_age: "1d".into(),
        timeout: None,
        strategy: None,
      },
    }];

    let manifest = ManifestGenerator::new(InMemoryFilesystem::new(), "/app")
      .process(&config)
      .await?;

    assert_eq!(manifest.index, "/app/index.html");
    assert_eq!(manifest.app_data, config.app_data);
    assert!(manifest.asset_groups.is_empty());
    assert!(manifest.hash_table.is_empty());

    let api = &manifest.data_groups[0];
    assert_eq!(api.max_age, 86_400_000);
    assert_eq!(api.timeout_ms, None);
    assert_eq!(api.version, 1);
    assert_eq!(api.strategy, CacheStrategy::Performance);

    assert_eq!(
      manifest
        .navigation_urls
        .iter()
        .map(|rule| rule.positive)
        .collect::<Vec<_>>(),
      vec![true, false]
    );
    Ok(())
  }

  #[tokio::test]
  async fn null_app_data_is_written_as_null() -> ManifestResult<()> {
    let config = Config::from_json_str(r#"{ "index": "/index.html", "appData": null }"#)?;

    let manifest = ManifestGenerator::new(InMemoryFilesystem::new(), "/")
      .process(&config)
      .await?;
    let json: serde_json::Value = serde_json::to_value(&manifest).unwrap();

    assert_eq!(json.get("appData"), Some(&serde_json::Value::Null));
    Ok(())
  }

  #[tokio::test]
  async fn generator_is_reusable_across_runs() -> ManifestResult<()> {
    let filesystem = InMemoryFilesystem::from_files([("/main.js", "v1")]);
    let generator = ManifestGenerator::new(filesystem, "/");
    let config = config(vec![group("app", &["/*.js"])]);

    let first = generator.process(&config).await?;
    generator.filesystem().write("/main.js", "v2").await?;
    let second = generator.process(&config).await?;

    assert_eq!(first.asset_groups, second.asset_groups);
    assert_ne!(first.hash_table.get("/main.js"), second.hash_table.get("/main.js"));
    assert_eq!(second.hash_table.get("/main.js"), Some(content_hash(b"v2").as_str()));
    Ok(())
  }

  struct FailingHashes {
    listed: Vec<String>,
    hash_calls: AtomicUsize,
  }

  #[async_trait]
  impl Filesystem for FailingHashes {
    async fn list(&self, _dir: &str) -> ManifestResult<Vec<String>> {
      Ok(self.listed.clone())
    }

    async fn hash(&self, file: &str) -> ManifestResult<String> {
      self.hash_calls.fetch_add(1, Ordering::SeqCst);
      Err(ManifestError::Hash {
        path: file.to_string(),
        source: std::io::Error::other("disk on fire"),
      })
    }

    async fn write(&self, _file: &str, _contents: &str) -> ManifestResult<()> {
      Ok(())
    }
  }

  #[tokio::test]
  async fn filesystem_failures_abort_the_run() {
    let filesystem = FailingHashes {
      listed: vec!["/main.js".into()],
      hash_calls: AtomicUsize::new(0),
    };
    let generator = ManifestGenerator::new(filesystem, "/");

    let err = generator
      .process(&config(vec![group("app", &["/*.js"])]))
      .await
      .unwrap_err();

    assert!(err.is_filesystem());
    assert!(err.to_string().contains("disk on fire"));
    assert_eq!(generator.filesystem().hash_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn configuration_errors_surface_before_any_hashing() {
    let filesystem = FailingHashes {
      listed: vec!["/main.js".into()],
      hash_calls: AtomicUsize::new(0),
    };
    let generator = ManifestGenerator::new(filesystem, "/");
    let mut config = config(vec![group("app", &["/*.js"])]);
    config.data_groups = vec![DataGroupConfig {
      name: "api".into(),
      urls: Vec::new(),
      version: None,
      cache_config: CacheConfig {
        max_size: 1,
        max_age: "forever".into(),
        timeout: None,
        strategy: None,
      },
    }];

    let err = generator.process(&config).await.unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(generator.filesystem().hash_calls.load(Ordering::SeqCst), 0);
  }
}
