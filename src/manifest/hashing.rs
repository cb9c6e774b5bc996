//! Content hashing of claimed files.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::filesystem::Filesystem;
use crate::patterns::join_urls;

/// Hash every file and return `(url, hash)` pairs in completion order.
///
/// At most `concurrency` hash calls are in flight at once; `1` hashes strictly one file
/// after another. The first failure aborts the whole batch.
pub async fn hash_files<F>(
  filesystem: &F,
  base_href: &str,
  files: &[String],
  concurrency: usize,
) -> ManifestResult<Vec<(String, String)>>
where
  F: Filesystem + ?Sized,
{
  let hashes: Vec<(String, String)> = stream::iter(files)
    .map(|file| async move {
      let hash = filesystem.hash(file).await?;
      Ok::<_, ManifestError>((join_urls(base_href, file), hash))
    })
    .buffer_unordered(concurrency.max(1))
    .try_collect()
    .await?;

  debug!("Hashed {} files", hashes.len());
  Ok(hashes)
}
