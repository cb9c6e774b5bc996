//! Ordered navigation rules deciding which requests get the application shell.

use crate::error::ManifestResult;
use crate::models::NavigationUrl;
use crate::patterns::{split_negation, url_to_regex};

/// Rules used when the configuration has no `navigationUrls`: everything, except URLs
/// whose last segment has a file extension and URLs with `__` in any segment.
pub const DEFAULT_NAVIGATION_URLS: [&str; 4] = ["/**", "!/**/*.*", "!/**/*__*", "!/**/*__*/**"];

/// Compile navigation globs into anchored rules, keeping their order.
pub fn process_navigation_urls<S: AsRef<str>>(
  base_href: &str,
  urls: &[S],
) -> ManifestResult<Vec<NavigationUrl>> {
  urls
    .iter()
    .map(|url| -> ManifestResult<NavigationUrl> {
      let (positive, glob) = split_negation(url.as_ref());
      Ok(NavigationUrl {
        positive,
        regex: format!("^{}$", url_to_regex(glob, base_href)?),
      })
    })
    .collect()
}
