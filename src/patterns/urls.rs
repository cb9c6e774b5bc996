use regex::Regex;

use crate::error::{ManifestError, ManifestResult};
use crate::patterns::glob_to_regex;

/// Join a base href and a path with exactly one `/` at the junction.
pub fn join_urls(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Compile a URL glob into an unanchored regex source for runtime routing.
///
/// Relative globs are resolved against `base_href` first. Globs that are already rooted
/// (`/...`) or carry a scheme (`https://...`) are compiled as written. The anchored result
/// must be a valid regular expression.
pub fn url_to_regex(url: &str, base_href: &str) -> ManifestResult<String> {
    let pattern = if url.starts_with('/') || url.contains("://") {
        glob_to_regex(url)
    } else {
        glob_to_regex(&join_urls(base_href, url))
    };

    Regex::new(&format!("^{pattern}$")).map_err(|source| ManifestError::InvalidPattern {
        glob: url.to_string(),
        source,
    })?;
    Ok(pattern)
}
