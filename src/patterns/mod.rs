//! Glob compilation and URL helpers shared by every resolution step.
//!
//! The glob compiler, the ordered include/exclude matcher and the URL join rules are kept in
//! separate submodules so each can be tested on its own. Everything that produces a routing
//! pattern for the runtime funnels through [`url_to_regex`].

mod glob;
mod matcher;
mod urls;

pub use glob::glob_to_regex;
pub use matcher::GlobMatcher;
pub use urls::{join_urls, url_to_regex};

/// Split a `!`-prefixed glob into its polarity and the glob body.
///
/// Returns `(true, glob)` for positive entries and `(false, rest)` for negated ones.
pub fn split_negation(glob: &str) -> (bool, &str) {
    match glob.strip_prefix('!') {
        Some(rest) => (false, rest),
        None => (true, glob),
    }
}
