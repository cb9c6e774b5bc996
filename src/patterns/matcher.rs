use regex::Regex;

use crate::error::{ManifestError, ManifestResult};
use crate::patterns::{glob_to_regex, split_negation};

#[derive(Debug, Clone)]
struct CompiledGlob {
    positive: bool,
    regex: Regex,
}

/// Ordered include/exclude glob list compiled into a single path predicate.
///
/// Evaluation folds over the globs in declaration order starting from `false`: a positive
/// glob can add a match, a negated glob can only remove a match established before it. A
/// negation that appears before every positive glob therefore has no effect.
#[derive(Debug, Clone, Default)]
pub struct GlobMatcher {
    patterns: Vec<CompiledGlob>,
}

impl GlobMatcher {
    /// Compile every glob in the list, keeping declaration order.
    pub fn compile<S: AsRef<str>>(globs: &[S]) -> ManifestResult<Self> {
        let patterns = globs
            .iter()
            .map(|glob| -> ManifestResult<CompiledGlob> {
                let glob = glob.as_ref();
                let (positive, body) = split_negation(glob);
                let regex = Regex::new(&format!("^{}$", glob_to_regex(body))).map_err(|source| {
                    ManifestError::InvalidPattern {
                        glob: glob.to_string(),
                        source,
                    }
                })?;
                Ok(CompiledGlob { positive, regex })
            })
            .collect::<ManifestResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Returns `true` when the path survives the ordered fold.
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().fold(false, |is_match, pattern| {
            if pattern.positive {
                is_match || pattern.regex.is_match(path)
            } else {
                is_match && !pattern.regex.is_match(path)
            }
        })
    }

    /// Number of globs in the list.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` when no globs were supplied; such a matcher never matches.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
