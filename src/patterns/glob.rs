const WILD_SINGLE: &str = r"[^\/]*";
const WILD_OPEN: &str = r"(?:.+\/)?";

/// Compile a glob into an unanchored regular expression source.
///
/// `**` as a whole segment spans any number of directories, `*` stays within one segment,
/// and `.`, `?` and `+` are matched literally. Callers add `^`/`$` themselves.
pub fn glob_to_regex(glob: &str) -> String {
    let segments: Vec<&str> = glob.split('/').collect();
    let last = segments.len().saturating_sub(1);
    let mut regex = String::with_capacity(glob.len() * 2);

    for (index, segment) in segments.iter().enumerate() {
        let has_more = index < last;
        if *segment == "**" {
            regex.push_str(if has_more { WILD_OPEN } else { ".*" });
            continue;
        }

        push_escaped_segment(&mut regex, segment);
        if has_more {
            regex.push_str(r"\/");
        }
    }

    regex
}

fn push_escaped_segment(regex: &mut String, segment: &str) {
    for ch in segment.chars() {
        match ch {
            '.' => regex.push_str(r"\."),
            '?' => regex.push_str(r"\?"),
            '+' => regex.push_str(r"\+"),
            '*' => regex.push_str(WILD_SINGLE),
            other => regex.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::glob_to_regex;
    use regex::Regex;

    fn anchored(glob: &str) -> Regex {
        Regex::new(&format!("^{}$", glob_to_regex(glob))).unwrap()
    }

    #[test]
    fn compiles_single_segment_wildcards() {
        assert_eq!(glob_to_regex("/*.js"), r"\/[^\/]*\.js");
    }

    #[test]
    fn compiles_trailing_and_inner_globstars() {
        assert_eq!(glob_to_regex("/**"), r"\/.*");
        assert_eq!(glob_to_regex("/**/*.*"), r"\/(?:.+\/)?[^\/]*\.[^\/]*");
    }

    #[test]
    fn escapes_literal_punctuation() {
        assert_eq!(glob_to_regex("/a+b?.css"), r"\/a\+b\?\.css");
    }

    #[test]
    fn star_does_not_cross_directories() {
        let regex = anchored("/*.js");
        assert!(regex.is_match("/main.js"));
        assert!(!regex.is_match("/lib/main.js"));
    }

    #[test]
    fn globstar_spans_zero_or_more_directories() {
        let regex = anchored("/assets/**/*.png");
        assert!(regex.is_match("/assets/logo.png"));
        assert!(regex.is_match("/assets/icons/small/logo.png"));
        assert!(!regex.is_match("/other/logo.png"));
    }

    #[test]
    fn double_underscore_rules_match_any_segment() {
        let last = anchored("/**/*__*");
        let inner = anchored("/**/*__*/**");
        assert!(last.is_match("/api/__status"));
        assert!(!last.is_match("/__internal/page"));
        assert!(inner.is_match("/__internal/page"));
    }
}
