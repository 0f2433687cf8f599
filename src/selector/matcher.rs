use regex::Regex;

use crate::error::ScopeError;

/// Anchored wildcard matcher over full task types.
#[derive(Debug, Clone)]
pub(crate) struct WildcardMatcher {
    re: Regex,
}

impl WildcardMatcher {
    /// Builds the matcher for an already validated, scope-prefixed pattern.
    pub(crate) fn new(pattern: &str, selector: &str) -> Result<Self, ScopeError> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*?");

        let re = Regex::new(&format!("^{body}$"))
            .map_err(|e| ScopeError::selector(selector, e.to_string()))?;
        Ok(Self { re })
    }

    pub(crate) fn is_match(&self, full_type: &str) -> bool {
        self.re.is_match(full_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str) -> WildcardMatcher {
        WildcardMatcher::new(pattern, pattern).unwrap()
    }

    #[test]
    fn test_prefix_wildcard() {
        let foo = m("foo.*");
        assert!(foo.is_match("foo.bar"));
        assert!(foo.is_match("foo.bar.har"));
        assert!(!foo.is_match("foobar"));
        assert!(!foo.is_match("foo"));
    }

    #[test]
    fn test_star_matches_everything() {
        let all = m("*");
        for t in ["a", "sample.task", "foo.bar.common.har.deeper.test"] {
            assert!(all.is_match(t));
        }
    }

    #[test]
    fn test_anchored_both_ends() {
        let t = m("*test");
        assert!(t.is_match("foo.bar.common.test"));
        assert!(!t.is_match("foo.test2"));
        let exact = m("sample.task");
        assert!(exact.is_match("sample.task"));
        assert!(!exact.is_match("sample.task.1"));
        assert!(!exact.is_match("xsample.task"));
    }

    #[test]
    fn test_dot_is_literal() {
        assert!(!m("a.b").is_match("axb"));
    }
}
