use crate::error::ScopeError;
use crate::naming;
use crate::scope::ScopeId;
use crate::tasks::Task;

use super::matcher::WildcardMatcher;
use super::parse::{self, OwnerFilter, StatusFilter};

/// Compiled selector: anchored matcher plus status and owner filters.
///
/// Scopes cache these by exact selector text, so a selector is compiled once per
/// scope and call site.
#[derive(Debug, Clone)]
pub struct Selector {
    text: String,
    pattern: String,
    matcher: WildcardMatcher,
    status: StatusFilter,
    owner: OwnerFilter,
}

impl Selector {
    /// Compiles `text` for a scope whose full name is `scope`.
    ///
    /// The pattern is prefixed by the scope name, so `test` in scope `foo.bar`
    /// matches exactly `foo.bar.test`.
    pub fn compile(text: &str, scope: &str) -> Result<Self, ScopeError> {
        let parsed = parse::parse(text)?;
        let pattern = naming::join(scope, parsed.pattern);
        let matcher = WildcardMatcher::new(&pattern, text)?;

        Ok(Self {
            text: text.to_string(),
            pattern,
            matcher,
            status: parsed.status,
            owner: parsed.owner,
        })
    }

    /// The selector text as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The scope-prefixed wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Status filter.
    pub fn status(&self) -> StatusFilter {
        self.status
    }

    /// Owner filter.
    pub fn owner(&self) -> OwnerFilter {
        self.owner
    }

    /// True if `full_type` matches the wildcard pattern (filters ignored).
    pub fn matches_type(&self, full_type: &str) -> bool {
        self.matcher.is_match(full_type)
    }

    /// True if `task` passes pattern, status and owner filters as seen from `viewer`.
    pub(crate) fn matches(&self, task: &Task, viewer: ScopeId) -> bool {
        self.matches_type(task.full_type())
            && self.status.accepts(task.status())
            && self.owner.accepts(task.is_owned_by(viewer))
    }
}
