//! Selector text → pattern + filters.

use crate::error::ScopeError;
use crate::tasks::TaskStatus;

/// Which task statuses a selector accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    /// Any live task.
    All,
    /// Only admitted tasks.
    Running,
    /// Only tasks waiting for admission.
    Scheduled,
}

impl StatusFilter {
    /// True if a task in `status` passes the filter.
    pub fn accepts(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Running => status == TaskStatus::Running,
            StatusFilter::Scheduled => status == TaskStatus::Scheduled,
        }
    }
}

/// Which creators a selector accepts, relative to the querying scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerFilter {
    /// Every creator in the domain.
    All,
    /// The querying scope or one of its descendants.
    Mine,
    /// Everyone else.
    Others,
}

impl OwnerFilter {
    /// `owned` tells whether the querying scope is on the creator's ownership chain.
    pub fn accepts(self, owned: bool) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Mine => owned,
            OwnerFilter::Others => !owned,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Property {
    All,
    Mine,
    Others,
    Running,
    Scheduled,
}

impl Property {
    fn parse(word: &str) -> Option<Self> {
        Some(match word {
            "all" => Property::All,
            "mine" => Property::Mine,
            "others" => Property::Others,
            "running" => Property::Running,
            "scheduled" => Property::Scheduled,
            _ => return None,
        })
    }
}

/// Parsed but not yet compiled selector.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Parsed<'a> {
    pub pattern: &'a str,
    pub status: StatusFilter,
    pub owner: OwnerFilter,
}

pub(crate) fn parse(text: &str) -> Result<Parsed<'_>, ScopeError> {
    let (pattern, props) = match text.find('[') {
        Some(open) => {
            let list = text[open..].trim_end();
            let Some(inner) = list.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
                return Err(ScopeError::selector(text, "unterminated property list"));
            };
            (text[..open].trim(), Some(inner))
        }
        None => (text.trim(), None),
    };

    validate_pattern(text, pattern)?;

    let (status, owner) = match props {
        None => (StatusFilter::All, OwnerFilter::Mine),
        Some(inner) => filters(text, inner)?,
    };

    Ok(Parsed {
        pattern,
        status,
        owner,
    })
}

fn validate_pattern(text: &str, pattern: &str) -> Result<(), ScopeError> {
    if pattern.is_empty() {
        return Err(ScopeError::selector(text, "empty pattern"));
    }
    if let Some(c) = pattern
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '*'))
    {
        return Err(ScopeError::selector(
            text,
            format!("disallowed character {c:?} in pattern"),
        ));
    }
    Ok(())
}

fn filters(text: &str, inner: &str) -> Result<(StatusFilter, OwnerFilter), ScopeError> {
    let words: Vec<&str> = inner.split(',').map(str::trim).collect();
    if words.len() > 2 {
        return Err(ScopeError::selector(text, "more than two properties"));
    }

    let mut props = Vec::with_capacity(words.len());
    for word in words {
        match Property::parse(word) {
            Some(p) => props.push(p),
            None if word.is_empty() => {
                return Err(ScopeError::selector(text, "empty property"));
            }
            None => {
                return Err(ScopeError::selector(
                    text,
                    format!("unknown property {word:?}"),
                ));
            }
        }
    }

    // A lone `all` widens both slots.
    if props == [Property::All] {
        return Ok((StatusFilter::All, OwnerFilter::All));
    }

    let mut status = None;
    let mut owner = None;
    let mut widened = false;
    for p in props {
        match p {
            Property::All => widened = true,
            Property::Running | Property::Scheduled => {
                if status.is_some() {
                    return Err(ScopeError::selector(text, "two status properties"));
                }
                status = Some(if p == Property::Running {
                    StatusFilter::Running
                } else {
                    StatusFilter::Scheduled
                });
            }
            Property::Mine | Property::Others => {
                if owner.is_some() {
                    return Err(ScopeError::selector(text, "two owner properties"));
                }
                owner = Some(if p == Property::Mine {
                    OwnerFilter::Mine
                } else {
                    OwnerFilter::Others
                });
            }
        }
    }

    // One status word alone keeps the default owner; `all` next to a word fills the other slot.
    let owner = match owner {
        Some(o) => o,
        None if widened => OwnerFilter::All,
        None => OwnerFilter::Mine,
    };
    Ok((status.unwrap_or(StatusFilter::All), owner))
}
