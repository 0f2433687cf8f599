//! Dotted type names: grammar check and scope joining.
//!
//! ```text
//! type    := head ('.' segment)*
//! head    := [a-z_][a-z_0-9]*
//! segment := [a-z_0-9]+
//! ```
//!
//! Only the very first character is restricted to a letter or underscore, so
//! numbered types such as `sample.task.3` are valid.

use std::sync::LazyLock;

use regex::Regex;

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z_0-9]*(\.[a-z_0-9]+)*$").expect("static type grammar")
});

/// True if `value` is a well-formed dotted type name.
pub(crate) fn is_valid_type(value: &str) -> bool {
    TYPE_RE.is_match(value)
}

/// Joins two dotted names, skipping empty sides.
pub(crate) fn join(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a}.{b}"),
    }
}
