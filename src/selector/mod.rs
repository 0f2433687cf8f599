//! # Selectors: wildcard type patterns with status/owner filters.
//!
//! A selector is written as
//!
//! ```text
//! <pattern>[ '[' property (',' property)? ']' ]
//! property := all | mine | others | running | scheduled
//! ```
//!
//! and compiled once per scope into a [`Selector`]:
//! - [`matcher`]: `*` → non-greedy run, anchored at both ends against the full type
//! - [`parse`]: property words → [`StatusFilter`] × [`OwnerFilter`]
//!
//! Defaults are `status = all`, `owner = mine`. A single bare `all` widens both.
//!
//! ## Example
//! ```rust
//! use taskscope::{OwnerFilter, Selector, StatusFilter};
//!
//! let sel = Selector::compile("test* [others, running]", "foo.bar").unwrap();
//! assert_eq!(sel.status(), StatusFilter::Running);
//! assert_eq!(sel.owner(), OwnerFilter::Others);
//! assert!(sel.matches_type("foo.bar.test.delayed"));
//! assert!(!sel.matches_type("foo.test"));
//! ```

mod compiled;
mod matcher;
mod parse;

pub use compiled::Selector;
pub use parse::{OwnerFilter, StatusFilter};
