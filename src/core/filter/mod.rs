//! Document inclusion filter
//!
//! [`flatten`] reduces a source document to its leaf paths and a
//! [`ConditionSet`] decides whether those paths satisfy the configured
//! existence and absence globs.

pub mod condition;
pub mod flatten;

pub use condition::{Condition, ConditionSet, Polarity};
pub use flatten::{flatten, PathSet};
