//! Glob existence/absence conditions
//!
//! A condition is a list of globs and a polarity. It holds when at least one
//! of its globs has the expected outcome: matching some path for
//! [`Polarity::MustExist`], matching no path for [`Polarity::MustBeAbsent`].
//! A document is accepted when every condition holds.
//!
//! Globs use shell `fnmatch` rules without path-name mode, so `*` also spans
//! dots: `a.*` matches `a.b` and `a.b.c`, and `*` matches any path.

use super::flatten::{flatten, PathSet};
use crate::config::QueryConfig;
use crate::domain::{Result, SampleError};
use glob::Pattern;
use serde_json::Value;

/// Whether a condition's globs must match or must not match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    MustExist,
    MustBeAbsent,
}

/// One glob list with its expected polarity
#[derive(Debug, Clone)]
pub struct Condition {
    globs: Vec<Pattern>,
    polarity: Polarity,
}

impl Condition {
    /// Compile a condition
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty list or invalid glob syntax.
    pub fn new<S: AsRef<str>>(globs: &[S], polarity: Polarity) -> Result<Self> {
        if globs.is_empty() {
            return Err(SampleError::Configuration(
                "condition needs at least one glob".to_string(),
            ));
        }

        let globs = globs
            .iter()
            .map(|g| {
                Pattern::new(g.as_ref()).map_err(|e| {
                    SampleError::Configuration(format!("invalid glob '{}': {e}", g.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { globs, polarity })
    }

    /// Polarity of this condition
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Whether the condition holds for `paths`
    pub fn is_satisfied(&self, paths: &PathSet) -> bool {
        let expect = self.polarity == Polarity::MustExist;
        self.globs
            .iter()
            .any(|glob| paths.iter().any(|path| glob.matches(path)) == expect)
    }
}

/// Conjunction of conditions deciding document inclusion
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// Create a set from already compiled conditions
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Compile the `existing` and `missing` glob lists of a query configuration
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        let existing = config
            .existing
            .iter()
            .map(|globs| Condition::new(globs, Polarity::MustExist));
        let missing = config
            .missing
            .iter()
            .map(|globs| Condition::new(globs, Polarity::MustBeAbsent));

        Ok(Self::new(existing.chain(missing).collect::<Result<Vec<_>>>()?))
    }

    /// Whether there is nothing to check
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether every condition holds for `paths`
    pub fn matches(&self, paths: &PathSet) -> bool {
        self.conditions.iter().all(|c| c.is_satisfied(paths))
    }

    /// Whether a document source is accepted
    ///
    /// Flattening is skipped entirely when there are no conditions.
    pub fn accepts(&self, source: Option<&Value>) -> bool {
        if self.is_empty() {
            return true;
        }
        let paths = source.map(flatten).unwrap_or_default();
        self.matches(&paths)
    }
}
