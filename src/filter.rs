//! Task name filtering for report output
//!
//! Filtering only decides which results are rendered. Matching always runs
//! over the full task table, since names are not identities.

use anyhow::{Context, Result};
use regex::Regex;

use crate::differ::MatchResult;

/// Decides which tasks appear in rendered output
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// `None` shows every task
    pattern: Option<Regex>,
}

impl TaskFilter {
    /// Filter that shows every task
    pub fn all() -> Self {
        Self { pattern: None }
    }

    /// Show only tasks whose name matches `pattern`
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid task name filter: {}", pattern))?;
        Ok(Self {
            pattern: Some(regex),
        })
    }

    pub fn should_show(&self, name: &str) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(name),
            None => true,
        }
    }

    /// Results that pass the filter, order preserved
    pub fn apply<'r>(&self, results: &'r [MatchResult]) -> Vec<&'r MatchResult> {
        results
            .iter()
            .filter(|r| self.should_show(r.name()))
            .collect()
    }
}
