//! Canonical display order for regression variables
//!
//! Known variables follow a fixed presentation order (instrument variables
//! first for instrumented designs); anything else is shown afterwards,
//! sorted lexicographically.

use crate::config::PresentationConfig;
use std::collections::HashMap;

/// Normalize a variable name for comparison: strip backticks, trim, lower-case
pub fn normalize_name(name: &str) -> String {
    name.replace('`', "").trim().to_lowercase()
}

/// Priority ranks for baseline and instrumented layouts
#[derive(Debug, Clone)]
pub struct VariableOrder {
    baseline_rank: HashMap<String, usize>,
    iv_rank: HashMap<String, usize>,
}

impl VariableOrder {
    /// Build ranks from the two priority lists (entries are normalized here)
    pub fn new<S: AsRef<str>>(baseline: &[S], instrument: &[S]) -> Self {
        Self {
            baseline_rank: rank_map(baseline.iter().map(|s| s.as_ref())),
            iv_rank: rank_map(
                instrument
                    .iter()
                    .map(|s| s.as_ref())
                    .chain(baseline.iter().map(|s| s.as_ref())),
            ),
        }
    }

    /// Position of a name in the priority list, if known
    pub fn rank(&self, name: &str, is_iv: bool) -> Option<usize> {
        let ranks = if is_iv {
            &self.iv_rank
        } else {
            &self.baseline_rank
        };
        ranks.get(&normalize_name(name)).copied()
    }

    /// Order names for display: known names by priority, then unknown names sorted
    pub fn sort<S: AsRef<str>>(&self, names: &[S], is_iv: bool) -> Vec<String> {
        let mut known: Vec<(usize, &str)> = Vec::new();
        let mut unknown: Vec<&str> = Vec::new();

        for name in names.iter().map(|s| s.as_ref()) {
            match self.rank(name, is_iv) {
                Some(rank) => known.push((rank, name)),
                None => unknown.push(name),
            }
        }

        // raw-name tie-break keeps the order independent of input order
        known.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        unknown.sort_unstable();

        known
            .into_iter()
            .map(|(_, name)| name)
            .chain(unknown)
            .map(str::to_string)
            .collect()
    }
}

impl Default for VariableOrder {
    fn default() -> Self {
        PresentationConfig::default().variable_order()
    }
}

fn rank_map<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut ranks = HashMap::new();
    for name in names {
        let next = ranks.len();
        ranks.entry(normalize_name(name)).or_insert(next);
    }
    ranks
}

/// Sort variable names with the built-in presentation order
pub fn sort_variables<S: AsRef<str>>(names: &[S], is_iv: bool) -> Vec<String> {
    VariableOrder::default().sort(names, is_iv)
}
