//! Node Selector — the one retained address set shared by every year.
//!
//! Both rules are pure, order-independent functions of the yearly graphs:
//! re-running on unchanged input always yields the same set, which is why
//! the persisted artifact can be keyed by the rule parameters alone.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Address, DiMultigraph, Year};
use crate::{Error, Result};

// ============================================================================
// Selection rules
// ============================================================================

/// Deterministic node-retention rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionRule {
    /// Keep addresses present in at least `min_years` of the study years;
    /// `None` means all of them — the intersection of every yearly node
    /// set, which is the default for longitudinal comparison.
    PresentInYears { min_years: Option<usize> },

    /// Keep the `count` addresses with the highest total degree (in + out,
    /// summed over all years). Ties break on address ordering so the result
    /// does not depend on iteration order.
    TopByDegree { count: usize },
}

impl Default for SelectionRule {
    fn default() -> Self {
        Self::PresentInYears { min_years: None }
    }
}

impl SelectionRule {
    /// Stable identifier used to key the persisted node-set artifact.
    pub fn key(&self) -> String {
        match self {
            Self::PresentInYears { min_years: None } => "present_in_years_all".into(),
            Self::PresentInYears { min_years: Some(k) } => format!("present_in_years_{k}"),
            Self::TopByDegree { count } => format!("top_by_degree_{count}"),
        }
    }
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Retained node set
// ============================================================================

/// The selected significant addresses, tagged with the rule that produced
/// them. Ordered set so every consumer sees one canonical iteration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSet {
    pub rule: SelectionRule,
    pub addresses: BTreeSet<Address>,
}

impl NodeSet {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Apply `rule` across all yearly raw graphs.
///
/// An empty result is a configuration error (threshold too strict, or no
/// input years at all) and is surfaced here, before any graph gets
/// narrowed against it.
pub fn select_nodes(
    rule: &SelectionRule,
    yearly: &BTreeMap<Year, DiMultigraph>,
) -> Result<NodeSet> {
    let addresses = match *rule {
        SelectionRule::PresentInYears { min_years } => {
            present_in_years(yearly, min_years.unwrap_or(yearly.len().max(1)))
        }
        SelectionRule::TopByDegree { count } => top_by_degree(yearly, count),
    };

    if addresses.is_empty() {
        return Err(Error::EmptyNodeSet { rule: rule.key() });
    }
    Ok(NodeSet { rule: *rule, addresses })
}

fn present_in_years(
    yearly: &BTreeMap<Year, DiMultigraph>,
    min_years: usize,
) -> BTreeSet<Address> {
    let mut presence: BTreeMap<&Address, usize> = BTreeMap::new();
    for graph in yearly.values() {
        for address in graph.nodes() {
            *presence.entry(address).or_insert(0) += 1;
        }
    }
    presence
        .into_iter()
        .filter(|&(_, years)| years >= min_years)
        .map(|(address, _)| address.clone())
        .collect()
}

fn top_by_degree(yearly: &BTreeMap<Year, DiMultigraph>, count: usize) -> BTreeSet<Address> {
    let mut degree: BTreeMap<&Address, usize> = BTreeMap::new();
    for graph in yearly.values() {
        for (id, address) in (0u32..).zip(graph.nodes()) {
            *degree.entry(address).or_insert(0) +=
                graph.out_degree(id) + graph.in_degree(id);
        }
    }
    let mut ranked: Vec<(&Address, usize)> = degree.into_iter().collect();
    // Highest degree first, ties on address order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(count)
        .map(|(address, _)| address.clone())
        .collect()
}
