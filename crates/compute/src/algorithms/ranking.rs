use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use stela_core::{ComponentId, RankOrder};
use stela_graph::{Component, Topology};

/// A component together with its ETP score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedComponent {
    pub component: Component,
    pub score: f64,
}

impl RankedComponent {
    pub fn id(&self) -> &str {
        &self.component.id
    }
}

// Ordered by (score, id). Equal scores fall back to the component id, so the
// order is total and repeatable.
impl PartialEq for RankedComponent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedComponent {}

impl Ord for RankedComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.component.id.cmp(&other.component.id))
    }
}

impl PartialOrd for RankedComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pair every scored component with its definition and sort.
///
/// Ascending sorts by `(score, id)`; descending is the exact reverse, so
/// components with equal scores appear in descending id order.
pub fn rank_components(
    topology: &Topology,
    scores: &BTreeMap<ComponentId, f64>,
    order: RankOrder,
) -> Vec<RankedComponent> {
    let mut ranked: Vec<RankedComponent> = scores
        .iter()
        .filter_map(|(id, &score)| {
            topology.get(id).map(|component| RankedComponent {
                component: component.clone(),
                score,
            })
        })
        .collect();

    ranked.sort();
    if order == RankOrder::Desc {
        ranked.reverse();
    }
    ranked
}
