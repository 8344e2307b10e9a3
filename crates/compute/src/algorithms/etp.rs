use std::collections::BTreeMap;

use stela_core::ComponentId;
use stela_graph::Topology;

use super::rates::RateTable;

/// Share of end-to-end output attributable to each sink.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkShares {
    /// Sum of the sinks' emit rates.
    pub total_throughput: f64,
    pub shares: BTreeMap<ComponentId, f64>,
}

/// Split total sink output across sinks.
///
/// Returns `None` when the sinks emit nothing in total: there is no output to
/// distribute and nothing to rank.
pub fn sink_shares(topology: &Topology, emit_rates: &RateTable) -> Option<SinkShares> {
    let total_throughput: f64 = topology.sinks().map(|s| emit_rates.rate(&s.id)).sum();
    if total_throughput <= 0.0 {
        return None;
    }

    let shares = topology
        .sinks()
        .map(|s| (s.id.clone(), emit_rates.rate(&s.id) / total_throughput))
        .collect();

    Some(SinkShares {
        total_throughput,
        shares,
    })
}

/// Effective throughput percentage of every component.
///
/// A sink scores its share of total output. Any other component scores the
/// sum of its children's scores, skipping congested children entirely, so a
/// component whose every downstream path is blocked scores 0.
///
/// `order` must list every component parents-first (see
/// [`stela_graph::topological_order`]); walking it backwards lets each
/// component reuse its children's memoized scores instead of recursing.
pub fn etp_scores(
    topology: &Topology,
    order: &[ComponentId],
    sinks: &SinkShares,
    congestion: &BTreeMap<ComponentId, f64>,
) -> BTreeMap<ComponentId, f64> {
    let mut scores: BTreeMap<ComponentId, f64> = BTreeMap::new();

    for id in order.iter().rev() {
        let Some(component) = topology.get(id) else {
            continue;
        };

        let score = if component.is_sink() {
            sinks.shares.get(id).copied().unwrap_or(0.0)
        } else {
            component
                .children
                .iter()
                .filter(|child| !congestion.contains_key(*child))
                .map(|child| scores.get(child).copied().unwrap_or(0.0))
                .sum()
        };

        scores.insert(id.clone(), score);
    }

    scores
}
