use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use stela_core::{ComponentId, RankOrder, RankingConfig, Result, TopologyId};
use stela_graph::{topological_order, Topology};
use tracing::{info, warn};

use crate::algorithms::congestion::detect_congestion;
use crate::algorithms::etp::{etp_scores, sink_shares};
use crate::algorithms::ranking::{rank_components, RankedComponent};
use crate::algorithms::rates::RateTable;
use crate::history::TopologyStatistics;

/// Everything one ETP ranking computation derives from a topology snapshot
/// and its recent metrics.
///
/// Built fresh per call and never mutated afterwards; concurrent rankings
/// each build their own.
#[derive(Debug, Clone, Serialize)]
pub struct EtpAnalysis {
    pub topology_id: TopologyId,
    /// Smoothed emit rate of every component with emit samples.
    pub emit_rates: RateTable,
    /// Smoothed execute rate of every component with execute samples.
    pub execute_rates: RateTable,
    pub parallelism: BTreeMap<ComponentId, u32>,
    /// Components without parents, by id.
    pub sources: Vec<ComponentId>,
    /// Congested components and their backlog (`in - out`).
    pub congestion: BTreeMap<ComponentId, f64>,
    /// Sum of sink emit rates.
    pub total_throughput: f64,
    pub sink_shares: BTreeMap<ComponentId, f64>,
    /// ETP score per component. Empty when the sinks emit nothing.
    pub scores: BTreeMap<ComponentId, f64>,
    #[serde(skip)]
    topology: Topology,
}

impl EtpAnalysis {
    /// Validate `topology`, smooth the rates in `stats`, flag congestion and
    /// score every component.
    ///
    /// Fails on a malformed topology before any scoring happens. A topology
    /// whose sinks emit nothing is not an error: the analysis has no scores.
    pub fn compute(
        topology: &Topology,
        stats: &TopologyStatistics,
        config: &RankingConfig,
    ) -> Result<Self> {
        let start = Instant::now();
        let order = topological_order(topology)?;

        if !stats.topology_id.is_empty() && stats.topology_id != topology.id {
            warn!(
                topology = %topology.id,
                metrics = %stats.topology_id,
                "metrics history belongs to a different topology id"
            );
        }

        let mut emit_rates = RateTable::from_series(stats.emit_series());
        let mut execute_rates = RateTable::from_series(stats.execute_series());
        let known = |id: &ComponentId| topology.components.contains_key(id);
        let unknown = emit_rates.iter().filter(|(id, _)| !known(*id)).count()
            + execute_rates.iter().filter(|(id, _)| !known(*id)).count();
        if unknown > 0 {
            warn!(topology = %topology.id, unknown, "ignoring samples of components not in the topology");
            emit_rates.retain(known);
            execute_rates.retain(known);
        }

        let parallelism = topology
            .components
            .values()
            .map(|c| (c.id.clone(), c.parallelism))
            .collect();
        let sources = topology.sources().map(|c| c.id.clone()).collect();

        let slack = config.clone().normalized().congestion_slack;
        let congestion = detect_congestion(topology, &emit_rates, &execute_rates, slack);

        let (total_throughput, sink_shares, scores) = match sink_shares(topology, &emit_rates) {
            Some(shares) => {
                let scores = etp_scores(topology, &order, &shares, &congestion);
                (shares.total_throughput, shares.shares, scores)
            }
            None => {
                info!(topology = %topology.id, "Nothing to rank: sink throughput is 0");
                (0.0, BTreeMap::new(), BTreeMap::new())
            }
        };

        info!(
            "ETP computed for {} ({} components, {} scored, {} congested) in {:.1}ms",
            topology.id,
            topology.len(),
            scores.len(),
            congestion.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            topology_id: topology.id.clone(),
            emit_rates,
            execute_rates,
            parallelism,
            sources,
            congestion,
            total_throughput,
            sink_shares,
            scores,
            topology: topology.clone(),
        })
    }

    /// Components paired with their scores, sorted in `order`.
    pub fn rank(&self, order: RankOrder) -> Vec<RankedComponent> {
        rank_components(&self.topology, &self.scores, order)
    }

    /// Components most responsible for current effective throughput first.
    pub fn rank_descending(&self) -> Vec<RankedComponent> {
        self.rank(RankOrder::Desc)
    }

    /// Components contributing least first.
    pub fn rank_ascending(&self) -> Vec<RankedComponent> {
        self.rank(RankOrder::Asc)
    }

    /// Congested components, largest backlog first (ties by id).
    pub fn congested(&self) -> Vec<(&ComponentId, f64)> {
        let mut congested: Vec<_> = self.congestion.iter().map(|(id, &b)| (id, b)).collect();
        congested.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        congested
    }

    pub fn is_congested(&self, component: &str) -> bool {
        self.congestion.contains_key(component)
    }

    pub fn score(&self, component: &str) -> Option<f64> {
        self.scores.get(component).copied()
    }
}

#[cfg(test)]
mod tests;
