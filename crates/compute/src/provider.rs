use std::collections::HashMap;

use rayon::prelude::*;
use stela_core::{RankOrder, RankingConfig, Result, StelaError, TopologyId};
use stela_graph::Topology;
use tracing::{info, warn};

use crate::algorithms::ranking::RankedComponent;
use crate::engine::EtpAnalysis;
use crate::history::TopologyStatistics;

/// Read access to current topology graphs.
pub trait TopologySource: Send + Sync {
    /// Snapshot of the component graph of `topology_id`.
    fn topology(&self, topology_id: &str) -> Result<Topology>;
}

/// Read access to recent per-component throughput samples.
pub trait MetricsSource: Send + Sync {
    /// Emit and execute sample history of `topology_id`.
    fn statistics(&self, topology_id: &str) -> Result<TopologyStatistics>;
}

/// Topologies held in memory, keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryTopologies {
    topologies: HashMap<TopologyId, Topology>,
}

impl InMemoryTopologies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topology: Topology) {
        self.topologies.insert(topology.id.clone(), topology);
    }
}

impl TopologySource for InMemoryTopologies {
    fn topology(&self, topology_id: &str) -> Result<Topology> {
        self.topologies
            .get(topology_id)
            .cloned()
            .ok_or_else(|| StelaError::TopologyNotFound(topology_id.to_string()))
    }
}

/// Metrics histories held in memory, keyed by topology id.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    histories: HashMap<TopologyId, TopologyStatistics>,
    lenient: bool,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topologies without a registered history get an empty one instead of
    /// failing with [`StelaError::MetricsNotFound`].
    pub fn lenient() -> Self {
        Self {
            histories: HashMap::new(),
            lenient: true,
        }
    }

    pub fn insert(&mut self, stats: TopologyStatistics) {
        self.histories.insert(stats.topology_id.clone(), stats);
    }

    pub fn get_mut(&mut self, topology_id: &str) -> Option<&mut TopologyStatistics> {
        self.histories.get_mut(topology_id)
    }
}

impl MetricsSource for InMemoryMetrics {
    fn statistics(&self, topology_id: &str) -> Result<TopologyStatistics> {
        match self.histories.get(topology_id) {
            Some(stats) => Ok(stats.clone()),
            None if self.lenient => Ok(TopologyStatistics::new(topology_id)),
            None => Err(StelaError::MetricsNotFound(topology_id.to_string())),
        }
    }
}

/// Ranks topologies on behalf of a scheduler.
///
/// Holds no state between calls besides its sources and config: every call
/// reads fresh snapshots and builds its own [`EtpAnalysis`].
pub struct EtpRanker<T, M> {
    topologies: T,
    metrics: M,
    config: RankingConfig,
}

impl<T: TopologySource, M: MetricsSource> EtpRanker<T, M> {
    pub fn new(topologies: T, metrics: M, config: RankingConfig) -> Self {
        Self {
            topologies,
            metrics,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Full analysis of one topology.
    pub fn analyze(&self, topology_id: &str) -> Result<EtpAnalysis> {
        let topology = self.topologies.topology(topology_id)?;
        let stats = self.metrics.statistics(topology_id)?;
        EtpAnalysis::compute(&topology, &stats, &self.config)
    }

    pub fn rank(&self, topology_id: &str, order: RankOrder) -> Result<Vec<RankedComponent>> {
        Ok(self.analyze(topology_id)?.rank(order))
    }

    pub fn rank_descending(&self, topology_id: &str) -> Result<Vec<RankedComponent>> {
        self.rank(topology_id, RankOrder::Desc)
    }

    pub fn rank_ascending(&self, topology_id: &str) -> Result<Vec<RankedComponent>> {
        self.rank(topology_id, RankOrder::Asc)
    }

    /// Rank independent topologies in parallel.
    ///
    /// Results keep the order of `topology_ids`; one failing topology does
    /// not affect the others.
    pub fn rank_all(
        &self,
        topology_ids: &[TopologyId],
        order: RankOrder,
    ) -> Vec<(TopologyId, Result<Vec<RankedComponent>>)> {
        let results: Vec<_> = topology_ids
            .par_iter()
            .map(|id| (id.clone(), self.rank(id, order)))
            .collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "some topologies could not be ranked");
        }
        info!("Ranked {} topologies", results.len() - failed);
        results
    }
}
