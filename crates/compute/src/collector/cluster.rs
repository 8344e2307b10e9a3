use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stela_core::{ExecutorRecord, HostId};
use tracing::debug;

use super::node::NodeStatistics;

/// Node statistics of every host seen during the current collection cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStatistics {
    cycle_started: DateTime<Utc>,
    nodes: BTreeMap<HostId, NodeStatistics>,
}

impl Default for ClusterStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterStatistics {
    pub fn new() -> Self {
        Self {
            cycle_started: Utc::now(),
            nodes: BTreeMap::new(),
        }
    }

    /// Discard the previous cycle's hosts and start a fresh one.
    pub fn begin_cycle(&mut self) {
        debug!(hosts = self.nodes.len(), "starting new collection cycle");
        self.nodes.clear();
        self.cycle_started = Utc::now();
    }

    /// Add an executor to its host, creating the host entry on first sight.
    pub fn record(&mut self, record: ExecutorRecord) {
        self.nodes
            .entry(record.host.clone())
            .or_insert_with(|| NodeStatistics::new(&record.host))
            .record(record);
    }

    pub fn node(&self, host: &str) -> Option<&NodeStatistics> {
        self.nodes.get(host)
    }

    /// All hosts, by host id.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeStatistics> {
        self.nodes.values()
    }

    /// The `n` hosts with the highest emit throughput (ties by host id).
    pub fn busiest(&self, n: usize) -> Vec<&NodeStatistics> {
        let mut nodes: Vec<&NodeStatistics> = self.nodes.values().collect();
        nodes.sort_by(|a, b| {
            b.emit_throughput()
                .cmp(&a.emit_throughput())
                .then_with(|| a.host_id().cmp(b.host_id()))
        });
        nodes.truncate(n);
        nodes
    }

    pub fn cycle_started(&self) -> DateTime<Utc> {
        self.cycle_started
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Extend<ExecutorRecord> for ClusterStatistics {
    fn extend<I: IntoIterator<Item = ExecutorRecord>>(&mut self, iter: I) {
        for record in iter {
            self.record(record);
        }
    }
}
