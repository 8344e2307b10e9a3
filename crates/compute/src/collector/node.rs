use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stela_core::{ComponentId, ExecutorRecord, ExecutorRole, HostId};

/// Running totals and executor lists of one host for one collection cycle.
///
/// Lists are append-only and keep discovery order. Totals saturate at
/// `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatistics {
    host_id: HostId,
    transfer_throughput: u64,
    emit_throughput: u64,
    spouts: Vec<ExecutorRecord>,
    bolts: Vec<ExecutorRecord>,
    /// Emitted events per spout component on this host.
    spout_throughput: BTreeMap<ComponentId, u64>,
    /// Emitted events per bolt component on this host.
    bolt_throughput: BTreeMap<ComponentId, u64>,
    collected_at: DateTime<Utc>,
}

impl NodeStatistics {
    pub fn new(host_id: &str) -> Self {
        Self {
            host_id: host_id.to_string(),
            transfer_throughput: 0,
            emit_throughput: 0,
            spouts: Vec::new(),
            bolts: Vec::new(),
            spout_throughput: BTreeMap::new(),
            bolt_throughput: BTreeMap::new(),
            collected_at: Utc::now(),
        }
    }

    pub fn add_spout(&mut self, record: ExecutorRecord) {
        self.spouts.push(record);
    }

    pub fn add_bolt(&mut self, record: ExecutorRecord) {
        self.bolts.push(record);
    }

    pub fn add_transfer_throughput(&mut self, value: u64) {
        self.transfer_throughput = self.transfer_throughput.saturating_add(value);
    }

    pub fn add_emit_throughput(&mut self, value: u64) {
        self.emit_throughput = self.emit_throughput.saturating_add(value);
    }

    /// File an executor under its role and add its counters to the host
    /// totals and to its component's throughput.
    ///
    /// The caller routes records by host; `record.host` is not checked here.
    pub fn record(&mut self, record: ExecutorRecord) {
        self.add_transfer_throughput(record.transferred);
        self.add_emit_throughput(record.emitted);

        let per_component = match record.role {
            ExecutorRole::Spout => &mut self.spout_throughput,
            ExecutorRole::Bolt => &mut self.bolt_throughput,
        };
        let total = per_component.entry(record.component_id.clone()).or_default();
        *total = total.saturating_add(record.emitted);

        match record.role {
            ExecutorRole::Spout => self.add_spout(record),
            ExecutorRole::Bolt => self.add_bolt(record),
        }
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn transfer_throughput(&self) -> u64 {
        self.transfer_throughput
    }

    pub fn emit_throughput(&self) -> u64 {
        self.emit_throughput
    }

    pub fn spouts(&self) -> &[ExecutorRecord] {
        &self.spouts
    }

    pub fn bolts(&self) -> &[ExecutorRecord] {
        &self.bolts
    }

    pub fn spout_throughput(&self) -> &BTreeMap<ComponentId, u64> {
        &self.spout_throughput
    }

    pub fn bolt_throughput(&self) -> &BTreeMap<ComponentId, u64> {
        &self.bolt_throughput
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn executor_count(&self) -> usize {
        self.spouts.len() + self.bolts.len()
    }
}
