use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use stela_core::{ComponentId, TopologyId};
use stela_graph::Topology;
use tracing::debug;

/// Recent throughput samples of one topology, per component.
///
/// Each component owns two independent series (emit and execute), ordered
/// most-recent-last. When a window is set, the oldest samples are evicted
/// once a series grows past it. Samples are unsigned, so a negative value
/// is rejected when a history document is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyStatistics {
    pub topology_id: TopologyId,
    #[serde(skip)]
    window: usize,
    #[serde(default)]
    emit: BTreeMap<ComponentId, VecDeque<u64>>,
    #[serde(default)]
    execute: BTreeMap<ComponentId, VecDeque<u64>>,
}

impl TopologyStatistics {
    /// Unbounded history.
    pub fn new(topology_id: &str) -> Self {
        Self::with_window(topology_id, 0)
    }

    /// History keeping at most `window` samples per series (0 = unbounded).
    pub fn with_window(topology_id: &str, window: usize) -> Self {
        Self {
            topology_id: topology_id.to_string(),
            window,
            emit: BTreeMap::new(),
            execute: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window and trim every series to it.
    pub fn set_window(&mut self, window: usize) {
        self.window = window;
        if window == 0 {
            return;
        }
        for series in self.emit.values_mut().chain(self.execute.values_mut()) {
            while series.len() > window {
                series.pop_front();
            }
        }
    }

    pub fn record_emit(&mut self, component: &str, sample: u64) {
        push_sample(&mut self.emit, self.window, component, sample);
    }

    pub fn record_execute(&mut self, component: &str, sample: u64) {
        push_sample(&mut self.execute, self.window, component, sample);
    }

    /// Emit samples of a component, oldest first. Empty when nothing was recorded.
    pub fn emit_history(&self, component: &str) -> impl Iterator<Item = u64> + '_ {
        self.emit.get(component).into_iter().flatten().copied()
    }

    /// Execute samples of a component, oldest first. Empty when nothing was recorded.
    pub fn execute_history(&self, component: &str) -> impl Iterator<Item = u64> + '_ {
        self.execute.get(component).into_iter().flatten().copied()
    }

    pub fn emit_series(&self) -> impl Iterator<Item = (&ComponentId, &VecDeque<u64>)> {
        self.emit.iter()
    }

    pub fn execute_series(&self) -> impl Iterator<Item = (&ComponentId, &VecDeque<u64>)> {
        self.execute.iter()
    }

    /// Drop the series of components that are no longer part of `topology`.
    pub fn retain_components(&mut self, topology: &Topology) {
        let before = self.emit.len() + self.execute.len();
        self.emit.retain(|id, _| topology.components.contains_key(id));
        self.execute.retain(|id, _| topology.components.contains_key(id));
        let dropped = before - (self.emit.len() + self.execute.len());
        if dropped > 0 {
            debug!(topology = %self.topology_id, dropped, "dropped series of removed components");
        }
    }
}

fn push_sample(
    series: &mut BTreeMap<ComponentId, VecDeque<u64>>,
    window: usize,
    component: &str,
    sample: u64,
) {
    let samples = series.entry(component.to_string()).or_default();
    samples.push_back(sample);
    if window > 0 && samples.len() > window {
        samples.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest() {
        let mut h = TopologyStatistics::with_window("t", 3);
        for s in [1, 2, 3, 4, 5] {
            h.record_emit("spout", s);
        }
        assert_eq!(h.emit_history("spout").collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(h.execute_history("spout").count(), 0);
    }

    #[test]
    fn unbounded_keeps_everything() {
        let mut h = TopologyStatistics::new("t");
        for s in 0..50 {
            h.record_execute("bolt", s);
        }
        assert_eq!(h.execute_history("bolt").count(), 50);
    }

    #[test]
    fn set_window_trims_existing_series() {
        let mut h = TopologyStatistics::new("t");
        for s in [10, 20, 30, 40] {
            h.record_emit("a", s);
            h.record_execute("a", s);
        }
        h.set_window(2);
        assert_eq!(h.window(), 2);
        assert_eq!(h.emit_history("a").collect::<Vec<_>>(), vec![30, 40]);
        assert_eq!(h.execute_history("a").collect::<Vec<_>>(), vec![30, 40]);
    }

    #[test]
    fn retain_drops_unknown_components() {
        let mut topology = Topology::new("t");
        topology.add_edge("a", "b");

        let mut h = TopologyStatistics::new("t");
        h.record_emit("a", 1);
        h.record_emit("gone", 1);
        h.record_execute("gone", 1);
        h.retain_components(&topology);

        assert_eq!(h.emit_series().count(), 1);
        assert_eq!(h.execute_series().count(), 0);
    }

    #[test]
    fn parses_json_history() {
        let json = r#"{"topology_id":"t","emit":{"a":[10,10]},"execute":{"b":[8,8]}}"#;
        let h: TopologyStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(h.emit_history("a").sum::<u64>(), 20);
        assert_eq!(h.execute_history("b").collect::<Vec<_>>(), vec![8, 8]);
    }

    #[test]
    fn negative_samples_are_rejected() {
        let json = r#"{"topology_id":"t","emit":{"a":[10,-1]}}"#;
        assert!(serde_json::from_str::<TopologyStatistics>(json).is_err());
    }
}
