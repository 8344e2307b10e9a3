use std::path::Path;

use serde::{Deserialize, Serialize};
use stela_core::{ExecutorRecord, HistoryConfig, Result};
use stela_graph::Topology;
use tracing::info;

use crate::history::TopologyStatistics;

/// A topology and its metrics history, as captured for offline ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub topology: Topology,
    /// Absent history ranks as if no samples were recorded yet.
    #[serde(default)]
    pub statistics: Option<TopologyStatistics>,
}

impl RankingSnapshot {
    /// Load a JSON snapshot and bound its history to the configured window.
    pub fn from_file(path: impl AsRef<Path>, history: &HistoryConfig) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut snapshot = Self::from_json(&content)?;
        snapshot.apply_window(history.window);
        info!(
            path = %path.as_ref().display(),
            topology = %snapshot.topology.id,
            components = snapshot.topology.len(),
            "loaded ranking snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// History of the snapshot, or an empty one for its topology.
    pub fn statistics(&self) -> TopologyStatistics {
        self.statistics
            .clone()
            .unwrap_or_else(|| TopologyStatistics::new(&self.topology.id))
    }

    fn apply_window(&mut self, window: usize) {
        if let Some(stats) = self.statistics.as_mut() {
            stats.set_window(window);
        }
    }
}

/// Load a JSON array of executor records.
pub fn load_executor_records(path: impl AsRef<Path>) -> Result<Vec<ExecutorRecord>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let records: Vec<ExecutorRecord> = serde_json::from_str(&content)?;
    info!(path = %path.as_ref().display(), records = records.len(), "loaded executor records");
    Ok(records)
}
