use serde::{Deserialize, Serialize};

/// Component identifier, unique within a topology.
pub type ComponentId = String;

/// Topology identifier.
pub type TopologyId = String;

/// Host identifier (supervisor hostname).
pub type HostId = String;

/// Role of an executor within its topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorRole {
    Spout,
    Bolt,
}

impl std::fmt::Display for ExecutorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorRole::Spout => write!(f, "spout"),
            ExecutorRole::Bolt => write!(f, "bolt"),
        }
    }
}

/// Placement and throughput of a single executor, as reported by one
/// metrics-collection pass.
///
/// Counters are unsigned, so negative values are rejected when a record is
/// deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorRecord {
    pub host: HostId,
    pub component_id: ComponentId,
    /// Task range label, e.g. "[3-4]".
    pub executor_id: String,
    pub role: ExecutorRole,
    #[serde(default)]
    pub emitted: u64,
    #[serde(default)]
    pub transferred: u64,
}

impl ExecutorRecord {
    pub fn new(
        host: &str,
        component_id: &str,
        executor_id: &str,
        role: ExecutorRole,
        emitted: u64,
        transferred: u64,
    ) -> Self {
        Self {
            host: host.to_string(),
            component_id: component_id.to_string(),
            executor_id: executor_id.to_string(),
            role,
            emitted,
            transferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_lowercase_role() {
        let json = r#"{"host":"node-1","component_id":"split","executor_id":"[1-1]","role":"bolt","emitted":40,"transferred":38}"#;
        let rec: ExecutorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.role, ExecutorRole::Bolt);
        assert_eq!(rec.emitted, 40);
        assert_eq!(rec.role.to_string(), "bolt");
    }

    #[test]
    fn negative_counters_are_rejected() {
        let json = r#"{"host":"h","component_id":"c","executor_id":"[1-1]","role":"spout","emitted":-5}"#;
        assert!(serde_json::from_str::<ExecutorRecord>(json).is_err());
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let json = r#"{"host":"h","component_id":"c","executor_id":"[1-1]","role":"spout"}"#;
        let rec: ExecutorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.emitted, 0);
        assert_eq!(rec.transferred, 0);
    }
}
