use thiserror::Error;

use crate::ComponentId;

#[derive(Error, Debug)]
pub enum StelaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Component {component} references unknown component {referenced}")]
    UnknownComponent {
        component: ComponentId,
        referenced: ComponentId,
    },

    #[error("Edge {parent} -> {child} is not recorded on both endpoints")]
    AsymmetricEdge { parent: ComponentId, child: ComponentId },

    #[error("Component {id} is stored under key {key}")]
    MismatchedKey { key: ComponentId, id: ComponentId },

    #[error("Component {0} is defined more than once")]
    DuplicateComponent(ComponentId),

    #[error("Component {0} has parallelism 0")]
    InvalidParallelism(ComponentId),

    #[error("Cycle detected through components: {}", .0.join(", "))]
    CycleDetected(Vec<ComponentId>),

    #[error("Topology not found: {0}")]
    TopologyNotFound(String),

    #[error("Metrics not found for topology: {0}")]
    MetricsNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for StelaError {
    fn from(err: serde_json::Error) -> Self {
        StelaError::Serialize(err.to_string())
    }
}

impl StelaError {
    /// True for errors caused by a malformed topology graph.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StelaError::UnknownComponent { .. }
                | StelaError::MismatchedKey { .. }
                | StelaError::DuplicateComponent(_)
                | StelaError::AsymmetricEdge { .. }
                | StelaError::InvalidParallelism(_)
                | StelaError::CycleDetected(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StelaError>;
