pub mod algorithms;
pub mod collector;
pub mod engine;
pub mod history;
pub mod provider;
pub mod snapshot;

pub use algorithms::ranking::RankedComponent;
pub use algorithms::rates::{moving_average, RateTable};
pub use collector::{ClusterStatistics, NodeStatistics};
pub use engine::EtpAnalysis;
pub use history::TopologyStatistics;
pub use provider::{EtpRanker, InMemoryMetrics, InMemoryTopologies, MetricsSource, TopologySource};
pub use snapshot::RankingSnapshot;
pub use stela_core::RankOrder;
