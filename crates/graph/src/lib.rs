//! Topology graph model: components, their adjacency, and structural checks.

pub mod topology;
pub mod validate;

pub use topology::{Component, Topology, TopologyStats};
pub use validate::topological_order;
