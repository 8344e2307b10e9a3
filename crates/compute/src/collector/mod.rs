//! Per-host executor placement and throughput, gathered once per
//! metrics-collection cycle for node-level load reporting.
//!
//! Independent of the ETP ranking: a collector populates a
//! [`ClusterStatistics`] as executor records are discovered, and a reporting
//! facility reads it afterwards. One collecting task owns an instance for the
//! duration of a cycle.

pub mod cluster;
pub mod node;

pub use cluster::ClusterStatistics;
pub use node::NodeStatistics;
