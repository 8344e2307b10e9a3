use stela_core::{RankOrder, RankingConfig, StelaError};
use stela_graph::{Component, Topology};

use super::EtpAnalysis;
use crate::history::TopologyStatistics;

/// A -> B -> C, with B unable to keep up with A.
fn chain() -> (Topology, TopologyStatistics) {
    let mut t = Topology::new("chain");
    t.add_edge("A", "B");
    t.add_edge("B", "C");

    let mut h = TopologyStatistics::new("chain");
    for _ in 0..2 {
        h.record_emit("A", 10);
        h.record_execute("B", 8);
        h.record_emit("B", 8);
        h.record_execute("C", 8);
        h.record_emit("C", 8);
    }
    (t, h)
}

fn ids(analysis: &EtpAnalysis, order: RankOrder) -> Vec<String> {
    analysis.rank(order).iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn chain_with_congested_middle() {
    let (t, h) = chain();
    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();

    assert!(a.is_congested("B"));
    assert!((a.congestion["B"] - 2.0).abs() < 1e-9);
    assert_eq!(a.total_throughput, 8.0);
    assert_eq!(a.sink_shares["C"], 1.0);
    assert_eq!(a.score("C"), Some(1.0));
    assert_eq!(a.score("B"), Some(1.0));
    assert_eq!(a.score("A"), Some(0.0));
    assert_eq!(ids(&a, RankOrder::Desc), vec!["C", "B", "A"]);

    let top = a.rank_descending();
    assert_eq!(top[0].score, 1.0);
    assert_eq!(top[2].score, 0.0);
}

#[test]
fn entry_points_are_reverses() {
    let (t, h) = chain();
    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();

    let mut desc: Vec<(String, f64)> = a
        .rank_descending()
        .into_iter()
        .map(|r| (r.component.id, r.score))
        .collect();
    desc.reverse();
    let asc: Vec<(String, f64)> = a
        .rank_ascending()
        .into_iter()
        .map(|r| (r.component.id, r.score))
        .collect();
    assert_eq!(asc, desc);
}

#[test]
fn rates_and_bookkeeping() {
    let (t, h) = chain();
    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();

    assert_eq!(a.emit_rates.get("A"), Some(10.0));
    assert_eq!(a.execute_rates.get("A"), None);
    assert_eq!(a.sources, vec!["A".to_string()]);
    assert_eq!(a.parallelism["B"], 1);
}

#[test]
fn silent_sinks_give_empty_ranking() {
    let (t, _) = chain();
    let mut h = TopologyStatistics::new("chain");
    h.record_emit("A", 10);
    h.record_emit("C", 0);

    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();
    assert_eq!(a.total_throughput, 0.0);
    assert!(a.rank_descending().is_empty());
    assert!(a.rank_ascending().is_empty());
    // every component is still accounted for, none of them scored
    assert_eq!(a.parallelism.len(), t.len());
    assert!(a.scores.is_empty());
}

#[test]
fn empty_history_does_not_fail() {
    let (t, _) = chain();
    let a = EtpAnalysis::compute(&t, &TopologyStatistics::new("chain"), &RankingConfig::default())
        .unwrap();
    assert!(a.scores.is_empty());
    assert!(a.congestion.is_empty());
}

#[test]
fn component_without_samples_reads_as_zero() {
    // D is a second sink with no samples at all.
    let (mut t, h) = chain();
    t.add_edge("B", "D");

    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();
    assert_eq!(a.score("D"), Some(0.0));
    assert_eq!(a.score("C"), Some(1.0));
    assert_eq!(a.score("B"), Some(1.0));
}

#[test]
fn cycle_fails_before_scoring() {
    let (mut t, h) = chain();
    t.add_edge("C", "A");

    let err = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap_err();
    assert!(matches!(err, StelaError::CycleDetected(_)));
}

#[test]
fn dangling_reference_fails() {
    let (mut t, h) = chain();
    let mut orphan = Component::new("orphan", 1);
    orphan.parents.insert("nowhere".into());
    t.components.insert("orphan".into(), orphan);

    let err = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn component_under_wrong_key_fails() {
    let mut t = Topology::new("t");
    t.components.insert("x".into(), Component::new("y", 1));

    let err = EtpAnalysis::compute(&t, &TopologyStatistics::new("t"), &RankingConfig::default())
        .unwrap_err();
    assert!(matches!(err, StelaError::MismatchedKey { .. }));
    assert!(err.is_structural());
}

#[test]
fn samples_of_unknown_components_are_ignored() {
    let (t, mut h) = chain();
    h.record_emit("ghost", 1000);
    h.record_execute("ghost", 1);

    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();
    assert!(!a.emit_rates.contains("ghost"));
    assert!(!a.is_congested("ghost"));
    assert_eq!(a.scores.len(), 3);
}

#[test]
fn wider_slack_clears_congestion() {
    let (t, h) = chain();
    let config = RankingConfig {
        congestion_slack: 1.5,
        ..RankingConfig::default()
    };
    let a = EtpAnalysis::compute(&t, &h, &config).unwrap();

    assert!(!a.is_congested("B"));
    assert_eq!(a.score("A"), Some(1.0));
}

#[test]
fn congested_lists_largest_backlog_first() {
    // s -> (x, y), both behind
    let mut t = Topology::new("t");
    t.add_edge("s", "x");
    t.add_edge("s", "y");
    let mut h = TopologyStatistics::new("t");
    h.record_emit("s", 100);
    h.record_execute("x", 50);
    h.record_execute("y", 10);
    h.record_emit("x", 5);
    h.record_emit("y", 5);

    let a = EtpAnalysis::compute(&t, &h, &RankingConfig::default()).unwrap();
    let congested: Vec<&str> = a.congested().into_iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(congested, vec!["y", "x"]);
    assert_eq!(a.score("s"), Some(0.0));
}
