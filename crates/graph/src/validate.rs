use std::collections::{BTreeMap, VecDeque};

use stela_core::{ComponentId, Result, StelaError};
use tracing::debug;

use crate::topology::Topology;

/// Check the structural invariants of a topology and return its components
/// in topological order (every parent before its children).
///
/// Fails with a structural [`StelaError`] when a component is stored under a
/// key other than its id, has parallelism 0, references an unknown component,
/// records an edge on only one endpoint, or sits on a cycle. Nothing downstream recurses over a graph that did not pass.
pub fn topological_order(topology: &Topology) -> Result<Vec<ComponentId>> {
    for (key, component) in &topology.components {
        if *key != component.id {
            return Err(StelaError::MismatchedKey {
                key: key.clone(),
                id: component.id.clone(),
            });
        }
        if component.parallelism == 0 {
            return Err(StelaError::InvalidParallelism(component.id.clone()));
        }

        for child in &component.children {
            let Some(target) = topology.components.get(child) else {
                return Err(StelaError::UnknownComponent {
                    component: component.id.clone(),
                    referenced: child.clone(),
                });
            };
            if !target.parents.contains(&component.id) {
                return Err(StelaError::AsymmetricEdge {
                    parent: component.id.clone(),
                    child: child.clone(),
                });
            }
        }

        for parent in &component.parents {
            let Some(source) = topology.components.get(parent) else {
                return Err(StelaError::UnknownComponent {
                    component: component.id.clone(),
                    referenced: parent.clone(),
                });
            };
            if !source.children.contains(&component.id) {
                return Err(StelaError::AsymmetricEdge {
                    parent: parent.clone(),
                    child: component.id.clone(),
                });
            }
        }
    }

    // Kahn's algorithm over the parent counts.
    let mut pending: BTreeMap<&str, usize> = topology
        .components
        .values()
        .map(|c| (c.id.as_str(), c.parents.len()))
        .collect();
    let mut ready: VecDeque<&str> = pending
        .iter()
        .filter(|(_, &n)| n == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut order = Vec::with_capacity(topology.len());

    while let Some(id) = ready.pop_front() {
        order.push(id.to_string());
        let Some(component) = topology.components.get(id) else {
            return Err(StelaError::UnknownComponent {
                component: topology.id.clone(),
                referenced: id.to_string(),
            });
        };
        for child in &component.children {
            if let Some(n) = pending.get_mut(child.as_str()) {
                *n -= 1;
                if *n == 0 {
                    ready.push_back(child.as_str());
                }
            }
        }
    }

    if order.len() < topology.len() {
        let cyclic: Vec<ComponentId> = pending
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        return Err(StelaError::CycleDetected(cyclic));
    }

    debug!(topology = %topology.id, components = order.len(), "topology validated");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Component;

    fn position(order: &[ComponentId], id: &str) -> usize {
        order.iter().position(|c| c == id).unwrap()
    }

    #[test]
    fn parents_come_before_children() {
        let mut t = Topology::new("t");
        t.add_edge("a", "b");
        t.add_edge("b", "d");
        t.add_edge("a", "c");
        t.add_edge("c", "d");

        let order = topological_order(&t).unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
    }

    #[test]
    fn empty_topology_is_valid() {
        assert!(topological_order(&Topology::new("empty")).unwrap().is_empty());
    }

    #[test]
    fn cycle_is_reported() {
        let mut t = Topology::new("t");
        t.add_edge("src", "a");
        t.add_edge("a", "b");
        t.add_edge("b", "a");

        match topological_order(&t) {
            Err(StelaError::CycleDetected(ids)) => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut t = Topology::new("t");
        t.add_edge("a", "a");
        assert!(matches!(topological_order(&t), Err(StelaError::CycleDetected(_))));
    }

    #[test]
    fn dangling_child_is_rejected() {
        let mut t = Topology::new("t");
        let mut a = Component::new("a", 1);
        a.children.insert("ghost".into());
        t.components.insert("a".into(), a);

        let err = topological_order(&t).unwrap_err();
        assert!(matches!(
            err,
            StelaError::UnknownComponent { ref component, ref referenced }
                if component == "a" && referenced == "ghost"
        ));
        assert!(err.is_structural());
    }

    #[test]
    fn component_under_foreign_key_is_rejected() {
        let mut t = Topology::new("t");
        t.components.insert("x".into(), Component::new("y", 1));

        let err = topological_order(&t).unwrap_err();
        assert!(matches!(
            err,
            StelaError::MismatchedKey { ref key, ref id } if key == "x" && id == "y"
        ));
        assert!(err.is_structural());
    }

    #[test]
    fn one_sided_edge_is_rejected() {
        let mut t = Topology::new("t");
        t.upsert_component("a", 1);
        t.upsert_component("b", 1).parents.insert("a".into());

        assert!(matches!(
            topological_order(&t),
            Err(StelaError::AsymmetricEdge { .. })
        ));
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let mut t = Topology::new("t");
        t.upsert_component("a", 0);
        assert!(matches!(
            topological_order(&t),
            Err(StelaError::InvalidParallelism(ref id)) if id == "a"
        ));
    }
}
