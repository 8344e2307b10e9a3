use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use stela_core::{ComponentId, StelaError, TopologyId};

/// A processing stage of a topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    #[serde(default)]
    pub parents: BTreeSet<ComponentId>,
    #[serde(default)]
    pub children: BTreeSet<ComponentId>,
    /// Number of executing instances.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_parallelism() -> u32 { 1 }

impl Component {
    pub fn new(id: &str, parallelism: u32) -> Self {
        Self {
            id: id.to_string(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            parallelism,
        }
    }

    /// No parents: origin of data.
    pub fn is_source(&self) -> bool {
        self.parents.is_empty()
    }

    /// No children: terminal output.
    pub fn is_sink(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct TopologyStats {
    pub component_count: usize,
    pub edge_count: usize,
    pub source_count: usize,
    pub sink_count: usize,
    pub total_parallelism: u64,
}

/// Snapshot of one topology's component graph.
///
/// Components are keyed by id in a sorted map so every traversal visits them
/// in the same order. On the wire the components are a plain list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TopologyDoc", into = "TopologyDoc")]
pub struct Topology {
    pub id: TopologyId,
    pub components: BTreeMap<ComponentId, Component>,
}

#[derive(Serialize, Deserialize)]
struct TopologyDoc {
    id: TopologyId,
    components: Vec<Component>,
}

impl TryFrom<TopologyDoc> for Topology {
    type Error = StelaError;

    fn try_from(doc: TopologyDoc) -> Result<Self, Self::Error> {
        let mut components = BTreeMap::new();
        for component in doc.components {
            if components.contains_key(&component.id) {
                return Err(StelaError::DuplicateComponent(component.id));
            }
            components.insert(component.id.clone(), component);
        }
        Ok(Self { id: doc.id, components })
    }
}

impl From<Topology> for TopologyDoc {
    fn from(topology: Topology) -> Self {
        Self {
            id: topology.id,
            components: topology.components.into_values().collect(),
        }
    }
}

impl Topology {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            components: BTreeMap::new(),
        }
    }

    /// Insert a component, or update the parallelism of an existing one.
    pub fn upsert_component(&mut self, id: &str, parallelism: u32) -> &mut Component {
        let component = self
            .components
            .entry(id.to_string())
            .or_insert_with(|| Component::new(id, parallelism));
        component.parallelism = parallelism;
        component
    }

    /// Connect `parent -> child`, recording the edge on both endpoints.
    ///
    /// Missing endpoints are created with parallelism 1.
    pub fn add_edge(&mut self, parent: &str, child: &str) {
        self.components
            .entry(parent.to_string())
            .or_insert_with(|| Component::new(parent, 1))
            .children
            .insert(child.to_string());
        self.components
            .entry(child.to_string())
            .or_insert_with(|| Component::new(child, 1))
            .parents
            .insert(parent.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.is_source())
    }

    pub fn sinks(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.is_sink())
    }

    pub fn stats(&self) -> TopologyStats {
        TopologyStats {
            component_count: self.components.len(),
            edge_count: self.components.values().map(|c| c.children.len()).sum(),
            source_count: self.sources().count(),
            sink_count: self.sinks().count(),
            total_parallelism: self
                .components
                .values()
                .map(|c| u64::from(c.parallelism))
                .sum(),
        }
    }
}
