use std::collections::BTreeMap;

use stela_core::ComponentId;
use stela_graph::Topology;
use tracing::debug;

use super::rates::RateTable;

/// Flag components that receive more than they process.
///
/// For every component with a known execute rate `out`, the input rate `in`
/// is the sum of its parents' emit rates (parents without samples count as 0).
/// The component is congested when `in > slack * out`, and its entry holds
/// the backlog `in - out`. Components without execute samples are never
/// flagged, and neither are sources since their input is 0.
pub fn detect_congestion(
    topology: &Topology,
    emit_rates: &RateTable,
    execute_rates: &RateTable,
    slack: f64,
) -> BTreeMap<ComponentId, f64> {
    let mut congestion = BTreeMap::new();

    for (id, out) in execute_rates.iter() {
        let Some(component) = topology.get(id) else {
            continue;
        };

        let input: f64 = component.parents.iter().map(|p| emit_rates.rate(p)).sum();

        if input > slack * out {
            let backlog = input - out;
            debug!(component = %id, input, out, backlog, "component congested");
            congestion.insert(id.clone(), backlog);
        }
    }

    congestion
}
