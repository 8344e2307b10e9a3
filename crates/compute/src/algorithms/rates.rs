use std::collections::BTreeMap;

use serde::Serialize;
use stela_core::ComponentId;

/// Simple moving average over the whole window: no weighting, no decay.
///
/// Returns `None` for an empty window.
pub fn moving_average<I>(samples: I) -> Option<f64>
where
    I: IntoIterator<Item = u64>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, n), s| (sum + s as f64, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Smoothed rate per component.
///
/// Components without samples have no entry; [`RateTable::rate`] reads them as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<ComponentId, f64>,
}

impl RateTable {
    /// Build a table from per-component sample series. Empty series are skipped.
    pub fn from_series<'a, I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (&'a ComponentId, S)>,
        S: IntoIterator<Item = &'a u64>,
    {
        let rates = series
            .into_iter()
            .filter_map(|(id, samples)| {
                moving_average(samples.into_iter().copied()).map(|avg| (id.clone(), avg))
            })
            .collect();
        Self { rates }
    }

    /// Smoothed rate of `component`, or 0 when it has no samples.
    pub fn rate(&self, component: &str) -> f64 {
        self.rates.get(component).copied().unwrap_or(0.0)
    }

    pub fn get(&self, component: &str) -> Option<f64> {
        self.rates.get(component).copied()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.rates.contains_key(component)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, f64)> {
        self.rates.iter().map(|(id, &r)| (id, r))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub(crate) fn retain<F: FnMut(&ComponentId) -> bool>(&mut self, mut keep: F) {
        self.rates.retain(|id, _| keep(id));
    }
}

impl FromIterator<(ComponentId, f64)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (ComponentId, f64)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
