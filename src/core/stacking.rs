//! Stack offsets across datasets sharing a categorical key.
//!
//! Positive and negative values stack on independent ladders per key, so a
//! mixed-sign stack grows away from zero in both directions without overlap.
//! Datasets are processed in the order given; offsets depend on that order,
//! not on dataset identity.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Accessor, Dataset, DatasetId, Extent, ExtentFilter};

/// Offset and own contribution of one dataset at one key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackDatum {
    /// Sum of same-signed values at this key from earlier datasets.
    pub offset: f64,
    pub value: f64,
    /// Index of the record that produced this entry.
    pub index: usize,
}

impl StackDatum {
    #[must_use]
    pub fn end(self) -> f64 {
        self.offset + self.value
    }
}

/// Per-dataset, per-key stack entries, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackOffsets {
    datasets: IndexMap<DatasetId, IndexMap<String, StackDatum>>,
}

impl StackOffsets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, dataset: DatasetId, key: &str) -> Option<&StackDatum> {
        self.datasets.get(&dataset)?.get(key)
    }

    #[must_use]
    pub fn dataset(&self, dataset: DatasetId) -> Option<&IndexMap<String, StackDatum>> {
        self.datasets.get(&dataset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DatasetId, &IndexMap<String, StackDatum>)> {
        self.datasets.iter().map(|(id, entries)| (*id, entries))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Number of datasets with an entry map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningTotals {
    positive: f64,
    negative: f64,
}

/// Computes stack offsets for `datasets` in the order supplied.
///
/// Keys are grouped by [`Value::canonical_key`](crate::core::Value::canonical_key).
/// A dataset with several records at one key adds every one of them to the
/// running total; its entry holds the last of them. Datasets missing a key
/// get no entry for it and leave that key's totals untouched.
pub fn compute_stack_offsets<'a, D, I>(
    datasets: I,
    key_accessor: &Accessor<D>,
    value_accessor: &Accessor<D>,
) -> StackOffsets
where
    D: 'a,
    I: IntoIterator<Item = &'a Dataset<D>>,
{
    let mut totals: HashMap<String, RunningTotals> = HashMap::new();
    let mut offsets = StackOffsets::new();
    let mut records = 0usize;

    for dataset in datasets {
        let mut entries = IndexMap::with_capacity(dataset.len());
        for (index, datum) in dataset.records() {
            let key = key_accessor(datum, index, dataset).canonical_key();
            let value = value_accessor(datum, index, dataset).to_number();
            let running = totals.entry(key.clone()).or_default();
            let offset = if value >= 0.0 {
                let offset = running.positive;
                running.positive += value;
                offset
            } else {
                let offset = running.negative;
                running.negative += value;
                offset
            };
            entries.insert(
                key,
                StackDatum {
                    offset,
                    value,
                    index,
                },
            );
            records += 1;
        }
        offsets.datasets.insert(dataset.id(), entries);
    }

    trace!(
        datasets = offsets.len(),
        records,
        keys = totals.len(),
        "computed stack offsets"
    );
    offsets
}

/// Min/max over `offset` and `offset + value` of every entry whose record
/// passes `filter`.
///
/// Entries whose dataset is not in `datasets` are skipped. Returns `None`
/// when nothing passes. NaN values that pass the filter propagate into the
/// result.
pub fn compute_stack_extent<'a, D, I>(
    offsets: &StackOffsets,
    datasets: I,
    filter: &ExtentFilter<D>,
) -> Option<Extent>
where
    D: 'a,
    I: IntoIterator<Item = &'a Dataset<D>>,
{
    let by_id: HashMap<DatasetId, &Dataset<D>> = datasets
        .into_iter()
        .map(|dataset| (dataset.id(), dataset))
        .collect();

    let values = offsets.iter().flat_map(|(id, entries)| {
        let dataset = by_id.get(&id).copied();
        entries.values().filter_map(move |entry| {
            let dataset = dataset?;
            let datum = dataset.data().get(entry.index)?;
            filter
                .accepts(datum, entry.index, dataset)
                .then_some([entry.offset, entry.end()])
        })
    });

    Extent::from_values(values.flatten())
}
