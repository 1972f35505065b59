use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a dataset, stable for the dataset's lifetime.
///
/// Two datasets holding equal records are still distinct stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetId(u64);

impl DatasetId {
    fn next() -> Self {
        Self(NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered records plus free-form metadata.
#[derive(Debug)]
pub struct Dataset<D> {
    id: DatasetId,
    data: Vec<D>,
    metadata: serde_json::Value,
}

impl<D> Dataset<D> {
    #[must_use]
    pub fn new(data: Vec<D>) -> Self {
        Self {
            id: DatasetId::next(),
            data,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn id(&self) -> DatasetId {
        self.id
    }

    #[must_use]
    pub fn data(&self) -> &[D] {
        &self.data
    }

    #[must_use]
    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: serde_json::Value) {
        self.metadata = metadata;
    }

    /// Replaces the records while keeping the dataset identity.
    pub fn replace_data(&mut self, data: Vec<D>) -> Vec<D> {
        std::mem::replace(&mut self.data, data)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates `(index, record)` pairs in dataset order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &D)> {
        self.data.iter().enumerate()
    }
}

impl<D> Default for Dataset<D> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<D> From<Vec<D>> for Dataset<D> {
    fn from(data: Vec<D>) -> Self {
        Self::new(data)
    }
}
