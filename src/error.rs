use thiserror::Error;

use crate::core::{DatasetId, Property};

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no accessor bound for property `{property}`")]
    MissingBinding { property: Property },

    /// A record was projected against stack offsets that do not contain its
    /// key, which means the offsets were not recomputed after a change.
    #[error("no stack entry for key `{key}` in dataset {dataset}")]
    MissingStackEntry { dataset: DatasetId, key: String },

    #[error("unknown dataset: {0}")]
    UnknownDataset(DatasetId),

    #[error("unknown interpolation mode: `{0}`")]
    UnknownInterpolation(String),

    #[error("invalid plot config: {0}")]
    InvalidConfig(String),
}
