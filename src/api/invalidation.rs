use serde::{Deserialize, Serialize};

use crate::core::Property;

/// Structural change recorded by a plot mutation.
///
/// Derived state (stack offsets, extents) is recomputed at a single refresh
/// boundary from the topics accumulated since the previous refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTopic {
    Datasets,
    XBinding,
    YBinding,
    Attributes,
    Filters,
    Autorange,
    Interpolation,
    Animation,
}

impl InvalidationTopic {
    const fn bit(self) -> u16 {
        match self {
            Self::Datasets => 1 << 0,
            Self::XBinding => 1 << 1,
            Self::YBinding => 1 << 2,
            Self::Attributes => 1 << 3,
            Self::Filters => 1 << 4,
            Self::Autorange => 1 << 5,
            Self::Interpolation => 1 << 6,
            Self::Animation => 1 << 7,
        }
    }

    #[must_use]
    pub const fn binding(property: Property) -> Self {
        match property {
            Property::X => Self::XBinding,
            Property::Y => Self::YBinding,
        }
    }
}

/// Bitmask of pending invalidation topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationTopics {
    bits: u16,
}

impl InvalidationTopics {
    const ALL_BITS: u16 = InvalidationTopic::Datasets.bit()
        | InvalidationTopic::XBinding.bit()
        | InvalidationTopic::YBinding.bit()
        | InvalidationTopic::Attributes.bit()
        | InvalidationTopic::Filters.bit()
        | InvalidationTopic::Autorange.bit()
        | InvalidationTopic::Interpolation.bit()
        | InvalidationTopic::Animation.bit();

    /// Topics that change stack offsets or axis extents.
    pub const GEOMETRY: Self = Self {
        bits: InvalidationTopic::Datasets.bit()
            | InvalidationTopic::XBinding.bit()
            | InvalidationTopic::YBinding.bit()
            | InvalidationTopic::Filters.bit()
            | InvalidationTopic::Autorange.bit(),
    };

    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            bits: Self::ALL_BITS,
        }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self { bits: topic.bit() }
    }

    #[must_use]
    pub const fn with_topic(self, topic: InvalidationTopic) -> Self {
        Self {
            bits: self.bits | topic.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    #[must_use]
    pub const fn contains_topic(self, topic: InvalidationTopic) -> bool {
        self.intersects(Self::from_topic(topic))
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}
