use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in either domain or screen space; callers track which.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Closed `[min, max]` range a scale domain has to cover.
///
/// An absent extent (`None` where an `Option<Extent>` is returned) means the
/// data puts no constraint on the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over `values`, returning `None` for an empty input.
    ///
    /// NaN is contagious: a single NaN value makes both bounds NaN.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |acc, value| {
            Some(match acc {
                None => Self::new(value, value),
                Some(extent) => extent.include(value),
            })
        })
    }

    /// Min/max over the finite entries of `values`.
    pub fn from_finite_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_values(values.into_iter().filter(|value| value.is_finite()))
    }

    #[must_use]
    pub fn include(self, value: f64) -> Self {
        if value.is_nan() || self.min.is_nan() || self.max.is_nan() {
            return Self::new(f64::NAN, f64::NAN);
        }
        Self::new(self.min.min(value), self.max.max(value))
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        self.include(other.min).include(other.max)
    }

    #[must_use]
    pub fn union_opt(lhs: Option<Self>, rhs: Option<Self>) -> Option<Self> {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Some(lhs.union(rhs)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Positional property an accessor/scale pair is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    X,
    Y,
}

impl Property {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction bars grow in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Categories along X, values along Y.
    #[default]
    Vertical,
    /// Categories along Y, values along X.
    Horizontal,
}

impl Orientation {
    #[must_use]
    pub const fn key_property(self) -> Property {
        match self {
            Self::Vertical => Property::X,
            Self::Horizontal => Property::Y,
        }
    }

    #[must_use]
    pub const fn value_property(self) -> Property {
        self.key_property().other()
    }

    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }
}
