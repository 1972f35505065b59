use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Dataset, Value};
use crate::error::ChartResult;

/// Attribute holding the line path descriptor.
pub const PATH_ATTR: &str = "d";

/// Per-record attribute projector.
pub type Projector<D> = Rc<dyn Fn(&D, usize, &Dataset<D>) -> ChartResult<Value>>;

/// Visual attribute name to per-record projector, in insertion order.
pub type AttrToProjector<D> = IndexMap<String, Projector<D>>;

/// Per-dataset attribute projector, for marks drawn once per dataset.
pub type DatasetProjector<D> = Rc<dyn Fn(&Dataset<D>) -> ChartResult<Value>>;

pub type DatasetAttrToProjector<D> = IndexMap<String, DatasetProjector<D>>;

/// Which animator a draw step is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimatorRole {
    Reset,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingMode {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    ExpIn,
    #[default]
    ExpOut,
    ExpInOut,
}

/// Timing handed to the animation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EasingAnimator {
    pub start_delay_ms: f64,
    pub step_duration_ms: f64,
    pub step_delay_ms: f64,
    /// `None` leaves the total duration unbounded.
    #[serde(default)]
    pub max_total_duration_ms: Option<f64>,
    #[serde(default)]
    pub easing: EasingMode,
}

impl Default for EasingAnimator {
    fn default() -> Self {
        Self {
            start_delay_ms: 0.0,
            step_duration_ms: 300.0,
            step_delay_ms: 15.0,
            max_total_duration_ms: None,
            easing: EasingMode::ExpOut,
        }
    }
}

/// Animation strategy for a draw step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnimatorSpec {
    /// Applies attributes immediately.
    #[default]
    Null,
    Easing(EasingAnimator),
}

/// One pass of attribute values and the animator to play it with.
pub struct DrawStep<P> {
    pub attr_to_projector: P,
    pub role: AnimatorRole,
    pub animator: AnimatorSpec,
}

impl<P> fmt::Debug for DrawStep<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawStep")
            .field("role", &self.role)
            .field("animator", &self.animator)
            .finish_non_exhaustive()
    }
}
