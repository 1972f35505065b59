mod invalidation;
mod line_plot;
mod plot;
mod plot_config;
mod projector;
mod stacked_bar_plot;

pub use invalidation::{InvalidationTopic, InvalidationTopics};
pub use line_plot::{
    DEFAULT_LINE_STROKE, DEFAULT_LINE_STROKE_WIDTH, LINE_ANIMATION_DURATION_MS, LinePlot,
};
pub use plot::{AutorangeMode, VisibilityPredicate, XyPlot};
pub use plot_config::PlotConfig;
pub use projector::{
    AnimatorRole, AnimatorSpec, AttrToProjector, DatasetAttrToProjector, DatasetProjector,
    DrawStep, EasingAnimator, EasingMode, PATH_ATTR, Projector,
};
pub use stacked_bar_plot::{DEFAULT_BAR_THICKNESS_PX, StackedBarPlot};
