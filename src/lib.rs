//! chart-plots: stacked bar and line plot geometry.
//!
//! `core` holds the render-free math (stacking, line paths, edge
//! intersections, nearest-entity lookup). `api` wraps it in plot adapters
//! that produce attribute projectors and draw steps for a renderer.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{LinePlot, PlotConfig, StackedBarPlot, XyPlot};
pub use error::{ChartError, ChartResult};
