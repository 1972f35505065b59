pub mod accessor;
pub mod dataset;
pub mod line_geometry;
pub mod line_path;
pub mod primitives;
pub mod scale;
pub mod stacking;
pub mod types;
pub mod value;

pub use accessor::{
    Accessor, AccessorScaleBinding, ExtentFilter, RecordPredicate, accessor, constant, field,
};
pub use dataset::{Dataset, DatasetId};
pub use line_geometry::{
    EdgeCrossings, EdgeIntersections, PlotEntity, edge_intersections, nearest_entity,
    reset_baseline, scaled_reset_baseline, screen_edge_crossings, smooth_extent,
};
pub use line_path::{
    CustomInterpolator, DEFAULT_TENSION, Interpolation, InterpolationMode, build_line_path,
};
pub use scale::{CategoryScale, ContinuousScale, LinearScale, Scale};
pub use stacking::{StackDatum, StackOffsets, compute_stack_extent, compute_stack_offsets};
pub use types::{Extent, Orientation, Point, Property};
pub use value::Value;
