//! Geometry queries over plotted lines: where a line crosses the horizontal
//! edges of the plot, the baseline a line grows from when animated, and the
//! nearest plotted record to a query point.

use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use tracing::trace;

use crate::core::{DatasetId, Extent, Point, Scale, Value};

/// Crossings of one line with the left and right plot edges.
pub type EdgeCrossings = SmallVec<[Point; 2]>;

/// Points where lines cross the left and right edges of the X domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeIntersections {
    pub left: EdgeCrossings,
    pub right: EdgeCrossings,
}

impl EdgeIntersections {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn extend(&mut self, other: Self) {
        self.left.extend(other.left);
        self.right.extend(other.right);
    }

    /// Y values of every crossing, left edge first.
    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.left.iter().chain(self.right.iter()).map(|point| point.y)
    }

    /// Range of Y values the lines take on at the plot edges.
    #[must_use]
    pub fn y_extent(&self) -> Option<Extent> {
        Extent::from_values(self.y_values())
    }
}

/// Screen-space crossings of `points` with the vertical lines `left_x` and
/// `right_x`.
///
/// A segment `(prev, curr)` crosses an edge when `prev.x < edge` and
/// `edge <= curr.x` agree, which catches crossings in both directions. A point
/// lying exactly on an edge counts as past it. Segments touching a
/// non-finite vertex are skipped. Returned points are `(edge, y)` in screen
/// space.
#[must_use]
pub fn screen_edge_crossings(points: &[Point], left_x: f64, right_x: f64) -> EdgeIntersections {
    let mut crossings = EdgeIntersections::default();
    for pair in points.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if !prev.is_finite() || !curr.is_finite() {
            continue;
        }
        if crosses(prev.x, curr.x, left_x) {
            crossings
                .left
                .push(Point::new(left_x, interpolate_y(prev, curr, left_x)));
        }
        if crosses(prev.x, curr.x, right_x) {
            crossings
                .right
                .push(Point::new(right_x, interpolate_y(prev, curr, right_x)));
        }
    }
    crossings
}

fn crosses(prev_x: f64, curr_x: f64, edge_x: f64) -> bool {
    (prev_x < edge_x) == (edge_x <= curr_x)
}

fn interpolate_y(prev: Point, curr: Point, edge_x: f64) -> f64 {
    prev.y + (edge_x - prev.x) * (curr.y - prev.y) / (curr.x - prev.x)
}

/// Domain-space edge intersections for lines given as screen-space points.
///
/// The Y scale must be continuous; otherwise the result is empty. The edges
/// are the screen positions of the first and last X domain values, so any X
/// scale works. Each returned point carries the X domain bound of the edge it
/// crossed and the crossing Y inverted back into the Y domain.
pub fn edge_intersections<'a, I>(lines: I, x_scale: &dyn Scale, y_scale: &dyn Scale) -> EdgeIntersections
where
    I: IntoIterator<Item = &'a [Point]>,
{
    let Some(y_scale) = y_scale.as_continuous() else {
        return EdgeIntersections::default();
    };
    let domain = x_scale.domain();
    let (Some(first), Some(last)) = (domain.first(), domain.last()) else {
        return EdgeIntersections::default();
    };

    let (x_start, x_end) = (first.to_number(), last.to_number());
    let (left_x, right_x) = (x_scale.scale(first), x_scale.scale(last));

    let mut intersections = EdgeIntersections::default();
    for points in lines {
        let screen = screen_edge_crossings(points, left_x, right_x);
        intersections.left.extend(
            screen
                .left
                .iter()
                .map(|point| Point::new(x_start, y_scale.invert(point.y))),
        );
        intersections.right.extend(
            screen
                .right
                .iter()
                .map(|point| Point::new(x_end, y_scale.invert(point.y))),
        );
    }

    trace!(
        left = intersections.left.len(),
        right = intersections.right.len(),
        "computed edge intersections"
    );
    intersections
}

/// Widens `base` so it covers every Y value the lines take on at the plot
/// edges. With no base extent the edge values alone form the extent.
#[must_use]
pub fn smooth_extent(base: Option<Extent>, intersections: &EdgeIntersections) -> Option<Extent> {
    Extent::union_opt(base, intersections.y_extent())
}

/// Domain value lines start from when animated in: zero when the domain
/// spans it, otherwise the domain bound closest to zero.
#[must_use]
pub fn reset_baseline(domain: (f64, f64)) -> f64 {
    let max = domain.0.max(domain.1);
    let min = domain.0.min(domain.1);
    if max < 0.0 {
        max
    } else if min > 0.0 {
        min
    } else {
        0.0
    }
}

/// Screen-space baseline for `scale`; see [`reset_baseline`].
///
/// Scales without a numeric domain map the value zero.
#[must_use]
pub fn scaled_reset_baseline(scale: &dyn Scale) -> f64 {
    match scale.as_continuous() {
        Some(continuous) => continuous.scale_number(reset_baseline(continuous.numeric_domain())),
        None => scale.scale(&Value::Number(0.0)),
    }
}

/// A plotted record and where it was drawn.
#[derive(Debug, PartialEq)]
pub struct PlotEntity<'a, D> {
    pub datum: &'a D,
    pub index: usize,
    pub dataset: DatasetId,
    pub position: Point,
}

impl<D> Clone for PlotEntity<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for PlotEntity<'_, D> {}

/// Entity closest to `query` by X distance, ties broken by Y distance.
///
/// Only strict improvements replace the current best, so among equally
/// distant entities the first one seen wins. Entities rejected by `visible`
/// are never considered.
pub fn nearest_entity<'a, D, I, F>(entities: I, query: Point, mut visible: F) -> Option<PlotEntity<'a, D>>
where
    I: IntoIterator<Item = PlotEntity<'a, D>>,
    F: FnMut(&PlotEntity<'a, D>) -> bool,
{
    let mut best: Option<((OrderedFloat<f64>, OrderedFloat<f64>), PlotEntity<'a, D>)> = None;
    for entity in entities {
        if !visible(&entity) {
            continue;
        }
        let x_dist = (query.x - entity.position.x).abs();
        let y_dist = (query.y - entity.position.y).abs();
        if x_dist.is_nan() || y_dist.is_nan() {
            continue;
        }
        let distance = (OrderedFloat(x_dist), OrderedFloat(y_dist));
        match best {
            Some((current, _)) if current <= distance => {}
            _ => best = Some((distance, entity)),
        }
    }
    best.map(|(_, entity)| entity)
}
