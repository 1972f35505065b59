//! Path descriptors for a line through ordered points.
//!
//! Output follows the SVG path mini-language. Each run of defined points
//! becomes one subpath starting with `M`; undefined points split runs and are
//! never interpolated across.

use std::fmt::{self, Write as _};
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Point;
use crate::core::primitives::NumberText;
use crate::error::{ChartError, ChartResult};

/// Tension used by cardinal and bundle curves unless overridden.
pub const DEFAULT_TENSION: f64 = 0.7;

const MONOTONE_EPSILON: f64 = 1e-6;

const BASIS_BEZIER_1: [f64; 4] = [0.0, 2.0 / 3.0, 1.0 / 3.0, 0.0];
const BASIS_BEZIER_2: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0];
const BASIS_BEZIER_3: [f64; 4] = [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];

/// Caller-supplied interpolator. Receives one run of defined points and
/// returns the path text that follows its leading `M`.
pub type CustomInterpolator = Rc<dyn Fn(&[Point]) -> String>;

/// Built-in interpolation modes, by their conventional names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    Linear,
    LinearClosed,
    Step,
    StepBefore,
    StepAfter,
    Basis,
    BasisOpen,
    BasisClosed,
    Bundle,
    Cardinal,
    CardinalOpen,
    CardinalClosed,
    Monotone,
}

impl InterpolationMode {
    pub const ALL: [Self; 13] = [
        Self::Linear,
        Self::LinearClosed,
        Self::Step,
        Self::StepBefore,
        Self::StepAfter,
        Self::Basis,
        Self::BasisOpen,
        Self::BasisClosed,
        Self::Bundle,
        Self::Cardinal,
        Self::CardinalOpen,
        Self::CardinalClosed,
        Self::Monotone,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::LinearClosed => "linear-closed",
            Self::Step => "step",
            Self::StepBefore => "step-before",
            Self::StepAfter => "step-after",
            Self::Basis => "basis",
            Self::BasisOpen => "basis-open",
            Self::BasisClosed => "basis-closed",
            Self::Bundle => "bundle",
            Self::Cardinal => "cardinal",
            Self::CardinalOpen => "cardinal-open",
            Self::CardinalClosed => "cardinal-closed",
            Self::Monotone => "monotone",
        }
    }

    /// Path text for one run of points, without the leading `M`.
    #[must_use]
    pub fn interpolate(self, points: &[Point], tension: f64) -> String {
        let mut path = String::new();
        match self {
            Self::Linear => linear(&mut path, points),
            Self::LinearClosed => linear_closed(&mut path, points),
            Self::Step => step(&mut path, points),
            Self::StepBefore => step_before(&mut path, points),
            Self::StepAfter => step_after(&mut path, points),
            Self::Basis => basis(&mut path, points),
            Self::BasisOpen => basis_open(&mut path, points),
            Self::BasisClosed => basis_closed(&mut path, points),
            Self::Bundle => bundle(&mut path, points, tension),
            Self::Cardinal => cardinal(&mut path, points, tension),
            Self::CardinalOpen => cardinal_open(&mut path, points, tension),
            Self::CardinalClosed => cardinal_closed(&mut path, points, tension),
            Self::Monotone => monotone(&mut path, points),
        }
        path
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationMode {
    type Err = ChartError;

    fn from_str(name: &str) -> ChartResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| ChartError::UnknownInterpolation(name.to_owned()))
    }
}

/// Interpolation selected for a line: a named mode or a custom function.
#[derive(Clone)]
pub enum Interpolation {
    Mode(InterpolationMode),
    Custom(CustomInterpolator),
}

impl Interpolation {
    pub fn custom<F>(interpolator: F) -> Self
    where
        F: Fn(&[Point]) -> String + 'static,
    {
        Self::Custom(Rc::new(interpolator))
    }

    #[must_use]
    pub fn mode(&self) -> Option<InterpolationMode> {
        match self {
            Self::Mode(mode) => Some(*mode),
            Self::Custom(_) => None,
        }
    }

    fn interpolate(&self, points: &[Point], tension: f64) -> String {
        match self {
            Self::Mode(mode) => mode.interpolate(points, tension),
            Self::Custom(interpolator) => interpolator(points),
        }
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Mode(InterpolationMode::Linear)
    }
}

impl From<InterpolationMode> for Interpolation {
    fn from(mode: InterpolationMode) -> Self {
        Self::Mode(mode)
    }
}

impl FromStr for Interpolation {
    type Err = ChartError;

    fn from_str(name: &str) -> ChartResult<Self> {
        name.parse().map(Self::Mode)
    }
}

impl fmt::Debug for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode(mode) => f.debug_tuple("Mode").field(mode).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Builds the path descriptor for an ordered sequence of optional vertices.
///
/// `None` marks an undefined record. Returns `None` when no vertex is
/// defined.
pub fn build_line_path<I>(vertices: I, interpolation: &Interpolation, tension: f64) -> Option<String>
where
    I: IntoIterator<Item = Option<Point>>,
{
    let mut path = String::new();
    let mut run: Vec<Point> = Vec::new();
    let mut segments = 0usize;

    let mut flush = |run: &mut Vec<Point>, path: &mut String| {
        if run.is_empty() {
            return;
        }
        path.push('M');
        path.push_str(&interpolation.interpolate(run, tension));
        run.clear();
        segments += 1;
    };

    for vertex in vertices {
        match vertex {
            Some(point) => run.push(point),
            None => flush(&mut run, &mut path),
        }
    }
    flush(&mut run, &mut path);
    drop(flush);

    trace!(segments, "built line path");
    (segments > 0).then_some(path)
}

fn push_point(path: &mut String, point: Point) {
    let _ = write!(path, "{},{}", NumberText(point.x), NumberText(point.y));
}

fn push_number(path: &mut String, value: f64) {
    let _ = write!(path, "{}", NumberText(value));
}

fn push_command(path: &mut String, command: char, values: &[f64]) {
    path.push(command);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            path.push(',');
        }
        push_number(path, *value);
    }
}

fn linear(path: &mut String, points: &[Point]) {
    join_linear(path, points);
    if points.len() == 1 {
        path.push('Z');
    }
}

fn linear_closed(path: &mut String, points: &[Point]) {
    join_linear(path, points);
    path.push('Z');
}

fn join_linear(path: &mut String, points: &[Point]) {
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            path.push('L');
        }
        push_point(path, *point);
    }
}

fn step(path: &mut String, points: &[Point]) {
    let Some((&first, rest)) = points.split_first() else {
        return;
    };
    push_point(path, first);
    let mut previous = first;
    for &point in rest {
        push_command(path, 'H', &[(previous.x + point.x) / 2.0]);
        push_command(path, 'V', &[point.y]);
        previous = point;
    }
    if !rest.is_empty() {
        push_command(path, 'H', &[previous.x]);
    }
}

fn step_before(path: &mut String, points: &[Point]) {
    let Some((&first, rest)) = points.split_first() else {
        return;
    };
    push_point(path, first);
    for &point in rest {
        push_command(path, 'V', &[point.y]);
        push_command(path, 'H', &[point.x]);
    }
}

fn step_after(path: &mut String, points: &[Point]) {
    let Some((&first, rest)) = points.split_first() else {
        return;
    };
    push_point(path, first);
    for &point in rest {
        push_command(path, 'H', &[point.x]);
        push_command(path, 'V', &[point.y]);
    }
}

fn dot4(weights: [f64; 4], values: [f64; 4]) -> f64 {
    weights[0] * values[0] + weights[1] * values[1] + weights[2] * values[2] + weights[3] * values[3]
}

/// Sliding window of the last four control values on one axis.
fn shift_in(window: &mut [f64; 4], value: f64) {
    window.rotate_left(1);
    window[3] = value;
}

fn push_basis_bezier(path: &mut String, xs: [f64; 4], ys: [f64; 4]) {
    push_command(
        path,
        'C',
        &[
            dot4(BASIS_BEZIER_1, xs),
            dot4(BASIS_BEZIER_1, ys),
            dot4(BASIS_BEZIER_2, xs),
            dot4(BASIS_BEZIER_2, ys),
            dot4(BASIS_BEZIER_3, xs),
            dot4(BASIS_BEZIER_3, ys),
        ],
    );
}

fn basis(path: &mut String, points: &[Point]) {
    if points.len() < 3 {
        linear(path, points);
        return;
    }
    let first = points[0];
    let mut xs = [first.x, first.x, first.x, points[1].x];
    let mut ys = [first.y, first.y, first.y, points[1].y];
    push_point(path, first);
    push_command(path, 'L', &[dot4(BASIS_BEZIER_3, xs), dot4(BASIS_BEZIER_3, ys)]);

    // The last point is repeated once to pull the curve onto it.
    let last = points[points.len() - 1];
    for &point in points[2..].iter().chain(std::iter::once(&last)) {
        shift_in(&mut xs, point.x);
        shift_in(&mut ys, point.y);
        push_basis_bezier(path, xs, ys);
    }
    path.push('L');
    push_point(path, last);
}

fn basis_open(path: &mut String, points: &[Point]) {
    if points.len() < 4 {
        linear(path, points);
        return;
    }
    let mut xs = [0.0, points[0].x, points[1].x, points[2].x];
    let mut ys = [0.0, points[0].y, points[1].y, points[2].y];
    push_number(path, dot4(BASIS_BEZIER_3, xs));
    path.push(',');
    push_number(path, dot4(BASIS_BEZIER_3, ys));
    for &point in &points[3..] {
        shift_in(&mut xs, point.x);
        shift_in(&mut ys, point.y);
        push_basis_bezier(path, xs, ys);
    }
}

fn basis_closed(path: &mut String, points: &[Point]) {
    let n = points.len();
    if n == 0 {
        return;
    }
    let mut xs = [0.0; 4];
    let mut ys = [0.0; 4];
    for i in 0..4 {
        xs[i] = points[i % n].x;
        ys[i] = points[i % n].y;
    }
    push_number(path, dot4(BASIS_BEZIER_3, xs));
    path.push(',');
    push_number(path, dot4(BASIS_BEZIER_3, ys));
    for i in 4..n + 4 {
        let point = points[i % n];
        shift_in(&mut xs, point.x);
        shift_in(&mut ys, point.y);
        push_basis_bezier(path, xs, ys);
    }
}

fn bundle(path: &mut String, points: &[Point], tension: f64) {
    let n = points.len().saturating_sub(1);
    if n == 0 {
        basis(path, points);
        return;
    }
    let origin = points[0];
    let dx = points[n].x - origin.x;
    let dy = points[n].y - origin.y;
    let straightened: Vec<Point> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let t = i as f64 / n as f64;
            Point::new(
                tension * point.x + (1.0 - tension) * (origin.x + t * dx),
                tension * point.y + (1.0 - tension) * (origin.y + t * dy),
            )
        })
        .collect();
    basis(path, &straightened);
}

fn cardinal_tangents(points: &[Point], tension: f64) -> Vec<Point> {
    let a = (1.0 - tension) / 2.0;
    points
        .windows(3)
        .map(|w| Point::new(a * (w[2].x - w[0].x), a * (w[2].y - w[0].y)))
        .collect()
}

fn cardinal(path: &mut String, points: &[Point], tension: f64) {
    if points.len() < 3 {
        linear(path, points);
        return;
    }
    push_point(path, points[0]);
    hermite(path, points, &cardinal_tangents(points, tension));
}

fn cardinal_open(path: &mut String, points: &[Point], tension: f64) {
    if points.len() < 4 {
        linear(path, points);
        return;
    }
    push_point(path, points[1]);
    hermite(
        path,
        &points[1..points.len() - 1],
        &cardinal_tangents(points, tension),
    );
}

fn cardinal_closed(path: &mut String, points: &[Point], tension: f64) {
    let n = points.len();
    if n < 3 {
        linear_closed(path, points);
        return;
    }
    let mut closed = points.to_vec();
    closed.push(points[0]);

    let mut wrapped = Vec::with_capacity(closed.len() + 2);
    wrapped.push(closed[closed.len() - 2]);
    wrapped.extend_from_slice(&closed);
    wrapped.push(closed[1]);

    push_point(path, points[0]);
    hermite(path, &closed, &cardinal_tangents(&wrapped, tension));
}

/// Cubic Hermite segments through `points` with the given `tangents`.
///
/// When there are two more points than tangents the first and last segments
/// are drawn as quadratic curves.
fn hermite(path: &mut String, points: &[Point], tangents: &[Point]) {
    if tangents.is_empty()
        || (points.len() != tangents.len() && points.len() != tangents.len() + 2)
    {
        linear(path, points);
        return;
    }

    let quad = points.len() != tangents.len();
    let mut p0 = points[0];
    let mut p = points[1];
    let t0 = tangents[0];
    let mut t = t0;
    let mut pi = 1;

    if quad {
        push_command(
            path,
            'Q',
            &[
                p.x - t0.x * 2.0 / 3.0,
                p.y - t0.y * 2.0 / 3.0,
                p.x,
                p.y,
            ],
        );
        p0 = points[1];
        pi = 2;
    }

    if tangents.len() > 1 {
        t = tangents[1];
        p = points[pi];
        pi += 1;
        push_command(
            path,
            'C',
            &[
                p0.x + t0.x,
                p0.y + t0.y,
                p.x - t.x,
                p.y - t.y,
                p.x,
                p.y,
            ],
        );
        for &tangent in &tangents[2..] {
            p = points[pi];
            t = tangent;
            push_command(path, 'S', &[p.x - t.x, p.y - t.y, p.x, p.y]);
            pi += 1;
        }
    }

    if quad {
        let last = points[pi];
        push_command(
            path,
            'Q',
            &[
                p.x + t.x * 2.0 / 3.0,
                p.y + t.y * 2.0 / 3.0,
                last.x,
                last.y,
            ],
        );
    }
}

fn slope(p0: Point, p1: Point) -> f64 {
    (p1.y - p0.y) / (p1.x - p0.x)
}

fn finite_differences(points: &[Point]) -> Vec<f64> {
    let j = points.len() - 1;
    let mut m = vec![0.0; points.len()];
    let mut d = slope(points[0], points[1]);
    m[0] = d;
    for i in 1..j {
        let next = slope(points[i], points[i + 1]);
        m[i] = (d + next) / 2.0;
        d = next;
    }
    m[j] = d;
    m
}

fn monotone_tangents(points: &[Point]) -> Vec<Point> {
    let mut m = finite_differences(points);
    let j = points.len() - 1;

    for i in 0..j {
        let d = slope(points[i], points[i + 1]);
        if d.abs() < MONOTONE_EPSILON {
            m[i] = 0.0;
            m[i + 1] = 0.0;
        } else {
            let a = m[i] / d;
            let b = m[i + 1] / d;
            let s = a * a + b * b;
            if s > 9.0 {
                let s = d * 3.0 / s.sqrt();
                m[i] = s * a;
                m[i + 1] = s * b;
            }
        }
    }

    (0..=j)
        .map(|i| {
            let dx = points[j.min(i + 1)].x - points[i.saturating_sub(1)].x;
            let s = dx / (6.0 * (1.0 + m[i] * m[i]));
            Point::new(or_zero(s), or_zero(m[i] * s))
        })
        .collect()
}

fn or_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

fn monotone(path: &mut String, points: &[Point]) {
    if points.len() < 3 {
        linear(path, points);
        return;
    }
    push_point(path, points[0]);
    hermite(path, points, &monotone_tangents(points));
}
