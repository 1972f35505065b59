use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::{
    DEFAULT_TENSION, Dataset, EdgeIntersections, Extent, Interpolation, PlotEntity, Point,
    Property, Value, build_line_path, constant, edge_intersections, nearest_entity,
    scaled_reset_baseline, smooth_extent,
};
use crate::error::{ChartError, ChartResult};

use super::invalidation::{InvalidationTopic, InvalidationTopics};
use super::plot::XyPlot;
use super::plot_config::PlotConfig;
use super::projector::{
    AnimatorRole, AnimatorSpec, DatasetAttrToProjector, DatasetProjector, DrawStep, EasingAnimator,
    EasingMode, PATH_ATTR,
};

pub const DEFAULT_LINE_STROKE: &str = "#5279c7";
pub const DEFAULT_LINE_STROKE_WIDTH: &str = "2px";
/// Step and total duration of the default main animator.
pub const LINE_ANIMATION_DURATION_MS: f64 = 600.0;

type ScaledAccessor<D> = Rc<dyn Fn(&D, usize, &Dataset<D>) -> f64>;

/// One path per dataset through its records.
///
/// Visual attributes other than the path are constant per dataset and read
/// from the dataset's first record.
#[derive(Debug)]
pub struct LinePlot<D> {
    plot: XyPlot<D>,
    interpolation: Interpolation,
    tension: f64,
    autorange_smooth: bool,
    intersections: EdgeIntersections,
}

impl<D: 'static> LinePlot<D> {
    #[must_use]
    pub fn new() -> Self {
        let mut plot = XyPlot::new();
        plot.set_attr("stroke", constant(DEFAULT_LINE_STROKE));
        plot.set_attr("stroke-width", constant(DEFAULT_LINE_STROKE_WIDTH));
        plot.set_animator(
            AnimatorRole::Main,
            AnimatorSpec::Easing(EasingAnimator {
                step_duration_ms: LINE_ANIMATION_DURATION_MS,
                max_total_duration_ms: Some(LINE_ANIMATION_DURATION_MS),
                easing: EasingMode::ExpInOut,
                ..EasingAnimator::default()
            }),
        );
        Self {
            plot,
            interpolation: Interpolation::default(),
            tension: DEFAULT_TENSION,
            autorange_smooth: false,
            intersections: EdgeIntersections::default(),
        }
    }

    pub fn from_config(config: &PlotConfig) -> ChartResult<Self> {
        let mut plot = Self::new();
        plot.apply_config(config)?;
        Ok(plot)
    }

    pub fn apply_config(&mut self, config: &PlotConfig) -> ChartResult<()> {
        config.validate()?;
        self.set_interpolation(config.interpolation);
        self.set_tension(config.tension)?;
        self.set_autorange_smooth(config.autorange_smooth);
        self.plot.set_autorange_mode(config.autorange_mode);
        self.plot.set_animated(config.animated);
        if let Some(animator) = config.main_animator {
            self.plot.set_animator(AnimatorRole::Main, animator);
        }
        if let Some(animator) = config.reset_animator {
            self.plot.set_animator(AnimatorRole::Reset, animator);
        }
        Ok(())
    }

    #[must_use]
    pub fn plot(&self) -> &XyPlot<D> {
        &self.plot
    }

    pub fn plot_mut(&mut self) -> &mut XyPlot<D> {
        &mut self.plot
    }

    #[must_use]
    pub fn interpolation(&self) -> &Interpolation {
        &self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: impl Into<Interpolation>) {
        self.interpolation = interpolation.into();
        self.plot.invalidate(InvalidationTopic::Interpolation);
    }

    /// Selects a built-in interpolation by name, e.g. `"step-after"`.
    pub fn set_interpolation_name(&mut self, name: &str) -> ChartResult<()> {
        let interpolation: Interpolation = name.parse()?;
        self.set_interpolation(interpolation);
        Ok(())
    }

    #[must_use]
    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn set_tension(&mut self, tension: f64) -> ChartResult<()> {
        if !tension.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "tension must be finite, got {tension}"
            )));
        }
        self.tension = tension;
        self.plot.invalidate(InvalidationTopic::Interpolation);
        Ok(())
    }

    #[must_use]
    pub fn autorange_smooth(&self) -> bool {
        self.autorange_smooth
    }

    /// When enabled the Y extent also covers where lines cross the left and
    /// right edges of the X domain, so lines leave the plot at its sides.
    pub fn set_autorange_smooth(&mut self, autorange_smooth: bool) {
        self.autorange_smooth = autorange_smooth;
        self.plot.invalidate(InvalidationTopic::Autorange);
    }

    /// Recomputes cached edge intersections if their inputs changed.
    pub fn refresh(&mut self) {
        let pending = self.plot.take_pending();
        if !pending.intersects(InvalidationTopics::GEOMETRY) {
            return;
        }
        self.intersections = if self.autorange_smooth {
            self.edge_intersections()
        } else {
            EdgeIntersections::default()
        };
        debug!(
            autorange_smooth = self.autorange_smooth,
            left = self.intersections.left.len(),
            right = self.intersections.right.len(),
            "refreshed line geometry"
        );
    }

    /// Scaled `(x, y)` of every record in `dataset`.
    pub fn screen_points(&self, dataset: &Dataset<D>) -> ChartResult<Vec<Point>> {
        let x = self.plot.require_binding(Property::X)?;
        let y = self.plot.require_binding(Property::Y)?;
        Ok(dataset
            .records()
            .map(|(index, datum)| {
                Point::new(
                    x.scaled(datum, index, dataset),
                    y.scaled(datum, index, dataset),
                )
            })
            .collect())
    }

    /// Domain-space points where lines cross the X domain edges.
    ///
    /// Empty unless both positional bindings carry scales and the Y scale is
    /// continuous.
    #[must_use]
    pub fn edge_intersections(&self) -> EdgeIntersections {
        let (Some(x), Some(y)) = (self.plot.x(), self.plot.y()) else {
            return EdgeIntersections::default();
        };
        let (Some(x_scale), Some(y_scale)) = (x.scale.as_deref(), y.scale.as_deref()) else {
            return EdgeIntersections::default();
        };
        let lines: Vec<Vec<Point>> = self
            .plot
            .datasets()
            .iter()
            .filter_map(|dataset| self.screen_points(dataset).ok())
            .collect();
        edge_intersections(lines.iter().map(Vec::as_slice), x_scale, y_scale)
    }

    /// Data extent for `property`; with smooth autoranging the Y extent also
    /// covers the edge intersections.
    pub fn extent(&mut self, property: Property) -> Option<Extent> {
        self.refresh();
        let base = self.plot.extent(property);
        if property == Property::Y && self.autorange_smooth {
            smooth_extent(base, &self.intersections)
        } else {
            base
        }
    }

    /// Per-dataset projectors: the path under [`PATH_ATTR`] plus every bound
    /// visual attribute evaluated on the first record.
    pub fn attr_to_projector(&mut self) -> ChartResult<DatasetAttrToProjector<D>> {
        self.refresh();
        let y = self.plot.require_binding(Property::Y)?.scaled_accessor();
        self.projectors_with_path_y(y)
    }

    /// Draw steps in play order. Animated plots first draw every line flat
    /// along the reset baseline.
    pub fn draw_steps(&mut self) -> ChartResult<Vec<DrawStep<DatasetAttrToProjector<D>>>> {
        let main = self.attr_to_projector()?;
        let mut steps = Vec::with_capacity(2);
        if self.plot.animated() {
            let y = self.plot.require_binding(Property::Y)?;
            let baseline = y
                .scale
                .as_deref()
                .map_or(0.0, |scale| scaled_reset_baseline(scale));
            trace!(baseline, "line reset baseline");
            let reset = self.projectors_with_path_y(Rc::new(move |_, _, _| baseline))?;
            steps.push(DrawStep {
                attr_to_projector: reset,
                role: AnimatorRole::Reset,
                animator: self.plot.animator(AnimatorRole::Reset),
            });
        }
        steps.push(DrawStep {
            attr_to_projector: main,
            role: AnimatorRole::Main,
            animator: self.plot.animator(AnimatorRole::Main),
        });
        Ok(steps)
    }

    fn projectors_with_path_y(
        &self,
        path_y: ScaledAccessor<D>,
    ) -> ChartResult<DatasetAttrToProjector<D>> {
        let x = self.plot.require_binding(Property::X)?.scaled_accessor();
        let y = self.plot.require_binding(Property::Y)?.scaled_accessor();

        let mut attrs = DatasetAttrToProjector::new();
        for (name, projector) in self.plot.attr_projectors() {
            if name == PATH_ATTR {
                continue;
            }
            let first_record: DatasetProjector<D> = Rc::new(move |dataset| {
                match dataset.data().first() {
                    Some(datum) => projector(datum, 0, dataset),
                    None => Ok(Value::Null),
                }
            });
            attrs.insert(name, first_record);
        }

        let interpolation = self.interpolation.clone();
        let tension = self.tension;
        let path: DatasetProjector<D> = Rc::new(move |dataset| {
            let vertices = dataset.records().map(|(index, datum)| {
                let px = x(datum, index, dataset);
                let defined = !px.is_nan() && !y(datum, index, dataset).is_nan();
                defined.then(|| Point::new(px, path_y(datum, index, dataset)))
            });
            Ok(build_line_path(vertices, &interpolation, tension)
                .map_or(Value::Null, Value::Text))
        });
        attrs.insert(PATH_ATTR.to_owned(), path);
        Ok(attrs)
    }

    /// One entity per record, positioned in screen space.
    pub fn entities(&self) -> ChartResult<Vec<PlotEntity<'_, D>>> {
        let mut entities = Vec::new();
        for dataset in self.plot.datasets() {
            let points = self.screen_points(dataset)?;
            entities.extend(dataset.records().zip(points).map(|((index, datum), position)| {
                PlotEntity {
                    datum,
                    index,
                    dataset: dataset.id(),
                    position,
                }
            }));
        }
        Ok(entities)
    }

    /// Visible entity nearest to `query` by X distance, then Y distance.
    pub fn entity_nearest(&self, query: Point) -> ChartResult<Option<PlotEntity<'_, D>>> {
        let entities = self.entities()?;
        Ok(nearest_entity(entities, query, |entity| {
            self.plot.dataset(entity.dataset).is_some_and(|dataset| {
                self.plot
                    .is_visible(entity.position, entity.datum, entity.index, dataset)
            })
        }))
    }
}

impl<D: 'static> Default for LinePlot<D> {
    fn default() -> Self {
        Self::new()
    }
}
