use std::rc::Rc;

use tracing::{debug, warn};

use crate::core::{
    AccessorScaleBinding, Dataset, Extent, Orientation, Property, Scale, StackOffsets, Value,
    compute_stack_extent, compute_stack_offsets,
};
use crate::error::{ChartError, ChartResult};

use super::invalidation::{InvalidationTopic, InvalidationTopics};
use super::plot::XyPlot;
use super::plot_config::PlotConfig;
use super::projector::{AnimatorRole, AttrToProjector, DrawStep, Projector};

/// Bar thickness used when the key scale has no band width.
pub const DEFAULT_BAR_THICKNESS_PX: f64 = 10.0;

/// Bars from several datasets stacked per key, positive and negative values
/// on separate ladders.
///
/// Stack offsets and the stacked extent are cached and recomputed by
/// [`StackedBarPlot::refresh`], which every geometry read calls first.
#[derive(Debug)]
pub struct StackedBarPlot<D> {
    plot: XyPlot<D>,
    orientation: Orientation,
    offsets: Rc<StackOffsets>,
    stacked_extent: Option<Extent>,
}

impl<D: 'static> StackedBarPlot<D> {
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            plot: XyPlot::new(),
            orientation,
            offsets: Rc::new(StackOffsets::new()),
            stacked_extent: None,
        }
    }

    pub fn from_config(config: &PlotConfig) -> ChartResult<Self> {
        let mut plot = Self::new(config.orientation);
        plot.apply_config(config)?;
        Ok(plot)
    }

    pub fn apply_config(&mut self, config: &PlotConfig) -> ChartResult<()> {
        config.validate()?;
        self.set_orientation(config.orientation);
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

    /// Mutable access to datasets and bindings. Changes are picked up by the
    /// next [`Self::refresh`].
    pub fn plot_mut(&mut self) -> &mut XyPlot<D> {
        &mut self.plot
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation == orientation {
            return;
        }
        self.orientation = orientation;
        self.plot.invalidate(InvalidationTopic::XBinding);
        self.plot.invalidate(InvalidationTopic::YBinding);
    }

    /// Recomputes stack offsets and the stacked extent if anything they
    /// depend on changed since the last refresh.
    pub fn refresh(&mut self) {
        let pending = self.plot.take_pending();
        if !pending.intersects(InvalidationTopics::GEOMETRY) {
            return;
        }

        let key_property = self.orientation.key_property();
        let value_property = self.orientation.value_property();
        let (Some(key), Some(value)) = (
            self.plot.binding(key_property),
            self.plot.binding(value_property),
        ) else {
            warn!(
                key = %key_property,
                value = %value_property,
                "stacking skipped: key or value accessor unbound"
            );
            self.offsets = Rc::new(StackOffsets::new());
            self.stacked_extent = None;
            return;
        };

        let datasets = self.plot.datasets();
        let offsets = compute_stack_offsets(datasets, &key.accessor, &value.accessor);
        let filter = self.plot.extent_filter(value_property);
        self.stacked_extent = compute_stack_extent(&offsets, datasets, &filter);
        self.offsets = Rc::new(offsets);
        debug!(
            datasets = datasets.len(),
            stacked_extent = ?self.stacked_extent,
            "recomputed stack offsets"
        );
    }

    pub fn stack_offsets(&mut self) -> Rc<StackOffsets> {
        self.refresh();
        Rc::clone(&self.offsets)
    }

    /// Extent of the value axis over stacked bar ends.
    pub fn stacked_extent(&mut self) -> Option<Extent> {
        self.refresh();
        self.stacked_extent
    }

    /// Stacked extent for the value axis; plain extent for the key axis.
    pub fn extent(&mut self, property: Property) -> Option<Extent> {
        if property == self.orientation.value_property() {
            self.stacked_extent()
        } else {
            self.plot.extent(property)
        }
    }

    /// Projectors for every bar attribute.
    ///
    /// Vertical bars set `x`/`width` from the key and `y`/`height` from the
    /// stacked value; horizontal bars swap the pairs.
    pub fn attr_to_projector(&mut self) -> ChartResult<AttrToProjector<D>> {
        self.refresh();
        let key = self.plot.require_binding(self.orientation.key_property())?.clone();
        let value = self
            .plot
            .require_binding(self.orientation.value_property())?
            .clone();
        let (key_position, thickness, value_position, size) = self.attr_names();

        let mut attrs = self.plot.attr_projectors();

        let thickness_px = key
            .scale
            .as_ref()
            .and_then(|scale| scale.band_width())
            .unwrap_or(DEFAULT_BAR_THICKNESS_PX);
        let key_scaled = key.scaled_accessor();
        let position: Projector<D> = Rc::new(move |datum, index, dataset| {
            Ok((key_scaled(datum, index, dataset) - thickness_px / 2.0).into())
        });
        attrs.insert(key_position.to_owned(), position);
        attrs.insert(thickness.to_owned(), constant_projector(thickness_px));

        let ends = BarEnds {
            offsets: Rc::clone(&self.offsets),
            key,
            value,
        };
        let size_ends = ends.clone();
        let size_projector: Projector<D> = Rc::new(move |datum, index, dataset| {
            let (start, end) = size_ends.start_end(datum, index, dataset)?;
            Ok((end - start).abs().into())
        });
        let vertical = self.orientation.is_vertical();
        let position_projector: Projector<D> = Rc::new(move |datum, index, dataset| {
            let (start, end) = ends.start_end(datum, index, dataset)?;
            let origin = if ends.value_number(datum, index, dataset) < 0.0 {
                start
            } else {
                end
            };
            let position = if vertical {
                origin
            } else {
                origin - (end - start).abs()
            };
            Ok(position.into())
        });
        attrs.insert(value_position.to_owned(), position_projector);
        attrs.insert(size.to_owned(), size_projector);

        Ok(attrs)
    }

    /// Draw steps in play order: a collapsed reset step when animated, then
    /// the main step.
    pub fn draw_steps(&mut self) -> ChartResult<Vec<DrawStep<AttrToProjector<D>>>> {
        let main = self.attr_to_projector()?;
        let mut steps = Vec::with_capacity(2);
        if self.plot.animated() {
            let value = self.plot.require_binding(self.orientation.value_property())?;
            let baseline = scale_number(value.scale.as_deref(), 0.0);
            let (_, _, value_position, size) = self.attr_names();
            let mut reset = main.clone();
            reset.insert(value_position.to_owned(), constant_projector(baseline));
            reset.insert(size.to_owned(), constant_projector(0.0));
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

    /// Stack offsets as pretty JSON keyed by dataset id and canonical key.
    pub fn stack_snapshot_json_pretty(&mut self) -> ChartResult<String> {
        let offsets = self.stack_offsets();
        serde_json::to_string_pretty(offsets.as_ref()).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize stack offsets: {e}"))
        })
    }

    fn attr_names(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self.orientation {
            Orientation::Vertical => ("x", "width", "y", "height"),
            Orientation::Horizontal => ("y", "height", "x", "width"),
        }
    }
}

impl<D: 'static> Default for StackedBarPlot<D> {
    fn default() -> Self {
        Self::new(Orientation::default())
    }
}

fn constant_projector<D: 'static>(value: f64) -> Projector<D> {
    Rc::new(move |_, _, _| Ok(Value::Number(value)))
}

fn scale_number(scale: Option<&dyn Scale>, value: f64) -> f64 {
    match scale {
        Some(scale) => scale.scale(&Value::Number(value)),
        None => value,
    }
}

/// Screen-space start and end of one bar on the value axis.
struct BarEnds<D> {
    offsets: Rc<StackOffsets>,
    key: AccessorScaleBinding<D>,
    value: AccessorScaleBinding<D>,
}

impl<D> BarEnds<D> {
    fn value_number(&self, datum: &D, index: usize, dataset: &Dataset<D>) -> f64 {
        self.value.value(datum, index, dataset).to_number()
    }

    fn start_end(&self, datum: &D, index: usize, dataset: &Dataset<D>) -> ChartResult<(f64, f64)> {
        let key = self.key.value(datum, index, dataset).canonical_key();
        let offset = self
            .offsets
            .get(dataset.id(), &key)
            .map(|entry| entry.offset)
            .ok_or_else(|| ChartError::MissingStackEntry {
                dataset: dataset.id(),
                key,
            })?;
        let scale = self.value.scale.as_deref();
        let value = self.value_number(datum, index, dataset);
        Ok((scale_number(scale, offset), scale_number(scale, value + offset)))
    }
}

impl<D> Clone for BarEnds<D> {
    fn clone(&self) -> Self {
        Self {
            offsets: Rc::clone(&self.offsets),
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}
