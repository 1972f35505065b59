use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Accessor, AccessorScaleBinding, Dataset, DatasetId, Extent, ExtentFilter, Point, Property,
    Scale,
};
use crate::error::{ChartError, ChartResult};

use super::invalidation::{InvalidationTopic, InvalidationTopics};
use super::projector::{AnimatorRole, AnimatorSpec, AttrToProjector, Projector};

/// Which axis narrows the records the other axis autoranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutorangeMode {
    /// Extents consider every record.
    #[default]
    None,
    /// X extents consider only records whose Y lies in the Y domain.
    X,
    /// Y extents consider only records whose X lies in the X domain.
    Y,
}

/// Predicate deciding whether a drawn record is visible on the plot.
pub type VisibilityPredicate<D> = Rc<dyn Fn(Point, &D, usize, &Dataset<D>) -> bool>;

/// Shared state of an XY plot: datasets, property bindings, attribute
/// bindings and animation settings.
///
/// Every structural mutation records an [`InvalidationTopic`]; plot adapters
/// drain them before reading derived state, so a mutation made through any
/// handle reaches the next read.
pub struct XyPlot<D> {
    datasets: Vec<Dataset<D>>,
    x: Option<AccessorScaleBinding<D>>,
    y: Option<AccessorScaleBinding<D>>,
    attrs: IndexMap<String, AccessorScaleBinding<D>>,
    x_filter: ExtentFilter<D>,
    y_filter: ExtentFilter<D>,
    visibility: Option<VisibilityPredicate<D>>,
    autorange_mode: AutorangeMode,
    animated: bool,
    main_animator: AnimatorSpec,
    reset_animator: AnimatorSpec,
    pending: InvalidationTopics,
}

impl<D: 'static> XyPlot<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            datasets: Vec::new(),
            x: None,
            y: None,
            attrs: IndexMap::new(),
            x_filter: ExtentFilter::all(),
            y_filter: ExtentFilter::all(),
            visibility: None,
            autorange_mode: AutorangeMode::None,
            animated: false,
            main_animator: AnimatorSpec::default(),
            reset_animator: AnimatorSpec::Null,
            pending: InvalidationTopics::all(),
        }
    }

    pub(crate) fn invalidate(&mut self, topic: InvalidationTopic) {
        self.pending = self.pending.with_topic(topic);
    }

    /// Topics recorded since the owning plot last refreshed.
    #[must_use]
    pub fn pending(&self) -> InvalidationTopics {
        self.pending
    }

    pub(crate) fn take_pending(&mut self) -> InvalidationTopics {
        std::mem::take(&mut self.pending)
    }

    pub fn add_dataset(&mut self, dataset: Dataset<D>) -> DatasetId {
        let id = dataset.id();
        debug!(dataset = %id, records = dataset.len(), "add dataset");
        self.datasets.push(dataset);
        self.invalidate(InvalidationTopic::Datasets);
        id
    }

    pub fn remove_dataset(&mut self, id: DatasetId) -> ChartResult<Dataset<D>> {
        let position = self
            .datasets
            .iter()
            .position(|dataset| dataset.id() == id)
            .ok_or(ChartError::UnknownDataset(id))?;
        debug!(dataset = %id, "remove dataset");
        self.invalidate(InvalidationTopic::Datasets);
        Ok(self.datasets.remove(position))
    }

    /// Replaces a dataset's records, keeping its identity and stack position.
    pub fn replace_data(&mut self, id: DatasetId, data: Vec<D>) -> ChartResult<Vec<D>> {
        let dataset = self
            .datasets
            .iter_mut()
            .find(|dataset| dataset.id() == id)
            .ok_or(ChartError::UnknownDataset(id))?;
        debug!(dataset = %id, records = data.len(), "replace dataset records");
        let previous = dataset.replace_data(data);
        self.invalidate(InvalidationTopic::Datasets);
        Ok(previous)
    }

    #[must_use]
    pub fn datasets(&self) -> &[Dataset<D>] {
        &self.datasets
    }

    #[must_use]
    pub fn dataset(&self, id: DatasetId) -> Option<&Dataset<D>> {
        self.datasets.iter().find(|dataset| dataset.id() == id)
    }

    #[must_use]
    pub fn binding(&self, property: Property) -> Option<&AccessorScaleBinding<D>> {
        match property {
            Property::X => self.x.as_ref(),
            Property::Y => self.y.as_ref(),
        }
    }

    pub fn require_binding(&self, property: Property) -> ChartResult<&AccessorScaleBinding<D>> {
        self.binding(property)
            .ok_or(ChartError::MissingBinding { property })
    }

    pub fn set_binding(&mut self, property: Property, binding: AccessorScaleBinding<D>) {
        match property {
            Property::X => self.x = Some(binding),
            Property::Y => self.y = Some(binding),
        }
        self.invalidate(InvalidationTopic::binding(property));
    }

    /// Binds `property` to an accessor whose output is already in screen space.
    pub fn set_value(&mut self, property: Property, accessor: Accessor<D>) {
        self.set_binding(property, AccessorScaleBinding::new(accessor));
    }

    pub fn set_value_and_scale(
        &mut self,
        property: Property,
        accessor: Accessor<D>,
        scale: Rc<dyn Scale>,
    ) {
        self.set_binding(property, AccessorScaleBinding::with_scale(accessor, scale));
    }

    #[must_use]
    pub fn x(&self) -> Option<&AccessorScaleBinding<D>> {
        self.x.as_ref()
    }

    #[must_use]
    pub fn y(&self) -> Option<&AccessorScaleBinding<D>> {
        self.y.as_ref()
    }

    pub fn set_x(&mut self, accessor: Accessor<D>) {
        self.set_value(Property::X, accessor);
    }

    pub fn set_x_with_scale(&mut self, accessor: Accessor<D>, scale: Rc<dyn Scale>) {
        self.set_value_and_scale(Property::X, accessor, scale);
    }

    pub fn set_y(&mut self, accessor: Accessor<D>) {
        self.set_value(Property::Y, accessor);
    }

    pub fn set_y_with_scale(&mut self, accessor: Accessor<D>, scale: Rc<dyn Scale>) {
        self.set_value_and_scale(Property::Y, accessor, scale);
    }

    /// Both positional properties are bound.
    #[must_use]
    pub fn projectors_ready(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Binds a visual attribute such as `fill` or `stroke`.
    pub fn set_attr(&mut self, name: impl Into<String>, accessor: Accessor<D>) {
        self.attrs
            .insert(name.into(), AccessorScaleBinding::new(accessor));
        self.invalidate(InvalidationTopic::Attributes);
    }

    pub fn set_attr_with_scale(
        &mut self,
        name: impl Into<String>,
        accessor: Accessor<D>,
        scale: Rc<dyn Scale>,
    ) {
        self.attrs
            .insert(name.into(), AccessorScaleBinding::with_scale(accessor, scale));
        self.invalidate(InvalidationTopic::Attributes);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<AccessorScaleBinding<D>> {
        let removed = self.attrs.shift_remove(name);
        if removed.is_some() {
            self.invalidate(InvalidationTopic::Attributes);
        }
        removed
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AccessorScaleBinding<D>> {
        self.attrs.get(name)
    }

    /// Projectors for the bound visual attributes.
    ///
    /// Scaled attributes yield the scaled number; unscaled ones pass the
    /// accessor output through untouched.
    #[must_use]
    pub fn attr_projectors(&self) -> AttrToProjector<D> {
        self.attrs
            .iter()
            .map(|(name, binding)| {
                let accessor = Rc::clone(&binding.accessor);
                let scale = binding.scale.clone();
                let projector: Projector<D> = Rc::new(move |datum, index, dataset| {
                    let value = accessor(datum, index, dataset);
                    Ok(match &scale {
                        Some(scale) => scale.scale(&value).into(),
                        None => value,
                    })
                });
                (name.clone(), projector)
            })
            .collect()
    }

    /// Sets the caller's record filter for `property` extents.
    pub fn set_extent_filter(&mut self, property: Property, filter: ExtentFilter<D>) {
        match property {
            Property::X => self.x_filter = filter,
            Property::Y => self.y_filter = filter,
        }
        self.invalidate(InvalidationTopic::Filters);
    }

    #[must_use]
    pub fn autorange_mode(&self) -> AutorangeMode {
        self.autorange_mode
    }

    pub fn set_autorange_mode(&mut self, mode: AutorangeMode) {
        self.autorange_mode = mode;
        self.invalidate(InvalidationTopic::Autorange);
    }

    /// Effective record filter for `property` extents: the caller's filter,
    /// narrowed to the other axis' domain when autoranging on `property`.
    #[must_use]
    pub fn extent_filter(&self, property: Property) -> ExtentFilter<D> {
        let user = match property {
            Property::X => self.x_filter.clone(),
            Property::Y => self.y_filter.clone(),
        };
        let autoranged = matches!(
            (self.autorange_mode, property),
            (AutorangeMode::X, Property::X) | (AutorangeMode::Y, Property::Y)
        );
        if !autoranged {
            return user;
        }
        match self.domain_filter(property.other()) {
            Some(domain) => user.and(domain),
            None => user,
        }
    }

    fn domain_filter(&self, property: Property) -> Option<ExtentFilter<D>> {
        let binding = self.binding(property)?;
        let continuous = binding.scale.as_ref()?.as_continuous()?;
        let (start, end) = continuous.numeric_domain();
        let domain = Extent::new(start.min(end), start.max(end));
        Some(ExtentFilter::within(Rc::clone(&binding.accessor), domain))
    }

    /// Finite numeric extent of `property` over records passing its filter.
    #[must_use]
    pub fn extent(&self, property: Property) -> Option<Extent> {
        let binding = self.binding(property)?;
        let filter = self.extent_filter(property);
        self.datasets
            .iter()
            .map(|dataset| {
                Extent::from_finite_values(dataset.records().filter_map(|(index, datum)| {
                    filter
                        .accepts(datum, index, dataset)
                        .then(|| binding.value(datum, index, dataset).to_number())
                }))
            })
            .fold(None, Extent::union_opt)
    }

    pub fn set_visibility<F>(&mut self, predicate: F)
    where
        F: Fn(Point, &D, usize, &Dataset<D>) -> bool + 'static,
    {
        self.visibility = Some(Rc::new(predicate));
    }

    /// Visible unless a visibility predicate rejects the record.
    #[must_use]
    pub fn is_visible(&self, position: Point, datum: &D, index: usize, dataset: &Dataset<D>) -> bool {
        self.visibility
            .as_ref()
            .is_none_or(|visible| visible(position, datum, index, dataset))
    }

    #[must_use]
    pub fn animated(&self) -> bool {
        self.animated
    }

    /// Requests a reset step ahead of the main step on the next draw.
    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
        self.invalidate(InvalidationTopic::Animation);
    }

    #[must_use]
    pub fn animator(&self, role: AnimatorRole) -> AnimatorSpec {
        match role {
            AnimatorRole::Reset => self.reset_animator,
            AnimatorRole::Main => self.main_animator,
        }
    }

    pub fn set_animator(&mut self, role: AnimatorRole, animator: AnimatorSpec) {
        match role {
            AnimatorRole::Reset => self.reset_animator = animator,
            AnimatorRole::Main => self.main_animator = animator,
        }
        self.invalidate(InvalidationTopic::Animation);
    }
}

impl<D: 'static> Default for XyPlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for XyPlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XyPlot")
            .field("datasets", &self.datasets.len())
            .field("x", &self.x)
            .field("y", &self.y)
            .field("attrs", &self.attrs.keys().collect::<Vec<_>>())
            .field("autorange_mode", &self.autorange_mode)
            .field("animated", &self.animated)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::XyPlot;
    use crate::api::{InvalidationTopic, InvalidationTopics};
    use crate::core::{Dataset, constant, field};

    type Pair = (f64, f64);

    #[test]
    fn draining_clears_pending_topics() {
        let mut plot: XyPlot<Pair> = XyPlot::new();
        assert_eq!(plot.take_pending(), InvalidationTopics::all());
        assert!(plot.pending().is_none());
    }

    #[test]
    fn mutations_record_their_topics() {
        let mut plot: XyPlot<Pair> = XyPlot::new();
        plot.set_x(field(|p: &Pair| p.0));
        plot.take_pending();

        plot.set_attr("fill", constant("red"));
        assert_eq!(
            plot.take_pending(),
            InvalidationTopics::from_topic(InvalidationTopic::Attributes)
        );

        plot.set_y(field(|p: &Pair| p.0));
        plot.add_dataset(Dataset::new(vec![(1.0, 2.0)]));
        let pending = plot.take_pending();
        assert!(pending.contains_topic(InvalidationTopic::YBinding));
        assert!(pending.contains_topic(InvalidationTopic::Datasets));
        assert!(!pending.contains_topic(InvalidationTopic::XBinding));
        assert!(pending.intersects(InvalidationTopics::GEOMETRY));
    }
}
