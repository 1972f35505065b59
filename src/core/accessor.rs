use std::fmt;
use std::rc::Rc;

use crate::core::{Dataset, Extent, Scale, Value};

/// Extracts a value from `(record, index, dataset)`.
pub type Accessor<D> = Rc<dyn Fn(&D, usize, &Dataset<D>) -> Value>;

/// Predicate over `(record, index, dataset)`.
pub type RecordPredicate<D> = Rc<dyn Fn(&D, usize, &Dataset<D>) -> bool>;

pub fn accessor<D, F, T>(f: F) -> Accessor<D>
where
    D: 'static,
    F: Fn(&D, usize, &Dataset<D>) -> T + 'static,
    T: Into<Value>,
{
    Rc::new(move |datum, index, dataset| f(datum, index, dataset).into())
}

/// Accessor that reads only the record.
pub fn field<D, F, T>(f: F) -> Accessor<D>
where
    D: 'static,
    F: Fn(&D) -> T + 'static,
    T: Into<Value>,
{
    Rc::new(move |datum, _, _| f(datum).into())
}

pub fn constant<D: 'static>(value: impl Into<Value>) -> Accessor<D> {
    let value = value.into();
    Rc::new(move |_, _, _| value.clone())
}

/// Accessor bound to a property, optionally through a scale.
///
/// Without a scale the accessor output is used as a screen value directly.
pub struct AccessorScaleBinding<D> {
    pub accessor: Accessor<D>,
    pub scale: Option<Rc<dyn Scale>>,
}

impl<D> AccessorScaleBinding<D> {
    #[must_use]
    pub fn new(accessor: Accessor<D>) -> Self {
        Self {
            accessor,
            scale: None,
        }
    }

    #[must_use]
    pub fn with_scale(accessor: Accessor<D>, scale: Rc<dyn Scale>) -> Self {
        Self {
            accessor,
            scale: Some(scale),
        }
    }

    #[must_use]
    pub fn value(&self, datum: &D, index: usize, dataset: &Dataset<D>) -> Value {
        (self.accessor)(datum, index, dataset)
    }

    /// Accessor output mapped through the scale, or cast to a number when
    /// no scale is bound.
    #[must_use]
    pub fn scaled(&self, datum: &D, index: usize, dataset: &Dataset<D>) -> f64 {
        let value = self.value(datum, index, dataset);
        match &self.scale {
            Some(scale) => scale.scale(&value),
            None => value.to_number(),
        }
    }

    /// Screen-space projector equivalent to [`Self::scaled`].
    #[must_use]
    pub fn scaled_accessor(&self) -> Rc<dyn Fn(&D, usize, &Dataset<D>) -> f64>
    where
        D: 'static,
    {
        let accessor = Rc::clone(&self.accessor);
        let scale = self.scale.clone();
        Rc::new(move |datum, index, dataset| {
            let value = accessor(datum, index, dataset);
            match &scale {
                Some(scale) => scale.scale(&value),
                None => value.to_number(),
            }
        })
    }
}

impl<D> Clone for AccessorScaleBinding<D> {
    fn clone(&self) -> Self {
        Self {
            accessor: Rc::clone(&self.accessor),
            scale: self.scale.clone(),
        }
    }
}

impl<D> fmt::Debug for AccessorScaleBinding<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorScaleBinding")
            .field("accessor", &"<fn>")
            .field("scale", &self.scale)
            .finish()
    }
}

/// Record filter applied before extent and stack-extent computation.
pub struct ExtentFilter<D> {
    predicate: Option<RecordPredicate<D>>,
}

impl<D: 'static> ExtentFilter<D> {
    /// Accepts every record.
    #[must_use]
    pub fn all() -> Self {
        Self { predicate: None }
    }

    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&D, usize, &Dataset<D>) -> bool + 'static,
    {
        Self {
            predicate: Some(Rc::new(predicate)),
        }
    }

    /// Keeps records whose accessor output coerces to a finite number.
    #[must_use]
    pub fn finite(accessor: Accessor<D>) -> Self {
        Self::new(move |datum, index, dataset| {
            accessor(datum, index, dataset).to_number().is_finite()
        })
    }

    /// Keeps records whose accessor output lies inside `extent` (inclusive).
    #[must_use]
    pub fn within(accessor: Accessor<D>, extent: Extent) -> Self {
        Self::new(move |datum, index, dataset| {
            extent.contains(accessor(datum, index, dataset).to_number())
        })
    }

    /// Both filters must accept.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self.predicate, other.predicate) {
            (None, None) => Self::all(),
            (Some(only), None) | (None, Some(only)) => Self {
                predicate: Some(only),
            },
            (Some(lhs), Some(rhs)) => {
                Self::new(move |datum, index, dataset| {
                    lhs(datum, index, dataset) && rhs(datum, index, dataset)
                })
            }
        }
    }
}

impl<D> ExtentFilter<D> {
    #[must_use]
    pub fn accepts(&self, datum: &D, index: usize, dataset: &Dataset<D>) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate(datum, index, dataset))
    }
}

impl<D: 'static> Default for ExtentFilter<D> {
    fn default() -> Self {
        Self::all()
    }
}

impl<D> Clone for ExtentFilter<D> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<D> fmt::Debug for ExtentFilter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtentFilter")
            .field("filtered", &self.predicate.is_some())
            .finish()
    }
}
