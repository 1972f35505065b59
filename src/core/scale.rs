use std::fmt;

use indexmap::IndexSet;

use crate::core::Value;
use crate::error::{ChartError, ChartResult};

/// Domain-to-screen mapping consumed by the plots.
///
/// Implementations declare their capabilities up front: a scale that can map
/// screen values back into a numeric domain returns itself from
/// [`Scale::as_continuous`].
pub trait Scale: fmt::Debug {
    fn scale(&self, value: &Value) -> f64;

    /// Current domain in the scale's own value type.
    fn domain(&self) -> Vec<Value>;

    fn as_continuous(&self) -> Option<&dyn ContinuousScale> {
        None
    }

    /// Width of one category band, for scales that lay out bands.
    fn band_width(&self) -> Option<f64> {
        None
    }
}

/// Numeric scale with an inverse.
pub trait ContinuousScale {
    fn scale_number(&self, value: f64) -> f64;

    fn invert(&self, pixel: f64) -> f64;

    /// `(start, end)` as configured; `start` may exceed `end`.
    fn numeric_domain(&self) -> (f64, f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        Self::with_range(domain_start, domain_end, 0.0, 1.0)
    }

    pub fn with_range(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    pub fn with_domain(self, domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        Self::with_range(domain_start, domain_end, self.range_start, self.range_end)
    }
}

impl ContinuousScale for LinearScale {
    fn scale_number(&self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    fn invert(&self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    fn numeric_domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }
}

impl Scale for LinearScale {
    fn scale(&self, value: &Value) -> f64 {
        self.scale_number(value.to_number())
    }

    fn domain(&self) -> Vec<Value> {
        vec![
            Value::Number(self.domain_start),
            Value::Number(self.domain_end),
        ]
    }

    fn as_continuous(&self) -> Option<&dyn ContinuousScale> {
        Some(self)
    }
}

/// Ordinal scale laying categories out as equal bands across the range.
///
/// Values map to band centers; unknown categories map to NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScale {
    categories: IndexSet<String>,
    range_start: f64,
    range_end: f64,
    inner_padding: f64,
}

impl CategoryScale {
    pub fn new<I, S>(categories: I, range_start: f64, range_end: f64) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }
        let categories = categories
            .into_iter()
            .map(|category| category.into().canonical_key())
            .collect();
        Ok(Self {
            categories,
            range_start,
            range_end,
            inner_padding: 0.3,
        })
    }

    /// Fraction of each band left empty between neighboring bars.
    pub fn with_inner_padding(mut self, inner_padding: f64) -> ChartResult<Self> {
        if !inner_padding.is_finite() || !(0.0..1.0).contains(&inner_padding) {
            return Err(ChartError::InvalidData(
                "category inner padding must be finite and in [0, 1)".to_owned(),
            ));
        }
        self.inner_padding = inner_padding;
        Ok(self)
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        (self.range_end - self.range_start) / self.categories.len() as f64
    }

    #[must_use]
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }
}

impl Scale for CategoryScale {
    fn scale(&self, value: &Value) -> f64 {
        match self.categories.get_index_of(&value.canonical_key()) {
            Some(index) => self.range_start + self.step() * (index as f64 + 0.5),
            None => f64::NAN,
        }
    }

    fn domain(&self) -> Vec<Value> {
        self.categories
            .iter()
            .map(|category| Value::Text(category.clone()))
            .collect()
    }

    fn band_width(&self) -> Option<f64> {
        Some(self.step().abs() * (1.0 - self.inner_padding))
    }
}
