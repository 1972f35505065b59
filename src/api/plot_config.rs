use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_TENSION, InterpolationMode, Orientation};
use crate::error::{ChartError, ChartResult};

use super::plot::AutorangeMode;
use super::projector::AnimatorSpec;

/// Serializable plot settings shared by the bar and line plots.
///
/// Plots ignore settings that do not apply to them: bar plots have no
/// interpolation, line plots have no orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub orientation: Orientation,
    pub interpolation: InterpolationMode,
    pub tension: f64,
    pub autorange_smooth: bool,
    pub autorange_mode: AutorangeMode,
    pub animated: bool,
    /// `None` keeps the plot's own default.
    pub main_animator: Option<AnimatorSpec>,
    pub reset_animator: Option<AnimatorSpec>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            interpolation: InterpolationMode::Linear,
            tension: DEFAULT_TENSION,
            autorange_smooth: false,
            autorange_mode: AutorangeMode::None,
            animated: false,
            main_animator: None,
            reset_animator: None,
        }
    }
}

impl PlotConfig {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse plot config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize plot config: {e}"))
        })
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.tension.is_finite() {
            return Err(ChartError::InvalidConfig(
                "tension must be finite".to_owned(),
            ));
        }
        for animator in [self.main_animator, self.reset_animator].into_iter().flatten() {
            validate_animator(animator)?;
        }
        Ok(())
    }
}

fn validate_animator(animator: AnimatorSpec) -> ChartResult<()> {
    let AnimatorSpec::Easing(easing) = animator else {
        return Ok(());
    };
    let timings = [
        ("start_delay_ms", easing.start_delay_ms),
        ("step_duration_ms", easing.step_duration_ms),
        ("step_delay_ms", easing.step_delay_ms),
    ];
    for (name, value) in timings {
        if !value.is_finite() || value < 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "{name} must be finite and >= 0"
            )));
        }
    }
    if let Some(max) = easing.max_total_duration_ms {
        if !max.is_finite() || max < 0.0 {
            return Err(ChartError::InvalidConfig(
                "max_total_duration_ms must be finite and >= 0".to_owned(),
            ));
        }
    }
    Ok(())
}
