use serde::{Deserialize, Serialize};

use crate::mapper::Padding;
use crate::theme::Palette;
use crate::TimelineError;

/// Layout and interaction constants for both chart kinds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub padding: Padding,
    pub timeline_padding: Padding,
    pub font_px: f64,
    pub series_width: f64,
    pub total_width: f64,
    pub dot_radius: f64,
    pub hit_radius_px: f64,
    pub heatmap_height: f64,
    pub strip_gap: f64,
    pub tooltip_padding: f64,
    pub tooltip_offset: f64,
    pub palette: Palette,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            padding: Padding {
                left: 48.0,
                right: 16.0,
                top: 16.0,
                bottom: 32.0,
            },
            timeline_padding: Padding {
                left: 48.0,
                right: 16.0,
                top: 8.0,
                bottom: 8.0,
            },
            font_px: 11.0,
            series_width: 1.5,
            total_width: 2.5,
            dot_radius: 4.0,
            hit_radius_px: 8.0,
            heatmap_height: 14.0,
            strip_gap: 6.0,
            tooltip_padding: 8.0,
            tooltip_offset: 12.0,
            palette: Palette::default(),
        }
    }
}

impl ChartConfig {
    /// Parse a partial JSON override; unspecified fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, TimelineError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        let sizes = [
            ("font_px", self.font_px),
            ("dot_radius", self.dot_radius),
            ("hit_radius_px", self.hit_radius_px),
            ("heatmap_height", self.heatmap_height),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.palette.problems.is_empty() {
            return Err(TimelineError::InvalidConfig(
                "palette needs at least one problem color".into(),
            ));
        }
        Ok(())
    }
}
