//! Tunables for selection, highlight and caret behavior.
use std::time::Duration;

use planar_ui::Color;
use thiserror::Error;

/// Configuration of one interaction context.
///
/// # Examples
///
/// ```
/// use planar_text::InteractionConfig;
///
/// let config = InteractionConfig {
///     caret_width_css: 1.0,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionConfig {
    /// Fill color of selection highlight quads.
    pub selection_color: Color,
    /// Fill color of the caret quad.
    pub caret_color: Color,
    /// Caret width in CSS pixels.
    pub caret_width_css: f32,
    /// Half of the caret blink period: the caret is shown for this long, then
    /// hidden for this long.
    pub caret_blink_interval: Duration,
    /// Smallest width, in mesh-local units, of a highlight segment.
    pub min_segment_width: f32,
    /// Smallest height, in mesh-local units, of a highlight segment.
    pub min_segment_height: f32,
    /// How far overlay quads sit in front of the text plane.
    pub overlay_depth_offset: f32,
    /// Longest gap between presses that still counts as a multi-click.
    pub multi_click_interval: Duration,
    /// Largest pointer travel, in client pixels, between presses of a
    /// multi-click.
    pub multi_click_distance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            selection_color: Color::new(0.5, 0.7, 1.0, 0.4),
            caret_color: Color::BLACK,
            caret_width_css: 2.0,
            caret_blink_interval: Duration::from_millis(500),
            min_segment_width: 0.001,
            min_segment_height: 0.001,
            overlay_depth_offset: 0.001,
            multi_click_interval: Duration::from_millis(500),
            multi_click_distance: 5.0,
        }
    }
}

/// Reasons an [`InteractionConfig`] is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A size that must be strictly positive was not.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// The caret would never blink.
    #[error("`caret_blink_interval` must be non-zero")]
    ZeroBlinkInterval,
    /// A color component lies outside `[0, 1]`.
    #[error("`{field}` has a component outside [0, 1]")]
    ColorOutOfRange {
        /// Offending field.
        field: &'static str,
    },
}

impl InteractionConfig {
    /// Checks the configuration for values that would break rendering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("caret_width_css", self.caret_width_css),
            ("min_segment_width", self.min_segment_width),
            ("min_segment_height", self.min_segment_height),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.caret_blink_interval.is_zero() {
            return Err(ConfigError::ZeroBlinkInterval);
        }
        if !self.selection_color.is_normalized() {
            return Err(ConfigError::ColorOutOfRange {
                field: "selection_color",
            });
        }
        if !self.caret_color.is_normalized() {
            return Err(ConfigError::ColorOutOfRange {
                field: "caret_color",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(InteractionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let config = InteractionConfig {
            min_segment_height: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "min_segment_height",
                value: 0.0
            })
        );

        let config = InteractionConfig {
            caret_blink_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBlinkInterval));

        let config = InteractionConfig {
            selection_color: Color::new(2.0, 0.0, 0.0, 1.0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ColorOutOfRange {
                field: "selection_color"
            })
        );
    }
}
