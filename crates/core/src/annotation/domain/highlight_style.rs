use serde::{Deserialize, Serialize};

use crate::shared::color::Color;

/// How detected eyes are painted onto a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    /// Solid fill drawn on the overlay copy.
    pub fill: Color,
    /// Outline drawn on the frame itself before blending.
    pub outline: Color,
    pub outline_thickness: u32,
    /// Weight of the overlay in the blend; the frame gets `1 - overlay_weight`.
    pub overlay_weight: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgb(0, 255, 0),
            outline: Color::rgb(0, 200, 0),
            outline_thickness: 2,
            overlay_weight: 0.35,
        }
    }
}

impl HighlightStyle {
    pub fn with_overlay_weight(self, overlay_weight: f32) -> Self {
        Self {
            overlay_weight,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.overlay_weight) {
            return Err(format!(
                "Opacity must be between 0.0 and 1.0, got {}",
                self.overlay_weight
            ));
        }
        if self.outline_thickness == 0 {
            return Err("Outline thickness must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_green_box_at_35_percent() {
        let style = HighlightStyle::default();
        assert_eq!(style.fill, Color::rgb(0, 255, 0));
        assert_eq!(style.outline, Color::rgb(0, 200, 0));
        assert_eq!(style.outline_thickness, 2);
        assert!((style.overlay_weight - 0.35).abs() < f32::EPSILON);
        assert!(style.validate().is_ok());
    }

    #[rstest]
    #[case::negative(-0.1)]
    #[case::above_one(1.5)]
    #[case::nan(f32::NAN)]
    fn test_validate_rejects_weight(#[case] weight: f32) {
        let style = HighlightStyle::default().with_overlay_weight(weight);
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_thickness() {
        let style = HighlightStyle {
            outline_thickness: 0,
            ..HighlightStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let style: HighlightStyle = serde_json::from_str(r#"{"overlay_weight":0.5}"#).unwrap();
        assert_eq!(style.fill, Color::rgb(0, 255, 0));
        assert!((style.overlay_weight - 0.5).abs() < f32::EPSILON);
    }
}
