use serde::{Deserialize, Serialize};

/// Multi-scale search settings for one cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Ratio between successive search scales; must be > 1.
    pub scale_factor: f64,
    /// Raw hits a cluster needs (strictly more than this) to be reported.
    pub min_neighbors: u32,
    /// Smallest window `(width, height)`; the cascade window if `None`.
    #[serde(default)]
    pub min_size: Option<(u32, u32)>,
    /// Largest window `(width, height)`; the image size if `None`.
    #[serde(default)]
    pub max_size: Option<(u32, u32)>,
}

impl DetectionParams {
    pub const fn new(scale_factor: f64, min_neighbors: u32) -> Self {
        Self {
            scale_factor,
            min_neighbors,
            min_size: None,
            max_size: None,
        }
    }

    pub const fn face() -> Self {
        Self::new(1.2, 5)
    }

    pub const fn eye() -> Self {
        Self::new(1.1, 6)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(format!(
                "Scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min.0 > max.0 || min.1 > max.1 {
                return Err(format!("Minimum size {min:?} exceeds maximum size {max:?}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_face_and_eye_defaults() {
        assert_eq!(DetectionParams::face(), DetectionParams::new(1.2, 5));
        assert_eq!(DetectionParams::eye(), DetectionParams::new(1.1, 6));
    }

    #[rstest]
    #[case::one(1.0)]
    #[case::below_one(0.9)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn test_validate_rejects_bad_scale(#[case] scale: f64) {
        assert!(DetectionParams::new(scale, 3).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_sizes() {
        let params = DetectionParams {
            min_size: Some((50, 50)),
            max_size: Some((40, 60)),
            ..DetectionParams::face()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_deserialize_without_sizes() {
        let params: DetectionParams =
            serde_json::from_str(r#"{"scale_factor":1.3,"min_neighbors":4}"#).unwrap();
        assert_eq!(params, DetectionParams::new(1.3, 4));
    }
}
