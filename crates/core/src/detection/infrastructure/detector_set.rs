use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::shared::constants::{
    EYE_CASCADE_NAME, EYE_CASCADE_URL, FACE_CASCADE_NAME, FACE_CASCADE_URL,
};
use crate::shared::model_resolver::{self, ProgressFn};

use super::cascade_detector::CascadeDetector;
use super::haar_cascade::{CascadeError, HaarCascade};

/// The face and eye detectors used by the annotator.
///
/// Built once by the host and shared read-only across frames.
pub struct DetectorSet {
    face: Box<dyn ObjectDetector>,
    eye: Box<dyn ObjectDetector>,
}

impl DetectorSet {
    pub fn new(face: Box<dyn ObjectDetector>, eye: Box<dyn ObjectDetector>) -> Self {
        Self { face, eye }
    }

    pub fn from_cascades(
        face: Arc<HaarCascade>,
        face_params: DetectionParams,
        eye: Arc<HaarCascade>,
        eye_params: DetectionParams,
    ) -> Self {
        Self::new(
            Box::new(CascadeDetector::new(face, face_params)),
            Box::new(CascadeDetector::new(eye, eye_params)),
        )
    }

    /// Loads both cascades from explicit XML files.
    pub fn load(
        face_path: &Path,
        eye_path: &Path,
        face_params: DetectionParams,
        eye_params: DetectionParams,
    ) -> Result<Self, CascadeError> {
        let face = Arc::new(HaarCascade::load(face_path)?);
        let eye = Arc::new(HaarCascade::load(eye_path)?);
        Ok(Self::from_cascades(face, face_params, eye, eye_params))
    }

    /// Locates the stock cascades (cache, then `bundled_dir`, then download)
    /// and loads them.
    pub fn resolve(
        bundled_dir: Option<&Path>,
        face_params: DetectionParams,
        eye_params: DetectionParams,
        progress: Option<ProgressFn>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let face_path =
            model_resolver::resolve(FACE_CASCADE_NAME, FACE_CASCADE_URL, bundled_dir, progress)?;
        let eye_path =
            model_resolver::resolve(EYE_CASCADE_NAME, EYE_CASCADE_URL, bundled_dir, None)?;
        Ok(Self::load(&face_path, &eye_path, face_params, eye_params)?)
    }

    pub fn face(&self) -> &dyn ObjectDetector {
        self.face.as_ref()
    }

    pub fn eye(&self) -> &dyn ObjectDetector {
        self.eye.as_ref()
    }
}
