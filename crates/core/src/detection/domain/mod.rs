pub mod detection_params;
pub mod intensity;
pub mod object_detector;
