pub mod color;
pub mod constants;
pub mod detection_box;
pub mod frame;
pub mod model_resolver;
pub mod sequence_metadata;
