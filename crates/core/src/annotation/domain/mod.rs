pub mod frame_processor;
pub mod highlight_style;
pub mod stream_constraints;
