pub mod compositing;
pub mod eye_highlighter;
