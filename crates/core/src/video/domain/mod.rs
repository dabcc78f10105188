pub mod frame_reader;
pub mod frame_writer;
pub mod image_writer;
