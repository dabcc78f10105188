pub mod court_canvas;
pub mod file_row;
