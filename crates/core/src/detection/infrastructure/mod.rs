pub mod cascade_detector;
pub mod detector_set;
pub mod haar_cascade;
pub mod integral_image;
pub mod math;
pub mod rect_grouper;
