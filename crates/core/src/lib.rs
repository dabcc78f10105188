pub mod annotation;
pub mod detection;
pub mod pipeline;
pub mod pong;
pub mod shared;
pub mod video;
