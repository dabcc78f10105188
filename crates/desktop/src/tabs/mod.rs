pub mod about_tab;
pub mod eye_tracking_tab;
pub mod pong_tab;
