use serde::{Deserialize, Serialize};

/// Media the host should request from the capture device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}
