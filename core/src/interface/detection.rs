use serde::{Deserialize, Serialize};

/// Presence event raised when a frame's strongest Doppler magnitude exceeds
/// the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub magnitude: f32,
    pub bin: u16,
    /// Always 0.0: no angle estimation runs on a single antenna.
    pub angle: f32,
    pub distance_m: f32,
}

/// Receiver of presence events.
pub trait DetectionListener: Send {
    fn on_presence(&mut self, magnitude: f32, bin: u16, angle: f32);
}

impl<F> DetectionListener for F
where
    F: FnMut(f32, u16, f32) + Send,
{
    fn on_presence(&mut self, magnitude: f32, bin: u16, angle: f32) {
        self(magnitude, bin, angle)
    }
}
