//! Boundary to the radar sensor: FIFO draining, 12-bit unpacking and the
//! frame-ready notification raised by the sensor interrupt.

pub mod adapter;
pub mod signal;
pub mod unpack;

pub use adapter::AcquisitionAdapter;
pub use signal::FrameReadySignal;
pub use unpack::{pack_12bit, packed_len, unpack_12bit, MAX_SAMPLE};

/// Failure reported by the sensor driver.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SensorError {
    message: String,
}

impl SensorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sensor collaborator behind the acquisition adapter.
pub trait RadarSensor {
    /// Fills `packed` with one frame of 12-bit packed samples.
    fn read_fifo(&mut self, packed: &mut [u8]) -> Result<(), SensorError>;
    /// Starts (`true`) or stops (`false`) frame generation.
    fn start_frame(&mut self, enable: bool) -> Result<(), SensorError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("FIFO read failed: {reason} (frame generation restarted: {restarted})")]
    FifoRead { reason: String, restarted: bool },
    #[error("sensor frame generation control failed: {0}")]
    Restart(String),
    #[error("packed buffer holds {actual} bytes, {needed} needed")]
    PacketTooShort { needed: usize, actual: usize },
    #[error("frame buffer holds {actual} samples, expected {expected}")]
    FrameLength { expected: usize, actual: usize },
}
