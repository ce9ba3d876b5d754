//! Signal-processing core for FMCW radar presence detection.
//!
//! Raw interleaved ADC frames are turned into a range spectrum per chirp, a
//! Doppler spectrum per candidate range bin, and finally a presence event
//! for the strongest moving reflection inside the configured bin window.

pub mod acquisition;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use interface::{Detection, DetectionListener, DetectionParameters, RadarConfiguration};
pub use prelude::{ConfigError, PipelineError, ProcessingStage, StageConfig};
pub use processing::{BufferPool, PresenceDetector};
