pub mod config;
pub mod detection;

pub use config::{
    BinWindow, DetectionParameters, PipelineOptions, RadarConfiguration, REQUIRED_ANTENNA_COUNT,
};
pub use detection::{Detection, DetectionListener};
