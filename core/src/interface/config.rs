use crate::math::WindowFunction;
use crate::prelude::{ConfigError, StageConfig};
use serde::{Deserialize, Serialize};

/// Antenna count the pipeline is built for.
pub const REQUIRED_ANTENNA_COUNT: u8 = 1;

/// Sensor acquisition settings, fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfiguration {
    pub antenna_count: u8,
    pub chirps_per_frame: u16,
    pub samples_per_chirp: u16,
    /// ADC sampling rate in Hz.
    pub sampling_rate: u32,
    /// Chirp start frequency in Hz.
    pub start_freq: u64,
    /// Chirp end frequency in Hz.
    pub end_freq: u64,
}

impl Default for RadarConfiguration {
    fn default() -> Self {
        Self {
            antenna_count: 1,
            chirps_per_frame: 32,
            samples_per_chirp: 64,
            sampling_rate: 2_000_000,
            start_freq: 58_000_000_000,
            end_freq: 63_500_000_000,
        }
    }
}

impl RadarConfiguration {
    pub fn stage_config(&self) -> StageConfig {
        StageConfig {
            antenna_count: usize::from(self.antenna_count),
            chirps_per_frame: usize::from(self.chirps_per_frame),
            samples_per_chirp: usize::from(self.samples_per_chirp),
        }
    }

    pub fn samples_per_frame(&self) -> usize {
        self.stage_config().frame_len()
    }

    pub fn range_bins(&self) -> u16 {
        self.samples_per_chirp / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.antenna_count != REQUIRED_ANTENNA_COUNT {
            return Err(ConfigError::UnsupportedAntennaCount {
                found: self.antenna_count,
                required: REQUIRED_ANTENNA_COUNT,
            });
        }
        self.validate_geometry()
    }

    pub(crate) fn validate_geometry(&self) -> Result<(), ConfigError> {
        if self.samples_per_chirp < 4 || self.samples_per_chirp % 2 != 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "samples_per_chirp must be even and at least 4, got {}",
                self.samples_per_chirp
            )));
        }
        if self.chirps_per_frame == 0 {
            return Err(ConfigError::InvalidGeometry(
                "chirps_per_frame must be at least 1".into(),
            ));
        }
        if self.sampling_rate == 0 {
            return Err(ConfigError::InvalidGeometry(
                "sampling_rate must be non-zero".into(),
            ));
        }
        if self.end_freq <= self.start_freq {
            return Err(ConfigError::InvalidGeometry(format!(
                "end_freq {} must exceed start_freq {}",
                self.end_freq, self.start_freq
            )));
        }
        Ok(())
    }
}

/// Detection threshold and the range-bin window to scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParameters {
    /// Doppler magnitude a frame must exceed to raise an event.
    pub threshold: f32,
    /// First scanned bin. `bin_start == bin_end` selects every range bin.
    pub bin_start: u16,
    /// One past the last scanned bin.
    pub bin_end: u16,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            bin_start: 0,
            bin_end: 0,
        }
    }
}

/// Half-open range of bins scanned each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWindow {
    pub start: u16,
    pub end: u16,
}

impl BinWindow {
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn bins(&self) -> std::ops::Range<u16> {
        self.start..self.end
    }
}

impl DetectionParameters {
    /// Resolves the scanned window against `range_bins` valid bins.
    pub fn resolve_window(&self, range_bins: u16) -> Result<BinWindow, ConfigError> {
        if self.bin_start == self.bin_end {
            return Ok(BinWindow {
                start: 0,
                end: range_bins,
            });
        }
        if self.bin_start > self.bin_end {
            return Err(ConfigError::InvalidBinWindow {
                start: self.bin_start,
                end: self.bin_end,
            });
        }
        if self.bin_end > range_bins {
            return Err(ConfigError::BinWindowOutOfRange {
                start: self.bin_start,
                end: self.bin_end,
                bins: usize::from(range_bins),
            });
        }
        Ok(BinWindow {
            start: self.bin_start,
            end: self.bin_end,
        })
    }
}

/// Processing switches of both transform stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub range_mean_removal: bool,
    pub range_window: Option<WindowFunction>,
    pub doppler_mean_removal: bool,
    pub doppler_window: Option<WindowFunction>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            range_mean_removal: true,
            range_window: Some(WindowFunction::BlackmanHarris),
            doppler_mean_removal: true,
            doppler_window: None,
        }
    }
}
