use crate::acquisition::AcquisitionError;
use crate::processing::memory::{BufferAllocator, BufferDeallocator, BufferKind};
use serde::{Deserialize, Serialize};

/// Frame geometry shared by every processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub antenna_count: usize,
    pub chirps_per_frame: usize,
    pub samples_per_chirp: usize,
}

impl StageConfig {
    /// Number of complex bins kept per chirp by the range transform.
    pub fn range_bins(&self) -> usize {
        self.samples_per_chirp / 2
    }

    /// Number of raw samples in one interleaved frame.
    pub fn frame_len(&self) -> usize {
        self.antenna_count * self.chirps_per_frame * self.samples_per_chirp
    }

    /// Number of complex values in the range spectrum of one frame.
    pub fn range_spectrum_len(&self) -> usize {
        self.antenna_count * self.chirps_per_frame * self.range_bins()
    }
}

/// Setup failures. Each variant maps to a distinct result code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported antenna count {found}, pipeline is built for {required}")]
    UnsupportedAntennaCount { found: u8, required: u8 },
    #[error("no deallocator supplied")]
    MissingDeallocator,
    #[error("no allocator supplied")]
    MissingAllocator,
    #[error("bin_start {start} is greater than bin_end {end}")]
    InvalidBinWindow { start: u16, end: u16 },
    #[error("bin window [{start}, {end}) exceeds the {bins} range bins")]
    BinWindowOutOfRange { start: u16, end: u16, bins: usize },
    #[error("invalid frame geometry: {0}")]
    InvalidGeometry(String),
    #[error("allocation of {} buffer failed", .kind.name())]
    AllocationFailed { kind: BufferKind },
    #[error("pipeline already configured")]
    AlreadyConfigured,
}

impl ConfigError {
    /// Integer result code, negative for every failure.
    pub fn code(&self) -> i32 {
        match self {
            ConfigError::UnsupportedAntennaCount { .. } => -1,
            ConfigError::MissingDeallocator => -2,
            ConfigError::MissingAllocator => -3,
            ConfigError::InvalidBinWindow { .. } => -4,
            ConfigError::AllocationFailed { kind } => match kind {
                BufferKind::AdcSamples => -5,
                BufferKind::RangeSpectrum => -6,
                BufferKind::DopplerSpectrum => -7,
                BufferKind::Window => -8,
                BufferKind::Frame => -9,
                BufferKind::DopplerWindow => -10,
            },
            ConfigError::BinWindowOutOfRange { .. } => -11,
            ConfigError::InvalidGeometry(_) => -12,
            ConfigError::AlreadyConfigured => -13,
        }
    }
}

/// Precondition violations raised by a stage at execution time.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("{0} stage not initialized")]
    NotInitialized(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Errors returned while driving the pipeline with frames.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("pipeline fed before successful configuration")]
    NotConfigured,
    #[error("frame holds {actual} samples, expected {expected}")]
    FrameLength { expected: usize, actual: usize },
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
}

/// Lifecycle shared by the processing stages.
///
/// A stage acquires every buffer it needs in `initialize` and hands each one
/// back in `cleanup`; execution in between only reuses them.
pub trait ProcessingStage {
    fn initialize(&mut self, allocator: &mut dyn BufferAllocator) -> Result<(), ConfigError>;
    fn cleanup(&mut self, deallocator: &mut dyn BufferDeallocator);
}
