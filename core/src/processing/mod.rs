pub mod buffer_pool;
pub mod converter;
pub mod detector;
pub mod doppler;
pub mod memory;
pub mod range;

pub use buffer_pool::{BufferPool, PoolStats};
pub use converter::RangeConverter;
pub use detector::{PresenceDetector, StrongestBin};
pub use doppler::{DopplerOptions, DopplerStage};
pub use memory::{BufferAllocator, BufferDeallocator, BufferKind, BufferRequest, PipelineBuffer};
pub use range::{RangeOptions, RangeStage};
