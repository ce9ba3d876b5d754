pub mod fft;
pub mod stats;
pub mod window;

pub use fft::FftPlan;
pub use stats::{Peak, StatsHelper};
pub use window::WindowFunction;
