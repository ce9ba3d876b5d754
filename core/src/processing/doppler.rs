use crate::math::{FftPlan, StatsHelper, WindowFunction};
use crate::prelude::{ConfigError, ProcessingStage, StageConfig, StageError, StageResult};
use crate::processing::memory::{
    allocate_complex, allocate_real, BufferAllocator, BufferDeallocator, BufferKind,
    PipelineBuffer,
};
use crate::telemetry::log::LogManager;
use ndarray::{s, ArrayView3};
use num_complex::Complex32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopplerOptions {
    pub mean_removal: bool,
    pub window: Option<WindowFunction>,
}

/// Doppler stage: a complex transform across the chirps of one range bin.
///
/// The output buffer holds only the most recently computed bin.
pub struct DopplerStage {
    config: StageConfig,
    options: DopplerOptions,
    fft: FftPlan,
    output: Vec<Complex32>,
    window: Vec<f32>,
    logger: LogManager,
}

impl DopplerStage {
    pub fn new(config: StageConfig, options: DopplerOptions) -> Self {
        Self {
            config,
            options,
            fft: FftPlan::new(config.chirps_per_frame),
            output: Vec::new(),
            window: Vec::new(),
            logger: LogManager::new("doppler"),
        }
    }

    /// Computes the Doppler spectrum of `bin` for `antenna` out of a range
    /// spectrum shaped `[antenna, chirp, range_bin]`.
    pub fn compute_bin(
        &mut self,
        range_spectrum: ArrayView3<'_, Complex32>,
        bin: usize,
        antenna: usize,
    ) -> StageResult<&[Complex32]> {
        if self.output.is_empty() {
            return Err(StageError::NotInitialized("doppler"));
        }

        let (antennas, chirps, bins) = range_spectrum.dim();
        if chirps != self.config.chirps_per_frame {
            return Err(StageError::InvalidInput(format!(
                "range spectrum holds {} chirps, expected {}",
                chirps, self.config.chirps_per_frame
            )));
        }
        if antenna >= antennas || bin >= bins {
            return Err(StageError::InvalidInput(format!(
                "bin {} of antenna {} outside a {}x{} range spectrum",
                bin, antenna, antennas, bins
            )));
        }

        let column = range_spectrum.slice(s![antenna, .., bin]);
        for (slot, &value) in self.output.iter_mut().zip(column.iter()) {
            *slot = value;
        }

        if self.options.mean_removal {
            StatsHelper::remove_complex_mean(&mut self.output);
        }
        if !self.window.is_empty() {
            for (value, &coefficient) in self.output.iter_mut().zip(&self.window) {
                *value *= coefficient;
            }
        }

        self.fft.forward_complex(&mut self.output)?;
        Ok(&self.output)
    }

    /// Doppler spectrum of the last computed bin.
    pub fn output(&self) -> &[Complex32] {
        &self.output
    }
}

impl ProcessingStage for DopplerStage {
    fn initialize(&mut self, allocator: &mut dyn BufferAllocator) -> Result<(), ConfigError> {
        let chirps = self.config.chirps_per_frame;
        self.output = allocate_complex(allocator, BufferKind::DopplerSpectrum, chirps)?;
        if let Some(function) = self.options.window {
            self.window = allocate_real(allocator, BufferKind::DopplerWindow, chirps)?;
            function.fill(&mut self.window);
        }
        self.logger.detail(&format!(
            "planned {}-point transform, window {:?}",
            chirps, self.options.window
        ));
        Ok(())
    }

    fn cleanup(&mut self, deallocator: &mut dyn BufferDeallocator) {
        let output = std::mem::take(&mut self.output);
        if !output.is_empty() {
            deallocator.release(BufferKind::DopplerSpectrum, PipelineBuffer::Complex(output));
        }
        let window = std::mem::take(&mut self.window);
        if !window.is_empty() {
            deallocator.release(BufferKind::DopplerWindow, PipelineBuffer::Real(window));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::buffer_pool::BufferPool;
    use ndarray::Array3;
    use std::f32::consts::PI;

    fn config() -> StageConfig {
        StageConfig {
            antenna_count: 1,
            chirps_per_frame: 16,
            samples_per_chirp: 8,
        }
    }

    fn moving_target(doppler_bin: f32, static_offset: Complex32) -> Array3<Complex32> {
        let cfg = config();
        let chirps = cfg.chirps_per_frame;
        Array3::from_shape_fn((1, chirps, cfg.range_bins()), |(_, chirp, bin)| {
            if bin == 2 {
                let phase = 2.0 * PI * doppler_bin * chirp as f32 / chirps as f32;
                Complex32::from_polar(1.0, phase) + static_offset
            } else {
                static_offset
            }
        })
    }

    fn stage(window: Option<WindowFunction>) -> (DopplerStage, BufferPool) {
        let mut pool = BufferPool::unbounded();
        let mut stage = DopplerStage::new(
            config(),
            DopplerOptions {
                mean_removal: true,
                window,
            },
        );
        stage.initialize(&mut pool).unwrap();
        (stage, pool)
    }

    #[test]
    fn phase_progression_peaks_at_doppler_bin() {
        let (mut stage, mut pool) = stage(None);
        let spectrum = moving_target(5.0, Complex32::new(3.0, -1.0));

        let output = stage.compute_bin(spectrum.view(), 2, 0).unwrap();
        let peak = StatsHelper::peak_magnitude(output);
        assert_eq!(peak.index, 5);
        assert!((peak.magnitude - 16.0).abs() < 1e-3);
        // Static offset is gone from the zero-velocity bin.
        assert!(output[0].norm() < 1e-3);

        stage.cleanup(&mut pool);
        assert_eq!(pool.stats().in_use_bytes, 0);
    }

    #[test]
    fn static_bin_has_no_doppler_energy() {
        let (mut stage, _pool) = stage(None);
        let spectrum = moving_target(5.0, Complex32::new(3.0, -1.0));
        let output = stage.compute_bin(spectrum.view(), 1, 0).unwrap();
        assert!(StatsHelper::peak_magnitude(output).magnitude < 1e-4);
    }

    #[test]
    fn windowed_transform_keeps_peak_position() {
        let (mut stage, _pool) = stage(Some(WindowFunction::Hann));
        let spectrum = moving_target(3.0, Complex32::new(0.0, 0.0));
        let output = stage.compute_bin(spectrum.view(), 2, 0).unwrap();
        assert_eq!(StatsHelper::peak_magnitude(output).index, 3);
    }

    #[test]
    fn out_of_range_bin_is_rejected() {
        let (mut stage, _pool) = stage(None);
        let spectrum = moving_target(1.0, Complex32::new(0.0, 0.0));
        assert!(matches!(
            stage.compute_bin(spectrum.view(), 4, 0),
            Err(StageError::InvalidInput(_))
        ));
        assert!(matches!(
            stage.compute_bin(spectrum.view(), 0, 1),
            Err(StageError::InvalidInput(_))
        ));
    }
}
