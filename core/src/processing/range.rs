use crate::math::{FftPlan, StatsHelper, WindowFunction};
use crate::prelude::{ConfigError, ProcessingStage, StageConfig, StageError, StageResult};
use crate::processing::memory::{
    allocate_complex, allocate_real, BufferAllocator, BufferDeallocator, BufferKind,
    PipelineBuffer,
};
use crate::telemetry::log::LogManager;
use ndarray::{s, Array3, ArrayView3};
use num_complex::Complex32;

/// Divisor mapping 12-bit ADC codes into `[0, 1)`.
pub const ADC_FULL_SCALE: f32 = 4096.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeOptions {
    pub mean_removal: bool,
    pub window: Option<WindowFunction>,
}

/// Range stage: one real transform per (antenna, chirp) of an interleaved
/// frame, keeping the first `samples_per_chirp / 2` bins.
pub struct RangeStage {
    config: StageConfig,
    options: RangeOptions,
    fft: FftPlan,
    adc_samples: Vec<f32>,
    window: Vec<f32>,
    spectrum: Option<Array3<Complex32>>,
    logger: LogManager,
}

impl RangeStage {
    pub fn new(config: StageConfig, options: RangeOptions) -> Self {
        Self {
            config,
            options,
            fft: FftPlan::new(config.samples_per_chirp),
            adc_samples: Vec::new(),
            window: Vec::new(),
            spectrum: None,
            logger: LogManager::new("range"),
        }
    }

    /// Range spectrum of the last computed frame, indexed
    /// `[antenna, chirp, range_bin]`.
    pub fn spectrum(&self) -> StageResult<ArrayView3<'_, Complex32>> {
        self.spectrum
            .as_ref()
            .map(|spectrum| spectrum.view())
            .ok_or(StageError::NotInitialized("range"))
    }

    /// Transforms every chirp of `frame` into the range spectrum.
    ///
    /// `frame` uses the raw acquisition layout:
    /// `index = chirp * antennas * samples + sample * antennas + antenna`.
    pub fn compute(&mut self, frame: &[u16]) -> StageResult<()> {
        let spectrum = self
            .spectrum
            .as_mut()
            .ok_or(StageError::NotInitialized("range"))?;

        let expected = self.config.frame_len();
        if frame.len() != expected {
            return Err(StageError::InvalidInput(format!(
                "frame holds {} samples, expected {}",
                frame.len(),
                expected
            )));
        }

        let antennas = self.config.antenna_count;
        let samples = self.config.samples_per_chirp;

        for antenna in 0..antennas {
            for chirp in 0..self.config.chirps_per_frame {
                let start = chirp * antennas * samples;
                for (sample, slot) in self.adc_samples.iter_mut().enumerate() {
                    *slot = f32::from(frame[start + sample * antennas + antenna]) / ADC_FULL_SCALE;
                }

                if self.options.mean_removal {
                    StatsHelper::remove_mean(&mut self.adc_samples);
                }
                if !self.window.is_empty() {
                    for (value, &coefficient) in self.adc_samples.iter_mut().zip(&self.window) {
                        *value *= coefficient;
                    }
                }

                let mut row = spectrum.slice_mut(s![antenna, chirp, ..]);
                let bins = row.as_slice_mut().ok_or_else(|| {
                    StageError::InvalidInput("range spectrum row is not contiguous".into())
                })?;
                self.fft.forward_real(&self.adc_samples, bins)?;
                // Bin 0 of a real transform carries DC only.
                bins[0].im = 0.0;
            }
        }

        self.logger.detail(&format!(
            "transformed {} chirps x {} antennas",
            self.config.chirps_per_frame, antennas
        ));
        Ok(())
    }
}

impl ProcessingStage for RangeStage {
    fn initialize(&mut self, allocator: &mut dyn BufferAllocator) -> Result<(), ConfigError> {
        let samples = self.config.samples_per_chirp;
        self.adc_samples = allocate_real(allocator, BufferKind::AdcSamples, samples)?;

        let spectrum = allocate_complex(
            allocator,
            BufferKind::RangeSpectrum,
            self.config.range_spectrum_len(),
        )?;
        let shape = (
            self.config.antenna_count,
            self.config.chirps_per_frame,
            self.config.range_bins(),
        );
        self.spectrum = Some(Array3::from_shape_vec(shape, spectrum).map_err(|_| {
            ConfigError::AllocationFailed {
                kind: BufferKind::RangeSpectrum,
            }
        })?);

        if let Some(function) = self.options.window {
            self.window = allocate_real(allocator, BufferKind::Window, samples)?;
            function.fill(&mut self.window);
        }
        Ok(())
    }

    fn cleanup(&mut self, deallocator: &mut dyn BufferDeallocator) {
        let adc_samples = std::mem::take(&mut self.adc_samples);
        if !adc_samples.is_empty() {
            deallocator.release(BufferKind::AdcSamples, PipelineBuffer::Real(adc_samples));
        }
        if let Some(spectrum) = self.spectrum.take() {
            deallocator.release(
                BufferKind::RangeSpectrum,
                PipelineBuffer::Complex(spectrum.into_raw_vec()),
            );
        }
        let window = std::mem::take(&mut self.window);
        if !window.is_empty() {
            deallocator.release(BufferKind::Window, PipelineBuffer::Real(window));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::buffer_pool::BufferPool;
    use std::f32::consts::PI;

    fn config(antennas: usize) -> StageConfig {
        StageConfig {
            antenna_count: antennas,
            chirps_per_frame: 4,
            samples_per_chirp: 64,
        }
    }

    fn reference_options() -> RangeOptions {
        RangeOptions {
            mean_removal: true,
            window: Some(WindowFunction::BlackmanHarris),
        }
    }

    fn tone_frame(config: StageConfig, bin: f32) -> Vec<u16> {
        let mut frame = vec![0u16; config.frame_len()];
        for chirp in 0..config.chirps_per_frame {
            for sample in 0..config.samples_per_chirp {
                let phase = 2.0 * PI * bin * sample as f32 / config.samples_per_chirp as f32;
                let value = 2048.0 + 1000.0 * phase.cos();
                for antenna in 0..config.antenna_count {
                    let index = chirp * config.antenna_count * config.samples_per_chirp
                        + sample * config.antenna_count
                        + antenna;
                    frame[index] = value.round() as u16;
                }
            }
        }
        frame
    }

    #[test]
    fn compute_before_initialize_is_rejected() {
        let mut stage = RangeStage::new(config(1), reference_options());
        let frame = vec![0u16; config(1).frame_len()];
        assert_eq!(
            stage.compute(&frame),
            Err(StageError::NotInitialized("range"))
        );
    }

    #[test]
    fn tone_peaks_at_its_range_bin() {
        let mut pool = BufferPool::unbounded();
        let mut stage = RangeStage::new(config(1), reference_options());
        stage.initialize(&mut pool).unwrap();
        stage.compute(&tone_frame(config(1), 10.0)).unwrap();

        let spectrum = stage.spectrum().unwrap();
        assert_eq!(spectrum.dim(), (1, 4, 32));
        for chirp in 0..4 {
            let row: Vec<Complex32> = spectrum.slice(s![0, chirp, ..]).to_vec();
            let peak = StatsHelper::peak_magnitude(&row);
            assert_eq!(peak.index, 10);
            assert_eq!(row[0].im, 0.0);
        }
        stage.cleanup(&mut pool);
        assert_eq!(pool.stats().in_use_bytes, 0);
    }

    #[test]
    fn constant_chirp_with_mean_removal_is_flat() {
        let mut pool = BufferPool::unbounded();
        let mut stage = RangeStage::new(config(1), reference_options());
        stage.initialize(&mut pool).unwrap();
        stage.compute(&vec![1234u16; config(1).frame_len()]).unwrap();

        let spectrum = stage.spectrum().unwrap();
        assert!(spectrum.iter().all(|value| value.norm() < 1e-5));
    }

    #[test]
    fn interleaved_antennas_are_separated() {
        let config = config(2);
        let mut frame = tone_frame(config, 6.0);
        // Silence antenna 1.
        for chirp in 0..config.chirps_per_frame {
            for sample in 0..config.samples_per_chirp {
                frame[chirp * 2 * config.samples_per_chirp + sample * 2 + 1] = 2048;
            }
        }

        let mut pool = BufferPool::unbounded();
        let mut stage = RangeStage::new(config, reference_options());
        stage.initialize(&mut pool).unwrap();
        stage.compute(&frame).unwrap();

        let spectrum = stage.spectrum().unwrap();
        let loud: Vec<Complex32> = spectrum.slice(s![0, 2, ..]).to_vec();
        assert_eq!(StatsHelper::peak_magnitude(&loud).index, 6);
        assert!(spectrum.slice(s![1, .., ..]).iter().all(|v| v.norm() < 1e-5));
    }

    #[test]
    fn wrong_frame_length_is_rejected() {
        let mut pool = BufferPool::unbounded();
        let mut stage = RangeStage::new(config(1), reference_options());
        stage.initialize(&mut pool).unwrap();
        assert!(matches!(
            stage.compute(&[0u16; 10]),
            Err(StageError::InvalidInput(_))
        ));
    }
}
