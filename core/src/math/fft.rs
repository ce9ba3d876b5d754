use crate::prelude::{StageError, StageResult};
use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Forward transform planned once for a fixed length.
///
/// The plan owns its work and scratch space, so `forward_*` never allocate.
pub struct FftPlan {
    fft: Arc<dyn Fft<f32>>,
    work: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl FftPlan {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex32::zero(); fft.get_inplace_scratch_len()];
        let work = vec![Complex32::zero(); size];
        Self { fft, work, scratch }
    }

    pub fn len(&self) -> usize {
        self.work.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work.is_empty()
    }

    /// Real-input transform. Writes the first `output.len()` bins, which must
    /// not exceed the plan length.
    pub fn forward_real(&mut self, input: &[f32], output: &mut [Complex32]) -> StageResult<()> {
        if input.len() != self.len() || output.len() > self.len() {
            return Err(StageError::InvalidInput(format!(
                "real transform of length {} given {} inputs and {} outputs",
                self.len(),
                input.len(),
                output.len()
            )));
        }

        for (slot, &value) in self.work.iter_mut().zip(input) {
            *slot = Complex32::new(value, 0.0);
        }
        self.fft.process_with_scratch(&mut self.work, &mut self.scratch);
        output.copy_from_slice(&self.work[..output.len()]);
        Ok(())
    }

    /// Complex transform computed in place.
    pub fn forward_complex(&mut self, data: &mut [Complex32]) -> StageResult<()> {
        if data.len() != self.len() {
            return Err(StageError::InvalidInput(format!(
                "complex transform of length {} given {} values",
                self.len(),
                data.len()
            )));
        }
        self.fft.process_with_scratch(data, &mut self.scratch);
        Ok(())
    }
}
