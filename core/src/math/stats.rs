use num_complex::Complex32;

/// Strongest sample of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub magnitude: f32,
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    pub fn mean(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    /// Subtracts the arithmetic mean from every sample.
    pub fn remove_mean(samples: &mut [f32]) {
        let mean = Self::mean(samples);
        for sample in samples.iter_mut() {
            *sample -= mean;
        }
    }

    /// Subtracts the complex mean from every value.
    pub fn remove_complex_mean(values: &mut [Complex32]) {
        if values.is_empty() {
            return;
        }
        let sum: Complex32 = values.iter().sum();
        let mean = sum / values.len() as f32;
        for value in values.iter_mut() {
            *value -= mean;
        }
    }

    pub fn magnitude(value: Complex32) -> f32 {
        (value.re * value.re + value.im * value.im).sqrt()
    }

    /// Largest magnitude in `values`. Only a strictly greater magnitude moves
    /// the peak, so ties go to the earliest index. An all-zero or empty input
    /// yields index 0 with magnitude 0.
    pub fn peak_magnitude(values: &[Complex32]) -> Peak {
        let mut peak = Peak {
            index: 0,
            magnitude: 0.0,
        };
        for (index, &value) in values.iter().enumerate() {
            let magnitude = Self::magnitude(value);
            if magnitude > peak.magnitude {
                peak = Peak { index, magnitude };
            }
        }
        peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn remove_mean_centers_samples() {
        let mut samples = [1.0, 2.0, 3.0, 6.0];
        StatsHelper::remove_mean(&mut samples);
        assert_eq!(samples, [-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn remove_complex_mean_clears_constant_vector() {
        let mut values = [Complex32::new(0.5, -0.25); 8];
        StatsHelper::remove_complex_mean(&mut values);
        assert!(values.iter().all(|v| v.norm() < 1e-7));
    }

    #[test]
    fn peak_prefers_earliest_index_on_ties() {
        let values = [
            Complex32::new(0.0, 1.0),
            Complex32::new(3.0, 4.0),
            Complex32::new(-4.0, 3.0),
            Complex32::new(1.0, 0.0),
        ];
        let peak = StatsHelper::peak_magnitude(&values);
        assert_eq!(peak.index, 1);
        assert!((peak.magnitude - 5.0).abs() < 1e-6);
    }

    #[test]
    fn peak_of_silence_is_zero() {
        let peak = StatsHelper::peak_magnitude(&[Complex32::new(0.0, 0.0); 4]);
        assert_eq!(peak, Peak { index: 0, magnitude: 0.0 });
    }
}
