use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Tapering applied to a sample vector before a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    Rectangular,
    Hann,
    BlackmanHarris,
}

const BLACKMAN_HARRIS: [f32; 4] = [0.35875, 0.48829, 0.14128, 0.01168];

impl WindowFunction {
    /// Fills `coefficients` with the symmetric window of that length.
    pub fn fill(&self, coefficients: &mut [f32]) {
        let len = coefficients.len();
        if len == 1 {
            coefficients[0] = 1.0;
            return;
        }
        let span = (len - 1) as f32;
        for (n, coefficient) in coefficients.iter_mut().enumerate() {
            let phase = 2.0 * PI * n as f32 / span;
            *coefficient = match self {
                WindowFunction::Rectangular => 1.0,
                WindowFunction::Hann => 0.5 * (1.0 - phase.cos()),
                WindowFunction::BlackmanHarris => {
                    let [a0, a1, a2, a3] = BLACKMAN_HARRIS;
                    a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos() - a3 * (3.0 * phase).cos()
                }
            };
        }
    }

    pub fn coefficients(&self, len: usize) -> Vec<f32> {
        let mut coefficients = vec![0.0; len];
        self.fill(&mut coefficients);
        coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blackman_harris_is_symmetric_and_tapered() {
        let window = WindowFunction::BlackmanHarris.coefficients(64);
        assert!((window[0] - 6.0e-5).abs() < 1e-5);
        for n in 0..32 {
            assert!((window[n] - window[63 - n]).abs() < 1e-5);
        }
        assert!(window[31] > 0.99);
    }

    #[test]
    fn hann_endpoints_are_zero() {
        let window = WindowFunction::Hann.coefficients(16);
        assert!(window[0].abs() < 1e-6);
        assert!(window[15].abs() < 1e-6);
    }
}
