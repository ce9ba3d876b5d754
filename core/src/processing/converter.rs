use crate::interface::RadarConfiguration;

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Linear FMCW range equation for a fixed radar configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeConverter {
    bandwidth: f64,
    samples_per_chirp: f64,
    sampling_rate: f64,
}

impl RangeConverter {
    pub fn new(config: &RadarConfiguration) -> Self {
        Self {
            bandwidth: config.end_freq as f64 - config.start_freq as f64,
            samples_per_chirp: f64::from(config.samples_per_chirp),
            sampling_rate: f64::from(config.sampling_rate),
        }
    }

    /// Chirp slope in Hz per second.
    pub fn slope(&self) -> f64 {
        self.bandwidth / (self.samples_per_chirp / self.sampling_rate)
    }

    /// Denominator of the bin to beat-frequency fraction, `(fft_len - 1) * 2`.
    fn bin_span(&self) -> f64 {
        let fft_len = (self.samples_per_chirp / 2.0).floor();
        (fft_len - 1.0) * 2.0
    }

    pub fn bin_to_meters(&self, bin: u16) -> f32 {
        let fraction = f64::from(bin) / self.bin_span();
        let beat_freq = fraction * self.sampling_rate;
        ((SPEED_OF_LIGHT * beat_freq) / (2.0 * self.slope())) as f32
    }

    /// Inverse of [`bin_to_meters`](Self::bin_to_meters), as a fractional bin.
    pub fn meters_to_bin(&self, meters: f32) -> f32 {
        let beat_freq = f64::from(meters) * 2.0 * self.slope() / SPEED_OF_LIGHT;
        (beat_freq / self.sampling_rate * self.bin_span()) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_zero_is_at_origin() {
        let converter = RangeConverter::new(&RadarConfiguration::default());
        assert_eq!(converter.bin_to_meters(0), 0.0);
    }

    #[test]
    fn distance_grows_with_bin() {
        let converter = RangeConverter::new(&RadarConfiguration::default());
        let distances: Vec<f32> = (0..32).map(|bin| converter.bin_to_meters(bin)).collect();
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn follows_reference_denominator() {
        // 5.5 GHz over 32 us, bin 31 of 32 -> fraction 31/62.
        let converter = RangeConverter::new(&RadarConfiguration::default());
        let expected = SPEED_OF_LIGHT * 0.5 * 2.0e6 / (2.0 * 5.5e9 / 32.0e-6);
        assert!((f64::from(converter.bin_to_meters(31)) - expected).abs() < 1e-6);
    }

    #[test]
    fn meters_round_trip_to_bin() {
        let converter = RangeConverter::new(&RadarConfiguration::default());
        let meters = converter.bin_to_meters(12);
        assert!((converter.meters_to_bin(meters) - 12.0).abs() < 1e-3);
    }
}
