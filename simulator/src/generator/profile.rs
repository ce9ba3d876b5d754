use presence_core::acquisition::MAX_SAMPLE;
use presence_core::processing::RangeConverter;
use presence_core::RadarConfiguration;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// ADC code of a zero-volt input.
const MID_SCALE: f32 = 2048.0;

/// A reflector placed in the synthetic scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetProfile {
    pub range_m: f32,
    /// Phase advance per chirp, in Doppler bins (0 for a static reflector).
    pub doppler_bin: f32,
    /// Peak amplitude as a fraction of ADC full scale.
    pub amplitude: f32,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            range_m: 0.45,
            doppler_bin: 3.0,
            amplitude: 0.2,
        }
    }
}

/// Configuration for generating synthetic frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub targets: Vec<TargetProfile>,
    /// Uniform noise amplitude in ADC codes.
    pub noise_codes: u16,
    pub seed: u64,
    /// Fail every n-th FIFO read, if set.
    pub fifo_fault_every: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            targets: vec![TargetProfile::default()],
            noise_codes: 4,
            seed: 0,
            fifo_fault_every: None,
        }
    }
}

/// Produces interleaved 12-bit frames of an FMCW scene.
pub struct FrameGenerator {
    radar: RadarConfiguration,
    targets: Vec<(f32, TargetProfile)>,
    noise_codes: f32,
    rng: StdRng,
    frame_index: u64,
}

impl FrameGenerator {
    pub fn new(radar: RadarConfiguration, config: &GeneratorConfig) -> Self {
        let converter = RangeConverter::new(&radar);
        let targets = config
            .targets
            .iter()
            .map(|target| (converter.meters_to_bin(target.range_m), target.clone()))
            .collect();
        Self {
            radar,
            targets,
            noise_codes: f32::from(config.noise_codes),
            rng: StdRng::seed_from_u64(config.seed),
            frame_index: 0,
        }
    }

    pub fn samples_per_frame(&self) -> usize {
        self.radar.samples_per_frame()
    }

    /// Fills `frame` with the next frame in acquisition order. Antennas are
    /// interleaved fastest, then samples, then chirps.
    pub fn fill(&mut self, frame: &mut [u16]) {
        let antennas = usize::from(self.radar.antenna_count);
        let samples = usize::from(self.radar.samples_per_chirp);
        let chirps = usize::from(self.radar.chirps_per_frame);
        let first_chirp = self.frame_index * chirps as u64;

        for (index, slot) in frame.iter_mut().enumerate() {
            let chirp = index / (antennas * samples);
            let sample = (index / antennas) % samples;
            let chirp_clock = (first_chirp + chirp as u64) as f32;

            let mut value = MID_SCALE;
            for (range_bin, target) in &self.targets {
                let range_phase = 2.0 * PI * range_bin * sample as f32 / samples as f32;
                let doppler_phase = 2.0 * PI * target.doppler_bin * chirp_clock / chirps as f32;
                value += target.amplitude
                    * f32::from(MAX_SAMPLE + 1)
                    * (range_phase + doppler_phase).cos();
            }
            if self.noise_codes > 0.0 {
                value += self.rng.gen_range(-self.noise_codes..=self.noise_codes);
            }
            *slot = value.round().clamp(0.0, f32::from(MAX_SAMPLE)) as u16;
        }
        self.frame_index += 1;
    }
}
