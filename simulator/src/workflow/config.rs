use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use presence_core::interface::PipelineOptions;
use presence_core::{DetectionParameters, RadarConfiguration};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub radar: RadarConfiguration,
    pub detection: DetectionParameters,
    pub options: PipelineOptions,
    pub generator: GeneratorConfig,
    /// Number of frame-ready interrupts the simulated sensor raises.
    pub frames: usize,
    pub frame_interval_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            radar: RadarConfiguration::default(),
            detection: DetectionParameters::default(),
            options: PipelineOptions::default(),
            generator: GeneratorConfig::default(),
            frames: 32,
            frame_interval_ms: 20,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_core::math::WindowFunction;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"radar:\n  samples_per_chirp: 128\n  chirps_per_frame: 16\n\
detection:\n  threshold: 0.5\n  bin_start: 2\n  bin_end: 40\n\
options:\n  doppler_window: hann\n\
generator:\n  noise_codes: 2\n  targets:\n    - range_m: 0.3\n      doppler_bin: 2.0\n\
frames: 4\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();

        assert_eq!(cfg.radar.samples_per_chirp, 128);
        assert_eq!(cfg.radar.antenna_count, 1);
        assert_eq!(cfg.detection.bin_end, 40);
        assert_eq!(cfg.options.doppler_window, Some(WindowFunction::Hann));
        assert_eq!(cfg.options.range_window, Some(WindowFunction::BlackmanHarris));
        assert_eq!(cfg.generator.targets.len(), 1);
        assert_eq!(cfg.generator.targets[0].amplitude, 0.2);
        assert_eq!(cfg.frames, 4);
        assert_eq!(cfg.frame_interval_ms, 20);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = WorkflowConfig::load_or_default("does/not/exist.yaml").unwrap();
        assert_eq!(cfg.frames, 32);
        assert_eq!(cfg.detection.threshold, 0.2);
    }

    #[test]
    fn malformed_yaml_is_reported_with_path() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"frames: [not, a, number]\n").unwrap();
        let err = WorkflowConfig::load(temp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing workflow config"));
    }
}
