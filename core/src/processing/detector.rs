use crate::acquisition::{AcquisitionAdapter, RadarSensor};
use crate::interface::{
    BinWindow, Detection, DetectionListener, DetectionParameters, PipelineOptions,
    RadarConfiguration,
};
use crate::math::StatsHelper;
use crate::prelude::{ConfigError, PipelineError, ProcessingStage, StageResult};
use crate::processing::converter::RangeConverter;
use crate::processing::doppler::{DopplerOptions, DopplerStage};
use crate::processing::memory::{
    allocate_samples, BufferAllocator, BufferDeallocator, BufferKind, PipelineBuffer,
};
use crate::processing::range::{RangeOptions, RangeStage};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use log::error;

/// Angle reported with every detection. A single antenna carries no angle
/// information.
pub const ANGLE_PLACEHOLDER: f32 = 0.0;

/// Antenna the Doppler scan runs on.
const DOPPLER_ANTENNA: usize = 0;

/// Strongest Doppler magnitude seen while scanning a bin window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrongestBin {
    pub bin: u16,
    pub magnitude: f32,
}

impl StrongestBin {
    fn empty(start: u16) -> Self {
        Self {
            bin: start,
            magnitude: 0.0,
        }
    }

    /// Replaces the current maximum only on a strictly greater magnitude, so
    /// the lowest bin wins a tie.
    pub fn offer(&mut self, bin: u16, magnitude: f32) {
        if magnitude > self.magnitude {
            self.bin = bin;
            self.magnitude = magnitude;
        }
    }
}

/// Scans `(bin, magnitude)` pairs in order and keeps the first strict maximum.
pub fn select_strongest<I>(start: u16, candidates: I) -> StrongestBin
where
    I: IntoIterator<Item = (u16, f32)>,
{
    let mut strongest = StrongestBin::empty(start);
    for (bin, magnitude) in candidates {
        strongest.offer(bin, magnitude);
    }
    strongest
}

/// Everything that exists only once configuration succeeded.
struct ConfiguredPipeline {
    threshold: f32,
    window: BinWindow,
    converter: RangeConverter,
    frame: Vec<u16>,
    range: RangeStage,
    doppler: DopplerStage,
}

impl ConfiguredPipeline {
    /// Range transform of the whole frame, then a Doppler transform per bin
    /// of the window on antenna 0.
    fn scan(&mut self, external: Option<&[u16]>) -> StageResult<StrongestBin> {
        let frame = external.unwrap_or(self.frame.as_slice());
        self.range.compute(frame)?;
        let spectrum = self.range.spectrum()?;

        let mut strongest = StrongestBin::empty(self.window.start);
        for bin in self.window.bins() {
            let doppler = self
                .doppler
                .compute_bin(spectrum.view(), usize::from(bin), DOPPLER_ANTENNA)?;
            strongest.offer(bin, StatsHelper::peak_magnitude(doppler).magnitude);
        }
        Ok(strongest)
    }

    fn release(mut self, deallocator: &mut dyn BufferDeallocator) {
        self.range.cleanup(deallocator);
        self.doppler.cleanup(deallocator);
        let frame = std::mem::take(&mut self.frame);
        deallocator.release(BufferKind::Frame, PipelineBuffer::Samples(frame));
    }
}

/// Presence-detection pipeline context.
///
/// Lifecycle: install a memory strategy, optionally a listener, then
/// `configure` once. Every `feed` afterwards runs one full pass over a frame
/// and holds no state across frames.
pub struct PresenceDetector {
    allocator: Option<Box<dyn BufferAllocator>>,
    deallocator: Option<Box<dyn BufferDeallocator>>,
    listener: Option<Box<dyn DetectionListener>>,
    radar: Option<RadarConfiguration>,
    pipeline: Option<ConfiguredPipeline>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl PresenceDetector {
    pub fn new() -> Self {
        Self {
            allocator: None,
            deallocator: None,
            listener: None,
            radar: None,
            pipeline: None,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("presence"),
        }
    }

    pub fn set_allocator<A>(&mut self, allocator: A)
    where
        A: BufferAllocator + 'static,
    {
        self.allocator = Some(Box::new(allocator));
    }

    pub fn set_deallocator<D>(&mut self, deallocator: D)
    where
        D: BufferDeallocator + 'static,
    {
        self.deallocator = Some(Box::new(deallocator));
    }

    /// Installs one strategy as both allocator and deallocator.
    pub fn set_memory<M>(&mut self, memory: M)
    where
        M: BufferAllocator + BufferDeallocator + Clone + 'static,
    {
        self.set_allocator(memory.clone());
        self.set_deallocator(memory);
    }

    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: DetectionListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn is_configured(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Resolved bin window, once configured.
    pub fn bin_window(&self) -> Option<BinWindow> {
        self.pipeline.as_ref().map(|pipeline| pipeline.window)
    }

    pub fn configure(
        &mut self,
        radar: RadarConfiguration,
        params: DetectionParameters,
    ) -> Result<(), ConfigError> {
        self.configure_with(radar, params, PipelineOptions::default())
    }

    /// One-time setup. Validates the configuration and allocates every
    /// pipeline buffer through the installed allocator.
    pub fn configure_with(
        &mut self,
        radar: RadarConfiguration,
        params: DetectionParameters,
        options: PipelineOptions,
    ) -> Result<(), ConfigError> {
        let result = self.try_configure(radar, params, options);
        match &result {
            Ok(()) => self.logger.record(&format!(
                "configured {} chirps x {} samples, bins [{}, {}), threshold {}",
                radar.chirps_per_frame,
                radar.samples_per_chirp,
                self.bin_window().map_or(0, |window| window.start),
                self.bin_window().map_or(0, |window| window.end),
                params.threshold
            )),
            Err(err) => error!("presence detection setup failed ({}): {}", err.code(), err),
        }
        result
    }

    fn try_configure(
        &mut self,
        radar: RadarConfiguration,
        params: DetectionParameters,
        options: PipelineOptions,
    ) -> Result<(), ConfigError> {
        if self.pipeline.is_some() {
            return Err(ConfigError::AlreadyConfigured);
        }
        radar.validate()?;
        let deallocator = self
            .deallocator
            .as_deref_mut()
            .ok_or(ConfigError::MissingDeallocator)?;
        let allocator = self
            .allocator
            .as_deref_mut()
            .ok_or(ConfigError::MissingAllocator)?;
        let window = params.resolve_window(radar.range_bins())?;

        let geometry = radar.stage_config();
        let mut range = RangeStage::new(
            geometry,
            RangeOptions {
                mean_removal: options.range_mean_removal,
                window: options.range_window,
            },
        );
        let mut doppler = DopplerStage::new(
            geometry,
            DopplerOptions {
                mean_removal: options.doppler_mean_removal,
                window: options.doppler_window,
            },
        );

        let frame = allocate_samples(allocator, BufferKind::Frame, geometry.frame_len())?;
        if let Err(err) = range.initialize(allocator) {
            range.cleanup(deallocator);
            deallocator.release(BufferKind::Frame, PipelineBuffer::Samples(frame));
            return Err(err);
        }
        if let Err(err) = doppler.initialize(allocator) {
            doppler.cleanup(deallocator);
            range.cleanup(deallocator);
            deallocator.release(BufferKind::Frame, PipelineBuffer::Samples(frame));
            return Err(err);
        }

        self.radar = Some(radar);
        self.pipeline = Some(ConfiguredPipeline {
            threshold: params.threshold,
            window,
            converter: RangeConverter::new(&radar),
            frame,
            range,
            doppler,
        });
        Ok(())
    }

    /// Runs one pipeline pass over an interleaved frame of
    /// `antenna_count * chirps_per_frame * samples_per_chirp` samples.
    ///
    /// Returns the detection raised for this frame, if any; the listener has
    /// already been notified when it does.
    pub fn feed(&mut self, frame: &[u16]) -> Result<Option<Detection>, PipelineError> {
        let pipeline = self.pipeline.as_ref().ok_or(PipelineError::NotConfigured)?;
        let expected = pipeline.frame.len();
        if frame.len() != expected {
            return Err(PipelineError::FrameLength {
                expected,
                actual: frame.len(),
            });
        }
        self.run(Some(frame))
    }

    /// Reads the pending frame from `adapter` into the pipeline's own frame
    /// buffer and processes it. A failed read drops the frame.
    pub fn process_acquired<S: RadarSensor>(
        &mut self,
        adapter: &mut AcquisitionAdapter<S>,
    ) -> Result<Option<Detection>, PipelineError> {
        let pipeline = self.pipeline.as_mut().ok_or(PipelineError::NotConfigured)?;
        if let Err(err) = adapter.read_frame(&mut pipeline.frame) {
            self.metrics.record_dropped();
            self.logger.warn(&format!("frame dropped: {}", err));
            return Err(err.into());
        }
        self.run(None)
    }

    fn run(&mut self, external: Option<&[u16]>) -> Result<Option<Detection>, PipelineError> {
        let pipeline = self.pipeline.as_mut().ok_or(PipelineError::NotConfigured)?;
        let strongest = pipeline.scan(external)?;
        self.metrics.record_processed();
        self.logger.detail(&format!(
            "strongest magnitude {:.3} at bin {}",
            strongest.magnitude, strongest.bin
        ));

        if strongest.magnitude <= pipeline.threshold {
            return Ok(None);
        }

        let detection = Detection {
            magnitude: strongest.magnitude,
            bin: strongest.bin,
            angle: ANGLE_PLACEHOLDER,
            distance_m: pipeline.converter.bin_to_meters(strongest.bin),
        };
        self.metrics.record_detection();
        self.logger.record(&format!(
            "presence at bin {} ({:.2} m), magnitude {:.3}",
            detection.bin, detection.distance_m, detection.magnitude
        ));
        if let Some(listener) = self.listener.as_mut() {
            listener.on_presence(detection.magnitude, detection.bin, detection.angle);
        }
        Ok(Some(detection))
    }

    /// Distance in meters of range bin `bin` for the configured radar.
    pub fn bin_to_meters(&self, bin: u16) -> Result<f32, PipelineError> {
        self.radar
            .as_ref()
            .map(|radar| RangeConverter::new(radar).bin_to_meters(bin))
            .ok_or(PipelineError::NotConfigured)
    }

    /// Returns every buffer through the deallocator. The detector can be
    /// configured again afterwards.
    pub fn shutdown(&mut self) {
        let Some(pipeline) = self.pipeline.take() else {
            return;
        };
        self.radar = None;
        match self.deallocator.as_deref_mut() {
            Some(deallocator) => {
                pipeline.release(deallocator);
                self.logger.record("pipeline buffers released");
            }
            None => self
                .logger
                .warn("no deallocator installed, pipeline buffers dropped"),
        }
    }
}

impl Default for PresenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PresenceDetector {
    fn drop(&mut self) {
        self.shutdown();
    }
}
