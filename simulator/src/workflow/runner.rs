use crate::generator::profile::FrameGenerator;
use crate::generator::sensor::SimulatedSensor;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::{info, warn};
use presence_core::acquisition::{AcquisitionAdapter, FrameReadySignal};
use presence_core::processing::{PoolStats, RangeConverter};
use presence_core::{BufferPool, Detection, PipelineError, PresenceDetector};
use std::sync::Arc;
use std::time::Duration;

pub struct WorkflowResult {
    pub detections: Vec<Detection>,
    pub frames_processed: usize,
    pub frames_dropped: usize,
    /// Interrupts raised while the previous frame was still pending.
    pub overruns: usize,
    pub sensor_reads: usize,
    pub sensor_faults: usize,
    pub sensor_starts: usize,
    pub pool: PoolStats,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

/// Raises the frame-ready signal `frames` times, one frame interval apart.
async fn interrupt_source(
    signal: Arc<FrameReadySignal>,
    frames: usize,
    interval: Duration,
) -> usize {
    let mut ticker = tokio::time::interval(interval);
    let mut overruns = 0;
    for _ in 0..frames {
        ticker.tick().await;
        if signal.raise() {
            overruns += 1;
        }
    }
    overruns
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let config = &self.config;
        let pool = BufferPool::unbounded();

        let mut detector = PresenceDetector::new();
        detector.set_memory(pool.clone());
        let converter = RangeConverter::new(&config.radar);
        detector.set_listener(move |magnitude: f32, bin: u16, _angle: f32| {
            info!(
                "Presence detected. Mag: {:.1} - Distance: {:.2} m",
                magnitude,
                converter.bin_to_meters(bin)
            );
        });
        detector
            .configure_with(config.radar, config.detection, config.options)
            .context("configuring presence detection")?;

        let signal = Arc::new(FrameReadySignal::new());
        let generator = FrameGenerator::new(config.radar, &config.generator);
        let sensor = SimulatedSensor::new(generator, config.generator.fifo_fault_every);
        let mut adapter = AcquisitionAdapter::new(
            sensor,
            Arc::clone(&signal),
            config.radar.samples_per_frame(),
        );
        adapter.start().context("starting frame generation")?;

        let interval = Duration::from_millis(config.frame_interval_ms.max(1));
        let mut interrupts = tokio::spawn(interrupt_source(
            Arc::clone(&signal),
            config.frames,
            interval,
        ));

        let mut detections = Vec::new();
        let mut overruns = 0;
        let mut source_done = false;
        while !source_done {
            tokio::select! {
                biased;
                _ = signal.wait() => {}
                joined = &mut interrupts => {
                    overruns = joined.context("interrupt source task failed")?;
                    source_done = true;
                    // Last interrupt may have landed right before the source ended.
                    if !signal.take() {
                        break;
                    }
                }
            }

            match detector.process_acquired(&mut adapter) {
                Ok(Some(detection)) => {
                    info!(
                        "{}",
                        serde_json::to_string(&detection).context("serializing detection")?
                    );
                    detections.push(detection);
                }
                Ok(None) => {}
                Err(PipelineError::Acquisition(err)) => warn!("frame dropped: {}", err),
                Err(err) => return Err(err).context("processing frame"),
            }
        }

        adapter.stop().context("stopping frame generation")?;
        let metrics = detector.metrics();
        detector.shutdown();

        let sensor = adapter.sensor();
        Ok(WorkflowResult {
            detections,
            frames_processed: metrics.frames_processed,
            frames_dropped: metrics.frames_dropped,
            overruns,
            sensor_reads: sensor.reads(),
            sensor_faults: sensor.faults(),
            sensor_starts: sensor.starts(),
            pool: pool.stats(),
        })
    }
}
