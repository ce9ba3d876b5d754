use crate::acquisition::signal::FrameReadySignal;
use crate::acquisition::unpack::{packed_len, unpack_12bit};
use crate::acquisition::{AcquisitionError, RadarSensor};
use crate::telemetry::log::LogManager;
use std::sync::Arc;

/// Drains the sensor FIFO into unpacked 16-bit frames.
///
/// A failed FIFO read drops the frame and restarts frame generation on the
/// sensor (stop, then start) before the next poll.
pub struct AcquisitionAdapter<S> {
    sensor: S,
    signal: Arc<FrameReadySignal>,
    packed: Vec<u8>,
    sample_count: usize,
    restarts: usize,
    logger: LogManager,
}

impl<S: RadarSensor> AcquisitionAdapter<S> {
    pub fn new(sensor: S, signal: Arc<FrameReadySignal>, sample_count: usize) -> Self {
        Self {
            sensor,
            signal,
            packed: vec![0; packed_len(sample_count)],
            sample_count,
            restarts: 0,
            logger: LogManager::new("acquisition"),
        }
    }

    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        self.sensor
            .start_frame(true)
            .map_err(|err| AcquisitionError::Restart(err.to_string()))?;
        self.logger.record(&format!(
            "frame generation started, {} samples per frame",
            self.sample_count
        ));
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), AcquisitionError> {
        self.sensor
            .start_frame(false)
            .map_err(|err| AcquisitionError::Restart(err.to_string()))
    }

    /// Polls and clears the frame-ready flag.
    pub fn is_data_available(&self) -> bool {
        self.signal.take()
    }

    pub fn signal(&self) -> &Arc<FrameReadySignal> {
        &self.signal
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn restarts(&self) -> usize {
        self.restarts
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Reads one frame from the FIFO and unpacks it into `out`.
    pub fn read_frame(&mut self, out: &mut [u16]) -> Result<(), AcquisitionError> {
        if out.len() != self.sample_count {
            return Err(AcquisitionError::FrameLength {
                expected: self.sample_count,
                actual: out.len(),
            });
        }

        if let Err(err) = self.sensor.read_fifo(&mut self.packed) {
            self.logger
                .warn(&format!("FIFO read failed ({}), restarting frame generation", err));
            let restarted = self.restart();
            return Err(AcquisitionError::FifoRead {
                reason: err.to_string(),
                restarted,
            });
        }

        unpack_12bit(&self.packed, out)
    }

    fn restart(&mut self) -> bool {
        let stopped = self.sensor.start_frame(false);
        let started = self.sensor.start_frame(true);
        match (stopped, started) {
            (Ok(()), Ok(())) => {
                self.restarts += 1;
                true
            }
            (Err(err), _) | (_, Err(err)) => {
                self.logger
                    .warn(&format!("restarting frame generation failed: {}", err));
                false
            }
        }
    }
}
