use crate::generator::profile::FrameGenerator;
use presence_core::acquisition::{pack_12bit, RadarSensor, SensorError};

/// Sensor stand-in serving generated frames through a packed FIFO.
pub struct SimulatedSensor {
    generator: FrameGenerator,
    frame: Vec<u16>,
    fault_every: Option<usize>,
    running: bool,
    reads: usize,
    faults: usize,
    starts: usize,
}

impl SimulatedSensor {
    pub fn new(generator: FrameGenerator, fault_every: Option<usize>) -> Self {
        let frame = vec![0; generator.samples_per_frame()];
        Self {
            generator,
            frame,
            fault_every: fault_every.filter(|&every| every > 0),
            running: false,
            reads: 0,
            faults: 0,
            starts: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn faults(&self) -> usize {
        self.faults
    }

    pub fn starts(&self) -> usize {
        self.starts
    }
}

impl RadarSensor for SimulatedSensor {
    fn read_fifo(&mut self, packed: &mut [u8]) -> Result<(), SensorError> {
        if !self.running {
            return Err(SensorError::new("frame generation stopped"));
        }
        self.reads += 1;
        if self
            .fault_every
            .is_some_and(|every| self.reads % every == 0)
        {
            self.faults += 1;
            return Err(SensorError::new("FIFO overflow"));
        }

        self.generator.fill(&mut self.frame);
        pack_12bit(&self.frame, packed).map_err(|err| SensorError::new(err.to_string()))
    }

    fn start_frame(&mut self, enable: bool) -> Result<(), SensorError> {
        if enable && !self.running {
            self.starts += 1;
        }
        self.running = enable;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::GeneratorConfig;
    use presence_core::acquisition::{packed_len, unpack_12bit};
    use presence_core::RadarConfiguration;

    fn sensor(fault_every: Option<usize>) -> SimulatedSensor {
        let generator =
            FrameGenerator::new(RadarConfiguration::default(), &GeneratorConfig::default());
        SimulatedSensor::new(generator, fault_every)
    }

    #[test]
    fn stopped_sensor_refuses_reads() {
        let mut sensor = sensor(None);
        let mut packed = vec![0u8; packed_len(2048)];
        assert!(sensor.read_fifo(&mut packed).is_err());
        sensor.start_frame(true).unwrap();
        assert!(sensor.read_fifo(&mut packed).is_ok());
    }

    #[test]
    fn packed_frame_unpacks_to_generated_samples() {
        let mut sensor = sensor(None);
        sensor.start_frame(true).unwrap();
        let mut packed = vec![0u8; packed_len(2048)];
        sensor.read_fifo(&mut packed).unwrap();

        let mut unpacked = vec![0u16; 2048];
        unpack_12bit(&packed, &mut unpacked).unwrap();
        assert_eq!(unpacked, sensor.frame);
    }

    #[test]
    fn faults_are_injected_periodically() {
        let mut sensor = sensor(Some(3));
        sensor.start_frame(true).unwrap();
        let mut packed = vec![0u8; packed_len(2048)];
        let outcomes: Vec<bool> = (0..6)
            .map(|_| sensor.read_fifo(&mut packed).is_ok())
            .collect();
        assert_eq!(outcomes, vec![true, true, false, true, true, false]);
        assert_eq!(sensor.faults(), 2);
    }
}
