//! Pluggable memory strategy for the pipeline buffers.
//!
//! Every numeric buffer the pipeline uses is requested once at configure time
//! through a [`BufferAllocator`] and handed back once at teardown through the
//! paired [`BufferDeallocator`]. The strategy decides where the memory comes
//! from and may refuse a request, which aborts setup.

use crate::prelude::ConfigError;
use num_complex::Complex32;

/// Which pipeline buffer a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Unpacked 16-bit samples of one frame.
    Frame,
    /// Scaled time-domain samples of one chirp.
    AdcSamples,
    /// Range window coefficients.
    Window,
    /// Range spectrum of the whole frame.
    RangeSpectrum,
    /// Doppler spectrum of a single range bin.
    DopplerSpectrum,
    /// Optional Doppler window coefficients.
    DopplerWindow,
}

impl BufferKind {
    pub fn element(&self) -> ElementType {
        match self {
            BufferKind::Frame => ElementType::Sample,
            BufferKind::AdcSamples | BufferKind::Window | BufferKind::DopplerWindow => {
                ElementType::Real
            }
            BufferKind::RangeSpectrum | BufferKind::DopplerSpectrum => ElementType::Complex,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BufferKind::Frame => "frame",
            BufferKind::AdcSamples => "adc samples",
            BufferKind::Window => "window",
            BufferKind::RangeSpectrum => "range spectrum",
            BufferKind::DopplerSpectrum => "doppler spectrum",
            BufferKind::DopplerWindow => "doppler window",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Sample,
    Real,
    Complex,
}

impl ElementType {
    pub fn size(&self) -> usize {
        match self {
            ElementType::Sample => std::mem::size_of::<u16>(),
            ElementType::Real => std::mem::size_of::<f32>(),
            ElementType::Complex => std::mem::size_of::<Complex32>(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequest {
    pub kind: BufferKind,
    pub len: usize,
}

impl BufferRequest {
    pub fn new(kind: BufferKind, len: usize) -> Self {
        Self { kind, len }
    }

    pub fn bytes(&self) -> usize {
        self.len * self.kind.element().size()
    }
}

/// A buffer owned by the pipeline between configure and teardown.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineBuffer {
    Samples(Vec<u16>),
    Real(Vec<f32>),
    Complex(Vec<Complex32>),
}

impl PipelineBuffer {
    /// Zero-filled buffer of the element type `request` asks for.
    pub fn zeroed(request: BufferRequest) -> Self {
        match request.kind.element() {
            ElementType::Sample => PipelineBuffer::Samples(vec![0; request.len]),
            ElementType::Real => PipelineBuffer::Real(vec![0.0; request.len]),
            ElementType::Complex => {
                PipelineBuffer::Complex(vec![Complex32::new(0.0, 0.0); request.len])
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PipelineBuffer::Samples(values) => values.len(),
            PipelineBuffer::Real(values) => values.len(),
            PipelineBuffer::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element(&self) -> ElementType {
        match self {
            PipelineBuffer::Samples(_) => ElementType::Sample,
            PipelineBuffer::Real(_) => ElementType::Real,
            PipelineBuffer::Complex(_) => ElementType::Complex,
        }
    }

    pub fn bytes(&self) -> usize {
        self.len() * self.element().size()
    }
}

/// Allocation half of the memory strategy.
pub trait BufferAllocator: Send {
    /// Returns a buffer of `request.len` elements, or `None` when out of memory.
    fn allocate(&mut self, request: BufferRequest) -> Option<PipelineBuffer>;
}

/// Release half of the memory strategy.
pub trait BufferDeallocator: Send {
    fn release(&mut self, kind: BufferKind, buffer: PipelineBuffer);
}

fn checked(
    allocator: &mut dyn BufferAllocator,
    kind: BufferKind,
    len: usize,
) -> Result<PipelineBuffer, ConfigError> {
    let request = BufferRequest::new(kind, len);
    match allocator.allocate(request) {
        Some(buffer) if buffer.len() == len && buffer.element() == kind.element() => Ok(buffer),
        _ => Err(ConfigError::AllocationFailed { kind }),
    }
}

pub fn allocate_samples(
    allocator: &mut dyn BufferAllocator,
    kind: BufferKind,
    len: usize,
) -> Result<Vec<u16>, ConfigError> {
    match checked(allocator, kind, len)? {
        PipelineBuffer::Samples(values) => Ok(values),
        _ => Err(ConfigError::AllocationFailed { kind }),
    }
}

pub fn allocate_real(
    allocator: &mut dyn BufferAllocator,
    kind: BufferKind,
    len: usize,
) -> Result<Vec<f32>, ConfigError> {
    match checked(allocator, kind, len)? {
        PipelineBuffer::Real(values) => Ok(values),
        _ => Err(ConfigError::AllocationFailed { kind }),
    }
}

pub fn allocate_complex(
    allocator: &mut dyn BufferAllocator,
    kind: BufferKind,
    len: usize,
) -> Result<Vec<Complex32>, ConfigError> {
    match checked(allocator, kind, len)? {
        PipelineBuffer::Complex(values) => Ok(values),
        _ => Err(ConfigError::AllocationFailed { kind }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl BufferAllocator for Refusing {
        fn allocate(&mut self, _request: BufferRequest) -> Option<PipelineBuffer> {
            None
        }
    }

    struct WrongType;

    impl BufferAllocator for WrongType {
        fn allocate(&mut self, request: BufferRequest) -> Option<PipelineBuffer> {
            Some(PipelineBuffer::Samples(vec![0; request.len]))
        }
    }

    #[test]
    fn request_size_follows_element_type() {
        assert_eq!(BufferRequest::new(BufferKind::Frame, 10).bytes(), 20);
        assert_eq!(BufferRequest::new(BufferKind::Window, 10).bytes(), 40);
        assert_eq!(BufferRequest::new(BufferKind::RangeSpectrum, 10).bytes(), 80);
    }

    #[test]
    fn refused_allocation_names_the_buffer() {
        let err = allocate_real(&mut Refusing, BufferKind::Window, 64).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AllocationFailed {
                kind: BufferKind::Window
            }
        );
    }

    #[test]
    fn mismatched_buffer_type_is_an_allocation_failure() {
        let err = allocate_complex(&mut WrongType, BufferKind::RangeSpectrum, 8).unwrap_err();
        assert_eq!(err.code(), -6);
    }
}
