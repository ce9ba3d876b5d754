use crate::processing::memory::{
    BufferAllocator, BufferDeallocator, BufferKind, BufferRequest, PipelineBuffer,
};
use log::debug;
use std::sync::{Arc, Mutex};

/// Default memory strategy: heap buffers with byte accounting and an optional
/// budget. Clones share the same accounting, so one pool can serve as both
/// the allocator and the deallocator of a pipeline.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<Mutex<PoolState>>,
}

#[derive(Default)]
struct PoolState {
    max_bytes: Option<usize>,
    in_use_bytes: usize,
    peak_bytes: usize,
    allocations: usize,
    releases: usize,
}

/// Point-in-time view of a pool's accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub in_use_bytes: usize,
    pub peak_bytes: usize,
    pub allocations: usize,
    pub releases: usize,
}

impl BufferPool {
    /// Pool refusing any request that would push usage past `max_bytes`.
    pub fn with_capacity(max_bytes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolState {
                max_bytes: Some(max_bytes),
                ..Default::default()
            })),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolState::default())),
        }
    }

    pub fn stats(&self) -> PoolStats {
        if let Ok(state) = self.inner.lock() {
            PoolStats {
                in_use_bytes: state.in_use_bytes,
                peak_bytes: state.peak_bytes,
                allocations: state.allocations,
                releases: state.releases,
            }
        } else {
            PoolStats::default()
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl BufferAllocator for BufferPool {
    fn allocate(&mut self, request: BufferRequest) -> Option<PipelineBuffer> {
        let Ok(mut state) = self.inner.lock() else {
            return None;
        };

        let bytes = request.bytes();
        let next = state.in_use_bytes.checked_add(bytes)?;
        if state.max_bytes.is_some_and(|max| next > max) {
            debug!(
                "pool refused {} bytes for {} ({} of {:?} in use)",
                bytes,
                request.kind.name(),
                state.in_use_bytes,
                state.max_bytes
            );
            return None;
        }

        state.in_use_bytes = next;
        state.peak_bytes = state.peak_bytes.max(next);
        state.allocations += 1;
        debug!(
            "allocated {} bytes for {}, total {}",
            bytes,
            request.kind.name(),
            state.in_use_bytes
        );
        Some(PipelineBuffer::zeroed(request))
    }
}

impl BufferDeallocator for BufferPool {
    fn release(&mut self, kind: BufferKind, buffer: PipelineBuffer) {
        if let Ok(mut state) = self.inner.lock() {
            state.in_use_bytes = state.in_use_bytes.saturating_sub(buffer.bytes());
            state.releases += 1;
            debug!(
                "released {} bytes of {}, total {}",
                buffer.bytes(),
                kind.name(),
                state.in_use_bytes
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_tracks_usage_and_peak() {
        let mut pool = BufferPool::unbounded();
        let frame = pool
            .allocate(BufferRequest::new(BufferKind::Frame, 8))
            .unwrap();
        let window = pool
            .allocate(BufferRequest::new(BufferKind::Window, 8))
            .unwrap();
        assert_eq!(pool.stats().in_use_bytes, 16 + 32);

        pool.release(BufferKind::Frame, frame);
        pool.release(BufferKind::Window, window);
        let stats = pool.stats();
        assert_eq!(stats.in_use_bytes, 0);
        assert_eq!(stats.peak_bytes, 48);
        assert_eq!((stats.allocations, stats.releases), (2, 2));
    }

    #[test]
    fn pool_refuses_requests_beyond_budget() {
        let mut pool = BufferPool::with_capacity(64);
        assert!(pool
            .allocate(BufferRequest::new(BufferKind::Window, 16))
            .is_some());
        assert!(pool
            .allocate(BufferRequest::new(BufferKind::AdcSamples, 1))
            .is_none());
    }

    #[test]
    fn clones_share_accounting() {
        let mut allocator = BufferPool::unbounded();
        let observer = allocator.clone();
        let _buffer = allocator
            .allocate(BufferRequest::new(BufferKind::DopplerSpectrum, 4))
            .unwrap();
        assert_eq!(observer.stats().in_use_bytes, 32);
    }
}
