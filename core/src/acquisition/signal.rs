use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Single-slot "frame ready" flag set by the sensor interrupt and cleared by
/// the processing loop. Raising it twice before it is taken still leaves one
/// pending frame.
#[derive(Default)]
pub struct FrameReadySignal {
    ready: AtomicBool,
    notify: Notify,
}

impl FrameReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a frame as available. Returns `true` when a previous frame was
    /// still pending, i.e. it has been overrun.
    pub fn raise(&self) -> bool {
        let overrun = self.ready.swap(true, Ordering::AcqRel);
        self.notify.notify_one();
        overrun
    }

    /// Polls and clears the flag.
    pub fn take(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Waits until a frame is available, then clears the flag.
    pub async fn wait(&self) {
        loop {
            if self.take() {
                return;
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn take_clears_a_raised_flag() {
        let signal = FrameReadySignal::new();
        assert!(!signal.take());
        assert!(!signal.raise());
        assert!(signal.is_pending());
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn second_raise_reports_overrun() {
        let signal = FrameReadySignal::new();
        signal.raise();
        assert!(signal.raise());
        assert!(signal.take());
        assert!(!signal.is_pending());
    }

    #[tokio::test]
    async fn wait_returns_after_raise_from_another_task() {
        let signal = Arc::new(FrameReadySignal::new());
        let raiser = Arc::clone(&signal);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            raiser.raise();
        });
        signal.wait().await;
        assert!(!signal.is_pending());
        handle.await.unwrap();
    }
}
