use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Asks the host to deliver a `Frame` event on its next animation frame.
pub trait FrameScheduler {
    fn request_frame(&self);
}

/// Counts requests so tests can step frames by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requests: AtomicUsize,
}

impl ManualScheduler {
    pub fn new() -> Self { Self::default() }

    /// Returns whether a frame was requested since the last call.
    pub fn take_request(&self) -> bool { self.requests.swap(0, Ordering::AcqRel) > 0 }

    pub fn is_pending(&self) -> bool { self.requests.load(Ordering::Acquire) > 0 }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self) { self.requests.fetch_add(1, Ordering::AcqRel); }
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Arc<S> {
    fn request_frame(&self) { (**self).request_frame() }
}

/// Flag read by the task that produces frames for the reactor.
#[derive(Clone, Debug, Default)]
pub struct FrameSignal {
    wanted: Arc<AtomicBool>,
}

impl FrameSignal {
    pub fn new() -> Self { Self::default() }

    pub fn is_wanted(&self) -> bool { self.wanted.load(Ordering::Acquire) }

    /// Clears the request, returning whether one was pending.
    pub fn take(&self) -> bool { self.wanted.swap(false, Ordering::AcqRel) }
}

impl FrameScheduler for FrameSignal {
    fn request_frame(&self) { self.wanted.store(true, Ordering::Release); }
}
