use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::registry::{Listener, Registry, dispatch};
use super::scope::Disposer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::frame_delta;

/// Default cap on a single frame delta, in seconds.
pub const DEFAULT_MAX_FRAME_DELTA: f64 = 0.1;

/// One frame of the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Index of this frame, starting at 0.
    pub frame: FrameIndex,
    /// Accumulated loop time in seconds, including this frame's delta.
    pub time: f64,
    /// Sanitized delta since the previous frame.
    pub dt: f64,
}

struct Inner {
    subscribers: RefCell<Registry<Listener<FrameTick>>>,
    next_frame: Cell<u64>,
    time: Cell<f64>,
    last_timestamp: Cell<Option<f64>>,
    max_frame_delta: f64,
    stopped: Cell<bool>,
}

/// Single-threaded clock that invokes its subscribers once per frame.
///
/// Cloning yields another handle to the same loop.
#[derive(Clone)]
pub struct FrameLoop {
    inner: Rc<Inner>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::from_max_delta(DEFAULT_MAX_FRAME_DELTA)
    }
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("next_frame", &self.inner.next_frame.get())
            .field("time", &self.inner.time.get())
            .field("subscribers", &self.subscriber_count())
            .field("stopped", &self.inner.stopped.get())
            .finish()
    }
}

impl FrameLoop {
    /// Loop with [`DEFAULT_MAX_FRAME_DELTA`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Loop whose per-frame delta is capped at `max_frame_delta` seconds.
    pub fn with_max_frame_delta(max_frame_delta: f64) -> ScrubResult<Self> {
        if !max_frame_delta.is_finite() || max_frame_delta <= 0.0 {
            return Err(ScrubError::config("max_frame_delta must be finite and > 0"));
        }
        Ok(Self::from_max_delta(max_frame_delta))
    }

    fn from_max_delta(max_frame_delta: f64) -> Self {
        Self {
            inner: Rc::new(Inner {
                subscribers: RefCell::new(Registry::default()),
                next_frame: Cell::new(0),
                time: Cell::new(0.0),
                last_timestamp: Cell::new(None),
                max_frame_delta,
                stopped: Cell::new(false),
            }),
        }
    }

    /// Register a per-frame callback. It first runs on the tick after this call.
    pub fn subscribe(&self, callback: impl FnMut(&FrameTick) + 'static) -> ScrubResult<Disposer> {
        let id = self.subscribe_id(callback)?;
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        Ok(Disposer::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.subscribers.borrow_mut().remove(id);
                drop(removed);
            }
        }))
    }

    pub(crate) fn subscribe_id(
        &self,
        callback: impl FnMut(&FrameTick) + 'static,
    ) -> ScrubResult<u64> {
        if self.inner.stopped.get() {
            return Err(ScrubError::lifecycle("frame loop is stopped"));
        }
        Ok(self.inner.subscribers.borrow_mut().insert(Box::new(callback)))
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        let removed = self.inner.subscribers.borrow_mut().remove(id);
        drop(removed);
    }

    pub(crate) fn downgrade(&self) -> WeakFrameLoop {
        WeakFrameLoop(Rc::downgrade(&self.inner))
    }

    /// Advance by `dt` seconds and dispatch one frame.
    pub fn tick(&self, dt: f64) -> FrameTick {
        let dt = frame_delta(dt, self.inner.max_frame_delta);
        let frame = FrameIndex(self.inner.next_frame.get());
        self.inner.next_frame.set(frame.0.saturating_add(1));
        let time = self.inner.time.get() + dt;
        self.inner.time.set(time);
        let tick = FrameTick { frame, time, dt };

        if self.inner.stopped.get() {
            return tick;
        }
        tracing::trace!(frame = frame.0, dt, "frame tick");
        let inner = &self.inner;
        dispatch(&inner.subscribers, &tick, || inner.stopped.get());
        tick
    }

    /// Dispatch a frame for an absolute host timestamp in seconds.
    ///
    /// The first call has a zero delta; timestamps that go backwards count as zero.
    pub fn advance_to(&self, timestamp: f64) -> FrameTick {
        let dt = match self.inner.last_timestamp.get() {
            Some(last) if timestamp.is_finite() => timestamp - last,
            _ => 0.0,
        };
        if timestamp.is_finite() {
            self.inner.last_timestamp.set(Some(timestamp));
        }
        self.tick(dt)
    }

    /// Release all subscribers. Later ticks dispatch nothing and new subscriptions fail.
    pub fn stop(&self) {
        self.inner.stopped.set(true);
        let released = self.inner.subscribers.borrow_mut().clear();
        drop(released);
    }

    /// Whether [`FrameLoop::stop`] has run.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Accumulated loop time in seconds.
    pub fn time(&self) -> f64 {
        self.inner.time.get()
    }

    /// Index the next tick will carry.
    pub fn next_frame(&self) -> FrameIndex {
        FrameIndex(self.inner.next_frame.get())
    }

    /// Per-frame delta cap in seconds.
    pub fn max_frame_delta(&self) -> f64 {
        self.inner.max_frame_delta
    }
}

/// Non-owning handle to a [`FrameLoop`].
#[derive(Clone)]
pub(crate) struct WeakFrameLoop(Weak<Inner>);

impl WeakFrameLoop {
    pub(crate) fn upgrade(&self) -> Option<FrameLoop> {
        self.0.upgrade().map(|inner| FrameLoop { inner })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/clock.rs"]
mod tests;
