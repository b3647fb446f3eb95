use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::animation::ease::Ease;
use crate::animation::tween::Glide;
use crate::foundation::core::{Direction, FrameIndex};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::{ensure_finite, finite_or};
use crate::frame::clock::{FrameLoop, FrameTick, WeakFrameLoop};
use crate::frame::registry::{Listener, Registry, dispatch};
use crate::frame::scope::Disposer;

/// How the virtual offset follows the native one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    /// Virtual offset equals the native offset.
    #[default]
    Native,
    /// Virtual offset glides toward the native offset.
    Inertial,
}

/// Scroll source configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Follow mode.
    pub mode: ScrollMode,
    /// Inertial glide duration in seconds.
    pub duration: f64,
    /// Inertial glide easing.
    pub easing: Ease,
    /// Distance under which an inertial glide snaps to its target.
    pub rest_threshold: f64,
    /// Maximum scroll offset; unbounded when `None`.
    pub limit: Option<f64>,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            mode: ScrollMode::Native,
            duration: 1.2,
            easing: Ease::Smooth,
            rest_threshold: 0.5,
            limit: None,
        }
    }
}

impl ScrollConfig {
    /// Inertial defaults.
    pub fn inertial() -> Self {
        Self {
            mode: ScrollMode::Inertial,
            ..Self::default()
        }
    }

    /// Check durations and thresholds.
    pub fn validate(&self) -> ScrubResult<()> {
        if ensure_finite("scroll duration", self.duration)? < 0.0 {
            return Err(ScrubError::config("scroll duration must be >= 0"));
        }
        if ensure_finite("scroll rest_threshold", self.rest_threshold)? < 0.0 {
            return Err(ScrubError::config("scroll rest_threshold must be >= 0"));
        }
        if let Some(limit) = self.limit
            && ensure_finite("scroll limit", limit)? < 0.0
        {
            return Err(ScrubError::config("scroll limit must be >= 0"));
        }
        self.easing.validate()
    }
}

/// Scroll state emitted once per frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollSample {
    /// Frame that produced this sample.
    pub frame: FrameIndex,
    /// Loop time in seconds.
    pub timestamp: f64,
    /// Frame delta in seconds.
    pub dt: f64,
    /// Native (target) offset.
    pub raw_offset: f64,
    /// Offset that drives progress.
    pub virtual_offset: f64,
    /// Direction of the latest virtual movement.
    pub direction: Direction,
    /// Virtual offset velocity in px/s.
    pub velocity: f64,
}

struct SourceInner {
    config: ScrollConfig,
    limit: Cell<Option<f64>>,
    raw: Cell<f64>,
    current: Cell<f64>,
    glide: Cell<Option<Glide>>,
    direction: Cell<Direction>,
    latest: Cell<Option<ScrollSample>>,
    listeners: RefCell<Registry<Listener<ScrollSample>>>,
    frame_loop: WeakFrameLoop,
    frame_sub: Cell<Option<u64>>,
    torn_down: Cell<bool>,
}

impl SourceInner {
    fn clamp(&self, offset: f64) -> f64 {
        let offset = finite_or(offset, 0.0).max(0.0);
        match self.limit.get() {
            Some(limit) => offset.min(limit),
            None => offset,
        }
    }

    fn set_target(&self, offset: f64) {
        let target = self.clamp(offset);
        self.raw.set(target);
        if self.config.mode == ScrollMode::Native {
            return;
        }
        let glide = match self.glide.get() {
            Some(mut g) if !g.is_done() => {
                if g.target() != target {
                    g.retarget(target);
                }
                g
            }
            _ => Glide::new(
                self.current.get(),
                target,
                self.config.duration,
                self.config.easing,
            ),
        };
        self.glide.set(Some(glide));
    }

    fn next_offset(&self, dt: f64) -> f64 {
        let target = self.raw.get();
        match self.config.mode {
            ScrollMode::Native => target,
            ScrollMode::Inertial => {
                let Some(mut glide) = self.glide.get() else {
                    return self.current.get();
                };
                let v = glide.advance(dt);
                if glide.is_done() || (target - v).abs() < self.config.rest_threshold {
                    self.glide.set(None);
                    target
                } else {
                    self.glide.set(Some(glide));
                    v
                }
            }
        }
    }

    fn on_tick(&self, tick: &FrameTick) {
        if self.torn_down.get() {
            return;
        }
        let previous = self.current.get();
        let offset = self.next_offset(tick.dt);
        self.current.set(offset);
        let delta = offset - previous;
        let direction = Direction::from_delta(delta, self.direction.get());
        self.direction.set(direction);

        let sample = ScrollSample {
            frame: tick.frame,
            timestamp: tick.time,
            dt: tick.dt,
            raw_offset: self.raw.get(),
            virtual_offset: offset,
            direction,
            velocity: if tick.dt > 0.0 { delta / tick.dt } else { 0.0 },
        };
        self.latest.set(Some(sample));
        dispatch(&self.listeners, &sample, || self.torn_down.get());
    }
}

/// Continuous scroll signal attached to a [`FrameLoop`].
///
/// Cloning yields another handle to the same source.
#[derive(Clone)]
pub struct ScrollSource {
    inner: Rc<SourceInner>,
}

impl std::fmt::Debug for ScrollSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSource")
            .field("mode", &self.inner.config.mode)
            .field("raw", &self.inner.raw.get())
            .field("offset", &self.inner.current.get())
            .field("torn_down", &self.inner.torn_down.get())
            .finish()
    }
}

impl ScrollSource {
    /// Create a source at offset 0 that samples on every tick of `frame_loop`.
    pub fn attach(frame_loop: &FrameLoop, config: ScrollConfig) -> ScrubResult<Self> {
        config.validate()?;
        let inner = Rc::new(SourceInner {
            config,
            limit: Cell::new(config.limit),
            raw: Cell::new(0.0),
            current: Cell::new(0.0),
            glide: Cell::new(None),
            direction: Cell::new(Direction::Forward),
            latest: Cell::new(None),
            listeners: RefCell::new(Registry::default()),
            frame_loop: frame_loop.downgrade(),
            frame_sub: Cell::new(None),
            torn_down: Cell::new(false),
        });
        let weak: Weak<SourceInner> = Rc::downgrade(&inner);
        let id = frame_loop.subscribe_id(move |tick| {
            if let Some(inner) = weak.upgrade() {
                inner.on_tick(tick);
            }
        })?;
        inner.frame_sub.set(Some(id));
        Ok(Self { inner })
    }

    /// Register a per-sample listener. Fails after teardown.
    pub fn subscribe(
        &self,
        listener: impl FnMut(&ScrollSample) + 'static,
    ) -> ScrubResult<Disposer> {
        let id = self.subscribe_id(listener)?;
        let weak = Rc::downgrade(&self.inner);
        Ok(Disposer::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.listeners.borrow_mut().remove(id);
                drop(removed);
            }
        }))
    }

    pub(crate) fn subscribe_id(
        &self,
        listener: impl FnMut(&ScrollSample) + 'static,
    ) -> ScrubResult<u64> {
        if self.inner.torn_down.get() {
            return Err(ScrubError::lifecycle("scroll source is torn down"));
        }
        Ok(self.inner.listeners.borrow_mut().insert(Box::new(listener)))
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        let removed = self.inner.listeners.borrow_mut().remove(id);
        drop(removed);
    }

    /// Set the native offset, clamped to `[0, limit]`.
    pub fn scroll_to(&self, offset: f64) {
        self.inner.set_target(offset);
    }

    /// Move the native offset by `delta`.
    pub fn scroll_by(&self, delta: f64) {
        self.inner
            .set_target(self.inner.raw.get() + finite_or(delta, 0.0));
    }

    /// Replace the scroll limit and re-clamp the native offset.
    pub fn set_limit(&self, limit: Option<f64>) -> ScrubResult<()> {
        if let Some(l) = limit
            && (!l.is_finite() || l < 0.0)
        {
            return Err(ScrubError::config("scroll limit must be finite and >= 0"));
        }
        self.inner.limit.set(limit);
        self.inner.set_target(self.inner.raw.get());
        Ok(())
    }

    /// Current virtual offset.
    pub fn offset(&self) -> f64 {
        self.inner.current.get()
    }

    /// Current native offset.
    pub fn raw_offset(&self) -> f64 {
        self.inner.raw.get()
    }

    /// Direction of the latest virtual movement.
    pub fn direction(&self) -> Direction {
        self.inner.direction.get()
    }

    /// Configured limit.
    pub fn limit(&self) -> Option<f64> {
        self.inner.limit.get()
    }

    /// Source configuration.
    pub fn config(&self) -> &ScrollConfig {
        &self.inner.config
    }

    /// Last emitted sample.
    pub fn latest(&self) -> Option<ScrollSample> {
        self.inner.latest.get()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Whether [`ScrollSource::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Cancel the frame subscription and release every listener.
    ///
    /// Listeners still pending in an in-flight dispatch are skipped.
    pub fn teardown(&self) {
        if self.inner.torn_down.replace(true) {
            return;
        }
        if let Some(id) = self.inner.frame_sub.take()
            && let Some(frame_loop) = self.inner.frame_loop.upgrade()
        {
            frame_loop.unsubscribe(id);
        }
        let released = self.inner.listeners.borrow_mut().clear();
        drop(released);
        tracing::debug!("scroll source torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/source.rs"]
mod tests;
