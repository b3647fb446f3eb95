use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::animation::tween::Sequence;
use crate::animation::value::Value;
use crate::foundation::core::{TrackerId, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::frame::clock::{DEFAULT_MAX_FRAME_DELTA, FrameLoop, FrameTick};
use crate::frame::scope::{Disposer, Scope};
use crate::scroll::source::{ScrollConfig, ScrollSource};
use crate::trigger::hooks;
use crate::trigger::tracker::{ProgressTracker, TriggerFrame, TriggerSpec, UpdateCallback};

/// Engine construction options.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial viewport size.
    pub viewport: Viewport,
    /// Scroll source options.
    pub scroll: ScrollConfig,
    /// Cap on a single frame delta, in seconds.
    pub max_frame_delta: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            scroll: ScrollConfig::default(),
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
        }
    }
}

/// A registered element: its id and the disposer that unregisters it.
#[derive(Debug)]
#[must_use = "dropping a Registration keeps the element registered with no way to release it"]
pub struct Registration {
    /// Tracker id of the element.
    pub id: TrackerId,
    /// Unregisters the element.
    pub disposer: Disposer,
}

/// One frame of a playing [`Sequence`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackFrame {
    /// Sequence time in seconds, capped at its duration.
    pub time: f64,
    /// One value per property.
    pub values: Vec<(String, Value)>,
    /// Whether this is the final frame.
    pub finished: bool,
}

/// An explicit engine instance: one frame loop, scroll source, progress tracker and scope.
pub struct Engine {
    frame_loop: FrameLoop,
    scroll: ScrollSource,
    tracker: ProgressTracker,
    scope: RefCell<Scope>,
    torn_down: Cell<bool>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("frame_loop", &self.frame_loop)
            .field("scroll", &self.scroll)
            .field("tracker", &self.tracker)
            .field("torn_down", &self.torn_down.get())
            .finish()
    }
}

impl Engine {
    /// Build an engine with its own frame loop, scroll source and tracker.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(config: EngineConfig) -> ScrubResult<Self> {
        let frame_loop = FrameLoop::with_max_frame_delta(config.max_frame_delta)?;
        let scroll = ScrollSource::attach(&frame_loop, config.scroll)?;
        let tracker = ProgressTracker::attach(&scroll, config.viewport)?;
        tracing::debug!(mode = ?config.scroll.mode, "engine ready");
        Ok(Self {
            frame_loop,
            scroll,
            tracker,
            scope: RefCell::new(Scope::new()),
            torn_down: Cell::new(false),
        })
    }

    /// Advance one frame by `dt` seconds.
    pub fn tick(&self, dt: f64) -> FrameTick {
        self.frame_loop.tick(dt)
    }

    /// Advance one frame to host timestamp `timestamp` (seconds).
    pub fn advance_to(&self, timestamp: f64) -> FrameTick {
        self.frame_loop.advance_to(timestamp)
    }

    /// Set the native scroll offset.
    pub fn scroll_to(&self, offset: f64) {
        self.scroll.scroll_to(offset);
    }

    /// Move the native scroll offset.
    pub fn scroll_by(&self, delta: f64) {
        self.scroll.scroll_by(delta);
    }

    /// Replace the scroll limit.
    pub fn set_scroll_limit(&self, limit: Option<f64>) -> ScrubResult<()> {
        self.scroll.set_limit(limit)
    }

    /// Resize the viewport.
    pub fn set_viewport(&self, viewport: Viewport) -> ScrubResult<()> {
        self.tracker.set_viewport(viewport)
    }

    /// Register an element with a per-frame callback.
    pub fn register(
        &self,
        spec: TriggerSpec,
        callback: impl FnMut(&TriggerFrame) + 'static,
    ) -> ScrubResult<Registration> {
        self.register_inner(spec, Some(Box::new(callback)))
    }

    /// Register an element whose output is only read through [`Engine::latest`].
    pub fn track(&self, spec: TriggerSpec) -> ScrubResult<Registration> {
        self.register_inner(spec, None)
    }

    fn register_inner(
        &self,
        spec: TriggerSpec,
        callback: Option<UpdateCallback>,
    ) -> ScrubResult<Registration> {
        let id = self.tracker.register(spec, callback)?;
        let weak = self.tracker.downgrade();
        Ok(Registration {
            id,
            disposer: Disposer::new(move || weak.unregister(id)),
        })
    }

    /// Unregister an element. Returns whether it was registered.
    pub fn unregister(&self, id: TrackerId) -> bool {
        self.tracker.unregister(id)
    }

    /// Most recent output of `id`.
    pub fn latest(&self, id: TrackerId) -> Option<TriggerFrame> {
        self.tracker.latest(id)
    }

    /// Play `sequence` through the frame loop, one callback per frame.
    ///
    /// The subscription releases itself after the frame that reaches the sequence's end.
    pub fn play(
        &self,
        sequence: Sequence,
        mut callback: impl FnMut(&PlaybackFrame) + 'static,
    ) -> ScrubResult<Disposer> {
        if self.torn_down.get() {
            return Err(ScrubError::lifecycle("engine is torn down"));
        }
        let duration = sequence.duration();
        let slot: Rc<Cell<Option<u64>>> = Rc::new(Cell::new(None));
        let (own_slot, own_loop) = (Rc::clone(&slot), self.frame_loop.downgrade());
        let mut elapsed = 0.0;

        let id = self.frame_loop.subscribe_id(move |tick| {
            elapsed += tick.dt;
            let finished = elapsed >= duration;
            let time = elapsed.min(duration);
            let frame = PlaybackFrame {
                time,
                values: sequence.sample(time),
                finished,
            };
            hooks::isolate("playback", || callback(&frame));
            if finished
                && let Some(id) = own_slot.take()
                && let Some(frame_loop) = own_loop.upgrade()
            {
                frame_loop.unsubscribe(id);
            }
        })?;
        slot.set(Some(id));
        tracing::debug!(duration, subscription = id, "sequence playback started");

        let weak_loop = self.frame_loop.downgrade();
        Ok(Disposer::new(move || {
            if let Some(id) = slot.take()
                && let Some(frame_loop) = weak_loop.upgrade()
            {
                frame_loop.unsubscribe(id);
            }
        }))
    }

    /// Hand a disposer to the engine's scope, released on [`Engine::teardown`].
    pub fn adopt(&self, mut disposer: Disposer) {
        if self.torn_down.get() {
            disposer.dispose();
            return;
        }
        self.scope.borrow_mut().add(disposer);
    }

    /// The engine's frame loop.
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// The engine's scroll source.
    pub fn scroll(&self) -> &ScrollSource {
        &self.scroll
    }

    /// The engine's progress tracker.
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Whether [`Engine::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Tear down tracker, scroll source, frame loop and scope, in that order.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.tracker.teardown();
        self.scroll.teardown();
        self.frame_loop.stop();
        let mut scope = std::mem::take(&mut *self.scope.borrow_mut());
        scope.teardown();
        *self.scope.borrow_mut() = scope;
        tracing::debug!("engine torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/instance.rs"]
mod tests;
