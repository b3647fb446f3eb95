use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::hooks;
use super::marker::{Marker, raw_progress};
use super::pin::{PinController, PinFrame, PinSpec};
use super::reveal::{RevealFrame, RevealGroup, RevealSpec};
use crate::animation::channel::NamedChannel;
use crate::animation::value::Value;
use crate::foundation::core::{FrameIndex, Rect, TrackerId, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::frame::registry::Registry;
use crate::scroll::source::{ScrollSample, ScrollSource};
use crate::smoothing::{SignalSmoother, Smoothing};

/// Source of an element's document-space bounds.
///
/// Bounds are read once per sample and never cached past it.
pub trait ElementHandle {
    /// Current bounds, or `None` while the element is detached from layout.
    fn bounds(&self) -> Option<Rect>;
}

/// Element handle backed by a settable rectangle.
#[derive(Debug, Default)]
pub struct LayoutBox {
    rect: Cell<Option<Rect>>,
}

impl LayoutBox {
    /// Attached box at `rect`.
    pub fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(Some(rect)),
        })
    }

    /// Move or resize the box, attaching it if detached.
    pub fn set(&self, rect: Rect) {
        self.rect.set(Some(rect));
    }

    /// Detach the box from layout.
    pub fn detach(&self) {
        self.rect.set(None);
    }
}

impl ElementHandle for LayoutBox {
    fn bounds(&self) -> Option<Rect> {
        self.rect.get()
    }
}

/// Everything needed to register one tracked element.
pub struct TriggerSpec {
    /// Geometry source.
    pub element: Rc<dyn ElementHandle>,
    /// Where progress starts.
    pub start: Marker,
    /// Where progress reaches 1.
    pub end: Marker,
    /// Filter applied to raw progress.
    pub smoothing: Smoothing,
    /// Property channels evaluated against smoothed progress.
    pub channels: Vec<NamedChannel>,
    /// Optional pin region starting at the start offset.
    pub pin: Option<PinSpec>,
    /// Optional staggered reveal played once the start offset is reached.
    pub reveal: Option<RevealSpec>,
}

impl TriggerSpec {
    /// Spec with default markers and no smoothing, channels, pin or reveal.
    pub fn new(element: Rc<dyn ElementHandle>) -> Self {
        Self {
            element,
            start: Marker::default_start(),
            end: Marker::default_end(),
            smoothing: Smoothing::None,
            channels: Vec::new(),
            pin: None,
            reveal: None,
        }
    }

    /// Parse and set both markers.
    pub fn markers(mut self, start: &str, end: &str) -> ScrubResult<Self> {
        self.start = start.parse()?;
        self.end = end.parse()?;
        Ok(self)
    }

    /// Set the smoothing filter.
    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Add a property channel.
    pub fn channel(mut self, channel: NamedChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Pin the element.
    pub fn pin(mut self, pin: PinSpec) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Attach a staggered reveal.
    pub fn reveal(mut self, reveal: RevealSpec) -> Self {
        self.reveal = Some(reveal);
        self
    }
}

impl fmt::Debug for TriggerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSpec")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("smoothing", &self.smoothing)
            .field("channels", &self.channels.len())
            .field("pin", &self.pin)
            .field("reveal", &self.reveal)
            .finish_non_exhaustive()
    }
}

/// One evaluated property.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChannelValue {
    /// Property name.
    pub property: String,
    /// Value at the element's smoothed progress.
    pub value: Value,
}

/// Per-frame output of one tracked element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TriggerFrame {
    /// Element id.
    pub id: TrackerId,
    /// Frame that produced this output.
    pub frame: FrameIndex,
    /// Virtual scroll offset used.
    pub scroll: f64,
    /// Whether the element reported bounds this frame.
    pub attached: bool,
    /// Resolved start offset (last known while detached).
    pub start: f64,
    /// Resolved end offset (last known while detached).
    pub end: f64,
    /// Unsmoothed progress.
    pub raw: f64,
    /// Smoothed progress driving channels.
    pub progress: f64,
    /// Channel values in registration order.
    pub values: Vec<ChannelValue>,
    /// Pin output, when pinned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinFrame>,
    /// Reveal output, when revealing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealFrame>,
}

impl TriggerFrame {
    /// Value of `property`, if the element drives it.
    pub fn value(&self, property: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.property == property)
            .map(|v| &v.value)
    }
}

/// Per-element update callback.
pub type UpdateCallback = Box<dyn FnMut(&TriggerFrame)>;

struct Tracked {
    element: Rc<dyn ElementHandle>,
    start: Marker,
    end: Marker,
    smoother: SignalSmoother,
    channels: Vec<NamedChannel>,
    pin: Option<PinController>,
    reveal: Option<RevealGroup>,
    callback: Option<UpdateCallback>,
    range: (f64, f64),
}

impl Tracked {
    fn sample(&mut self, id: TrackerId, sample: &ScrollSample, viewport: Viewport) -> TriggerFrame {
        let pos = sample.virtual_offset;
        let bounds = self.element.bounds().filter(|r| {
            r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
        });
        let raw = match bounds {
            Some(rect) => {
                let start = self.start.offset(rect, viewport, 0.0);
                let end = self.end.offset(rect, viewport, start);
                self.range = (start, end);
                raw_progress(pos, start, end)
            }
            None => 0.0,
        };
        let (start, end) = self.range;
        let attached = bounds.is_some();

        self.smoother.step(raw, sample.dt);
        let progress = self.smoother.value();
        let values = self
            .channels
            .iter()
            .map(|c| ChannelValue {
                property: c.property.clone(),
                value: c.channel.evaluate(progress),
            })
            .collect();
        let pin = self
            .pin
            .as_mut()
            .map(|p| p.update(id, pos, start, viewport, attached));
        let reveal = self
            .reveal
            .as_mut()
            .map(|r| r.update(attached.then_some(pos >= start), sample.dt));

        TriggerFrame {
            id,
            frame: sample.frame,
            scroll: pos,
            attached,
            start,
            end,
            raw,
            progress,
            values,
            pin,
            reveal,
        }
    }
}

struct TrackerInner {
    elements: RefCell<Registry<Tracked>>,
    latest: RefCell<BTreeMap<TrackerId, TriggerFrame>>,
    viewport: Cell<Viewport>,
    torn_down: Cell<bool>,
}

impl TrackerInner {
    fn on_sample(&self, sample: &ScrollSample) {
        let viewport = self.viewport.get();
        let ids = self.elements.borrow().ids();
        for raw_id in ids {
            if self.torn_down.get() {
                break;
            }
            let Some(mut tracked) = self.elements.borrow_mut().take(raw_id) else {
                continue;
            };
            let id = TrackerId(raw_id);
            let frame = tracked.sample(id, sample, viewport);
            if let Some(cb) = tracked.callback.as_mut() {
                self.latest.borrow_mut().insert(id, frame.clone());
                hooks::isolate("update", || cb(&frame));
            } else {
                self.latest.borrow_mut().insert(id, frame);
            }
            let orphan = self.elements.borrow_mut().restore(raw_id, tracked);
            if orphan.is_some() {
                self.latest.borrow_mut().remove(&id);
            }
            drop(orphan);
        }
    }
}

/// Tracks registered elements against a [`ScrollSource`].
///
/// Cloning yields another handle to the same tracker.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Rc<TrackerInner>,
    source: ScrollSource,
    subscription: Rc<Cell<Option<u64>>>,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("elements", &self.len())
            .field("viewport", &self.viewport())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

impl ProgressTracker {
    /// Create a tracker fed by every sample of `source`.
    pub fn attach(source: &ScrollSource, viewport: Viewport) -> ScrubResult<Self> {
        viewport.validate()?;
        let inner = Rc::new(TrackerInner {
            elements: RefCell::new(Registry::default()),
            latest: RefCell::new(BTreeMap::new()),
            viewport: Cell::new(viewport),
            torn_down: Cell::new(false),
        });
        let weak: Weak<TrackerInner> = Rc::downgrade(&inner);
        let id = source.subscribe_id(move |sample| {
            if let Some(inner) = weak.upgrade() {
                inner.on_sample(sample);
            }
        })?;
        Ok(Self {
            inner,
            source: source.clone(),
            subscription: Rc::new(Cell::new(Some(id))),
        })
    }

    /// Validate and activate an element. It is first sampled on the next frame.
    #[tracing::instrument(level = "debug", skip_all, fields(start = %spec.start, end = %spec.end))]
    pub fn register(
        &self,
        spec: TriggerSpec,
        callback: Option<UpdateCallback>,
    ) -> ScrubResult<TrackerId> {
        if self.is_torn_down() {
            return Err(ScrubError::lifecycle("progress tracker is torn down"));
        }
        if spec.start.is_relative() {
            return Err(ScrubError::marker(format!(
                "relative marker \"{}\" is only valid as an end marker",
                spec.start
            )));
        }
        let smoother = SignalSmoother::new(&spec.smoothing)?;
        let pin = spec.pin.map(PinController::new).transpose()?;
        let reveal = spec.reveal.map(RevealGroup::new).transpose()?;

        let tracked = Tracked {
            element: spec.element,
            start: spec.start,
            end: spec.end,
            smoother,
            channels: spec.channels,
            pin,
            reveal,
            callback,
            range: (0.0, 0.0),
        };
        let id = TrackerId(self.inner.elements.borrow_mut().insert(tracked));
        tracing::debug!(id = id.0, "element registered");
        Ok(id)
    }

    /// Remove an element. Safe from inside any callback, including the element's own.
    pub fn unregister(&self, id: TrackerId) -> bool {
        let was_live = self.inner.elements.borrow().contains(id.0);
        let removed = self.inner.elements.borrow_mut().remove(id.0);
        let frame = self.inner.latest.borrow_mut().remove(&id);
        drop(removed);
        drop(frame);
        was_live
    }

    /// Non-owning handle used by disposers.
    pub(crate) fn downgrade(&self) -> WeakTracker {
        WeakTracker(Rc::downgrade(&self.inner))
    }

    /// Most recent output of `id`.
    pub fn latest(&self, id: TrackerId) -> Option<TriggerFrame> {
        self.inner.latest.borrow().get(&id).cloned()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: TrackerId) -> bool {
        self.inner.elements.borrow().contains(id.0)
    }

    /// Replace the viewport size.
    pub fn set_viewport(&self, viewport: Viewport) -> ScrubResult<()> {
        viewport.validate()?;
        self.inner.viewport.set(viewport);
        Ok(())
    }

    /// Current viewport size.
    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.get()
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`ProgressTracker::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Detach from the scroll source and drop every element.
    pub fn teardown(&self) {
        if self.inner.torn_down.replace(true) {
            return;
        }
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
        }
        let released = self.inner.elements.borrow_mut().clear();
        let frames = std::mem::take(&mut *self.inner.latest.borrow_mut());
        drop(released);
        drop(frames);
        tracing::debug!("progress tracker torn down");
    }
}

#[derive(Clone)]
pub(crate) struct WeakTracker(Weak<TrackerInner>);

impl WeakTracker {
    pub(crate) fn unregister(&self, id: TrackerId) {
        if let Some(inner) = self.0.upgrade() {
            let removed = inner.elements.borrow_mut().remove(id.0);
            let frame = inner.latest.borrow_mut().remove(&id);
            drop(removed);
            drop(frame);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/tracker.rs"]
mod tests;
