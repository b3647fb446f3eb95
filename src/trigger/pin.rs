use std::fmt;

use smallvec::SmallVec;

use super::hooks::{self, Hook};
use super::marker::Extent;
use crate::foundation::core::{Direction, TrackerId, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};

/// Default hysteresis band in pixels.
pub const DEFAULT_HYSTERESIS: f64 = 1.0;

/// Pin lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinState {
    /// Before the pin region.
    #[default]
    Idle,
    /// Locked to the viewport.
    Pinned,
    /// Past the pin region.
    Released,
}

/// Entering or leaving the pinned state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinEventKind {
    /// Became pinned.
    Enter,
    /// Stopped being pinned.
    Leave,
}

/// One pin crossing, passed to `on_enter` / `on_leave`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PinEvent {
    /// Element whose pin crossed.
    pub id: TrackerId,
    /// Which crossing.
    pub kind: PinEventKind,
    /// Direction of travel across the boundary.
    pub direction: Direction,
    /// Scroll offset that caused the crossing.
    pub scroll: f64,
}

/// Pin configuration for a tracked element.
pub struct PinSpec {
    /// Scroll distance the element stays pinned for.
    pub distance: Extent,
    /// Report a placeholder of `distance` while pinned.
    pub pin_spacing: bool,
    /// Return-side hysteresis band in pixels.
    pub hysteresis: f64,
    /// Run on every entry into the pinned state.
    pub on_enter: Option<Hook>,
    /// Run on every exit from the pinned state.
    pub on_leave: Option<Hook>,
}

impl PinSpec {
    /// Pin for `distance` with spacing on and the default hysteresis.
    pub fn new(distance: Extent) -> Self {
        Self {
            distance,
            pin_spacing: true,
            hysteresis: DEFAULT_HYSTERESIS,
            on_enter: None,
            on_leave: None,
        }
    }

    /// Toggle the placeholder.
    pub fn with_spacing(mut self, pin_spacing: bool) -> Self {
        self.pin_spacing = pin_spacing;
        self
    }

    /// Replace the hysteresis band.
    pub fn with_hysteresis(mut self, hysteresis: f64) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    /// Set the enter hook.
    pub fn on_enter(mut self, hook: impl FnMut(&PinEvent) -> anyhow::Result<()> + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Set the leave hook.
    pub fn on_leave(mut self, hook: impl FnMut(&PinEvent) -> anyhow::Result<()> + 'static) -> Self {
        self.on_leave = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinSpec")
            .field("distance", &self.distance)
            .field("pin_spacing", &self.pin_spacing)
            .field("hysteresis", &self.hysteresis)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

/// Per-frame pin output.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct PinFrame {
    /// State after this frame.
    pub state: PinState,
    /// Scroll offset at which pinning starts.
    pub start: f64,
    /// Scroll offset at which pinning ends.
    pub end: f64,
    /// Translation keeping the element anchored while pinned, else 0.
    pub offset: f64,
    /// Placeholder extent while pinned with spacing, else 0.
    pub spacer: f64,
}

type Crossings = SmallVec<[(PinEventKind, Direction); 2]>;

/// Next state for `pos` and the crossings taken to reach it, in order.
pub(crate) fn transition(
    state: PinState,
    pos: f64,
    start: f64,
    end: f64,
    hysteresis: f64,
) -> (PinState, Crossings) {
    use Direction::{Backward, Forward};
    use PinEventKind::{Enter, Leave};

    let mut crossings = Crossings::new();
    let next = match state {
        PinState::Idle if pos >= start => {
            crossings.push((Enter, Forward));
            if pos > end {
                crossings.push((Leave, Forward));
                PinState::Released
            } else {
                PinState::Pinned
            }
        }
        PinState::Pinned if pos > end => {
            crossings.push((Leave, Forward));
            PinState::Released
        }
        PinState::Pinned if pos < start - hysteresis => {
            crossings.push((Leave, Backward));
            PinState::Idle
        }
        PinState::Released if pos <= end - hysteresis => {
            crossings.push((Enter, Backward));
            if pos < start - hysteresis {
                crossings.push((Leave, Backward));
                PinState::Idle
            } else {
                PinState::Pinned
            }
        }
        unchanged => unchanged,
    };
    (next, crossings)
}

/// Drives one element's pin region and fires its hooks.
pub struct PinController {
    distance: Extent,
    pin_spacing: bool,
    hysteresis: f64,
    on_enter: Option<Hook>,
    on_leave: Option<Hook>,
    state: PinState,
    last: PinFrame,
}

impl fmt::Debug for PinController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinController")
            .field("distance", &self.distance)
            .field("state", &self.state)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl PinController {
    /// Validate `spec` and start idle.
    pub fn new(spec: PinSpec) -> ScrubResult<Self> {
        match spec.distance {
            Extent::Px(v) | Extent::Percent(v) if !v.is_finite() => {
                return Err(ScrubError::config("pin distance must be finite"));
            }
            d if !d.is_positive() => {
                return Err(ScrubError::config(format!("pin distance must be > 0, got {d}")));
            }
            _ => {}
        }
        if !spec.hysteresis.is_finite() || spec.hysteresis < 0.0 {
            return Err(ScrubError::config("pin hysteresis must be finite and >= 0"));
        }
        Ok(Self {
            distance: spec.distance,
            pin_spacing: spec.pin_spacing,
            hysteresis: spec.hysteresis,
            on_enter: spec.on_enter,
            on_leave: spec.on_leave,
            state: PinState::Idle,
            last: PinFrame::default(),
        })
    }

    /// Current state.
    pub fn state(&self) -> PinState {
        self.state
    }

    /// Advance for scroll offset `pos` with the region starting at `start`.
    ///
    /// A detached element keeps its state and last output and fires nothing.
    pub fn update(
        &mut self,
        id: TrackerId,
        pos: f64,
        start: f64,
        viewport: Viewport,
        attached: bool,
    ) -> PinFrame {
        if !attached {
            return self.last;
        }
        let distance = self.distance.resolve(viewport.height);
        let end = start + distance;
        // The band never exceeds half the region, so a re-entry always lands inside it.
        let hysteresis = self.hysteresis.min(distance / 2.0);
        let (next, crossings) = transition(self.state, pos, start, end, hysteresis);

        for (kind, direction) in crossings {
            tracing::debug!(id = id.0, ?kind, ?direction, scroll = pos, "pin transition");
            let event = PinEvent {
                id,
                kind,
                direction,
                scroll: pos,
            };
            let (label, hook) = match kind {
                PinEventKind::Enter => ("on_enter", self.on_enter.as_mut()),
                PinEventKind::Leave => ("on_leave", self.on_leave.as_mut()),
            };
            if let Some(hook) = hook {
                hooks::fire(label, hook, &event);
            }
        }
        self.state = next;

        let pinned = next == PinState::Pinned;
        self.last = PinFrame {
            state: next,
            start,
            end,
            offset: if pinned {
                (pos - start).clamp(0.0, distance)
            } else {
                0.0
            },
            spacer: if pinned && self.pin_spacing {
                distance
            } else {
                0.0
            },
        };
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/pin.rs"]
mod tests;
