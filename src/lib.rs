//! scrubline turns a continuously changing scroll position into per-element animation state.
//!
//! One [`Engine`] owns a [`FrameLoop`], a [`ScrollSource`] and a [`ProgressTracker`]:
//!
//! - Register elements with a [`TriggerSpec`]: markers, keyframe [`Channel`]s, optional
//!   [`Smoothing`], a [`PinSpec`] and a [`RevealSpec`]
//! - Feed scroll input with [`Engine::scroll_to`] and drive frames with [`Engine::tick`]
//! - Read each element's [`TriggerFrame`] from its callback or [`Engine::latest`]
//!
//! Scenes can also be described in JSON ([`Scene`]) and replayed with [`simulate`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod engine;
pub(crate) mod frame;
pub(crate) mod scene;
pub(crate) mod scroll;
pub(crate) mod smoothing;
pub(crate) mod trigger;

pub use crate::foundation::core::{Direction, FrameIndex, Rect, TrackerId, Vec2, Viewport};
pub use crate::foundation::error::{ScrubError, ScrubResult};

pub use crate::animation::channel::{Channel, ChannelTemplate, IndexedStop, NamedChannel, Stop};
pub use crate::animation::ease::Ease;
pub use crate::animation::stagger::{Stagger, StaggerOrder, schedule};
pub use crate::animation::tween::{Position, Sequence, Tween};
pub use crate::animation::value::{Length, Lerp, Unit, Value};
pub use crate::engine::instance::{Engine, EngineConfig, PlaybackFrame, Registration};
pub use crate::frame::clock::{DEFAULT_MAX_FRAME_DELTA, FrameLoop, FrameTick};
pub use crate::frame::scope::{Disposer, Scope};
pub use crate::scene::loader::Scene;
pub use crate::scene::model::{
    ChannelDef, ElementDef, PinDef, RectDef, SceneDef, ScriptAction, ScriptStep, SimulationDef,
    TemplateDef,
};
pub use crate::scene::simulate::{
    ElementReport, EventReport, FrameReport, Simulation, SimulationOptions, simulate,
};
pub use crate::scroll::source::{ScrollConfig, ScrollMode, ScrollSample, ScrollSource};
pub use crate::smoothing::spring::SpringConfig;
pub use crate::smoothing::{SignalSmoother, Smoothing};
pub use crate::trigger::hooks::Hook;
pub use crate::trigger::marker::{
    Anchor, DEFAULT_END, DEFAULT_START, Extent, Marker, raw_progress,
};
pub use crate::trigger::pin::{
    DEFAULT_HYSTERESIS, PinController, PinEvent, PinEventKind, PinFrame, PinSpec, PinState,
};
pub use crate::trigger::reveal::{RevealFrame, RevealGroup, RevealSpec, RevealToggle};
pub use crate::trigger::tracker::{
    ChannelValue, ElementHandle, LayoutBox, ProgressTracker, TriggerFrame, TriggerSpec,
    UpdateCallback,
};
