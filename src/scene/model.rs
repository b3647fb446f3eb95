use crate::animation::channel::{IndexedStop, Stop};
use crate::animation::value::Value;
use crate::engine::instance::EngineConfig;
use crate::foundation::core::{Rect, Viewport};
use crate::smoothing::Smoothing;
use crate::trigger::reveal::RevealSpec;

/// JSON-facing scene: engine options, elements and a scripted scroll trace.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Engine options.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Tracked elements, registered in order.
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    /// Actions applied before the frame they name.
    #[serde(default)]
    pub script: Vec<ScriptStep>,
    /// Default simulation length and rate.
    #[serde(default)]
    pub simulation: SimulationDef,
}

fn default_frames() -> u64 {
    120
}

fn default_fps() -> f64 {
    60.0
}

/// Simulation defaults, overridable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationDef {
    /// Number of frames to run.
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// Frames per second; each tick advances `1 / fps` seconds.
    #[serde(default = "default_fps")]
    pub fps: f64,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            fps: default_fps(),
        }
    }
}

/// Document-space box of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectDef {
    /// Left edge.
    #[serde(default)]
    pub x: f64,
    /// Top edge.
    #[serde(default)]
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl RectDef {
    pub(crate) fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    pub(crate) fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// One tracked element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDef {
    /// Unique name used in reports and script actions.
    pub name: String,
    /// Initial bounds.
    pub rect: RectDef,
    /// Start marker; `"top bottom"` when omitted.
    #[serde(default)]
    pub start: Option<String>,
    /// End marker; `"bottom top"` when omitted.
    #[serde(default)]
    pub end: Option<String>,
    /// Progress smoothing.
    #[serde(default)]
    pub smoothing: Smoothing,
    /// Property channels.
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
    /// Per-index channel families.
    #[serde(default)]
    pub templates: Vec<TemplateDef>,
    /// Pin region.
    #[serde(default)]
    pub pin: Option<PinDef>,
    /// Staggered reveal.
    #[serde(default)]
    pub reveal: Option<RevealSpec>,
}

/// Keyframe stops for one property.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelDef {
    /// Property name.
    pub property: String,
    /// Stops in increasing `at` order.
    pub stops: Vec<Stop<Value>>,
}

/// A channel instantiated `count` times as `property[0]`, `property[1]`, ...
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDef {
    /// Base property name.
    pub property: String,
    /// Number of instances.
    pub count: usize,
    /// Stops whose values shift by `index * step`.
    pub stops: Vec<IndexedStop>,
}

fn default_pin_spacing() -> bool {
    true
}

fn default_hysteresis() -> f64 {
    crate::trigger::pin::DEFAULT_HYSTERESIS
}

/// Pin region starting at the element's start marker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinDef {
    /// `"400px"`, `"400"` or `"100%"` of the viewport height.
    pub distance: String,
    /// Report a placeholder while pinned.
    #[serde(default = "default_pin_spacing")]
    pub pin_spacing: bool,
    /// Return-side hysteresis in pixels.
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f64,
}

/// An action applied before frame `frame` is ticked.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptStep {
    /// Frame index the action precedes.
    pub frame: u64,
    /// What happens.
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Scripted host input.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    /// Set the native scroll offset.
    ScrollTo(f64),
    /// Move the native scroll offset.
    ScrollBy(f64),
    /// Resize the viewport.
    Resize(Viewport),
    /// Move or resize an element, attaching it if detached.
    Layout {
        /// Element name.
        element: String,
        /// New bounds.
        rect: RectDef,
    },
    /// Detach an element from layout.
    Detach {
        /// Element name.
        element: String,
    },
    /// Unregister an element.
    Remove {
        /// Element name.
        element: String,
    },
}

impl ScriptAction {
    pub(crate) fn element(&self) -> Option<&str> {
        match self {
            Self::Layout { element, .. } | Self::Detach { element } | Self::Remove { element } => {
                Some(element)
            }
            Self::ScrollTo(_) | Self::ScrollBy(_) | Self::Resize(_) => None,
        }
    }
}
