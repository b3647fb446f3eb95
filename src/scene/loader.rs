use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::rc::Rc;

use super::model::{ElementDef, PinDef, SceneDef, ScriptAction};
use crate::animation::channel::{Channel, ChannelTemplate, NamedChannel};
use crate::engine::instance::Engine;
use crate::foundation::core::TrackerId;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::smoothing::SignalSmoother;
use crate::trigger::marker::{Extent, Marker};
use crate::trigger::pin::{PinController, PinEvent, PinSpec};
use crate::trigger::reveal::RevealGroup;
use crate::trigger::tracker::{LayoutBox, TriggerSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
struct SceneError {
    path: Vec<PathElem>,
    message: String,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::from("$");
        for p in &self.path {
            match *p {
                PathElem::Field(name) => {
                    s.push('.');
                    s.push_str(name);
                }
                PathElem::Index(i) => {
                    s.push('[');
                    s.push_str(&i.to_string());
                    s.push(']');
                }
            }
        }
        write!(f, "{s}: {}", self.message)
    }
}

struct Errors(Vec<SceneError>);

impl Errors {
    fn push(&mut self, path: &[PathElem], message: impl fmt::Display) {
        self.0.push(SceneError {
            path: path.to_vec(),
            message: message.to_string(),
        });
    }

    fn check<T>(&mut self, path: &[PathElem], r: ScrubResult<T>) -> Option<T> {
        match r {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(path, e);
                None
            }
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// A validated-on-demand scene loaded from JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    def: SceneDef,
}

/// Pin crossing recorded while a built scene runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RecordedEvent {
    pub(crate) element: usize,
    pub(crate) event: PinEvent,
}

/// An engine built from a scene, with handles to drive its elements.
pub(crate) struct BuiltScene {
    pub(crate) engine: Engine,
    pub(crate) elements: Vec<BuiltElement>,
    pub(crate) events: Rc<RefCell<Vec<RecordedEvent>>>,
}

pub(crate) struct BuiltElement {
    pub(crate) name: String,
    pub(crate) id: TrackerId,
    pub(crate) layout: Rc<LayoutBox>,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrubResult<Self> {
        let def: SceneDef = serde_json::from_reader(r)
            .map_err(|e| ScrubError::serde(format!("parse scene JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrubResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrubError::serde(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap an in-memory definition.
    pub fn from_def(def: SceneDef) -> Self {
        Self { def }
    }

    /// Borrow the definition.
    pub fn def(&self) -> &SceneDef {
        &self.def
    }

    /// Check every field, reporting all problems with their `$.path` locations.
    pub fn validate(&self) -> ScrubResult<()> {
        let mut errors = Errors(Vec::new());
        validate_engine(&self.def, &mut errors);

        let mut names = HashSet::new();
        for (i, el) in self.def.elements.iter().enumerate() {
            let path = [PathElem::Field("elements"), PathElem::Index(i)];
            if el.name.is_empty() {
                errors.push(&path, "element name must not be empty");
            } else if !names.insert(el.name.as_str()) {
                errors.push(&path, format!("duplicate element name '{}'", el.name));
            }
            compile_element(el, &path, &mut errors, None);
        }

        for (i, step) in self.def.script.iter().enumerate() {
            let path = [PathElem::Field("script"), PathElem::Index(i)];
            if let Some(name) = step.action.element()
                && !names.contains(name)
            {
                errors.push(&path, format!("unknown element '{name}'"));
            }
            match &step.action {
                ScriptAction::ScrollTo(v) | ScriptAction::ScrollBy(v) if !v.is_finite() => {
                    errors.push(&path, "scroll amount must be finite");
                }
                ScriptAction::Resize(vp) => {
                    errors.check(&path, vp.validate());
                }
                ScriptAction::Layout { rect, .. } if !rect.is_valid() => {
                    errors.push(&path, "rect must be finite with non-negative size");
                }
                _ => {}
            }
        }

        let sim = self.def.simulation;
        if !sim.fps.is_finite() || sim.fps <= 0.0 {
            errors.push(
                &[PathElem::Field("simulation"), PathElem::Field("fps")],
                "fps must be finite and > 0",
            );
        }

        if errors.0.is_empty() {
            Ok(())
        } else {
            Err(ScrubError::config(format!("scene validation failed:\n{errors}")))
        }
    }

    /// Validate and build an engine with every element registered.
    #[tracing::instrument(level = "debug", skip_all, fields(elements = self.def.elements.len()))]
    pub(crate) fn build(&self) -> ScrubResult<BuiltScene> {
        self.validate()?;
        let engine = Engine::new(self.def.engine)?;
        let events: Rc<RefCell<Vec<RecordedEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let mut elements = Vec::with_capacity(self.def.elements.len());

        for (i, el) in self.def.elements.iter().enumerate() {
            let path = [PathElem::Field("elements"), PathElem::Index(i)];
            let mut errors = Errors(Vec::new());
            let layout = LayoutBox::new(el.rect.to_rect());
            let Some(spec) = compile_element(el, &path, &mut errors, Some((&layout, i, &events)))
            else {
                return Err(ScrubError::config(errors.to_string()));
            };
            let registration = engine.track(spec)?;
            engine.adopt(registration.disposer);
            elements.push(BuiltElement {
                name: el.name.clone(),
                id: registration.id,
                layout,
            });
        }

        Ok(BuiltScene {
            engine,
            elements,
            events,
        })
    }
}

fn validate_engine(def: &SceneDef, errors: &mut Errors) {
    let cfg = &def.engine;
    errors.check(
        &[PathElem::Field("engine"), PathElem::Field("viewport")],
        cfg.viewport.validate(),
    );
    errors.check(
        &[PathElem::Field("engine"), PathElem::Field("scroll")],
        cfg.scroll.validate(),
    );
    if !cfg.max_frame_delta.is_finite() || cfg.max_frame_delta <= 0.0 {
        errors.push(
            &[PathElem::Field("engine"), PathElem::Field("max_frame_delta")],
            "max_frame_delta must be finite and > 0",
        );
    }
}

type Hookup<'a> = (&'a Rc<LayoutBox>, usize, &'a Rc<RefCell<Vec<RecordedEvent>>>);

/// Convert one element definition, recording every problem under `path`.
///
/// With `hookup` set the pin hooks record into the shared event log; otherwise the result is
/// only used for validation.
fn compile_element(
    el: &ElementDef,
    path: &[PathElem],
    errors: &mut Errors,
    hookup: Option<Hookup<'_>>,
) -> Option<TriggerSpec> {
    let before = errors.0.len();
    let at = |field: &'static str| {
        let mut p = path.to_vec();
        p.push(PathElem::Field(field));
        p
    };

    if !el.rect.is_valid() {
        errors.push(&at("rect"), "rect must be finite with non-negative size");
    }

    let start = match &el.start {
        Some(s) => errors.check(&at("start"), s.parse::<Marker>()),
        None => Some(Marker::default_start()),
    };
    if let Some(m) = start
        && m.is_relative()
    {
        errors.push(
            &at("start"),
            format!("relative marker \"{m}\" is only valid as an end marker"),
        );
    }
    let end = match &el.end {
        Some(s) => errors.check(&at("end"), s.parse::<Marker>()),
        None => Some(Marker::default_end()),
    };

    errors.check(&at("smoothing"), SignalSmoother::new(&el.smoothing));

    let mut channels = Vec::new();
    for (ci, c) in el.channels.iter().enumerate() {
        let mut p = at("channels");
        p.push(PathElem::Index(ci));
        let named = Channel::new(c.stops.clone())
            .and_then(|ch| NamedChannel::new(c.property.clone(), ch));
        if let Some(named) = errors.check(&p, named) {
            channels.push(named);
        }
    }
    for (ti, t) in el.templates.iter().enumerate() {
        let mut p = at("templates");
        p.push(PathElem::Index(ti));
        if t.count == 0 {
            errors.push(&p, "template count must be >= 1");
            continue;
        }
        if let Some(template) = errors.check(&p, ChannelTemplate::new(t.stops.clone())) {
            for index in 0..t.count {
                let named = NamedChannel::new(
                    format!("{}[{index}]", t.property),
                    template.instantiate(index),
                );
                if let Some(named) = errors.check(&p, named) {
                    channels.push(named);
                }
            }
        }
    }

    let pin = el
        .pin
        .as_ref()
        .and_then(|def| compile_pin(def, &at("pin"), errors));
    if let Some(reveal) = el.reveal {
        errors.check(&at("reveal"), RevealGroup::new(reveal));
    }

    if errors.0.len() > before {
        return None;
    }
    let (start, end) = (start?, end?);
    let layout = hookup.map(|(layout, _, _)| Rc::clone(layout));
    let mut spec = TriggerSpec::new(layout.unwrap_or_else(|| LayoutBox::new(el.rect.to_rect())));
    spec.start = start;
    spec.end = end;
    spec.smoothing = el.smoothing;
    spec.channels = channels;
    spec.reveal = el.reveal;
    if let Some(mut pin) = pin {
        if let Some((_, index, events)) = hookup {
            let (enter_log, leave_log) = (Rc::clone(events), Rc::clone(events));
            pin = pin
                .on_enter(move |event| {
                    enter_log.borrow_mut().push(RecordedEvent {
                        element: index,
                        event: *event,
                    });
                    Ok(())
                })
                .on_leave(move |event| {
                    leave_log.borrow_mut().push(RecordedEvent {
                        element: index,
                        event: *event,
                    });
                    Ok(())
                });
        }
        spec.pin = Some(pin);
    }
    Some(spec)
}

fn compile_pin(def: &PinDef, path: &[PathElem], errors: &mut Errors) -> Option<PinSpec> {
    let distance: Extent = errors.check(path, def.distance.parse::<Extent>())?;
    let make = || {
        PinSpec::new(distance)
            .with_spacing(def.pin_spacing)
            .with_hysteresis(def.hysteresis)
    };
    errors.check(path, PinController::new(make()))?;
    Some(make())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/loader.rs"]
mod tests;
