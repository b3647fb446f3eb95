use super::loader::{BuiltScene, Scene};
use super::model::{ScriptAction, ScriptStep};
use crate::engine::instance::Engine;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::scroll::source::ScrollSample;
use crate::trigger::pin::PinEvent;
use crate::trigger::tracker::TriggerFrame;

/// Output of one element in a [`FrameReport`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ElementReport {
    /// Element name from the scene.
    pub name: String,
    /// The element's frame output.
    #[serde(flatten)]
    pub frame: TriggerFrame,
}

/// A pin crossing in a [`FrameReport`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EventReport {
    /// Element name from the scene.
    pub element: String,
    /// The crossing.
    #[serde(flatten)]
    pub event: PinEvent,
}

/// Everything observable after one simulated frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Frame index.
    pub frame: u64,
    /// Loop time in seconds.
    pub time: f64,
    /// Scroll state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollSample>,
    /// Every registered element, in registration order.
    pub elements: Vec<ElementReport>,
    /// Pin crossings fired during the frame.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventReport>,
}

/// Overrides for the scene's simulation settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationOptions {
    /// Number of frames to run.
    pub frames: Option<u64>,
    /// Frames per second.
    pub fps: Option<f64>,
}

/// Steps a built scene frame by frame, applying its script.
pub struct Simulation {
    built: BuiltScene,
    script: Vec<ScriptStep>,
    cursor: usize,
    frame: u64,
    frames: u64,
    dt: f64,
}

impl Simulation {
    /// Validate and build `scene`.
    pub fn new(scene: &Scene, opts: SimulationOptions) -> ScrubResult<Self> {
        let def = scene.def();
        let fps = opts.fps.unwrap_or(def.simulation.fps);
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ScrubError::config("fps must be finite and > 0"));
        }
        let built = scene.build()?;
        let mut script = def.script.clone();
        script.sort_by_key(|s| s.frame);
        Ok(Self {
            built,
            script,
            cursor: 0,
            frame: 0,
            frames: opts.frames.unwrap_or(def.simulation.frames),
            dt: 1.0 / fps,
        })
    }

    /// Frames this simulation runs for.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The engine being driven.
    pub fn engine(&self) -> &Engine {
        &self.built.engine
    }

    /// Apply pending script steps, tick once and report. `None` once all frames ran.
    pub fn step(&mut self) -> Option<FrameReport> {
        if self.frame >= self.frames {
            return None;
        }
        while let Some(step) = self.script.get(self.cursor)
            && step.frame <= self.frame
        {
            let action = step.action.clone();
            self.cursor += 1;
            self.apply(&action);
        }

        let tick = self.built.engine.tick(self.dt);
        let elements = self
            .built
            .elements
            .iter()
            .filter_map(|e| {
                self.built.engine.latest(e.id).map(|frame| ElementReport {
                    name: e.name.clone(),
                    frame,
                })
            })
            .collect();
        let events = std::mem::take(&mut *self.built.events.borrow_mut())
            .into_iter()
            .map(|r| EventReport {
                element: self
                    .built
                    .elements
                    .get(r.element)
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                event: r.event,
            })
            .collect();

        self.frame += 1;
        Some(FrameReport {
            frame: tick.frame.0,
            time: tick.time,
            scroll: self.built.engine.scroll().latest(),
            elements,
            events,
        })
    }

    fn apply(&self, action: &ScriptAction) {
        let engine = &self.built.engine;
        let find = |name: &str| self.built.elements.iter().find(|e| e.name == name);
        match action {
            ScriptAction::ScrollTo(offset) => engine.scroll_to(*offset),
            ScriptAction::ScrollBy(delta) => engine.scroll_by(*delta),
            ScriptAction::Resize(viewport) => {
                if let Err(err) = engine.set_viewport(*viewport) {
                    tracing::warn!(%err, "resize ignored");
                }
            }
            ScriptAction::Layout { element, rect } => {
                if let Some(e) = find(element) {
                    e.layout.set(rect.to_rect());
                }
            }
            ScriptAction::Detach { element } => {
                if let Some(e) = find(element) {
                    e.layout.detach();
                }
            }
            ScriptAction::Remove { element } => {
                if let Some(e) = find(element) {
                    engine.unregister(e.id);
                }
            }
        }
    }

    /// Tear the engine down.
    pub fn finish(self) {
        self.built.engine.teardown();
    }
}

impl Iterator for Simulation {
    type Item = FrameReport;

    fn next(&mut self) -> Option<FrameReport> {
        self.step()
    }
}

/// Run `scene` to completion and collect every frame report.
pub fn simulate(scene: &Scene, opts: SimulationOptions) -> ScrubResult<Vec<FrameReport>> {
    let mut sim = Simulation::new(scene, opts)?;
    let reports = sim.by_ref().collect();
    sim.finish();
    Ok(reports)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/simulate.rs"]
mod tests;
