use crate::animation::ease::Ease;
use crate::animation::stagger::{Stagger, StaggerOrder};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::clamp01;

fn default_stagger() -> Stagger {
    Stagger::new(0.1, StaggerOrder::Forward)
}

fn default_duration() -> f64 {
    0.8
}

fn default_ease() -> Ease {
    Ease::OutExpo
}

/// Playback policy once the start marker has been reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealToggle {
    /// Play forward once and stay revealed.
    #[default]
    Once,
    /// Play forward past the start marker, backward before it.
    Reverse,
}

/// A staggered, time-based reveal of `targets` items.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealSpec {
    /// Number of items revealed.
    pub targets: usize,
    /// Per-item start delays.
    #[serde(default = "default_stagger")]
    pub stagger: Stagger,
    /// Per-item duration in seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Per-item ease.
    #[serde(default = "default_ease")]
    pub ease: Ease,
    /// Playback policy.
    #[serde(default)]
    pub toggle: RevealToggle,
}

impl RevealSpec {
    /// Reveal of `targets` items with the default stagger, duration and ease.
    pub fn new(targets: usize) -> Self {
        Self {
            targets,
            stagger: default_stagger(),
            duration: default_duration(),
            ease: default_ease(),
            toggle: RevealToggle::Once,
        }
    }
}

/// Per-frame reveal output.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RevealFrame {
    /// Seconds of playback accumulated.
    pub playhead: f64,
    /// Eased progress per item, in item order.
    pub progress: Vec<f64>,
}

/// Plays a [`RevealSpec`] when its trigger's start offset is reached.
#[derive(Clone, Debug)]
pub struct RevealGroup {
    spec: RevealSpec,
    delays: Vec<f64>,
    total: f64,
    playhead: f64,
    started: bool,
}

impl RevealGroup {
    /// Validate `spec` and schedule its delays.
    pub fn new(spec: RevealSpec) -> ScrubResult<Self> {
        if spec.targets == 0 {
            return Err(ScrubError::config("reveal needs at least one target"));
        }
        if !spec.duration.is_finite() || spec.duration < 0.0 {
            return Err(ScrubError::config("reveal duration must be finite and >= 0"));
        }
        spec.stagger.validate()?;
        spec.ease.validate()?;
        let delays = spec.stagger.schedule(spec.targets);
        let total = delays.iter().copied().fold(0.0, f64::max) + spec.duration;
        Ok(Self {
            spec,
            delays,
            total,
            playhead: 0.0,
            started: false,
        })
    }

    /// Start delays per item.
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// Seconds from first start to last finish.
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// Advance playback. `reached` is `None` while the trigger's geometry is unknown.
    pub fn update(&mut self, reached: Option<bool>, dt: f64) -> RevealFrame {
        if reached == Some(true) && !self.started {
            self.started = true;
            tracing::debug!(targets = self.spec.targets, "reveal playback started");
        }
        let step = match (self.spec.toggle, reached) {
            (_, None) => 0.0,
            (RevealToggle::Once, _) if self.started => dt,
            (RevealToggle::Once, _) => 0.0,
            (RevealToggle::Reverse, Some(true)) => dt,
            (RevealToggle::Reverse, Some(false)) => -dt,
        };
        self.playhead = (self.playhead + step).clamp(0.0, self.total);
        RevealFrame {
            playhead: self.playhead,
            progress: (0..self.delays.len())
                .map(|i| self.item_progress(i))
                .collect(),
        }
    }

    fn item_progress(&self, i: usize) -> f64 {
        let local = self.playhead - self.delays[i];
        let done = self.started && (self.playhead >= self.total || local >= self.spec.duration);
        let linear = if done {
            1.0
        } else if self.spec.duration <= 0.0 {
            0.0
        } else {
            clamp01(local / self.spec.duration)
        };
        self.spec.ease.apply(linear)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/reveal.rs"]
mod tests;
