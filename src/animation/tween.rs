use crate::animation::ease::Ease;
use crate::animation::value::{Lerp, Value};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::clamp01;

/// A time-based transition between two values.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    /// Value before and at the start.
    pub from: T,
    /// Value at and after the end.
    pub to: T,
    /// Duration in seconds. Zero jumps straight to `to` once started.
    pub duration: f64,
    /// Delay in seconds before the tween starts.
    pub delay: f64,
    /// Ease applied over the whole tween.
    pub ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    /// Linear tween of `duration` seconds without delay.
    pub fn new(from: T, to: T, duration: f64) -> Self {
        Self {
            from,
            to,
            duration,
            delay: 0.0,
            ease: Ease::Linear,
        }
    }

    /// Replace the ease.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Replace the start delay.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Check timing and value compatibility.
    pub fn validate(&self) -> ScrubResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ScrubError::config("tween duration must be finite and >= 0"));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ScrubError::config("tween delay must be finite and >= 0"));
        }
        if !T::compatible(&self.from, &self.to) {
            return Err(ScrubError::config("tween endpoints must share one value kind and unit"));
        }
        self.ease.validate()
    }

    /// Linear (un-eased) progress at time `t` relative to the tween's own origin.
    pub fn progress_at(&self, t: f64) -> f64 {
        let local = t - self.delay;
        if self.duration <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        clamp01(local / self.duration)
    }

    /// Value at time `t`.
    pub fn sample(&self, t: f64) -> T {
        T::lerp(&self.from, &self.to, self.ease.apply(self.progress_at(t)))
    }

    /// Time at which the tween completes.
    pub fn end_time(&self) -> f64 {
        self.delay + self.duration
    }
}

/// Retargetable eased transition over a fixed duration.
///
/// Output always lies between the glide's origin and its target.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Glide {
    from: f64,
    to: f64,
    elapsed: f64,
    duration: f64,
    ease: Ease,
}

impl Glide {
    pub(crate) fn new(from: f64, to: f64, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
            ease,
        }
    }

    /// Restart from the current value toward `to`.
    pub(crate) fn retarget(&mut self, to: f64) {
        let current = self.value();
        *self = Self::new(current, to, self.duration, self.ease);
    }

    pub(crate) fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt;
        self.value()
    }

    pub(crate) fn value(&self) -> f64 {
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return self.to;
        }
        let e = clamp01(self.ease.apply(self.elapsed / self.duration));
        self.from + (self.to - self.from) * e
    }

    pub(crate) fn target(&self) -> f64 {
        self.to
    }

    pub(crate) fn is_done(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}

/// Where a new entry is placed in a [`Sequence`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// After the previous entry ends.
    After,
    /// Together with the previous entry's start.
    With,
    /// Relative to the previous entry's end; negative values overlap.
    Offset(f64),
    /// At an absolute time in seconds.
    At(f64),
}

#[derive(Clone, Debug, PartialEq)]
struct SequenceEntry {
    property: String,
    start: f64,
    tween: Tween<Value>,
}

impl SequenceEntry {
    fn begins(&self) -> f64 {
        self.start + self.tween.delay
    }
}

/// Time-based timeline of property tweens.
///
/// A property holds the from-value of its first entry until that entry starts; afterwards the
/// latest started entry drives it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    default_duration: f64,
    default_ease: Ease,
    entries: Vec<SequenceEntry>,
    prev_start: f64,
    prev_end: f64,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    /// Empty sequence with 0.5 s linear defaults.
    pub fn new() -> Self {
        Self {
            default_duration: 0.5,
            default_ease: Ease::Linear,
            entries: Vec::new(),
            prev_start: 0.0,
            prev_end: 0.0,
        }
    }

    /// Empty sequence with the given entry defaults.
    pub fn with_defaults(duration: f64, ease: Ease) -> ScrubResult<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ScrubError::config("sequence default duration must be finite and >= 0"));
        }
        ease.validate()?;
        Ok(Self {
            default_duration: duration,
            default_ease: ease,
            ..Self::new()
        })
    }

    /// Append a tween from `from` to `to` using the defaults, after the previous entry.
    pub fn then(
        &mut self,
        property: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> ScrubResult<&mut Self> {
        let tween = self.default_tween(from.into(), to.into());
        self.add(property, tween, Position::After)
    }

    /// Add a tween using the defaults, starting together with the previous entry.
    pub fn with(
        &mut self,
        property: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> ScrubResult<&mut Self> {
        let tween = self.default_tween(from.into(), to.into());
        self.add(property, tween, Position::With)
    }

    /// Add a tween using the defaults at absolute time `time`.
    pub fn at(
        &mut self,
        time: f64,
        property: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> ScrubResult<&mut Self> {
        let tween = self.default_tween(from.into(), to.into());
        self.add(property, tween, Position::At(time))
    }

    fn default_tween(&self, from: Value, to: Value) -> Tween<Value> {
        Tween::new(from, to, self.default_duration).with_ease(self.default_ease)
    }

    /// Add a fully specified tween at `position`.
    pub fn add(
        &mut self,
        property: impl Into<String>,
        tween: Tween<Value>,
        position: Position,
    ) -> ScrubResult<&mut Self> {
        tween.validate()?;
        let start = match position {
            Position::After => self.prev_end,
            Position::With => self.prev_start,
            Position::Offset(dt) => self.prev_end + dt,
            Position::At(t) => t,
        };
        if !start.is_finite() {
            return Err(ScrubError::config("sequence position must be finite"));
        }
        let start = start.max(0.0);
        self.prev_start = start;
        self.prev_end = start + tween.end_time();
        self.entries.push(SequenceEntry {
            property: property.into(),
            start,
            tween,
        });
        Ok(self)
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.start + e.tween.end_time())
            .fold(0.0, f64::max)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sequence has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property values at time `t`, in order of each property's first appearance.
    ///
    /// Each property follows its latest-starting entry that has begun by `t`, ties going to the
    /// entry added last. Before any has begun it holds the from-value of the earliest one.
    pub fn sample(&self, t: f64) -> Vec<(String, Value)> {
        let mut picks: Vec<&SequenceEntry> = Vec::new();
        for entry in &self.entries {
            let Some(current) = picks.iter_mut().find(|e| e.property == entry.property) else {
                picks.push(entry);
                continue;
            };
            let (begins, held) = (entry.begins(), current.begins());
            let replace = if t >= begins {
                t < held || begins >= held
            } else {
                t < held && begins < held
            };
            if replace {
                *current = entry;
            }
        }
        picks
            .into_iter()
            .map(|e| (e.property.clone(), e.tween.sample(t - e.start)))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
