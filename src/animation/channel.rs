use crate::animation::ease::Ease;
use crate::animation::value::{Lerp, Value};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::clamp01;

/// One keyframe control point of a [`Channel`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stop<T> {
    /// Progress stop in `[0, 1]`.
    pub at: f64,
    /// Value at this stop.
    pub value: T,
    /// Ease applied toward the next stop.
    #[serde(default)]
    pub ease: Ease,
}

impl<T> Stop<T> {
    /// A stop with linear easing toward the next one.
    pub fn new(at: f64, value: T) -> Self {
        Self {
            at,
            value,
            ease: Ease::Linear,
        }
    }

    /// Replace the ease toward the next stop.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Piecewise interpolation of one property over progress.
///
/// Construction validates the stop set; evaluation never fails.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel<T> {
    stops: Vec<Stop<T>>,
}

impl<T> Channel<T>
where
    T: Lerp + Clone,
{
    /// Define a channel from stops sorted by strictly increasing `at`.
    pub fn new(stops: Vec<Stop<T>>) -> ScrubResult<Self> {
        validate_stops(&stops)?;
        Ok(Self { stops })
    }

    /// Define a linearly interpolated channel from `(at, value)` pairs.
    pub fn linear(points: impl IntoIterator<Item = (f64, T)>) -> ScrubResult<Self> {
        Self::new(
            points
                .into_iter()
                .map(|(at, value)| Stop::new(at, value))
                .collect(),
        )
    }

    /// Evaluate the channel at `progress`. Out-of-range progress clamps to the end stops.
    pub fn evaluate(&self, progress: f64) -> T {
        let p = clamp01(progress);
        let idx = self.stops.partition_point(|s| s.at <= p);

        if idx == 0 {
            return self.stops[0].value.clone();
        }
        if idx >= self.stops.len() {
            return self.stops[self.stops.len() - 1].value.clone();
        }

        let a = &self.stops[idx - 1];
        let b = &self.stops[idx];
        let t = (p - a.at) / (b.at - a.at);
        T::lerp(&a.value, &b.value, a.ease.apply(t))
    }

    /// Borrow the validated stops.
    pub fn stops(&self) -> &[Stop<T>] {
        &self.stops
    }
}

fn validate_stops<T: Lerp>(stops: &[Stop<T>]) -> ScrubResult<()> {
    if stops.is_empty() {
        return Err(ScrubError::config("channel must have at least one stop"));
    }
    for (i, s) in stops.iter().enumerate() {
        if !s.at.is_finite() || !(0.0..=1.0).contains(&s.at) {
            return Err(ScrubError::config(format!(
                "channel stop {i} must lie in [0, 1], got {}",
                s.at
            )));
        }
        s.ease.validate()?;
    }
    if !stops.windows(2).all(|w| w[0].at < w[1].at) {
        return Err(ScrubError::config("channel stops must be strictly increasing"));
    }
    if !stops
        .windows(2)
        .all(|w| T::compatible(&w[0].value, &w[1].value))
    {
        return Err(ScrubError::config("channel stops must share one value kind and unit"));
    }
    Ok(())
}

impl Channel<Value> {
    pub(crate) fn check_values(&self) -> ScrubResult<()> {
        if self.stops.iter().all(|s| s.value.is_finite()) {
            return Ok(());
        }
        Err(ScrubError::config("channel values must be finite"))
    }
}

/// A channel bound to the property name it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedChannel {
    /// Property name reported in frame output (`"rotate_y"`, `"x"`).
    pub property: String,
    /// The interpolation itself.
    pub channel: Channel<Value>,
}

impl NamedChannel {
    /// Bind `channel` to `property`.
    pub fn new(property: impl Into<String>, channel: Channel<Value>) -> ScrubResult<Self> {
        channel.check_values()?;
        Ok(Self {
            property: property.into(),
            channel,
        })
    }
}

/// A stop whose value shifts with the instance index: `base + index * step`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndexedStop {
    /// Progress stop in `[0, 1]`.
    pub at: f64,
    /// Value for index 0.
    pub base: Value,
    /// Per-index increment; `None` keeps the stop constant across instances.
    #[serde(default)]
    pub step: Option<Value>,
    /// Ease applied toward the next stop.
    #[serde(default)]
    pub ease: Ease,
}

/// A parameterized channel definition instantiated once per item of a group.
///
/// Each instance owns its derived stops; nothing is shared or mutated between instances.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelTemplate {
    stops: Vec<IndexedStop>,
}

impl ChannelTemplate {
    /// Validate a template; checking index 0 fixes ordering, kinds and step compatibility.
    pub fn new(stops: Vec<IndexedStop>) -> ScrubResult<Self> {
        let template = Self { stops };
        let first = template.try_instantiate(0)?;
        first.check_values()?;
        Ok(template)
    }

    /// Derive the channel for item `index`.
    pub fn instantiate(&self, index: usize) -> Channel<Value> {
        let stops = self
            .stops
            .iter()
            .map(|s| Stop {
                at: s.at,
                value: shifted(s, index).unwrap_or(s.base),
                ease: s.ease,
            })
            .collect();
        Channel { stops }
    }

    fn try_instantiate(&self, index: usize) -> ScrubResult<Channel<Value>> {
        let mut stops = Vec::with_capacity(self.stops.len());
        for (i, s) in self.stops.iter().enumerate() {
            let value = shifted(s, index).ok_or_else(|| {
                ScrubError::config(format!(
                    "template stop {i}: step kind does not match base {}",
                    s.base.kind_name()
                ))
            })?;
            stops.push(Stop {
                at: s.at,
                value,
                ease: s.ease,
            });
        }
        Channel::new(stops)
    }
}

fn shifted(stop: &IndexedStop, index: usize) -> Option<Value> {
    match &stop.step {
        None => Some(stop.base),
        Some(step) => stop.base.add_scaled(step, index as f64),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/channel.rs"]
mod tests;
