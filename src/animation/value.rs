use crate::foundation::core::Vec2;
use crate::foundation::error::{ScrubError, ScrubResult};
use std::fmt;
use std::str::FromStr;

/// Interpolation contract for channel value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;

    /// Whether `a` and `b` can share one channel. Checked when a channel is defined.
    fn compatible(_a: &Self, _b: &Self) -> bool {
        true
    }
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Unit attached to a [`Length`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Pixels.
    Px,
    /// Percent of the target's own extent.
    Percent,
    /// Percent of the viewport height.
    Vh,
    /// Percent of the viewport width.
    Vw,
    /// Degrees.
    Deg,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Vh => "vh",
            Self::Vw => "vw",
            Self::Deg => "deg",
        }
    }
}

/// A unit-bearing scalar such as `60%` or `-15vh`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    /// Numeric magnitude.
    pub value: f64,
    /// Unit of `value`.
    pub unit: Unit,
}

impl Length {
    /// Build a length.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Convert to pixels given the target extent and viewport size. Degrees pass through.
    pub fn to_px(self, own_extent: f64, viewport: crate::Viewport) -> f64 {
        match self.unit {
            Unit::Px | Unit::Deg => self.value,
            Unit::Percent => self.value / 100.0 * own_extent,
            Unit::Vh => self.value / 100.0 * viewport.height,
            Unit::Vw => self.value / 100.0 * viewport.width,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Length {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        let s = s.trim();
        // Longest suffixes first so "px" is not mistaken for a bare number.
        let units = [
            ("deg", Unit::Deg),
            ("px", Unit::Px),
            ("vh", Unit::Vh),
            ("vw", Unit::Vw),
            ("%", Unit::Percent),
        ];
        let (num, unit) = units
            .iter()
            .find_map(|(suffix, unit)| s.strip_suffix(suffix).map(|n| (n, *unit)))
            .unwrap_or((s, Unit::Px));
        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| ScrubError::config(format!("invalid length \"{s}\"")))?;
        if !value.is_finite() {
            return Err(ScrubError::config(format!("length \"{s}\" must be finite")));
        }
        Ok(Self { value, unit })
    }
}

impl Lerp for Length {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            value: a.value + (b.value - a.value) * t,
            unit: a.unit,
        }
    }

    fn compatible(a: &Self, b: &Self) -> bool {
        a.unit == b.unit
    }
}

/// Property value carried by a channel.
///
/// JSON form: a number is a scalar, `[x, y]` is a vector and a string such as `"-140%"` is a
/// [`Length`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Unitless scalar (opacity, scale, rotation in degrees).
    Scalar(f64),
    /// 2-D vector (translation).
    Vec2(Vec2),
    /// Unit-bearing scalar.
    Length(Length),
}

impl Value {
    /// Scalar view of this value; vectors yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Length(l) => Some(l.value),
            Self::Vec2(_) => None,
        }
    }

    /// `self + step * k`, when both values have the same kind and unit.
    pub fn add_scaled(&self, step: &Value, k: f64) -> Option<Value> {
        match (self, step) {
            (Self::Scalar(a), Self::Scalar(b)) => Some(Self::Scalar(a + b * k)),
            (Self::Vec2(a), Self::Vec2(b)) => Some(Self::Vec2(*a + *b * k)),
            (Self::Length(a), Self::Length(b)) if a.unit == b.unit => {
                Some(Self::Length(Length::new(a.value + b.value * k, a.unit)))
            }
            (Self::Length(a), Self::Scalar(b)) => {
                Some(Self::Length(Length::new(a.value + b * k, a.unit)))
            }
            _ => None,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::Vec2(v) => v.x.is_finite() && v.y.is_finite(),
            Self::Length(l) => l.value.is_finite(),
        }
    }

    pub(crate) fn kind_name(&self) -> String {
        match self {
            Self::Scalar(_) => "scalar".to_owned(),
            Self::Vec2(_) => "vec2".to_owned(),
            Self::Length(l) => format!("length({})", l.unit.suffix()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Length> for Value {
    fn from(v: Length) -> Self {
        Self::Length(v)
    }
}

impl Lerp for Value {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(f64::lerp(a, b, t)),
            (Self::Vec2(a), Self::Vec2(b)) => Self::Vec2(<Vec2 as Lerp>::lerp(a, b, t)),
            (Self::Length(a), Self::Length(b)) => Self::Length(Length::lerp(a, b, t)),
            // Channels reject mixed kinds up front; hold the lower value if one slips through.
            _ => *a,
        }
    }

    fn compatible(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Scalar(_), Self::Scalar(_)) | (Self::Vec2(_), Self::Vec2(_)) => true,
            (Self::Length(a), Self::Length(b)) => Length::compatible(a, b),
            _ => false,
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Scalar(v) => serializer.serialize_f64(*v),
            Self::Vec2(v) => serde::Serialize::serialize(&[v.x, v.y], serializer),
            Self::Length(l) => serializer.collect_str(l),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Pair([f64; 2]),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Scalar(v)),
            Repr::Pair([x, y]) => Ok(Self::Vec2(Vec2::new(x, y))),
            Repr::Str(s) => s
                .parse::<Length>()
                .map(Self::Length)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
