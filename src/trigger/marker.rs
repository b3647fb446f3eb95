use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Rect, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};

/// Start marker used when none is given: element top meets viewport bottom.
pub const DEFAULT_START: &str = "top bottom";
/// End marker used when none is given: element bottom meets viewport top.
pub const DEFAULT_END: &str = "bottom top";

/// A line across an element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the extent measured from its top edge.
    Fraction(f64),
    /// Pixels from the top edge.
    Pixels(f64),
}

impl Anchor {
    /// Distance of the line from the top edge of an extent of `extent` pixels.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * extent,
            Self::Pixels(px) => px,
        }
    }

    fn parse(token: &str) -> ScrubResult<Self> {
        match token {
            "top" | "start" => return Ok(Self::Fraction(0.0)),
            "center" => return Ok(Self::Fraction(0.5)),
            "bottom" | "end" => return Ok(Self::Fraction(1.0)),
            _ => {}
        }
        if let Some(pct) = token.strip_suffix('%') {
            return Ok(Self::Fraction(parse_number(pct, token)? / 100.0));
        }
        let px = token.strip_suffix("px").unwrap_or(token);
        Ok(Self::Pixels(parse_number(px, token)?))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fraction(0.0) => f.write_str("top"),
            Self::Fraction(0.5) => f.write_str("center"),
            Self::Fraction(1.0) => f.write_str("bottom"),
            Self::Fraction(v) => write!(f, "{}%", v * 100.0),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// A scroll distance in pixels or as a percentage of the viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    /// Absolute pixels.
    Px(f64),
    /// Percent of the viewport height.
    Percent(f64),
}

impl Extent {
    /// Distance in pixels for a viewport of height `viewport_height`.
    pub fn resolve(self, viewport_height: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => pct / 100.0 * viewport_height,
        }
    }

    /// Whether the extent is strictly positive.
    pub fn is_positive(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v > 0.0,
        }
    }
}

impl FromStr for Extent {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        let s = s.trim();
        match s.strip_suffix('%') {
            Some(pct) => Ok(Self::Percent(parse_number(pct, s)?)),
            None => Ok(Self::Px(parse_number(s.strip_suffix("px").unwrap_or(s), s)?)),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Where a trigger starts or ends, as a scroll offset.
///
/// Parsed from strings:
/// - `"<element edge> <viewport edge>"`, e.g. `"top 92%"` or `"start end"`
/// - `"@1200"`, an absolute offset
/// - `"+=100%"` / `"+=400px"`, an offset relative to the start marker (end markers only)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Marker {
    /// Offset at which the element line meets the viewport line.
    Edge {
        /// Line on the element.
        element: Anchor,
        /// Line on the viewport.
        viewport: Anchor,
    },
    /// Fixed scroll offset.
    Absolute(f64),
    /// Start offset plus an extent.
    Relative(Extent),
}

impl Marker {
    /// The default start marker.
    pub fn default_start() -> Self {
        Self::Edge {
            element: Anchor::Fraction(0.0),
            viewport: Anchor::Fraction(1.0),
        }
    }

    /// The default end marker.
    pub fn default_end() -> Self {
        Self::Edge {
            element: Anchor::Fraction(1.0),
            viewport: Anchor::Fraction(0.0),
        }
    }

    /// Whether this marker depends on a start offset.
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::Relative(_))
    }

    /// Scroll offset for an element at `bounds`, relative markers measured from `start`.
    pub fn offset(&self, bounds: Rect, viewport: Viewport, start: f64) -> f64 {
        match *self {
            Self::Edge {
                element,
                viewport: line,
            } => bounds.y0 + element.resolve(bounds.height()) - line.resolve(viewport.height),
            Self::Absolute(offset) => offset,
            Self::Relative(extent) => start + extent.resolve(viewport.height),
        }
    }

    /// Resolve a start marker. Relative markers are rejected.
    pub fn resolve_start(&self, bounds: Rect, viewport: Viewport) -> ScrubResult<f64> {
        if self.is_relative() {
            return Err(ScrubError::marker(format!(
                "relative marker \"{self}\" is only valid as an end marker"
            )));
        }
        Ok(self.offset(bounds, viewport, 0.0))
    }
}

impl FromStr for Marker {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("+=") {
            let extent: Extent = rest
                .parse()
                .map_err(|_| ScrubError::marker(format!("invalid relative marker \"{s}\"")))?;
            return Ok(Self::Relative(extent));
        }
        if let Some(rest) = s.strip_prefix('@') {
            return Ok(Self::Absolute(parse_number(rest, s)?));
        }
        let mut tokens = s.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(el), Some(vp), None) => Ok(Self::Edge {
                element: Anchor::parse(el)?,
                viewport: Anchor::parse(vp)?,
            }),
            _ => Err(ScrubError::marker(format!(
                "marker \"{s}\" must be \"<element edge> <viewport edge>\", \"@N\" or \"+=N\""
            ))),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge { element, viewport } => write!(f, "{element} {viewport}"),
            Self::Absolute(offset) => write!(f, "@{offset}"),
            Self::Relative(extent) => write!(f, "+={extent}"),
        }
    }
}

impl serde::Serialize for Marker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Marker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_number(num: &str, whole: &str) -> ScrubResult<f64> {
    let v: f64 = num
        .trim()
        .parse()
        .map_err(|_| ScrubError::marker(format!("invalid marker value \"{whole}\"")))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ScrubError::marker(format!("marker value \"{whole}\" must be finite")))
    }
}

/// Normalized progress of `pos` between `start` and `end`.
///
/// When `end <= start` progress is a step: 1 at or past `start`, else 0.
pub fn raw_progress(pos: f64, start: f64, end: f64) -> f64 {
    let pos = if pos.is_finite() { pos } else { 0.0 };
    if end <= start {
        return if pos >= start { 1.0 } else { 0.0 };
    }
    crate::foundation::math::clamp01((pos - start) / (end - start))
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/marker.rs"]
mod tests;
