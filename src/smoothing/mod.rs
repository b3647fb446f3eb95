//! Smoothing filters that turn raw progress into an animated value.
//!
//! [`SignalSmoother`] is stepped once per frame with the latest raw progress and the frame
//! delta. Output is clamped to `[0, 1]` and never NaN; once the value rests at its target the
//! smoother reports no further changes until the target moves.

pub(crate) mod spring;

use crate::animation::ease::Ease;
use crate::animation::tween::Glide;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::{clamp01, finite_or};
use spring::{SpringConfig, spring_step};

/// Smoothing applied to a tracked element's raw progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// Use raw progress directly.
    #[default]
    None,
    /// Second-order spring.
    Spring(SpringConfig),
    /// Catch up to the target over `lag` seconds with an out-cubic glide.
    Scrub {
        /// Catch-up time in seconds; `<= 0` degrades to pass-through.
        lag: f64,
    },
}

impl Smoothing {
    /// Validate coefficients that have no fallback path.
    pub fn validate(&self) -> ScrubResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Spring(cfg) => cfg.validate(),
            Self::Scrub { lag } => {
                if lag.is_finite() {
                    Ok(())
                } else {
                    Err(ScrubError::config("scrub lag must be finite"))
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Mode {
    Passthrough,
    Spring {
        cfg: SpringConfig,
        velocity: f64,
        at_rest: u32,
    },
    Scrub {
        lag: f64,
        glide: Option<Glide>,
    },
}

/// Stateful filter from a raw progress signal to a smoothed one.
#[derive(Clone, Debug)]
pub struct SignalSmoother {
    mode: Mode,
    current: f64,
    target: f64,
    primed: bool,
    settled: bool,
}

impl SignalSmoother {
    /// Build a smoother. Degenerate spring or scrub parameters select pass-through.
    pub fn new(smoothing: &Smoothing) -> ScrubResult<Self> {
        smoothing.validate()?;
        let mode = match *smoothing {
            Smoothing::None => Mode::Passthrough,
            Smoothing::Spring(cfg) if cfg.is_degenerate() => {
                tracing::debug!(?cfg, "degenerate spring, using pass-through");
                Mode::Passthrough
            }
            Smoothing::Spring(cfg) => Mode::Spring {
                cfg,
                velocity: 0.0,
                at_rest: 0,
            },
            Smoothing::Scrub { lag } if lag <= 0.0 => Mode::Passthrough,
            Smoothing::Scrub { lag } => Mode::Scrub { lag, glide: None },
        };
        Ok(Self {
            mode,
            current: 0.0,
            target: 0.0,
            primed: false,
            settled: true,
        })
    }

    /// Feed the latest raw value and frame delta. Returns the new output when it changed.
    ///
    /// The first call primes the smoother at `target` and always reports it.
    pub fn step(&mut self, target: f64, dt: f64) -> Option<f64> {
        let target = finite_or(target, 0.0);
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        if !self.primed {
            self.primed = true;
            self.current = target;
            self.target = target;
            self.settled = true;
            return Some(self.value());
        }

        let before = self.value();
        if target != self.target {
            self.retarget(target);
        }
        if self.settled {
            return None;
        }

        match &mut self.mode {
            Mode::Passthrough => {
                self.current = self.target;
                self.settled = true;
            }
            Mode::Spring {
                cfg,
                velocity,
                at_rest,
            } => {
                if dt > 0.0 {
                    let (x, v) = spring_step(self.current - self.target, *velocity, dt, cfg);
                    if x.is_finite() && v.is_finite() {
                        self.current = self.target + x;
                        *velocity = v;
                    } else {
                        self.current = self.target;
                        *velocity = 0.0;
                    }
                    if (self.target - self.current).abs() < cfg.rest_delta {
                        *at_rest += 1;
                        if *at_rest >= cfg.settle_frames {
                            self.current = self.target;
                            *velocity = 0.0;
                            self.settled = true;
                        }
                    } else {
                        *at_rest = 0;
                    }
                }
            }
            Mode::Scrub { glide, .. } => match glide {
                Some(g) => {
                    self.current = g.advance(dt);
                    if g.is_done() {
                        self.current = self.target;
                        self.settled = true;
                    }
                }
                None => {
                    self.current = self.target;
                    self.settled = true;
                }
            },
        }

        let after = self.value();
        (after != before).then_some(after)
    }

    fn retarget(&mut self, target: f64) {
        self.target = target;
        self.settled = false;
        match &mut self.mode {
            Mode::Passthrough => {}
            Mode::Spring { at_rest, .. } => *at_rest = 0,
            Mode::Scrub { lag, glide } => match glide {
                Some(g) if !g.is_done() => g.retarget(target),
                _ => *glide = Some(Glide::new(self.current, target, *lag, Ease::OutCubic)),
            },
        }
    }

    /// Current output, clamped to `[0, 1]`.
    pub fn value(&self) -> f64 {
        clamp01(self.current)
    }

    /// Latest target fed to [`Self::step`].
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether the output rests at the target.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Whether this smoother forwards raw values unchanged.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.mode, Mode::Passthrough)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/smoothing/smoother.rs"]
mod tests;
