use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::ensure_finite;

fn default_mass() -> f64 {
    1.0
}

fn default_rest_delta() -> f64 {
    0.001
}

fn default_settle_frames() -> u32 {
    3
}

/// Second-order spring parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpringConfig {
    /// Spring constant `k`. Values `<= 0` degrade the smoother to pass-through.
    pub stiffness: f64,
    /// Damping coefficient `c`. Values `<= 0` degrade the smoother to pass-through.
    pub damping: f64,
    /// Mass `m`, must be `> 0`.
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Distance to the target under which the spring counts as at rest.
    #[serde(default = "default_rest_delta")]
    pub rest_delta: f64,
    /// Consecutive at-rest frames required before the value snaps and stops changing.
    #[serde(default = "default_settle_frames")]
    pub settle_frames: u32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: default_mass(),
            rest_delta: default_rest_delta(),
            settle_frames: default_settle_frames(),
        }
    }
}

impl SpringConfig {
    /// Spring with the given stiffness and damping and default mass/rest settings.
    pub fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            ..Self::default()
        }
    }

    /// Reject coefficients that have no pass-through fallback.
    pub fn validate(&self) -> ScrubResult<()> {
        ensure_finite("spring stiffness", self.stiffness)?;
        ensure_finite("spring damping", self.damping)?;
        ensure_finite("spring mass", self.mass)?;
        ensure_finite("spring rest_delta", self.rest_delta)?;
        if self.mass <= 0.0 {
            return Err(ScrubError::config("spring mass must be > 0"));
        }
        if self.rest_delta < 0.0 {
            return Err(ScrubError::config("spring rest_delta must be >= 0"));
        }
        if self.settle_frames == 0 {
            return Err(ScrubError::config("spring settle_frames must be >= 1"));
        }
        Ok(())
    }

    /// Whether these parameters fall back to pass-through.
    pub fn is_degenerate(&self) -> bool {
        self.stiffness <= 0.0 || self.damping <= 0.0
    }

    /// Damping ratio `c / (2 sqrt(k m))`.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// Advance displacement `x` (current minus target) and velocity `v` by `dt` seconds.
///
/// Uses the closed-form damped oscillator solution, so the result is exact for any `dt`.
pub(crate) fn spring_step(x: f64, v: f64, dt: f64, cfg: &SpringConfig) -> (f64, f64) {
    let k = cfg.stiffness;
    let m = cfg.mass;
    let w0 = (k / m).sqrt();
    let zeta = cfg.damping_ratio();

    if (zeta - 1.0).abs() < 1e-6 {
        // Critically damped.
        let e = (-w0 * dt).exp();
        let b = v + w0 * x;
        (e * (x + b * dt), e * (v - w0 * b * dt))
    } else if zeta < 1.0 {
        // Underdamped.
        let a = zeta * w0;
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        let e = (-a * dt).exp();
        let (s, c) = (wd * dt).sin_cos();
        let b = (v + a * x) / wd;
        let xn = e * (x * c + b * s);
        let vn = e * (v * c - (a * v + w0 * w0 * x) / wd * s);
        (xn, vn)
    } else {
        // Overdamped.
        let z2 = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - z2);
        let r2 = -w0 * (zeta + z2);
        let c2 = (v - r1 * x) / (r2 - r1);
        let c1 = x - c2;
        let e1 = (r1 * dt).exp();
        let e2 = (r2 * dt).exp();
        (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
    }
}
