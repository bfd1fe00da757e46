//! Named easing curves for animation timing.
//!
//! A [`Tween`] maps normalized progress `t ∈ [0, 1]` to an eased blend
//! factor. The registry is total: [`Tween::from_name`] resolves unknown
//! names to [`Tween::Linear`] rather than failing, which keeps remote
//! callers with stale curve names working.
//!
//! Outputs are intentionally NOT clamped. The elastic, back, and bounce
//! curves overshoot their endpoints; the animator clamps the interpolated
//! values that need bounding (size, opacity), not the curve itself.

use std::f64::consts::TAU;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Easing curve identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tween {
    /// Constant velocity.
    #[default]
    Linear,
    /// Gentle exponential acceleration.
    Exp1,
    /// Steeper exponential acceleration.
    Exp2,
    /// Sharpest exponential acceleration.
    Exp3,
    /// Hold the start value; the target snaps to its destination on
    /// completion.
    Stop,
    /// Quadratic ease-in.
    InQuad,
    /// Cubic ease-in.
    InCubic,
    /// Ease-in that pulls back past the start before accelerating.
    InBack,
    /// Ease-in with an elastic wind-up.
    InElastic,
    /// Ease-out that springs past the end before settling.
    OutElastic,
    /// Ease-out that bounces against the end value.
    OutBounce,
}

impl Tween {
    /// Resolve a curve by wire name. Case-insensitive; unknown names fall
    /// back to `Linear`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "linear" => Self::Linear,
            "exp1" => Self::Exp1,
            "exp2" => Self::Exp2,
            "exp3" => Self::Exp3,
            "stop" => Self::Stop,
            "inquad" => Self::InQuad,
            "incubic" => Self::InCubic,
            "inback" => Self::InBack,
            "inelastic" => Self::InElastic,
            "outelastic" => Self::OutElastic,
            "outbounce" => Self::OutBounce,
            _ => Self::Linear,
        }
    }

    /// The wire name of this curve.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exp1 => "exp1",
            Self::Exp2 => "exp2",
            Self::Exp3 => "exp3",
            Self::Stop => "stop",
            Self::InQuad => "inquad",
            Self::InCubic => "incubic",
            Self::InBack => "inback",
            Self::InElastic => "inelastic",
            Self::OutElastic => "outelastic",
            Self::OutBounce => "outbounce",
        }
    }

    /// Evaluate the curve at normalized progress `t`.
    ///
    /// The caller normalizes `t` to `[0, 1]`; the output may leave that
    /// range for the overshooting curves.
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Exp1 => expo(t, 4.0),
            Self::Exp2 => expo(t, 7.0),
            Self::Exp3 => expo(t, 10.0),
            Self::Stop => 0.0,
            Self::InQuad => t * t,
            Self::InCubic => t * t * t,
            Self::InBack => in_back(t),
            Self::InElastic => in_elastic(t),
            Self::OutElastic => out_elastic(t),
            Self::OutBounce => out_bounce(t),
        }
    }
}

impl Serialize for Tween {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Tween {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Normalized exponential: `(e^(kt) - 1) / (e^k - 1)`. Larger `k` holds the
/// start longer and accelerates harder at the end.
fn expo(t: f64, k: f64) -> f64 {
    ((k * t).exp() - 1.0) / (k.exp() - 1.0)
}

fn in_back(t: f64) -> f64 {
    const S: f64 = 1.70158;
    t * t * ((S + 1.0) * t - S)
}

fn in_elastic(t: f64) -> f64 {
    const PERIOD: f64 = 0.3;
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = PERIOD / 4.0;
    -((2.0_f64).powf(10.0 * (t - 1.0)) * ((t - 1.0 - s) * TAU / PERIOD).sin())
}

fn out_elastic(t: f64) -> f64 {
    const PERIOD: f64 = 0.3;
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = PERIOD / 4.0;
    (2.0_f64).powf(-10.0 * t) * ((t - s) * TAU / PERIOD).sin() + 1.0
}

fn out_bounce(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}
