use keyframe::EasingFunction;
use serde::{Deserialize, Serialize};

/// Supported easing curves for morph transitions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the easing curve at `x`.
    ///
    /// Input is clamped to `[0, 1]` and the endpoints are pinned, so
    /// `eval(0.0) == 0.0` and `eval(1.0) == 1.0` hold exactly for every curve.
    pub fn eval(&self, x: f64) -> f64 {
        if x <= 0.0 || x.is_nan() {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        self.y(x).clamp(0.0, 1.0)
    }
}

/// Linear interpolation that is exact at both ends (`t == 0` gives `a`, `t == 1` gives `b`).
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `f32` variant of [`lerp`] used on vertex data.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Wraps `value` into the half-open range `[min, max)`.
///
/// Returns `min` for an empty range.
pub fn wrap(min: f64, max: f64, value: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        return min;
    }
    let wrapped = ((value - min) % range + range) % range + min;
    // `(-tiny % range) + range` can round up to exactly `range`.
    if wrapped >= max {
        min
    } else {
        wrapped
    }
}

/// Maps `value` so that `from` becomes 0 and `to` becomes 1 (no clamping).
pub fn scoped(value: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if span == 0.0 {
        return 0.0;
    }
    (value - from) / span
}
