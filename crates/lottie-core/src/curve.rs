//! Native animation primitives handed to the compositing backend.
//!
//! A [`CurveAnimation`] is the equivalent of a basic or keyframe animation
//! object on a platform layer: values, normalized key times, a duration and
//! the media timing of the setup pass. The backend evaluates them over time;
//! [`CurveAnimation::sample`] exists for diagnostics and tests.

use crate::timing::TimingConfiguration;
use glam::{Vec2, Vec4};
use lottie_data::model::BezierPath;

#[derive(Debug, Clone, PartialEq)]
pub enum CurveValue {
    Scalar(f32),
    Point(Vec2),
    Color(Vec4),
    Bool(bool),
    Text(String),
    Path(BezierPath),
}

impl CurveValue {
    pub fn kind(&self) -> &'static str {
        match self {
            CurveValue::Scalar(_) => "scalar",
            CurveValue::Point(_) => "point",
            CurveValue::Color(_) => "color",
            CurveValue::Bool(_) => "bool",
            CurveValue::Text(_) => "text",
            CurveValue::Path(_) => "path",
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            CurveValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CurveValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpolates numeric values; everything else steps at `t >= 1`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (CurveValue::Scalar(a), CurveValue::Scalar(b)) => CurveValue::Scalar(a + (b - a) * t),
            (CurveValue::Point(a), CurveValue::Point(b)) => CurveValue::Point(a.lerp(*b, t)),
            (CurveValue::Color(a), CurveValue::Color(b)) => CurveValue::Color(a.lerp(*b, t)),
            _ if t < 1.0 => self.clone(),
            _ => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationMode {
    Linear,
    Discrete,
}

/// Cubic bezier easing between two keyframes, `(0,0)` to `(1,1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingFunction {
    pub c1: Vec2,
    pub c2: Vec2,
}

impl TimingFunction {
    pub const LINEAR: TimingFunction = TimingFunction {
        c1: Vec2::ZERO,
        c2: Vec2::ONE,
    };

    pub fn new(c1: Vec2, c2: Vec2) -> Self {
        Self { c1, c2 }
    }

    pub fn apply(&self, x: f32) -> f32 {
        if *self == Self::LINEAR {
            return x.clamp(0.0, 1.0);
        }
        solve_cubic_bezier(self.c1, self.c2, x)
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::LINEAR
    }
}

// Cubic Bezier Easing
pub fn solve_cubic_bezier(p1: Vec2, p2: Vec2, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Newton-Raphson
    let mut t = x;
    for _ in 0..8 {
        let one_minus_t = 1.0 - t;
        let x_est = 3.0 * one_minus_t * one_minus_t * t * p1.x
            + 3.0 * one_minus_t * t * t * p2.x
            + t * t * t;

        let err = x_est - x;
        if err.abs() < 1e-4 {
            break;
        }

        let dx_dt = 3.0 * one_minus_t * one_minus_t * p1.x
            + 6.0 * one_minus_t * t * (p2.x - p1.x)
            + 3.0 * t * t * (1.0 - p2.x);

        if dx_dt.abs() < 1e-6 {
            break;
        }
        t -= err / dx_dt;
    }

    let one_minus_t = 1.0 - t;
    3.0 * one_minus_t * one_minus_t * t * p1.y + 3.0 * one_minus_t * t * t * p2.y + t * t * t
}

#[derive(Debug, Clone, PartialEq)]
pub enum CurveKind {
    Basic {
        from: CurveValue,
        to: CurveValue,
    },
    Keyframes {
        values: Vec<CurveValue>,
        /// Progress of each value in the asset's timeline; never clamped.
        key_times: Vec<f64>,
        calculation_mode: CalculationMode,
        /// One per segment, `values.len() - 1` entries in linear mode.
        timing_functions: Vec<TimingFunction>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveAnimation {
    pub kind: CurveKind,
    /// Seconds for one forward pass.
    pub duration: f64,
    pub timing: TimingConfiguration,
    pub removed_on_completion: bool,
}

impl CurveAnimation {
    pub fn basic(
        from: CurveValue,
        to: CurveValue,
        duration: f64,
        timing: TimingConfiguration,
    ) -> Self {
        Self {
            kind: CurveKind::Basic { from, to },
            duration,
            timing,
            removed_on_completion: false,
        }
    }

    /// A curve holding `value` for the whole duration.
    pub fn fixed(value: CurveValue, duration: f64, timing: TimingConfiguration) -> Self {
        Self::basic(value.clone(), value, duration, timing)
    }

    pub fn keyframes(
        values: Vec<CurveValue>,
        key_times: Vec<f64>,
        calculation_mode: CalculationMode,
        timing_functions: Vec<TimingFunction>,
        duration: f64,
        timing: TimingConfiguration,
    ) -> Self {
        Self {
            kind: CurveKind::Keyframes {
                values,
                key_times,
                calculation_mode,
                timing_functions,
            },
            duration,
            timing,
            removed_on_completion: false,
        }
    }

    pub fn key_times(&self) -> &[f64] {
        match &self.kind {
            CurveKind::Basic { .. } => &[],
            CurveKind::Keyframes { key_times, .. } => key_times,
        }
    }

    pub fn values(&self) -> Vec<&CurveValue> {
        match &self.kind {
            CurveKind::Basic { from, to } => vec![from, to],
            CurveKind::Keyframes { values, .. } => values.iter().collect(),
        }
    }

    pub fn is_static(&self) -> bool {
        match &self.kind {
            CurveKind::Basic { from, to } => from == to,
            CurveKind::Keyframes { values, .. } => values.windows(2).all(|w| w[0] == w[1]),
        }
    }

    /// Value of the curve at `progress` of its duration, holding the first and
    /// last values outside of `[0, 1]`.
    pub fn sample(&self, progress: f64) -> Option<CurveValue> {
        match &self.kind {
            CurveKind::Basic { from, to } => {
                Some(from.lerp(to, progress.clamp(0.0, 1.0) as f32))
            }
            CurveKind::Keyframes {
                values,
                key_times,
                calculation_mode,
                timing_functions,
            } => {
                let first = values.first()?;
                let last = values.last()?;
                if progress < *key_times.first()? {
                    return Some(first.clone());
                }
                if progress >= *key_times.last()? || values.len() < 2 {
                    return Some(last.clone());
                }

                // Last key time not after `progress`; repeated key times jump.
                let index = (key_times.partition_point(|&t| t <= progress) - 1)
                    .min(values.len() - 2);
                let current = &values[index];
                let next = &values[index + 1];
                match calculation_mode {
                    CalculationMode::Discrete => Some(current.clone()),
                    CalculationMode::Linear => {
                        let span = key_times[index + 1] - key_times[index];
                        if span <= 0.0 {
                            return Some(next.clone());
                        }
                        let local = ((progress - key_times[index]) / span) as f32;
                        let eased = timing_functions
                            .get(index)
                            .map_or(local, |function| function.apply(local));
                        Some(current.lerp(next, eased))
                    }
                }
            }
        }
    }
}
