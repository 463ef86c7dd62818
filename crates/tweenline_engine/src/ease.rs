//! Easing curves that remap a normalized progress value.
//!
//! Named curves ([`Transition`] × [`EaseDir`]) are evaluated directly
//! by the frame clock. [`BezierCurve`]s are sampled manually every
//! tick. Both guarantee that `0.0` maps to `0.0` and `1.0` maps to
//! `1.0`.

use core::f32::consts::PI;

use bevy_math::Vec2;

/// Signature of a raw easing function.
pub type EaseFn = fn(t: f32) -> f32;

/// Family of a named easing curve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    #[default]
    Linear,
    Sine,
    Quint,
    Quart,
    Quad,
    Expo,
    Elastic,
    Cubic,
    Circ,
    Bounce,
    Back,
}

impl Transition {
    /// The "in" variant of this curve.
    pub fn ease_in_fn(self) -> EaseFn {
        match self {
            Transition::Linear => linear,
            Transition::Sine => sine_in,
            Transition::Quint => |t| t * t * t * t * t,
            Transition::Quart => |t| t * t * t * t,
            Transition::Quad => |t| t * t,
            Transition::Expo => expo_in,
            Transition::Elastic => elastic_in,
            Transition::Cubic => |t| t * t * t,
            Transition::Circ => circ_in,
            Transition::Bounce => |t| 1.0 - bounce_out(1.0 - t),
            Transition::Back => back_in,
        }
    }
}

/// Direction in which a [`Transition`] is applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EaseDir {
    In,
    Out,
    #[default]
    InOut,
    OutIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Named(Transition, EaseDir),
    Bezier(BezierCurve),
}

impl Default for Ease {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl Ease {
    pub const LINEAR: Self = Self::Named(Transition::Linear, EaseDir::In);

    pub const fn named(transition: Transition, dir: EaseDir) -> Self {
        Self::Named(transition, dir)
    }

    /// Cubic bezier timing curve from `(0, 0)` to `(1, 1)` with
    /// control points `(x1, y1)` and `(x2, y2)`.
    pub fn bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::Bezier(BezierCurve::new(x1, y1, x2, y2))
    }

    /// Whether the frame clock can evaluate this curve itself
    /// without a per-tick sampling callback.
    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, Ease::Named(..))
    }

    /// Remap `t` (clamped to `0..=1`).
    pub fn sample(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match self {
            Ease::Named(transition, dir) => {
                apply_dir(transition.ease_in_fn(), *dir, t)
            }
            Ease::Bezier(curve) => curve.get_y(t),
        }
    }
}

fn apply_dir(ease_in: EaseFn, dir: EaseDir, t: f32) -> f32 {
    let ease_out = |t: f32| 1.0 - ease_in(1.0 - t);

    match dir {
        EaseDir::In => ease_in(t),
        EaseDir::Out => ease_out(t),
        EaseDir::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) * 0.5
            } else {
                0.5 + ease_out(t * 2.0 - 1.0) * 0.5
            }
        }
        EaseDir::OutIn => {
            if t < 0.5 {
                ease_out(t * 2.0) * 0.5
            } else {
                0.5 + ease_in(t * 2.0 - 1.0) * 0.5
            }
        }
    }
}

fn linear(t: f32) -> f32 {
    t
}

fn sine_in(t: f32) -> f32 {
    1.0 - (t * PI / 2.0).cos()
}

fn expo_in(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        2.0_f32.powf(10.0 * t - 10.0)
    }
}

fn elastic_in(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }

    let c4 = (2.0 * PI) / 3.0;
    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
}

fn circ_in(t: f32) -> f32 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn back_in(t: f32) -> f32 {
    let c1 = 1.70158;
    let c3 = c1 + 1.0;

    c3 * t * t * t - c1 * t * t
}

fn bounce_out(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

/// A cubic bezier timing curve anchored at `(0, 0)` and `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierCurve {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl BezierCurve {
    /// Bisection steps used to invert the x polynomial.
    const ITERATIONS: usize = 24;
    const TOLERANCE: f32 = 1e-6;

    /// Control point x components are clamped to `0..=1` so that x
    /// stays monotonic.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            p1: Vec2::new(x1.clamp(0.0, 1.0), y1),
            p2: Vec2::new(x2.clamp(0.0, 1.0), y2),
        }
    }

    /// Evaluate the curve height at horizontal position `x`.
    pub fn get_y(&self, x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        if self.p1 == Vec2::ZERO && self.p2 == Vec2::ONE {
            return x;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut mid = x;
        for _ in 0..Self::ITERATIONS {
            let sample = cubic(self.p1.x, self.p2.x, mid);
            if (sample - x).abs() < Self::TOLERANCE {
                break;
            }
            if sample < x {
                lo = mid;
            } else {
                hi = mid;
            }
            mid = 0.5 * (lo + hi);
        }

        cubic(self.p1.y, self.p2.y, mid)
    }
}

/// 1D cubic bezier with `p0 = 0` and `p3 = 1`.
#[inline]
fn cubic(p1: f32, p2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSITIONS: [Transition; 11] = [
        Transition::Linear,
        Transition::Sine,
        Transition::Quint,
        Transition::Quart,
        Transition::Quad,
        Transition::Expo,
        Transition::Elastic,
        Transition::Cubic,
        Transition::Circ,
        Transition::Bounce,
        Transition::Back,
    ];

    const DIRS: [EaseDir; 4] =
        [EaseDir::In, EaseDir::Out, EaseDir::InOut, EaseDir::OutIn];

    #[test]
    fn named_endpoints_are_exact() {
        for transition in TRANSITIONS {
            for dir in DIRS {
                let ease = Ease::named(transition, dir);
                assert_eq!(ease.sample(0.0), 0.0, "{ease:?}");
                assert_eq!(ease.sample(1.0), 1.0, "{ease:?}");
                assert_eq!(ease.sample(-3.0), 0.0, "{ease:?}");
                assert_eq!(ease.sample(7.0), 1.0, "{ease:?}");
            }
        }
    }

    #[test]
    fn in_out_is_symmetric() {
        let ease = Ease::named(Transition::Cubic, EaseDir::InOut);
        assert!((ease.sample(0.5) - 0.5).abs() < 1e-6);
        assert!((ease.sample(0.25) + ease.sample(0.75) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn quad_in() {
        let ease = Ease::named(Transition::Quad, EaseDir::In);
        assert!((ease.sample(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn bezier_boundaries() {
        let curve = BezierCurve::new(0.42, 0.0, 0.58, 1.0);
        assert_eq!(curve.get_y(0.0), 0.0);
        assert_eq!(curve.get_y(1.0), 1.0);
        assert!((curve.get_y(0.5) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn bezier_linear_fast_path() {
        let curve = BezierCurve::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(curve.get_y(0.3), 0.3);
    }

    #[test]
    fn bezier_is_monotonic_for_ease_in() {
        let ease = Ease::bezier(0.42, 0.0, 1.0, 1.0);
        let mut last = 0.0;
        for i in 1..=20 {
            let y = ease.sample(i as f32 / 20.0);
            assert!(y >= last);
            last = y;
        }
        assert!(ease.is_native() == false);
    }
}
