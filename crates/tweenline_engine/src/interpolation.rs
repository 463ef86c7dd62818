use bevy_color::LinearRgba;
use bevy_math::Vec2;

use crate::error::TweenError;
use crate::value::Value;

/// Trait for interpolating between 2 values based on a f32 `t` value.
pub trait Interpolation {
    /// Linearly interpolate between 2 values based on a f32 `t` value.
    ///
    /// `t == 1.0` must produce `b` exactly.
    fn interp(a: &Self, b: &Self, t: f32) -> Self;
}

macro_rules! impl_float_interpolation {
    ($ty:ty) => {
        impl Interpolation for $ty {
            #[inline]
            fn interp(a: &Self, b: &Self, t: f32) -> Self {
                (*a) * (1.0 - t) + (*b) * t
            }
        }
    };
}

impl_float_interpolation!(f32);
impl_float_interpolation!(Vec2);
impl_float_interpolation!(LinearRgba);

impl Interpolation for i32 {
    fn interp(a: &Self, b: &Self, t: f32) -> Self {
        let a = *a as f32;
        let b = *b as f32;

        // `as` truncates toward zero.
        (a * (1.0 - t) + b * t) as i32
    }
}

impl Value {
    /// Checks that `from` and `to` can be interpolated with each
    /// other.
    pub fn ensure_lerp(from: &Value, to: &Value) -> Result<(), TweenError> {
        if from.kind() != to.kind() || from.is_lerpable() == false {
            return Err(TweenError::UnsupportedLerp {
                from: from.kind(),
                to: to.kind(),
            });
        }

        Ok(())
    }

    /// Interpolate between 2 values of the same kind.
    ///
    /// `t` is not clamped, overshooting curves extrapolate past `to`.
    pub fn lerp(
        from: &Value,
        to: &Value,
        t: f32,
    ) -> Result<Value, TweenError> {
        Value::ensure_lerp(from, to)?;

        Ok(match (from, to) {
            (Value::Float(a), Value::Float(b)) => {
                Value::Float(f32::interp(a, b, t))
            }
            (Value::Vec2(a), Value::Vec2(b)) => {
                Value::Vec2(Vec2::interp(a, b, t))
            }
            (Value::Color(a), Value::Color(b)) => {
                Value::Color(LinearRgba::interp(a, b, t))
            }
            (Value::Int(a), Value::Int(b)) => {
                Value::Int(i32::interp(a, b, t))
            }
            _ => {
                return Err(TweenError::UnsupportedLerp {
                    from: from.kind(),
                    to: to.kind(),
                })
            }
        })
    }

    /// Add `delta` on top of this value, used by offset keyframes.
    pub fn offset(&self, delta: &Value) -> Result<Value, TweenError> {
        Ok(match (self, delta) {
            (Value::Float(a), Value::Float(b)) => Value::Float(a + b),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(*a + *b),
            (Value::Color(a), Value::Color(b)) => Value::Color(*a + *b),
            (Value::Int(a), Value::Int(b)) => {
                Value::Int(a.saturating_add(*b))
            }
            _ => {
                return Err(TweenError::UnsupportedOffset {
                    value: self.kind(),
                    delta: delta.kind(),
                })
            }
        })
    }
}
