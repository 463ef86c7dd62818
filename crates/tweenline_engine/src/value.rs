//! Animatable values and property names.
//!
//! [`Value`] is the closed set of kinds the engine knows how to
//! store, compare and interpolate. Every supported primitive converts
//! into a [`Value`] and back through [`PropertyValue`].

use std::borrow::{Borrow, Cow};
use std::fmt;

use bevy_color::LinearRgba;
use bevy_math::Vec2;

use crate::error::TweenError;

/// Name of an animatable attribute on a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyName(Cow<'static, str>);

impl PropertyName {
    pub const fn new_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for PropertyName {
    fn from(name: &'static str) -> Self {
        Self::new_static(name)
    }
}

impl From<String> for PropertyName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Borrow<str> for PropertyName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed animatable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f32),
    Vec2(Vec2),
    /// A color stored as 4 linear scalars.
    Color(LinearRgba),
    /// Interpolated in float space and truncated toward zero.
    Int(i32),
    /// Can be set but never interpolated.
    Bool(bool),
}

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Vec2,
    Color,
    Int,
    Bool,
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Color(_) => ValueKind::Color,
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Returns `true` if values of this kind have a lerp.
    #[inline]
    pub fn is_lerpable(&self) -> bool {
        self.kind() != ValueKind::Bool
    }

    /// Convert into a concrete primitive.
    pub fn get<T: PropertyValue>(self) -> Result<T, TweenError> {
        T::try_from(self)
    }
}

/// Primitive types that can be stored inside a [`Value`].
pub trait PropertyValue:
    Into<Value> + TryFrom<Value, Error = TweenError> + Clone + 'static
{
    const KIND: ValueKind;
}

macro_rules! impl_property_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = TweenError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(TweenError::TypeMismatch {
                        expected: ValueKind::$variant,
                        found: other.kind(),
                    }),
                }
            }
        }

        impl PropertyValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;
        }
    };
}

impl_property_value!(f32, Float);
impl_property_value!(Vec2, Vec2);
impl_property_value!(LinearRgba, Color);
impl_property_value!(i32, Int);
impl_property_value!(bool, Bool);
