use std::fmt;
use std::rc::Rc;

use bevy_ecs::world::World;

use crate::ease::Ease;
use crate::error::TweenError;
use crate::target::Target;
use crate::value::Value;

/// Where a keyframe is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyValue {
    /// An absolute value.
    To(Value),
    /// A delta added on top of a base value.
    Offset(Value),
}

impl KeyValue {
    /// Resolve into an absolute value.
    ///
    /// Offsets are applied to `from` (the running value) unless
    /// `relative_to_initial` is set, in which case they apply to
    /// `initial` (the value the block started from).
    pub fn resolve(
        &self,
        from: &Value,
        initial: &Value,
        relative_to_initial: bool,
    ) -> Result<Value, TweenError> {
        match self {
            KeyValue::To(value) => Ok(*value),
            KeyValue::Offset(delta) => {
                let base = if relative_to_initial { initial } else { from };
                base.offset(delta)
            }
        }
    }
}

/// Side effect attached to a keyframe, called with the resolved
/// target when the keyframe's step begins.
#[derive(Clone)]
pub struct KeyframeCallback(Rc<dyn Fn(&mut World, Target)>);

impl KeyframeCallback {
    pub fn new(f: impl Fn(&mut World, Target) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, world: &mut World, target: Target) {
        (self.0)(world, target)
    }
}

impl PartialEq for KeyframeCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for KeyframeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyframeCallback(..)")
    }
}

/// A keyframe with its own explicit duration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepKeyframe {
    pub value: KeyValue,
    pub duration: f32,
    pub ease: Option<Ease>,
    pub callback: Option<KeyframeCallback>,
}

impl StepKeyframe {
    pub fn new(value: KeyValue, duration: f32) -> Self {
        Self {
            value,
            duration,
            ease: None,
            callback: None,
        }
    }
}

/// A keyframe placed at a fraction of the block duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentKeyframe {
    /// In `0..=1`.
    pub percent: f32,
    pub value: KeyValue,
    pub ease: Option<Ease>,
    pub callback: Option<KeyframeCallback>,
}

impl PercentKeyframe {
    pub fn new(percent: f32, value: KeyValue) -> Self {
        Self {
            percent,
            value,
            ease: None,
            callback: None,
        }
    }
}
