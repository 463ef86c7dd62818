use thiserror::Error;

use crate::value::ValueKind;

/// Configuration errors raised while a sequence is being started.
///
/// These are programmer errors: they surface synchronously from
/// [`SequencePlayer::play`](crate::player::SequencePlayer::play) and
/// are never swallowed. A target that disappears while a sequence is
/// running is *not* an error, it is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    #[error("property block has no keyframes")]
    NoKeyframes,
    #[error("no target could be resolved for a property block")]
    MissingTarget,
    #[error("no property could be resolved for a property block")]
    MissingProperty,
    #[error(
        "percent keyframes need a positive duration, got explicit {explicit} and default {default}"
    )]
    MissingDuration { explicit: f32, default: f32 },
    #[error("cannot interpolate from {from:?} to {to:?}")]
    UnsupportedLerp { from: ValueKind, to: ValueKind },
    #[error("cannot offset a {value:?} by a {delta:?}")]
    UnsupportedOffset { value: ValueKind, delta: ValueKind },
    #[error("keyframe percent {0} is outside of 0..=1")]
    PercentOutOfRange(f32),
    #[error("expected a {expected:?} value, found {found:?}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
    #[error("an infinitely looping sequence must have a positive duration")]
    ZeroDurationLoop,
    #[error("the player has been killed")]
    Killed,
}
