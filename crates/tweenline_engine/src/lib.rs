//! [`World`]: bevy_ecs::world::World
//! [`Sequence`]: sequence::Sequence
//! [`SequenceBuilder`]: builder::SequenceBuilder
//! [`Template`]: template::Template
//! [`Tweener`]: tweener::Tweener
//! [`FrameClock`]: clock::FrameClock
//! [`SequencePlayer`]: player::SequencePlayer
//! [`Property`]: property::Property
//! [`Ease`]: ease::Ease
//!
//! # Tweenline Engine
//!
//! The scheduling and interpolation core of tweenline. It turns a
//! declarative description of "animate these properties, in this
//! order, with these curves" into time stamped operations fired by a
//! frame clock against a Bevy [`World`].
//!
//! ## Core Concepts
//!
//! - **[`Property`]**: A named attribute of a target entity that can
//!   be read, written and interpolated.
//!
//! - **[`Ease`]**: Remaps normalized progress, either through a named
//!   curve or a sampled bezier.
//!
//! - **[`Tweener`]**: One schedulable unit: a callback, a pause or a
//!   block of keyframes on a single property.
//!
//! - **[`Sequence`]**: Groups of tweeners. Tweeners in a group start
//!   together, groups run back to back. Built with a
//!   [`SequenceBuilder`].
//!
//! - **[`Template`]**: A frozen sequence that many builders and
//!   players can share. Builders derived from it copy storage lazily.
//!
//! - **[`SequencePlayer`]**: Computes the schedule of a sequence,
//!   registers it on its own [`FrameClock`] once per loop and reports
//!   completion through an awaitable loop status.

pub mod accessor;
pub mod builder;
pub mod clock;
pub mod ease;
pub mod error;
pub mod interpolation;
pub mod keyframe;
pub mod player;
pub mod property;
pub mod sequence;
pub mod target;
pub mod template;
pub mod tweener;
pub mod value;

pub mod prelude {
    pub use crate::accessor;
    pub use crate::accessor::Accessor;
    pub use crate::builder::{KeyframeBuilder, SequenceBuilder, StepBuilder};
    pub use crate::clock::{Callback, FrameClock};
    pub use crate::ease::{BezierCurve, Ease, EaseDir, Transition};
    pub use crate::error::TweenError;
    pub use crate::interpolation::Interpolation;
    pub use crate::keyframe::KeyValue;
    pub use crate::player::{
        LoopStatus, PlayOptions, PlayerState, SequencePlayer,
    };
    pub use crate::property::{Properties, Property};
    pub use crate::sequence::{Loops, ProcessMode, Sequence};
    pub use crate::target::Target;
    pub use crate::template::Template;
    pub use crate::tweener::Tweener;
    pub use crate::value::{PropertyName, Value, ValueKind};
}
