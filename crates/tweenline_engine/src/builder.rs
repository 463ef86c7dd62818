//! Fluent construction of [`Sequence`]s.
//!
//! Every tweener added to a [`SequenceBuilder`] starts a new
//! [`Group`] unless [`SequenceBuilder::parallel`] was called right
//! before, in which case it joins the last group instead. Property
//! sub-builders ([`StepBuilder`], [`KeyframeBuilder`]) own their parent
//! builder and hand it back through `end()`.
//!
//! ```
//! use bevy_ecs::world::World;
//! use tweenline_engine::prelude::*;
//!
//! let mut world = World::new();
//! let entity = world
//!     .spawn(Properties::new().with("x", 0.0_f32).with("y", 0.0_f32))
//!     .id();
//!
//! let sequence = SequenceBuilder::new()
//!     .with_target(entity)
//!     .animate_steps("x")
//!     .to(10.0_f32, 1.0)
//!     .end()
//!     .parallel()
//!     .animate_steps("y")
//!     .to(1.0_f32, 1.0)
//!     .end()
//!     .build();
//!
//! assert_eq!(sequence.group_count(), 1);
//! ```

use std::rc::Rc;

use bevy_ecs::world::World;
use tracing::debug;

use crate::clock::Callback;
use crate::ease::Ease;
use crate::keyframe::{
    KeyValue, KeyframeCallback, PercentKeyframe, StepKeyframe,
};
use crate::property::Property;
use crate::sequence::{Group, Loops, ProcessMode, Sequence};
use crate::target::Target;
use crate::template::Template;
use crate::tweener::{
    CallbackTweener, PauseTweener, PropertyBlock, PropertyKeyPercentTweener,
    PropertyKeyStepTweener, Tweener,
};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    sequence: Sequence,
    /// Single use, reset by the next added tweener.
    parallel: bool,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `template`, aliasing its groups and copying its
    /// metadata.
    pub fn import(template: &Template) -> Self {
        Self {
            sequence: template.sequence().clone(),
            parallel: false,
        }
    }

    /// Make the next added tweener join the last group.
    #[must_use]
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    #[must_use]
    pub fn add(mut self, tweener: Tweener) -> Self {
        self.push(tweener);
        self
    }

    #[must_use]
    pub fn callback(self, f: impl Fn(&mut World) + 'static) -> Self {
        self.callback_after(0.0, f)
    }

    #[must_use]
    pub fn callback_after(
        self,
        delay: f32,
        f: impl Fn(&mut World) + 'static,
    ) -> Self {
        self.add(Tweener::Callback(CallbackTweener {
            delay,
            callback: Callback::new(f),
        }))
    }

    #[must_use]
    pub fn pause(self, delay: f32) -> Self {
        self.add(Tweener::Pause(PauseTweener { delay }))
    }

    /// Animate `property` through keyframes with explicit durations.
    pub fn animate_steps(self, property: impl Into<Property>) -> StepBuilder {
        StepBuilder {
            parent: self,
            tweener: PropertyKeyStepTweener::new(PropertyBlock {
                property: Some(property.into()),
                ..Default::default()
            }),
        }
    }

    /// Animate `property` through keyframes placed at percentages of
    /// a block duration.
    pub fn animate_keyframes(
        self,
        property: impl Into<Property>,
    ) -> KeyframeBuilder {
        KeyframeBuilder {
            parent: self,
            tweener: PropertyKeyPercentTweener::new(PropertyBlock {
                property: Some(property.into()),
                ..Default::default()
            }),
            last: None,
        }
    }

    /// Play `count` times, clamped to at least once.
    #[must_use]
    pub fn with_loops(mut self, count: u32) -> Self {
        self.sequence.loops = Loops::finite(count);
        self
    }

    #[must_use]
    pub fn infinite_loops(mut self) -> Self {
        self.sequence.loops = Loops::Infinite;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.sequence.speed = speed;
        self
    }

    /// Default block duration for percent keyframes.
    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.sequence.duration = duration;
        self
    }

    #[must_use]
    pub fn with_process_mode(mut self, process_mode: ProcessMode) -> Self {
        self.sequence.process_mode = process_mode;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<Target>) -> Self {
        self.sequence.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.sequence.property = Some(property.into());
        self
    }

    #[must_use]
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.sequence.ease = Some(ease);
        self
    }

    #[inline]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn build(self) -> Sequence {
        self.sequence
    }

    /// Snapshot the current state into a [`Template`]. The builder
    /// stays usable and detaches on its next structural write.
    pub fn freeze(&self) -> Template {
        Template::new(self.sequence.clone())
    }

    fn push(&mut self, tweener: Tweener) {
        let parallel = core::mem::take(&mut self.parallel);

        if Rc::strong_count(&self.sequence.groups) > 1 {
            debug!(
                origin = ?self.sequence.origin,
                parallel,
                "cloning shared group list before write"
            );
        }

        // Sequential writes copy the list of group pointers, parallel
        // writes additionally copy the last group.
        let groups = Rc::make_mut(&mut self.sequence.groups);
        match groups.last_mut() {
            Some(last) if parallel => Rc::make_mut(last).push(tweener),
            _ => groups.push(Rc::new(Group::new(tweener))),
        }
    }
}

/// Sub-builder for [`PropertyKeyStepTweener`]s.
#[must_use = "call `end()` to add the tweener to the sequence"]
pub struct StepBuilder {
    parent: SequenceBuilder,
    tweener: PropertyKeyStepTweener,
}

impl StepBuilder {
    pub fn on(mut self, target: impl Into<Target>) -> Self {
        self.tweener.block.target = Some(target.into());
        self
    }

    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.tweener.block.from = Some(value.into());
        self
    }

    /// Ease of every keyframe without its own.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.tweener.block.ease = Some(ease);
        self
    }

    pub fn relative_to_initial(mut self) -> Self {
        self.tweener.block.relative_to_initial = true;
        self
    }

    pub fn to(mut self, value: impl Into<Value>, duration: f32) -> Self {
        self.tweener
            .push(StepKeyframe::new(KeyValue::To(value.into()), duration));
        self
    }

    pub fn offset(mut self, delta: impl Into<Value>, duration: f32) -> Self {
        self.tweener.push(StepKeyframe::new(
            KeyValue::Offset(delta.into()),
            duration,
        ));
        self
    }

    /// Override the ease of the last keyframe.
    pub fn eased(mut self, ease: Ease) -> Self {
        if let Some(keyframe) = self.tweener.last_keyframe_mut() {
            keyframe.ease = Some(ease);
        }
        self
    }

    /// Attach a callback to the last keyframe, fired when its step
    /// begins.
    pub fn with_callback(
        mut self,
        f: impl Fn(&mut World, Target) + 'static,
    ) -> Self {
        if let Some(keyframe) = self.tweener.last_keyframe_mut() {
            keyframe.callback = Some(KeyframeCallback::new(f));
        }
        self
    }

    /// Add the tweener and return to the parent builder.
    pub fn end(self) -> SequenceBuilder {
        let mut parent = self.parent;
        parent.push(Tweener::KeyStep(self.tweener));
        parent
    }
}

/// Sub-builder for [`PropertyKeyPercentTweener`]s.
#[must_use = "call `end()` to add the tweener to the sequence"]
pub struct KeyframeBuilder {
    parent: SequenceBuilder,
    tweener: PropertyKeyPercentTweener,
    /// Index of the most recently inserted keyframe.
    last: Option<usize>,
}

impl KeyframeBuilder {
    pub fn on(mut self, target: impl Into<Target>) -> Self {
        self.tweener.block.target = Some(target.into());
        self
    }

    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.tweener.block.from = Some(value.into());
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.tweener.block.ease = Some(ease);
        self
    }

    pub fn relative_to_initial(mut self) -> Self {
        self.tweener.block.relative_to_initial = true;
        self
    }

    /// Explicit block duration, overrides the sequence default.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.tweener.duration = duration;
        self
    }

    pub fn keyframe_to(mut self, percent: f32, value: impl Into<Value>) -> Self {
        self.last = Some(self.tweener.insert(PercentKeyframe::new(
            percent,
            KeyValue::To(value.into()),
        )));
        self
    }

    pub fn keyframe_offset(
        mut self,
        percent: f32,
        delta: impl Into<Value>,
    ) -> Self {
        self.last = Some(self.tweener.insert(PercentKeyframe::new(
            percent,
            KeyValue::Offset(delta.into()),
        )));
        self
    }

    /// Override the ease of the last inserted keyframe.
    pub fn eased(mut self, ease: Ease) -> Self {
        if let Some(keyframe) =
            self.last.and_then(|i| self.tweener.keyframe_mut(i))
        {
            keyframe.ease = Some(ease);
        }
        self
    }

    pub fn with_callback(
        mut self,
        f: impl Fn(&mut World, Target) + 'static,
    ) -> Self {
        if let Some(keyframe) =
            self.last.and_then(|i| self.tweener.keyframe_mut(i))
        {
            keyframe.callback = Some(KeyframeCallback::new(f));
        }
        self
    }

    /// Add the tweener and return to the parent builder.
    pub fn end(self) -> SequenceBuilder {
        let mut parent = self.parent;
        parent.push(Tweener::KeyPercent(self.tweener));
        parent
    }
}
