//! Atomic schedulable units of a sequence.
//!
//! A [`Tweener`] has no clock of its own. [`Tweener::start`] turns the
//! declared keyframes into [`Schedule`] entries, given the offset its
//! group starts at and the defaults inherited from the sequence and
//! the player, and returns how much time it consumes.

use bevy_ecs::world::World;
use tracing::warn;

use crate::clock::{Callback, Interpolate, Sampler, Schedule};
use crate::ease::Ease;
use crate::error::TweenError;
use crate::keyframe::{KeyframeCallback, PercentKeyframe, StepKeyframe};
use crate::property::Property;
use crate::target::Target;
use crate::value::Value;

/// Defaults and output shared by every tweener of one play.
pub struct StartCtx<'a> {
    pub world: &'a World,
    pub schedule: &'a mut Schedule,
    pub default_target: Option<Target>,
    pub default_property: Option<&'a Property>,
    pub default_ease: Option<Ease>,
    /// Fallback block duration for percent keyframes.
    pub duration_hint: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tweener {
    Callback(CallbackTweener),
    Pause(PauseTweener),
    KeyStep(PropertyKeyStepTweener),
    KeyPercent(PropertyKeyPercentTweener),
}

impl Tweener {
    /// Emit schedule entries starting at `initial_delay` and return the
    /// consumed duration.
    pub fn start(
        &self,
        ctx: &mut StartCtx<'_>,
        initial_delay: f32,
    ) -> Result<f32, TweenError> {
        match self {
            Tweener::Callback(tweener) => Ok(tweener.start(ctx, initial_delay)),
            Tweener::Pause(tweener) => Ok(tweener.delay),
            Tweener::KeyStep(tweener) => tweener.start(ctx, initial_delay),
            Tweener::KeyPercent(tweener) => {
                tweener.start(ctx, initial_delay)
            }
        }
    }

    /// Number of declared steps (keyframes, or 1 for callbacks and
    /// pauses).
    pub fn step_count(&self) -> usize {
        match self {
            Tweener::Callback(_) | Tweener::Pause(_) => 1,
            Tweener::KeyStep(tweener) => tweener.keyframes.len(),
            Tweener::KeyPercent(tweener) => tweener.keyframes.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackTweener {
    pub delay: f32,
    pub callback: Callback,
}

impl CallbackTweener {
    fn start(&self, ctx: &mut StartCtx<'_>, initial_delay: f32) -> f32 {
        ctx.schedule
            .schedule_callback(initial_delay + self.delay, self.callback.clone());
        self.delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseTweener {
    pub delay: f32,
}

/// Settings shared by both keyframe tweeners.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertyBlock {
    pub target: Option<Target>,
    pub property: Option<Property>,
    /// Explicit start value, read from the target when `None`.
    pub from: Option<Value>,
    pub ease: Option<Ease>,
    /// Resolve offsets against the block's initial value instead of
    /// the previous keyframe.
    pub relative_to_initial: bool,
}

struct Resolved {
    target: Target,
    property: Property,
    /// `None` when the target does not expose the property.
    initial: Option<Value>,
}

impl PropertyBlock {
    /// Resolve target and property from the defaults. `Ok(None)` means
    /// the target is already gone.
    fn resolve(
        &self,
        ctx: &StartCtx<'_>,
    ) -> Result<Option<Resolved>, TweenError> {
        let target = self
            .target
            .or(ctx.default_target)
            .ok_or(TweenError::MissingTarget)?;
        let property = self
            .property
            .as_ref()
            .or(ctx.default_property)
            .cloned()
            .ok_or(TweenError::MissingProperty)?;

        if target.is_alive(ctx.world) == false {
            warn!(
                entity = ?target.entity(),
                property = %property.name(),
                "target freed before start, skipping block"
            );
            return Ok(None);
        }

        let current = property.get_value(ctx.world, target);
        if current.is_none() {
            warn!(
                entity = ?target.entity(),
                property = %property.name(),
                "target does not expose property, only timing and callbacks are kept"
            );
        }

        Ok(Some(Resolved {
            target,
            initial: current.and(self.from).or(current),
            property,
        }))
    }

    fn ease_for(&self, keyframe_ease: Option<Ease>, ctx: &StartCtx<'_>) -> Ease {
        keyframe_ease
            .or(self.ease)
            .or(ctx.default_ease)
            .unwrap_or_default()
    }
}

/// Keyframes with explicit per-step durations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertyKeyStepTweener {
    pub block: PropertyBlock,
    keyframes: Vec<StepKeyframe>,
}

impl PropertyKeyStepTweener {
    pub fn new(block: PropertyBlock) -> Self {
        Self {
            block,
            keyframes: Vec::new(),
        }
    }

    pub fn push(&mut self, keyframe: StepKeyframe) {
        self.keyframes.push(keyframe);
    }

    #[inline]
    pub fn keyframes(&self) -> &[StepKeyframe] {
        &self.keyframes
    }

    pub(crate) fn last_keyframe_mut(&mut self) -> Option<&mut StepKeyframe> {
        self.keyframes.last_mut()
    }

    /// Sum of all step durations.
    pub fn duration(&self) -> f32 {
        self.keyframes.iter().map(|k| k.duration.max(0.0)).sum()
    }

    fn start(
        &self,
        ctx: &mut StartCtx<'_>,
        initial_delay: f32,
    ) -> Result<f32, TweenError> {
        if self.keyframes.is_empty() {
            return Err(TweenError::NoKeyframes);
        }
        let Some(resolved) = self.block.resolve(ctx)? else {
            return Ok(0.0);
        };

        let mut start_time = 0.0;
        let mut from = resolved.initial;

        for keyframe in self.keyframes.iter() {
            let offset = initial_delay + start_time;
            let duration = keyframe.duration.max(0.0);

            if let (Some(current), Some(initial)) = (from, resolved.initial) {
                let to = keyframe.value.resolve(
                    &current,
                    &initial,
                    self.block.relative_to_initial,
                )?;

                if current != to {
                    let ease = self.block.ease_for(keyframe.ease, ctx);
                    emit_step(
                        ctx.schedule,
                        offset,
                        &resolved,
                        initial,
                        (current, to),
                        duration,
                        ease,
                    )?;
                }
                from = Some(to);
            }

            if let Some(callback) = &keyframe.callback {
                emit_keyframe_callback(
                    ctx.schedule,
                    offset,
                    resolved.target,
                    callback,
                );
            }

            start_time += duration;
        }

        Ok(start_time)
    }
}

/// Keyframes placed at fractions of a shared block duration.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertyKeyPercentTweener {
    pub block: PropertyBlock,
    /// Explicit block duration, the inherited hint is used when this is
    /// not positive.
    pub duration: f32,
    /// Sorted by percent.
    keyframes: Vec<PercentKeyframe>,
}

impl PropertyKeyPercentTweener {
    pub fn new(block: PropertyBlock) -> Self {
        Self {
            block,
            duration: 0.0,
            keyframes: Vec::new(),
        }
    }

    /// Insert a keyframe, keeping keyframes sorted by percent. Returns
    /// the index it landed at.
    pub fn insert(&mut self, keyframe: PercentKeyframe) -> usize {
        let index = self
            .keyframes
            .partition_point(|k| k.percent <= keyframe.percent);
        self.keyframes.insert(index, keyframe);
        index
    }

    #[inline]
    pub fn keyframes(&self) -> &[PercentKeyframe] {
        &self.keyframes
    }

    pub(crate) fn keyframe_mut(
        &mut self,
        index: usize,
    ) -> Option<&mut PercentKeyframe> {
        self.keyframes.get_mut(index)
    }

    /// The block duration given an inherited `hint`.
    pub fn effective_duration(&self, hint: f32) -> Result<f32, TweenError> {
        if self.duration > 0.0 {
            Ok(self.duration)
        } else if hint > 0.0 {
            Ok(hint)
        } else {
            Err(TweenError::MissingDuration {
                explicit: self.duration,
                default: hint,
            })
        }
    }

    fn start(
        &self,
        ctx: &mut StartCtx<'_>,
        initial_delay: f32,
    ) -> Result<f32, TweenError> {
        if self.keyframes.is_empty() {
            return Err(TweenError::NoKeyframes);
        }
        let total = self.effective_duration(ctx.duration_hint)?;
        if let Some(keyframe) = self
            .keyframes
            .iter()
            .find(|k| (0.0..=1.0).contains(&k.percent) == false)
        {
            return Err(TweenError::PercentOutOfRange(keyframe.percent));
        }
        let Some(resolved) = self.block.resolve(ctx)? else {
            return Ok(0.0);
        };

        let mut prev_end = 0.0;
        let mut from = resolved.initial;

        for (i, keyframe) in self.keyframes.iter().enumerate() {
            let end = keyframe.percent * total;
            let offset = initial_delay + prev_end;

            if let (Some(current), Some(initial)) = (from, resolved.initial) {
                let to = keyframe.value.resolve(
                    &current,
                    &initial,
                    self.block.relative_to_initial,
                )?;

                // The first keyframe is always emitted. At 0% it only
                // sets the starting value.
                if i == 0 && keyframe.percent == 0.0 {
                    ensure_same_kind(&current, &to)?;
                    ctx.schedule.schedule_set(
                        offset,
                        resolved.target,
                        resolved.property.clone(),
                        initial,
                        to,
                    );
                } else if i == 0 || current != to {
                    let ease = self.block.ease_for(keyframe.ease, ctx);
                    emit_step(
                        ctx.schedule,
                        offset,
                        &resolved,
                        initial,
                        (current, to),
                        end - prev_end,
                        ease,
                    )?;
                }
                from = Some(to);
            }

            if let Some(callback) = &keyframe.callback {
                emit_keyframe_callback(
                    ctx.schedule,
                    offset,
                    resolved.target,
                    callback,
                );
            }

            prev_end = end;
        }

        Ok(total)
    }
}

/// Instant sets must not change the kind stored in a property.
fn ensure_same_kind(from: &Value, to: &Value) -> Result<(), TweenError> {
    if from.kind() != to.kind() {
        return Err(TweenError::TypeMismatch {
            expected: from.kind(),
            found: to.kind(),
        });
    }

    Ok(())
}

/// Register one step from `from` to `to`.
///
/// Named curves on indexed properties become a native interpolation,
/// everything else is sampled manually every tick. Zero length steps
/// become an instant set.
fn emit_step(
    schedule: &mut Schedule,
    offset: f32,
    resolved: &Resolved,
    initial: Value,
    (from, to): (Value, Value),
    duration: f32,
    ease: Ease,
) -> Result<(), TweenError> {
    if duration <= 0.0 {
        ensure_same_kind(&from, &to)?;
        schedule.schedule_set(
            offset,
            resolved.target,
            resolved.property.clone(),
            initial,
            to,
        );
        return Ok(());
    }

    Value::ensure_lerp(&from, &to)?;

    if ease.is_native() && resolved.property.is_indexed() {
        schedule.schedule_interpolation(
            offset,
            Interpolate {
                target: resolved.target,
                property: resolved.property.clone(),
                initial,
                from,
                to,
                duration,
                ease,
            },
        );
        return Ok(());
    }

    let target = resolved.target;
    let property = resolved.property.clone();
    schedule.schedule_repeating_sample(
        offset,
        duration,
        Sampler::new(move |world, t| {
            if target.is_alive(world) == false {
                warn!(
                    entity = ?target.entity(),
                    property = %property.name(),
                    "target freed during sampling, skipping"
                );
                return;
            }

            let value = if t >= 1.0 {
                to
            } else {
                Value::lerp(&from, &to, ease.sample(t)).unwrap_or(to)
            };
            property.set_value(world, target, &initial, value);
        }),
    );

    Ok(())
}

fn emit_keyframe_callback(
    schedule: &mut Schedule,
    offset: f32,
    target: Target,
    callback: &KeyframeCallback,
) {
    let callback = callback.clone();
    schedule.schedule_callback(
        offset,
        Callback::new(move |world| {
            if target.is_alive(world) {
                callback.call(world, target);
            } else {
                warn!(
                    entity = ?target.entity(),
                    "target freed before keyframe callback"
                );
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Operation;
    use crate::keyframe::KeyValue;
    use crate::property::Properties;
    use crate::value::ValueKind;

    fn world_with_x(x: f32) -> (World, Target) {
        let mut world = World::new();
        let target =
            Target::new(world.spawn(Properties::new().with("x", x)).id());
        (world, target)
    }

    fn step(value: f32, duration: f32) -> StepKeyframe {
        StepKeyframe::new(KeyValue::To(Value::Float(value)), duration)
    }

    fn block(target: Target) -> PropertyBlock {
        PropertyBlock {
            target: Some(target),
            property: Some(Property::indexed("x")),
            ..Default::default()
        }
    }

    fn start(
        world: &World,
        tweener: &Tweener,
        hint: f32,
    ) -> (Result<f32, TweenError>, Schedule) {
        let mut schedule = Schedule::new();
        let mut ctx = StartCtx {
            world,
            schedule: &mut schedule,
            default_target: None,
            default_property: None,
            default_ease: None,
            duration_hint: hint,
        };
        let result = tweener.start(&mut ctx, 0.0);
        (result, schedule)
    }

    #[test]
    fn pause_and_callback() {
        let world = World::new();
        let (result, schedule) =
            start(&world, &Tweener::Pause(PauseTweener { delay: 0.4 }), 0.0);
        assert_eq!(result, Ok(0.4));
        assert!(schedule.is_empty());

        let callback = Tweener::Callback(CallbackTweener {
            delay: 0.25,
            callback: Callback::new(|_| {}),
        });
        let (result, schedule) = start(&world, &callback, 0.0);
        assert_eq!(result, Ok(0.25));
        assert_eq!(schedule.entries()[0].offset, 0.25);
    }

    #[test]
    fn same_value_step_is_skipped() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyStepTweener::new(block(target));
        tweener.push(step(5.0, 0.2));
        let mut second = step(5.0, 0.3);
        second.callback = Some(KeyframeCallback::new(|_, _| {}));
        tweener.push(second);

        let (result, schedule) =
            start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Ok(0.5));

        let entries = schedule.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].op, Operation::Interpolate(_)));
        assert!(matches!(entries[1].op, Operation::Callback(_)));
        assert_eq!(entries[1].offset, 0.2);
    }

    #[test]
    fn step_offsets_chain() {
        let (world, target) = world_with_x(1.0);
        let mut tweener = PropertyKeyStepTweener::new(block(target));
        tweener.push(StepKeyframe::new(
            KeyValue::Offset(Value::Float(2.0)),
            1.0,
        ));
        tweener.push(StepKeyframe::new(
            KeyValue::Offset(Value::Float(2.0)),
            1.0,
        ));

        let (_, schedule) = start(&world, &Tweener::KeyStep(tweener.clone()), 0.0);
        let targets: Vec<_> = schedule
            .entries()
            .iter()
            .filter_map(|e| match &e.op {
                Operation::Interpolate(i) => Some(i.to),
                _ => None,
            })
            .collect();
        assert_eq!(targets, [Value::Float(3.0), Value::Float(5.0)]);

        tweener.block.relative_to_initial = true;
        let (_, schedule) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        // Second step resolves to 3.0 again, which equals its `from`.
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn missing_defaults_are_errors() {
        let (world, target) = world_with_x(0.0);

        let mut tweener = PropertyKeyStepTweener::default();
        tweener.push(step(1.0, 1.0));
        let (result, _) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Err(TweenError::MissingTarget));

        let mut tweener = PropertyKeyStepTweener::new(PropertyBlock {
            target: Some(target),
            ..Default::default()
        });
        tweener.push(step(1.0, 1.0));
        let (result, _) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Err(TweenError::MissingProperty));

        let tweener = PropertyKeyStepTweener::new(block(target));
        let (result, _) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Err(TweenError::NoKeyframes));
    }

    #[test]
    fn freed_target_yields_empty_schedule() {
        let (mut world, target) = world_with_x(0.0);
        world.despawn(target.entity());

        let mut tweener = PropertyKeyStepTweener::new(block(target));
        tweener.push(step(1.0, 1.0));
        let (result, schedule) =
            start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Ok(0.0));
        assert!(schedule.is_empty());
    }

    #[test]
    fn bool_lerp_is_rejected() {
        let mut world = World::new();
        let target = Target::new(
            world.spawn(Properties::new().with("on", false)).id(),
        );
        let mut tweener = PropertyKeyStepTweener::new(PropertyBlock {
            target: Some(target),
            property: Some(Property::indexed("on")),
            ..Default::default()
        });
        tweener.push(StepKeyframe::new(KeyValue::To(Value::Bool(true)), 1.0));

        let (result, _) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert!(matches!(result, Err(TweenError::UnsupportedLerp { .. })));
    }

    #[test]
    fn bezier_goes_through_sampling() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyStepTweener::new(PropertyBlock {
            ease: Some(Ease::bezier(0.25, 0.1, 0.25, 1.0)),
            ..block(target)
        });
        tweener.push(step(1.0, 1.0));

        let (_, schedule) = start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert!(matches!(
            schedule.entries()[0].op,
            Operation::Sample { duration, .. } if duration == 1.0
        ));
    }

    #[test]
    fn percent_duration_resolution() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyPercentTweener::new(block(target));
        tweener.insert(PercentKeyframe::new(
            1.0,
            KeyValue::To(Value::Float(1.0)),
        ));

        let (result, _) =
            start(&world, &Tweener::KeyPercent(tweener.clone()), 0.0);
        assert_eq!(
            result,
            Err(TweenError::MissingDuration {
                explicit: 0.0,
                default: 0.0
            })
        );

        let (result, _) =
            start(&world, &Tweener::KeyPercent(tweener.clone()), 3.0);
        assert_eq!(result, Ok(3.0));

        tweener.duration = 2.0;
        let (result, _) = start(&world, &Tweener::KeyPercent(tweener), 3.0);
        assert_eq!(result, Ok(2.0));
    }

    #[test]
    fn percent_keyframes_are_sorted_and_zero_is_a_set() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyPercentTweener::new(block(target));
        tweener.duration = 2.0;
        for (percent, value) in [(1.0, 10.0), (0.0, 3.0), (0.5, 6.0)] {
            tweener.insert(PercentKeyframe::new(
                percent,
                KeyValue::To(Value::Float(value)),
            ));
        }

        let (result, schedule) =
            start(&world, &Tweener::KeyPercent(tweener), 0.0);
        assert_eq!(result, Ok(2.0));

        let entries = schedule.entries();
        assert_eq!(entries.len(), 3);
        assert!(matches!(
            entries[0].op,
            Operation::Set { value: Value::Float(v), .. } if v == 3.0
        ));
        for entry in entries {
            assert!(entry.offset + entry.op.duration() <= 2.0);
        }
    }

    #[test]
    fn percent_out_of_range() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyPercentTweener::new(block(target));
        tweener.duration = 1.0;
        tweener.insert(PercentKeyframe::new(
            1.5,
            KeyValue::To(Value::Float(1.0)),
        ));

        let (result, _) = start(&world, &Tweener::KeyPercent(tweener), 0.0);
        assert_eq!(result, Err(TweenError::PercentOutOfRange(1.5)));
    }

    #[test]
    fn instant_step_keeps_the_value_kind() {
        let (world, target) = world_with_x(0.0);
        let mut tweener = PropertyKeyStepTweener::new(block(target));
        tweener.push(StepKeyframe::new(KeyValue::To(Value::Int(5)), 0.0));

        let (result, schedule) =
            start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(
            result,
            Err(TweenError::TypeMismatch {
                expected: ValueKind::Float,
                found: ValueKind::Int,
            })
        );
        assert!(schedule.is_empty());

        let mut tweener = PropertyKeyStepTweener::new(block(target));
        tweener.push(step(5.0, 0.0));
        let (result, schedule) =
            start(&world, &Tweener::KeyStep(tweener), 0.0);
        assert_eq!(result, Ok(0.0));
        assert!(matches!(schedule.entries()[0].op, Operation::Set { .. }));

        let mut tweener = PropertyKeyPercentTweener::new(block(target));
        tweener.duration = 1.0;
        tweener.insert(PercentKeyframe::new(
            0.0,
            KeyValue::To(Value::Bool(true)),
        ));
        let (result, _) = start(&world, &Tweener::KeyPercent(tweener), 0.0);
        assert_eq!(
            result,
            Err(TweenError::TypeMismatch {
                expected: ValueKind::Float,
                found: ValueKind::Bool,
            })
        );
    }

    #[test]
    fn relative_offsets_without_zero_keyframe_use_block_start() {
        let (world, target) = world_with_x(10.0);
        let mut tweener = PropertyKeyPercentTweener::new(PropertyBlock {
            relative_to_initial: true,
            ..block(target)
        });
        tweener.duration = 1.0;
        tweener.insert(PercentKeyframe::new(
            0.5,
            KeyValue::Offset(Value::Float(1.0)),
        ));
        tweener.insert(PercentKeyframe::new(
            1.0,
            KeyValue::Offset(Value::Float(2.0)),
        ));

        let (_, schedule) = start(&world, &Tweener::KeyPercent(tweener), 0.0);
        let steps: Vec<_> = schedule
            .entries()
            .iter()
            .filter_map(|e| match &e.op {
                Operation::Interpolate(i) => Some((e.offset, i.from, i.to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            steps,
            [
                (0.0, Value::Float(10.0), Value::Float(11.0)),
                (0.5, Value::Float(11.0), Value::Float(12.0)),
            ]
        );
    }
}
