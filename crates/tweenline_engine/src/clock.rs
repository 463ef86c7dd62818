//! Frame clock that fires scheduled operations against a [`World`].
//!
//! Tweeners never talk to the [`FrameClock`] directly. They emit a
//! [`Schedule`]: a plain list of operations stamped with offsets
//! relative to the start of one loop. The player then registers that
//! schedule into the clock once per loop iteration.

use std::fmt;
use std::rc::Rc;

use bevy_ecs::world::World;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::ease::Ease;
use crate::property::Property;
use crate::sequence::ProcessMode;
use crate::target::Target;
use crate::value::Value;

/// A zero-argument side effect scheduled on the clock.
///
/// The [`World`] is handed over so the callback can reach the scene.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&mut World)>);

impl Callback {
    pub fn new(f: impl Fn(&mut World) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, world: &mut World) {
        (self.0)(world)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Receives the linear progress `t` in `0..=1` of a repeating sample.
#[derive(Clone)]
pub struct Sampler(Rc<dyn Fn(&mut World, f32)>);

impl Sampler {
    pub fn new(f: impl Fn(&mut World, f32) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn sample(&self, world: &mut World, t: f32) {
        (self.0)(world, t)
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sampler(..)")
    }
}

/// A native interpolation between 2 values of one property.
#[derive(Debug, Clone)]
pub struct Interpolate {
    pub target: Target,
    pub property: Property,
    /// The value the whole property block started from.
    pub initial: Value,
    pub from: Value,
    pub to: Value,
    pub duration: f32,
    pub ease: Ease,
}

#[derive(Debug, Clone)]
pub enum Operation {
    Interpolate(Interpolate),
    /// Instantaneous write of a value.
    Set {
        target: Target,
        property: Property,
        initial: Value,
        value: Value,
    },
    Callback(Callback),
    /// Calls the sampler every tick for `duration` seconds.
    Sample { duration: f32, sampler: Sampler },
    /// End of a loop iteration, reported back through
    /// [`FrameClock::take_markers`].
    Marker(u32),
}

impl Operation {
    /// Time it takes for this operation to finish.
    pub fn duration(&self) -> f32 {
        match self {
            Operation::Interpolate(interp) => interp.duration,
            Operation::Sample { duration, .. } => *duration,
            Operation::Set { .. }
            | Operation::Callback(_)
            | Operation::Marker(_) => 0.0,
        }
    }
}

/// An [`Operation`] stamped with an offset in seconds.
#[derive(Debug, Clone)]
pub struct ScheduledOp {
    pub offset: f32,
    pub op: Operation,
}

/// Ordered list of operations relative to a common start.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<ScheduledOp>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_interpolation(
        &mut self,
        offset: f32,
        interpolate: Interpolate,
    ) {
        self.push(offset, Operation::Interpolate(interpolate));
    }

    pub fn schedule_set(
        &mut self,
        offset: f32,
        target: Target,
        property: Property,
        initial: Value,
        value: Value,
    ) {
        self.push(
            offset,
            Operation::Set {
                target,
                property,
                initial,
                value,
            },
        );
    }

    pub fn schedule_callback(&mut self, offset: f32, callback: Callback) {
        self.push(offset, Operation::Callback(callback));
    }

    pub fn schedule_repeating_sample(
        &mut self,
        offset: f32,
        duration: f32,
        sampler: Sampler,
    ) {
        self.push(offset, Operation::Sample { duration, sampler });
    }

    #[inline]
    pub fn push(&mut self, offset: f32, op: Operation) {
        self.entries.push(ScheduledOp { offset, op });
    }

    #[inline]
    pub fn entries(&self) -> &[ScheduledOp] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest end time among all entries.
    pub fn end(&self) -> f32 {
        self.entries
            .iter()
            .map(|entry| entry.offset + entry.op.duration())
            .fold(0.0, f32::max)
    }
}

#[derive(Debug)]
struct Entry {
    start: f32,
    op: Operation,
    fired: bool,
}

/// Drives registered [`Operation`]s forward in time.
#[derive(Debug)]
pub struct FrameClock {
    /// Sorted by `start`, ties keep registration order.
    entries: Vec<Entry>,
    markers: SmallVec<[u32; 2]>,
    elapsed: f32,
    speed: f32,
    process_mode: ProcessMode,
    is_active: bool,
    fired_count: usize,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            markers: SmallVec::new(),
            elapsed: 0.0,
            speed: 1.0,
            process_mode: ProcessMode::default(),
            is_active: false,
            fired_count: 0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_process_mode(mut self, process_mode: ProcessMode) -> Self {
        self.process_mode = process_mode;
        self
    }

    /// Register every entry of `schedule`, shifted by `base`.
    pub fn register(&mut self, schedule: &Schedule, base: f32) {
        trace!(base, count = schedule.len(), "registering schedule");
        for entry in schedule.entries() {
            self.insert(base + entry.offset, entry.op.clone());
        }
    }

    pub fn insert(&mut self, start: f32, op: Operation) {
        let index = self.entries.partition_point(|e| e.start <= start);
        self.entries.insert(
            index,
            Entry {
                start,
                op,
                fired: false,
            },
        );
    }

    /// Resume the clock.
    #[inline]
    pub fn start(&mut self) {
        self.is_active = true;
    }

    /// Pause the clock, registered entries are kept.
    #[inline]
    pub fn stop(&mut self) {
        self.is_active = false;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Drop every entry and rewind to zero.
    pub fn remove_all(&mut self) {
        self.entries.clear();
        self.markers.clear();
        self.elapsed = 0.0;
        self.fired_count = 0;
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed;
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn process_mode(&self) -> ProcessMode {
        self.process_mode
    }

    #[inline]
    pub fn set_process_mode(&mut self, process_mode: ProcessMode) -> &mut Self {
        self.process_mode = process_mode;
        self
    }

    /// Seconds elapsed on the clock, scaled by speed.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of entries still waiting to fire or finish.
    #[inline]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Number of interpolation, set, callback and sample entries that
    /// have fired at least once.
    #[inline]
    pub fn fired_count(&self) -> usize {
        self.fired_count
    }

    /// Loop markers reached since the last call.
    pub fn take_markers(&mut self) -> SmallVec<[u32; 2]> {
        core::mem::take(&mut self.markers)
    }

    /// Advance only if `process_mode` matches the clock's mode.
    pub fn process(
        &mut self,
        process_mode: ProcessMode,
        delta: f32,
        world: &mut World,
    ) {
        if process_mode == self.process_mode {
            self.advance(delta, world);
        }
    }

    /// Move time forward by `delta` seconds (scaled by speed) and fire
    /// everything that has started.
    pub fn advance(&mut self, delta: f32, world: &mut World) {
        if self.is_active == false {
            return;
        }

        self.elapsed += delta * self.speed;
        let elapsed = self.elapsed;

        let Self {
            entries,
            markers,
            fired_count,
            ..
        } = self;

        for entry in entries.iter_mut() {
            if entry.start > elapsed {
                break;
            }

            if entry.fired == false {
                entry.fired = true;
                if matches!(entry.op, Operation::Marker(_)) == false {
                    *fired_count += 1;
                }
            }

            let t = progress(entry.start, entry.op.duration(), elapsed);
            fire(&entry.op, t, world, markers);
        }

        // Everything that reached its end is done.
        entries.retain(|entry| {
            entry.start > elapsed
                || (entry.start + entry.op.duration() > elapsed
                    && entry.op.duration() > 0.0)
        });
    }
}

fn progress(start: f32, duration: f32, elapsed: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }

    ((elapsed - start) / duration).clamp(0.0, 1.0)
}

fn fire(
    op: &Operation,
    t: f32,
    world: &mut World,
    markers: &mut SmallVec<[u32; 2]>,
) {
    match op {
        Operation::Interpolate(interp) => {
            if interp.target.is_alive(world) == false {
                warn!(
                    entity = ?interp.target.entity(),
                    property = %interp.property.name(),
                    "target freed before interpolation fired, skipping"
                );
                return;
            }

            let value = match Value::lerp(
                &interp.from,
                &interp.to,
                interp.ease.sample(t),
            ) {
                Ok(value) => value,
                Err(err) => {
                    warn!(%err, "interpolation skipped");
                    return;
                }
            };
            // The last tick always lands exactly on `to`.
            let value = if t >= 1.0 { interp.to } else { value };

            interp.property.set_value(
                world,
                interp.target,
                &interp.initial,
                value,
            );
        }
        Operation::Set {
            target,
            property,
            initial,
            value,
        } => {
            if target.is_alive(world) == false {
                warn!(
                    entity = ?target.entity(),
                    property = %property.name(),
                    "target freed before set fired, skipping"
                );
                return;
            }

            property.set_value(world, *target, initial, *value);
        }
        Operation::Callback(callback) => callback.call(world),
        Operation::Sample { sampler, .. } => sampler.sample(world, t),
        Operation::Marker(iteration) => markers.push(*iteration),
    }
}
