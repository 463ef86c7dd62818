use std::rc::Rc;

use nonempty::NonEmpty;

use crate::ease::Ease;
use crate::error::TweenError;
use crate::property::Property;
use crate::target::Target;
use crate::template::TemplateId;
use crate::tweener::{StartCtx, Tweener};

/// [`Tweener`]s that share one start offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    tweeners: NonEmpty<Tweener>,
}

impl Group {
    pub const fn new(tweener: Tweener) -> Self {
        Self {
            tweeners: NonEmpty::new(tweener),
        }
    }

    #[inline]
    pub fn push(&mut self, tweener: Tweener) {
        self.tweeners.push(tweener);
    }

    #[allow(clippy::len_without_is_empty)] // It is non empty!
    #[inline]
    pub fn len(&self) -> usize {
        self.tweeners.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tweener> {
        self.tweeners.iter()
    }

    pub fn step_count(&self) -> usize {
        self.iter().map(Tweener::step_count).sum()
    }

    /// Start every tweener at `offset`. The group consumes as long as
    /// its longest tweener.
    pub fn start(
        &self,
        ctx: &mut StartCtx<'_>,
        offset: f32,
    ) -> Result<f32, TweenError> {
        let mut duration = 0.0_f32;
        for tweener in self.iter() {
            duration = duration.max(tweener.start(ctx, offset)?);
        }

        Ok(duration)
    }
}

/// How many times a sequence plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loops {
    /// At least 1.
    Finite(u32),
    Infinite,
}

impl Loops {
    /// A finite loop count, clamped to at least 1.
    pub fn finite(count: u32) -> Self {
        Self::Finite(count.max(1))
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Loops::Infinite)
    }
}

impl Default for Loops {
    fn default() -> Self {
        Self::Finite(1)
    }
}

/// Which frame update drives a player.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessMode {
    /// Every rendered frame.
    #[default]
    Idle,
    /// Fixed physics steps.
    Physics,
}

/// An ordered list of [`Group`]s plus playback metadata.
///
/// Groups run back to back. The group list is shared behind [`Rc`]s
/// so that [`Template`](crate::template::Template)s and builders can
/// alias it; it is only ever mutated through [`Rc::make_mut`].
#[derive(Debug, Clone)]
pub struct Sequence {
    pub(crate) groups: Rc<Vec<Rc<Group>>>,
    pub(crate) target: Option<Target>,
    pub(crate) property: Option<Property>,
    pub(crate) ease: Option<Ease>,
    pub(crate) duration: f32,
    pub(crate) loops: Loops,
    pub(crate) speed: f32,
    pub(crate) process_mode: ProcessMode,
    pub(crate) origin: Option<TemplateId>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            groups: Rc::default(),
            target: None,
            property: None,
            ease: None,
            duration: 0.0,
            loops: Loops::default(),
            speed: 1.0,
            process_mode: ProcessMode::default(),
            origin: None,
        }
    }
}

impl Sequence {
    #[inline]
    pub fn groups(&self) -> &[Rc<Group>] {
        &self.groups
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn step_count(&self) -> usize {
        self.groups.iter().map(|g| g.step_count()).sum()
    }

    #[inline]
    pub fn target(&self) -> Option<Target> {
        self.target
    }

    #[inline]
    pub fn property(&self) -> Option<&Property> {
        self.property.as_ref()
    }

    #[inline]
    pub fn ease(&self) -> Option<Ease> {
        self.ease
    }

    /// Default block duration for percent keyframes.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn loops(&self) -> Loops {
        self.loops
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn process_mode(&self) -> ProcessMode {
        self.process_mode
    }

    /// The template this sequence was imported from, if any.
    #[inline]
    pub fn origin(&self) -> Option<TemplateId> {
        self.origin
    }

    /// Whether both sequences alias the same group storage.
    pub fn shares_groups_with(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.groups, &other.groups)
    }

    /// Start every group back to back and return the duration of one
    /// loop.
    pub fn start(&self, ctx: &mut StartCtx<'_>) -> Result<f32, TweenError> {
        let mut offset = 0.0;
        for group in self.groups.iter() {
            offset += group.start(ctx, offset)?;
        }

        Ok(offset)
    }
}

/// Structural comparison, the template origin is ignored.
impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
            && self.target == other.target
            && self.property == other.property
            && self.ease == other.ease
            && self.duration == other.duration
            && self.loops == other.loops
            && self.speed == other.speed
            && self.process_mode == other.process_mode
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;
    use crate::clock::Schedule;
    use crate::tweener::PauseTweener;

    fn pause(delay: f32) -> Tweener {
        Tweener::Pause(PauseTweener { delay })
    }

    #[test]
    fn groups_take_their_longest_tweener() {
        let mut first = Group::new(pause(1.0));
        first.push(pause(0.4));
        let second = Group::new(pause(0.5));

        let sequence = Sequence {
            groups: Rc::new(vec![Rc::new(first), Rc::new(second)]),
            ..Default::default()
        };

        let world = World::new();
        let mut schedule = Schedule::new();
        let mut ctx = StartCtx {
            world: &world,
            schedule: &mut schedule,
            default_target: None,
            default_property: None,
            default_ease: None,
            duration_hint: 0.0,
        };

        assert_eq!(sequence.start(&mut ctx), Ok(1.5));
        assert_eq!(sequence.group_count(), 2);
        assert_eq!(sequence.step_count(), 3);
    }

    #[test]
    fn loops_are_at_least_one() {
        assert_eq!(Loops::finite(0), Loops::Finite(1));
        assert_eq!(Loops::default(), Loops::Finite(1));
        assert!(Loops::Infinite.is_infinite());
    }
}
