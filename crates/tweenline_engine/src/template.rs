//! Frozen, shareable sequence definitions.
//!
//! A [`Template`] aliases the group storage of the builder it was
//! frozen from. Importing it into a new [`SequenceBuilder`] is O(1);
//! the builder clones storage lazily on its first structural write,
//! so the template itself is never mutated.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::builder::SequenceBuilder;
use crate::sequence::{Loops, ProcessMode, Sequence};

/// Generation tag handed to every frozen [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(u64);

impl TemplateId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    id: TemplateId,
    sequence: Sequence,
}

impl Template {
    /// Freeze `sequence`, usually through
    /// [`SequenceBuilder::freeze`].
    pub fn new(mut sequence: Sequence) -> Self {
        let id = TemplateId::next();
        sequence.origin = Some(id);
        Self { id, sequence }
    }

    #[inline]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Read-only view used to play the template directly.
    #[inline]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Start a new builder that aliases this template's groups.
    pub fn import(&self) -> SequenceBuilder {
        SequenceBuilder::import(self)
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.sequence.group_count()
    }

    #[inline]
    pub fn step_count(&self) -> usize {
        self.sequence.step_count()
    }

    #[inline]
    pub fn loops(&self) -> Loops {
        self.sequence.loops()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.sequence.speed()
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.sequence.duration()
    }

    #[inline]
    pub fn process_mode(&self) -> ProcessMode {
        self.sequence.process_mode()
    }
}

/// Templates compare by content, not by id.
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl AsRef<Sequence> for Template {
    fn as_ref(&self) -> &Sequence {
        &self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Template::new(Sequence::default());
        let b = Template::new(Sequence::default());

        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_eq!(a.sequence().origin(), Some(a.id()));
    }
}
