//! The [`Target`] handle represents an animatable object within a
//! Bevy [`World`]. A target is the entity that tweeners read from and
//! write to during playback.
//!
//! Liveness is only ever checked through [`Target::is_alive`]: once
//! when a tweener is started and again right before every scheduled
//! operation fires.

use bevy_ecs::entity::Entity;
use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(Entity);

impl Target {
    #[inline]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    #[inline]
    pub const fn entity(&self) -> Entity {
        self.0
    }

    /// Returns `true` while the entity still exists in `world`.
    #[inline]
    pub fn is_alive(&self, world: &World) -> bool {
        world.get_entity(self.0).is_ok()
    }

    /// The parent of this target, if it has one.
    pub fn parent(&self, world: &World) -> Option<Target> {
        world
            .get::<ChildOf>(self.0)
            .map(|child_of| Target(child_of.parent()))
    }
}

impl From<Entity> for Target {
    fn from(entity: Entity) -> Self {
        Self(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_follows_despawn() {
        let mut world = World::new();
        let target = Target::new(world.spawn_empty().id());

        assert!(target.is_alive(&world));
        world.despawn(target.entity());
        assert!(target.is_alive(&world) == false);
        assert_eq!(target.parent(&world), None);
    }

    #[test]
    fn parent_lookup() {
        let mut world = World::new();
        let parent = world.spawn_empty().id();
        let child = Target::new(world.spawn(ChildOf(parent)).id());

        assert_eq!(child.parent(&world), Some(Target::new(parent)));
        assert_eq!(Target::new(parent).parent(&world), None);
    }
}
