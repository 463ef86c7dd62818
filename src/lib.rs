//! [Bevy]: https://bevyengine.org/
//! [`SequenceBuilder`]: tweenline_engine::builder::SequenceBuilder
//! [`Template`]: tweenline_engine::template::Template
//! [`SequencePlayer`]: tweenline_engine::player::SequencePlayer
//!
//! Tweenline composes property animations into timelines that run
//! against a [Bevy] ECS world.
//!
//! The core of this crate is made up of [`SequenceBuilder`],
//! [`Template`] and [`SequencePlayer`].
//!
//! # Building
//! A [`SequenceBuilder`] lays out tweeners in groups. Groups play one
//! after another, tweeners inside a group start together.
//!
//! # Reusing
//! A frozen [`Template`] can be played by any number of players and
//! imported into new builders without ever being modified.
//!
//! # Playing
//! A [`SequencePlayer`] computes the schedule once, then replays it
//! for every loop as its clock advances.
//!
//! ```
//! use bevy_ecs::world::World;
//! use tweenline::prelude::*;
//!
//! let mut world = World::new();
//! let entity = world.spawn(Properties::new().with("x", 0.0_f32)).id();
//!
//! let template = SequenceBuilder::new()
//!     .with_target(entity)
//!     .animate_steps("x")
//!     .to(4.0_f32, 1.0)
//!     .eased(Ease::named(Transition::Quad, EaseDir::Out))
//!     .end()
//!     .freeze();
//!
//! let mut player = SequencePlayer::new();
//! let status = player
//!     .play(template.sequence(), &world, PlayOptions::new())
//!     .unwrap();
//!
//! player.advance(1.0, &mut world);
//! assert!(status.is_completed());
//!
//! let x = world.get::<Properties>(entity).unwrap().get::<f32>("x");
//! assert_eq!(x, Some(4.0));
//! ```

pub use tweenline_engine;

pub mod prelude {
    pub use tweenline_engine::prelude::*;
}
