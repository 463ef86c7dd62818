//! Binds a [`Sequence`] to a [`FrameClock`] and drives its loops.
//!
//! The schedule of one loop is computed once, eagerly, when
//! [`SequencePlayer::play`] is called. Each loop iteration is then
//! registered on the clock at `iteration * loop_duration +
//! initial_delay`, right when the previous iteration ends.

use core::pin::Pin;
use core::task::{Context, Poll};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use bevy_ecs::world::World;
use futures::channel::oneshot;
use tracing::debug;

use crate::clock::{FrameClock, Operation, Schedule};
use crate::error::TweenError;
use crate::sequence::{Loops, ProcessMode, Sequence};
use crate::target::Target;
use crate::tweener::StartCtx;

pub use futures::channel::oneshot::Canceled;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Stopped,
    /// Terminal.
    Killed,
}

/// Per-play overrides of the sequence defaults.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub target: Option<Target>,
    pub initial_delay: f32,
    /// Overrides the sequence's default percent block duration.
    pub duration: Option<f32>,
    pub loops: Option<Loops>,
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: f32) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_loops(mut self, loops: Loops) -> Self {
        self.loops = Some(loops);
        self
    }
}

#[derive(Debug, Default)]
struct LoopState {
    loop_index: u32,
    loops: Loops,
    loop_duration: f32,
    elapsed: f32,
    completed: bool,
    killed: bool,
}

/// Runtime status of one play, and a future that resolves when every
/// loop has finished.
///
/// Resolves to `Err(Canceled)` if the player is killed or reset
/// before completion.
#[derive(Debug)]
pub struct LoopStatus {
    state: Rc<RefCell<LoopState>>,
    receiver: oneshot::Receiver<()>,
}

impl LoopStatus {
    /// Zero based index of the loop being played.
    pub fn loop_index(&self) -> u32 {
        self.state.borrow().loop_index
    }

    pub fn total_loops(&self) -> Loops {
        self.state.borrow().loops
    }

    pub fn loop_duration(&self) -> f32 {
        self.state.borrow().loop_duration
    }

    /// Clock time elapsed since play, including the initial delay.
    pub fn elapsed(&self) -> f32 {
        self.state.borrow().elapsed
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().completed
    }

    pub fn is_killed(&self) -> bool {
        self.state.borrow().killed
    }
}

impl Future for LoopStatus {
    type Output = Result<(), Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx)
    }
}

/// Everything needed to replay the loops of one play.
#[derive(Debug)]
struct ActivePlay {
    schedule: Schedule,
    initial_delay: f32,
    loop_duration: f32,
    loops: Loops,
    state: Rc<RefCell<LoopState>>,
    sender: Option<oneshot::Sender<()>>,
}

impl ActivePlay {
    fn register(&self, clock: &mut FrameClock, iteration: u32) {
        let base = iteration as f32 * self.loop_duration + self.initial_delay;
        clock.register(&self.schedule, base);
        clock.insert(base + self.loop_duration, Operation::Marker(iteration));
    }

    /// Called when the end marker of a loop fires. Returns `true` once
    /// every loop is done.
    fn finish_loop(&mut self, clock: &mut FrameClock) -> bool {
        let next = {
            let mut state = self.state.borrow_mut();
            let next = state.loop_index + 1;
            if let Loops::Finite(count) = self.loops {
                if next >= count {
                    state.completed = true;
                    return true;
                }
            }
            state.loop_index = next;
            next
        };

        debug!(loop_index = next, "starting next loop");
        self.register(clock, next);
        false
    }

    /// The completion signal has been sent, nothing is left to run
    /// until the play is reset.
    #[inline]
    fn is_finished(&self) -> bool {
        self.sender.is_none()
    }

    fn status(&mut self) -> LoopStatus {
        let (sender, receiver) = oneshot::channel();
        self.sender = Some(sender);
        self.state = Rc::new(RefCell::new(LoopState {
            loops: self.loops,
            loop_duration: self.loop_duration,
            ..Default::default()
        }));

        LoopStatus {
            state: self.state.clone(),
            receiver,
        }
    }
}

/// Plays one sequence at a time on its own [`FrameClock`].
#[derive(Debug)]
pub struct SequencePlayer {
    /// `None` once killed.
    clock: Option<FrameClock>,
    state: PlayerState,
    /// Entity owning this player, its parent is the last resort
    /// target.
    owner: Option<Target>,
    active: Option<ActivePlay>,
}

impl Default for SequencePlayer {
    fn default() -> Self {
        Self {
            clock: Some(FrameClock::new()),
            state: PlayerState::default(),
            owner: None,
            active: None,
        }
    }
}

impl SequencePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: impl Into<Target>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == PlayerState::Running
    }

    #[inline]
    pub fn clock(&self) -> Option<&FrameClock> {
        self.clock.as_ref()
    }

    /// Compute the schedule of `sequence` and start playing it,
    /// replacing whatever was playing before.
    pub fn play(
        &mut self,
        sequence: &Sequence,
        world: &World,
        options: PlayOptions,
    ) -> Result<LoopStatus, TweenError> {
        let Some(clock) = self.clock.as_mut() else {
            return Err(TweenError::Killed);
        };

        let loops = options.loops.unwrap_or(sequence.loops());
        let default_target = options
            .target
            .or(sequence.target())
            .or_else(|| self.owner.and_then(|owner| owner.parent(world)));

        let mut schedule = Schedule::new();
        let loop_duration = sequence.start(&mut StartCtx {
            world,
            schedule: &mut schedule,
            default_target,
            default_property: sequence.property(),
            default_ease: sequence.ease(),
            duration_hint: options.duration.unwrap_or(sequence.duration()),
        })?;

        if loops.is_infinite() && loop_duration <= 0.0 {
            return Err(TweenError::ZeroDurationLoop);
        }

        clock.remove_all();
        clock
            .set_speed(sequence.speed())
            .set_process_mode(sequence.process_mode());

        let mut active = ActivePlay {
            schedule,
            initial_delay: options.initial_delay,
            loop_duration,
            loops,
            state: Rc::default(),
            sender: None,
        };
        let status = active.status();
        active.register(clock, 0);
        debug!(
            loop_duration,
            ?loops,
            entries = active.schedule.len(),
            "sequence started"
        );

        self.active = Some(active);
        clock.start();
        self.state = PlayerState::Running;

        Ok(status)
    }

    /// Resume a stopped or reset player. Returns `false` if there is
    /// nothing to play, including a play that already completed.
    pub fn start(&mut self) -> bool {
        if matches!(self.state, PlayerState::Idle | PlayerState::Stopped)
            == false
        {
            return false;
        }
        if self.active.as_ref().is_none_or(ActivePlay::is_finished) {
            return false;
        }
        let Some(clock) = self.clock.as_mut() else {
            return false;
        };

        clock.start();
        self.state = PlayerState::Running;
        true
    }

    /// Pause playback, registered entries are kept.
    pub fn stop(&mut self) {
        if self.state != PlayerState::Running {
            return;
        }
        if let Some(clock) = self.clock.as_mut() {
            clock.stop();
        }
        self.state = PlayerState::Stopped;
    }

    /// Clear every entry and rewind to time zero, ready to
    /// [`start`](Self::start) again.
    ///
    /// The previous [`LoopStatus`] resolves as cancelled, the returned
    /// one tracks the replay.
    pub fn reset(&mut self) -> Option<LoopStatus> {
        let (Some(clock), Some(active)) =
            (self.clock.as_mut(), self.active.as_mut())
        else {
            return None;
        };

        clock.stop();
        clock.remove_all();
        let status = active.status();
        active.register(clock, 0);
        self.state = PlayerState::Idle;
        debug!("sequence reset");

        Some(status)
    }

    /// Cancel everything and release the clock. The player can not be
    /// used afterwards.
    pub fn kill(&mut self) {
        if self.state == PlayerState::Killed {
            return;
        }

        self.clock = None;
        if let Some(active) = self.active.take() {
            active.state.borrow_mut().killed = true;
            // Dropping `active` drops the sender, cancelling the
            // status future.
        }
        self.state = PlayerState::Killed;
        debug!("player killed");
    }

    /// Advance only if `process_mode` matches the sequence's mode.
    pub fn process(
        &mut self,
        process_mode: ProcessMode,
        delta: f32,
        world: &mut World,
    ) {
        let matches = self
            .clock
            .as_ref()
            .is_some_and(|clock| clock.process_mode() == process_mode);
        if matches {
            self.advance(delta, world);
        }
    }

    /// Move the clock forward by `delta` seconds.
    pub fn advance(&mut self, delta: f32, world: &mut World) {
        if self.state != PlayerState::Running {
            return;
        }
        let (Some(clock), Some(active)) =
            (self.clock.as_mut(), self.active.as_mut())
        else {
            return;
        };

        clock.advance(delta, world);

        let mut finished = false;
        loop {
            let markers = clock.take_markers();
            if markers.is_empty() {
                break;
            }
            for _ in markers {
                finished |= active.finish_loop(clock);
            }
            if finished {
                break;
            }
            // Catch up on the loop that was just registered.
            clock.advance(0.0, world);
        }

        active.state.borrow_mut().elapsed = clock.elapsed();

        if finished {
            clock.stop();
            if let Some(sender) = active.sender.take() {
                // The receiver may already be gone.
                let _ = sender.send(());
            }
            self.state = PlayerState::Idle;
            debug!("sequence completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;
    use crate::builder::SequenceBuilder;
    use crate::ease::{Ease, EaseDir, Transition};
    use crate::property::Properties;

    fn setup() -> (World, Target) {
        let mut world = World::new();
        let target = Target::new(
            world.spawn(Properties::new().with("x", 0.0_f32)).id(),
        );
        (world, target)
    }

    fn x(world: &World, target: Target) -> f32 {
        world
            .get::<Properties>(target.entity())
            .and_then(|p| p.get::<f32>("x"))
            .unwrap()
    }

    fn ramp(target: Target) -> Sequence {
        SequenceBuilder::new()
            .with_target(target)
            .animate_steps("x")
            .from(0.0_f32)
            .to(1.0_f32, 1.0)
            .end()
            .build()
    }

    #[test]
    fn plays_to_completion() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let mut status = player
            .play(&ramp(target), &world, PlayOptions::new())
            .unwrap();

        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 0.5);
        assert!((&mut status).now_or_never().is_none());

        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 1.0);
        assert!(status.is_completed());
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(status.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn stop_and_start() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let _status = player
            .play(&ramp(target), &world, PlayOptions::new())
            .unwrap();

        player.advance(0.25, &mut world);
        player.stop();
        assert_eq!(player.state(), PlayerState::Stopped);
        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 0.25);

        assert!(player.start());
        player.advance(0.25, &mut world);
        assert_eq!(x(&world, target), 0.5);
    }

    #[test]
    fn loops_replay_the_schedule() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let status = player
            .play(
                &ramp(target),
                &world,
                PlayOptions::new().with_loops(Loops::Finite(3)),
            )
            .unwrap();

        player.advance(1.5, &mut world);
        assert_eq!(status.loop_index(), 1);
        assert_eq!(x(&world, target), 0.5);

        player.advance(1.0, &mut world);
        assert_eq!(status.loop_index(), 2);

        player.advance(1.0, &mut world);
        assert!(status.is_completed());
        assert_eq!(x(&world, target), 1.0);
    }

    #[test]
    fn infinite_loops_never_complete() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let status = player
            .play(
                &ramp(target),
                &world,
                PlayOptions::new().with_loops(Loops::Infinite),
            )
            .unwrap();

        for _ in 0..10 {
            player.advance(0.75, &mut world);
        }
        assert_eq!(status.loop_index(), 7);
        assert!(status.is_completed() == false);
        assert!(player.is_running());
    }

    #[test]
    fn zero_length_infinite_loop_is_rejected() {
        let world = World::new();
        let sequence = SequenceBuilder::new()
            .callback(|_| {})
            .infinite_loops()
            .build();

        let result =
            SequencePlayer::new().play(&sequence, &world, PlayOptions::new());
        assert!(matches!(result, Err(TweenError::ZeroDurationLoop)));
    }

    #[test]
    fn initial_delay_shifts_everything() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let _status = player
            .play(
                &ramp(target),
                &world,
                PlayOptions::new().with_initial_delay(1.0),
            )
            .unwrap();

        player.advance(1.0, &mut world);
        assert_eq!(x(&world, target), 0.0);
        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 0.5);
    }

    #[test]
    fn reset_rewinds() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let status = player
            .play(&ramp(target), &world, PlayOptions::new())
            .unwrap();

        player.advance(0.75, &mut world);
        let replay = player.reset().unwrap();
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(status.now_or_never(), Some(Err(Canceled)));

        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 0.75);

        assert!(player.start());
        player.advance(0.25, &mut world);
        assert_eq!(x(&world, target), 0.25);

        player.advance(1.0, &mut world);
        assert_eq!(replay.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn start_after_completion_needs_a_reset() {
        let (mut world, target) = setup();
        let mut player = SequencePlayer::new();
        let _status = player
            .play(&ramp(target), &world, PlayOptions::new())
            .unwrap();
        player.advance(1.0, &mut world);
        assert_eq!(player.state(), PlayerState::Idle);

        assert!(player.start() == false);
        assert!(player.is_running() == false);

        let replay = player.reset().unwrap();
        assert!(player.start());
        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 0.5);
        player.advance(0.5, &mut world);
        assert!(replay.is_completed());
        assert!(player.is_running() == false);
    }

    #[test]
    fn overshooting_ease_passes_the_target_value() {
        let (mut world, target) = setup();
        let sequence = SequenceBuilder::new()
            .with_target(target)
            .animate_steps("x")
            .from(0.0_f32)
            .to(10.0_f32, 1.0)
            .eased(Ease::named(Transition::Back, EaseDir::Out))
            .end()
            .build();

        let mut player = SequencePlayer::new();
        let _status =
            player.play(&sequence, &world, PlayOptions::new()).unwrap();

        player.advance(0.5, &mut world);
        assert!(x(&world, target) > 10.0);

        player.advance(0.5, &mut world);
        assert_eq!(x(&world, target), 10.0);
    }

    #[test]
    fn owner_parent_is_the_fallback_target() {
        let (mut world, target) = setup();
        let owner = world
            .spawn(bevy_ecs::hierarchy::ChildOf(target.entity()))
            .id();
        let sequence = SequenceBuilder::new()
            .animate_steps("x")
            .to(2.0_f32, 1.0)
            .end()
            .build();

        let mut player = SequencePlayer::new().with_owner(owner);
        let _status = player
            .play(&sequence, &world, PlayOptions::new())
            .unwrap();
        player.advance(1.0, &mut world);
        assert_eq!(x(&world, target), 2.0);

        let result = SequencePlayer::new().play(
            &sequence,
            &world,
            PlayOptions::new(),
        );
        assert!(matches!(result, Err(TweenError::MissingTarget)));
    }

    #[test]
    fn killed_player_rejects_play() {
        let (world, target) = setup();
        let mut player = SequencePlayer::new();
        player.kill();

        assert_eq!(player.state(), PlayerState::Killed);
        assert!(player.clock().is_none());
        assert!(matches!(
            player.play(&ramp(target), &world, PlayOptions::new()),
            Err(TweenError::Killed)
        ));
    }
}
