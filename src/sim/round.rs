//! Rounds and the answer lifecycle
//!
//! A round is `Active` until answered. A correct answer ends it; a wrong one
//! shows feedback for a fixed delay and then reverts to `Active`. While an
//! answer is being processed the lifecycle holds a lock and drops further
//! submissions.
//!
//! Submission is two-phase because the host has to make sure its audio
//! output is ready before the verdict is shown:
//! `submit` takes the lock, `resolve` applies the answer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::picker::{pick_distractors, pick_one, shuffle_in_place};
use super::timer::{Millis, TimerQueue};
use crate::consts::REVERT_DELAY_MS;
use crate::error::RoundError;

/// Answer state of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Active,
    /// Answered correctly, waiting for the player to move on
    Correct,
    /// Wrong answer feedback, reverts to `Active` after a delay
    Incorrect,
}

/// One trial: the expected answer and the options shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round<A> {
    expected: A,
    options: Vec<A>,
}

impl<A: Clone + PartialEq> Round<A> {
    /// Build a round, checking that `expected` appears exactly once and the
    /// options are pairwise distinct
    pub fn new(expected: A, options: Vec<A>) -> Result<Self, RoundError> {
        let count = options.iter().filter(|o| **o == expected).count();
        if count != 1 {
            return Err(RoundError::ExpectedCount { count });
        }
        for (index, option) in options.iter().enumerate() {
            if options[..index].contains(option) {
                return Err(RoundError::DuplicateOption { index });
            }
        }
        Ok(Self { expected, options })
    }

    /// Shuffle `expected` in among `decoys`
    pub fn from_decoys<R: Rng + ?Sized>(
        expected: A,
        decoys: Vec<A>,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let mut options = decoys;
        options.push(expected.clone());
        shuffle_in_place(&mut options, rng)?;
        Self::new(expected, options)
    }

    /// Pick an expected answer from `universe` and up to `option_count - 1`
    /// decoys. Fewer options come back when the universe is small.
    pub fn generate<R: Rng + ?Sized>(
        universe: &[A],
        option_count: usize,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let expected = pick_one(universe, rng)?.clone();
        let decoys = pick_distractors(&expected, universe, option_count.saturating_sub(1), rng);
        Self::from_decoys(expected, decoys, rng)
    }
}

impl<A> Round<A> {
    pub fn expected(&self) -> &A {
        &self.expected
    }

    pub fn options(&self) -> &[A] {
        &self.options
    }

    /// Convert the answer type. `f` must be injective or options collide.
    pub fn map<B>(self, f: impl Fn(A) -> B) -> Round<B> {
        Round {
            expected: f(self.expected),
            options: self.options.into_iter().map(f).collect(),
        }
    }
}

/// Outcome of a resolved answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Notifications for the UI layer, tagged with the round generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Correct { generation: u64 },
    Incorrect { generation: u64 },
    /// Wrong-answer feedback finished, input is enabled again
    Reverted { generation: u64 },
    /// A new round replaced the previous one
    Advanced { generation: u64 },
}

impl RoundEvent {
    pub fn generation(&self) -> u64 {
        match *self {
            RoundEvent::Correct { generation }
            | RoundEvent::Incorrect { generation }
            | RoundEvent::Reverted { generation }
            | RoundEvent::Advanced { generation } => generation,
        }
    }

    /// Forward to the matching observer callback
    pub fn dispatch(&self, observer: &mut impl RoundObserver) {
        match self {
            RoundEvent::Correct { .. } => observer.on_correct(),
            RoundEvent::Incorrect { .. } => observer.on_incorrect(),
            RoundEvent::Reverted { .. } => observer.on_revert(),
            RoundEvent::Advanced { .. } => observer.on_round_advance(),
        }
    }
}

/// Callbacks for round transitions
pub trait RoundObserver {
    fn on_correct(&mut self) {}
    fn on_incorrect(&mut self) {}
    fn on_revert(&mut self) {}
    fn on_round_advance(&mut self) {}
}

/// An answer that holds the processing lock but hasn't been applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending answer holds the lock until resolved"]
pub struct PendingAnswer<A> {
    generation: u64,
    candidate: A,
}

impl<A> PendingAnswer<A> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn candidate(&self) -> &A {
        &self.candidate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum RoundTimer {
    Revert,
}

/// Sequencing for the current round
#[derive(Debug, Clone)]
pub struct RoundLifecycle<A> {
    round: Round<A>,
    state: RoundState,
    /// Bumped whenever a new round replaces the current one
    generation: u64,
    /// Held from `submit` until the verdict settles
    locked: bool,
    revert_delay: Millis,
    timers: TimerQueue<RoundTimer>,
    events: Vec<RoundEvent>,
}

impl<A: PartialEq> RoundLifecycle<A> {
    pub fn new(round: Round<A>) -> Self {
        Self::with_revert_delay(round, REVERT_DELAY_MS)
    }

    pub fn with_revert_delay(round: Round<A>, revert_delay: Millis) -> Self {
        Self {
            round,
            state: RoundState::Active,
            generation: 0,
            locked: false,
            revert_delay,
            timers: TimerQueue::new(),
            events: Vec::new(),
        }
    }

    pub fn round(&self) -> &Round<A> {
        &self.round
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True when a new answer would be accepted
    pub fn accepts_input(&self) -> bool {
        self.state == RoundState::Active && !self.locked
    }

    /// Earliest pending timer, for hosts that sleep until the next deadline
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// Take the processing lock for `candidate`.
    ///
    /// Returns `None` (and drops the answer) while another answer is in
    /// flight or the round isn't `Active`.
    pub fn submit(&mut self, candidate: A) -> Option<PendingAnswer<A>> {
        if !self.accepts_input() {
            log::debug!(
                "Dropped answer: state {:?}, locked {}",
                self.state,
                self.locked
            );
            return None;
        }
        self.locked = true;
        Some(PendingAnswer {
            generation: self.generation,
            candidate,
        })
    }

    /// Apply a pending answer. Answers from a superseded round are ignored.
    pub fn resolve(&mut self, pending: PendingAnswer<A>, now: Millis) -> Option<Verdict> {
        if pending.generation != self.generation {
            log::debug!(
                "Ignoring answer from round {} (current {})",
                pending.generation,
                self.generation
            );
            return None;
        }
        if self.state != RoundState::Active {
            return None;
        }

        if pending.candidate == self.round.expected {
            self.state = RoundState::Correct;
            self.locked = false;
            self.events.push(RoundEvent::Correct {
                generation: self.generation,
            });
            Some(Verdict::Correct)
        } else {
            self.state = RoundState::Incorrect;
            self.timers
                .schedule(now + self.revert_delay, self.generation, RoundTimer::Revert);
            self.events.push(RoundEvent::Incorrect {
                generation: self.generation,
            });
            Some(Verdict::Incorrect)
        }
    }

    /// Give up on a pending answer without judging it and release the lock.
    /// Answers from a superseded round leave the current lock alone.
    pub fn abandon(&mut self, pending: PendingAnswer<A>) {
        if pending.generation == self.generation && self.state == RoundState::Active {
            log::debug!("Abandoned answer in round {}", self.generation);
            self.locked = false;
        }
    }

    /// Submit and resolve in one step, for hosts with nothing to wait on
    pub fn answer(&mut self, candidate: A, now: Millis) -> Option<Verdict> {
        let pending = self.submit(candidate)?;
        self.resolve(pending, now)
    }

    /// Fire timers due at `now`. Returns true if the round reverted to `Active`.
    pub fn tick(&mut self, now: Millis) -> bool {
        let mut reverted = false;
        for timer in self.timers.take_due(now) {
            if timer.generation != self.generation {
                log::trace!("Dropping stale timer from round {}", timer.generation);
                continue;
            }
            match timer.payload {
                RoundTimer::Revert if self.state == RoundState::Incorrect => {
                    self.state = RoundState::Active;
                    self.locked = false;
                    self.events.push(RoundEvent::Reverted {
                        generation: self.generation,
                    });
                    reverted = true;
                }
                RoundTimer::Revert => {}
            }
        }
        reverted
    }

    /// Move on after a correct answer
    pub fn advance(&mut self, next: Round<A>) -> Result<(), RoundError> {
        if self.state != RoundState::Correct {
            return Err(RoundError::NotComplete);
        }
        self.replace(next);
        Ok(())
    }

    /// Replace the round from any state, e.g. when the player skips ahead.
    /// Pending reverts and in-flight answers of the old round are discarded.
    pub fn restart(&mut self, next: Round<A>) {
        self.replace(next);
    }

    fn replace(&mut self, next: Round<A>) {
        let cancelled = self.timers.cancel_generation(self.generation);
        if cancelled > 0 {
            log::debug!("Cancelled {} pending timer(s) from round {}", cancelled, self.generation);
        }
        self.generation += 1;
        self.round = next;
        self.state = RoundState::Active;
        self.locked = false;
        self.events.push(RoundEvent::Advanced {
            generation: self.generation,
        });
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }
}
