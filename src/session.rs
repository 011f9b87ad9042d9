//! One game session: the current round, its layout and the audio output
//!
//! The session owns the seeded RNG so a run can be replayed from its seed,
//! and turns round events into feedback sounds.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioMixer, SoundEffect};
use crate::consts::ROUNDS_PER_CELEBRATION;
use crate::error::RoundError;
use crate::settings::Settings;
use crate::sim::{
    Answer, Millis, PendingAnswer, Prompt, QuizKind, Round, RoundEvent, RoundLifecycle,
    RoundState, Stage, Verdict,
};

/// A running game
pub struct GameSession {
    kind: QuizKind,
    seed: u64,
    rng: Pcg32,
    prompt: Prompt,
    lifecycle: RoundLifecycle<Answer>,
    mixer: AudioMixer,
    rounds_completed: u32,
    events: Vec<RoundEvent>,
}

impl GameSession {
    /// Start a session and generate its first round
    pub fn new(
        kind: QuizKind,
        seed: u64,
        stage: &Stage,
        settings: &Settings,
    ) -> Result<Self, RoundError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let quiz = kind.generate(stage, &mut rng)?;
        log::info!("Session started: {:?}, seed {}", kind, seed);
        Ok(Self {
            kind,
            seed,
            rng,
            prompt: quiz.prompt,
            lifecycle: RoundLifecycle::new(quiz.round),
            mixer: AudioMixer::new(settings),
            rounds_completed: 0,
            events: Vec::new(),
        })
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn round(&self) -> &Round<Answer> {
        self.lifecycle.round()
    }

    pub fn state(&self) -> RoundState {
        self.lifecycle.state()
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn accepts_input(&self) -> bool {
        self.lifecycle.accepts_input()
    }

    pub fn mixer(&self) -> &AudioMixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut AudioMixer {
        &mut self.mixer
    }

    /// First phase of an answer: take the lock and acknowledge the tap
    pub fn submit(&mut self, answer: Answer, now: Millis) -> Option<PendingAnswer<Answer>> {
        let pending = self.lifecycle.submit(answer)?;
        self.mixer.play_effect(SoundEffect::Tap, now);
        Some(pending)
    }

    /// Second phase, once the audio output is ready
    pub fn resolve(&mut self, pending: PendingAnswer<Answer>, now: Millis) -> Option<Verdict> {
        let verdict = self.lifecycle.resolve(pending, now);
        self.collect_events(now);
        verdict
    }

    /// Drop a pending answer unjudged, e.g. when the host cancels the tap
    pub fn abandon(&mut self, pending: PendingAnswer<Answer>) {
        self.lifecycle.abandon(pending);
    }

    pub fn answer(&mut self, answer: Answer, now: Millis) -> Option<Verdict> {
        let pending = self.submit(answer, now)?;
        self.resolve(pending, now)
    }

    /// Fire due timers and retire finished sounds
    pub fn tick(&mut self, now: Millis) {
        self.lifecycle.tick(now);
        self.mixer.update(now);
        self.collect_events(now);
    }

    /// Next round after a correct answer. `stage` is re-measured by the host.
    pub fn advance(&mut self, stage: &Stage, now: Millis) -> Result<(), RoundError> {
        if self.lifecycle.state() != RoundState::Correct {
            return Err(RoundError::NotComplete);
        }
        let quiz = self.kind.generate(stage, &mut self.rng)?;
        self.lifecycle.advance(quiz.round)?;
        self.prompt = quiz.prompt;
        self.collect_events(now);
        Ok(())
    }

    /// Replace the round regardless of its state
    pub fn skip(&mut self, stage: &Stage, now: Millis) -> Result<(), RoundError> {
        let quiz = self.kind.generate(stage, &mut self.rng)?;
        self.lifecycle.restart(quiz.round);
        self.prompt = quiz.prompt;
        self.collect_events(now);
        Ok(())
    }

    /// Events for the UI since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    fn collect_events(&mut self, now: Millis) {
        for event in self.lifecycle.drain_events() {
            match event {
                RoundEvent::Correct { .. } => {
                    self.rounds_completed += 1;
                    let effect = if self.rounds_completed % ROUNDS_PER_CELEBRATION == 0 {
                        SoundEffect::RoundComplete
                    } else {
                        SoundEffect::Correct
                    };
                    self.mixer.play_effect(effect, now);
                }
                RoundEvent::Incorrect { .. } => {
                    self.mixer.play_effect(SoundEffect::Incorrect, now);
                }
                RoundEvent::Reverted { .. } | RoundEvent::Advanced { .. } => {}
            }
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCommand, Channel, Sound};
    use crate::consts::REVERT_DELAY_MS;
    use crate::sim::Size;

    fn stage() -> Stage {
        Stage {
            bounds: Size::new(1024.0, 768.0),
            object_size: Size::square(90.0),
        }
    }

    fn wrong_answer(session: &GameSession) -> Answer {
        session
            .round()
            .options()
            .iter()
            .find(|o| *o != session.round().expected())
            .cloned()
            .expect("round has decoys")
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let kind = QuizKind::Counting { max: 10 };
        let a = GameSession::new(kind, 77, &stage(), &Settings::default()).unwrap();
        let b = GameSession::new(kind, 77, &stage(), &Settings::default()).unwrap();
        assert_eq!(a.round(), b.round());
        assert_eq!(a.prompt(), b.prompt());
    }

    #[test]
    fn test_counting_prompt_matches_expected() {
        let session = GameSession::new(
            QuizKind::Counting { max: 10 },
            3,
            &stage(),
            &Settings::default(),
        )
        .unwrap();
        let Prompt::Count { layout } = session.prompt() else {
            panic!("counting game shows objects");
        };
        assert_eq!(
            session.round().expected(),
            &Answer::Number(layout.positions.len() as u32)
        );
    }

    #[test]
    fn test_full_round_flow() {
        let mut session =
            GameSession::new(QuizKind::Letters, 5, &stage(), &Settings::default()).unwrap();

        let wrong = wrong_answer(&session);
        assert_eq!(session.answer(wrong, 0), Some(Verdict::Incorrect));
        assert!(!session.accepts_input());

        session.tick(REVERT_DELAY_MS);
        assert!(session.accepts_input());

        let right = session.round().expected().clone();
        assert_eq!(session.answer(right, 1000), Some(Verdict::Correct));
        assert_eq!(session.rounds_completed(), 1);

        session.advance(&stage(), 2000).unwrap();
        assert_eq!(session.state(), RoundState::Active);

        let events = session.drain_events();
        assert_eq!(
            events,
            vec![
                RoundEvent::Incorrect { generation: 0 },
                RoundEvent::Reverted { generation: 0 },
                RoundEvent::Correct { generation: 0 },
                RoundEvent::Advanced { generation: 1 },
            ]
        );
    }

    #[test]
    fn test_feedback_sounds() {
        let mut session =
            GameSession::new(QuizKind::Words, 9, &stage(), &Settings::default()).unwrap();
        let wrong = wrong_answer(&session);
        session.answer(wrong, 0);

        let sounds: Vec<Sound> = session
            .mixer_mut()
            .drain_commands()
            .into_iter()
            .filter_map(|c| match c {
                AudioCommand::Play { sound, .. } => Some(sound),
                _ => None,
            })
            .collect();
        assert_eq!(
            sounds,
            vec![
                Sound::Effect(SoundEffect::Tap),
                Sound::Effect(SoundEffect::Incorrect)
            ]
        );

        // Sounds retire themselves; the round keeps going
        session.tick(10_000);
        assert_eq!(session.mixer().active(Channel::Effect), 0);
    }

    #[test]
    fn test_advance_requires_correct() {
        let mut session = GameSession::new(
            QuizKind::Addition { max_sum: 10 },
            1,
            &stage(),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            session.advance(&stage(), 0),
            Err(RoundError::NotComplete)
        );
    }

    #[test]
    fn test_failed_advance_with_pending_answer_recovers() {
        let mut session =
            GameSession::new(QuizKind::Letters, 6, &stage(), &Settings::default()).unwrap();
        let right = session.round().expected().clone();
        let pending = session.submit(right.clone(), 0).unwrap();

        assert_eq!(session.advance(&stage(), 10), Err(RoundError::NotComplete));
        assert!(!session.accepts_input());

        session.abandon(pending);
        session.tick(10_000);
        assert_eq!(session.answer(right, 10_000), Some(Verdict::Correct));
    }

    #[test]
    fn test_skip_drops_pending_revert() {
        let mut session =
            GameSession::new(QuizKind::Letters, 12, &stage(), &Settings::default()).unwrap();
        let wrong = wrong_answer(&session);
        session.answer(wrong, 0);

        session.skip(&stage(), 100).unwrap();
        assert!(session.accepts_input());
        session.drain_events();

        session.tick(REVERT_DELAY_MS + 100);
        assert!(session.drain_events().is_empty());
        assert_eq!(session.state(), RoundState::Active);
    }

    #[test]
    fn test_celebration_every_few_rounds() {
        let mut session =
            GameSession::new(QuizKind::Letters, 4, &stage(), &Settings::default()).unwrap();
        let mut last_effect = None;
        for i in 0..ROUNDS_PER_CELEBRATION {
            let right = session.round().expected().clone();
            session.answer(right, u64::from(i) * 1000);
            last_effect = session
                .mixer_mut()
                .drain_commands()
                .into_iter()
                .filter_map(|c| match c {
                    AudioCommand::Play {
                        sound: Sound::Effect(effect),
                        ..
                    } => Some(effect),
                    _ => None,
                })
                .last();
            session.advance(&stage(), u64::from(i) * 1000 + 500).unwrap();
        }
        assert_eq!(last_effect, Some(SoundEffect::RoundComplete));
    }
}
