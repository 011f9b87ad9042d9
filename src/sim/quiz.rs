//! Round generators for the individual games
//!
//! Each game only differs in its answer universe and what it shows the
//! player; the round rules are shared.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::picker::{pick_distractors, pick_distractors_near, pick_one};
use super::placement::{Layout, PlacementConfig, PlacementRequest, Size, place_with_report};
use super::round::Round;
use crate::consts::{COUNTING_DECOY_DISTANCE, MAX_ADDITION_SUM, MAX_OBJECT_COUNT, OPTION_COUNT};
use crate::error::RoundError;

/// Short words for the word recognition game
pub const WORDS: &[&str] = &[
    "CAT", "DOG", "SUN", "HAT", "BUS", "CUP", "PIG", "BED", "FOX", "HEN", "MAP", "BOX", "RED",
    "EGG", "ANT", "OWL",
];

/// Upper-case Latin alphabet
pub fn letters() -> Vec<char> {
    ('A'..='Z').collect()
}

/// Answer value shared by every game
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Number(u32),
    Letter(char),
    Word(String),
}

/// Which game to generate rounds for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizKind {
    /// Count the objects on screen, 1..=max
    Counting { max: u32 },
    /// Find the named letter
    Letters,
    /// Solve `a + b` with a sum up to `max_sum`
    Addition { max_sum: u32 },
    /// Find the named word
    Words,
}

/// What the UI shows alongside the options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prompt {
    /// Objects to count, already laid out
    Count { layout: Layout },
    /// Letter to find (spoken or shown)
    Letter(char),
    Sum { a: u32, b: u32 },
    Word(String),
}

/// A generated round plus its prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub prompt: Prompt,
    pub round: Round<Answer>,
}

/// Play area and object size for games that lay out objects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub bounds: Size,
    pub object_size: Size,
}

impl QuizKind {
    /// Generate the next quiz for this game
    pub fn generate<R: Rng + ?Sized>(&self, stage: &Stage, rng: &mut R) -> Result<Quiz, RoundError> {
        let quiz = match *self {
            QuizKind::Counting { max } => {
                let plan = counting_round(max, stage, OPTION_COUNT, rng)?;
                Quiz {
                    prompt: Prompt::Count {
                        layout: plan.layout,
                    },
                    round: plan.round.map(Answer::Number),
                }
            }
            QuizKind::Letters => {
                let round = Round::generate(&letters(), OPTION_COUNT, rng)?;
                Quiz {
                    prompt: Prompt::Letter(*round.expected()),
                    round: round.map(Answer::Letter),
                }
            }
            QuizKind::Addition { max_sum } => {
                let sum = addition_round(max_sum, OPTION_COUNT, rng)?;
                Quiz {
                    prompt: Prompt::Sum { a: sum.a, b: sum.b },
                    round: sum.round.map(Answer::Number),
                }
            }
            QuizKind::Words => {
                let round = Round::generate(WORDS, OPTION_COUNT, rng)?;
                Quiz {
                    prompt: Prompt::Word(round.expected().to_string()),
                    round: round.map(|w| Answer::Word(w.to_string())),
                }
            }
        };
        Ok(quiz)
    }
}

/// Counting round: the number and the objects to count
#[derive(Debug, Clone, PartialEq)]
pub struct CountingPlan {
    pub round: Round<u32>,
    pub layout: Layout,
}

fn check_range(value: u32, min: u32, max: u32) -> Result<(), RoundError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RoundError::OutOfRange { value, min, max })
    }
}

/// Pick a count in `1..=max`, decoys close to it, and lay out that many objects.
/// `max` must be within `1..=MAX_OBJECT_COUNT`.
pub fn counting_round<R: Rng + ?Sized>(
    max: u32,
    stage: &Stage,
    option_count: usize,
    rng: &mut R,
) -> Result<CountingPlan, RoundError> {
    check_range(max, 1, MAX_OBJECT_COUNT)?;
    let universe: Vec<u32> = (1..=max).collect();
    let expected = *pick_one(&universe, rng)?;
    let decoys = pick_distractors_near(
        &expected,
        &universe,
        option_count.saturating_sub(1),
        COUNTING_DECOY_DISTANCE,
        |a, b| f64::from(a.abs_diff(*b)),
        rng,
    );
    let round = Round::from_decoys(expected, decoys, rng)?;

    let request = PlacementRequest::new(expected as usize, stage.bounds, stage.object_size);
    let layout = place_with_report(&request, &PlacementConfig::default(), rng);

    Ok(CountingPlan { round, layout })
}

/// Addition round: `a + b = sum`
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionPlan {
    pub a: u32,
    pub b: u32,
    pub round: Round<u32>,
}

pub fn addition_round<R: Rng + ?Sized>(
    max_sum: u32,
    option_count: usize,
    rng: &mut R,
) -> Result<AdditionPlan, RoundError> {
    check_range(max_sum, 0, MAX_ADDITION_SUM)?;
    let a = rng.random_range(0..=max_sum);
    let b = rng.random_range(0..=max_sum - a);
    let sum = a + b;
    let universe: Vec<u32> = (0..=max_sum).collect();
    let decoys = pick_distractors(&sum, &universe, option_count.saturating_sub(1), rng);
    let round = Round::from_decoys(sum, decoys, rng)?;
    Ok(AdditionPlan { a, b, round })
}
