//! Deterministic game logic
//!
//! Layout, picking and round sequencing live here. This module must be pure
//! and deterministic:
//! - Random source injected by the caller (seeded in tests)
//! - Time supplied by the host as milliseconds
//! - No DOM, audio or platform dependencies

pub mod picker;
pub mod placement;
pub mod quiz;
pub mod retry;
pub mod round;
pub mod timer;

pub use picker::{pick_distractors, pick_distractors_near, pick_one, shuffle, shuffle_in_place};
pub use placement::{
    Layout, PlacementConfig, PlacementOutcome, PlacementRequest, Position, Size, Strategy, place,
    place_with_report,
};
pub use quiz::{Answer, Prompt, Quiz, QuizKind, Stage};
pub use retry::{Retry, bounded_retry};
pub use round::{
    PendingAnswer, Round, RoundEvent, RoundLifecycle, RoundObserver, RoundState, Verdict,
};
pub use timer::{Millis, TimerQueue};
