//! Playroom - round logic for small learning games (counting, letters, sums)
//!
//! Core modules:
//! - `sim`: Deterministic logic (placement, picking, round lifecycle)
//! - `audio`: Feedback sounds and ambience on one shared output
//! - `session`: A running game tying rounds, RNG and audio together
//! - `settings`: Persisted volume/mute preferences
//! - `platform`: Browser/native platform abstraction
//! - `web`: `wasm_bindgen` exports (wasm32 only)

pub mod audio;
pub mod error;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{EmptyInputError, RoundError};
pub use session::GameSession;
pub use settings::Settings;

/// Game tuning constants
pub mod consts {
    /// Play areas narrower than this (px) are laid out on a grid
    pub const SMALL_SCREEN_WIDTH: f32 = 600.0;
    /// Rounds with more objects than this are laid out on a grid
    pub const GRID_COUNT_THRESHOLD: usize = 5;
    /// Padding floor around placed objects (px)
    pub const MIN_PADDING: f32 = 40.0;
    /// Padding as a share of object size
    pub const PADDING_RATIO: f32 = 0.2;
    /// Random samples per object before using its grid cell
    pub const PLACEMENT_ATTEMPT_BUDGET: u32 = 500;
    /// Grid jitter cap (px)
    pub const GRID_JITTER_MAX: f32 = 25.0;
    /// Grid jitter cap as a share of free cell space
    pub const GRID_JITTER_RATIO: f32 = 0.3;

    /// Most objects a counting round or a layout call will place
    pub const MAX_OBJECT_COUNT: u32 = 20;
    /// Largest sum an addition round may ask for
    pub const MAX_ADDITION_SUM: u32 = 20;

    /// Random draws shared by all decoys of one round
    pub const DECOY_ATTEMPT_BUDGET: u32 = 1000;
    /// Options shown per round (answer included)
    pub const OPTION_COUNT: usize = 8;
    /// Counting decoys stay this close to the answer when possible
    pub const COUNTING_DECOY_DISTANCE: f64 = 3.0;

    /// Wrong-answer feedback time before input is re-enabled (ms)
    pub const REVERT_DELAY_MS: u64 = 500;
    /// Every Nth correct answer gets the big fanfare
    pub const ROUNDS_PER_CELEBRATION: u32 = 5;
}
