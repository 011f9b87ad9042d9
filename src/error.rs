//! Error types for round setup
//!
//! Placement never fails and decoy under-fill is not an error, so the only
//! failures here are empty inputs, out-of-range game parameters and
//! malformed rounds.

use derive_more::{Display, Error};

/// A pick or shuffle was asked to work on an empty collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("cannot pick from an empty collection")]
pub struct EmptyInputError;

/// Round construction and sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RoundError {
    /// The answer universe or option list was empty
    #[display("round resources missing: {_0}")]
    EmptyInput(EmptyInputError),
    /// Options must contain the expected answer exactly once
    #[display("expected answer appears {count} times among the options")]
    ExpectedCount { count: usize },
    /// Decoys must be pairwise distinct
    #[display("option {index} duplicates an earlier option")]
    DuplicateOption { index: usize },
    /// A game parameter from the host is outside what the game supports
    #[display("{value} is outside the supported range {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
    /// `advance` is only legal once the round was answered correctly
    #[display("round can only advance after a correct answer")]
    NotComplete,
}

impl From<EmptyInputError> for RoundError {
    fn from(err: EmptyInputError) -> Self {
        Self::EmptyInput(err)
    }
}
