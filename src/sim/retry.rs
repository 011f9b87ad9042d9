//! Bounded retry with deterministic fallback
//!
//! Random placement and decoy picking both sample until they find an
//! acceptable candidate or run out of attempts. The attempt count is kept
//! so callers (and tests) can tell a lucky sample from an exhausted budget.

/// Result of a bounded retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry<T> {
    /// A candidate was accepted on attempt number `attempts` (1-based)
    Found { value: T, attempts: u32 },
    /// Every attempt was rejected
    Exhausted { attempts: u32 },
}

impl<T> Retry<T> {
    /// Number of attempts consumed
    pub fn attempts(&self) -> u32 {
        match self {
            Retry::Found { attempts, .. } | Retry::Exhausted { attempts } => *attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Retry::Exhausted { .. })
    }

    /// Accepted value, if any
    pub fn found(self) -> Option<T> {
        match self {
            Retry::Found { value, .. } => Some(value),
            Retry::Exhausted { .. } => None,
        }
    }

    /// Resolve the exhausted case with a fallback value
    pub fn or_else_with(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Retry::Found { value, .. } => value,
            Retry::Exhausted { .. } => fallback(),
        }
    }
}

/// Call `attempt` up to `budget` times, stopping at the first `Some`.
///
/// The closure receives the 0-based attempt index.
pub fn bounded_retry<T>(budget: u32, mut attempt: impl FnMut(u32) -> Option<T>) -> Retry<T> {
    for i in 0..budget {
        if let Some(value) = attempt(i) {
            return Retry::Found {
                value,
                attempts: i + 1,
            };
        }
    }
    Retry::Exhausted { attempts: budget }
}
