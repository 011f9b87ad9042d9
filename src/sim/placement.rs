//! Non-overlapping placement of equal-size objects in a play area
//!
//! Two strategies, picked by policy rather than by failure:
//! - `Random`: rejection sampling with an axis-aligned overlap test
//! - `Grid`: row/column cells with a little jitter so it doesn't look stiff
//!
//! Random placement falls back to the object's grid cell when its attempt
//! budget runs out, so `place` always returns exactly `count` positions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::retry::{Retry, bounded_retry};
use crate::consts::*;

/// Top-left corner of a placed object, relative to the play area origin
pub type Position = Vec2;

/// Width/height pair used for both the play area and the objects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn max_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// Input to the placement engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Number of objects to place
    pub count: usize,
    /// Play area, measured from the rendered container at round start
    pub bounds: Size,
    /// Size shared by every object this round
    pub object_size: Size,
    /// Lower bound for the gap kept around each object
    pub min_padding: f32,
}

impl PlacementRequest {
    /// Request with the default padding floor
    pub fn new(count: usize, bounds: Size, object_size: Size) -> Self {
        Self {
            count,
            bounds,
            object_size,
            min_padding: MIN_PADDING,
        }
    }

    pub fn with_min_padding(mut self, min_padding: f32) -> Self {
        self.min_padding = min_padding;
        self
    }
}

/// Placement tuning, defaults match `consts`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Play areas narrower than this always use the grid
    pub small_screen_width: f32,
    /// More objects than this always use the grid
    pub grid_count_threshold: usize,
    /// Padding grows with object size by this factor
    pub padding_ratio: f32,
    /// Random samples tried per object before falling back to its grid cell
    pub attempt_budget: u32,
    /// Absolute cap on grid jitter per axis
    pub jitter_max: f32,
    /// Jitter cap as a share of the free space in a cell
    pub jitter_ratio: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            small_screen_width: SMALL_SCREEN_WIDTH,
            grid_count_threshold: GRID_COUNT_THRESHOLD,
            padding_ratio: PADDING_RATIO,
            attempt_budget: PLACEMENT_ATTEMPT_BUDGET,
            jitter_max: GRID_JITTER_MAX,
            jitter_ratio: GRID_JITTER_RATIO,
        }
    }
}

/// Layout strategy chosen for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Random,
    Grid,
}

/// How a single object got its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    /// Accepted random sample after `attempts` tries
    Sampled { attempts: u32 },
    /// Budget exhausted, placed in its grid cell
    GridFallback { attempts: u32 },
    /// Placed by the grid strategy
    Grid,
}

/// Placement result with per-object diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub strategy: Strategy,
    /// Padding actually used
    pub padding: f32,
    pub object_size: Size,
    pub positions: Vec<Position>,
    pub outcomes: Vec<PlacementOutcome>,
}

impl Layout {
    /// Number of objects that fell back to the grid
    pub fn fallback_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PlacementOutcome::GridFallback { .. }))
            .count()
    }

    /// True when no two objects overlap (with `margin` around each)
    pub fn is_overlap_free(&self, margin: f32) -> bool {
        self.positions.iter().enumerate().all(|(i, a)| {
            self.positions[i + 1..]
                .iter()
                .all(|b| !overlaps(*a, *b, self.object_size, margin))
        })
    }
}

/// Axis-aligned overlap test between two equal-size objects, padded by `margin`
pub fn overlaps(a: Position, b: Position, size: Size, margin: f32) -> bool {
    let d = (a - b).abs();
    d.x < size.width + margin && d.y < size.height + margin
}

/// True when an object at `pos` lies fully inside `bounds`
pub fn fits_within(pos: Position, size: Size, bounds: Size) -> bool {
    pos.x >= 0.0
        && pos.y >= 0.0
        && pos.x + size.width <= bounds.width
        && pos.y + size.height <= bounds.height
}

/// Strategy for a request: small screens and crowded rounds use the grid
pub fn select_strategy(request: &PlacementRequest, config: &PlacementConfig) -> Strategy {
    if request.bounds.width < config.small_screen_width || request.count > config.grid_count_threshold
    {
        Strategy::Grid
    } else {
        Strategy::Random
    }
}

/// Padding kept around objects: the larger of the floor and the size-scaled gap
pub fn effective_padding(request: &PlacementRequest, config: &PlacementConfig) -> f32 {
    request
        .min_padding
        .max(request.object_size.max_side() * config.padding_ratio)
}

/// Place `request.count` objects with the default configuration
pub fn place<R: Rng + ?Sized>(request: &PlacementRequest, rng: &mut R) -> Vec<Position> {
    place_with_report(request, &PlacementConfig::default(), rng).positions
}

/// Place objects and report which strategy and fallbacks were used
pub fn place_with_report<R: Rng + ?Sized>(
    request: &PlacementRequest,
    config: &PlacementConfig,
    rng: &mut R,
) -> Layout {
    let strategy = select_strategy(request, config);
    let padding = effective_padding(request, config);
    let area = PlayArea::new(request, padding);

    let mut positions: Vec<Position> = Vec::with_capacity(request.count);
    let mut outcomes = Vec::with_capacity(request.count);

    for index in 0..request.count {
        let (pos, outcome) = match strategy {
            Strategy::Grid => (area.jittered_cell(index, config, rng), PlacementOutcome::Grid),
            Strategy::Random => {
                let result = bounded_retry(config.attempt_budget, |_| {
                    let candidate = area.sample(rng);
                    positions
                        .iter()
                        .all(|p| !overlaps(*p, candidate, request.object_size, padding))
                        .then_some(candidate)
                });
                match result {
                    Retry::Found { value, attempts } => {
                        (value, PlacementOutcome::Sampled { attempts })
                    }
                    Retry::Exhausted { attempts } => {
                        log::debug!(
                            "Placement budget exhausted for object {}, using grid cell",
                            index
                        );
                        (area.cell(index), PlacementOutcome::GridFallback { attempts })
                    }
                }
            }
        };
        positions.push(pos);
        outcomes.push(outcome);
    }

    Layout {
        strategy,
        padding,
        object_size: request.object_size,
        positions,
        outcomes,
    }
}

/// Legal top-left range on one axis
#[derive(Debug, Clone, Copy)]
struct AxisRange {
    lo: f32,
    hi: f32,
}

impl AxisRange {
    /// `[padding, bound - size - padding]`, collapsing to the centered
    /// position when the padded range is empty. Non-finite geometry pins
    /// the axis to 0.
    fn new(bound: f32, size: f32, padding: f32) -> Self {
        let hi = bound - size - padding;
        if !hi.is_finite() || !padding.is_finite() {
            log::warn!("Non-finite placement axis (bound {}, size {})", bound, size);
            return Self { lo: 0.0, hi: 0.0 };
        }
        if hi >= padding {
            Self { lo: padding, hi }
        } else {
            let mid = ((bound - size) / 2.0).max(0.0);
            Self { lo: mid, hi: mid }
        }
    }

    fn clamp(&self, v: f32) -> f32 {
        if v.is_nan() {
            self.lo
        } else {
            v.clamp(self.lo, self.hi)
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        sample_between(rng, self.lo, self.hi)
    }
}

fn sample_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo && (hi - lo).is_finite() {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// Precomputed geometry for one placement call
struct PlayArea {
    size: Size,
    padding: f32,
    x: AxisRange,
    y: AxisRange,
    cols: usize,
    cell: Vec2,
}

impl PlayArea {
    fn new(request: &PlacementRequest, padding: f32) -> Self {
        let count = request.count.max(1);
        let cols = (count as f32).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);
        let inner = request.bounds.as_vec2() - Vec2::splat(2.0 * padding);
        Self {
            size: request.object_size,
            padding,
            x: AxisRange::new(request.bounds.width, request.object_size.width, padding),
            y: AxisRange::new(request.bounds.height, request.object_size.height, padding),
            cols,
            cell: inner / Vec2::new(cols as f32, rows as f32),
        }
    }

    fn clamp(&self, pos: Vec2) -> Position {
        Vec2::new(self.x.clamp(pos.x), self.y.clamp(pos.y))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Vec2::new(self.x.sample(rng), self.y.sample(rng))
    }

    /// Unjittered position: cell center minus half the object
    fn cell_origin(&self, index: usize) -> Vec2 {
        let col = (index % self.cols) as f32;
        let row = (index / self.cols) as f32;
        let center = Vec2::splat(self.padding) + (Vec2::new(col, row) + 0.5) * self.cell;
        center - self.size.as_vec2() / 2.0
    }

    /// Deterministic grid cell position for `index`
    fn cell(&self, index: usize) -> Position {
        self.clamp(self.cell_origin(index))
    }

    fn jittered_cell<R: Rng + ?Sized>(
        &self,
        index: usize,
        config: &PlacementConfig,
        rng: &mut R,
    ) -> Position {
        let free = (self.cell - self.size.as_vec2()).max(Vec2::ZERO);
        let limit = (free * config.jitter_ratio).min(Vec2::splat(config.jitter_max));
        let jitter = Vec2::new(
            sample_between(rng, -limit.x, limit.x),
            sample_between(rng, -limit.y, limit.y),
        );
        self.clamp(self.cell_origin(index) + jitter)
    }
}
