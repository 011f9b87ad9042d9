//! Uniform picks, Fisher-Yates shuffles and decoy selection
//!
//! Every function takes the random source explicitly so rounds are
//! reproducible under a seeded generator.

use rand::Rng;

use super::retry::bounded_retry;
use crate::consts::DECOY_ATTEMPT_BUDGET;
use crate::error::EmptyInputError;

/// Shuffle a slice in place (Fisher-Yates)
pub fn shuffle_in_place<T, R: Rng + ?Sized>(
    items: &mut [T],
    rng: &mut R,
) -> Result<(), EmptyInputError> {
    if items.is_empty() {
        return Err(EmptyInputError);
    }
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
    Ok(())
}

/// Return a shuffled copy, leaving the caller's slice untouched
pub fn shuffle<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    rng: &mut R,
) -> Result<Vec<T>, EmptyInputError> {
    let mut copy = items.to_vec();
    shuffle_in_place(&mut copy, rng)?;
    Ok(copy)
}

/// Uniformly pick one element
pub fn pick_one<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    rng: &mut R,
) -> Result<&'a T, EmptyInputError> {
    if items.is_empty() {
        return Err(EmptyInputError);
    }
    Ok(&items[rng.random_range(0..items.len())])
}

/// Pick up to `count` distinct decoys from `universe`, never `correct`.
///
/// Random sampling runs against a shared attempt budget; whatever is still
/// missing afterwards is filled by scanning `universe` in order. The result
/// is only shorter than `count` when the universe has no more distinct
/// values to give.
pub fn pick_distractors<T, R>(correct: &T, universe: &[T], count: usize, rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    fill_distractors(correct, universe, count, rng, |_| true)
}

/// Like [`pick_distractors`], but random picks must lie within
/// `max_distance` of `correct`. The in-order backfill ignores distance.
pub fn pick_distractors_near<T, R, D>(
    correct: &T,
    universe: &[T],
    count: usize,
    max_distance: f64,
    distance: D,
    rng: &mut R,
) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
    D: Fn(&T, &T) -> f64,
{
    fill_distractors(correct, universe, count, rng, |candidate| {
        distance(correct, candidate) <= max_distance
    })
}

fn fill_distractors<T, R>(
    correct: &T,
    universe: &[T],
    count: usize,
    rng: &mut R,
    accept: impl Fn(&T) -> bool,
) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut chosen: Vec<T> = Vec::with_capacity(count);
    if universe.is_empty() || count == 0 {
        return chosen;
    }

    let mut budget = DECOY_ATTEMPT_BUDGET;
    while chosen.len() < count && budget > 0 {
        let result = bounded_retry(budget, |_| {
            let candidate = &universe[rng.random_range(0..universe.len())];
            let usable = candidate != correct && !chosen.contains(candidate) && accept(candidate);
            usable.then(|| candidate.clone())
        });
        budget -= result.attempts();
        match result.found() {
            Some(value) => chosen.push(value),
            None => break,
        }
    }

    if chosen.len() < count {
        let sampled = chosen.len();
        for candidate in universe {
            if chosen.len() >= count {
                break;
            }
            if candidate != correct && !chosen.contains(candidate) {
                chosen.push(candidate.clone());
            }
        }
        log::trace!(
            "Decoy backfill: {} sampled, {} scanned, {} wanted",
            sampled,
            chosen.len() - sampled,
            count
        );
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_one_empty_fails() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty: [u32; 0] = [];
        assert_eq!(pick_one(&empty, &mut rng), Err(EmptyInputError));
        assert_eq!(shuffle(&empty, &mut rng), Err(EmptyInputError));
    }

    #[test]
    fn test_pick_one_returns_member() {
        let mut rng = Pcg32::seed_from_u64(7);
        let items = ['a', 'b', 'c'];
        for _ in 0..50 {
            assert!(items.contains(pick_one(&items, &mut rng).unwrap()));
        }
    }

    #[test]
    fn test_shuffle_leaves_input_alone() {
        let mut rng = Pcg32::seed_from_u64(3);
        let items = vec![1, 2, 3, 4, 5, 6];
        let mut shuffled = shuffle(&items, &mut rng).unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        shuffled.sort();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        // 24 permutations of [1, 2, 3, 4]; chi-square with 23 degrees of
        // freedom stays far below 60 for a uniform shuffle.
        let mut rng = Pcg32::seed_from_u64(2024);
        let trials = 10_000;
        let mut counts = std::collections::HashMap::new();
        for _ in 0..trials {
            let perm = shuffle(&[1, 2, 3, 4], &mut rng).unwrap();
            *counts.entry(perm).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 24);

        let expected = trials as f64 / 24.0;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < 60.0, "chi-square too high: {chi_square}");
    }

    #[test]
    fn test_distractors_full_universe() {
        let mut rng = Pcg32::seed_from_u64(11);
        let universe: Vec<u32> = (1..=9).collect();
        let decoys = pick_distractors(&5, &universe, 8, &mut rng);
        assert_eq!(decoys.len(), 8);
        assert!(!decoys.contains(&5));
        let mut sorted = decoys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, vec![1, 2, 3, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_distractors_small_alphabet() {
        let mut rng = Pcg32::seed_from_u64(5);
        let decoys = pick_distractors(&'A', &['A', 'B', 'C'], 8, &mut rng);
        assert_eq!(decoys.len(), 2);
        assert!(decoys.contains(&'B'));
        assert!(decoys.contains(&'C'));
    }

    #[test]
    fn test_distractors_only_correct_in_universe() {
        let mut rng = Pcg32::seed_from_u64(5);
        let decoys = pick_distractors(&1, &[1, 1, 1], 3, &mut rng);
        assert!(decoys.is_empty());
    }

    #[test]
    fn test_distractors_near_prefers_close_values() {
        let mut rng = Pcg32::seed_from_u64(9);
        let universe: Vec<i32> = (0..=100).collect();
        let decoys = pick_distractors_near(
            &50,
            &universe,
            4,
            3.0,
            |a, b| f64::from((a - b).abs()),
            &mut rng,
        );
        assert_eq!(decoys.len(), 4);
        assert!(decoys.iter().all(|d| (d - 50).abs() <= 3 && *d != 50));
    }

    #[test]
    fn test_distractors_near_backfills_in_order() {
        // Only two values lie within distance 1, so the remaining slot comes
        // from the in-order scan.
        let mut rng = Pcg32::seed_from_u64(9);
        let universe: Vec<i32> = (0..=10).collect();
        let decoys = pick_distractors_near(
            &5,
            &universe,
            3,
            1.0,
            |a, b| f64::from((a - b).abs()),
            &mut rng,
        );
        assert_eq!(decoys.len(), 3);
        assert!(decoys.contains(&4));
        assert!(decoys.contains(&6));
        assert!(decoys.contains(&0));
    }
}
