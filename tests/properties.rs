use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use playroom::sim::placement::fits_within;
use playroom::sim::{
    PlacementConfig, PlacementRequest, Round, Size, Strategy, pick_distractors, place,
    place_with_report, shuffle,
};

proptest! {
    #[test]
    fn placement_returns_every_object_inside_bounds(
        count in 1usize..=20,
        object in 10u16..120,
        extra_w in 0u16..1200,
        extra_h in 0u16..900,
        seed in any::<u64>(),
    ) {
        let object_size = Size::square(f32::from(object));
        let bounds = Size::new(
            f32::from(object) + f32::from(extra_w),
            f32::from(object) + f32::from(extra_h),
        );
        let mut rng = Pcg32::seed_from_u64(seed);
        let positions = place(&PlacementRequest::new(count, bounds, object_size), &mut rng);

        prop_assert_eq!(positions.len(), count);
        for p in positions {
            prop_assert!(fits_within(p, object_size, bounds), "{:?} outside {:?}", p, bounds);
        }
    }

    #[test]
    fn sampled_placement_never_overlaps(count in 1usize..=5, seed in any::<u64>()) {
        let request = PlacementRequest::new(count, Size::new(800.0, 600.0), Size::square(80.0));
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = place_with_report(&request, &PlacementConfig::default(), &mut rng);

        prop_assert_eq!(layout.strategy, Strategy::Random);
        // Only an exhausted budget may excuse an overlap
        if layout.fallback_count() == 0 {
            prop_assert!(layout.is_overlap_free(layout.padding));
        }
    }

    #[test]
    fn distractors_fill_when_universe_is_large_enough(
        size in 2u32..60,
        count in 0usize..20,
        seed in any::<u64>(),
    ) {
        let universe: Vec<u32> = (0..size).collect();
        let correct = size / 2;
        let mut rng = Pcg32::seed_from_u64(seed);
        let decoys = pick_distractors(&correct, &universe, count, &mut rng);

        let available = universe.len() - 1;
        prop_assert_eq!(decoys.len(), count.min(available));
        prop_assert!(!decoys.contains(&correct));
        prop_assert!(decoys.iter().all(|d| universe.contains(d)));
        let mut unique = decoys.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), decoys.len());
    }

    #[test]
    fn shuffle_is_a_permutation(items in prop::collection::vec(any::<i16>(), 1..40), seed in any::<u64>()) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut shuffled = shuffle(&items, &mut rng).expect("non-empty input");
        let mut original = items.clone();
        shuffled.sort();
        original.sort();
        prop_assert_eq!(shuffled, original);
    }

    #[test]
    fn generated_rounds_hold_expected_once(size in 1u32..40, options in 1usize..12, seed in any::<u64>()) {
        let universe: Vec<u32> = (0..size).collect();
        let mut rng = Pcg32::seed_from_u64(seed);
        let round = Round::generate(&universe, options, &mut rng).expect("universe is not empty");

        prop_assert_eq!(round.options().len(), options.min(universe.len()));
        prop_assert_eq!(round.options().iter().filter(|o| *o == round.expected()).count(), 1);
    }
}

#[test]
fn scenario_three_objects_with_small_padding() {
    let mut rng = Pcg32::seed_from_u64(1234);
    let bounds = Size::new(800.0, 600.0);
    let request = PlacementRequest::new(3, bounds, Size::square(80.0)).with_min_padding(12.0);
    let layout = place_with_report(&request, &PlacementConfig::default(), &mut rng);

    assert_eq!(layout.positions.len(), 3);
    assert_eq!(layout.fallback_count(), 0);
    // Rectangle test: a pair counts as separated when it is 92px apart on
    // either axis, not on both
    assert!(layout.is_overlap_free(12.0));
    for p in &layout.positions {
        assert!(p.x >= 0.0 && p.x <= 720.0);
        assert!(p.y >= 0.0 && p.y <= 520.0);
    }
}

#[test]
fn scenario_digit_decoys() {
    let mut rng = Pcg32::seed_from_u64(99);
    let universe: Vec<u32> = (1..=9).collect();
    let decoys = pick_distractors(&5, &universe, 8, &mut rng);
    assert_eq!(decoys.len(), 8);
    assert!(!decoys.contains(&5));
    assert!(decoys.iter().all(|d| (1..=9).contains(d)));
}

#[test]
fn scenario_exhausted_alphabet() {
    let mut rng = Pcg32::seed_from_u64(99);
    let mut decoys = pick_distractors(&'A', &['A', 'B', 'C'], 8, &mut rng);
    decoys.sort();
    assert_eq!(decoys, vec!['B', 'C']);
}
