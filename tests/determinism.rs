//! Deterministic generation: same seed, same sequence — no exceptions.

use fastmath::Random;
use proptest::prelude::*;

#[test]
fn same_seed_produces_identical_u32_sequence() {
    let mut a = Random::new(12345);
    let mut b = Random::new(12345);

    for i in 0..1000 {
        let va = a.next_u32();
        let vb = b.next_u32();
        assert_eq!(va, vb, "determinism broken at draw {}: {} != {}", i, va, vb);
    }
}

#[test]
fn different_seeds_produce_different_sequences() {
    let mut a = Random::new(12345);
    let mut b = Random::new(54321);
    assert_ne!(
        a.next_u32(),
        b.next_u32(),
        "different seeds should produce different values"
    );
}

#[test]
fn thousand_floats_stay_in_half_open_range() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = Random::new(12345);
    for i in 0..1000 {
        let f = rng.next_f32();
        assert!(
            (0.0..1.0).contains(&f),
            "draw {} out of [0, 1): {}",
            i,
            f
        );
    }
}

#[test]
fn fill_matches_fresh_generator_element_for_element() {
    let mut rng = Random::new(12345);
    let mut buf = [0.0f32; 10];
    rng.fill(&mut buf);

    let mut fresh = Random::new(12345);
    for (i, &v) in buf.iter().enumerate() {
        assert!((0.0..1.0).contains(&v), "fill element {} out of range", i);
        assert_eq!(
            v,
            fresh.next_f32(),
            "fill element {} differs from sequential draws",
            i
        );
    }
}

#[test]
fn zero_seed_does_not_degenerate() {
    // An all-zero xoshiro state emits zero forever; a usable seed-0
    // generator therefore proves the state was repaired at construction.
    let mut rng = Random::new(0);
    let first = rng.next_u32();
    let diverse = (0..32).any(|_| rng.next_u32() != first);
    assert!(diverse, "seed 0 produced a constant sequence");
}

#[test]
fn default_seed_is_12345() {
    let mut a = Random::default();
    let mut b = Random::new(12345);
    for _ in 0..10 {
        assert_eq!(a.next_u32(), b.next_u32());
    }
}

proptest! {
    #[test]
    fn floats_in_range_for_all_seeds(seed: u32, draws in 1usize..200) {
        let mut rng = Random::new(seed);
        for _ in 0..draws {
            let f = rng.next_f32();
            prop_assert!((0.0..1.0).contains(&f), "seed {} produced {}", seed, f);
        }
    }

    #[test]
    fn sequences_deterministic_for_all_seeds(seed: u32) {
        let mut a = Random::new(seed);
        let mut b = Random::new(seed);
        for _ in 0..50 {
            prop_assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn fill_equivalence_for_all_seeds(seed: u32, len in 0usize..64) {
        let mut rng = Random::new(seed);
        let mut buf = vec![0.0f32; len];
        rng.fill(&mut buf);

        let mut fresh = Random::new(seed);
        for (i, &v) in buf.iter().enumerate() {
            prop_assert_eq!(v, fresh.next_f32(), "diverged at element {}", i);
        }
    }
}
