//! Randomization primitives shared by the assignment and turn engines
//!
//! Everything takes an explicit `Rng` so games can be replayed from a seed.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Uniform permutation of `0..len` (Fisher-Yates via `SliceRandom::shuffle`).
pub fn shuffled_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    indices
}

/// Return a shuffled copy of `items`.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Pick one element uniformly, or `None` for an empty slice.
pub fn pick<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<T> {
    items.choose(rng).copied()
}

/// Pick two distinct elements uniformly, or `None` if fewer than two exist.
pub fn pick_pair<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<(T, T)> {
    if items.len() < 2 {
        return None;
    }
    let mut chosen = items.choose_multiple(rng, 2).copied();
    Some((chosen.next()?, chosen.next()?))
}

/// Fair coin flip.
pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shuffled_indices_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 0..12 {
            let mut indices = shuffled_indices(len, &mut rng);
            indices.sort_unstable();
            assert_eq!(indices, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_shuffle_first_position_is_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut first_counts = [0u32; 4];
        for _ in 0..8000 {
            let indices = shuffled_indices(4, &mut rng);
            first_counts[indices[0]] += 1;
        }
        for count in first_counts {
            // Expected 2000 each
            assert!((1700..2300).contains(&count), "biased count {}", count);
        }
    }

    #[test]
    fn test_pick_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [u8; 0] = [];
        assert_eq!(pick(&empty, &mut rng), None);
        assert_eq!(pick(&[9u8], &mut rng), Some(9));
    }

    #[test]
    fn test_pick_pair_is_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pick_pair(&[1u8], &mut rng), None);
        for _ in 0..200 {
            let (a, b) = pick_pair(&[1u8, 2, 3, 4, 5], &mut rng).unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_shuffled_keeps_elements() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut out = shuffled(&["a", "b", "c"], &mut rng);
        out.sort_unstable();
        assert_eq!(out, vec!["a", "b", "c"]);
    }
}
