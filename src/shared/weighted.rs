//! Weighted random choice shared by world generation and wave spawning.

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one entry from `(value, weight)` pairs with a single uniform draw
/// over the cumulative weight. Returns `None` when the list is empty or
/// every weight is zero.
pub fn choose_weighted<'a, T, R: Rng + ?Sized>(items: &'a [(T, f32)], rng: &mut R) -> Option<&'a T> {
    items
        .choose_weighted(rng, |(_, weight)| (*weight).max(0.0))
        .ok()
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_and_zero_weight_lists_yield_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [(u8, f32); 0] = [];
        assert!(choose_weighted(&empty, &mut rng).is_none());
        assert!(choose_weighted(&[(1_u8, 0.0), (2, 0.0)], &mut rng).is_none());
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [("never", 0.0), ("always", 3.0)];
        for _ in 0..500 {
            assert_eq!(choose_weighted(&items, &mut rng), Some(&"always"));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let items = [('a', 1.0), ('b', 2.0), ('c', 5.0)];
        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);
        for _ in 0..64 {
            assert_eq!(
                choose_weighted(&items, &mut first),
                choose_weighted(&items, &mut second)
            );
        }
    }

    #[test]
    fn heavier_weight_wins_more_often() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = [("light", 1.0), ("heavy", 9.0)];
        let heavy = (0..2000)
            .filter(|_| choose_weighted(&items, &mut rng) == Some(&"heavy"))
            .count();
        assert!(heavy > 1500, "heavy picked only {heavy} / 2000 times");
    }
}
