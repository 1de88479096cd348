//! Sequential draw without replacement
//!
//! Each raw index `t` is bumped past every already drawn value `l <= t`,
//! visiting drawn values in ascending order. This walk defines which number a
//! raw index lands on; historical Keno and Mines results depend on it, so it
//! must not be replaced by a shuffle even if the distribution would match.

/// Set of drawn values below 64, kept as a bitmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawPool {
    drawn: u64,
}

impl DrawPool {
    /// Largest value the pool can hold
    pub const CAPACITY: u8 = 63;

    pub fn new() -> Self {
        Self::default()
    }

    /// Bump `raw` past collisions, record it and return the final value
    pub fn insert(&mut self, raw: u8) -> u8 {
        let mut value = raw;
        let mut drawn = self.drawn;

        // Ascending walk over set bits; stops once the lowest drawn value exceeds `value`
        while drawn != 0 {
            let lowest = drawn.trailing_zeros() as u8;
            if lowest > value {
                break;
            }
            value += 1;
            drawn &= drawn - 1;
        }

        debug_assert!(value <= Self::CAPACITY);
        self.drawn |= 1u64 << value;
        value
    }

    pub fn contains(&self, value: u8) -> bool {
        value <= Self::CAPACITY && self.drawn & (1u64 << value) != 0
    }
}

/// Run the bump walk over a sequence of raw indices, keeping draw order
pub fn draw_distinct(raws: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut pool = DrawPool::new();
    raws.into_iter().map(|raw| pool.insert(raw)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{final_values, SeedData};

    /// Linear walk over a sorted list of drawn values
    fn linear_walk(raws: &[u8]) -> Vec<u8> {
        let mut sorted: Vec<u8> = Vec::new();
        raws.iter()
            .map(|&raw| {
                let mut value = raw;
                for &drawn in &sorted {
                    if drawn <= value {
                        value += 1;
                    }
                }
                let at = sorted.partition_point(|&drawn| drawn < value);
                sorted.insert(at, value);
                value
            })
            .collect()
    }

    /// Raw indices `floor(e_i * (pool - i))` as Keno and Mines derive them
    fn raw_indices(nonce: u64, pool: u8, draws: usize) -> Vec<u8> {
        let seed = SeedData::new("c".repeat(64), "draw-walk", nonce);
        final_values(&seed, draws)
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, e)| (e * f64::from(pool - i as u8)).floor() as u8)
            .collect()
    }

    #[test]
    fn test_bitmap_walk_matches_linear_walk() {
        for nonce in 0..500 {
            let keno = raw_indices(nonce, 40, 10);
            assert_eq!(draw_distinct(keno.iter().copied()), linear_walk(&keno), "keno nonce {}", nonce);

            let mines = raw_indices(nonce, 25, 24);
            assert_eq!(draw_distinct(mines.iter().copied()), linear_walk(&mines), "mines nonce {}", nonce);
        }
    }

    #[test]
    fn test_bitmap_walk_matches_linear_walk_on_adversarial_sequences() {
        let sequences: [&[u8]; 5] = [
            &[0; 24],
            &[24, 23, 22, 21, 20, 19, 18, 17, 16, 15],
            &[0, 1, 0, 1, 0, 1, 0, 1],
            &[12, 0, 12, 0, 12, 0, 12],
            &[39, 0, 38, 1, 36, 2, 34, 3, 32, 4],
        ];
        for raws in sequences {
            assert_eq!(draw_distinct(raws.iter().copied()), linear_walk(raws));
        }
    }

    #[test]
    fn test_no_collisions_passes_through() {
        assert_eq!(draw_distinct([4, 9, 1]), vec![4, 9, 1]);
    }

    #[test]
    fn test_repeated_index_walks_upward() {
        assert_eq!(draw_distinct([10; 10]), (10..20).collect::<Vec<u8>>());
        assert_eq!(draw_distinct([1; 10]), (1..11).collect::<Vec<u8>>());
    }

    #[test]
    fn test_hand_traced_keno_collisions() {
        // 3 -> 3
        // 3 -> bumps past 3 -> 4
        // 1 -> 1 (3 and 4 are above it)
        // 7 -> bumps past 1,3,4 -> 10
        // 2 -> past 1 -> 3, past 3 -> 4, past 4 -> 5, 10 is above -> 5
        // 30 -> past 1,3,4,5,10 -> 35
        // 0 -> 0
        // 12 -> past 0,1,3,4,5,10 -> 18
        // 3 -> past 0,1 -> 5, past 3,4,5 -> 8
        // 25 -> past 0,1,3,4,5,8,10,18 -> 33
        let drawn = draw_distinct([3, 3, 1, 7, 2, 30, 0, 12, 3, 25]);
        assert_eq!(drawn, vec![3, 4, 1, 10, 5, 35, 0, 18, 8, 33]);
    }

    #[test]
    fn test_bump_chain_from_linear_reference() {
        assert_eq!(draw_distinct([5, 5, 5, 1, 36]), vec![5, 6, 7, 1, 40]);
    }

    #[test]
    fn test_pool_tracks_membership() {
        let mut pool = DrawPool::new();
        assert!(!pool.contains(2));
        pool.insert(2);
        pool.insert(2);
        assert!(pool.contains(2));
        assert!(pool.contains(3));
        assert!(!pool.contains(4));
        assert_eq!(pool, DrawPool { drawn: 0b1100 });
    }
}
