//! Seeded randomness.
//!
//! Every generator draws from a [`Mulberry32`] stream. Nothing in the engine
//! touches an ambient random source, so a seed fully determines a puzzle.

use crate::error::GenError;

/// Mulberry32 PRNG: one `u32` of state, floats in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the state and return the next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Inclusive integer in `[min, max]`. Reversed bounds are swapped.
    pub fn rand_int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (hi - lo + 1) as f64;
        lo + (self.next_f64() * span).floor() as i64
    }

    /// Index in `[0, bound)`. `bound` must be non-zero.
    pub fn index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        ((self.next_f64() * bound as f64).floor() as usize).min(bound.saturating_sub(1))
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element. Fails on an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, GenError> {
        if items.is_empty() {
            return Err(GenError::EmptyChoice);
        }
        let i = self.index(items.len());
        Ok(&items[i])
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.index(i + 1);
            slice.swap(i, j);
        }
    }

    /// Shuffled copy.
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        self.shuffle(&mut out);
        out
    }

    /// `count` distinct elements in random order, or the whole list shuffled
    /// when `count >= items.len()`.
    pub fn sample_unique<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut out = self.shuffled(items);
        out.truncate(count.min(items.len()));
        out
    }

    /// Short id such as `cage-3f09a1`.
    pub fn make_id(&mut self, prefix: &str) -> String {
        format!("{}-{:06x}", prefix, self.next_u32() & 0x00FF_FFFF)
    }
}

/// Clamp `value` into `[lo, hi]`.
pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        let mut rng = Mulberry32::new(1);
        assert_eq!(rng.next_u32(), 2_693_262_067);
        assert_eq!(rng.next_u32(), 11_749_833);
        assert_eq!(rng.next_u32(), 2_265_367_787);

        let mut rng = Mulberry32::new(1);
        assert!((rng.next_f64() - 0.627_073_940_588_161_3).abs() < 1e-12);
    }

    #[test]
    fn test_floats_in_unit_interval() {
        let mut rng = Mulberry32::new(42);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_rand_int_bounds_and_swap() {
        let mut rng = Mulberry32::new(7);
        for _ in 0..1_000 {
            let v = rng.rand_int(9, 3);
            assert!((3..=9).contains(&v));
        }
        assert_eq!(rng.rand_int(5, 5), 5);
    }

    #[test]
    fn test_pick_empty_fails() {
        let mut rng = Mulberry32::new(7);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_err());
        assert_eq!(*rng.pick(&[4]).unwrap(), 4);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Mulberry32::new(99);
        let mut v: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_unique() {
        let mut rng = Mulberry32::new(3);
        let items = [1, 2, 3, 4, 5];
        let s = rng.sample_unique(&items, 3);
        assert_eq!(s.len(), 3);
        let mut d = s.clone();
        d.sort_unstable();
        d.dedup();
        assert_eq!(d.len(), 3);
        assert_eq!(rng.sample_unique(&items, 10).len(), 5);
    }

    #[test]
    fn test_clamp_and_id() {
        assert_eq!(clamp(5, 1, 3), 3);
        assert_eq!(clamp(-1, 1, 3), 1);
        assert_eq!(clamp(2, 1, 3), 2);
        let mut rng = Mulberry32::new(11);
        let id = rng.make_id("cage");
        assert!(id.starts_with("cage-"));
        assert_eq!(id.len(), "cage-".len() + 6);
    }
}
