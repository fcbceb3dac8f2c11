use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Cumulative distribution of `base + Σ uniform(0, die - 1)`.
///
/// Queries run in O(1); the underlying table is shared through [`CdfCache`]
/// by every distribution with the same multiset of dice.
#[derive(Debug, Clone)]
pub struct DiceSumCdf {
    cdf: Arc<[f64]>,
    span: u32,
    base: u32,
    clip_min: u32,
}

impl DiceSumCdf {
    /// Builds the CDF without touching any cache.
    pub fn build(dice: &[u32], base: u32) -> Self {
        let key = canonical_key(dice);
        let span = key.iter().map(|d| d - 1).sum();
        Self {
            cdf: convolve_uniform(&key).into(),
            span,
            base,
            clip_min: 0,
        }
    }

    /// Folds all mass below `clip_min` onto `clip_min`.
    pub fn with_clip_min(mut self, clip_min: u32) -> Self {
        self.clip_min = clip_min;
        self
    }

    /// Inclusive bounds of the distribution's support.
    pub fn support(&self) -> (u32, u32) {
        (self.base, self.base + self.span)
    }

    /// P(begin <= X <= end), both ends inclusive.
    pub fn evaluate(&self, begin: u32, end: u32) -> f64 {
        debug_assert!(begin <= end, "begin must not exceed end");

        if end < self.base || end < self.clip_min {
            return 0.0;
        }
        if begin > self.span + self.base {
            return 0.0;
        }

        let end_offset = end - self.base;
        let upper = if end_offset >= self.span {
            1.0
        } else {
            self.cdf[end_offset as usize]
        };

        let lower = if begin <= self.clip_min || begin <= self.base {
            0.0
        } else {
            self.cdf[(begin - self.base - 1) as usize]
        };

        // Sliding-window round-off can leave the CDF a few ulps non-monotone.
        (upper - lower).max(0.0)
    }
}

/// Process-wide memo of dice-sum CDFs keyed by the sorted die list.
///
/// Entries are immutable once inserted; the lock only serializes the
/// first insertion of a key when several evaluation workers race for it.
#[derive(Debug, Default)]
pub struct CdfCache {
    entries: RwLock<HashMap<Vec<u32>, Arc<[f64]>>>,
}

impl CdfCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dice: &[u32], base: u32) -> DiceSumCdf {
        let key = canonical_key(dice);
        let span = key.iter().map(|d| d - 1).sum();

        let cached = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&key).cloned());

        let cdf = match cached {
            Some(cdf) => cdf,
            None => {
                let built: Arc<[f64]> = convolve_uniform(&key).into();
                match self.entries.write() {
                    Ok(mut entries) => entries.entry(key).or_insert(built).clone(),
                    // A poisoned lock only loses memoization, never correctness.
                    Err(_) => built,
                }
            }
        };

        DiceSumCdf {
            cdf,
            span,
            base,
            clip_min: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dice of size 0 or 1 add nothing to the sum and are dropped from the key.
fn canonical_key(dice: &[u32]) -> Vec<u32> {
    let mut key: Vec<u32> = dice.iter().copied().filter(|&d| d > 1).collect();
    key.sort_unstable();
    key
}

/// PMF convolution with a running window sum, integrated into a CDF.
fn convolve_uniform(dice: &[u32]) -> Vec<f64> {
    let mut pdf = vec![1.0f64];
    for &die in dice {
        let die = die as usize;
        let next_size = pdf.len() + die - 1;
        let mut next = vec![0.0; next_size];
        let scale = 1.0 / die as f64;

        let mut window = 0.0;
        for (j, slot) in next.iter_mut().enumerate() {
            if j < pdf.len() {
                window += pdf[j];
            }
            if j >= die {
                window -= pdf[j - die];
            }
            *slot = window * scale;
        }
        pdf = next;
    }

    let mut acc = 0.0;
    for p in pdf.iter_mut() {
        acc += *p;
        *p = acc;
    }
    pdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_d6_seven() {
        let cdf = DiceSumCdf::build(&[6, 6], 2);
        // 2d6 on faces 1..=6 is base 2 plus two 0..=5 dice.
        assert!((cdf.evaluate(7, 7) - 6.0 / 36.0).abs() < 1e-12);
        assert!((cdf.evaluate(2, 12) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cache_shares_tables() {
        let cache = CdfCache::new();
        let a = cache.get(&[4, 2, 3], 0);
        let b = cache.get(&[3, 4, 2], 10);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&a.cdf, &b.cdf));
        assert_eq!(b.support(), (10, 16));
    }

    #[test]
    fn test_no_dice_is_point_mass() {
        let cdf = DiceSumCdf::build(&[], 7);
        assert_eq!(cdf.evaluate(7, 7), 1.0);
        assert_eq!(cdf.evaluate(0, 6), 0.0);
        assert_eq!(cdf.evaluate(8, 100), 0.0);
    }

    #[test]
    fn test_partial_range_below_base_clamps() {
        let cdf = DiceSumCdf::build(&[10], 5);
        assert!((cdf.evaluate(0, 5) - 0.1).abs() < 1e-12);
        assert!(!cdf.evaluate(0, 9999).is_nan());
    }
}
