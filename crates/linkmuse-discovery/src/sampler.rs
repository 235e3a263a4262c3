//! Uniform sampling without replacement.

use rand::Rng;

/// Pick `min(n, items.len())` distinct elements uniformly at random.
///
/// The output order is random too. When `n >= items.len()` every element is
/// returned.
pub fn sample<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    sample_with_rng(items, n, &mut rand::thread_rng())
}

/// [`sample`] with a caller-supplied RNG.
///
/// Partial Fisher–Yates over an index vector: only the first `k` positions
/// are shuffled, so the cost is `O(len)` to set up and `O(k)` to draw.
pub fn sample_with_rng<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    let k = n.min(items.len());
    let mut indices: Vec<usize> = (0..items.len()).collect();
    for i in 0..k {
        let j = rng.gen_range(i..indices.len());
        indices.swap(i, j);
    }
    indices[..k].iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_size() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(sample(&items, 3).len(), 3);
        assert_eq!(sample(&items, 10).len(), 10);
        assert_eq!(sample(&items, 50).len(), 10);
        assert!(sample(&items, 0).is_empty());
        assert!(sample::<u32>(&[], 5).is_empty());
    }

    #[test]
    fn test_sample_is_distinct_subset() {
        let items: Vec<u32> = (0..100).collect();
        for _ in 0..20 {
            let picked = sample(&items, 30);
            let unique: HashSet<_> = picked.iter().copied().collect();
            assert_eq!(unique.len(), 30);
            assert!(picked.iter().all(|x| *x < 100));
        }
    }

    #[test]
    fn test_sample_everything_when_n_covers_len() {
        let items = vec!["a", "b", "c"];
        let mut picked = sample(&items, 3);
        picked.sort();
        assert_eq!(picked, items);
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let items: Vec<u32> = (0..50).collect();
        let a = sample_with_rng(&items, 5, &mut StdRng::seed_from_u64(42));
        let b = sample_with_rng(&items, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_element_reachable() {
        let items: Vec<u32> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(sample_with_rng(&items, 1, &mut rng));
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_inclusion_frequency_is_uniform() {
        const DRAWS: usize = 10_000;
        const K: usize = 3;
        let items: Vec<usize> = (0..10).collect();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [0usize; 10];

        for _ in 0..DRAWS {
            for i in sample_with_rng(&items, K, &mut rng) {
                counts[i] += 1;
            }
        }

        // Expected 3000 per index; one standard deviation is about 46.
        let expected = (DRAWS * K / items.len()) as f64;
        for (i, &count) in counts.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.1, "index {i} drawn {count} times, expected ~{expected}");
        }
        assert_eq!(counts.iter().sum::<usize>(), DRAWS * K);
    }
}
