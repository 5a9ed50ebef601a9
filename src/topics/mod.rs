//! Topic selection without repetition.
//!
//! A run picks one unused topic from a fixed [`TopicPool`] uniformly at
//! random. The set of used indices is persisted between runs so that every
//! topic is published at most once; once the pool is exhausted selection
//! fails instead of wrapping around.

mod pool;
mod used;

pub use pool::TopicPool;
pub use used::UsedTopics;

use crate::error::{AutocastError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// A selected topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTopic {
    pub index: usize,
    pub topic: String,
}

/// Pick an unused topic uniformly at random.
///
/// The caller persists `used ∪ {index}` before doing anything with external
/// consequences.
pub fn select<R: Rng + ?Sized>(
    pool: &TopicPool,
    used: &UsedTopics,
    rng: &mut R,
) -> Result<SelectedTopic> {
    let available: Vec<usize> = (0..pool.len()).filter(|i| !used.contains(*i)).collect();

    let index = *available.choose(rng).ok_or(AutocastError::ExhaustedPool {
        pool_size: pool.len(),
    })?;

    let topic = pool
        .get(index)
        .ok_or_else(|| AutocastError::InvalidInput(format!("Topic index {} out of range", index)))?
        .to_string();

    Ok(SelectedTopic { index, topic })
}

/// Usage summary for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicStatus {
    pub pool_size: usize,
    pub used: usize,
    pub remaining: usize,
}

impl TopicStatus {
    pub fn new(pool: &TopicPool, used: &UsedTopics) -> Self {
        let used_count = used.count_within(pool.len());
        Self {
            pool_size: pool.len(),
            used: used_count,
            remaining: pool.len() - used_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool_of(n: usize) -> TopicPool {
        TopicPool::new((0..n).map(|i| format!("topic {}", i)).collect()).unwrap()
    }

    #[test]
    fn test_full_used_set_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 1..8 {
            let pool = pool_of(n);
            let used: UsedTopics = (0..n).collect();
            match select(&pool, &used, &mut rng) {
                Err(AutocastError::ExhaustedPool { pool_size }) => assert_eq!(pool_size, n),
                other => panic!("expected exhausted pool, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_selects_unused_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..10 {
            let pool = pool_of(n);
            for k in 0..n {
                let used: UsedTopics = (0..k).collect();
                for _ in 0..20 {
                    let selected = select(&pool, &used, &mut rng).unwrap();
                    assert!(selected.index < n);
                    assert!(!used.contains(selected.index));
                    assert_eq!(selected.topic, format!("topic {}", selected.index));
                }
            }
        }
    }

    #[test]
    fn test_only_remaining_topic_is_chosen() {
        let pool = pool_of(5);
        let used: UsedTopics = [0, 1, 3, 4].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select(&pool, &used, &mut rng).unwrap().index, 2);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let pool = pool_of(50);
        let used = UsedTopics::new();
        let a = select(&pool, &used, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = select(&pool, &used, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draining_the_pool_visits_every_topic_once() {
        let pool = pool_of(12);
        let mut used = UsedTopics::new();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..12 {
            let selected = select(&pool, &used, &mut rng).unwrap();
            assert!(used.insert(selected.index));
        }
        assert!(matches!(
            select(&pool, &used, &mut rng),
            Err(AutocastError::ExhaustedPool { .. })
        ));
    }

    #[test]
    fn test_malformed_used_file_behaves_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("used.json");
        std::fs::write(&path, "[[[").unwrap();

        let pool = pool_of(1);
        let used = UsedTopics::load(&path, pool.len());
        let selected = select(&pool, &used, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(selected.index, 0);
    }

    #[test]
    fn test_indices_beyond_the_pool_are_ignored_for_selection() {
        let pool = pool_of(2);
        let used: UsedTopics = [0, 7].into_iter().collect();

        let selected = select(&pool, &used, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(selected.index, 1);
        assert_eq!(
            TopicStatus::new(&pool, &used),
            TopicStatus { pool_size: 2, used: 1, remaining: 1 }
        );
    }

    #[test]
    fn test_status() {
        let pool = pool_of(4);
        let used: UsedTopics = [1, 2].into_iter().collect();
        let status = TopicStatus::new(&pool, &used);
        assert_eq!(status, TopicStatus { pool_size: 4, used: 2, remaining: 2 });
    }
}
