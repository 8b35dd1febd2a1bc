//! 候選解池：固定容量，先進先出

use std::collections::VecDeque;

use blend_core::RatioVector;
use serde::Serialize;

/// 解池中的一筆候選解
#[derive(Debug, Clone, Serialize)]
pub struct PoolEntry {
    /// 配比
    pub ratios: RatioVector,

    /// 噸成分成本
    pub objective: f64,
}

/// 候選解池
#[derive(Debug, Clone)]
pub struct SolutionPool {
    capacity: usize,
    entries: VecDeque<PoolEntry>,
}

impl SolutionPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 加入候選解，已滿時淘汰最早加入的一筆
    pub fn admit(&mut self, entry: PoolEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// 由舊到新
    pub fn iter(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<PoolEntry> {
        self.entries.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_core::MaterialKeys;

    fn entry(keys: &MaterialKeys, a: f64, objective: f64) -> PoolEntry {
        PoolEntry {
            ratios: RatioVector::new(keys.clone(), vec![a, 100.0 - a]).unwrap(),
            objective,
        }
    }

    #[test]
    fn test_fifo_eviction() {
        let keys = MaterialKeys::new(vec!["A".to_string(), "B".to_string()]).unwrap();
        let mut pool = SolutionPool::new(3);
        for (i, a) in [10.0, 20.0, 30.0, 40.0].into_iter().enumerate() {
            pool.admit(entry(&keys, a, i as f64));
        }

        assert_eq!(pool.len(), 3);
        let firsts: Vec<f64> = pool.iter().map(|e| e.ratios.as_slice()[0]).collect();
        assert_eq!(firsts, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let keys = MaterialKeys::new(vec!["A".to_string(), "B".to_string()]).unwrap();
        let mut pool = SolutionPool::new(0);
        pool.admit(entry(&keys, 50.0, 1.0));
        assert!(pool.is_empty());
    }
}
