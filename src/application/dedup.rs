//! # Dedup Window
//!
//! A bounded, insertion-ordered set of recently seen item ids. Once full, every
//! insertion evicts the oldest id so the window always holds the most recent ones.

use std::collections::{HashSet, VecDeque};

pub const DEFAULT_CAPACITY: usize = 301;

#[derive(Debug, Clone)]
pub struct DedupWindow {
    capacity: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Inserts an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }

        if self.order.len() == self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.members.remove(&oldest);
        }

        self.order.push_back(id.to_string());
        self.members.insert(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut window = DedupWindow::new(3);
        assert!(window.insert("a"));
        assert!(!window.insert("a"));
        assert!(window.contains("a"));
        assert!(!window.contains("b"));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_keeps_most_recent() {
        for capacity in [1, 2, 5, 301] {
            let mut window = DedupWindow::new(capacity);
            let total = capacity * 3 + 1;
            for i in 0..total {
                window.insert(&i.to_string());
                assert!(window.len() <= capacity);
            }

            assert_eq!(window.len(), capacity);
            let expected: Vec<String> = (total - capacity..total).map(|i| i.to_string()).collect();
            let actual: Vec<&str> = window.iter().collect();
            assert_eq!(actual, expected);
            assert!(!window.contains("0"));
        }
    }

    #[test]
    fn test_evicted_id_is_new_again() {
        let mut window = DedupWindow::new(2);
        window.insert("a");
        window.insert("b");
        window.insert("c");
        assert!(!window.contains("a"));
        assert!(window.insert("a"));
        assert!(!window.contains("b"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut window = DedupWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.insert("a");
        window.insert("b");
        assert_eq!(window.iter().collect::<Vec<_>>(), vec!["b"]);
    }
}
