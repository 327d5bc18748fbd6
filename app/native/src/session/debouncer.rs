//! Generic debouncer for file system events.
//!
//! Editors and wallpaper tools often touch a file several times per save
//! (write to temp, rename, chmod). The debouncer holds each key until it has
//! been quiet for the settle time, so a burst collapses into one analysis.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Tracks pending items and releases them once they have settled.
///
/// # Type Parameters
///
/// * `K` - The key type (e.g. which watched file changed)
/// * `V` - The value stored with each pending item
#[derive(Debug)]
pub struct Debouncer<K, V> {
    pending: HashMap<K, PendingItem<V>>,
    settle_time: Duration,
}

#[derive(Debug, Clone)]
struct PendingItem<V> {
    value: V,
    last_updated: Instant,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(settle_time: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            settle_time,
        }
    }

    #[must_use]
    pub const fn settle_time(&self) -> Duration { self.settle_time }

    /// Updates or inserts a pending item, restarting its settle timer.
    ///
    /// Returns `true` if the key was not already pending.
    pub fn update(&mut self, key: K, value: V) -> bool {
        self.update_at(key, value, Instant::now())
    }

    /// Like [`Self::update`], with an explicit timestamp.
    pub fn update_at(&mut self, key: K, value: V, now: Instant) -> bool {
        self.pending.insert(key, PendingItem { value, last_updated: now }).is_none()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool { self.pending.contains_key(key) }

    /// Earliest instant at which a pending item settles.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|item| item.last_updated + self.settle_time).min()
    }

    /// Drains all items that have been stable for the settle time.
    pub fn drain_settled(&mut self) -> Vec<(K, V)> { self.drain_settled_at(Instant::now()) }

    /// Like [`Self::drain_settled`], evaluated at `now`.
    pub fn drain_settled_at(&mut self, now: Instant) -> Vec<(K, V)> {
        let settled: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, item)| now.saturating_duration_since(item.last_updated) >= self.settle_time)
            .map(|(key, _)| key.clone())
            .collect();

        settled
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|item| (key, item.value)))
            .collect()
    }

    pub fn remove(&mut self, key: &K) { self.pending.remove(key); }

    pub fn clear(&mut self) { self.pending.clear(); }
}

/// A debouncer that only tracks keys.
pub type KeyDebouncer<K> = Debouncer<K, ()>;

impl<K> Debouncer<K, ()>
where K: Eq + Hash + Clone
{
    /// Marks `key` as changed.
    ///
    /// Returns `true` if the key was not already pending.
    pub fn touch(&mut self, key: K) -> bool { self.update(key, ()) }

    /// Drains the keys that have settled.
    pub fn drain_settled_keys(&mut self) -> Vec<K> {
        self.drain_settled().into_iter().map(|(key, ())| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(150);

    #[test]
    fn test_update_reports_new_keys() {
        let mut debouncer: Debouncer<&str, u32> = Debouncer::new(SETTLE);

        assert!(debouncer.is_empty());
        assert!(debouncer.update("wallpaper", 1));
        assert!(!debouncer.update("wallpaper", 2));
        assert_eq!(debouncer.len(), 1);
    }

    #[test]
    fn test_burst_collapses_into_one_item_with_latest_value() {
        let mut debouncer: Debouncer<&str, u32> = Debouncer::new(SETTLE);
        let start = Instant::now();

        debouncer.update_at("wallpaper", 1, start);
        debouncer.update_at("wallpaper", 2, start + Duration::from_millis(50));
        debouncer.update_at("wallpaper", 3, start + Duration::from_millis(100));

        // Settle timer restarted by the last update.
        assert!(debouncer.drain_settled_at(start + Duration::from_millis(200)).is_empty());

        let settled = debouncer.drain_settled_at(start + Duration::from_millis(250));
        assert_eq!(settled, vec![("wallpaper", 3)]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_keys_settle_independently() {
        let mut debouncer: KeyDebouncer<&str> = Debouncer::new(SETTLE);
        let start = Instant::now();

        debouncer.update_at("wallpaper", (), start);
        debouncer.update_at("config", (), start + Duration::from_millis(100));

        let settled = debouncer.drain_settled_at(start + Duration::from_millis(160));
        assert_eq!(settled, vec![("wallpaper", ())]);
        assert!(debouncer.contains(&"config"));
    }

    #[test]
    fn test_next_deadline_is_earliest_pending() {
        let mut debouncer: KeyDebouncer<u8> = Debouncer::new(SETTLE);
        assert!(debouncer.next_deadline().is_none());

        let start = Instant::now();
        debouncer.update_at(1, (), start + Duration::from_millis(20));
        debouncer.update_at(2, (), start);

        assert_eq!(debouncer.next_deadline(), Some(start + SETTLE));
    }

    #[test]
    fn test_zero_settle_time_drains_immediately() {
        let mut debouncer: KeyDebouncer<u8> = Debouncer::new(Duration::ZERO);

        debouncer.touch(1);
        debouncer.touch(2);

        let mut keys = debouncer.drain_settled_keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut debouncer: KeyDebouncer<u8> = Debouncer::new(SETTLE);

        debouncer.touch(1);
        debouncer.touch(2);
        debouncer.remove(&1);
        assert!(!debouncer.contains(&1));
        assert_eq!(debouncer.len(), 1);

        debouncer.clear();
        assert!(debouncer.is_empty());
    }
}
