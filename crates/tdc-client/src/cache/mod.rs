//! Client-side query cache.
//!
//! - [`QueryCache`] memoizes query responses by `(endpoint, argument)` and
//!   drops them when a mutation invalidates one of their [`Tag`]s.
//! - [`OptimisticList`] holds list views that are edited locally ahead of the
//!   server, with sequence stamps so background refetches never clobber a
//!   newer local edit.
//! - [`Poller`] refetches a list on an interval or on demand.

mod diff;
pub mod optimistic;
mod poller;

pub use diff::json_diff;
pub use optimistic::{Entity, FetchStamp, OptimisticList, PendingCreate, PendingUpdate, Position};
pub use poller::{PollHandle, Poller};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Invalidation groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    User,
    Teams,
    Notifications,
    Tickets,
}

/// Cache key: endpoint identifier plus its argument (empty for none).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: &'static str,
    pub arg: String,
}

impl QueryKey {
    pub fn new(endpoint: &'static str) -> Self {
        Self { endpoint, arg: String::new() }
    }

    pub fn with_arg(endpoint: &'static str, arg: impl ToString) -> Self {
        Self { endpoint, arg: arg.to_string() }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    fetched_at: Instant,
    tags: Vec<Tag>,
}

/// Response cache shared by every clone of a client.
#[derive(Debug)]
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    /// Cached value younger than the TTL.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn insert<T: Serialize>(&self, key: QueryKey, value: &T, tags: &[Tag]) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(
                    key,
                    CacheEntry { value, fetched_at: Instant::now(), tags: tags.to_vec() },
                );
            },
            Err(e) => tracing::warn!("Not caching {}: {}", key.endpoint, e),
        }
    }

    /// Drop every entry tagged `tag`. Returns how many were dropped.
    pub fn invalidate(&self, tag: Tag) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.tags.contains(&tag));
        let dropped = before.saturating_sub(self.entries.len());
        if dropped > 0 {
            tracing::debug!("Invalidated {} cached {:?} queries", dropped, tag);
        }
        dropped
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_hit_and_invalidate() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let teams = QueryKey::new("admin/teams");
        let team = QueryKey::with_arg("admin/team", 7);

        cache.insert(teams.clone(), &vec![1, 2, 3], &[Tag::Teams]);
        cache.insert(team.clone(), &"Skyhawks", &[Tag::Teams]);
        cache.insert(QueryKey::new("tickets"), &Vec::<i32>::new(), &[Tag::Tickets]);

        assert_eq!(cache.get_fresh::<Vec<i32>>(&teams), Some(vec![1, 2, 3]));
        assert_eq!(cache.invalidate(Tag::Teams), 2);
        assert!(cache.get_fresh::<Vec<i32>>(&teams).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entry_is_a_miss() {
        let cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::new("users/details");
        cache.insert(key.clone(), &1, &[Tag::User]);
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get_fresh::<i32>(&key).is_none());
    }
}
