use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::domain::FoodTruck;

/// Time source for cache freshness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    trucks: Vec<FoodTruck>,
    fetched_at: DateTime<Utc>,
}

/// Canonical cache key: the endpoint followed by the parameters as a JSON object
/// with lexicographically sorted keys.
pub fn cache_key(base_url: &str, params: &BTreeMap<&'static str, String>) -> String {
    let sorted: Map<String, Value> = params
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
        .collect();
    format!("{base_url}?{}", Value::Object(sorted))
}

/// In-memory response cache shared by every request in the process.
///
/// Entries are never evicted; a stale entry is simply overwritten by the next
/// successful fetch for the same key. Concurrent misses for one key may both
/// hit upstream, and the last writer wins.
pub struct ResponseCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached records while the entry is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<Vec<FoodTruck>> {
        let now = self.clock.now();
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = guard.get(key)?;
        let fresh = match (now - entry.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            // Clock moved backwards; the entry cannot be older than the TTL.
            Err(_) => true,
        };
        fresh.then(|| entry.trucks.clone())
    }

    pub fn put(&self, key: String, trucks: Vec<FoodTruck>) {
        let entry = CacheEntry {
            trucks,
            fetched_at: self.clock.now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        fn advance(&self, by: Duration) {
            let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *guard += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    fn truck(name: &str) -> FoodTruck {
        FoodTruck {
            applicant: Some(name.to_string()),
            ..FoodTruck::default()
        }
    }

    fn manual_cache() -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
                .single()
                .expect("valid start time"),
        );
        let cache = ResponseCache::with_clock(Duration::from_secs(60), Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn key_is_independent_of_insertion_order() {
        let mut first = BTreeMap::new();
        first.insert("$where", "upper(address) like upper('%SAN%')".to_string());
        first.insert("$limit", "100".to_string());

        let mut second = BTreeMap::new();
        second.insert("$limit", "100".to_string());
        second.insert("$where", "upper(address) like upper('%SAN%')".to_string());

        let key = cache_key("https://example.test/trucks.json", &first);
        assert_eq!(key, cache_key("https://example.test/trucks.json", &second));
        assert_eq!(
            key,
            "https://example.test/trucks.json?{\"$limit\":\"100\",\"$where\":\"upper(address) like upper('%SAN%')\"}"
        );
    }

    #[test]
    fn entries_expire_after_ttl() {
        let (cache, clock) = manual_cache();
        cache.put("k".to_string(), vec![truck("Off the Grid")]);

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("k"), Some(vec![truck("Off the Grid")]));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn put_overwrites_and_refreshes_timestamp() {
        let (cache, clock) = manual_cache();
        cache.put("k".to_string(), vec![truck("old")]);
        clock.advance(Duration::from_secs(90));
        assert!(cache.get("k").is_none());

        cache.put("k".to_string(), vec![truck("new")]);
        assert_eq!(cache.get("k"), Some(vec![truck("new")]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let (cache, _) = manual_cache();
        assert!(cache.is_empty());
        assert!(cache.get("missing").is_none());
    }
}
