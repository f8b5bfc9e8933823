// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

//! Generation-counter guard against stale asynchronous results. Every
//! in-flight resolution carries the token it started with; by the time it
//! completes, a newer resolution for the same key may have superseded it,
//! and a superseded result must never be published.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    generation: u64,
}

struct Slot<V> {
    generation: u64,
    value: Option<V>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self { generation: 0, value: None }
    }
}

/// Latest-value cache with per-key generations. `begin` advances the key's
/// generation and hands back a token; `publish` stores the value only while
/// that token is still current, so older completions arriving late are
/// discarded instead of overwriting newer state.
pub struct ViewCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> ViewCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    /// Start a new resolution for `key`, invalidating every earlier token.
    pub async fn begin(&self, key: &K) -> Token {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.clone()).or_default();
        slot.generation += 1;
        Token { generation: slot.generation }
    }

    /// Publish `value` for `key` if `token` is still current. Returns
    /// whether the value was accepted.
    pub async fn publish(&self, key: &K, token: Token, value: V) -> bool {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.clone()).or_default();
        if slot.generation != token.generation {
            debug!(?key, "discarding stale result");
            return false;
        }
        slot.value = Some(value);
        true
    }

    /// The last published value for `key`, if any.
    pub async fn latest(&self, key: &K) -> Option<V> {
        self.slots.lock().await.get(key).and_then(|slot| slot.value.clone())
    }
}

impl<K, V> Default for ViewCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn superseded_result_is_discarded() {
        let cache: ViewCache<String, u64> = ViewCache::new();
        let key = "0xowner".to_string();

        // A slow resolution starts first, a fast one supersedes it.
        let slow = cache.begin(&key).await;
        let fast = cache.begin(&key).await;

        assert!(cache.publish(&key, fast, 2).await);
        // The slow call finally completes; its result must not win.
        assert!(!cache.publish(&key, slow, 1).await);
        assert_eq!(cache.latest(&key).await, Some(2));
    }

    #[tokio::test]
    async fn delayed_resolve_for_old_identity_never_lands() {
        let cache = std::sync::Arc::new(ViewCache::<String, &'static str>::new());
        let key = "asset".to_string();

        let first = cache.begin(&key).await;
        let slow = {
            let cache = std::sync::Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cache.publish(&key, first, "stale").await
            })
        };

        // Identity changes mid-flight.
        let second = cache.begin(&key).await;
        assert!(cache.publish(&key, second, "fresh").await);

        assert!(!slow.await.unwrap());
        assert_eq!(cache.latest(&key).await, Some("fresh"));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache: ViewCache<u8, u8> = ViewCache::new();
        let a = cache.begin(&1).await;
        let b = cache.begin(&2).await;
        assert!(cache.publish(&1, a, 10).await);
        assert!(cache.publish(&2, b, 20).await);
        assert_eq!(cache.latest(&1).await, Some(10));
        assert_eq!(cache.latest(&2).await, Some(20));
    }
}
