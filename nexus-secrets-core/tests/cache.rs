use async_trait::async_trait;
use nexus_secrets_core::{BackendError, BackendResult, SecretBackend, SecretResolver};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers `value-for-{key}` and counts calls per key. Keys marked failing
/// answer with a malformed response until healed.
#[derive(Clone, Default)]
struct CountingBackend {
    calls: Arc<Mutex<HashMap<String, usize>>>,
    total: Arc<AtomicUsize>,
    failing: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
}

impl CountingBackend {
    fn new() -> Self {
        Self::default()
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl SecretBackend for CountingBackend {
    async fn fetch(&self, key: &str) -> BackendResult<String> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(BackendError::MalformedResponse {
                backend: "counting",
                reason: "simulated failure".into(),
            });
        }
        Ok(format!("value-for-{key}"))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test]
async fn cache_hit_avoids_backend() {
    let backend = CountingBackend::new();
    let resolver = SecretResolver::new(backend.clone());

    let first = resolver.resolve("NSO_API_KEY").await;
    let second = resolver.resolve("NSO_API_KEY").await;
    let third = resolver.resolve("NSO_API_KEY").await;

    assert_eq!(first.as_deref(), Some("value-for-NSO_API_KEY"));
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(backend.calls_for("NSO_API_KEY"), 1);
}

#[tokio::test]
async fn clear_forces_exactly_one_refetch() {
    let backend = CountingBackend::new();
    let resolver = SecretResolver::new(backend.clone());

    resolver.resolve("GITLAB_TOKEN").await;
    resolver.resolve("OPENAI_API_KEY").await;
    assert_eq!(resolver.cached_len(), 2);

    resolver.clear();
    assert_eq!(resolver.cached_len(), 0);

    resolver.resolve("GITLAB_TOKEN").await;
    resolver.resolve("GITLAB_TOKEN").await;
    assert_eq!(backend.calls_for("GITLAB_TOKEN"), 2);
    assert_eq!(backend.calls_for("OPENAI_API_KEY"), 1);
}

#[tokio::test]
async fn failures_resolve_to_absent_and_are_not_cached() {
    let backend = CountingBackend::new();
    backend.fail("CISCO_API_KEY");
    let resolver = SecretResolver::new(backend.clone());

    assert_eq!(resolver.resolve("CISCO_API_KEY").await, None);
    assert!(!resolver.is_cached("CISCO_API_KEY"));

    backend.heal("CISCO_API_KEY");
    assert_eq!(
        resolver.resolve("CISCO_API_KEY").await.as_deref(),
        Some("value-for-CISCO_API_KEY")
    );
    assert!(resolver.is_cached("CISCO_API_KEY"));
    assert_eq!(backend.calls_for("CISCO_API_KEY"), 2);
}

#[tokio::test]
async fn cached_value_survives_later_backend_failure() {
    let backend = CountingBackend::new();
    let resolver = SecretResolver::new(backend.clone());

    resolver.resolve("NETBOX_API_TOKEN").await;
    backend.fail("NETBOX_API_TOKEN");

    assert_eq!(
        resolver.resolve("NETBOX_API_TOKEN").await.as_deref(),
        Some("value-for-NETBOX_API_TOKEN")
    );
    assert_eq!(backend.calls_for("NETBOX_API_TOKEN"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_keys_do_not_cross_contaminate() {
    let backend = CountingBackend::with_delay(Duration::from_millis(20));
    let resolver = Arc::new(SecretResolver::new(backend.clone()));

    let keys: Vec<String> = (0..16).map(|i| format!("key-{i}")).collect();
    let handles: Vec<_> = keys
        .iter()
        .cloned()
        .map(|key| {
            let resolver = resolver.clone();
            tokio::spawn(async move {
                let value = resolver.resolve(&key).await;
                (key, value)
            })
        })
        .collect();

    for handle in handles {
        let (key, value) = handle.await.unwrap();
        assert_eq!(value, Some(format!("value-for-{key}")));
    }

    assert_eq!(resolver.cached_len(), keys.len());
    for key in &keys {
        assert_eq!(backend.calls_for(key), 1);
        assert_eq!(
            resolver.resolve(key).await,
            Some(format!("value-for-{key}"))
        );
    }
    assert_eq!(backend.total_calls(), keys.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_key_misses_settle_on_one_value() {
    let backend = CountingBackend::with_delay(Duration::from_millis(20));
    let resolver = Arc::new(SecretResolver::new(backend.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("NSO_USERNAME").await })
        })
        .collect();
    for handle in handles {
        assert_eq!(
            handle.await.unwrap().as_deref(),
            Some("value-for-NSO_USERNAME")
        );
    }

    // In-flight fetches are not deduplicated, but the slot holds one entry.
    let calls = backend.calls_for("NSO_USERNAME");
    assert!((1..=8).contains(&calls));
    assert_eq!(resolver.cached_len(), 1);
}
