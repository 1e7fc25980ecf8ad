//! The runtime parameter bag: cached lookups with container fallback.

use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use super::container::ParameterContainer;
use super::error::ParameterNotFound;
use super::logger::ParameterLogger;
use super::provider::{ParameterMap, ParameterProvider};

/// Caching view over runtime-supplied configuration, with optional fallback
/// to a static container.
///
/// The bag pulls the full parameter set from its provider on first use and
/// serves every lookup from that cache until [`deinitialize`](Self::deinitialize)
/// starts a new generation. Keys absent from the cache fall back to an
/// attached container; a key cached with a null value is present and does
/// not fall back.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
///
/// use runtime_config::params::{MapProvider, RuntimeParameterBag, StaticContainer};
/// use serde_json::json;
///
/// let provider = MapProvider::new().with_parameter("site.name", "Hexwood");
/// let container = Arc::new(StaticContainer::new().with_parameter("site.motto", "carved in stone"));
///
/// let mut bag = RuntimeParameterBag::new(provider);
/// bag.set_container(&container);
///
/// assert_eq!(bag.get("site.name")?, json!("Hexwood"));
/// assert_eq!(bag.get("site.motto")?, json!("carved in stone"));
/// assert!(bag.get("site.banner").is_err());
/// # Ok::<(), runtime_config::params::ParameterNotFound>(())
/// ```
#[derive(Debug)]
pub struct RuntimeParameterBag {
    provider: Box<dyn ParameterProvider>,
    cache: RwLock<Cache>,
    container: Option<Weak<dyn ParameterContainer>>,
    logger: Option<Box<dyn ParameterLogger>>,
}

#[derive(Debug, Default)]
struct Cache {
    populated: bool,
    parameters: ParameterMap,
}

impl RuntimeParameterBag {
    /// Creates a bag over the given provider, with no fallback container and
    /// no logger attached.
    pub fn new<P>(provider: P) -> Self
    where
        P: ParameterProvider + 'static,
    {
        Self {
            provider: Box::new(provider),
            cache: RwLock::new(Cache::default()),
            container: None,
            logger: None,
        }
    }

    /// Attaches a logger notified whenever a lookup misses entirely.
    #[must_use]
    pub fn with_logger<L>(mut self, logger: L) -> Self
    where
        L: ParameterLogger + 'static,
    {
        self.logger = Some(Box::new(logger));
        self
    }

    /// Attaches (or replaces) the fallback container.
    ///
    /// The bag keeps a non-owning reference: once the last `Arc` to the
    /// container is dropped, lookups behave as if none were attached.
    pub fn set_container<C>(&mut self, container: &Arc<C>)
    where
        C: ParameterContainer + 'static,
    {
        // Downgrade first, unsize second; one step would pin the downgrade
        // to the trait object and reject the concrete `&Arc<C>`.
        let container: Weak<C> = Arc::downgrade(container);
        let container: Weak<dyn ParameterContainer> = container;
        self.container = Some(container);
    }

    /// Returns the full parameter mapping of the current generation,
    /// fetching from the provider if the cache is not yet populated.
    pub fn all(&self) -> ParameterMap {
        self.initialized().parameters.clone()
    }

    /// Whether `name` is a cached parameter or, failing that, one the
    /// fallback container knows about.
    pub fn has(&self, name: &str) -> bool {
        if self.initialized().parameters.contains_key(name) {
            return true;
        }

        match self.container() {
            Some(container) => container.has_parameter(name),
            None => false,
        }
    }

    /// Returns the value of `name`.
    ///
    /// A cached null is a value like any other; the container is consulted
    /// only when the key is absent from the cache, and a container-reported
    /// miss propagates as is. When the key is absent and no live container
    /// is attached, the attached logger (if any) receives a diagnostic
    /// naming the key before the error is returned.
    pub fn get(&self, name: &str) -> Result<Value, ParameterNotFound> {
        {
            let cache = self.initialized();
            if let Some(value) = cache.parameters.get(name) {
                return Ok(value.clone());
            }
        }

        match self.container() {
            Some(container) => container.parameter(name),
            None => Err(self.miss(name)),
        }
    }

    /// Invalidates the cache so the next `all`, `has` or `get` call fetches
    /// a fresh parameter set from the provider.
    ///
    /// The attached container and logger are kept.
    pub fn deinitialize(&self) {
        let mut cache = self.cache.write();
        cache.populated = false;
        cache.parameters = ParameterMap::new();
    }

    /// Read access to the populated cache, fetching from the provider when
    /// the current generation has none yet. The fetch happens under the
    /// write lock, which is then downgraded without a gap, so the provider
    /// runs at most once per generation.
    fn initialized(&self) -> RwLockReadGuard<'_, Cache> {
        let cache = self.cache.read();
        if cache.populated {
            return cache;
        }
        drop(cache);

        let mut cache = self.cache.write();
        if !cache.populated {
            cache.parameters = self.provider.parameters();
            cache.populated = true;
        }
        RwLockWriteGuard::downgrade(cache)
    }

    fn container(&self) -> Option<Arc<dyn ParameterContainer>> {
        self.container.as_ref().and_then(Weak::upgrade)
    }

    fn miss(&self, name: &str) -> ParameterNotFound {
        let error = ParameterNotFound::new(name);
        if let Some(logger) = &self.logger {
            logger.log(&error.to_string());
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::params::{MapProvider, StaticContainer};

    fn sample_parameters() -> ParameterMap {
        json!({
            "foo": "bar",
            "fuu": "baz",
            "fii": null,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn bag_over(parameters: ParameterMap) -> RuntimeParameterBag {
        RuntimeParameterBag::new(MapProvider::from(parameters))
    }

    /// Hands out one canned response per generation and counts fetches.
    #[derive(Debug, Clone, Default)]
    struct SequenceProvider {
        responses: Arc<Mutex<VecDeque<ParameterMap>>>,
        fetches: Arc<AtomicUsize>,
    }

    impl SequenceProvider {
        fn new(responses: impl IntoIterator<Item = ParameterMap>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into_iter().collect())),
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl ParameterProvider for SequenceProvider {
        fn parameters(&self) -> ParameterMap {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().pop_front().unwrap_or_default()
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingLogger {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLogger {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().clone()
        }
    }

    impl ParameterLogger for RecordingLogger {
        fn log(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    /// Answers every lookup with the uppercased name.
    #[derive(Debug)]
    struct EchoContainer;

    impl ParameterContainer for EchoContainer {
        fn has_parameter(&self, _: &str) -> bool {
            true
        }

        fn parameter(&self, name: &str) -> Result<Value, ParameterNotFound> {
            Ok(Value::String(name.to_uppercase()))
        }
    }

    #[test]
    fn test_all_returns_every_provider_parameter() {
        let bag = bag_over(sample_parameters());

        assert_eq!(bag.all(), sample_parameters());
    }

    #[test]
    fn test_has_reports_cached_keys_null_values_included() {
        let bag = bag_over(sample_parameters());

        assert!(bag.has("foo"));
        assert!(bag.has("fii"));
        assert!(!bag.has("bar"));
    }

    #[test]
    fn test_has_consults_the_container_for_unknown_keys() {
        let container = Arc::new(StaticContainer::new().with_parameter("baz", true));
        let mut bag = bag_over(sample_parameters());
        bag.set_container(&container);

        assert!(bag.has("foo"));
        assert!(!bag.has("bar"));
        assert!(bag.has("baz"));
    }

    #[test]
    fn test_get_returns_cached_values_including_null() {
        let bag = bag_over(sample_parameters());

        assert_eq!(bag.get("foo").unwrap(), json!("bar"));
        assert_eq!(bag.get("fuu").unwrap(), json!("baz"));
        assert_eq!(bag.get("fii").unwrap(), Value::Null);
    }

    #[test]
    fn test_get_prefers_the_cache_over_the_container() {
        let container = Arc::new(
            StaticContainer::new()
                .with_parameter("foo", "static")
                .with_parameter("fii", "not null here"),
        );
        let mut bag = bag_over(sample_parameters());
        bag.set_container(&container);

        assert_eq!(bag.get("foo").unwrap(), json!("bar"));
        // A cached null is a present value and must not fall back.
        assert_eq!(bag.get("fii").unwrap(), Value::Null);
    }

    #[test]
    fn test_get_defers_to_the_container_for_uncached_keys() {
        let container = Arc::new(StaticContainer::new().with_parameter("foo", "bar"));
        let mut bag = bag_over(ParameterMap::new());
        bag.set_container(&container);

        assert_eq!(bag.get("foo").unwrap(), json!("bar"));
    }

    #[test]
    fn test_get_fails_when_the_container_misses_too() {
        let container = Arc::new(StaticContainer::new());
        let mut bag = bag_over(ParameterMap::new());
        bag.set_container(&container);

        let error = bag.get("foo").unwrap_err();
        assert_eq!(error.name(), "foo");
    }

    #[test]
    fn test_get_fails_without_a_container() {
        let bag = bag_over(ParameterMap::new());

        let error = bag.get("foo").unwrap_err();
        assert_eq!(error.name(), "foo");
        assert!(error.to_string().contains("foo"));
    }

    #[test]
    fn test_provider_is_fetched_once_per_generation() {
        let provider = SequenceProvider::new([sample_parameters()]);
        let bag = RuntimeParameterBag::new(provider.clone());

        let _ = bag.all();
        let _ = bag.has("foo");
        let _ = bag.get("foo");

        assert_eq!(provider.fetches(), 1);
    }

    #[test]
    fn test_deinitialize_forces_a_fresh_fetch() {
        let first = json!({"foo": "bar", "fuu": "baz"}).as_object().cloned().unwrap();
        let second = json!({"foo2": "bar2", "fuu2": "baz2"}).as_object().cloned().unwrap();
        let provider = SequenceProvider::new([first, second]);
        let bag = RuntimeParameterBag::new(provider.clone());

        assert_eq!(bag.get("foo").unwrap(), json!("bar"));
        assert_eq!(bag.get("fuu").unwrap(), json!("baz"));

        bag.deinitialize();

        assert_eq!(bag.get("foo2").unwrap(), json!("bar2"));
        assert_eq!(bag.get("fuu2").unwrap(), json!("baz2"));
        assert!(!bag.has("foo"));
        assert_eq!(provider.fetches(), 2);
    }

    #[test]
    fn test_miss_is_logged_before_the_error_returns() {
        let logger = RecordingLogger::default();
        let bag = bag_over(ParameterMap::new()).with_logger(logger.clone());

        assert!(bag.get("foo").is_err());

        let messages = logger.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("foo"));
    }

    #[test]
    fn test_container_reported_misses_are_not_logged() {
        let logger = RecordingLogger::default();
        let container = Arc::new(StaticContainer::new());
        let mut bag = bag_over(ParameterMap::new()).with_logger(logger.clone());
        bag.set_container(&container);

        assert!(bag.get("foo").is_err());
        assert!(logger.messages().is_empty());
    }

    #[test]
    fn test_dropped_container_behaves_like_none() {
        let logger = RecordingLogger::default();
        let mut bag = bag_over(ParameterMap::new()).with_logger(logger.clone());

        {
            let container = Arc::new(StaticContainer::new().with_parameter("foo", "bar"));
            bag.set_container(&container);
            assert!(bag.has("foo"));
            assert_eq!(bag.get("foo").unwrap(), json!("bar"));
        }

        assert!(!bag.has("foo"));
        assert!(bag.get("foo").is_err());
        assert_eq!(logger.messages().len(), 1);
    }

    #[test]
    fn test_set_container_takes_any_container_type_and_replaces() {
        let static_container = Arc::new(StaticContainer::new().with_parameter("key", "static"));
        let echo = Arc::new(EchoContainer);
        let mut bag = bag_over(ParameterMap::new());

        bag.set_container(&static_container);
        assert_eq!(bag.get("key").unwrap(), json!("static"));

        bag.set_container(&echo);
        assert_eq!(bag.get("key").unwrap(), json!("KEY"));
    }

    #[test]
    fn test_deinitialize_keeps_the_container() {
        let container = Arc::new(StaticContainer::new().with_parameter("static.key", "kept"));
        let provider = SequenceProvider::new([sample_parameters(), ParameterMap::new()]);
        let mut bag = RuntimeParameterBag::new(provider);
        bag.set_container(&container);

        assert_eq!(bag.get("static.key").unwrap(), json!("kept"));
        bag.deinitialize();
        assert_eq!(bag.get("static.key").unwrap(), json!("kept"));
    }

    #[test]
    fn test_deinitialize_keeps_the_logger() {
        let logger = RecordingLogger::default();
        let bag = bag_over(ParameterMap::new()).with_logger(logger.clone());

        assert!(bag.get("zero").is_err());
        bag.deinitialize();
        assert!(bag.get("one").is_err());

        let messages = logger.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].contains("one"));
    }
}
