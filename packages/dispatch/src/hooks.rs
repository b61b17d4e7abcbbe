//! Pluggable behavior for the dispatch manager.

use std::sync::Arc;

use dispatch_core::JobDescriptor;
use serde_json::Value;

/// Builds the initial payload of a new unit.
pub type FactoryFn = dyn Fn(&JobDescriptor) -> Value + Send + Sync;

/// Looks up a precomputed result. Lookup failures must map to `None`.
pub type CacheFn = dyn Fn(&JobDescriptor) -> Option<Value> + Send + Sync;

/// Post-processes a payload right before delivery.
pub type TransformFn = dyn Fn(Value) -> Value + Send + Sync;

/// Observes a unit that finished executing.
pub type FinishFn = dyn Fn(&JobDescriptor, &Value) + Send + Sync;

/// Hook set consumed by [`crate::DispatchManager`].
///
/// The factory is always present; the other hooks are optional and skipped
/// when unset.
#[derive(Clone)]
pub struct Hooks {
    factory: Arc<FactoryFn>,
    cache: Option<Arc<CacheFn>>,
    transform: Option<Arc<TransformFn>>,
    finish: Option<Arc<FinishFn>>,
}

impl Hooks {
    /// Create a hook set around a payload factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&JobDescriptor) -> Value + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            cache: None,
            transform: None,
            finish: None,
        }
    }

    /// Set the cache lookup.
    pub fn on_cache<F>(mut self, cache: F) -> Self
    where
        F: Fn(&JobDescriptor) -> Option<Value> + Send + Sync + 'static,
    {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Set the response transform.
    pub fn on_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Set the finish observer.
    pub fn on_finish<F>(mut self, finish: F) -> Self
    where
        F: Fn(&JobDescriptor, &Value) + Send + Sync + 'static,
    {
        self.finish = Some(Arc::new(finish));
        self
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn build(&self, descriptor: &JobDescriptor) -> Value {
        (self.factory)(descriptor)
    }

    /// `None` when no cache hook is set or the lookup missed.
    pub(crate) fn lookup(&self, descriptor: &JobDescriptor) -> Option<Value> {
        self.cache.as_ref().and_then(|cache| cache(descriptor))
    }

    pub(crate) fn transform(&self, payload: Value) -> Value {
        match &self.transform {
            Some(transform) => transform(payload),
            None => payload,
        }
    }

    pub(crate) fn finish(&self, descriptor: &JobDescriptor, payload: &Value) {
        if let Some(finish) = &self.finish {
            finish(descriptor, payload);
        }
    }
}

impl Default for Hooks {
    /// Units start with a `null` payload.
    fn default() -> Self {
        Self::new(|_| Value::Null)
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("cache", &self.cache.is_some())
            .field("transform", &self.transform.is_some())
            .field("finish", &self.finish.is_some())
            .finish_non_exhaustive()
    }
}
