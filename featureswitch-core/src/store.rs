//! Feature store
//!
//! Holds the canonical feature set, mediates every query and mutation through
//! the [`Context`] and notifies change listeners after each committed mutation.

use crate::context::{Context, ContextBuilder};
use crate::features::{self, Features};
use crate::listener::{self, ChangeEvent, Dispatcher, Listener, ListenerError, Registry, Subscription};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Runtime feature flag store
///
/// Cloning a `FeatureStore` yields another handle to the same state.
///
/// # Examples
///
/// ```
/// use featureswitch_core::FeatureStore;
/// use serde_json::json;
///
/// let store = FeatureStore::new(&json!({"new-ui": true, "beta": "false"}));
///
/// assert!(store.is_enabled("new-ui"));
/// assert!(store.is_disabled("beta"));
///
/// store.toggle("beta");
/// assert!(store.is_enabled("beta"));
/// ```
#[derive(Clone)]
pub struct FeatureStore {
    inner: Arc<Inner>,
}

struct Inner {
    features: RwLock<Features>,
    context: Context,
    listeners: Arc<Registry>,
    dispatcher: Dispatcher,
}

impl FeatureStore {
    /// Create a store from raw input with the default context.
    ///
    /// Input that is not an object is treated as an empty feature set.
    pub fn new(features: &Value) -> Self {
        Self::builder().features(features).build()
    }

    /// Create a store from raw input with context overrides.
    pub fn with_context(features: &Value, context: ContextBuilder) -> Self {
        Self::builder().features(features).context(context).build()
    }

    /// Create a store from an already normalized feature set.
    pub fn from_features(features: &Features) -> Self {
        let raw = features
            .iter()
            .map(|(name, enabled)| (name.clone(), Value::Bool(*enabled)))
            .collect();
        Self::builder().features(&Value::Object(raw)).build()
    }

    pub fn builder() -> FeatureStoreBuilder {
        FeatureStoreBuilder::new()
    }

    /// The policy context in use
    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn has_feature(&self, name: &str) -> bool {
        self.inner.features.read().contains_key(name)
    }

    /// Whether a feature is enabled. Unknown features are never enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        let snapshot = {
            let features = self.inner.features.read();
            if !features.contains_key(name) {
                return false;
            }
            features.clone()
        };
        self.inner.context.is_enabled(name, &snapshot)
    }

    /// Negation of [`is_enabled`](Self::is_enabled): unknown features count as
    /// disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        !self.is_enabled(name)
    }

    /// Copy of the current feature set.
    pub fn features(&self) -> Features {
        self.inner.features.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.features.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.features.read().is_empty()
    }

    /// Whether a known feature may be set to `value`; the raw value is passed
    /// to the context as is.
    pub fn can_set_feature(&self, name: &str, value: &Value) -> bool {
        self.has_feature(name) && self.inner.context.can_set(name, value)
    }

    pub fn can_enable(&self, name: &str) -> bool {
        self.can_set_feature(name, &Value::Bool(true))
    }

    pub fn can_disable(&self, name: &str) -> bool {
        self.can_set_feature(name, &Value::Bool(false))
    }

    pub fn can_toggle(&self, name: &str) -> bool {
        if self.is_enabled(name) {
            self.can_disable(name)
        } else {
            self.can_enable(name)
        }
    }

    pub fn can_add_features(&self) -> bool {
        self.inner.context.can_add_features()
    }

    pub fn can_remove_features(&self) -> bool {
        self.inner.context.can_remove_features()
    }

    /// True if at least one of `names` is enabled (false for an empty list).
    pub fn is_any_enabled<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.is_enabled(name.as_ref()))
    }

    /// True if every one of `names` is enabled (true for an empty list).
    pub fn is_all_enabled<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.is_enabled(name.as_ref()))
    }

    /// True if at least one of `names` is not enabled, unknown names included.
    pub fn is_any_disabled<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| !self.is_enabled(name.as_ref()))
    }

    /// True if none of `names` is enabled (true for an empty list).
    pub fn is_all_disabled<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| !self.is_enabled(name.as_ref()))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add (or overwrite) a feature. Returns `false` if adding is not permitted.
    pub fn add_feature(&self, name: &str, value: &Value) -> bool {
        if !self.can_add_features() {
            trace!(feature = name, "add denied by context");
            return false;
        }

        let enabled = self.inner.context.is_true(value);
        self.commit(name, Some(enabled), false)
    }

    /// Remove a known feature. Returns `false` for unknown features or when
    /// removal is not permitted.
    pub fn remove_feature(&self, name: &str) -> bool {
        if !self.has_feature(name) || !self.can_remove_features() {
            trace!(feature = name, "remove skipped");
            return false;
        }

        self.commit(name, None, true)
    }

    /// Set a known feature from a raw value, normalized by the context.
    pub fn set_enabled(&self, name: &str, value: &Value) -> bool {
        let enabled = self.inner.context.is_true(value);
        if !self.has_feature(name) || !self.can_set_feature(name, &Value::Bool(enabled)) {
            trace!(feature = name, enabled, "set skipped");
            return false;
        }

        self.commit(name, Some(enabled), true)
    }

    pub fn enable(&self, name: &str) -> bool {
        self.can_enable(name) && self.set_enabled(name, &Value::Bool(true))
    }

    pub fn disable(&self, name: &str) -> bool {
        self.can_disable(name) && self.set_enabled(name, &Value::Bool(false))
    }

    /// Flip a feature's enabled state.
    pub fn toggle(&self, name: &str) -> bool {
        if !self.can_toggle(name) {
            return false;
        }

        if self.is_enabled(name) {
            self.disable(name)
        } else {
            self.enable(name)
        }
    }

    /// Apply a mutation and notify listeners.
    ///
    /// Policy checks run without the lock, so the feature may have been removed
    /// by another handle in the meantime. With `require_existing` the mutation
    /// is dropped in that case and nothing is notified.
    fn commit(&self, name: &str, value: Option<bool>, require_existing: bool) -> bool {
        let snapshot = {
            let mut features = self.inner.features.write();
            let applied = match value {
                Some(enabled) if require_existing => match features.get_mut(name) {
                    Some(current) => {
                        *current = enabled;
                        true
                    }
                    None => false,
                },
                Some(enabled) => {
                    features.insert(name.to_string(), enabled);
                    true
                }
                None => features.remove(name).is_some(),
            };
            if !applied {
                trace!(feature = name, "feature removed before commit");
                return false;
            }
            features.clone()
        };

        debug!(feature = name, value = ?value, "feature changed");

        self.notify(ChangeEvent {
            features: snapshot,
            name: name.to_string(),
            value,
        });
        true
    }

    fn notify(&self, event: ChangeEvent) {
        let listeners = self.inner.listeners.listeners();
        if listeners.is_empty() {
            return;
        }

        let event = Arc::new(event);
        let on_error = self.inner.context.listener_error_handler();

        for listener in listeners {
            let event = Arc::clone(&event);
            let on_error = Arc::clone(&on_error);
            self.inner
                .dispatcher
                .spawn(move || listener::deliver(&listener, &event, on_error.as_ref()));
        }
    }

    // ------------------------------------------------------------------
    // Conditional execution
    // ------------------------------------------------------------------

    /// Run `function` through the context if the feature is enabled.
    pub fn if_enabled<F>(&self, name: &str, function: F, args: &[Value]) -> Option<Value>
    where
        F: Fn(&[Value]) -> Value,
    {
        self.is_enabled(name)
            .then(|| self.inner.context.execute(&function, args))
    }

    /// Run `function` through the context if the feature exists and is disabled.
    pub fn if_disabled<F>(&self, name: &str, function: F, args: &[Value]) -> Option<Value>
    where
        F: Fn(&[Value]) -> Value,
    {
        (self.has_feature(name) && self.is_disabled(name))
            .then(|| self.inner.context.execute(&function, args))
    }

    /// Run exactly one branch for a known feature and return its result.
    ///
    /// Neither branch runs for an unknown feature.
    pub fn decide<E, D>(
        &self,
        name: &str,
        when_enabled: E,
        when_disabled: D,
        enabled_args: &[Value],
        disabled_args: &[Value],
    ) -> Option<Value>
    where
        E: Fn(&[Value]) -> Value,
        D: Fn(&[Value]) -> Value,
    {
        if !self.has_feature(name) {
            return None;
        }

        let result = if self.is_enabled(name) {
            self.inner.context.execute(&when_enabled, enabled_args)
        } else {
            self.inner.context.execute(&when_disabled, disabled_args)
        };
        Some(result)
    }

    /// Wrap `function` so that it only runs while the feature is enabled.
    ///
    /// The feature is checked on every call, not when the wrapper is created.
    pub fn if_function<F>(
        &self,
        name: impl Into<String>,
        function: F,
    ) -> impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.branch(name.into(), Some(function), None::<fn(&[Value]) -> Value>)
    }

    /// Wrap `function` so that it only runs while the feature is not enabled.
    pub fn else_function<F>(
        &self,
        name: impl Into<String>,
        function: F,
    ) -> impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.branch(name.into(), None::<fn(&[Value]) -> Value>, Some(function))
    }

    /// Wrap two functions and dispatch between them on every call.
    pub fn if_else_function<F, G>(
        &self,
        name: impl Into<String>,
        when_enabled: F,
        when_disabled: G,
    ) -> impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
        G: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.branch(name.into(), Some(when_enabled), Some(when_disabled))
    }

    fn branch<F, G>(
        &self,
        name: String,
        when_enabled: Option<F>,
        when_disabled: Option<G>,
    ) -> impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
        G: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let store = self.clone();
        move |args: &[Value]| {
            if store.is_enabled(&name) {
                when_enabled.as_ref().map(|function| function(args))
            } else {
                when_disabled.as_ref().map(|function| function(args))
            }
        }
    }

    // ------------------------------------------------------------------
    // Change listeners
    // ------------------------------------------------------------------

    /// Register a change listener.
    ///
    /// The listener runs asynchronously after every committed mutation. Errors
    /// (and panics) are passed to the context's listener-error handler.
    pub fn add_change_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.add_listener(Listener::new(listener))
    }

    /// Register an existing listener handle. Registering the same handle twice
    /// yields two independent registrations.
    pub fn add_listener(&self, listener: Listener) -> Subscription {
        self.inner.listeners.register(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl fmt::Debug for FeatureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureStore")
            .field("features", &*self.inner.features.read())
            .field("listeners", &self.listener_count())
            .field("dispatcher", &self.inner.dispatcher)
            .finish()
    }
}

/// Builder for [`FeatureStore`]
#[derive(Debug, Default)]
pub struct FeatureStoreBuilder {
    features: Value,
    context: ContextBuilder,
    dispatcher: Option<Dispatcher>,
}

impl FeatureStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial raw features (deep-copied)
    pub fn features(mut self, features: &Value) -> Self {
        self.features = features.clone();
        self
    }

    pub fn context(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    /// Where listener notifications run. Defaults to [`Dispatcher::detect`].
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> FeatureStore {
        let context = self.context.build();
        let features = features::normalize(&self.features, |value| context.is_true(value));
        let dispatcher = self.dispatcher.unwrap_or_else(Dispatcher::detect);

        debug!(count = features.len(), "feature store created");

        FeatureStore {
            inner: Arc::new(Inner {
                features: RwLock::new(features),
                context,
                listeners: Arc::new(Registry::default()),
                dispatcher,
            }),
        }
    }
}
