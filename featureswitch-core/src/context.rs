//! Policy context
//!
//! Every decision the feature store makes goes through a [`Context`]: how raw
//! values are coerced to booleans, whether a feature counts as enabled, whether a
//! mutation is permitted, how guarded functions are executed and what happens
//! when a change listener fails. Each of the seven slots can be overridden
//! independently through [`ContextBuilder`]; slots left alone use the defaults
//! documented on the builder methods.

use crate::features::{self, Features};
use crate::listener::{ChangeEvent, Listener, ListenerError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Execution strategy: receives the guarded function and its arguments.
pub type ExecuteFn = dyn Fn(&dyn Fn(&[Value]) -> Value, &[Value]) -> Value + Send + Sync;

/// Truthiness coercion for raw values.
pub type IsTrueFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Enablement check against a snapshot of the feature set.
pub type IsEnabledFn = dyn Fn(&str, &Features) -> bool + Send + Sync;

/// Permission check for setting a feature to a proposed raw value.
pub type CanSetFn = dyn Fn(&str, &Value) -> bool + Send + Sync;

/// Permission check for adding or removing features.
pub type PermissionFn = dyn Fn() -> bool + Send + Sync;

/// Receives errors raised by change listeners.
pub type ListenerErrorFn = dyn Fn(&ListenerError, &Listener, &ChangeEvent) + Send + Sync;

/// Immutable bundle of the seven policy functions.
#[derive(Clone)]
pub struct Context {
    execute: Arc<ExecuteFn>,
    is_true: Arc<IsTrueFn>,
    is_enabled: Arc<IsEnabledFn>,
    can_set: Arc<CanSetFn>,
    can_add_features: Arc<PermissionFn>,
    can_remove_features: Arc<PermissionFn>,
    on_listener_error: Arc<ListenerErrorFn>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn execute(&self, function: &dyn Fn(&[Value]) -> Value, args: &[Value]) -> Value {
        (self.execute)(function, args)
    }

    pub fn is_true(&self, value: &Value) -> bool {
        (self.is_true)(value)
    }

    pub fn is_enabled(&self, name: &str, features: &Features) -> bool {
        (self.is_enabled)(name, features)
    }

    pub fn can_set(&self, name: &str, proposed: &Value) -> bool {
        (self.can_set)(name, proposed)
    }

    pub fn can_add_features(&self) -> bool {
        (self.can_add_features)()
    }

    pub fn can_remove_features(&self) -> bool {
        (self.can_remove_features)()
    }

    pub fn on_listener_error(&self, error: &ListenerError, listener: &Listener, event: &ChangeEvent) {
        (self.on_listener_error)(error, listener, event)
    }

    pub(crate) fn listener_error_handler(&self) -> Arc<ListenerErrorFn> {
        Arc::clone(&self.on_listener_error)
    }
}

impl Default for Context {
    fn default() -> Self {
        ContextBuilder::new().build()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

fn default_execute(function: &dyn Fn(&[Value]) -> Value, args: &[Value]) -> Value {
    function(args)
}

fn default_is_enabled(name: &str, features: &Features) -> bool {
    features.get(name).is_some_and(|enabled| *enabled)
}

fn default_can_set(_name: &str, _proposed: &Value) -> bool {
    true
}

fn allow() -> bool {
    true
}

fn default_on_listener_error(error: &ListenerError, _listener: &Listener, event: &ChangeEvent) {
    warn!(
        feature = %event.name,
        "uncaught error during listener invocation: {}", error
    );
}

/// Builder for [`Context`]
///
/// # Examples
///
/// ```
/// use featureswitch_core::Context;
///
/// // Accept "yes" and "on" as well as "true"
/// let context = Context::builder()
///     .is_true(|value| {
///         matches!(value.as_str(), Some("yes" | "on")) || featureswitch_core::is_true(value)
///     })
///     .can_remove_features(|| false)
///     .build();
///
/// assert!(context.is_true(&serde_json::json!("on")));
/// assert!(!context.can_remove_features());
/// ```
#[derive(Clone, Default)]
pub struct ContextBuilder {
    execute: Option<Arc<ExecuteFn>>,
    is_true: Option<Arc<IsTrueFn>>,
    is_enabled: Option<Arc<IsEnabledFn>>,
    can_set: Option<Arc<CanSetFn>>,
    can_add_features: Option<Arc<PermissionFn>>,
    can_remove_features: Option<Arc<PermissionFn>>,
    on_listener_error: Option<Arc<ListenerErrorFn>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override how guarded functions run. Default: call the function with the
    /// arguments.
    pub fn execute<F>(mut self, execute: F) -> Self
    where
        F: Fn(&dyn Fn(&[Value]) -> Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.execute = Some(Arc::new(execute));
        self
    }

    /// Override truthiness. Default: [`features::is_true`].
    pub fn is_true<F>(mut self, is_true: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_true = Some(Arc::new(is_true));
        self
    }

    /// Override the enablement check. Default: the feature's stored value.
    pub fn is_enabled<F>(mut self, is_enabled: F) -> Self
    where
        F: Fn(&str, &Features) -> bool + Send + Sync + 'static,
    {
        self.is_enabled = Some(Arc::new(is_enabled));
        self
    }

    /// Override the set permission. Default: always allowed.
    pub fn can_set<F>(mut self, can_set: F) -> Self
    where
        F: Fn(&str, &Value) -> bool + Send + Sync + 'static,
    {
        self.can_set = Some(Arc::new(can_set));
        self
    }

    /// Override the add permission. Default: always allowed.
    pub fn can_add_features<F>(mut self, can_add: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.can_add_features = Some(Arc::new(can_add));
        self
    }

    /// Override the remove permission. Default: always allowed.
    pub fn can_remove_features<F>(mut self, can_remove: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.can_remove_features = Some(Arc::new(can_remove));
        self
    }

    /// Override the listener error handler. Default: a `tracing` warning.
    pub fn on_listener_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&ListenerError, &Listener, &ChangeEvent) + Send + Sync + 'static,
    {
        self.on_listener_error = Some(Arc::new(on_error));
        self
    }

    /// Build the context, filling unset slots with defaults.
    pub fn build(self) -> Context {
        Context {
            execute: self.execute.unwrap_or_else(|| Arc::new(default_execute)),
            is_true: self.is_true.unwrap_or_else(|| Arc::new(features::is_true)),
            is_enabled: self.is_enabled.unwrap_or_else(|| Arc::new(default_is_enabled)),
            can_set: self.can_set.unwrap_or_else(|| Arc::new(default_can_set)),
            can_add_features: self.can_add_features.unwrap_or_else(|| Arc::new(allow)),
            can_remove_features: self.can_remove_features.unwrap_or_else(|| Arc::new(allow)),
            on_listener_error: self
                .on_listener_error
                .unwrap_or_else(|| Arc::new(default_on_listener_error)),
        }
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("execute", &self.execute.is_some())
            .field("is_true", &self.is_true.is_some())
            .field("is_enabled", &self.is_enabled.is_some())
            .field("can_set", &self.can_set.is_some())
            .field("can_add_features", &self.can_add_features.is_some())
            .field("can_remove_features", &self.can_remove_features.is_some())
            .field("on_listener_error", &self.on_listener_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> ChangeEvent {
        ChangeEvent {
            features: Features::new(),
            name: "feature".to_string(),
            value: None,
        }
    }

    #[test]
    fn test_defaults() {
        let context = Context::default();
        let features = Features::from([("on".to_string(), true), ("off".to_string(), false)]);

        assert_eq!(context.execute(&|args| json!(args.len()), &[json!(1), json!(2)]), json!(2));
        assert!(context.is_true(&json!("TRUE")));
        assert!(!context.is_true(&json!("yes")));
        assert!(context.is_enabled("on", &features));
        assert!(!context.is_enabled("off", &features));
        assert!(!context.is_enabled("unknown", &features));
        assert!(context.can_set("on", &json!(false)));
        assert!(context.can_add_features());
        assert!(context.can_remove_features());

        // Default error handler only logs
        context.on_listener_error(
            &ListenerError::failed("oops!"),
            &Listener::new(|_| Ok(())),
            &event(),
        );
    }

    #[test]
    fn test_overrides_are_used() {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = errors.clone();

        let context = Context::builder()
            .execute(|_, _| json!("intercepted"))
            .is_true(|_| true)
            .is_enabled(|name, _| name == "special")
            .can_set(|_, proposed| proposed == &json!(true))
            .can_add_features(|| false)
            .can_remove_features(|| false)
            .on_listener_error(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        assert_eq!(context.execute(&|_| json!("direct"), &[]), json!("intercepted"));
        assert!(context.is_true(&json!(0)));
        assert!(context.is_enabled("special", &Features::new()));
        assert!(!context.is_enabled("other", &Features::new()));
        assert!(context.can_set("x", &json!(true)));
        assert!(!context.can_set("x", &json!(false)));
        assert!(!context.can_add_features());
        assert!(!context.can_remove_features());

        context.on_listener_error(
            &ListenerError::failed("oops!"),
            &Listener::new(|_| Ok(())),
            &event(),
        );
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let context = Context::builder().can_set(|_, _| false).build();

        assert!(!context.can_set("x", &json!(true)));
        assert!(context.can_add_features());
        assert!(context.is_true(&json!(true)));
    }

    #[test]
    fn test_builder_debug_reports_overrides() {
        let builder = ContextBuilder::new().can_add_features(|| false);
        let debug = format!("{:?}", builder);
        assert!(debug.contains("can_add_features: true"));
        assert!(debug.contains("can_set: false"));
    }
}
