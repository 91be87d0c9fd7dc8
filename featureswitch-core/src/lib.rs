//! Runtime feature flags for featureswitch
//!
//! A [`FeatureStore`] holds a set of named boolean features. Every decision it
//! makes goes through a pluggable [`Context`], and every committed change is
//! broadcast asynchronously to registered change listeners.
//!
//! # Features
//!
//! - **Strict state** - stored values are always `true` or `false`
//! - **Pluggable policies** - truthiness, enablement, permissions, execution and
//!   listener error handling can each be overridden
//! - **Change listeners** - notified on a tokio runtime (or a thread) after each
//!   mutation, with per-listener error isolation
//! - **Guarded execution** - run or wrap functions depending on a feature
//!
//! # Quick Start
//!
//! ```
//! use featureswitch_core::*;
//! use serde_json::json;
//!
//! let store = FeatureStore::new(&json!({"new-ui": true, "dark-mode": "false"}));
//!
//! if store.is_enabled("new-ui") {
//!     // Show new UI
//! }
//!
//! assert!(store.is_any_enabled(&["new-ui", "dark-mode"]));
//! assert!(!store.is_all_enabled(&["new-ui", "dark-mode"]));
//! ```
//!
//! # Policies
//!
//! ```
//! use featureswitch_core::*;
//! use serde_json::json;
//!
//! // Freeze the feature set: nothing can be changed, added or removed
//! let store = FeatureStore::with_context(
//!     &json!({"checkout-v2": true}),
//!     Context::builder()
//!         .can_set(|_, _| false)
//!         .can_add_features(|| false)
//!         .can_remove_features(|| false),
//! );
//!
//! assert!(!store.disable("checkout-v2"));
//! assert!(store.is_enabled("checkout-v2"));
//! ```
//!
//! # Change Listeners
//!
//! ```
//! use featureswitch_core::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = FeatureStore::new(&json!({"search": false}));
//!
//! let subscription = store.add_change_listener(|event| {
//!     println!("{} is now {:?}", event.name, event.value);
//!     Ok(())
//! });
//!
//! store.enable("search");
//! subscription.unsubscribe();
//! # }
//! ```
//!
//! # Guarded Functions
//!
//! ```
//! use featureswitch_core::*;
//! use serde_json::{json, Value};
//!
//! let store = FeatureStore::new(&json!({"greeting": true}));
//! let greet = store.if_else_function(
//!     "greeting",
//!     |args: &[Value]| json!(format!("hello {}", args[0])),
//!     |_: &[Value]| Value::Null,
//! );
//!
//! assert_eq!(greet(&[json!("world")]), Some(json!("hello \"world\"")));
//! store.disable("greeting");
//! assert_eq!(greet(&[json!("world")]), Some(Value::Null));
//! ```

pub mod context;
pub mod features;
pub mod listener;
pub mod store;

pub use context::{Context, ContextBuilder};
pub use features::{Features, as_features, is_boolean, is_false, is_features, is_features_strict, is_true};
pub use listener::{ChangeEvent, Dispatcher, Listener, ListenerError, Subscription};
pub use store::{FeatureStore, FeatureStoreBuilder};
