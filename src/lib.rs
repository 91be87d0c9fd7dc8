// featureswitch - runtime feature switches and static feature stripping
//
// This library bundles the feature store with its optional companions: the
// source stripping tool and the file/environment loaders.

// Re-export core functionality
pub use featureswitch_core::*;

// Re-export optional crates
#[cfg(feature = "strip")]
pub use featureswitch_strip;

#[cfg(feature = "config")]
pub use featureswitch_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ChangeEvent, Context, ContextBuilder, Dispatcher, FeatureStore, FeatureStoreBuilder,
        Features, Listener, ListenerError, Subscription, as_features, is_true,
    };

    #[cfg(feature = "strip")]
    pub use featureswitch_strip::{Dialect, StripOptions, Stripper, strip};

    #[cfg(feature = "config")]
    pub use featureswitch_config::{EnvLoader, load_features, load_strip_options};
}
