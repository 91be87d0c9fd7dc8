//! Static feature stripping for featureswitch
//!
//! Removes the source blocks that belong to disabled features, so shipped
//! artifacts never contain code for functionality that is switched off.
//!
//! # Features
//!
//! - **Five block dialects** - HTML comments, HTML elements named after the
//!   feature, elements carrying a `feature-name` attribute, `/* */` comment
//!   pairs and `//` comment pairs
//! - **Configurable replacements** - each dialect can be switched off or given
//!   its own `${FEATURE}` template
//! - **Literal names** - feature names are never interpreted as patterns
//!
//! # Quick Start
//!
//! ```
//! use featureswitch_core::Features;
//! use featureswitch_strip::{strip, StripOptions};
//!
//! let features = Features::from([
//!     ("checkout-v2".to_string(), true),
//!     ("legacy-banner".to_string(), false),
//! ]);
//!
//! let html = r#"<main><section feature-name="legacy-banner">old</section></main>"#;
//! let output = strip(html, &features, &StripOptions::default())?;
//!
//! assert_eq!(output, "<main><!-- Feature [legacy-banner] DISABLED --></main>");
//! # Ok::<(), featureswitch_strip::StripError>(())
//! ```

pub mod error;
pub mod options;
pub mod stripper;

pub use error::{Result, StripError};
pub use options::{
    Dialect, DialectOptions, FEATURE_PLACEHOLDER, PartialDialectOptions, PartialStripOptions,
    StripOptions,
};
pub use stripper::{Stripper, strip};
