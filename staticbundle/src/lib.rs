#![forbid(unsafe_code)]
//! Build-time generator of statically typed message sources.
//!
//! Turns locale-keyed `.properties` bundles into one Rust source file per
//! source set: a locale enum, a message type with one accessor per key, and
//! per-locale plural rules compiled from gettext-style expressions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use staticbundle::{LocaleSetting, Processor, SourceSetConfig};
//!
//! let config = SourceSetConfig::new(
//!     "i18n::Messages",
//!     vec![
//!         LocaleSetting::root(2, "n == 1 ? 0 : 1"),
//!         LocaleSetting::new("ru", 3, "n % 10 == 1 && n % 100 != 11 ? 0 : n % 10 >= 2 && n % 10 <= 4 && (n % 100 < 10 || n % 100 >= 20) ? 1 : 2"),
//!     ],
//! );
//! let processor = Processor::new(config, "src/main/resources", "target/generated");
//!
//! // Reports every problem at once, writes nothing.
//! processor.validate()?;
//! // Validates again, then publishes `target/generated/i18n/messages.rs`.
//! processor.generate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Resource files
//!
//! - `messages.properties` holds the root locale, `messages_ru.properties`
//!   the `ru` overrides (see [`SourceSetConfig::resource_filename_format`])
//! - `greeting=Hello {0:name}!` declares an accessor `greeting(&self, name: &str)`
//! - `items=One item|{0} items` declares a plural accessor taking `amount: i64`
//! - keys missing from a locale fall back to the root value

pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod emitter;
pub mod error;
pub mod loader;
pub mod naming;
pub mod placeholder;
pub mod plural_rules;
pub mod processor;
pub mod properties;
pub mod traits;
pub mod validator;

// Re-export most used types for easy consumption
pub use crate::{
    config::{
        BundleConfig, ContentTransformer, FallbackPolicy, LocaleSetting, SourceSetConfig,
        TargetName,
    },
    diagnostic::{Diagnostic, DiagnosticKind, Diagnostics},
    error::Error,
    naming::Naming,
    plural_rules::{PluralError, PluralRule},
    processor::{Generated, Processor},
    validator::ValidatedBundle,
};
