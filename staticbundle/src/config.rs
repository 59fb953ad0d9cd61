//! Fully resolved, immutable configuration of a source set.
//!
//! A build host constructs one [`SourceSetConfig`] per source set, either in
//! code through the `with_*` builders or by deserializing a config file, and
//! hands it to [`crate::processor::Processor`]. Nothing is resolved lazily.

use std::{collections::BTreeMap, fmt, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::naming::{Naming, is_identifier, to_snake_case, to_upper_camel_case};

/// Token replaced by the locale suffix in `resource_filename_format`.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

pub const DEFAULT_RESOURCE_FILENAME_FORMAT: &str = "messages{locale}.properties";

/// Source-set name → configuration, iterated in name order.
pub type BundleConfig = BTreeMap<String, SourceSetConfig>;

/// Plural settings of one supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleSetting {
    /// Language tag such as `en` or `pt_BR`; empty for the root locale.
    #[serde(default)]
    pub locale: String,
    #[serde(alias = "pluralForms")]
    pub plural_forms: usize,
    #[serde(alias = "pluralFunction")]
    pub plural_function: String,
}

impl LocaleSetting {
    pub fn new(
        locale: impl Into<String>,
        plural_forms: usize,
        plural_function: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            plural_forms,
            plural_function: plural_function.into(),
        }
    }

    /// The fallback locale, whose file name carries no locale suffix.
    pub fn root(plural_forms: usize, plural_function: impl Into<String>) -> Self {
        Self::new("", plural_forms, plural_function)
    }

    pub fn is_root(&self) -> bool {
        self.locale.is_empty()
    }

    /// Substitution for [`LOCALE_PLACEHOLDER`]: empty for root, `_<tag>` otherwise.
    pub fn file_suffix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("_{}", self.locale)
        }
    }

    /// Name of this locale's variant in the generated `LocaleTag` enum.
    pub fn variant_name(&self) -> String {
        if self.is_root() {
            "Root".to_string()
        } else {
            to_upper_camel_case(&self.locale)
        }
    }

    /// Suffix of the generated per-locale plural function.
    pub fn function_suffix(&self) -> String {
        if self.is_root() {
            "root".to_string()
        } else {
            to_snake_case(&self.variant_name())
        }
    }

    /// Human-readable name used in diagnostics and logs.
    pub fn display_name(&self) -> &str {
        if self.is_root() { "root" } else { &self.locale }
    }
}

/// How non-root locales may deviate from the root bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackPolicy {
    /// A missing locale file falls back to root entirely.
    pub allow_missing_files: bool,
    /// A key missing from a locale file falls back to the root value.
    pub allow_missing_keys: bool,
    /// Keys unknown to the root bundle are skipped instead of rejected.
    pub ignore_extra_keys: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            allow_missing_files: true,
            allow_missing_keys: true,
            ignore_extra_keys: false,
        }
    }
}

/// Pure string hook applied to every message variant before it is embedded.
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct ContentTransformer {
    name: String,
    transform: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl ContentTransformer {
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// Strips leading and trailing whitespace.
    pub fn trim() -> Self {
        Self::new("trim", |s| s.trim().to_string())
    }

    /// Replaces every whitespace run with a single space.
    pub fn collapse_whitespace() -> Self {
        Self::new("collapse-whitespace", |s| {
            s.split_whitespace().collect::<Vec<_>>().join(" ")
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: &str) -> String {
        (self.transform)(value)
    }
}

impl TryFrom<String> for ContentTransformer {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "trim" => Ok(Self::trim()),
            "collapse-whitespace" | "collapse_whitespace" => Ok(Self::collapse_whitespace()),
            other => Err(format!(
                "unknown content transformer `{}` (expected `trim` or `collapse-whitespace`)",
                other
            )),
        }
    }
}

impl fmt::Debug for ContentTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentTransformer").field(&self.name).finish()
    }
}

impl PartialEq for ContentTransformer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.transform, &other.transform)
    }
}

fn default_resource_filename_format() -> String {
    DEFAULT_RESOURCE_FILENAME_FORMAT.to_string()
}

/// Configuration of one source set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSetConfig {
    /// `::`-separated path of the generated type, e.g. `i18n::AppMessages`.
    #[serde(alias = "messageSourceClassName")]
    pub message_source_class_name: String,
    #[serde(
        alias = "resourceFilenameFormat",
        default = "default_resource_filename_format"
    )]
    pub resource_filename_format: String,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default, alias = "contentTransformer")]
    pub content_transformer: Option<ContentTransformer>,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    pub locales: Vec<LocaleSetting>,
}

impl SourceSetConfig {
    pub fn new(message_source_class_name: impl Into<String>, locales: Vec<LocaleSetting>) -> Self {
        Self {
            message_source_class_name: message_source_class_name.into(),
            resource_filename_format: default_resource_filename_format(),
            naming: Naming::default(),
            content_transformer: None,
            fallback: FallbackPolicy::default(),
            locales,
        }
    }

    pub fn with_resource_filename_format(mut self, format: impl Into<String>) -> Self {
        self.resource_filename_format = format.into();
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_content_transformer(mut self, transformer: Option<ContentTransformer>) -> Self {
        self.content_transformer = transformer;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// The root locale, if exactly one is configured.
    pub fn root_locale(&self) -> Option<&LocaleSetting> {
        let mut roots = self.locales.iter().filter(|l| l.is_root());
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root),
            _ => None,
        }
    }

    /// Resource file name of `locale` according to `resource_filename_format`.
    pub fn resource_file_name(&self, locale: &LocaleSetting) -> String {
        self.resource_filename_format
            .replace(LOCALE_PLACEHOLDER, &locale.file_suffix())
    }
}

/// Parsed `message_source_class_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetName {
    pub modules: Vec<String>,
    pub type_name: String,
}

impl TargetName {
    pub fn parse(path: &str) -> Result<Self, String> {
        if path.trim().is_empty() {
            return Err("target type name is empty".to_string());
        }
        let mut segments: Vec<String> = Vec::new();
        for segment in path.split("::") {
            if !is_identifier(segment) {
                return Err(format!(
                    "`{}` is not a valid type path: segment `{}` is not an identifier",
                    path, segment
                ));
            }
            segments.push(segment.to_string());
        }
        let type_name = segments.pop().unwrap_or_default();
        Ok(TargetName {
            modules: segments,
            type_name,
        })
    }

    /// Artifact path relative to the output directory,
    /// `i18n::AppMessages` → `i18n/app_messages.rs`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.modules.iter().collect();
        path.push(format!("{}.rs", to_snake_case(&self.type_name)));
        path
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module in &self.modules {
            write!(f, "{}::", module)?;
        }
        f.write_str(&self.type_name)
    }
}
