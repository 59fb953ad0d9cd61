//! The merged, multi-locale message model of a source set.
//!
//! The root locale is authoritative: its keys, their order, their arity and
//! their arguments define the catalog. Other locales either override a key
//! with a value of matching arity or fall back to the root value.
//!
//! Building never fails. Problems are recorded as pending diagnostics that
//! the validator reports together with its own findings.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::{
    config::{LocaleSetting, SourceSetConfig},
    diagnostic::{Diagnostic, Diagnostics},
    loader::{LocaleResource, ResourceFile, ResourceSet},
    placeholder::{ArgRef, ArgTable, Piece, Token, tokenize},
    properties::Property,
};

/// Whether a key is a plain string or a set of plural variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Singular,
    Plural(usize),
}

impl Arity {
    /// Number of variants a locale with `plural_forms` forms must provide.
    pub fn expected_variants(&self, plural_forms: usize) -> usize {
        match self {
            Arity::Singular => 1,
            Arity::Plural(_) => plural_forms,
        }
    }

    pub fn is_plural(&self) -> bool {
        matches!(self, Arity::Plural(_))
    }
}

/// A message of one locale, one list of pieces per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub variants: Vec<Vec<Piece>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: String,
    /// Line of the root declaration.
    pub line: usize,
    pub arity: Arity,
    pub args: ArgTable,
    pub root: Message,
    /// Aligned with the configured locales. `None` means the locale uses the
    /// root message; the root slot is always `None`.
    pub overrides: Vec<Option<Message>>,
}

impl CatalogEntry {
    pub fn override_for(&self, locale_index: usize) -> Option<&Message> {
        self.overrides.get(locale_index).and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    /// Position of the root locale in the configured locales.
    pub root_index: usize,
    /// Entries in root declaration order.
    pub entries: Vec<CatalogEntry>,
    pub pending: Diagnostics,
}

impl MessageCatalog {
    pub fn build(config: &SourceSetConfig, resources: &ResourceSet) -> Self {
        let mut builder = CatalogBuilder {
            config,
            pending: Diagnostics::new(),
        };

        let root_index = config
            .locales
            .iter()
            .position(LocaleSetting::is_root)
            .unwrap_or_default();
        let root_setting = &config.locales[root_index];

        let mut entries: Vec<CatalogEntry> = resources
            .root
            .properties
            .entries
            .iter()
            .map(|property| {
                builder.root_entry(root_setting, &resources.root, property, config.locales.len())
            })
            .collect();

        let root_keys: BTreeSet<&str> = resources.root.properties.keys().collect();
        for (index, (setting, resource)) in
            config.locales.iter().zip(&resources.locales).enumerate()
        {
            if setting.is_root() {
                continue;
            }
            match resource {
                LocaleResource::Loaded(file) => {
                    builder.merge_locale(index, setting, file, &root_keys, &mut entries)
                }
                LocaleResource::Missing(path) if config.fallback.allow_missing_files => {
                    debug!(
                        locale = %setting.locale,
                        path = %path.display(),
                        "locale falls back to root entirely"
                    );
                }
                LocaleResource::Missing(path) => builder.pending.push(
                    Diagnostic::load("resource file not found and missing files are not allowed")
                        .with_locale(&setting.locale)
                        .with_file(path),
                ),
                LocaleResource::Broken(_) => {}
            }
        }

        MessageCatalog {
            root_index,
            entries,
            pending: builder.pending,
        }
    }
}

struct CatalogBuilder<'a> {
    config: &'a SourceSetConfig,
    pending: Diagnostics,
}

impl CatalogBuilder<'_> {
    fn transform(&self, value: &str) -> String {
        match &self.config.content_transformer {
            Some(transformer) => transformer.apply(value),
            None => value.to_string(),
        }
    }

    fn diagnostic(
        &self,
        diagnostic: Diagnostic,
        setting: &LocaleSetting,
        file: &ResourceFile,
        key: &str,
        line: usize,
    ) -> Diagnostic {
        diagnostic
            .with_locale(&setting.locale)
            .with_key(key)
            .with_file(&file.path)
            .with_line(line)
    }

    fn root_entry(
        &mut self,
        setting: &LocaleSetting,
        file: &ResourceFile,
        property: &Property,
        locale_count: usize,
    ) -> CatalogEntry {
        let arity = if property.is_plural() {
            Arity::Plural(property.variants.len())
        } else {
            Arity::Singular
        };
        if let Arity::Plural(found) = arity {
            if found != setting.plural_forms {
                let d = Diagnostic::validation(format!(
                    "plural key has {} variant(s) but the root locale has {} plural form(s)",
                    found, setting.plural_forms
                ));
                let d = self.diagnostic(d, setting, file, &property.key, property.line);
                self.pending.push(d);
            }
        }

        let texts: Vec<String> = property.variants.iter().map(|raw| self.transform(raw)).collect();

        // Indexed placeholders declare arguments before `{name}` references resolve.
        let mut args = ArgTable::new();
        for tokens in texts.iter().filter_map(|text| tokenize(text).ok()) {
            for token in &tokens {
                if let Token::Arg(arg @ ArgRef { index: Some(_), .. }) = token {
                    let _ = args.declare(arg);
                }
            }
        }

        let mut variants = Vec::with_capacity(texts.len());
        for text in texts {
            match to_pieces(&text, |arg| args.declare(arg)) {
                Ok(pieces) => variants.push(pieces),
                Err(message) => {
                    let d = Diagnostic::validation(message);
                    let d = self.diagnostic(d, setting, file, &property.key, property.line);
                    self.pending.push(d);
                    variants.push(vec![Piece::Text(text)]);
                }
            }
        }
        if let Err(message) = args.check_complete() {
            let d = Diagnostic::validation(message);
            let d = self.diagnostic(d, setting, file, &property.key, property.line);
            self.pending.push(d);
        }

        CatalogEntry {
            key: property.key.clone(),
            line: property.line,
            arity,
            args,
            root: Message { variants },
            overrides: vec![None; locale_count],
        }
    }

    fn merge_locale(
        &mut self,
        index: usize,
        setting: &LocaleSetting,
        file: &ResourceFile,
        root_keys: &BTreeSet<&str>,
        entries: &mut [CatalogEntry],
    ) {
        for entry in entries.iter_mut() {
            let Some(property) = file.properties.get(&entry.key) else {
                if self.config.fallback.allow_missing_keys {
                    debug!(locale = %setting.locale, key = %entry.key, "key falls back to root");
                } else {
                    let d = Diagnostic::validation(
                        "key is missing and missing keys are not allowed",
                    )
                    .with_locale(&setting.locale)
                    .with_key(&entry.key)
                    .with_file(&file.path);
                    self.pending.push(d);
                }
                continue;
            };

            let expected = entry.arity.expected_variants(setting.plural_forms);
            if property.variants.len() != expected {
                let d = Diagnostic::validation(format!(
                    "expected {} variant(s), found {}",
                    expected,
                    property.variants.len()
                ));
                let d = self.diagnostic(d, setting, file, &entry.key, property.line);
                self.pending.push(d);
                continue;
            }

            let mut variants = Vec::with_capacity(expected);
            let mut failed = false;
            for raw in &property.variants {
                let text = self.transform(raw);
                match to_pieces(&text, |arg| entry.args.resolve(arg)) {
                    Ok(pieces) => variants.push(pieces),
                    Err(message) => {
                        let d = Diagnostic::validation(message);
                        let d = self.diagnostic(d, setting, file, &entry.key, property.line);
                        self.pending.push(d);
                        failed = true;
                    }
                }
            }
            if !failed {
                entry.overrides[index] = Some(Message { variants });
            }
        }

        for property in &file.properties.entries {
            if root_keys.contains(property.key.as_str()) {
                continue;
            }
            if self.config.fallback.ignore_extra_keys {
                warn!(
                    locale = %setting.locale,
                    key = %property.key,
                    "ignoring key not declared by the root locale"
                );
            } else {
                let d = Diagnostic::validation("extraneous key not declared by the root locale");
                let d = self.diagnostic(d, setting, file, &property.key, property.line);
                self.pending.push(d);
            }
        }
    }
}

fn to_pieces(
    text: &str,
    mut bind: impl FnMut(&ArgRef) -> Result<usize, String>,
) -> Result<Vec<Piece>, String> {
    tokenize(text)?
        .into_iter()
        .map(|token| match token {
            Token::Text(text) => Ok(Piece::Text(text)),
            Token::Arg(arg) => bind(&arg).map(Piece::Arg),
        })
        .collect()
}
