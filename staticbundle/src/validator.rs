//! Cross-checks configuration, resources and plural rules of a source set.
//!
//! Every check runs and contributes its diagnostics; only a root resource
//! file that cannot be loaded stops validation early, because nothing after
//! it is meaningful.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::{
    catalog::{Arity, MessageCatalog},
    config::{LOCALE_PLACEHOLDER, LocaleSetting, SourceSetConfig, TargetName},
    diagnostic::{Diagnostic, Diagnostics},
    loader,
    naming::is_identifier,
    plural_rules::{PluralError, PluralRule},
};

/// Parameter name of the quantity in generated plural accessors.
pub const QUANTITY_PARAMETER: &str = "amount";

/// Members of the generated type that message accessors may not shadow.
pub const RESERVED_MEMBERS: [&str; 4] = ["new", "locale_tag", "with_locale_tag", "plural_form"];

/// Name of the generated locale enum.
pub const LOCALE_TAG_TYPE: &str = "LocaleTag";

/// Everything the emitter needs, produced only by a fully successful
/// validation.
#[derive(Debug, Clone)]
pub struct ValidatedBundle {
    pub target: TargetName,
    /// Artifact location below the output directory.
    pub artifact_path: PathBuf,
    pub locales: Vec<LocaleSetting>,
    /// Aligned with `locales`.
    pub rules: Vec<PluralRule>,
    pub catalog: MessageCatalog,
    /// Accessor name of every catalog entry, aligned with `catalog.entries`.
    pub accessors: Vec<String>,
}

/// Validates the source set described by `config` against the resources in
/// `input_dir`, for an artifact to be written below `output_dir`.
pub fn validate(
    config: &SourceSetConfig,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<ValidatedBundle, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    if config.root_locale().is_none() {
        let roots = config.locales.iter().filter(|l| l.is_root()).count();
        diagnostics.push(Diagnostic::validation(format!(
            "exactly one root locale (empty `locale`) must be configured, found {}",
            roots
        )));
        diagnostics.extend(check_locales(config));
        return Err(diagnostics);
    }

    let resources = loader::load(config, input_dir)?;
    diagnostics.extend(check_locales(config));
    diagnostics.extend(resources.diagnostics.clone());

    let rules = compile_rules(&config.locales, &mut diagnostics);

    let catalog = MessageCatalog::build(config, &resources);
    diagnostics.extend(catalog.pending.clone());

    let accessors = check_names(config, &catalog, &resources.root.path, &mut diagnostics);

    let target = match TargetName::parse(&config.message_source_class_name) {
        Ok(target) if target.type_name == LOCALE_TAG_TYPE => {
            diagnostics.push(Diagnostic::naming_conflict(format!(
                "target type `{}` clashes with the generated `{}` enum",
                target, LOCALE_TAG_TYPE
            )));
            None
        }
        Ok(target) => Some(target),
        Err(message) => {
            diagnostics.push(Diagnostic::validation(message));
            None
        }
    };
    let artifact_path = target.as_ref().map(|t| output_dir.join(t.relative_path()));
    if let Some(path) = &artifact_path {
        diagnostics.extend(check_output(output_dir, path));
    }

    match (target, artifact_path, rules) {
        (Some(target), Some(artifact_path), Some(rules)) if diagnostics.is_empty() => {
            Ok(ValidatedBundle {
                target,
                artifact_path,
                locales: config.locales.clone(),
                rules,
                catalog,
                accessors,
            })
        }
        _ => Err(diagnostics),
    }
}

fn check_locales(config: &SourceSetConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut tags = BTreeSet::new();
    let mut variants: BTreeMap<String, &str> = BTreeMap::new();

    for setting in &config.locales {
        if setting.plural_forms == 0 {
            out.push(
                Diagnostic::validation("plural forms must be at least 1")
                    .with_locale(&setting.locale),
            );
        }
        if let Some(other) = variants.insert(setting.variant_name(), setting.display_name()) {
            out.push(
                Diagnostic::naming_conflict(format!(
                    "locales `{}` and `{}` both map to `LocaleTag::{}`",
                    other,
                    setting.display_name(),
                    setting.variant_name()
                ))
                .with_locale(&setting.locale),
            );
        }
        if setting.is_root() {
            continue;
        }
        let normalized = setting.locale.replace('_', "-");
        if normalized.parse::<LanguageIdentifier>().is_err() {
            out.push(
                Diagnostic::validation(format!(
                    "`{}` is not a valid language identifier",
                    setting.locale
                ))
                .with_locale(&setting.locale),
            );
        }
        if !tags.insert(setting.locale.as_str()) {
            out.push(
                Diagnostic::validation("locale is configured more than once")
                    .with_locale(&setting.locale),
            );
        }
    }

    if config.locales.len() > 1 && !config.resource_filename_format.contains(LOCALE_PLACEHOLDER) {
        out.push(Diagnostic::validation(format!(
            "resource filename format `{}` has no `{}` placeholder",
            config.resource_filename_format, LOCALE_PLACEHOLDER
        )));
    }
    out
}

/// Compiles one rule per locale. `None` if any rule is unusable.
fn compile_rules(locales: &[LocaleSetting], diagnostics: &mut Diagnostics) -> Option<Vec<PluralRule>> {
    let mut rules = Vec::with_capacity(locales.len());
    let mut ok = true;

    for setting in locales {
        let rule = match PluralRule::compile(
            &setting.locale,
            setting.plural_forms,
            &setting.plural_function,
        ) {
            Ok(rule) => rule,
            Err(e) => {
                let d = match &e {
                    PluralError::Parse { .. } => Diagnostic::parse(plural_message(setting, &e)),
                    PluralError::Semantic { .. } => {
                        Diagnostic::semantic(plural_message(setting, &e))
                    }
                };
                diagnostics.push(d.with_locale(&setting.locale).with_offset(e.offset()));
                ok = false;
                continue;
            }
        };
        debug!(locale = setting.display_name(), rule = %rule.source, "compiled plural rule");

        if setting.plural_forms > 0 {
            if let Some((n, index)) = rule.find_out_of_range() {
                diagnostics.push(
                    Diagnostic::validation(format!(
                        "plural rule `{}` yields {} for n = {}, outside [0, {})",
                        rule.source, index, n, setting.plural_forms
                    ))
                    .with_locale(&setting.locale),
                );
                ok = false;
            }
        }
        rules.push(rule);
    }
    ok.then_some(rules)
}

fn plural_message(setting: &LocaleSetting, e: &PluralError) -> String {
    format!("in plural rule `{}`: {}", setting.plural_function, e.message())
}

/// Derives accessor names and checks them and the argument names.
fn check_names(
    config: &SourceSetConfig,
    catalog: &MessageCatalog,
    root_file: &Path,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut accessors = Vec::with_capacity(catalog.entries.len());

    for entry in &catalog.entries {
        let at = |d: Diagnostic| {
            d.with_locale("")
                .with_key(&entry.key)
                .with_file(root_file)
                .with_line(entry.line)
        };
        let name = config.naming.to_identifier(&entry.key);

        if !is_identifier(&name) {
            diagnostics.push(at(Diagnostic::validation(format!(
                "naming strategy {} maps the key to `{}`, which is not a legal identifier",
                config.naming, name
            ))));
        } else if RESERVED_MEMBERS.contains(&name.as_str()) {
            diagnostics.push(at(Diagnostic::naming_conflict(format!(
                "accessor `{}` would shadow a generated member",
                name
            ))));
        } else if let Some(first) = seen.get(&name) {
            diagnostics.push(at(Diagnostic::naming_conflict(format!(
                "keys `{}` and `{}` both map to accessor `{}`",
                first, entry.key, name
            ))));
        } else {
            seen.insert(name.clone(), &entry.key);
        }

        for arg in entry.args.arguments() {
            if !is_identifier(&arg.name) {
                diagnostics.push(at(Diagnostic::validation(format!(
                    "argument name `{}` is not a legal identifier",
                    arg.name
                ))));
            } else if matches!(entry.arity, Arity::Plural(_)) && arg.name == QUANTITY_PARAMETER {
                diagnostics.push(at(Diagnostic::naming_conflict(format!(
                    "argument `{}` clashes with the plural quantity parameter",
                    arg.name
                ))));
            }
        }
        accessors.push(name);
    }
    accessors
}

fn check_output(output_dir: &Path, artifact: &Path) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if output_dir.exists() && !output_dir.is_dir() {
        out.push(Diagnostic::validation("output path is not a directory").with_file(output_dir));
    }
    if artifact.is_dir() {
        out.push(
            Diagnostic::validation("artifact path is an existing directory").with_file(artifact),
        );
    }
    let mut ancestor = artifact.parent();
    while let Some(dir) = ancestor {
        if dir == output_dir {
            break;
        }
        if dir.exists() && !dir.is_dir() {
            out.push(
                Diagnostic::validation("module directory is an existing file").with_file(dir),
            );
        }
        ancestor = dir.parent();
    }
    out
}
