//! Discovery and parsing of the per-locale resource files of a source set.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    config::{LocaleSetting, SourceSetConfig},
    diagnostic::{Diagnostic, Diagnostics},
    properties::{Properties, PropertiesError},
    traits::Parser,
};

/// A successfully parsed resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    pub locale: String,
    pub path: PathBuf,
    pub properties: Properties,
}

/// Load state of one configured locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleResource {
    Loaded(ResourceFile),
    /// No file at `path`; resolved later through the fallback policy.
    Missing(PathBuf),
    /// The file exists but could not be read or parsed. Diagnostics were
    /// already recorded.
    Broken(PathBuf),
}

impl LocaleResource {
    pub fn file(&self) -> Option<&ResourceFile> {
        match self {
            LocaleResource::Loaded(file) => Some(file),
            _ => None,
        }
    }
}

/// The resources of a source set whose root file loaded cleanly.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    pub root: ResourceFile,
    /// Aligned with the configured locales; the root slot holds the root file.
    pub locales: Vec<LocaleResource>,
    /// Parse problems in non-root files.
    pub diagnostics: Diagnostics,
}

/// Resolves and parses one file per configured locale below `input_dir`.
///
/// Fails, with only the root's diagnostics, when the root file is missing,
/// unreadable or malformed. `config` must contain exactly one root locale.
pub fn load(config: &SourceSetConfig, input_dir: &Path) -> Result<ResourceSet, Diagnostics> {
    let mut diagnostics = Diagnostics::new();
    let mut root = None;
    let mut locales = Vec::with_capacity(config.locales.len());

    for setting in &config.locales {
        let path = input_dir.join(config.resource_file_name(setting));
        if setting.is_root() {
            let file = load_root(setting, path)?;
            root = Some(file.clone());
            locales.push(LocaleResource::Loaded(file));
        } else {
            locales.push(load_locale(setting, path, &mut diagnostics));
        }
    }

    let root = root.ok_or_else(|| {
        Diagnostics::from(vec![Diagnostic::load(
            "no root locale configured, cannot locate the root resource file",
        )])
    })?;

    Ok(ResourceSet {
        root,
        locales,
        diagnostics,
    })
}

fn load_root(setting: &LocaleSetting, path: PathBuf) -> Result<ResourceFile, Diagnostics> {
    if !path.is_file() {
        return Err(Diagnostics::from(vec![
            Diagnostic::load("root resource file not found")
                .with_locale(&setting.locale)
                .with_file(path),
        ]));
    }

    let mut diagnostics = Diagnostics::new();
    match read_file(setting, &path, &mut diagnostics) {
        Some(properties) => Ok(ResourceFile {
            locale: setting.locale.clone(),
            path,
            properties,
        }),
        None => Err(diagnostics),
    }
}

fn load_locale(
    setting: &LocaleSetting,
    path: PathBuf,
    diagnostics: &mut Diagnostics,
) -> LocaleResource {
    if !path.is_file() {
        warn!(
            locale = %setting.locale,
            path = %path.display(),
            "no resource file for locale"
        );
        return LocaleResource::Missing(path);
    }

    match read_file(setting, &path, diagnostics) {
        Some(properties) => LocaleResource::Loaded(ResourceFile {
            locale: setting.locale.clone(),
            path,
            properties,
        }),
        None => LocaleResource::Broken(path),
    }
}

fn read_file(
    setting: &LocaleSetting,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> Option<Properties> {
    match Properties::read_from(path) {
        Ok(properties) => {
            debug!(
                locale = setting.display_name(),
                path = %path.display(),
                entries = properties.entries.len(),
                "loaded resource file"
            );
            Some(properties)
        }
        Err(PropertiesError::Io(e)) => {
            diagnostics.push(
                Diagnostic::load(format!("cannot read resource file: {}", e))
                    .with_locale(&setting.locale)
                    .with_file(path),
            );
            None
        }
        Err(PropertiesError::Syntax(errors)) => {
            diagnostics.extend(errors.into_iter().map(|e| {
                Diagnostic::parse(e.message)
                    .with_locale(&setting.locale)
                    .with_file(path)
                    .with_line(e.line)
            }));
            None
        }
    }
}
