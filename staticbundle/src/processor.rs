//! `validate()` / `generate()` entry points for one source set.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use tracing::{debug, info};

use crate::{
    config::SourceSetConfig,
    emitter,
    error::Error,
    validator::{self, ValidatedBundle},
};

/// What [`Processor::generate`] did with the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Written(PathBuf),
    /// The artifact on disk already had the rendered content.
    Unchanged(PathBuf),
}

impl Generated {
    pub fn path(&self) -> &Path {
        match self {
            Generated::Written(path) | Generated::Unchanged(path) => path,
        }
    }
}

/// Processes one source set: resources from `input_dir`, artifact below
/// `output_dir`.
///
/// A processor keeps no state between calls; every call reloads the
/// resources from disk.
#[derive(Debug, Clone)]
pub struct Processor {
    config: SourceSetConfig,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Processor {
    pub fn new(
        config: SourceSetConfig,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Checks resources and configuration without writing anything.
    pub fn validate(&self) -> Result<ValidatedBundle, Error> {
        let bundle = validator::validate(&self.config, &self.input_dir, &self.output_dir)
            .map_err(Error::Validation)?;
        debug!(
            target_type = %bundle.target,
            keys = bundle.catalog.entries.len(),
            locales = bundle.locales.len(),
            "bundle is valid"
        );
        Ok(bundle)
    }

    /// Validates, then renders the artifact and publishes it atomically.
    ///
    /// Nothing is written when validation fails or when the artifact on disk
    /// is already up to date.
    pub fn generate(&self) -> Result<Generated, Error> {
        let bundle = self.validate()?;
        let source = emitter::render(&bundle);
        publish(&bundle.artifact_path, source.as_bytes())
    }
}

fn publish(path: &Path, content: &[u8]) -> Result<Generated, Error> {
    if fs::read(path).is_ok_and(|existing| existing == content) {
        info!(path = %path.display(), "artifact unchanged");
        return Ok(Generated::Unchanged(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::emit_error(parent, e))?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|file| file.write_all(content))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => {
                Error::emit_error(path, e)
            }
        })?;

    info!(path = %path.display(), bytes = content.len(), "artifact written");
    Ok(Generated::Written(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleSetting;
    use tempfile::TempDir;

    fn processor(dir: &TempDir, root: &str) -> Processor {
        let res = dir.path().join("res");
        fs::create_dir_all(&res).unwrap();
        fs::write(res.join("messages.properties"), root).unwrap();
        Processor::new(
            SourceSetConfig::new(
                "i18n::Messages",
                vec![LocaleSetting::root(2, "n == 1 ? 0 : 1")],
            ),
            res,
            dir.path().join("out"),
        )
    }

    #[test]
    fn test_generate_writes_then_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir, "greeting=Hello\n");
        let artifact = dir.path().join("out/i18n/messages.rs");

        assert_eq!(
            processor.generate().unwrap(),
            Generated::Written(artifact.clone())
        );
        let first = fs::read(&artifact).unwrap();
        assert_eq!(
            processor.generate().unwrap(),
            Generated::Unchanged(artifact.clone())
        );
        assert_eq!(fs::read(&artifact).unwrap(), first);
    }

    #[test]
    fn test_failed_validation_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir, "a.b=1\na_b=2\n");
        let err = processor.generate().unwrap_err();
        assert_eq!(err.diagnostics().map(|d| d.len()), Some(1));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_validate_does_not_write() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir, "greeting=Hello\n");
        let bundle = processor.validate().unwrap();
        assert_eq!(bundle.accessors, vec!["greeting"]);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_emit_error_when_module_dir_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir, "greeting=Hello\n");
        let bundle = processor.validate().unwrap();
        fs::create_dir_all(dir.path().join("out")).unwrap();
        fs::write(dir.path().join("out/i18n"), "blocker").unwrap();

        let err = publish(&bundle.artifact_path, b"x").unwrap_err();
        assert!(matches!(err, Error::Emit { .. }));
    }
}
