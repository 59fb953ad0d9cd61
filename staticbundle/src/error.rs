//! All error types for the staticbundle crate.
//!
//! Recoverable problems inside a bundle are collected as
//! [`Diagnostic`](crate::diagnostic::Diagnostic)s; an [`Error`] is what the
//! `validate()` / `generate()` entry points finally return.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostics;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("bundle validation failed with {count} problem(s):\n{0}", count = .0.len())]
    Validation(Diagnostics),

    #[error("cannot write `{}`: {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new emit error for the artifact at `path`
    pub fn emit_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Emit {
            path: path.into(),
            source,
        }
    }

    /// Returns the collected diagnostics if this is a validation failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Validation(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Diagnostic;
    use std::io;

    #[test]
    fn test_config_error() {
        let error = Error::config_error("unknown naming `kebab`");
        assert_eq!(
            error.to_string(),
            "invalid configuration: unknown naming `kebab`"
        );
    }

    #[test]
    fn test_validation_error_lists_every_diagnostic() {
        let error = Error::Validation(Diagnostics::from(vec![
            Diagnostic::validation("first"),
            Diagnostic::semantic("second"),
        ]));
        let display = error.to_string();
        assert!(display.starts_with("bundle validation failed with 2 problem(s)"));
        assert!(display.contains("[validation error] first"));
        assert!(display.contains("[semantic error] second"));
        assert_eq!(error.diagnostics().map(Diagnostics::len), Some(2));
    }

    #[test]
    fn test_emit_error_with_source() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let error = Error::emit_error("gen/app_messages.rs", source);
        assert_eq!(
            error.to_string(),
            "cannot write `gen/app_messages.rs`: read-only"
        );
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.diagnostics().is_none());
    }
}
