//! Accumulated, non-fatal problem reports.
//!
//! Every stage of the pipeline records what it finds as a [`Diagnostic`]
//! instead of returning early, so that one `validate()` run reports every
//! problem in the bundle at once.

use std::{fmt, path::PathBuf};

use serde::Serialize;

/// Category of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Missing or unreadable resource file.
    Load,
    /// Malformed resource file or plural expression.
    Parse,
    /// Type mismatch inside a plural expression.
    Semantic,
    /// Arity mismatch, plural range violation, malformed target name, ...
    Validation,
    /// Two keys (or a key and a generated member) map to the same identifier.
    NamingConflict,
    /// I/O failure while publishing the generated artifact.
    Emit,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Load => "load error",
            DiagnosticKind::Parse => "parse error",
            DiagnosticKind::Semantic => "semantic error",
            DiagnosticKind::Validation => "validation error",
            DiagnosticKind::NamingConflict => "naming conflict",
            DiagnosticKind::Emit => "emit error",
        };
        f.write_str(name)
    }
}

/// A single problem found while loading, validating or emitting a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 1-based line inside `file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 0-based character offset inside a plural expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            locale: None,
            key: None,
            file: None,
            line: None,
            offset: None,
            message: message.into(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Load, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Parse, message)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Semantic, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Validation, message)
    }

    pub fn naming_conflict(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::NamingConflict, message)
    }

    pub fn emit(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Emit, message)
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(file) = &self.file {
            write!(f, " bundle '{}'", file.display())?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
            f.write_str(",")?;
        }
        if let Some(locale) = &self.locale {
            let shown = if locale.is_empty() { "root" } else { locale };
            write!(f, " locale '{}',", shown)?;
        }
        if let Some(key) = &self.key {
            write!(f, " key '{}',", key)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " at offset {},", offset)?;
        }
        write!(f, " {}", self.message)
    }
}

/// Ordered list of diagnostics returned by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(value: Vec<Diagnostic>) -> Self {
        Diagnostics(value)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_all_fields() {
        let d = Diagnostic::validation("expected 2 variants, found 3")
            .with_file("res/messages_en.properties")
            .with_line(4)
            .with_locale("en")
            .with_key("items");
        assert_eq!(
            d.to_string(),
            "[validation error] bundle 'res/messages_en.properties':4, locale 'en', key 'items', expected 2 variants, found 3"
        );
    }

    #[test]
    fn test_display_root_locale_and_offset() {
        let d = Diagnostic::parse("unexpected `)`")
            .with_locale("")
            .with_offset(7);
        assert_eq!(
            d.to_string(),
            "[parse error] locale 'root', at offset 7, unexpected `)`"
        );
    }

    #[test]
    fn test_diagnostics_serialize_skips_missing_fields() {
        let mut list = Diagnostics::new();
        list.push(Diagnostic::load("missing root bundle").with_file("messages.properties"));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json[0]["kind"], "load");
        assert_eq!(json[0]["file"], "messages.properties");
        assert!(json[0].get("key").is_none());
    }
}
