//! Message key → Rust identifier conversion.

use std::{collections::BTreeSet, fmt, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    /// Strict, reserved and edition-2024 keywords. None of them may be used
    /// as a plain identifier in generated code.
    static ref KEYWORDS: BTreeSet<&'static str> = [
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
        "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
        "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
        "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become",
        "box", "do", "final", "macro", "override", "priv", "typeof", "unsized", "virtual",
        "yield", "try", "gen",
    ]
    .into_iter()
    .collect();
}

/// Returns true if `name` can be used verbatim as a Rust identifier.
///
/// Only ASCII identifiers are accepted, and `_` on its own is rejected.
pub fn is_identifier(name: &str) -> bool {
    name != "_" && IDENTIFIER_REGEX.is_match(name) && !KEYWORDS.contains(name)
}

/// Caller-supplied key conversion.
pub type NamingFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Strategy turning message keys into accessor method names.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// `user.first_name` → `userFirstName`.
    #[default]
    #[serde(alias = "camelCase")]
    CamelCase,
    /// `user.firstName` → `user_first_name`.
    #[serde(alias = "snakeCase")]
    SnakeCase,
    /// The key is used unchanged.
    Verbatim,
    #[serde(skip)]
    Custom { name: String, convert: NamingFn },
}

impl Naming {
    pub fn custom(
        name: impl Into<String>,
        convert: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Naming::Custom {
            name: name.into(),
            convert: Arc::new(convert),
        }
    }

    pub fn to_identifier(&self, key: &str) -> String {
        match self {
            Naming::CamelCase => to_camel_case(key),
            Naming::SnakeCase => to_snake_case(key),
            Naming::Verbatim => key.to_string(),
            Naming::Custom { convert, .. } => convert(key),
        }
    }
}

impl fmt::Debug for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Naming::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Naming::CamelCase => f.write_str("camel_case"),
            Naming::SnakeCase => f.write_str("snake_case"),
            Naming::Verbatim => f.write_str("verbatim"),
            Naming::Custom { name, .. } => write!(f, "custom `{}`", name),
        }
    }
}

impl PartialEq for Naming {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Naming::Custom { convert: a, .. }, Naming::Custom { convert: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

fn segments(key: &str) -> impl Iterator<Item = &str> {
    key.split(['.', '_', '-']).filter(|s| !s.is_empty())
}

/// `user.first_name` → `userFirstName`. The first segment is kept as is.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, segment) in segments(key).enumerate() {
        if i == 0 {
            out.push_str(segment);
        } else {
            push_capitalized(&mut out, segment);
        }
    }
    out
}

/// `en_US` → `EnUs`, `messages.title` → `MessagesTitle`.
pub fn to_upper_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for segment in segments(key) {
        let lower = segment.to_lowercase();
        push_capitalized(&mut out, &lower);
    }
    out
}

/// `AppMessages` → `app_messages`, `user.firstName` → `user_first_name`.
pub fn to_snake_case(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for segment in segments(key) {
        let mut word = String::new();
        let mut prev_lower_or_digit = false;
        for c in segment.chars() {
            if c.is_uppercase() && prev_lower_or_digit {
                words.push(std::mem::take(&mut word));
            }
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
            word.extend(c.to_lowercase());
        }
        words.push(word);
    }
    words.join("_")
}

fn push_capitalized(out: &mut String, segment: &str) {
    let mut chars = segment.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("greeting"), "greeting");
        assert_eq!(to_camel_case("user.first_name"), "userFirstName");
        assert_eq!(to_camel_case("menu-file.open"), "menuFileOpen");
        assert_eq!(to_camel_case("a..b"), "aB");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("AppMessages"), "app_messages");
        assert_eq!(to_snake_case("user.firstName"), "user_first_name");
        assert_eq!(to_snake_case("HTTPStatus"), "httpstatus");
        assert_eq!(to_snake_case("item2Count"), "item2_count");
    }

    #[test]
    fn test_upper_camel_case() {
        assert_eq!(to_upper_camel_case("en"), "En");
        assert_eq!(to_upper_camel_case("en_US"), "EnUs");
        assert_eq!(to_upper_camel_case("zh-Hant-TW"), "ZhHantTw");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("greeting"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("userName2"));
        assert!(!is_identifier("user.name"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("fn"));
        assert!(!is_identifier("gen"));
        assert!(!is_identifier("_"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_strategies() {
        assert_eq!(Naming::CamelCase.to_identifier("a.b_c"), "aBC");
        assert_eq!(Naming::SnakeCase.to_identifier("a.bC"), "a_b_c");
        assert_eq!(Naming::Verbatim.to_identifier("a.b"), "a.b");
        let upper = Naming::custom("upper", |k| k.to_uppercase());
        assert_eq!(upper.to_identifier("title"), "TITLE");
        assert_eq!(format!("{:?}", upper), "Custom(\"upper\")");
        assert_eq!(upper, upper.clone());
        assert_ne!(upper, Naming::custom("upper", |k| k.to_uppercase()));
    }

    #[test]
    fn test_deserialize_names() {
        #[derive(Deserialize)]
        struct Holder {
            naming: Naming,
        }
        let h: Holder = serde_json::from_str(r#"{"naming":"camelCase"}"#).unwrap();
        assert_eq!(h.naming, Naming::CamelCase);
        let h: Holder = serde_json::from_str(r#"{"naming":"verbatim"}"#).unwrap();
        assert_eq!(h.naming, Naming::Verbatim);
        let h: Holder = serde_json::from_str(r#"{"naming":"snake_case"}"#).unwrap();
        assert_eq!(h.naming, Naming::SnakeCase);
    }
}
