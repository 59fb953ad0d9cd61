//! Support for `.properties` resource bundles.
//!
//! The syntax follows Java properties files:
//!
//! - `#` and `!` start comment lines, blank lines are skipped;
//! - `key=value`, `key:value` and `key value` are all accepted;
//! - a line ending in an odd number of backslashes continues on the next line;
//! - `\t`, `\n`, `\r`, `\f`, `\uXXXX` are decoded, any other escaped character
//!   stands for itself.
//!
//! On top of that an unescaped `|` separates the variants of a pluralized
//! message (`items=One item|Many items`). A literal pipe is written `\|`.

use std::fmt;

use thiserror::Error;

use crate::traits::Parser;

/// A parsed `.properties` file in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub entries: Vec<Property>,
}

/// One `key=value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    /// Decoded value split on unescaped `|`; a singular value has one variant.
    pub variants: Vec<String>,
    /// 1-based line the declaration starts on.
    pub line: usize,
}

impl Property {
    pub fn is_plural(&self) -> bool {
        self.variants.len() > 1
    }
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.entries.iter().find(|p| p.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.key.as_str())
    }
}

/// A syntax problem on one line of a properties file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}", SyntaxErrors(.0))]
    Syntax(Vec<SyntaxError>),
}

struct SyntaxErrors<'a>(&'a [SyntaxError]);

impl fmt::Display for SyntaxErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("; "))
    }
}

impl Parser for Properties {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries: Vec<Property> = Vec::new();
        let mut errors = Vec::new();

        for (line, logical) in LogicalLines::new(s) {
            let (raw_key, raw_value) = split_key_value(&logical);

            let key = match unescape(raw_key, false) {
                Ok(mut parts) => parts.remove(0),
                Err(message) => {
                    errors.push(SyntaxError { line, message });
                    continue;
                }
            };
            if key.is_empty() {
                errors.push(SyntaxError {
                    line,
                    message: "empty key".to_string(),
                });
                continue;
            }

            let variants = match unescape(raw_value, true) {
                Ok(variants) => variants,
                Err(message) => {
                    errors.push(SyntaxError { line, message });
                    continue;
                }
            };

            if let Some(first) = entries.iter().find(|p| p.key == key) {
                errors.push(SyntaxError {
                    line,
                    message: format!(
                        "duplicate key `{}` (first declared on line {})",
                        key, first.line
                    ),
                });
                continue;
            }

            entries.push(Property {
                key,
                variants,
                line,
            });
        }

        if errors.is_empty() {
            Ok(Properties { entries })
        } else {
            Err(PropertiesError::Syntax(errors))
        }
    }
}

/// Iterates over logical lines: comments and blank lines removed,
/// continuation lines joined. Yields the 1-based starting line number.
struct LogicalLines<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LogicalLines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, line) = self.lines.next()?;
            let trimmed = trim_leading_blanks(line);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = String::from(trimmed);
            while ends_with_continuation(&logical) {
                logical.pop();
                match self.lines.next() {
                    Some((_, next)) => logical.push_str(trim_leading_blanks(next)),
                    None => break,
                }
            }
            return Some((index + 1, logical));
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn trim_leading_blanks(line: &str) -> &str {
    line.trim_start_matches(is_blank)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut preceding_backslash = false;

    for (i, c) in line.char_indices() {
        if !preceding_backslash && (c == '=' || c == ':') {
            key_end = i;
            value_start = i + 1;
            has_separator = true;
            break;
        }
        if !preceding_backslash && is_blank(c) {
            key_end = i;
            value_start = i + 1;
            break;
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
    }

    let mut rest = &line[value_start..];
    loop {
        rest = rest.trim_start_matches(is_blank);
        match rest.chars().next() {
            Some(c @ ('=' | ':')) if !has_separator => {
                has_separator = true;
                rest = &rest[c.len_utf8()..];
            }
            _ => break,
        }
    }

    (&line[..key_end], rest)
}

/// Decodes escape sequences. With `split_variants`, an unescaped `|` starts a
/// new variant. Always returns at least one part.
fn unescape(raw: &str, split_variants: bool) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('t') => current.push('\t'),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some('f') => current.push('\u{c}'),
                Some('u') => current.push(decode_unicode_escape(&mut chars)?),
                Some(other) => current.push(other),
                // A dangling backslash at end of input is dropped.
                None => {}
            },
            '|' if split_variants => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    Ok(parts)
}

fn read_hex4(chars: &mut impl Iterator<Item = char>) -> Result<u16, String> {
    let mut value: u16 = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| "malformed \\uxxxx encoding".to_string())?;
        value = (value << 4) | digit as u16;
    }
    Ok(value)
}

fn decode_unicode_escape(chars: &mut std::str::Chars<'_>) -> Result<char, String> {
    let first = read_hex4(chars)?;
    if !(0xD800..0xDC00).contains(&first) {
        return char::from_u32(first as u32)
            .ok_or_else(|| format!("unpaired surrogate \\u{:04X}", first));
    }

    // High surrogate: a `\uXXXX` low surrogate must follow.
    if chars.next() != Some('\\') || chars.next() != Some('u') {
        return Err(format!("unpaired surrogate \\u{:04X}", first));
    }
    let second = read_hex4(chars)?;
    char::decode_utf16([first, second])
        .next()
        .and_then(Result::ok)
        .ok_or_else(|| format!("unpaired surrogate \\u{:04X}", first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(content: &str) -> Properties {
        Properties::from_str(content).unwrap()
    }

    fn syntax_errors(content: &str) -> Vec<SyntaxError> {
        match Properties::from_str(content) {
            Err(PropertiesError::Syntax(errors)) => errors,
            other => panic!("expected syntax errors, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_basic_pairs_in_order() {
        let props = parse(indoc! {"
            # Greeting for the user
            greeting=Hello {0}!
            ! another comment style
            farewell : Goodbye
            title Welcome home
        "});
        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["greeting", "farewell", "title"]);
        assert_eq!(props.get("greeting").unwrap().variants, vec!["Hello {0}!"]);
        assert_eq!(props.get("farewell").unwrap().variants, vec!["Goodbye"]);
        assert_eq!(props.get("title").unwrap().variants, vec!["Welcome home"]);
        assert_eq!(props.get("farewell").unwrap().line, 4);
    }

    #[test]
    fn test_plural_variants_split_on_unescaped_pipe() {
        let props = parse("items=One item|Many items\npipe=a \\| b\n");
        let items = props.get("items").unwrap();
        assert!(items.is_plural());
        assert_eq!(items.variants, vec!["One item", "Many items"]);
        let pipe = props.get("pipe").unwrap();
        assert!(!pipe.is_plural());
        assert_eq!(pipe.variants, vec!["a | b"]);
    }

    #[test]
    fn test_line_continuation_drops_leading_whitespace() {
        let props = parse(indoc! {"
            long=first \\
                 second \\
                 third
            next=value
        "});
        assert_eq!(
            props.get("long").unwrap().variants,
            vec!["first second third"]
        );
        assert_eq!(props.get("next").unwrap().line, 4);
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let props = parse("path=C:\\\\\nother=x\n");
        assert_eq!(props.get("path").unwrap().variants, vec!["C:\\"]);
        assert_eq!(props.get("other").unwrap().variants, vec!["x"]);
    }

    #[test]
    fn test_escape_sequences() {
        let props = parse("k=tab\\tnew\\nline \\u00e9\\u0041 \\= \\#\nsep\\=key=v\n");
        assert_eq!(
            props.get("k").unwrap().variants,
            vec!["tab\tnew\nline éA = #"]
        );
        assert_eq!(props.get("sep=key").unwrap().variants, vec!["v"]);
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let props = parse("emoji=\\uD83D\\uDE00\n");
        assert_eq!(props.get("emoji").unwrap().variants, vec!["😀"]);
    }

    #[test]
    fn test_malformed_unicode_escape_reports_line() {
        let errors = syntax_errors("ok=1\nbad=\\u12G4\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].message.contains("malformed"));
    }

    #[test]
    fn test_duplicate_keys_are_syntax_errors() {
        let errors = syntax_errors("a=1\nb=2\na=3\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
        assert!(errors[0].message.contains("duplicate key `a`"));
        assert!(errors[0].message.contains("line 1"));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let errors = syntax_errors("=nokey\nx=\\uZZZZ\nx=1\nx=2\n");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_empty_value_and_crlf() {
        let props = parse("empty=\r\nfull = yes\r\n");
        assert_eq!(props.get("empty").unwrap().variants, vec![""]);
        assert_eq!(props.get("full").unwrap().variants, vec!["yes"]);
    }
}
