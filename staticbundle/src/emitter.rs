//! Renders a validated bundle as Rust source.
//!
//! Output depends only on the bundle: entries in root declaration order,
//! locales in configuration order, no timestamps or host paths.

use crate::{
    catalog::{Arity, CatalogEntry, Message},
    config::LocaleSetting,
    placeholder::{ArgTable, Piece},
    validator::{LOCALE_TAG_TYPE, QUANTITY_PARAMETER, ValidatedBundle},
};

const INDENT: &str = "    ";

/// Line-oriented source buffer with automatic indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one indented line.
    pub fn line(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            self.buf.push('\n');
            return self;
        }
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes `text` and indents the following lines.
    pub fn open(&mut self, text: &str) -> &mut Self {
        self.line(text);
        self.level += 1;
        self
    }

    /// Dedents and writes `text`.
    pub fn close(&mut self, text: &str) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self.line(text)
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Renders the generated source file of `bundle`.
pub fn render(bundle: &ValidatedBundle) -> String {
    let mut w = CodeWriter::new();
    let type_name = &bundle.target.type_name;

    w.line("// @generated by staticbundle. Do not edit by hand.")
        .line(&format!("// Message source `{}`.", bundle.target))
        .blank();

    write_locale_tag(&mut w, &bundle.locales, type_name);
    w.blank();

    w.line(&format!("/// Localized messages, see [`{}`].", LOCALE_TAG_TYPE))
        .line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]")
        .open(&format!("pub struct {} {{", type_name))
        .line(&format!("locale_tag: {},", LOCALE_TAG_TYPE))
        .close("}")
        .blank();

    w.line("#[allow(non_snake_case)]")
        .open(&format!("impl {} {{", type_name));
    write_members(&mut w, bundle);
    for (entry, accessor) in bundle.catalog.entries.iter().zip(&bundle.accessors) {
        w.blank();
        write_accessor(&mut w, bundle, entry, accessor);
    }
    w.close("}");

    for (setting, rule) in bundle.locales.iter().zip(&bundle.rules) {
        let param = if rule.uses_variable() { "n" } else { "_n" };
        w.blank()
            .open(&format!(
                "fn {}({}: i64) -> i64 {{",
                plural_fn(setting),
                param
            ))
            .line(&rule.to_rust())
            .close("}");
    }
    w.finish()
}

fn plural_fn(setting: &LocaleSetting) -> String {
    format!("plural_form_{}", setting.function_suffix())
}

fn variant(setting: &LocaleSetting) -> String {
    format!("{}::{}", LOCALE_TAG_TYPE, setting.variant_name())
}

fn write_locale_tag(w: &mut CodeWriter, locales: &[LocaleSetting], type_name: &str) {
    w.line(&format!("/// Locales supported by [`{}`].", type_name))
        .line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]")
        .open(&format!("pub enum {} {{", LOCALE_TAG_TYPE));
    for setting in locales {
        if setting.is_root() {
            w.line("#[default]");
        }
        w.line(&format!("{},", setting.variant_name()));
    }
    w.close("}").blank();

    let all: Vec<String> = locales.iter().map(variant).collect();
    w.open(&format!("impl {} {{", LOCALE_TAG_TYPE))
        .line(&format!(
            "pub const ALL: [{}; {}] = [{}];",
            LOCALE_TAG_TYPE,
            locales.len(),
            all.join(", ")
        ))
        .blank()
        .line("/// The configured tag; empty for the root locale.")
        .open("pub fn as_str(&self) -> &'static str {")
        .open("match self {");
    for setting in locales {
        w.line(&format!("{} => {:?},", variant(setting), setting.locale));
    }
    w.close("}").close("}").close("}");
}

fn write_members(w: &mut CodeWriter, bundle: &ValidatedBundle) {
    w.open(&format!(
        "pub const fn new(locale_tag: {}) -> Self {{",
        LOCALE_TAG_TYPE
    ))
    .line("Self { locale_tag }")
    .close("}")
    .blank()
    .open(&format!(
        "pub const fn locale_tag(&self) -> {} {{",
        LOCALE_TAG_TYPE
    ))
    .line("self.locale_tag")
    .close("}")
    .blank()
    .open(&format!(
        "pub const fn with_locale_tag(&self, locale_tag: {}) -> Self {{",
        LOCALE_TAG_TYPE
    ))
    .line("Self { locale_tag }")
    .close("}")
    .blank()
    .line("/// Plural form index of `n` in the current locale.")
    .open("pub fn plural_form(&self, n: i64) -> i64 {");

    if let [only] = bundle.locales.as_slice() {
        w.line(&format!("{}(n)", plural_fn(only)));
    } else {
        w.open("match self.locale_tag {");
        for setting in &bundle.locales {
            w.line(&format!("{} => {}(n),", variant(setting), plural_fn(setting)));
        }
        w.close("}");
    }
    w.close("}");
}

fn write_accessor(w: &mut CodeWriter, bundle: &ValidatedBundle, entry: &CatalogEntry, name: &str) {
    let mut params = vec!["&self".to_string()];
    if entry.arity.is_plural() {
        params.push(format!("{}: i64", QUANTITY_PARAMETER));
    }
    params.extend(
        entry
            .args
            .arguments()
            .map(|arg| format!("{}: {}", arg.name, arg.ty.rust_type())),
    );

    w.line(&format!("/// Message {:?}.", entry.key)).open(&format!(
        "pub fn {}({}) -> String {{",
        name,
        params.join(", ")
    ));

    let root = &bundle.locales[bundle.catalog.root_index];
    if let [only] = bundle.locales.as_slice() {
        write_message(w, "", "", entry, &entry.root, only);
    } else {
        w.open("match self.locale_tag {");
        for (index, setting) in bundle.locales.iter().enumerate() {
            let arm = format!("{} => ", variant(setting));
            match entry.override_for(index) {
                Some(message) => write_message(w, &arm, ",", entry, message, setting),
                None => write_message(w, &arm, ",", entry, &entry.root, root),
            }
        }
        w.close("}");
    }
    w.close("}");
}

/// Writes `message` as `<prefix><expression><suffix>`, selecting the plural
/// variant with the rule of `rule_locale`.
fn write_message(
    w: &mut CodeWriter,
    prefix: &str,
    suffix: &str,
    entry: &CatalogEntry,
    message: &Message,
    rule_locale: &LocaleSetting,
) {
    match (entry.arity, message.variants.as_slice()) {
        (Arity::Plural(_), [first, rest @ ..]) if !rest.is_empty() => {
            w.open(&format!(
                "{}match {}({}) {{",
                prefix,
                plural_fn(rule_locale),
                QUANTITY_PARAMETER
            ));
            let last = rest.len();
            w.line(&format!("0 => {},", string_expr(first, &entry.args)));
            for (i, variant) in rest.iter().enumerate() {
                let pattern = if i + 1 == last {
                    "_".to_string()
                } else {
                    (i + 1).to_string()
                };
                w.line(&format!("{} => {},", pattern, string_expr(variant, &entry.args)));
            }
            w.close(&format!("}}{}", suffix));
        }
        (_, [only, ..]) => {
            w.line(&format!("{}{}{}", prefix, string_expr(only, &entry.args), suffix));
        }
        (_, []) => {
            w.line(&format!("{}String::new(){}", prefix, suffix));
        }
    }
}

/// A Rust expression of type `String` producing `pieces`.
fn string_expr(pieces: &[Piece], args: &ArgTable) -> String {
    let mut template = String::new();
    let mut has_args = false;
    for piece in pieces {
        match piece {
            Piece::Text(text) => template.push_str(text),
            Piece::Arg(_) => has_args = true,
        }
    }
    if !has_args {
        return format!("String::from({:?})", template);
    }

    template.clear();
    for piece in pieces {
        match piece {
            Piece::Text(text) => template.push_str(&text.replace('{', "{{").replace('}', "}}")),
            Piece::Arg(index) => {
                let name = args
                    .arguments()
                    .find(|a| a.index == *index)
                    .map(|a| a.name.as_str())
                    .unwrap_or_default();
                template.push('{');
                template.push_str(name);
                template.push('}');
            }
        }
    }
    format!("format!({:?})", template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::ArgRef;
    use indoc::indoc;

    #[test]
    fn test_code_writer_indents() {
        let mut w = CodeWriter::new();
        w.open("fn main() {")
            .open("if true {")
            .line("run();")
            .close("}")
            .blank()
            .line("done();")
            .close("}");
        assert_eq!(
            w.finish(),
            indoc! {"
                fn main() {
                    if true {
                        run();
                    }

                    done();
                }
            "}
        );
    }

    #[test]
    fn test_string_expr() {
        let mut args = ArgTable::new();
        args.declare(&ArgRef {
            index: Some(0),
            name: Some("name".to_string()),
            ty: None,
        })
        .unwrap();

        let text = |s: &str| Piece::Text(s.to_string());
        assert_eq!(
            string_expr(&[text("Say \"hi\" {x}\n")], &args),
            r#"String::from("Say \"hi\" {x}\n")"#
        );
        assert_eq!(
            string_expr(&[text("{Hello} "), Piece::Arg(0), text("!")], &args),
            r#"format!("{{Hello}} {name}!")"#
        );
        assert_eq!(string_expr(&[], &args), r#"String::from("")"#);
    }
}
