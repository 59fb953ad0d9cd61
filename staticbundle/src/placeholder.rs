//! Positional placeholder parsing and argument tables.
//!
//! A placeholder is one of
//!
//! - `{0}`            positional argument 0
//! - `{0:name}`       positional argument 0 called `name`
//! - `{0:name:int}`   ... with an explicit type (`str` or `int`)
//! - `{name}`         reference to an argument by name
//!
//! Braces that do not match one of these shapes are kept as literal text.
//! A message declares at most [`MAX_ARGUMENTS`] positional arguments.

use std::fmt;

/// Upper bound (exclusive) on positional argument indices.
pub const MAX_ARGUMENTS: usize = 64;

/// Parameter type of a generated accessor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgType {
    #[default]
    Str,
    Int,
}

impl ArgType {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "str" | "string" => Some(ArgType::Str),
            "int" | "long" | "i64" => Some(ArgType::Int),
            _ => None,
        }
    }

    /// The Rust parameter type used in generated signatures.
    pub fn rust_type(&self) -> &'static str {
        match self {
            ArgType::Str => "&str",
            ArgType::Int => "i64",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Str => f.write_str("str"),
            ArgType::Int => f.write_str("int"),
        }
    }
}

/// A placeholder as written in the resource text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgRef {
    pub index: Option<usize>,
    pub name: Option<String>,
    pub ty: Option<ArgType>,
}

impl fmt::Display for ArgRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .index
            .map(|i| i.to_string())
            .into_iter()
            .chain(self.name.clone())
            .chain(self.ty.map(|t| t.to_string()))
            .collect();
        write!(f, "{{{}}}", parts.join(":"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Arg(ArgRef),
}

/// A message after argument resolution: literal text and argument indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Arg(usize),
}

/// Splits `input` into literal text and placeholders, in occurrence order.
///
/// Fails only on a placeholder with an unknown type annotation.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(['{', '}']).filter(|&i| after.as_bytes()[i] == b'}') else {
            text.push('{');
            rest = after;
            continue;
        };

        match parse_arg_ref(&after[..close])? {
            Some(arg) => {
                if !text.is_empty() {
                    out.push(Token::Text(std::mem::take(&mut text)));
                }
                out.push(Token::Arg(arg));
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        out.push(Token::Text(text));
    }
    Ok(out)
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_arg_ref(content: &str) -> Result<Option<ArgRef>, String> {
    let parts: Vec<&str> = content.split(':').collect();
    let first = parts[0];

    if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
        let Ok(index) = first.parse::<usize>() else {
            return Ok(None);
        };
        let name = match parts.get(1) {
            Some(name) if is_name(name) => Some(name.to_string()),
            Some(_) => return Ok(None),
            None => None,
        };
        let ty = match parts.get(2) {
            Some(ty) => Some(
                ArgType::parse(ty)
                    .ok_or_else(|| format!("unknown argument type `{}` in {{{}}}", ty, content))?,
            ),
            None => None,
        };
        if parts.len() > 3 {
            return Ok(None);
        }
        return Ok(Some(ArgRef { index: Some(index), name, ty }));
    }

    if parts.len() == 1 && is_name(first) {
        return Ok(Some(ArgRef {
            index: None,
            name: Some(first.to_string()),
            ty: None,
        }));
    }
    Ok(None)
}

/// One declared accessor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub index: usize,
    pub name: String,
    pub ty: ArgType,
    explicit_name: bool,
    explicit_type: bool,
}

/// Arguments of one message key, declared by the root locale and shared by
/// every locale and plural variant of that key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgTable {
    slots: Vec<Option<Argument>>,
}

impl ArgTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declared arguments ordered by index. Only meaningful after [`Self::check_complete`].
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.slots.iter().flatten()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.arguments().find(|a| a.name == name).map(|a| a.index)
    }

    /// Declares (or re-states) an argument from a root-locale placeholder and
    /// returns its index.
    pub fn declare(&mut self, arg: &ArgRef) -> Result<usize, String> {
        let Some(index) = arg.index else {
            return self.resolve(arg);
        };
        if index >= MAX_ARGUMENTS {
            return Err(format!(
                "argument index {} exceeds the limit of {} arguments",
                index, MAX_ARGUMENTS
            ));
        }

        if let Some(name) = &arg.name {
            if let Some(other) = self.index_of(name).filter(|&i| i != index) {
                return Err(format!(
                    "argument `{}` reuses the name of index {}",
                    name, other
                ));
            }
        }

        if index >= self.slots.len() {
            self.slots.resize(index.saturating_add(1), None);
        }
        let existing = match &mut self.slots[index] {
            slot @ None => {
                *slot = Some(Argument {
                    index,
                    name: arg.name.clone().unwrap_or_else(|| format!("arg{}", index)),
                    ty: arg.ty.unwrap_or_default(),
                    explicit_name: arg.name.is_some(),
                    explicit_type: arg.ty.is_some(),
                });
                return Ok(index);
            }
            Some(existing) => existing,
        };

        if let Some(name) = &arg.name {
            if existing.explicit_name && existing.name != *name {
                return Err(format!(
                    "argument {} is named both `{}` and `{}`",
                    index, existing.name, name
                ));
            }
            existing.name = name.clone();
            existing.explicit_name = true;
        }
        if let Some(ty) = arg.ty {
            if existing.explicit_type && existing.ty != ty {
                return Err(format!(
                    "argument {} is typed both `{}` and `{}`",
                    index, existing.ty, ty
                ));
            }
            existing.ty = ty;
            existing.explicit_type = true;
        }
        Ok(index)
    }

    /// Resolves a placeholder against already declared arguments.
    pub fn resolve(&self, arg: &ArgRef) -> Result<usize, String> {
        let declared = match (arg.index, &arg.name) {
            (Some(index), _) => self
                .slots
                .get(index)
                .and_then(Option::as_ref)
                .ok_or_else(|| {
                    if self.is_empty() {
                        format!("extraneous argument {}", arg)
                    } else {
                        format!(
                            "argument index {} is out of range [0, {})",
                            index,
                            self.slots.len()
                        )
                    }
                })?,
            (None, Some(name)) => self
                .arguments()
                .find(|a| a.name == *name)
                .ok_or_else(|| format!("argument with unknown name `{}`", name))?,
            (None, None) => return Err(format!("malformed argument {}", arg)),
        };

        if let (Some(_), Some(name)) = (arg.index, &arg.name) {
            if declared.name != *name {
                return Err(format!(
                    "argument {} is declared as `{}`, not `{}`",
                    declared.index, declared.name, name
                ));
            }
        }
        if let Some(ty) = arg.ty {
            if declared.ty != ty {
                return Err(format!(
                    "argument `{}` is declared as `{}`, not `{}`",
                    declared.name, declared.ty, ty
                ));
            }
        }
        Ok(declared.index)
    }

    /// Checks that indices are contiguous from zero and names are unique.
    pub fn check_complete(&self) -> Result<(), String> {
        if let Some(missing) = self.slots.iter().position(Option::is_none) {
            return Err(format!("no argument for index {}", missing));
        }
        let mut seen = std::collections::BTreeMap::new();
        for arg in self.arguments() {
            if let Some(first) = seen.insert(arg.name.as_str(), arg.index) {
                return Err(format!(
                    "arguments {} and {} are both named `{}`",
                    first, arg.index, arg.name
                ));
            }
        }
        Ok(())
    }
}
