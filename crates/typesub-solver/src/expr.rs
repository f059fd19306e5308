//! Host-side type expressions.
//!
//! `TypeExpr` models annotation values the way a Python host hands them over:
//! names, subscripted generics, string forward references, literal values and
//! callable parameter lists. It is the input to the normalizer and the output
//! of [`TypeFormatter::to_expr`](crate::TypeFormatter::to_expr).
//!
//! Expressions parse from annotation source text with [`str::parse`] and
//! render back to the same syntax through `Display`.

use std::fmt;

/// A raw, un-normalized type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeExpr {
    /// `typing.Any` given as a value rather than a name.
    Any,
    /// The `None` singleton.
    None,
    /// The `...` singleton.
    Ellipsis,
    /// A possibly dotted name: `int`, `List`, `collections.abc.Sequence`.
    Name(String),
    /// A string forward reference: `'Node'`, `"List[int]"`.
    Str(String),
    Int(i64),
    Bool(bool),
    Bytes(String),
    /// `()`, as in `Tuple[()]`.
    EmptyTuple,
    /// `[a, b]`, the parameter list of a `Callable`.
    List(Vec<TypeExpr>),
    Subscript {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// PEP 604 union, `X | Y`.
    Or(Box<TypeExpr>, Box<TypeExpr>),
    TypeVar {
        name: String,
        bound: Option<Box<TypeExpr>>,
    },
    /// Textual identity of a host construct with no structured form.
    Opaque(String),
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    pub fn forward_ref(name: impl Into<String>) -> Self {
        TypeExpr::Str(name.into())
    }

    pub fn subscript(base: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Subscript {
            base: Box::new(TypeExpr::Name(base.into())),
            args,
        }
    }

    pub fn type_var(name: impl Into<String>, bound: Option<TypeExpr>) -> Self {
        TypeExpr::TypeVar {
            name: name.into(),
            bound: bound.map(Box::new),
        }
    }

    /// Left-nested `a | b | c`. Returns `None` for an empty iterator.
    pub fn union_of(members: impl IntoIterator<Item = TypeExpr>) -> Option<Self> {
        members
            .into_iter()
            .reduce(|acc, next| TypeExpr::Or(Box::new(acc), Box::new(next)))
    }

    /// The dotted name if this is a plain `Name`.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Name(name) => Some(name),
            _ => None,
        }
    }

    /// `true` for expressions that denote values rather than types.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            TypeExpr::Int(_) | TypeExpr::Bool(_) | TypeExpr::Bytes(_)
        )
    }
}

impl From<&str> for TypeExpr {
    fn from(name: &str) -> Self {
        TypeExpr::Name(name.to_string())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, prefix: &str, text: &str) -> fmt::Result {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{prefix}{quote}")?;
    for ch in text.chars() {
        if ch == quote || ch == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{ch}")?;
    }
    write!(f, "{quote}")
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => write!(f, "Any"),
            TypeExpr::None => write!(f, "None"),
            TypeExpr::Ellipsis => write!(f, "..."),
            TypeExpr::Name(name) => write!(f, "{name}"),
            TypeExpr::Str(text) => write_quoted(f, "", text),
            TypeExpr::Int(value) => write!(f, "{value}"),
            TypeExpr::Bool(true) => write!(f, "True"),
            TypeExpr::Bool(false) => write!(f, "False"),
            TypeExpr::Bytes(text) => write_quoted(f, "b", text),
            TypeExpr::EmptyTuple => write!(f, "()"),
            TypeExpr::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            TypeExpr::Subscript { base, args } => {
                write!(f, "{base}[")?;
                write_joined(f, args)?;
                write!(f, "]")
            }
            TypeExpr::Or(left, right) => write!(f, "{left} | {right}"),
            TypeExpr::TypeVar { name, bound: None } => write!(f, "~{name}"),
            TypeExpr::TypeVar {
                name,
                bound: Some(bound),
            } => {
                write!(f, "TypeVar(")?;
                write_quoted(f, "", name)?;
                write!(f, ", bound={bound})")
            }
            TypeExpr::Opaque(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod tests;
