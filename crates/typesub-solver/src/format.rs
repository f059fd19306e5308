//! Rendering canonical nodes back to host expressions.

use crate::expr::TypeExpr;
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};

/// Renders interned nodes as [`TypeExpr`] values or annotation text.
///
/// The rendering is canonical: normalizing the rendered expression yields
/// the original node again.
pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter { interner }
    }

    /// Render a node as annotation text.
    pub fn format(&self, id: TypeId) -> String {
        self.to_expr(id).to_string()
    }

    /// Render a node back to a host expression.
    pub fn to_expr(&self, id: TypeId) -> TypeExpr {
        let Some(data) = self.interner.lookup(id) else {
            return TypeExpr::Opaque(format!("<unknown type {}>", id.0));
        };

        match data {
            TypeData::Any => TypeExpr::Any,
            TypeData::Plain(name) => {
                let name = self.interner.resolve_atom(name);
                if name == "None" {
                    TypeExpr::None
                } else if is_dotted_identifier(&name) {
                    TypeExpr::Name(name)
                } else {
                    TypeExpr::Opaque(name)
                }
            }
            TypeData::Unparameterized(origin) => {
                TypeExpr::Name(self.interner.resolve_atom(origin))
            }
            TypeData::Generic { origin, args } => {
                let origin = self.interner.resolve_atom(origin);
                let args = self.interner.type_list(args);
                let rendered = match origin.as_str() {
                    "tuple" => self.tuple_args(&args),
                    "Callable" => self.callable_args(&args),
                    _ => args.iter().map(|&arg| self.to_expr(arg)).collect(),
                };
                TypeExpr::subscript(origin, rendered)
            }
            TypeData::Union(members) => {
                let members = self.interner.type_list(members);
                TypeExpr::union_of(members.iter().map(|&member| self.to_expr(member)))
                    .unwrap_or(TypeExpr::Any)
            }
            TypeData::ForwardRef(name) => TypeExpr::Str(self.interner.resolve_atom(name)),
            TypeData::Params(params) => TypeExpr::List(
                self.interner
                    .type_list(params)
                    .iter()
                    .map(|&param| self.to_expr(param))
                    .collect(),
            ),
            TypeData::Variadic(element) => {
                TypeExpr::Opaque(format!("*{}", self.to_expr(element)))
            }
            TypeData::TypeVar(info) => TypeExpr::TypeVar {
                name: self.interner.resolve_atom(info.name),
                bound: info.bound.map(|bound| Box::new(self.to_expr(bound))),
            },
        }
    }

    fn tuple_args(&self, args: &[TypeId]) -> Vec<TypeExpr> {
        if args.is_empty() {
            return vec![TypeExpr::EmptyTuple];
        }
        if let [single] = args {
            if let Some(TypeData::Variadic(element)) = self.interner.lookup(*single) {
                return vec![self.to_expr(element), TypeExpr::Ellipsis];
            }
        }
        args.iter().map(|&arg| self.to_expr(arg)).collect()
    }

    fn callable_args(&self, args: &[TypeId]) -> Vec<TypeExpr> {
        args.iter()
            .enumerate()
            .map(|(i, &arg)| match self.interner.lookup(arg) {
                Some(TypeData::Variadic(_)) if i == 0 => TypeExpr::Ellipsis,
                _ => self.to_expr(arg),
            })
            .collect()
    }
}

fn is_dotted_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
