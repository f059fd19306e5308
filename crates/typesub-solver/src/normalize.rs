//! Type normalization.
//!
//! Turns a host [`TypeExpr`] into a canonical interned node:
//! - origin spellings collapse to one origin (`List`, `typing.List` and
//!   `list` are all `list`)
//! - qualifier wrappers (`Final`, `ClassVar`, `Annotated`) unwrap
//! - `Literal[...]` becomes the union of its values' classes
//! - `Optional[T]` becomes `T | None`
//! - names the engine does not know become forward references
//! - unsupported subscripts keep their textual identity as a `Plain` node
//!
//! Only malformed input is an error.

use crate::error::TypeExprError;
use crate::expr::TypeExpr;
use crate::inheritance::NominalHierarchy;
use crate::intern::TypeInterner;
use crate::origins::{ArgShape, OriginDef, OriginTable, Spelling, canonical_class_name};
use crate::parse::parse_type_expr;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeData, TypeId};
use tracing::trace;

/// `typing` special forms that are not generic origins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpecialForm {
    Any,
    Union,
    Optional,
    Literal,
    Final,
    ClassVar,
    Annotated,
    Generic,
}

impl SpecialForm {
    fn from_name(name: &str) -> Option<Self> {
        let bare = name
            .strip_prefix("typing.")
            .or_else(|| name.strip_prefix("typing_extensions."))
            .unwrap_or(name);
        Some(match bare {
            "Any" => SpecialForm::Any,
            "Union" => SpecialForm::Union,
            "Optional" => SpecialForm::Optional,
            "Literal" => SpecialForm::Literal,
            "Final" => SpecialForm::Final,
            "ClassVar" => SpecialForm::ClassVar,
            "Annotated" => SpecialForm::Annotated,
            "Generic" => SpecialForm::Generic,
            _ => return None,
        })
    }

    /// The name `get_origin` reports for a subscripted form.
    fn origin_name(self) -> Option<&'static str> {
        match self {
            SpecialForm::Any => None,
            SpecialForm::Union | SpecialForm::Optional => Some("Union"),
            SpecialForm::Literal => Some("Literal"),
            SpecialForm::Final => Some("Final"),
            SpecialForm::ClassVar => Some("ClassVar"),
            SpecialForm::Annotated => Some("Annotated"),
            SpecialForm::Generic => Some("Generic"),
        }
    }
}

/// Normalizes host expressions into interned [`TypeId`]s.
///
/// Stateless apart from the shared interner; every call gets a fresh depth
/// counter.
pub struct Normalizer<'a> {
    interner: &'a TypeInterner,
    origins: &'a OriginTable,
    hierarchy: &'a dyn NominalHierarchy,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        interner: &'a TypeInterner,
        origins: &'a OriginTable,
        hierarchy: &'a dyn NominalHierarchy,
    ) -> Self {
        Normalizer {
            interner,
            origins,
            hierarchy,
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn origins(&self) -> &'a OriginTable {
        self.origins
    }

    pub fn hierarchy(&self) -> &'a dyn NominalHierarchy {
        self.hierarchy
    }

    /// Normalize `expr` into its canonical node.
    pub fn normalize(&self, expr: &TypeExpr) -> Result<TypeId, TypeExprError> {
        let mut depth = DepthCounter::with_profile(RecursionProfile::Normalization);
        let id = self.normalize_expr(expr, &mut depth)?;
        trace!(expr = %expr, type_id = id.0, "normalized");
        Ok(id)
    }

    /// The unsubscripted origin of `expr`, by canonical name.
    ///
    /// Runtime class spellings without arguments (`list`) have no origin;
    /// their typing aliases (`List`) do. Unions report `Union`, qualifiers
    /// report themselves.
    pub fn get_origin(&self, expr: &TypeExpr) -> Option<String> {
        match expr {
            TypeExpr::Or(..) => Some("Union".to_string()),
            TypeExpr::Name(name) => {
                if SpecialForm::from_name(name) == Some(SpecialForm::Generic) {
                    return Some("Generic".to_string());
                }
                match self.origins.lookup(name) {
                    Some((def, Spelling::Typing)) => Some(def.name.clone()),
                    _ => None,
                }
            }
            TypeExpr::Subscript { base, .. } => {
                let name = base.as_name()?;
                if let Some(form) = SpecialForm::from_name(name) {
                    return form.origin_name().map(str::to_string);
                }
                self.origins.lookup(name).map(|(def, _)| def.name.clone())
            }
            _ => None,
        }
    }

    /// Arguments of the normalized form of `expr`: generic arguments, union
    /// members, or nothing.
    ///
    /// Qualifier wrappers answer from their own subscript before they
    /// collapse: `Final[int]` gives `[int]`, `Literal[1, "a"]` gives the
    /// value classes `[int, str]`.
    pub fn get_args(&self, expr: &TypeExpr) -> Result<Vec<TypeId>, TypeExprError> {
        if let TypeExpr::Subscript { base, args } = expr {
            match base.as_name().and_then(SpecialForm::from_name) {
                Some(SpecialForm::Final | SpecialForm::ClassVar | SpecialForm::Annotated) => {
                    return Ok(vec![self.normalize(expr)?]);
                }
                Some(SpecialForm::Literal) => {
                    let mut depth = DepthCounter::with_profile(RecursionProfile::Normalization);
                    return args
                        .iter()
                        .map(|arg| self.literal_class(arg, &mut depth))
                        .collect();
                }
                _ => {}
            }
        }

        let id = self.normalize(expr)?;
        Ok(match self.interner.lookup(id) {
            Some(TypeData::Generic { args, .. }) => self.interner.type_list(args).to_vec(),
            Some(TypeData::Union(members)) => self.interner.type_list(members).to_vec(),
            _ => Vec::new(),
        })
    }

    fn normalize_expr(
        &self,
        expr: &TypeExpr,
        depth: &mut DepthCounter,
    ) -> Result<TypeId, TypeExprError> {
        if !depth.enter() {
            return Err(TypeExprError::TooDeep(depth.max_depth()));
        }
        let result = self.normalize_inner(expr, depth);
        depth.leave();
        result
    }

    fn normalize_inner(
        &self,
        expr: &TypeExpr,
        depth: &mut DepthCounter,
    ) -> Result<TypeId, TypeExprError> {
        match expr {
            TypeExpr::Any => Ok(TypeId::ANY),
            TypeExpr::None => Ok(self.interner.plain("None")),
            TypeExpr::Name(name) => Ok(self.normalize_name(name)),
            TypeExpr::Str(text) => match parse_type_expr(text) {
                Ok(TypeExpr::Name(name)) => Ok(self.normalize_name(&name)),
                Ok(parsed) => self.normalize_expr(&parsed, depth),
                Err(_) => Ok(self.interner.forward_ref(text)),
            },
            TypeExpr::Int(_) | TypeExpr::Bool(_) | TypeExpr::Bytes(_) => {
                Err(TypeExprError::NotAType(expr.to_string()))
            }
            TypeExpr::Ellipsis => Err(TypeExprError::MisplacedEllipsis),
            TypeExpr::EmptyTuple | TypeExpr::List(_) => {
                Err(TypeExprError::NotAType(expr.to_string()))
            }
            TypeExpr::Or(left, right) => {
                let left = self.normalize_expr(left, depth)?;
                let right = self.normalize_expr(right, depth)?;
                Ok(self.interner.union2(left, right))
            }
            TypeExpr::TypeVar { name, bound } => {
                if name.is_empty() {
                    return Err(TypeExprError::InvalidTypeVar(
                        "a type variable needs a name".to_string(),
                    ));
                }
                let bound = match bound {
                    Some(bound) => Some(self.normalize_expr(bound, depth)?),
                    None => None,
                };
                Ok(self.interner.type_var(name, bound))
            }
            TypeExpr::Opaque(text) => Ok(self.interner.plain(text)),
            TypeExpr::Subscript { base, args } => self.normalize_subscript(expr, base, args, depth),
        }
    }

    fn normalize_name(&self, name: &str) -> TypeId {
        match SpecialForm::from_name(name) {
            Some(SpecialForm::Any) => return TypeId::ANY,
            Some(SpecialForm::Union) => return self.interner.plain("Union"),
            Some(SpecialForm::Optional) => return self.interner.plain("Optional"),
            // A bare qualifier says nothing about the value's type.
            Some(SpecialForm::Literal | SpecialForm::Final | SpecialForm::ClassVar) => {
                return TypeId::ANY;
            }
            Some(SpecialForm::Annotated | SpecialForm::Generic) | None => {}
        }

        if let Some((def, _)) = self.origins.lookup(name) {
            return self.interner.unparameterized(&def.name);
        }

        let canonical = canonical_class_name(name);
        if self.hierarchy.is_known(&canonical) {
            return self.interner.plain(&canonical);
        }
        self.interner.forward_ref(name)
    }

    fn normalize_subscript(
        &self,
        expr: &TypeExpr,
        base: &TypeExpr,
        args: &[TypeExpr],
        depth: &mut DepthCounter,
    ) -> Result<TypeId, TypeExprError> {
        let Some(name) = base.as_name() else {
            return Ok(self.interner.plain(&expr.to_string()));
        };

        if let Some(form) = SpecialForm::from_name(name) {
            return match form {
                SpecialForm::Union => {
                    let members = args
                        .iter()
                        .map(|arg| self.normalize_expr(arg, depth))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(self.interner.union(members))
                }
                SpecialForm::Optional => {
                    let [arg] = args else {
                        return Err(arg_count("Optional", 1, args.len()));
                    };
                    let inner = self.normalize_expr(arg, depth)?;
                    Ok(self.interner.union2(inner, self.interner.plain("None")))
                }
                SpecialForm::Literal => {
                    let members = args
                        .iter()
                        .map(|arg| self.literal_class(arg, depth))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(self.interner.union(members))
                }
                SpecialForm::Final | SpecialForm::ClassVar => {
                    let [arg] = args else {
                        let name = if form == SpecialForm::Final {
                            "Final"
                        } else {
                            "ClassVar"
                        };
                        return Err(arg_count(name, 1, args.len()));
                    };
                    self.normalize_expr(arg, depth)
                }
                SpecialForm::Annotated => match args.first() {
                    Some(inner) => self.normalize_expr(inner, depth),
                    None => Err(arg_count("Annotated", 2, 0)),
                },
                SpecialForm::Any | SpecialForm::Generic => {
                    Ok(self.interner.plain(&expr.to_string()))
                }
            };
        }

        match self.origins.lookup(name) {
            Some((def, _)) => self.normalize_generic(def, args, depth),
            None => Ok(self.interner.plain(&expr.to_string())),
        }
    }

    fn normalize_generic(
        &self,
        def: &OriginDef,
        args: &[TypeExpr],
        depth: &mut DepthCounter,
    ) -> Result<TypeId, TypeExprError> {
        let normalized = match &def.shape {
            ArgShape::Fixed(variances) => {
                if args.len() != variances.len() {
                    return Err(arg_count(&def.name, variances.len(), args.len()));
                }
                args.iter()
                    .map(|arg| self.normalize_expr(arg, depth))
                    .collect::<Result<Vec<_>, _>>()?
            }
            ArgShape::Tuple => self.tuple_args(args, depth)?,
            ArgShape::Callable => self.callable_args(args, depth)?,
        };
        Ok(self.interner.generic(&def.name, normalized))
    }

    fn tuple_args(
        &self,
        args: &[TypeExpr],
        depth: &mut DepthCounter,
    ) -> Result<Vec<TypeId>, TypeExprError> {
        match args {
            [TypeExpr::EmptyTuple] => Ok(Vec::new()),
            [element, TypeExpr::Ellipsis] => {
                let element = self.normalize_expr(element, depth)?;
                Ok(vec![self.interner.variadic(element)])
            }
            _ => args
                .iter()
                .map(|arg| self.normalize_expr(arg, depth))
                .collect(),
        }
    }

    fn callable_args(
        &self,
        args: &[TypeExpr],
        depth: &mut DepthCounter,
    ) -> Result<Vec<TypeId>, TypeExprError> {
        let [params, ret] = args else {
            return Err(TypeExprError::InvalidCallable(format!(
                "expected Callable[[arg, ...], result], got {} argument(s)",
                args.len()
            )));
        };
        let params = match params {
            TypeExpr::Ellipsis => self.interner.variadic(TypeId::ANY),
            TypeExpr::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.normalize_expr(item, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                self.interner.params(items)
            }
            other => {
                return Err(TypeExprError::InvalidCallable(format!(
                    "parameters must be a list or `...`, got `{other}`"
                )));
            }
        };
        let ret = self.normalize_expr(ret, depth)?;
        Ok(vec![params, ret])
    }

    /// The class of one `Literal[...]` value.
    fn literal_class(
        &self,
        value: &TypeExpr,
        depth: &mut DepthCounter,
    ) -> Result<TypeId, TypeExprError> {
        match value {
            TypeExpr::Int(_) => Ok(self.interner.plain("int")),
            TypeExpr::Bool(_) => Ok(self.interner.plain("bool")),
            TypeExpr::Str(_) => Ok(self.interner.plain("str")),
            TypeExpr::Bytes(_) => Ok(self.interner.plain("bytes")),
            TypeExpr::None => Ok(self.interner.plain("None")),
            // Literal[Literal[1, 2], 3]
            TypeExpr::Subscript { base, .. }
                if base.as_name().and_then(SpecialForm::from_name)
                    == Some(SpecialForm::Literal) =>
            {
                self.normalize_expr(value, depth)
            }
            // Enum members: Literal[Color.RED] is a Color.
            TypeExpr::Name(name) => match name.rsplit_once('.') {
                Some((class, _)) => Ok(self.normalize_name(class)),
                None => Err(TypeExprError::NotAType(format!("Literal[{name}]"))),
            },
            other => Err(TypeExprError::NotAType(format!("Literal[{other}]"))),
        }
    }
}

fn arg_count(origin: &str, expected: usize, found: usize) -> TypeExprError {
    TypeExprError::ArgumentCount {
        origin: origin.to_string(),
        expected,
        found,
    }
}

#[cfg(test)]
#[path = "../tests/normalize_tests.rs"]
mod tests;
