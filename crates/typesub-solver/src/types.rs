//! Canonical type node representation.
//!
//! Every normalized type is a `TypeData` value interned in the
//! [`TypeInterner`](crate::TypeInterner) and referenced by a `TypeId`.
//! Structurally equal nodes share a `TypeId`, so id equality is structural
//! equality.

use serde::Serialize;
use typesub_common::Atom;

/// Handle to an interned type node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The universal top type.
    pub const ANY: TypeId = TypeId(0);

    /// First id handed out for interned (non-builtin) nodes.
    pub const FIRST_USER: u32 = 1;

    #[inline]
    pub fn is_any(self) -> bool {
        self == Self::ANY
    }
}

/// Handle to an interned, ordered list of `TypeId`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeListId(pub u32);

impl TypeListId {
    pub const EMPTY: TypeListId = TypeListId(0);
}

/// A type variable, optionally bounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
}

/// A canonical type node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Universal top type.
    Any,
    /// A non-generic class identity (`int`, `None`, `io.StringIO`), or the
    /// textual identity of a construct the normalizer does not model.
    Plain(Atom),
    /// A generic origin without arguments; every slot compares as `Any`.
    Unparameterized(Atom),
    /// A generic origin with its ordered argument nodes.
    Generic { origin: Atom, args: TypeListId },
    /// Flattened, deduplicated, canonically ordered members.
    Union(TypeListId),
    /// A name that has not been (or cannot be) resolved.
    ForwardRef(Atom),
    /// Fixed positional parameter list of a callable.
    Params(TypeListId),
    /// Zero or more of the element type.
    Variadic(TypeId),
    /// A type variable.
    TypeVar(TypeParamInfo),
}

impl TypeData {
    /// Short variant name, used in trace output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeData::Any => "Any",
            TypeData::Plain(_) => "Plain",
            TypeData::Unparameterized(_) => "Unparameterized",
            TypeData::Generic { .. } => "Generic",
            TypeData::Union(_) => "Union",
            TypeData::ForwardRef(_) => "ForwardRef",
            TypeData::Params(_) => "Params",
            TypeData::Variadic(_) => "Variadic",
            TypeData::TypeVar(_) => "TypeVar",
        }
    }
}
