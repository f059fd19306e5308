//! Generic origin tables.
//!
//! Each generic origin (`list`, `Mapping`, `Callable`, ...) is described by
//! an [`OriginDef`]:
//! - the spellings that denote it (`List`, `typing.List`, `list`)
//! - the shape and per-slot variance of its arguments
//! - its capability set: the origins and classes it can be used as, with a
//!   projection from its own arguments onto the capability's slots
//!
//! The checker is table-driven; adding an origin means adding a row here (or
//! registering one at runtime with [`OriginTable::register`]).

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Variance of a single generic argument slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variance {
    Covariant,
    Contravariant,
    /// Mutable-container slot. Compared by identity only under
    /// `strict_invariance`; covariantly otherwise.
    Invariant,
}

/// How an origin's arguments are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgShape {
    /// A fixed number of slots with the given variances.
    Fixed(Vec<Variance>),
    /// Heterogeneous elements, or a single `Variadic` element.
    Tuple,
    /// `[Params | Variadic(Any), Return]`.
    Callable,
}

/// Where a capability slot takes its argument from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    /// The origin's own argument at this index.
    Arg(usize),
    /// A fixed class, e.g. the `int` value slot of `Counter[T]` as a mapping.
    Class(String),
    /// Every tuple element (or the variadic element) must fit the slot.
    Elements,
}

impl Projection {
    pub fn class(name: &str) -> Self {
        Projection::Class(name.to_string())
    }
}

/// An origin or class a generic origin can stand in for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capability {
    pub target: String,
    pub args: Vec<Projection>,
}

/// Which kind of spelling matched during lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Spelling {
    /// A `typing` alias such as `List` or `Sequence`.
    Typing,
    /// The runtime class spelling such as `list` or `collections.abc.Sequence`.
    Class,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginDef {
    pub name: String,
    pub typing_aliases: Vec<String>,
    pub class_aliases: Vec<String>,
    pub shape: ArgShape,
    pub capabilities: Vec<Capability>,
}

impl OriginDef {
    pub fn fixed(name: &str, variances: &[Variance]) -> Self {
        Self::with_shape(name, ArgShape::Fixed(variances.to_vec()))
    }

    pub fn tuple(name: &str) -> Self {
        Self::with_shape(name, ArgShape::Tuple)
    }

    pub fn callable(name: &str) -> Self {
        Self::with_shape(name, ArgShape::Callable)
    }

    fn with_shape(name: &str, shape: ArgShape) -> Self {
        OriginDef {
            name: name.to_string(),
            typing_aliases: Vec::new(),
            class_aliases: Vec::new(),
            shape,
            capabilities: Vec::new(),
        }
    }

    pub fn typing(mut self, aliases: &[&str]) -> Self {
        self.typing_aliases
            .extend(aliases.iter().map(|alias| alias.to_string()));
        self
    }

    pub fn classes(mut self, aliases: &[&str]) -> Self {
        self.class_aliases
            .extend(aliases.iter().map(|alias| alias.to_string()));
        self
    }

    pub fn satisfies(mut self, target: &str, args: &[Projection]) -> Self {
        self.capabilities.push(Capability {
            target: target.to_string(),
            args: args.to_vec(),
        });
        self
    }

    /// Fixed argument count, or `None` for tuple and callable shapes.
    pub fn arity(&self) -> Option<usize> {
        match &self.shape {
            ArgShape::Fixed(variances) => Some(variances.len()),
            ArgShape::Callable => Some(2),
            ArgShape::Tuple => None,
        }
    }

    pub fn variance(&self, slot: usize) -> Variance {
        match &self.shape {
            ArgShape::Fixed(variances) => variances
                .get(slot)
                .copied()
                .unwrap_or(Variance::Covariant),
            ArgShape::Tuple | ArgShape::Callable => Variance::Covariant,
        }
    }

    pub fn capability(&self, target: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|cap| cap.target == target)
    }
}

/// Registry of generic origins, keyed by canonical name and by spelling.
#[derive(Clone, Debug, Default)]
pub struct OriginTable {
    origins: IndexMap<String, OriginDef>,
    spellings: FxHashMap<String, (String, Spelling)>,
}

impl OriginTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin container, ABC and callable origins.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for def in builtin_origins() {
            table.register(def);
        }
        table
    }

    /// Add or replace an origin.
    pub fn register(&mut self, def: OriginDef) {
        for alias in &def.typing_aliases {
            self.spellings
                .insert(alias.clone(), (def.name.clone(), Spelling::Typing));
        }
        for alias in &def.class_aliases {
            self.spellings
                .insert(alias.clone(), (def.name.clone(), Spelling::Class));
        }
        self.origins.insert(def.name.clone(), def);
    }

    /// Look up by canonical name.
    pub fn get(&self, name: &str) -> Option<&OriginDef> {
        self.origins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.origins.contains_key(name)
    }

    /// Look up by any spelling; `builtins.` and `typing_extensions.`
    /// prefixes are tolerated.
    pub fn lookup(&self, spelling: &str) -> Option<(&OriginDef, Spelling)> {
        let spelling = strip_module_aliases(spelling);
        let (name, kind) = self.spellings.get(spelling.as_ref())?;
        self.origins.get(name).map(|def| (def, *kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OriginDef> {
        self.origins.values()
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

fn strip_module_aliases(name: &str) -> Cow<'_, str> {
    if let Some(rest) = name.strip_prefix("builtins.") {
        return Cow::Borrowed(rest);
    }
    if let Some(rest) = name.strip_prefix("typing_extensions.") {
        return Cow::Owned(format!("typing.{rest}"));
    }
    Cow::Borrowed(name)
}

/// Canonical spelling of a non-generic class name.
///
/// Collapses module-qualified and legacy aliases (`typing.Text` → `str`,
/// `ByteString` → `bytes`, `NoneType` → `None`) so that one class has one
/// identity.
pub fn canonical_class_name(name: &str) -> Cow<'_, str> {
    let name = strip_module_aliases(name);
    let mapped = match name.as_ref() {
        "Text" | "typing.Text" => "str",
        "ByteString" | "typing.ByteString" | "collections.abc.ByteString" => "bytes",
        "NoneType" | "types.NoneType" => "None",
        "typing.TextIO" => "TextIO",
        "typing.BinaryIO" => "BinaryIO",
        "typing.Hashable" | "collections.abc.Hashable" => "Hashable",
        "typing.Sized" | "collections.abc.Sized" => "Sized",
        _ => return name,
    };
    Cow::Borrowed(mapped)
}

/// Capabilities shared by every sized iterable container over argument 0.
fn collection_caps(def: OriginDef) -> OriginDef {
    use Projection::Arg;
    def.satisfies("Collection", &[Arg(0)])
        .satisfies("Iterable", &[Arg(0)])
        .satisfies("Container", &[Arg(0)])
        .satisfies("Sized", &[])
}

fn sequence_caps(def: OriginDef) -> OriginDef {
    use Projection::Arg;
    collection_caps(
        def.satisfies("Sequence", &[Arg(0)])
            .satisfies("Reversible", &[Arg(0)]),
    )
}

fn mutable_sequence_caps(def: OriginDef) -> OriginDef {
    use Projection::Arg;
    sequence_caps(def.satisfies("MutableSequence", &[Arg(0)]))
}

fn mapping_caps(def: OriginDef, key: Projection, value: Projection) -> OriginDef {
    use Projection::Arg;
    let def = def
        .satisfies("MutableMapping", &[key.clone(), value.clone()])
        .satisfies("Mapping", &[key, value]);
    def.satisfies("Collection", &[Arg(0)])
        .satisfies("Iterable", &[Arg(0)])
        .satisfies("Container", &[Arg(0)])
        .satisfies("Sized", &[])
}

fn builtin_origins() -> Vec<OriginDef> {
    use Projection::{Arg, Elements};
    use Variance::{Contravariant as Contra, Covariant as Co, Invariant as Inv};

    vec![
        // Builtin and collections containers.
        mutable_sequence_caps(
            OriginDef::fixed("list", &[Inv])
                .typing(&["List", "typing.List"])
                .classes(&["list"]),
        ),
        OriginDef::tuple("tuple")
            .typing(&["Tuple", "typing.Tuple"])
            .classes(&["tuple"])
            .satisfies("Sequence", &[Elements])
            .satisfies("Reversible", &[Elements])
            .satisfies("Collection", &[Elements])
            .satisfies("Iterable", &[Elements])
            .satisfies("Container", &[Elements])
            .satisfies("Sized", &[])
            .satisfies("Hashable", &[]),
        mapping_caps(
            OriginDef::fixed("dict", &[Inv, Inv])
                .typing(&["Dict", "typing.Dict"])
                .classes(&["dict"]),
            Arg(0),
            Arg(1),
        ),
        collection_caps(
            OriginDef::fixed("set", &[Inv])
                .typing(&["Set", "typing.Set"])
                .classes(&["set"])
                .satisfies("MutableSet", &[Arg(0)])
                .satisfies("AbstractSet", &[Arg(0)]),
        ),
        collection_caps(
            OriginDef::fixed("frozenset", &[Co])
                .typing(&["FrozenSet", "typing.FrozenSet"])
                .classes(&["frozenset"])
                .satisfies("AbstractSet", &[Arg(0)])
                .satisfies("Hashable", &[]),
        ),
        OriginDef::fixed("type", &[Co])
            .typing(&["Type", "typing.Type"])
            .classes(&["type"]),
        mutable_sequence_caps(
            OriginDef::fixed("deque", &[Inv])
                .typing(&["Deque", "typing.Deque"])
                .classes(&["collections.deque", "deque"]),
        ),
        mapping_caps(
            OriginDef::fixed("defaultdict", &[Inv, Inv])
                .typing(&["DefaultDict", "typing.DefaultDict"])
                .classes(&["collections.defaultdict", "defaultdict"])
                .satisfies("dict", &[Arg(0), Arg(1)]),
            Arg(0),
            Arg(1),
        ),
        mapping_caps(
            OriginDef::fixed("OrderedDict", &[Inv, Inv])
                .typing(&["typing.OrderedDict"])
                .classes(&["collections.OrderedDict", "OrderedDict"])
                .satisfies("dict", &[Arg(0), Arg(1)]),
            Arg(0),
            Arg(1),
        ),
        mapping_caps(
            OriginDef::fixed("Counter", &[Inv])
                .typing(&["typing.Counter"])
                .classes(&["collections.Counter", "Counter"])
                .satisfies("dict", &[Arg(0), Projection::class("int")]),
            Arg(0),
            Projection::class("int"),
        ),
        mapping_caps(
            OriginDef::fixed("ChainMap", &[Inv, Inv])
                .typing(&["typing.ChainMap"])
                .classes(&["collections.ChainMap", "ChainMap"]),
            Arg(0),
            Arg(1),
        ),
        // Abstract base classes.
        collection_caps(
            OriginDef::fixed("Sequence", &[Co])
                .typing(&["Sequence", "typing.Sequence"])
                .classes(&["collections.abc.Sequence"])
                .satisfies("Reversible", &[Arg(0)]),
        ),
        sequence_caps(
            OriginDef::fixed("MutableSequence", &[Inv])
                .typing(&["MutableSequence", "typing.MutableSequence"])
                .classes(&["collections.abc.MutableSequence"]),
        ),
        collection_caps(
            OriginDef::fixed("Mapping", &[Inv, Co])
                .typing(&["Mapping", "typing.Mapping"])
                .classes(&["collections.abc.Mapping"]),
        ),
        collection_caps(
            OriginDef::fixed("MutableMapping", &[Inv, Inv])
                .typing(&["MutableMapping", "typing.MutableMapping"])
                .classes(&["collections.abc.MutableMapping"])
                .satisfies("Mapping", &[Arg(0), Arg(1)]),
        ),
        collection_caps(
            OriginDef::fixed("AbstractSet", &[Co])
                .typing(&["AbstractSet", "typing.AbstractSet"])
                .classes(&["collections.abc.Set"]),
        ),
        collection_caps(
            OriginDef::fixed("MutableSet", &[Inv])
                .typing(&["MutableSet", "typing.MutableSet"])
                .classes(&["collections.abc.MutableSet"])
                .satisfies("AbstractSet", &[Arg(0)]),
        ),
        OriginDef::fixed("Collection", &[Co])
            .typing(&["Collection", "typing.Collection"])
            .classes(&["collections.abc.Collection"])
            .satisfies("Iterable", &[Arg(0)])
            .satisfies("Container", &[Arg(0)])
            .satisfies("Sized", &[]),
        OriginDef::fixed("Iterable", &[Co])
            .typing(&["Iterable", "typing.Iterable"])
            .classes(&["collections.abc.Iterable"]),
        OriginDef::fixed("Iterator", &[Co])
            .typing(&["Iterator", "typing.Iterator"])
            .classes(&["collections.abc.Iterator"])
            .satisfies("Iterable", &[Arg(0)]),
        OriginDef::fixed("Reversible", &[Co])
            .typing(&["Reversible", "typing.Reversible"])
            .classes(&["collections.abc.Reversible"])
            .satisfies("Iterable", &[Arg(0)]),
        OriginDef::fixed("Container", &[Co])
            .typing(&["Container", "typing.Container"])
            .classes(&["collections.abc.Container"]),
        OriginDef::fixed("Generator", &[Co, Contra, Co])
            .typing(&["Generator", "typing.Generator"])
            .classes(&["collections.abc.Generator"])
            .satisfies("Iterator", &[Arg(0)])
            .satisfies("Iterable", &[Arg(0)]),
        collection_caps(
            OriginDef::fixed("KeysView", &[Co])
                .typing(&["KeysView", "typing.KeysView"])
                .classes(&["collections.abc.KeysView"])
                .satisfies("AbstractSet", &[Arg(0)]),
        ),
        collection_caps(
            OriginDef::fixed("ValuesView", &[Co])
                .typing(&["ValuesView", "typing.ValuesView"])
                .classes(&["collections.abc.ValuesView"]),
        ),
        OriginDef::fixed("ItemsView", &[Co, Co])
            .typing(&["ItemsView", "typing.ItemsView"])
            .classes(&["collections.abc.ItemsView"])
            .satisfies("Sized", &[]),
        // Async protocols.
        OriginDef::fixed("Awaitable", &[Co])
            .typing(&["Awaitable", "typing.Awaitable"])
            .classes(&["collections.abc.Awaitable"]),
        OriginDef::fixed("Coroutine", &[Co, Contra, Co])
            .typing(&["Coroutine", "typing.Coroutine"])
            .classes(&["collections.abc.Coroutine"])
            .satisfies("Awaitable", &[Arg(2)]),
        OriginDef::fixed("AsyncIterable", &[Co])
            .typing(&["AsyncIterable", "typing.AsyncIterable"])
            .classes(&["collections.abc.AsyncIterable"]),
        OriginDef::fixed("AsyncIterator", &[Co])
            .typing(&["AsyncIterator", "typing.AsyncIterator"])
            .classes(&["collections.abc.AsyncIterator"])
            .satisfies("AsyncIterable", &[Arg(0)]),
        OriginDef::fixed("AsyncGenerator", &[Co, Contra])
            .typing(&["AsyncGenerator", "typing.AsyncGenerator"])
            .classes(&["collections.abc.AsyncGenerator"])
            .satisfies("AsyncIterator", &[Arg(0)])
            .satisfies("AsyncIterable", &[Arg(0)]),
        // Streams and context managers.
        OriginDef::fixed("IO", &[Inv])
            .typing(&["IO", "typing.IO"])
            .satisfies("Iterator", &[Arg(0)])
            .satisfies("Iterable", &[Arg(0)]),
        OriginDef::fixed("ContextManager", &[Co])
            .typing(&["ContextManager", "typing.ContextManager"])
            .classes(&["contextlib.AbstractContextManager"]),
        OriginDef::callable("Callable")
            .typing(&["Callable", "typing.Callable"])
            .classes(&["collections.abc.Callable"]),
    ]
}

#[cfg(test)]
#[path = "../tests/origins_tests.rs"]
mod tests;
