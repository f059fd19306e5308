//! Forward-reference resolution.
//!
//! A [`ForwardRefEnv`] maps names to raw definitions. The
//! [`ForwardRefResolver`] substitutes those definitions into a normalized
//! node, normalizing each definition lazily the first time it is needed.
//!
//! Self-reference is handled in two ways:
//! - a back-reference reached without passing through a generic argument
//!   (`X = Union[int, X]`, `A = B; B = A`) is a degenerate alias and is
//!   replaced by `Any`
//! - a back-reference guarded by a generic argument
//!   (`JSON = Union[int, Sequence[JSON]]`) is a recursive type; it stays a
//!   `ForwardRef` whose definition is known, and the subtype checker unfolds
//!   it on demand through [`ForwardRefResolver::expand`]
//!
//! Resolver state lives for one top-level decision.

use crate::error::TypeExprError;
use crate::expr::TypeExpr;
use crate::normalize::Normalizer;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeData, TypeId, TypeParamInfo};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};
use typesub_common::Atom;
use typesub_common::limits::MAX_FORWARD_REF_EXPANSIONS;

/// Forward-reference environment: name to raw definition.
///
/// Ordered so that [`fingerprint`](Self::fingerprint) is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardRefEnv {
    definitions: BTreeMap<String, TypeExpr>,
}

impl ForwardRefEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: TypeExpr) -> Option<TypeExpr> {
        self.definitions.insert(name.into(), definition)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, definition: TypeExpr) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeExpr> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeExpr)> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    /// Content hash, used to key shared caches. `0` for the empty
    /// environment.
    pub fn fingerprint(&self) -> u64 {
        if self.definitions.is_empty() {
            return 0;
        }
        let mut hasher = FxHasher::default();
        self.definitions.hash(&mut hasher);
        hasher.finish()
    }
}

impl<N: Into<String>> FromIterator<(N, TypeExpr)> for ForwardRefEnv {
    fn from_iter<I: IntoIterator<Item = (N, TypeExpr)>>(iter: I) -> Self {
        ForwardRefEnv {
            definitions: iter
                .into_iter()
                .map(|(name, definition)| (name.into(), definition))
                .collect(),
        }
    }
}

/// Substitutes environment definitions for `ForwardRef` nodes.
pub struct ForwardRefResolver<'a> {
    normalizer: &'a Normalizer<'a>,
    env: &'a ForwardRefEnv,
    /// Lazily normalized definitions.
    definitions: FxHashMap<Atom, Option<TypeId>>,
    /// Context-free expansions (started with nothing else in progress).
    expansions: FxHashMap<Atom, TypeId>,
    /// Names whose definitions are being substituted.
    expanding: FxHashSet<Atom>,
    /// The subset of `expanding` reachable without crossing a generic
    /// argument.
    unguarded: FxHashSet<Atom>,
    expansion_count: u32,
    depth: DepthCounter,
    /// Set once a walk stops at the depth limit; sticky.
    exceeded: bool,
}

impl<'a> ForwardRefResolver<'a> {
    pub fn new(normalizer: &'a Normalizer<'a>, env: &'a ForwardRefEnv) -> Self {
        ForwardRefResolver {
            normalizer,
            env,
            definitions: FxHashMap::default(),
            expansions: FxHashMap::default(),
            expanding: FxHashSet::default(),
            unguarded: FxHashSet::default(),
            expansion_count: 0,
            depth: DepthCounter::with_profile(RecursionProfile::Normalization),
            exceeded: false,
        }
    }

    pub fn env(&self) -> &'a ForwardRefEnv {
        self.env
    }

    /// Whether any walk stopped at the depth limit. The node it stopped at
    /// is left unresolved.
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Resolve every `ForwardRef` in `id` that the environment defines.
    ///
    /// A definition chain deeper than the normalization depth limit is left
    /// unresolved past the limit and [`is_exceeded`](Self::is_exceeded)
    /// reports it.
    pub fn resolve(&mut self, id: TypeId) -> Result<TypeId, TypeExprError> {
        if self.env.is_empty() {
            return Ok(id);
        }
        self.walk(id)
    }

    /// The resolved definition of `name`, or `None` if the environment does
    /// not define it.
    ///
    /// Guarded self-references inside the result stay `ForwardRef(name)`.
    pub fn expand(&mut self, name: Atom) -> Result<Option<TypeId>, TypeExprError> {
        if !self.env.contains(&self.normalizer.interner().resolve_atom_ref(name)) {
            return Ok(None);
        }
        let id = self.normalizer.interner().intern(TypeData::ForwardRef(name));
        let expanded = self.walk_ref(id, name)?;
        Ok((expanded != id).then_some(expanded))
    }

    fn walk(&mut self, id: TypeId) -> Result<TypeId, TypeExprError> {
        if !self.depth.enter() {
            if !self.exceeded {
                debug!(
                    limit = self.depth.max_depth(),
                    "forward-reference resolution depth limit reached"
                );
            }
            self.exceeded = true;
            return Ok(id);
        }
        let result = self.walk_inner(id);
        self.depth.leave();
        result
    }

    fn walk_inner(&mut self, id: TypeId) -> Result<TypeId, TypeExprError> {
        let interner = self.normalizer.interner();
        let Some(data) = interner.lookup(id) else {
            return Ok(id);
        };

        match data {
            TypeData::Any | TypeData::Plain(_) | TypeData::Unparameterized(_) => Ok(id),
            TypeData::ForwardRef(name) => self.walk_ref(id, name),
            TypeData::Union(members) => {
                let members = interner.type_list(members);
                let mut resolved = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    resolved.push(self.walk(member)?);
                }
                Ok(interner.union(resolved))
            }
            TypeData::Generic { origin, args } => {
                let args = self.walk_guarded_list(&interner.type_list(args))?;
                Ok(interner.generic_atom(origin, &args))
            }
            TypeData::Params(params) => {
                let params = self.walk_guarded_list(&interner.type_list(params))?;
                Ok(interner.params(params))
            }
            TypeData::Variadic(element) => {
                let element = self.guarded(|this| this.walk(element))?;
                Ok(interner.variadic(element))
            }
            TypeData::TypeVar(TypeParamInfo { name, bound }) => {
                let bound = match bound {
                    Some(bound) => Some(self.guarded(|this| this.walk(bound))?),
                    None => None,
                };
                Ok(interner.intern(TypeData::TypeVar(TypeParamInfo { name, bound })))
            }
        }
    }

    fn walk_guarded_list(&mut self, items: &[TypeId]) -> Result<Vec<TypeId>, TypeExprError> {
        self.guarded(|this| items.iter().map(|&item| this.walk(item)).collect())
    }

    /// Run `f` below a generic argument position.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.unguarded);
        let result = f(self);
        self.unguarded = saved;
        result
    }

    fn walk_ref(&mut self, id: TypeId, name: Atom) -> Result<TypeId, TypeExprError> {
        if self.unguarded.contains(&name) {
            debug!(
                name = %self.normalizer.interner().resolve_atom_ref(name),
                "unguarded self-reference resolves to Any"
            );
            return Ok(TypeId::ANY);
        }
        if self.expanding.contains(&name) {
            trace!(
                name = %self.normalizer.interner().resolve_atom_ref(name),
                "deferring guarded self-reference"
            );
            return Ok(id);
        }

        let context_free = self.expanding.is_empty();
        if context_free {
            if let Some(&expanded) = self.expansions.get(&name) {
                return Ok(expanded);
            }
        }

        let Some(definition) = self.definition(name)? else {
            return Ok(id);
        };

        if self.expansion_count >= MAX_FORWARD_REF_EXPANSIONS {
            debug!(
                name = %self.normalizer.interner().resolve_atom_ref(name),
                limit = MAX_FORWARD_REF_EXPANSIONS,
                "forward-reference expansion budget exhausted"
            );
            return Ok(id);
        }
        self.expansion_count += 1;

        self.expanding.insert(name);
        self.unguarded.insert(name);
        let result = self.walk(definition);
        self.unguarded.remove(&name);
        self.expanding.remove(&name);

        let expanded = result?;
        if context_free {
            self.expansions.insert(name, expanded);
        }
        Ok(expanded)
    }

    /// The normalized (unresolved) definition of `name`.
    fn definition(&mut self, name: Atom) -> Result<Option<TypeId>, TypeExprError> {
        if let Some(&cached) = self.definitions.get(&name) {
            return Ok(cached);
        }
        let key = self.normalizer.interner().resolve_atom_ref(name);
        let normalized = match self.env.get(&key) {
            Some(definition) => Some(self.normalizer.normalize(definition)?),
            None => None,
        };
        self.definitions.insert(name, normalized);
        Ok(normalized)
    }
}

#[cfg(test)]
#[path = "../tests/resolve_tests.rs"]
mod tests;
