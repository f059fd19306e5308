//! Three-valued subtype checking.
//!
//! `SubtypeChecker::check(left, right)` answers whether every value of
//! `left` is a value of `right`:
//! - `True` when it can prove it
//! - `False` when it can refute it
//! - `Unknown` when the answer depends on something it cannot see
//!   (`Any` on the left, an unresolved forward reference, an unknown class,
//!   an unbounded type variable)
//!
//! Recursive types are handled coinductively: a `(left, right)` pair that is
//! already being checked is assumed to hold.
//!
//! The per-shape rules live in `subtype_rules`.

use crate::caches::{RelationCache, RelationCacheKey};
use crate::error::TypeExprError;
use crate::inheritance::NominalHierarchy;
use crate::intern::TypeInterner;
use crate::normalize::Normalizer;
use crate::origins::OriginTable;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::relation_queries::{RelationFlags, SubtypePolicy};
use crate::resolve::{ForwardRefEnv, ForwardRefResolver};
use crate::types::{TypeData, TypeId};
use serde::Serialize;
use tracing::{debug, trace};
use typesub_common::Atom;

/// Outcome of a subtype check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubtypeResult {
    True,
    False,
    Unknown,
}

impl SubtypeResult {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            SubtypeResult::True
        } else {
            SubtypeResult::False
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == SubtypeResult::True
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == SubtypeResult::False
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == SubtypeResult::Unknown
    }

    /// Conjunction: `False` dominates, then `Unknown`.
    #[inline]
    pub fn and(self, other: SubtypeResult) -> SubtypeResult {
        match (self, other) {
            (SubtypeResult::False, _) | (_, SubtypeResult::False) => SubtypeResult::False,
            (SubtypeResult::Unknown, _) | (_, SubtypeResult::Unknown) => SubtypeResult::Unknown,
            _ => SubtypeResult::True,
        }
    }

    /// Disjunction: `True` dominates, then `Unknown`.
    #[inline]
    pub fn or(self, other: SubtypeResult) -> SubtypeResult {
        match (self, other) {
            (SubtypeResult::True, _) | (_, SubtypeResult::True) => SubtypeResult::True,
            (SubtypeResult::Unknown, _) | (_, SubtypeResult::Unknown) => SubtypeResult::Unknown,
            _ => SubtypeResult::False,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubtypeResult::True => "true",
            SubtypeResult::False => "false",
            SubtypeResult::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SubtypeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides the subtype relation for one forward-reference environment.
///
/// A checker owns the per-decision state (the resolver's expansion memo,
/// the coinductive pair guard) and is meant to be dropped after the
/// top-level question is answered. Verdicts that did not depend on an
/// in-progress assumption are published to the shared [`RelationCache`].
pub struct SubtypeChecker<'a> {
    pub(crate) interner: &'a TypeInterner,
    pub(crate) origins: &'a OriginTable,
    pub(crate) hierarchy: &'a dyn NominalHierarchy,
    pub(crate) policy: SubtypePolicy,
    resolver: ForwardRefResolver<'a>,
    guard: RecursionGuard<(TypeId, TypeId)>,
    cache: Option<&'a RelationCache>,
    cache_generation: u64,
    env_fingerprint: u64,
    flags: RelationFlags,
    assumptions: u32,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(
        normalizer: &'a Normalizer<'a>,
        env: &'a ForwardRefEnv,
        policy: SubtypePolicy,
    ) -> Self {
        SubtypeChecker {
            interner: normalizer.interner(),
            origins: normalizer.origins(),
            hierarchy: normalizer.hierarchy(),
            policy,
            resolver: ForwardRefResolver::new(normalizer, env),
            guard: RecursionGuard::with_profile(policy.recursion_profile()),
            cache: None,
            cache_generation: 0,
            env_fingerprint: env.fingerprint(),
            flags: policy.flags(),
            assumptions: 0,
        }
    }

    /// Share verdicts through `cache`.
    pub fn with_cache(mut self, cache: &'a RelationCache) -> Self {
        self.cache = Some(cache);
        self.cache_generation = cache.generation();
        self
    }

    /// Substitute the environment's definitions into `id`.
    pub fn resolve(&mut self, id: TypeId) -> Result<TypeId, TypeExprError> {
        self.resolver.resolve(id)
    }

    /// Whether a recursion limit was hit during any check so far.
    pub fn depth_exceeded(&self) -> bool {
        self.guard.is_exceeded() || self.resolver.is_exceeded()
    }

    /// Number of coinductive assumptions made so far.
    pub fn assumptions(&self) -> u32 {
        self.assumptions
    }

    pub fn env_fingerprint(&self) -> u64 {
        self.env_fingerprint
    }

    pub fn flags(&self) -> RelationFlags {
        self.flags
    }

    /// Is `left` a subtype of `right`?
    pub fn check(&mut self, left: TypeId, right: TypeId) -> SubtypeResult {
        if right.is_any() {
            return SubtypeResult::True;
        }
        if left == right && !self.is_forward_ref(left) {
            return SubtypeResult::True;
        }
        if left.is_any() {
            return SubtypeResult::Unknown;
        }

        let key = self.cache_key(left, right);
        if let Some(cached) = self.cache.and_then(|cache| cache.get(&key)) {
            trace!(left = left.0, right = right.0, %cached, "relation cache hit");
            return cached;
        }

        match self.guard.enter((left, right)) {
            RecursionResult::Entered => {
                let assumptions_before = self.assumptions;
                let result = self.check_inner(left, right);
                self.guard.leave((left, right));

                if self.assumptions == assumptions_before && !self.depth_exceeded() {
                    if let Some(cache) = self.cache {
                        cache.insert(key, result);
                    }
                }
                result
            }
            RecursionResult::Cycle => {
                debug!(left = left.0, right = right.0, "assuming pair already in progress");
                self.assumptions += 1;
                SubtypeResult::True
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(
                    left = left.0,
                    right = right.0,
                    depth = self.guard.depth(),
                    iterations = self.guard.iterations(),
                    "recursion limit reached"
                );
                SubtypeResult::Unknown
            }
        }
    }

    fn cache_key(&self, left: TypeId, right: TypeId) -> RelationCacheKey {
        RelationCacheKey {
            left,
            right,
            env_fingerprint: self.env_fingerprint,
            flags: self.flags,
            generation: self.cache_generation,
        }
    }

    fn is_forward_ref(&self, id: TypeId) -> bool {
        matches!(self.interner.lookup(id), Some(TypeData::ForwardRef(_)))
    }

    /// Plain nodes naming a generic origin compare as that origin.
    fn promote(&self, data: TypeData) -> TypeData {
        match data {
            TypeData::Plain(name)
                if self
                    .origins
                    .contains(&self.interner.resolve_atom_ref(name)) =>
            {
                TypeData::Unparameterized(name)
            }
            other => other,
        }
    }

    fn check_inner(&mut self, left: TypeId, right: TypeId) -> SubtypeResult {
        let (Some(l), Some(r)) = (self.interner.lookup(left), self.interner.lookup(right)) else {
            return SubtypeResult::Unknown;
        };
        let (l, r) = (self.promote(l), self.promote(r));
        trace!(
            left = left.0,
            left_kind = l.kind_name(),
            right = right.0,
            right_kind = r.kind_name(),
            "check"
        );

        if let TypeData::ForwardRef(name) = l {
            return self.unfold(name, |this, expanded| this.check(expanded, right));
        }
        if let TypeData::ForwardRef(name) = r {
            return self.unfold(name, |this, expanded| this.check(left, expanded));
        }

        if let TypeData::Union(members) = l {
            return self.check_union_source(members, right);
        }
        if let TypeData::TypeVar(info) = l {
            return self.check_type_var_source(left, info, r, right);
        }
        if let TypeData::Union(members) = r {
            return self.check_union_target(left, members);
        }
        if let TypeData::TypeVar(info) = r {
            return self.check_type_var_target(left, info);
        }

        match (l, r) {
            (TypeData::Plain(sub), TypeData::Plain(sup)) => self.check_nominal(sub, sup),
            (TypeData::Plain(class), TypeData::Unparameterized(origin)) => {
                self.check_class_against_generic(class, origin, None)
            }
            (TypeData::Plain(class), TypeData::Generic { origin, args }) => {
                self.check_class_against_generic(class, origin, Some(args))
            }
            (
                TypeData::Unparameterized(origin) | TypeData::Generic { origin, .. },
                TypeData::Plain(class),
            ) => self.check_generic_against_class(origin, class),
            (TypeData::Unparameterized(lo), TypeData::Unparameterized(ro)) => {
                self.check_generics(lo, None, ro, None)
            }
            (TypeData::Unparameterized(lo), TypeData::Generic { origin: ro, args }) => {
                self.check_generics(lo, None, ro, Some(args))
            }
            (TypeData::Generic { origin: lo, args }, TypeData::Unparameterized(ro)) => {
                self.check_generics(lo, Some(args), ro, None)
            }
            (
                TypeData::Generic {
                    origin: lo,
                    args: la,
                },
                TypeData::Generic {
                    origin: ro,
                    args: ra,
                },
            ) => self.check_generics(lo, Some(la), ro, Some(ra)),
            (TypeData::Variadic(le), TypeData::Variadic(re)) => self.check(le, re),
            (TypeData::Params(lp), TypeData::Params(rp)) => self.check_params(lp, rp),
            _ => SubtypeResult::Unknown,
        }
    }

    /// Expand a deferred forward reference and continue with `f`.
    fn unfold(
        &mut self,
        name: Atom,
        f: impl FnOnce(&mut Self, TypeId) -> SubtypeResult,
    ) -> SubtypeResult {
        match self.resolver.expand(name) {
            Ok(Some(_)) if self.resolver.is_exceeded() => {
                debug!(
                    name = %self.interner.resolve_atom_ref(name),
                    "forward reference too deep to unfold"
                );
                SubtypeResult::Unknown
            }
            Ok(Some(expanded)) => f(self, expanded),
            Ok(None) => {
                trace!(
                    name = %self.interner.resolve_atom_ref(name),
                    "unresolved forward reference"
                );
                SubtypeResult::Unknown
            }
            Err(err) => {
                debug!(
                    name = %self.interner.resolve_atom_ref(name),
                    error = %err,
                    "forward reference failed to normalize"
                );
                SubtypeResult::Unknown
            }
        }
    }

    /// Both sides are classes: ask the nominal hierarchy.
    pub(crate) fn check_nominal(&self, sub: Atom, sup: Atom) -> SubtypeResult {
        let sub = self.interner.resolve_atom_ref(sub);
        let sup = self.interner.resolve_atom_ref(sup);
        match self.hierarchy.is_nominal_subtype(&sub, &sup) {
            Some(related) => SubtypeResult::from_bool(related),
            None => SubtypeResult::Unknown,
        }
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
