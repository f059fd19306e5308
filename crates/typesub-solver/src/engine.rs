//! Engine facade.
//!
//! [`TypeEngine`] owns the shared state (interner, origin table, nominal
//! hierarchy, relation cache) and runs each top-level decision with fresh
//! per-decision state:
//!
//! ```text
//! TypeExpr --normalize--> TypeId --resolve(env)--> TypeId --check--> SubtypeResult
//! ```

use crate::caches::query_trace;
use crate::caches::relation_cache::{RelationCache, RelationCacheStats};
use crate::error::TypeExprError;
use crate::expr::TypeExpr;
use crate::format::TypeFormatter;
use crate::inheritance::{InheritanceGraph, NominalHierarchy};
use crate::intern::TypeInterner;
use crate::normalize::Normalizer;
use crate::origins::{OriginDef, OriginTable};
use crate::parse::parse_type_expr;
use crate::relation_queries::{RelationResult, SubtypePolicy};
use crate::resolve::ForwardRefEnv;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::TypeId;
use tracing::debug;

/// Type normalization and subtype checking over one nominal hierarchy.
///
/// Safe to share across threads; every query takes `&self`.
pub struct TypeEngine<H: NominalHierarchy = InheritanceGraph> {
    interner: TypeInterner,
    origins: OriginTable,
    hierarchy: H,
    cache: RelationCache,
    policy: SubtypePolicy,
}

impl TypeEngine<InheritanceGraph> {
    /// An engine with the builtin origins and classes.
    pub fn new() -> Self {
        let origins = OriginTable::builtin();
        let hierarchy = InheritanceGraph::with_origins(&origins);
        TypeEngine {
            interner: TypeInterner::new(),
            origins,
            hierarchy,
            cache: RelationCache::new(),
            policy: SubtypePolicy::default(),
        }
    }

    /// Register a class and its direct bases. Returns `false` if the bases
    /// would make the hierarchy cyclic.
    ///
    /// Safe while other threads are checking: the cache moves to a new
    /// generation, so verdicts computed against the old hierarchy are not
    /// served afterwards.
    pub fn add_class(&self, name: &str, bases: &[&str]) -> bool {
        let added = self.hierarchy.add_class(name, bases);
        if added {
            self.cache.clear();
        }
        added
    }

    /// Register a generic origin and its capability bases.
    pub fn register_origin(&mut self, def: OriginDef) {
        let bases: Vec<&str> = def
            .capabilities
            .iter()
            .map(|cap| cap.target.as_str())
            .filter(|target| *target != def.name)
            .collect();
        self.hierarchy.add_class(&def.name, &bases);
        self.origins.register(def);
        self.cache.clear();
    }
}

impl Default for TypeEngine<InheritanceGraph> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: NominalHierarchy> TypeEngine<H> {
    /// An engine with the builtin origins and a caller-supplied hierarchy.
    pub fn with_hierarchy(hierarchy: H) -> Self {
        TypeEngine {
            interner: TypeInterner::new(),
            origins: OriginTable::builtin(),
            hierarchy,
            cache: RelationCache::new(),
            policy: SubtypePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SubtypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SubtypePolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: SubtypePolicy) {
        self.policy = policy;
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn origins(&self) -> &OriginTable {
        &self.origins
    }

    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    pub fn cache_stats(&self) -> RelationCacheStats {
        self.cache.stats()
    }

    fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.interner, &self.origins, &self.hierarchy)
    }

    // =========================================================================
    // Normalization
    // =========================================================================

    pub fn normalize(&self, expr: &TypeExpr) -> Result<TypeId, TypeExprError> {
        self.normalizer().normalize(expr)
    }

    /// Parse annotation text and normalize it.
    pub fn normalize_str(&self, src: &str) -> Result<TypeId, TypeExprError> {
        self.normalize(&parse_type_expr(src)?)
    }

    /// Substitute `env`'s definitions into `id`.
    pub fn resolve(&self, id: TypeId, env: &ForwardRefEnv) -> Result<TypeId, TypeExprError> {
        let normalizer = self.normalizer();
        let mut checker = SubtypeChecker::new(&normalizer, env, self.policy);
        checker.resolve(id)
    }

    pub fn get_origin(&self, expr: &TypeExpr) -> Option<String> {
        self.normalizer().get_origin(expr)
    }

    pub fn get_args(&self, expr: &TypeExpr) -> Result<Vec<TypeId>, TypeExprError> {
        self.normalizer().get_args(expr)
    }

    pub fn format(&self, id: TypeId) -> String {
        TypeFormatter::new(&self.interner).format(id)
    }

    pub fn to_expr(&self, id: TypeId) -> TypeExpr {
        TypeFormatter::new(&self.interner).to_expr(id)
    }

    // =========================================================================
    // Subtype queries
    // =========================================================================

    /// Raw three-valued verdict for `left <: right`.
    pub fn check_subtype(
        &self,
        left: &TypeExpr,
        right: &TypeExpr,
        env: &ForwardRefEnv,
    ) -> Result<SubtypeResult, TypeExprError> {
        let left = self.normalize(left)?;
        let right = self.normalize(right)?;
        Ok(self.relate(left, right, env)?.verdict)
    }

    /// Boolean verdict for `left <: right`; `Unknown` collapses according to
    /// the engine's policy.
    pub fn is_subtype(
        &self,
        left: &TypeExpr,
        right: &TypeExpr,
        env: &ForwardRefEnv,
    ) -> Result<bool, TypeExprError> {
        let verdict = self.check_subtype(left, right, env)?;
        Ok(self.policy.unknown_as.collapse(verdict))
    }

    /// Decide `left <: right` for normalized nodes.
    pub fn relate(
        &self,
        left: TypeId,
        right: TypeId,
        env: &ForwardRefEnv,
    ) -> Result<RelationResult, TypeExprError> {
        let normalizer = self.normalizer();
        let mut checker =
            SubtypeChecker::new(&normalizer, env, self.policy).with_cache(&self.cache);

        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::relation_start(
                query_id,
                "is_subtype",
                left,
                right,
                checker.env_fingerprint(),
                checker.flags().bits(),
            );
        }

        let hits_before = query_id.map(|_| self.cache.stats().hits);
        let left = checker.resolve(left)?;
        let right = checker.resolve(right)?;
        // A reference chain past the resolution limit has no verdict.
        let verdict = if checker.depth_exceeded() {
            SubtypeResult::Unknown
        } else {
            checker.check(left, right)
        };
        let result = RelationResult {
            verdict,
            depth_exceeded: checker.depth_exceeded(),
        };

        if result.depth_exceeded {
            debug!(
                left = %self.format(left),
                right = %self.format(right),
                "subtype check hit a recursion limit"
            );
        }
        if let (Some(query_id), Some(hits_before)) = (query_id, hits_before) {
            let cache_hit = self.cache.stats().hits > hits_before;
            query_trace::relation_end(
                query_id,
                "is_subtype",
                verdict,
                result.depth_exceeded,
                cache_hit,
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
#[path = "../tests/engine_tests.rs"]
mod tests;
