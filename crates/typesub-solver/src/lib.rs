//! Type normalization and subtype checking for Python-style type expressions.
//!
//! The pipeline has three stages:
//!
//! - **Normalizer**: host [`TypeExpr`] to a canonical, interned node
//!   ([`TypeId`]). Origin spellings collapse, qualifiers unwrap, unions
//!   flatten.
//! - **Resolver**: substitutes forward-reference definitions from a
//!   [`ForwardRefEnv`], breaking degenerate alias cycles and deferring
//!   guarded recursion.
//! - **Checker**: decides `left <: right` as [`SubtypeResult::True`],
//!   [`SubtypeResult::False`] or [`SubtypeResult::Unknown`], driven by the
//!   origin capability and variance tables in [`origins`] and an injected
//!   [`NominalHierarchy`].
//!
//! [`TypeEngine`] wires the stages together:
//!
//! ```ignore
//! let engine = TypeEngine::new();
//! let json: TypeExpr =
//!     "Union[int, float, bool, str, None, Sequence['JSON'], Mapping[str, 'JSON']]".parse()?;
//! let env = ForwardRefEnv::new().with("JSON", json);
//! let verdict = engine.check_subtype(&"Dict[str, str]".parse()?, &"'JSON'".parse()?, &env)?;
//! assert_eq!(verdict, SubtypeResult::True);
//! ```
pub mod caches;
mod engine;
mod error;
mod expr;
mod format;
pub mod inheritance;
mod intern;
mod normalize;
pub mod origins;
mod parse;
pub mod recursion;
pub mod relation_queries;
mod resolve;
mod subtype;
mod subtype_rules;
pub mod types;

pub use caches::relation_cache::RelationCacheStats;
pub use engine::TypeEngine;
pub use error::TypeExprError;
pub use expr::TypeExpr;
pub use format::TypeFormatter;
pub use inheritance::{InheritanceGraph, NominalHierarchy};
pub use intern::TypeInterner;
pub use normalize::Normalizer;
pub use origins::{OriginDef, OriginTable, Projection, Variance};
pub use parse::parse_type_expr;
pub use relation_queries::{RelationFlags, RelationResult, SubtypePolicy, UnknownPolicy};
pub use resolve::{ForwardRefEnv, ForwardRefResolver};
pub use subtype::{SubtypeChecker, SubtypeResult};
pub use types::{TypeData, TypeId, TypeListId, TypeParamInfo};

// Cross-module behavior tests.
#[cfg(test)]
#[path = "../tests/scenario_tests.rs"]
mod scenario_tests;

#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
