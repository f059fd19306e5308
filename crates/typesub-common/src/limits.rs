//! Centralized limits for the typesub engine.
//!
//! Parsing and normalization walk type expressions recursively; these bounds
//! keep adversarial input from exhausting the stack.
//!
//! # Solver recursion limits
//!
//! Recursion limits for subtype checking live in
//! `typesub_solver::recursion::RecursionProfile` rather than here. The
//! profiles are the single source of truth for solver recursion.

// =============================================================================
// Expression limits
// =============================================================================

/// Maximum nesting depth of a type expression.
///
/// Enforced by the annotation parser and by the normalizer. Real annotations
/// rarely nest more than a handful of levels:
///
/// ```text
/// Dict[str, List[Tuple[int, Optional[Mapping[str, Sequence[bytes]]]]]]
/// ```
///
/// Anything beyond this is rejected with a parse error instead of recursing.
pub const MAX_TYPE_EXPR_DEPTH: u32 = 256;

/// Maximum length, in bytes, of annotation source text accepted by the parser.
pub const MAX_TYPE_EXPR_LEN: usize = 64 * 1024;

// =============================================================================
// Resolution limits
// =============================================================================

/// Maximum number of forward-reference expansions in a single resolution.
///
/// Cycles are broken by the resolver's visiting sets; this bound only guards
/// against very wide environments where every definition refers to many
/// others.
pub const MAX_FORWARD_REF_EXPANSIONS: u32 = 10_000;
