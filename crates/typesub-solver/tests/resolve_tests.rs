use super::*;
use crate::format::TypeFormatter;
use crate::inheritance::InheritanceGraph;
use crate::intern::TypeInterner;
use crate::origins::OriginTable;

fn expr(src: &str) -> TypeExpr {
    src.parse().expect("test expression parses")
}

fn env(entries: &[(&str, &str)]) -> ForwardRefEnv {
    entries
        .iter()
        .map(|(name, src)| (*name, expr(src)))
        .collect()
}

/// Normalize and resolve `src` under `env`, rendered as text.
fn resolve_str(env: &ForwardRefEnv, src: &str) -> String {
    let interner = TypeInterner::new();
    let origins = OriginTable::builtin();
    let graph = InheritanceGraph::builtin();
    let normalizer = Normalizer::new(&interner, &origins, &graph);
    let mut resolver = ForwardRefResolver::new(&normalizer, env);
    let id = normalizer.normalize(&expr(src)).expect("normalizes");
    let resolved = resolver.resolve(id).expect("resolves");
    TypeFormatter::new(&interner).format(resolved)
}

// =============================================================================
// ForwardRefEnv
// =============================================================================

#[test]
fn test_env_builder_and_lookup() {
    let env = ForwardRefEnv::new()
        .with("A", expr("int"))
        .with("B", expr("List['A']"));
    assert_eq!(env.len(), 2);
    assert!(env.contains("A"));
    assert_eq!(env.get("B"), Some(&expr("List['A']")));
    assert_eq!(env.get("C"), None);
    let names: Vec<&str> = env.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_env_fingerprint_tracks_content() {
    let a = env(&[("A", "int"), ("B", "str")]);
    let b = env(&[("B", "str"), ("A", "int")]);
    let c = env(&[("A", "int"), ("B", "bytes")]);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_eq!(ForwardRefEnv::new().fingerprint(), 0);
}

// =============================================================================
// Substitution
// =============================================================================

#[test]
fn test_missing_name_stays_forward_ref() {
    let env = env(&[("A", "int")]);
    assert_eq!(resolve_str(&env, "'Missing'"), "'Missing'");
    assert_eq!(resolve_str(&env, "List['Missing']"), "list['Missing']");
}

#[test]
fn test_definitions_are_substituted_everywhere() {
    let env = env(&[("UserId", "int"), ("Name", "str")]);
    assert_eq!(resolve_str(&env, "'UserId'"), "int");
    assert_eq!(
        resolve_str(&env, "Dict['UserId', List['Name']]"),
        "dict[int, list[str]]"
    );
    assert_eq!(
        resolve_str(&env, "Callable[['UserId'], 'Name']"),
        "Callable[[int], str]"
    );
    assert_eq!(resolve_str(&env, "Tuple['Name', ...]"), "tuple[str, ...]");
}

#[test]
fn test_chained_definitions() {
    let env = env(&[("A", "'B'"), ("B", "List['C']"), ("C", "int")]);
    assert_eq!(resolve_str(&env, "'A'"), "list[int]");
}

#[test]
fn test_substituted_unions_are_reflattened() {
    let env = env(&[("Num", "Union[int, float]")]);
    assert_eq!(resolve_str(&env, "Union['Num', str, int]"), "float | int | str");
    assert_eq!(resolve_str(&env, "Union['Num', int]"), "float | int");
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_direct_self_alias_is_any() {
    let env = env(&[("X", "'X'")]);
    assert_eq!(resolve_str(&env, "'X'"), "Any");
}

#[test]
fn test_mutual_alias_cycle_is_any() {
    let env = env(&[("A", "'B'"), ("B", "'A'")]);
    assert_eq!(resolve_str(&env, "'A'"), "Any");
    assert_eq!(resolve_str(&env, "List['B']"), "list[Any]");
}

#[test]
fn test_unguarded_union_self_reference_is_any() {
    let env = env(&[("X", "Union[int, 'X']")]);
    assert_eq!(resolve_str(&env, "'X'"), "Any | int");
}

#[test]
fn test_guarded_self_reference_is_deferred() {
    let env = env(&[("Tree", "Union[int, List['Tree']]")]);
    assert_eq!(resolve_str(&env, "'Tree'"), "int | list['Tree']");
    assert_eq!(resolve_str(&env, "List['Tree']"), "list[int | list['Tree']]");
}

#[test]
fn test_mutual_guarded_recursion() {
    let env = env(&[("A", "List['B']"), ("B", "Union[int, List['A']]")]);
    assert_eq!(resolve_str(&env, "'A'"), "list[int | list['A']]");
}

#[test]
fn test_json_definition() {
    let json = "Union[int, float, bool, str, None, Sequence['JSON'], Mapping[str, 'JSON']]";
    let env = env(&[("JSON", json)]);
    assert_eq!(
        resolve_str(&env, "'JSON'"),
        "Mapping[str, 'JSON'] | None | Sequence['JSON'] | bool | float | int | str"
    );
}

// =============================================================================
// expand
// =============================================================================

#[test]
fn test_expand_reports_undefined_names() {
    let interner = TypeInterner::new();
    let origins = OriginTable::builtin();
    let graph = InheritanceGraph::builtin();
    let normalizer = Normalizer::new(&interner, &origins, &graph);
    let env = env(&[("Tree", "Union[int, List['Tree']]")]);
    let mut resolver = ForwardRefResolver::new(&normalizer, &env);

    let missing = interner.intern_string("Missing");
    assert_eq!(resolver.expand(missing), Ok(None));

    let tree = interner.intern_string("Tree");
    let first = resolver.expand(tree).expect("expands").expect("defined");
    let second = resolver.expand(tree).expect("expands").expect("defined");
    assert_eq!(first, second);
    assert_eq!(
        TypeFormatter::new(&interner).format(first),
        "int | list['Tree']"
    );
}

#[test]
fn test_invalid_definition_is_an_error() {
    let interner = TypeInterner::new();
    let origins = OriginTable::builtin();
    let graph = InheritanceGraph::builtin();
    let normalizer = Normalizer::new(&interner, &origins, &graph);
    let env = env(&[("Bad", "Dict[int]")]);
    let mut resolver = ForwardRefResolver::new(&normalizer, &env);

    let id = interner.forward_ref("Bad");
    assert!(matches!(
        resolver.resolve(id),
        Err(TypeExprError::ArgumentCount { .. })
    ));
}
