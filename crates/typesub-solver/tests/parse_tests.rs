//! Tests for the annotation parser.

use super::*;

fn parse(src: &str) -> TypeExpr {
    parse_type_expr(src).unwrap_or_else(|err| panic!("failed to parse {src:?}: {err}"))
}

// =============================================================================
// Names and subscripts
// =============================================================================

#[test]
fn test_parse_plain_name() {
    assert_eq!(parse("int"), TypeExpr::name("int"));
    assert_eq!(parse("  str  "), TypeExpr::name("str"));
}

#[test]
fn test_parse_dotted_name() {
    assert_eq!(
        parse("collections.abc.Sequence"),
        TypeExpr::name("collections.abc.Sequence")
    );
}

#[test]
fn test_parse_nested_subscript() {
    let expr = parse("Dict[str, List['Node']]");
    assert_eq!(
        expr,
        TypeExpr::subscript(
            "Dict",
            vec![
                TypeExpr::name("str"),
                TypeExpr::subscript("List", vec![TypeExpr::forward_ref("Node")]),
            ]
        )
    );
}

#[test]
fn test_parse_trailing_comma_in_subscript() {
    assert_eq!(
        parse("Tuple[int,]"),
        TypeExpr::subscript("Tuple", vec![TypeExpr::name("int")])
    );
}

#[test]
fn test_parse_ellipsis_tuple() {
    assert_eq!(
        parse("Tuple[int, ...]"),
        TypeExpr::subscript("Tuple", vec![TypeExpr::name("int"), TypeExpr::Ellipsis])
    );
}

#[test]
fn test_parse_empty_tuple() {
    assert_eq!(
        parse("Tuple[()]"),
        TypeExpr::subscript("Tuple", vec![TypeExpr::EmptyTuple])
    );
}

#[test]
fn test_parse_callable() {
    assert_eq!(
        parse("Callable[[int, str], None]"),
        TypeExpr::subscript(
            "Callable",
            vec![
                TypeExpr::List(vec![TypeExpr::name("int"), TypeExpr::name("str")]),
                TypeExpr::None,
            ]
        )
    );
    assert_eq!(
        parse("Callable[[], int]"),
        TypeExpr::subscript("Callable", vec![TypeExpr::List(vec![]), TypeExpr::name("int")])
    );
    assert_eq!(
        parse("Callable[..., int]"),
        TypeExpr::subscript("Callable", vec![TypeExpr::Ellipsis, TypeExpr::name("int")])
    );
}

// =============================================================================
// Unions, literals, type variables
// =============================================================================

#[test]
fn test_parse_pipe_union_is_left_nested() {
    let expr = parse("int | str | None");
    assert_eq!(
        expr,
        TypeExpr::Or(
            Box::new(TypeExpr::Or(
                Box::new(TypeExpr::name("int")),
                Box::new(TypeExpr::name("str"))
            )),
            Box::new(TypeExpr::None)
        )
    );
}

#[test]
fn test_parse_parenthesized_group() {
    assert_eq!(parse("(int)"), TypeExpr::name("int"));
}

#[test]
fn test_parse_literal_values() {
    assert_eq!(
        parse("Literal[1, -2, True, 'a', b'x', None]"),
        TypeExpr::subscript(
            "Literal",
            vec![
                TypeExpr::Int(1),
                TypeExpr::Int(-2),
                TypeExpr::Bool(true),
                TypeExpr::Str("a".to_string()),
                TypeExpr::Bytes("x".to_string()),
                TypeExpr::None,
            ]
        )
    );
}

#[test]
fn test_parse_string_escapes() {
    assert_eq!(parse(r#""it's""#), TypeExpr::Str("it's".to_string()));
    assert_eq!(parse(r"'a\'b'"), TypeExpr::Str("a'b".to_string()));
}

#[test]
fn test_parse_tilde_type_var() {
    assert_eq!(parse("~T"), TypeExpr::type_var("T", None));
}

#[test]
fn test_parse_type_var_call_with_bound() {
    assert_eq!(
        parse("TypeVar('T', bound=str)"),
        TypeExpr::type_var("T", Some(TypeExpr::name("str")))
    );
    assert_eq!(
        parse("typing.TypeVar(\"T\", bound='Node', covariant=True)"),
        TypeExpr::type_var("T", Some(TypeExpr::forward_ref("Node")))
    );
}

#[test]
fn test_parse_constrained_type_var_becomes_union_bound() {
    assert_eq!(
        parse("TypeVar('T', int, str)"),
        TypeExpr::type_var(
            "T",
            Some(TypeExpr::Or(
                Box::new(TypeExpr::name("int")),
                Box::new(TypeExpr::name("str"))
            ))
        )
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_parse_error_positions() {
    match parse_type_expr("List[int") {
        Err(TypeExprError::Parse { position, .. }) => assert_eq!(position, 8),
        other => panic!("expected parse error, got {other:?}"),
    }
    match parse_type_expr("int $") {
        Err(TypeExprError::Parse { position, .. }) => assert_eq!(position, 4),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_parse_rejects_trailing_tokens() {
    assert!(parse_type_expr("int str").is_err());
    assert!(parse_type_expr("List[int]]").is_err());
}

#[test]
fn test_parse_rejects_empty_input_and_subscript() {
    assert!(parse_type_expr("").is_err());
    assert!(parse_type_expr("List[]").is_err());
}

#[test]
fn test_parse_rejects_unterminated_string() {
    assert!(matches!(
        parse_type_expr("'Node"),
        Err(TypeExprError::Parse { position: 0, .. })
    ));
}

#[test]
fn test_parse_rejects_arbitrary_calls() {
    assert!(parse_type_expr("NewType('X', int)").is_err());
    assert!(parse_type_expr("TypeVar(T)").is_err());
    assert!(parse_type_expr("TypeVar('T', int, bound=str)").is_err());
}

#[test]
fn test_parse_rejects_excessive_nesting() {
    let depth = MAX_TYPE_EXPR_DEPTH as usize + 8;
    let src = format!("{}int{}", "List[".repeat(depth), "]".repeat(depth));
    assert!(matches!(
        parse_type_expr(&src),
        Err(TypeExprError::Parse { .. })
    ));
}

#[test]
fn test_from_str() {
    let expr: TypeExpr = "Optional[int]".parse().expect("parses");
    assert_eq!(
        expr,
        TypeExpr::subscript("Optional", vec![TypeExpr::name("int")])
    );
}
