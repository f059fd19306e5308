use super::*;

#[test]
fn test_display_renders_annotation_syntax() {
    let expr = TypeExpr::subscript(
        "Dict",
        vec![
            TypeExpr::name("str"),
            TypeExpr::subscript("List", vec![TypeExpr::forward_ref("Node")]),
        ],
    );
    assert_eq!(expr.to_string(), "Dict[str, List['Node']]");
}

#[test]
fn test_display_callable_and_tuple_forms() {
    let callable = TypeExpr::subscript(
        "Callable",
        vec![
            TypeExpr::List(vec![TypeExpr::name("int")]),
            TypeExpr::None,
        ],
    );
    assert_eq!(callable.to_string(), "Callable[[int], None]");

    let tuple = TypeExpr::subscript("Tuple", vec![TypeExpr::name("int"), TypeExpr::Ellipsis]);
    assert_eq!(tuple.to_string(), "Tuple[int, ...]");

    let empty = TypeExpr::subscript("Tuple", vec![TypeExpr::EmptyTuple]);
    assert_eq!(empty.to_string(), "Tuple[()]");
}

#[test]
fn test_display_type_vars() {
    assert_eq!(TypeExpr::type_var("T", None).to_string(), "~T");
    assert_eq!(
        TypeExpr::type_var("T", Some(TypeExpr::name("str"))).to_string(),
        "TypeVar('T', bound=str)"
    );
}

#[test]
fn test_display_literals_and_quotes() {
    assert_eq!(TypeExpr::Bool(true).to_string(), "True");
    assert_eq!(TypeExpr::Int(-3).to_string(), "-3");
    assert_eq!(TypeExpr::Bytes("ab".to_string()).to_string(), "b'ab'");
    assert_eq!(TypeExpr::Str("it's".to_string()).to_string(), "\"it's\"");
}

#[test]
fn test_display_reparses_to_same_expr() {
    for src in [
        "Dict[str, List['Node']]",
        "Callable[[int, str], None]",
        "Callable[..., Any]",
        "Tuple[int, ...]",
        "int | str | None",
        "Literal[1, True, 'a', b'x']",
        "TypeVar('T', bound=Union[list, tuple])",
        "~T",
    ] {
        let expr: TypeExpr = src.parse().expect("parses");
        let rendered = expr.to_string();
        let reparsed: TypeExpr = rendered.parse().expect("rendered text parses");
        assert_eq!(expr, reparsed, "{src} -> {rendered}");
    }
}

#[test]
fn test_union_of() {
    assert_eq!(TypeExpr::union_of(Vec::new()), None);
    assert_eq!(
        TypeExpr::union_of(vec![TypeExpr::name("int")]),
        Some(TypeExpr::name("int"))
    );
    assert_eq!(
        TypeExpr::union_of(vec![TypeExpr::name("int"), TypeExpr::None])
            .map(|expr| expr.to_string()),
        Some("int | None".to_string())
    );
}

#[test]
fn test_is_value() {
    assert!(TypeExpr::Int(1).is_value());
    assert!(TypeExpr::Bool(false).is_value());
    assert!(!TypeExpr::None.is_value());
    assert!(!TypeExpr::name("int").is_value());
}
