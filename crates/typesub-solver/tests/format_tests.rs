use super::*;

#[test]
fn test_format_leaves() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    assert_eq!(fmt.format(TypeId::ANY), "Any");
    assert_eq!(fmt.format(interner.plain("int")), "int");
    assert_eq!(fmt.format(interner.plain("None")), "None");
    assert_eq!(fmt.format(interner.unparameterized("list")), "list");
    assert_eq!(fmt.format(interner.forward_ref("Node")), "'Node'");
}

#[test]
fn test_format_generics() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    let int = interner.plain("int");
    let str_ = interner.plain("str");

    let dict = interner.generic("dict", vec![str_, interner.generic("list", vec![int])]);
    assert_eq!(fmt.format(dict), "dict[str, list[int]]");
}

#[test]
fn test_format_tuple_forms() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    let int = interner.plain("int");

    let variadic = interner.generic("tuple", vec![interner.variadic(int)]);
    assert_eq!(fmt.format(variadic), "tuple[int, ...]");

    let empty = interner.generic("tuple", Vec::new());
    assert_eq!(fmt.format(empty), "tuple[()]");

    let pair = interner.generic("tuple", vec![int, int]);
    assert_eq!(fmt.format(pair), "tuple[int, int]");
}

#[test]
fn test_format_callable_forms() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    let int = interner.plain("int");
    let str_ = interner.plain("str");

    let fixed = interner.generic("Callable", vec![interner.params(vec![int, str_]), str_]);
    assert_eq!(fmt.format(fixed), "Callable[[int, str], str]");

    let any_params = interner.generic(
        "Callable",
        vec![interner.variadic(TypeId::ANY), int],
    );
    assert_eq!(fmt.format(any_params), "Callable[..., int]");
}

#[test]
fn test_format_union_and_type_var() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    let int = interner.plain("int");
    let none = interner.plain("None");

    assert_eq!(fmt.format(interner.union(vec![none, int])), "None | int");

    let bound = interner.plain("str");
    assert_eq!(
        fmt.format(interner.type_var("T", Some(bound))),
        "TypeVar('T', bound=str)"
    );
    assert_eq!(fmt.format(interner.type_var("U", None)), "~U");
}

#[test]
fn test_opaque_plain_is_rendered_verbatim() {
    let interner = TypeInterner::new();
    let fmt = TypeFormatter::new(&interner);
    let opaque = interner.plain("Foo[int]");
    assert_eq!(fmt.to_expr(opaque), TypeExpr::Opaque("Foo[int]".to_string()));
    assert_eq!(fmt.format(opaque), "Foo[int]");
}

#[test]
fn test_dotted_identifier_detection() {
    assert!(is_dotted_identifier("io.StringIO"));
    assert!(is_dotted_identifier("_private"));
    assert!(!is_dotted_identifier("Foo[int]"));
    assert!(!is_dotted_identifier("a..b"));
    assert!(!is_dotted_identifier(""));
}
