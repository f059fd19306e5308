use super::*;

#[test]
fn test_simple_inheritance() {
    let graph = InheritanceGraph::new();
    assert!(graph.add_class("Parent", &[]));
    assert!(graph.add_class("Child", &["Parent"]));

    assert!(graph.is_derived_from("Child", "Parent"));
    assert!(!graph.is_derived_from("Parent", "Child"));
    assert!(!graph.is_derived_from("Child", "Child"));
}

#[test]
fn test_transitive_inheritance() {
    let graph = InheritanceGraph::new();
    graph.add_class("A", &[]);
    graph.add_class("B", &["A"]);
    graph.add_class("C", &["B"]);

    assert!(graph.is_derived_from("C", "A"));
    assert!(graph.is_derived_from("C", "B"));
    assert!(!graph.is_derived_from("A", "C"));
}

#[test]
fn test_diamond_inheritance() {
    let graph = InheritanceGraph::new();
    graph.add_class("A", &[]);
    graph.add_class("B", &["A"]);
    graph.add_class("C", &["A"]);
    graph.add_class("D", &["B", "C"]);

    assert!(graph.is_derived_from("D", "A"));
    assert!(graph.is_derived_from("D", "B"));
    assert!(graph.is_derived_from("D", "C"));
    assert_eq!(graph.get_parents("D"), vec!["B".to_string(), "C".to_string()]);
}

#[test]
fn test_cycle_is_rejected() {
    let graph = InheritanceGraph::new();
    graph.add_class("A", &[]);
    graph.add_class("B", &["A"]);

    assert!(graph.detects_cycle("A", "B"));
    assert!(graph.detects_cycle("A", "A"));
    assert!(!graph.detects_cycle("C", "A"));

    assert!(!graph.add_class("A", &["B"]));
    assert!(graph.get_parents("A").is_empty());
}

#[test]
fn test_adding_bases_later_extends_parents() {
    let graph = InheritanceGraph::new();
    graph.add_class("Mixin", &[]);
    graph.add_class("Base", &[]);
    graph.add_class("Widget", &["Base"]);
    assert!(!graph.is_derived_from("Widget", "Mixin"));

    graph.add_class("Widget", &["Mixin"]);
    assert!(graph.is_derived_from("Widget", "Mixin"));
    assert!(graph.is_derived_from("Widget", "Base"));
}

// =============================================================================
// NominalHierarchy over the builtin graph
// =============================================================================

#[test]
fn test_builtin_bool_is_int_without_numeric_tower() {
    let graph = InheritanceGraph::builtin();
    assert_eq!(graph.is_nominal_subtype("bool", "int"), Some(true));
    assert_eq!(graph.is_nominal_subtype("int", "bool"), Some(false));
    assert_eq!(graph.is_nominal_subtype("int", "float"), Some(false));
    assert_eq!(graph.is_nominal_subtype("float", "complex"), Some(false));
}

#[test]
fn test_builtin_everything_is_object() {
    let graph = InheritanceGraph::builtin();
    assert_eq!(graph.is_nominal_subtype("int", "object"), Some(true));
    assert_eq!(graph.is_nominal_subtype("None", "object"), Some(true));
    assert_eq!(graph.is_nominal_subtype("list", "object"), Some(true));
    assert_eq!(graph.is_nominal_subtype("Unregistered", "object"), Some(true));
    assert_eq!(graph.is_nominal_subtype("object", "int"), Some(false));
}

#[test]
fn test_builtin_sequences() {
    let graph = InheritanceGraph::builtin();
    assert_eq!(graph.is_nominal_subtype("str", "Sequence"), Some(true));
    assert_eq!(graph.is_nominal_subtype("bytes", "Sequence"), Some(true));
    assert_eq!(graph.is_nominal_subtype("bytearray", "Sequence"), Some(true));
    assert_eq!(graph.is_nominal_subtype("range", "Iterable"), Some(true));
    assert_eq!(graph.is_nominal_subtype("int", "Sequence"), Some(false));
    assert_eq!(graph.is_nominal_subtype("list", "Sequence"), Some(true));
    assert_eq!(graph.is_nominal_subtype("dict", "Mapping"), Some(true));
}

#[test]
fn test_builtin_io_streams() {
    let graph = InheritanceGraph::builtin();
    for stream in ["io.TextIOWrapper", "io.TextIOBase", "io.StringIO"] {
        assert_eq!(graph.is_nominal_subtype(stream, "TextIO"), Some(true), "{stream}");
        assert_eq!(graph.is_nominal_subtype(stream, "BinaryIO"), Some(false), "{stream}");
    }
    for stream in ["io.BufferedReader", "io.BufferedWriter", "io.BytesIO"] {
        assert_eq!(graph.is_nominal_subtype(stream, "BinaryIO"), Some(true), "{stream}");
        assert_eq!(graph.is_nominal_subtype(stream, "TextIO"), Some(false), "{stream}");
    }
}

#[test]
fn test_unknown_classes_cannot_be_decided() {
    let graph = InheritanceGraph::builtin();
    assert!(!graph.is_known("Widget"));
    assert_eq!(graph.is_nominal_subtype("Widget", "int"), None);
    assert_eq!(graph.is_nominal_subtype("int", "Widget"), None);
}

#[test]
fn test_unknown_base_makes_negative_answers_undecidable() {
    let graph = InheritanceGraph::builtin();
    graph.add_class("Widget", &["thirdparty.Base"]);
    assert!(graph.is_known("Widget"));
    assert_eq!(graph.is_nominal_subtype("Widget", "int"), None);
    assert_eq!(graph.is_nominal_subtype("Widget", "object"), Some(true));

    graph.add_class("thirdparty.Base", &[]);
    assert_eq!(graph.is_nominal_subtype("Widget", "int"), Some(false));
    assert_eq!(graph.is_nominal_subtype("Widget", "thirdparty.Base"), Some(true));
}

#[test]
fn test_user_class_extending_builtin_container() {
    let graph = InheritanceGraph::builtin();
    graph.add_class("MyList", &["list"]);
    assert_eq!(graph.is_nominal_subtype("MyList", "Sequence"), Some(true));
    assert_eq!(graph.is_nominal_subtype("MyList", "Mapping"), Some(false));
}

#[test]
fn test_with_origins_adds_custom_origin_bases() {
    use crate::origins::{OriginDef, Projection, Variance};

    let mut origins = OriginTable::builtin();
    origins.register(
        OriginDef::fixed("Box", &[Variance::Covariant])
            .classes(&["Box"])
            .satisfies("Iterable", &[Projection::Arg(0)]),
    );
    let graph = InheritanceGraph::with_origins(&origins);
    assert_eq!(graph.is_nominal_subtype("Box", "Iterable"), Some(true));
    assert_eq!(graph.is_nominal_subtype("Box", "Sequence"), Some(false));
}
