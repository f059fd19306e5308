use clap::Parser;

use super::args::{ClassDef, CliArgs, Command, OutputFormat, RefDef};

#[test]
fn parses_check_with_defaults() {
    let args = CliArgs::try_parse_from(["typesub", "check", "List[int]", "Sequence[int]"])
        .expect("check args should parse");

    assert_eq!(args.format, OutputFormat::Text);
    assert!(!args.no_color);
    let Command::Check(check) = args.command else {
        panic!("expected check command");
    };
    assert_eq!(check.left, "List[int]");
    assert_eq!(check.right, "Sequence[int]");
    assert!(check.env.refs.is_empty());
    assert!(check.env.classes.is_empty());
    assert!(!check.policy.permissive);
    assert!(!check.policy.strict_invariance);
    assert_eq!(check.policy.max_depth, None);
    assert!(check.policy.config.is_none());
}

#[test]
fn parses_check_flags() {
    let args = CliArgs::try_parse_from([
        "typesub",
        "check",
        "Dict[str, str]",
        "'JSON'",
        "--ref",
        "JSON=Union[str, Mapping[str, 'JSON']]",
        "--class",
        "Dog:Animal, Pet",
        "--class",
        "Animal",
        "--permissive",
        "--strict-invariance",
        "--max-depth",
        "32",
        "--config",
        "policy.json",
        "--format",
        "json",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.format, OutputFormat::Json);
    let Command::Check(check) = args.command else {
        panic!("expected check command");
    };
    assert_eq!(
        check.env.refs,
        vec![RefDef {
            name: "JSON".to_string(),
            expr: "Union[str, Mapping[str, 'JSON']]".to_string(),
        }]
    );
    assert_eq!(
        check.env.classes,
        vec![
            ClassDef {
                name: "Dog".to_string(),
                bases: vec!["Animal".to_string(), "Pet".to_string()],
            },
            ClassDef {
                name: "Animal".to_string(),
                bases: Vec::new(),
            },
        ]
    );
    assert!(check.policy.permissive);
    assert!(check.policy.strict_invariance);
    assert_eq!(check.policy.max_depth, Some(32));
    assert_eq!(
        check.policy.config.as_deref(),
        Some(std::path::Path::new("policy.json"))
    );
}

#[test]
fn global_flags_follow_the_subcommand() {
    let args = CliArgs::try_parse_from(["typesub", "origin", "List[int]", "--no-color"])
        .expect("origin args should parse");
    assert!(args.no_color);
    assert!(matches!(args.command, Command::Origin(ref origin) if origin.expr == "List[int]"));
}

#[test]
fn rejects_malformed_ref() {
    let err = CliArgs::try_parse_from(["typesub", "normalize", "'A'", "--ref", "A"])
        .expect_err("ref without `=` should be rejected");
    assert!(err.to_string().contains("NAME=EXPR"));

    assert!(CliArgs::try_parse_from(["typesub", "normalize", "'A'", "--ref", "=int"]).is_err());
}

#[test]
fn rejects_empty_class_name() {
    assert!(CliArgs::try_parse_from(["typesub", "check", "a", "b", "--class", ":Base"]).is_err());
}

#[test]
fn requires_a_subcommand() {
    assert!(CliArgs::try_parse_from(["typesub"]).is_err());
    assert!(CliArgs::try_parse_from(["typesub", "check", "int"]).is_err());
}
