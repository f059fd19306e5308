//! A single engine shared across rayon workers.

use super::*;
use rayon::prelude::*;

fn expr(src: &str) -> TypeExpr {
    src.parse().expect("test expression parses")
}

const PAIRS: &[(&str, &str)] = &[
    ("List[bool]", "Sequence[int]"),
    ("Dict[str, bytes]", "'JSON'"),
    ("Dict[str, str]", "'JSON'"),
    ("Tuple[int, str]", "Sequence[Union[int, str]]"),
    ("Callable[[int], str]", "Callable[[bool], str]"),
    ("Set[int]", "Sequence[int]"),
    ("List", "List[int]"),
    ("Counter[str]", "Mapping[str, int]"),
];

fn json_env() -> ForwardRefEnv {
    ForwardRefEnv::new().with(
        "JSON",
        expr("Union[int, float, bool, str, None, Sequence['JSON'], Mapping[str, 'JSON']]"),
    )
}

#[test]
fn test_parallel_queries_match_sequential_results() {
    let env = json_env();
    let sequential: Vec<SubtypeResult> = {
        let engine = TypeEngine::new();
        PAIRS
            .iter()
            .map(|(l, r)| engine.check_subtype(&expr(l), &expr(r), &env).unwrap())
            .collect()
    };

    let engine = TypeEngine::new();
    let parallel: Vec<SubtypeResult> = (0..PAIRS.len() * 16)
        .into_par_iter()
        .map(|i| {
            let (l, r) = PAIRS[i % PAIRS.len()];
            engine.check_subtype(&expr(l), &expr(r), &env).unwrap()
        })
        .collect();

    for (i, verdict) in parallel.iter().enumerate() {
        assert_eq!(*verdict, sequential[i % PAIRS.len()], "{:?}", PAIRS[i % PAIRS.len()]);
    }
    assert!(engine.cache_stats().hits > 0);
}

#[test]
fn test_parallel_normalization_interns_one_node() {
    let engine = TypeEngine::new();
    let ids: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|i| {
            let src = if i % 2 == 0 {
                "Dict[str, List[Optional[int]]]"
            } else {
                "dict[str, list[int | None]]"
            };
            engine.normalize_str(src).unwrap()
        })
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_classes_added_while_querying() {
    let engine = TypeEngine::new();
    assert!(engine.add_class("Base", &[]));
    (0..32).into_par_iter().for_each(|i| {
        let name = format!("Derived{i}");
        assert!(engine.add_class(&name, &["Base"]));
        let verdict = engine
            .check_subtype(&expr(&name), &expr("Base"), &ForwardRefEnv::new())
            .unwrap();
        assert_eq!(verdict, SubtypeResult::True);
    });
}
