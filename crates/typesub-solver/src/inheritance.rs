//! Nominal class hierarchy.
//!
//! The checker never decides `Plain` vs `Plain` by itself; it asks an
//! injected [`NominalHierarchy`]. [`InheritanceGraph`] is the default
//! implementation: a concurrent base-class graph preloaded with the builtin
//! classes, to which callers add their own classes.

use crate::origins::OriginTable;
use dashmap::DashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::debug;

/// Nominal subtype predicate over class names.
pub trait NominalHierarchy: Send + Sync {
    /// Whether `name` is a class this hierarchy knows about.
    fn is_known(&self, name: &str) -> bool;

    /// `Some(true)` if `sub` is `sup` or derives from it, `Some(false)` if it
    /// provably does not, `None` if the hierarchy cannot tell.
    fn is_nominal_subtype(&self, sub: &str, sup: &str) -> Option<bool>;
}

type Bases = SmallVec<[String; 2]>;

/// Concurrent class graph keyed by canonical class name.
pub struct InheritanceGraph {
    parents: DashMap<String, Bases>,
    derived_cache: DashMap<(String, String), Option<bool>>,
}

/// Builtin non-generic classes and their direct bases.
const BUILTIN_CLASSES: &[(&str, &[&str])] = &[
    ("object", &[]),
    ("None", &[]),
    ("Hashable", &[]),
    ("Sized", &[]),
    ("int", &["Hashable"]),
    ("bool", &["int"]),
    ("float", &["Hashable"]),
    ("complex", &["Hashable"]),
    ("str", &["Sequence", "Hashable"]),
    ("bytes", &["Sequence", "Hashable"]),
    ("bytearray", &["MutableSequence"]),
    ("memoryview", &["Sequence"]),
    ("range", &["Sequence", "Hashable"]),
    ("slice", &[]),
    ("BaseException", &[]),
    ("Exception", &["BaseException"]),
    ("TextIO", &["IO"]),
    ("BinaryIO", &["IO"]),
    ("io.IOBase", &[]),
    ("io.TextIOBase", &["io.IOBase", "TextIO"]),
    ("io.TextIOWrapper", &["io.TextIOBase"]),
    ("io.StringIO", &["io.TextIOBase"]),
    ("io.BufferedIOBase", &["io.IOBase"]),
    ("io.BufferedReader", &["io.BufferedIOBase", "BinaryIO"]),
    ("io.BufferedWriter", &["io.BufferedIOBase", "BinaryIO"]),
    ("io.BytesIO", &["io.BufferedIOBase", "BinaryIO"]),
];

impl InheritanceGraph {
    /// An empty graph (not even `object`).
    pub fn new() -> Self {
        InheritanceGraph {
            parents: DashMap::new(),
            derived_cache: DashMap::new(),
        }
    }

    /// A graph with the builtin classes and the builtin origins' ABC bases.
    pub fn builtin() -> Self {
        Self::with_origins(&OriginTable::builtin())
    }

    /// A graph with the builtin classes, plus one node per origin in
    /// `origins` whose bases are its capability targets.
    pub fn with_origins(origins: &OriginTable) -> Self {
        let graph = Self::new();
        for (name, bases) in BUILTIN_CLASSES {
            graph.insert_unchecked(name, bases.iter().map(|base| base.to_string()).collect());
        }
        for def in origins.iter() {
            let bases = def
                .capabilities
                .iter()
                .map(|cap| cap.target.clone())
                .filter(|target| *target != def.name)
                .collect();
            graph.insert_unchecked(&def.name, bases);
        }
        graph
    }

    fn insert_unchecked(&self, name: &str, bases: Bases) {
        self.parents
            .entry(name.to_string())
            .and_modify(|existing| {
                for base in &bases {
                    if !existing.contains(base) {
                        existing.push(base.clone());
                    }
                }
            })
            .or_insert(bases);
        self.derived_cache.clear();
    }

    /// Register `name` with the given direct bases.
    ///
    /// Bases that are not yet known are recorded anyway; queries that reach
    /// them answer "cannot tell". Returns `false` (and adds nothing) if an
    /// edge would make the graph cyclic.
    pub fn add_class(&self, name: &str, bases: &[&str]) -> bool {
        if let Some(base) = bases.iter().find(|base| self.detects_cycle(name, base)) {
            debug!(class = name, base = *base, "rejecting cyclic base class");
            return false;
        }
        self.insert_unchecked(name, bases.iter().map(|base| base.to_string()).collect());
        true
    }

    /// Direct bases of `name`.
    pub fn get_parents(&self, name: &str) -> Vec<String> {
        self.parents
            .get(name)
            .map(|bases| bases.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether adding `child -> parent` would create a cycle.
    pub fn detects_cycle(&self, child: &str, parent: &str) -> bool {
        child == parent || self.derives(parent, child) == Some(true)
    }

    /// Strict, transitive derivation.
    pub fn is_derived_from(&self, child: &str, ancestor: &str) -> bool {
        child != ancestor && self.derives(child, ancestor) == Some(true)
    }

    /// Breadth-first search from `sub` towards `sup`.
    ///
    /// `None` when `sup` was not reached but the walk passed through a class
    /// the graph does not know.
    fn derives(&self, sub: &str, sup: &str) -> Option<bool> {
        let key = (sub.to_string(), sup.to_string());
        if let Some(cached) = self.derived_cache.get(&key) {
            return *cached;
        }

        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut saw_unknown = false;
        queue.push_back(sub.to_string());

        let result = loop {
            let Some(current) = queue.pop_front() else {
                break if saw_unknown { None } else { Some(false) };
            };
            if current == sup {
                break Some(true);
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            match self.parents.get(&current) {
                Some(bases) => queue.extend(bases.iter().cloned()),
                None => saw_unknown = true,
            }
        };

        self.derived_cache.insert(key, result);
        result
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl Default for InheritanceGraph {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NominalHierarchy for InheritanceGraph {
    fn is_known(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    fn is_nominal_subtype(&self, sub: &str, sup: &str) -> Option<bool> {
        if sub == sup || sup == "object" {
            return Some(true);
        }
        if !self.is_known(sub) || !self.is_known(sup) {
            return None;
        }
        self.derives(sub, sup)
    }
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
