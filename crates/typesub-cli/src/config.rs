//! Policy and environment loading.
//!
//! A policy file is a JSON [`SubtypePolicy`] (`camelCase` keys, every field
//! optional):
//!
//! ```json
//! { "unknownAs": "permissive", "strictInvariance": true, "maxDepth": 64 }
//! ```
//!
//! A refs file is a JSON object mapping forward reference names to
//! expression strings. `--ref` flags override entries of the same name.

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use typesub_solver::{ForwardRefEnv, SubtypePolicy, TypeEngine, UnknownPolicy, parse_type_expr};

use crate::args::{EnvArgs, PolicyArgs};

pub fn load_policy_file(path: &Path) -> Result<SubtypePolicy> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid policy file {}", path.display()))
}

/// The policy file (or the default policy) with flag overrides applied.
pub fn resolve_policy(args: &PolicyArgs) -> Result<SubtypePolicy> {
    let mut policy = match &args.config {
        Some(path) => load_policy_file(path)?,
        None => SubtypePolicy::default(),
    };
    if args.permissive {
        policy = policy.with_unknown_as(UnknownPolicy::Permissive);
    }
    if args.strict_invariance {
        policy = policy.with_strict_invariance(true);
    }
    if let Some(max_depth) = args.max_depth {
        if max_depth == 0 {
            bail!("--max-depth must be at least 1");
        }
        policy = policy.with_max_depth(max_depth);
    }
    debug!(?policy, "resolved subtype policy");
    Ok(policy)
}

pub fn load_refs_file(path: &Path) -> Result<ForwardRefEnv> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read refs file {}", path.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("refs file {} must be an object of strings", path.display()))?;

    let mut env = ForwardRefEnv::new();
    for (name, src) in entries {
        let expr = parse_type_expr(&src)
            .with_context(|| format!("invalid definition for `{name}` in {}", path.display()))?;
        env.insert(name, expr);
    }
    Ok(env)
}

/// Forward reference environment from `--refs-file` and `--ref` flags.
pub fn build_env(args: &EnvArgs) -> Result<ForwardRefEnv> {
    let mut env = match &args.refs_file {
        Some(path) => load_refs_file(path)?,
        None => ForwardRefEnv::new(),
    };
    for def in &args.refs {
        let expr = parse_type_expr(&def.expr)
            .with_context(|| format!("invalid definition for `{}`", def.name))?;
        env.insert(def.name.clone(), expr);
    }
    Ok(env)
}

/// Register `--class` definitions in order.
pub fn register_classes(engine: &TypeEngine, args: &EnvArgs) -> Result<()> {
    for class in &args.classes {
        let bases: Vec<&str> = class.bases.iter().map(String::as_str).collect();
        if !engine.add_class(&class.name, &bases) {
            bail!(
                "class `{}` cannot derive from {}: the hierarchy would become cyclic",
                class.name,
                class.bases.join(", ")
            );
        }
    }
    Ok(())
}
