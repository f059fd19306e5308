use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the typesub binary.
#[derive(Parser, Debug)]
#[command(
    name = "typesub",
    version,
    about = "Normalize Python type expressions and decide subtyping between them"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether LEFT is a subtype of RIGHT.
    Check(CheckArgs),
    /// Print the canonical form of a type expression.
    Normalize(NormalizeArgs),
    /// Print the unsubscripted origin of a type expression.
    Origin(ExprArgs),
    /// Print the arguments of a type expression's canonical form.
    Args(ExprArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Candidate subtype.
    pub left: String,

    /// Candidate supertype.
    pub right: String,

    #[command(flatten)]
    pub env: EnvArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Type expression.
    pub expr: String,

    #[command(flatten)]
    pub env: EnvArgs,
}

#[derive(Args, Debug)]
pub struct ExprArgs {
    /// Type expression.
    pub expr: String,
}

/// Forward references and user classes visible to a command.
#[derive(Args, Debug, Default)]
pub struct EnvArgs {
    /// Define a forward reference (repeatable).
    #[arg(long = "ref", value_name = "NAME=EXPR", value_parser = parse_ref_def)]
    pub refs: Vec<RefDef>,

    /// JSON object mapping forward reference names to expressions.
    #[arg(long = "refs-file", value_name = "FILE")]
    pub refs_file: Option<PathBuf>,

    /// Register a class with optional bases (repeatable).
    #[arg(long = "class", value_name = "NAME[:BASE,...]", value_parser = parse_class_def)]
    pub classes: Vec<ClassDef>,
}

/// Subtype policy overrides.
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// JSON policy file; flags below override its fields.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report `unknown` verdicts as subtypes.
    #[arg(long)]
    pub permissive: bool,

    /// Compare mutable-container arguments by identity.
    #[arg(long = "strict-invariance")]
    pub strict_invariance: bool,

    /// Maximum nesting of pairwise comparisons.
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefDef {
    pub name: String,
    pub expr: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_ref_def(value: &str) -> Result<RefDef, String> {
    let Some((name, expr)) = value.split_once('=') else {
        return Err(format!("expected NAME=EXPR, got `{value}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing reference name in `{value}`"));
    }
    Ok(RefDef {
        name: name.to_string(),
        expr: expr.trim().to_string(),
    })
}

fn parse_class_def(value: &str) -> Result<ClassDef, String> {
    let (name, bases) = match value.split_once(':') {
        Some((name, bases)) => (name, bases),
        None => (value, ""),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing class name in `{value}`"));
    }
    Ok(ClassDef {
        name: name.to_string(),
        bases: bases
            .split(',')
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
