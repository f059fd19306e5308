//! Subcommand implementations.
//!
//! Each command returns a serializable report; rendering is separate so the
//! same report backs both the text and the JSON output.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use typesub_solver::{SubtypeResult, TypeEngine, TypeExpr, UnknownPolicy, parse_type_expr};

use crate::args::{CheckArgs, Command, ExprArgs, NormalizeArgs, OutputFormat};
use crate::config::{build_env, register_classes, resolve_policy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub left: String,
    pub right: String,
    pub verdict: SubtypeResult,
    pub is_subtype: bool,
    pub unknown_as: UnknownPolicy,
    pub depth_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub input: String,
    pub normalized: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginReport {
    pub input: String,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsReport {
    pub input: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Check(CheckReport),
    Normalize(NormalizeReport),
    Origin(OriginReport),
    Args(ArgsReport),
}

impl Report {
    /// Whether the command's answer was positive. Only `check` can say no.
    pub fn succeeded(&self) -> bool {
        match self {
            Report::Check(report) => report.is_subtype,
            _ => true,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("failed to serialize report")
            }
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        match self {
            Report::Check(report) => {
                let verdict = match report.verdict {
                    SubtypeResult::True => "true".green().bold(),
                    SubtypeResult::False => "false".red().bold(),
                    SubtypeResult::Unknown => "unknown".yellow().bold(),
                };
                let mut line = format!("{verdict}: {} <: {}", report.left, report.right);
                if report.verdict.is_unknown() {
                    let collapsed = if report.is_subtype { "true" } else { "false" };
                    line.push_str(&format!(" (reported as {collapsed})"));
                }
                if report.depth_exceeded {
                    line.push_str(&format!(" {}", "[recursion limit reached]".dimmed()));
                }
                line
            }
            Report::Normalize(report) => report.normalized.clone(),
            Report::Origin(report) => match &report.origin {
                Some(origin) => origin.clone(),
                None => "(none)".dimmed().to_string(),
            },
            Report::Args(report) => report.args.join("\n"),
        }
    }
}

fn parse(src: &str) -> Result<TypeExpr> {
    parse_type_expr(src).with_context(|| format!("invalid type expression `{src}`"))
}

pub fn run_command(command: &Command) -> Result<Report> {
    match command {
        Command::Check(args) => check(args).map(Report::Check),
        Command::Normalize(args) => normalize(args).map(Report::Normalize),
        Command::Origin(args) => origin(args).map(Report::Origin),
        Command::Args(args) => type_args(args).map(Report::Args),
    }
}

pub fn check(args: &CheckArgs) -> Result<CheckReport> {
    let policy = resolve_policy(&args.policy)?;
    let engine = TypeEngine::new().with_policy(policy);
    register_classes(&engine, &args.env)?;
    let env = build_env(&args.env)?;

    let left = engine
        .normalize(&parse(&args.left)?)
        .with_context(|| format!("cannot normalize `{}`", args.left))?;
    let right = engine
        .normalize(&parse(&args.right)?)
        .with_context(|| format!("cannot normalize `{}`", args.right))?;
    let result = engine
        .relate(left, right, &env)
        .context("cannot resolve forward references")?;

    Ok(CheckReport {
        left: engine.format(left),
        right: engine.format(right),
        verdict: result.verdict,
        is_subtype: result.is_related(&policy),
        unknown_as: policy.unknown_as,
        depth_exceeded: result.depth_exceeded,
    })
}

pub fn normalize(args: &NormalizeArgs) -> Result<NormalizeReport> {
    let engine = TypeEngine::new();
    register_classes(&engine, &args.env)?;
    let env = build_env(&args.env)?;

    let id = engine
        .normalize(&parse(&args.expr)?)
        .with_context(|| format!("cannot normalize `{}`", args.expr))?;
    let resolved = engine
        .resolve(id, &env)
        .context("cannot resolve forward references")?;
    Ok(NormalizeReport {
        input: args.expr.clone(),
        normalized: engine.format(resolved),
    })
}

pub fn origin(args: &ExprArgs) -> Result<OriginReport> {
    let engine = TypeEngine::new();
    Ok(OriginReport {
        input: args.expr.clone(),
        origin: engine.get_origin(&parse(&args.expr)?),
    })
}

pub fn type_args(args: &ExprArgs) -> Result<ArgsReport> {
    let engine = TypeEngine::new();
    let ids = engine
        .get_args(&parse(&args.expr)?)
        .with_context(|| format!("cannot normalize `{}`", args.expr))?;
    Ok(ArgsReport {
        input: args.expr.clone(),
        args: ids.into_iter().map(|id| engine.format(id)).collect(),
    })
}
