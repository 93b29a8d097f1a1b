// SPDX-License-Identifier: PMPL-1.0-or-later
//!
//! structq: build structured query JSON from the command line.
//!
//! Every subcommand builds one query node and prints its wire JSON on
//! stdout. `compose` builds a whole tree from a JSON plan:
//!
//! ```text
//! structq term whale --weight 2
//! structq constraint --kind value status published
//! structq options search-options.json decade 1990s
//! echo '{"op":"and","queries":[{"op":"term","text":"a"}]}' | structq compose -
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use structq_builder::build::{qtext, term};
use structq_builder::config::STRICT_ENV_VAR;
use structq_builder::{BuilderConfig, QueryBuilder, QueryNode, QueryPlan, SearchOptions};

/// structq version string, pulled from Cargo.toml at compile time.
const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// structq: structured query builder.
#[derive(Parser, Debug)]
#[command(name = "structq", version = VERSION, about = "Build structured query JSON")]
struct Cli {
    /// Report dropped shapes and unknown constraint kinds instead of falling back.
    #[arg(long, global = true)]
    strict: bool,

    /// Pretty-print the output.
    #[arg(long, global = true)]
    pretty: bool,

    /// Builder configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a JSON query plan (`-` reads stdin).
    Compose { plan: String },
    /// Term query.
    Term {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Query-text query.
    Qtext {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Constraint query of an explicit kind. Values are JSON, or plain strings.
    Constraint {
        /// Constraint kind label; range when omitted.
        #[arg(long)]
        kind: Option<String>,
        name: String,
        values: Vec<String>,
    },
    /// Constraint query whose kind is read from a search options file.
    Options {
        options: PathBuf,
        name: String,
        values: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// File config, then the `STRUCTQ_STRICT` override, then `--strict`.
fn load_config(path: Option<&Path>, env_strict: Option<&str>, strict: bool) -> Result<BuilderConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BuilderConfig::from_json(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BuilderConfig::default(),
    };
    let config = config.with_env_override(env_strict);
    Ok(if strict { BuilderConfig::strict() } else { config })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A value argument that is not valid JSON is taken as a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading plan from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading plan {source}"))
    }
}

fn run(command: Command, builder: &QueryBuilder) -> Result<QueryNode> {
    let node = match command {
        Command::Compose { plan } => {
            let plan = QueryPlan::from_json(&read_input(&plan)?)?;
            plan.compile_with(builder)?
        }
        Command::Term { text, weight } => term(text, weight),
        Command::Qtext { text } => qtext(text),
        Command::Constraint { kind, name, values } => {
            let values = values.iter().map(|v| parse_value(v)).collect();
            let kind = builder.constraint_kind(kind.as_deref())?;
            builder.build_constraint(kind, &name, values)?
        }
        Command::Options {
            options,
            name,
            values,
        } => {
            let raw = std::fs::read_to_string(&options)
                .with_context(|| format!("reading search options {}", options.display()))?;
            let options = SearchOptions::from_json(&raw)
                .with_context(|| format!("parsing search options {}", options.display()))?;
            let values: Vec<Value> = values.iter().map(|v| parse_value(v)).collect();
            options.build_with(builder, &name, values)?
        }
    };
    Ok(node)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env_strict = std::env::var(STRICT_ENV_VAR).ok();
    let config = load_config(cli.config.as_deref(), env_strict.as_deref(), cli.strict)?;
    debug!(?config, "Builder configuration");

    let node = run(cli.command, &QueryBuilder::new(config))?;
    let json = if cli.pretty {
        node.to_json_pretty()?
    } else {
        node.to_json()?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use structq_builder::build::word_constraint;
    use structq_builder::ClassificationMode;

    #[test]
    fn test_parse_value_falls_back_to_string() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_value("published"), json!("published"));
    }

    #[test]
    fn test_config_precedence() {
        let config = load_config(None, None, false).unwrap();
        assert_eq!(config, BuilderConfig::default());
        let config = load_config(None, Some("true"), false).unwrap();
        assert_eq!(config.shape_mode, ClassificationMode::Strict);
        let config = load_config(None, Some("0"), true).unwrap();
        assert_eq!(config, BuilderConfig::strict());
    }

    #[test]
    fn test_constraint_command() {
        let cli = Cli::try_parse_from(["structq", "constraint", "--kind", "word", "w", "a"]).unwrap();
        let node = run(cli.command, &QueryBuilder::default()).unwrap();
        assert_eq!(node, word_constraint("w", "a", None));
    }

    #[test]
    fn test_strict_flag_rejects_unknown_kind() {
        let cli =
            Cli::try_parse_from(["structq", "--strict", "constraint", "--kind", "bogus", "n"]).unwrap();
        assert!(cli.strict);
        assert!(run(cli.command, &QueryBuilder::strict()).is_err());
    }

    #[test]
    fn test_strict_flag_reports_dropped_shapes() {
        let args = ["structq", "--strict", "constraint", "--kind", "geospatial", "g", "x"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(run(cli.command, &QueryBuilder::strict()).is_err());

        let cli =
            Cli::try_parse_from(["structq", "constraint", "--kind", "geospatial", "g", "x"]).unwrap();
        let node = run(cli.command, &QueryBuilder::default()).unwrap();
        assert_eq!(
            node.to_json().unwrap(),
            r#"{"geospatial-constraint-query":{"constraint-name":"g","point":[],"box":[],"circle":[],"polygon":[]}}"#
        );
    }

    #[test]
    fn test_term_command() {
        let cli = Cli::try_parse_from(["structq", "term", "a", "b", "--weight", "2"]).unwrap();
        let node = run(cli.command, &QueryBuilder::default()).unwrap();
        assert_eq!(
            node.to_json().unwrap(),
            r#"{"term-query":{"text":["a","b"],"weight":2.0}}"#
        );
    }
}
