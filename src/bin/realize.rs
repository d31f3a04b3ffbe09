//! Template realization CLI
//!
//! Counts, lists, and inspects the realizations of a template file.
//!
//! # Usage
//!
//! ```bash
//! # How many realizations?
//! realize count --file sweep.yaml
//!
//! # Stream the first ten as JSON lines
//! realize list --file sweep.yaml --limit 10 --format json
//!
//! # Only the chosen values, keys joined with '/'
//! cat sweep.json | realize --separator / list --spec-only
//!
//! # Where are the placeholders?
//! realize bindings --file sweep.yaml
//! ```

use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use candidate_templates::{
    bind, count_realizations, realize_template_with, Node, RealizeOptions, TemplateRealization,
};

#[derive(Parser)]
#[command(name = "realize")]
#[command(version)]
#[command(about = "Enumerate every realization of a template with candidate placeholders")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Options file (YAML)
    #[arg(long, short, global = true, env = "REALIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Separator joining path positions in specification keys
    #[arg(long, global = true, env = "REALIZE_SEPARATOR")]
    separator: Option<String>,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of realizations without building any
    Count {
        /// Template file, JSON or YAML (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Stream realizations in enumeration order
    List {
        /// Template file, JSON or YAML (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Stop after this many realizations
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print only the chosen values
        #[arg(long)]
        spec_only: bool,
    },

    /// Show the placeholders found in a template
    Bindings {
        /// Template file, JSON or YAML (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = load_options(cli.config.as_deref(), cli.separator).and_then(|options| {
        match cli.command {
            Commands::Count { file } => cmd_count(file, cli.format),
            Commands::List {
                file,
                limit,
                spec_only,
            } => cmd_list(file, &options, limit, spec_only, cli.format),
            Commands::Bindings { file } => cmd_bindings(file, &options, cli.format),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_count(file: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let template = load_template(file.as_deref())?;
    let count = count_realizations(&template)?;

    match format {
        OutputFormat::Json => {
            // u128 does not survive a JSON number round trip
            println!("{}", serde_json::json!({ "count": count.to_string() }));
        }
        OutputFormat::Pretty => println!("{}", count),
    }
    Ok(())
}

fn cmd_list(
    file: Option<PathBuf>,
    options: &RealizeOptions,
    limit: Option<usize>,
    spec_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let template = load_template(file.as_deref())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = write_realizations(&mut out, &template, options, limit, spec_only, format)?;
    out.flush()?;

    tracing::debug!(written, "Realizations listed");
    Ok(())
}

fn cmd_bindings(
    file: Option<PathBuf>,
    options: &RealizeOptions,
    format: OutputFormat,
) -> Result<()> {
    let template = load_template(file.as_deref())?;
    let bindings = bind(&template);

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = bindings
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "path": b.path.render(&options.path_separator),
                        "size": b.size(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            if bindings.is_empty() {
                println!("{}", "No placeholders".dimmed());
            }
            for b in &bindings {
                let path = b.path.render(&options.path_separator);
                let path = if path.is_empty() { "<root>".to_string() } else { path };
                println!("  {} ({} candidates)", path.cyan(), b.size());
            }
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Stream realizations of `template` to `out`, at most `limit` of them.
/// Returns the number written.
fn write_realizations(
    out: &mut impl Write,
    template: &Node,
    options: &RealizeOptions,
    limit: Option<usize>,
    spec_only: bool,
    format: OutputFormat,
) -> Result<usize> {
    let realizations = realize_template_with(template, options)?;

    let mut written = 0;
    for realization in realizations.take(limit.unwrap_or(usize::MAX)) {
        written += 1;
        match format {
            OutputFormat::Json => write_json_line(out, &realization, spec_only)?,
            OutputFormat::Pretty => write_pretty(out, written, &realization, spec_only)?,
        }
    }
    Ok(written)
}

fn write_json_line(
    out: &mut impl Write,
    realization: &TemplateRealization,
    spec_only: bool,
) -> Result<()> {
    if spec_only {
        serde_json::to_writer(&mut *out, &realization.specification)?;
    } else {
        serde_json::to_writer(&mut *out, realization)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_pretty(
    out: &mut impl Write,
    ordinal: usize,
    realization: &TemplateRealization,
    spec_only: bool,
) -> Result<()> {
    let chosen = realization
        .specification
        .iter()
        .map(|(key, value)| -> Result<String> {
            Ok(format!("{}={}", key, serde_json::to_string(value)?))
        })
        .collect::<Result<Vec<_>>>()?;
    writeln!(out, "{} {}", format!("#{}", ordinal).bold(), chosen.join(", "))?;

    if !spec_only {
        let body = serde_json::to_string_pretty(&realization.realization)?;
        for line in body.lines() {
            writeln!(out, "    {}", line)?;
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn load_options(config: Option<&Path>, separator: Option<String>) -> Result<RealizeOptions> {
    let mut options = match config {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config '{}'", path.display()))?;
            RealizeOptions::from_yaml_str(&yaml)
                .with_context(|| format!("Invalid config '{}'", path.display()))?
        }
        None => RealizeOptions::default(),
    };
    if let Some(separator) = separator {
        options.path_separator = separator;
    }
    options.validate()?;
    tracing::debug!(separator = %options.path_separator, "Options loaded");
    Ok(options)
}

fn load_template(file: Option<&Path>) -> Result<Node> {
    let (source, is_json) = match file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            (source, is_json)
        }
        None => {
            if io::stdin().is_terminal() {
                bail!("No input provided. Use --file or pipe a template via stdin.");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            (buffer, false)
        }
    };

    let template = if is_json {
        Node::from_json_str(&source)?
    } else {
        Node::from_yaml_str(&source)?
    };
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candidate_templates::RealizeError;
    use tempfile::NamedTempFile;

    const TEMPLATE_YAML: &str = r#"
a: 1
b:
  $candidates: [10, 20]
c:
  d:
    $candidates: [x, y, z]
"#;

    fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn realize_error(err: &anyhow::Error) -> &RealizeError {
        err.downcast_ref::<RealizeError>()
            .or_else(|| err.chain().find_map(|e| e.downcast_ref::<RealizeError>()))
            .unwrap()
    }

    #[test]
    fn test_options_default() {
        let options = load_options(None, None).unwrap();
        assert_eq!(options, RealizeOptions::default());
    }

    #[test]
    fn test_separator_overrides_config() {
        let config = temp_file("path_separator: \"/\"\n", ".yaml");
        let options = load_options(Some(config.path()), None).unwrap();
        assert_eq!(options.path_separator, "/");

        let options = load_options(Some(config.path()), Some("::".to_string())).unwrap();
        assert_eq!(options.path_separator, "::");
    }

    #[test]
    fn test_empty_separator_rejected() {
        let err = load_options(None, Some(String::new())).unwrap_err();
        assert_eq!(realize_error(&err).code(), "INVALID_CONFIG");

        let config = temp_file("path_separator: \"\"\n", ".yaml");
        let err = load_options(Some(config.path()), None).unwrap_err();
        assert_eq!(realize_error(&err).code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_options(Some(Path::new("/nonexistent/realize.yaml")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_template_format_by_extension() {
        // Valid YAML, not valid JSON
        let yaml = temp_file(TEMPLATE_YAML, ".yaml");
        let template = load_template(Some(yaml.path())).unwrap();
        assert_eq!(count_realizations(&template).unwrap(), 6);

        let misnamed = temp_file(TEMPLATE_YAML, ".json");
        let err = load_template(Some(misnamed.path())).unwrap_err();
        assert_eq!(realize_error(&err).code(), "JSON_ERROR");

        let json = temp_file(r#"{"b": {"$candidates": [10, 20]}}"#, ".json");
        let template = load_template(Some(json.path())).unwrap();
        assert_eq!(count_realizations(&template).unwrap(), 2);
    }

    #[test]
    fn test_limit_caps_stream() {
        let template = Node::from_yaml_str(TEMPLATE_YAML).unwrap();
        let options = RealizeOptions::default();

        let mut out = Vec::new();
        let written =
            write_realizations(&mut out, &template, &options, Some(4), true, OutputFormat::Json)
                .unwrap();
        assert_eq!(written, 4);

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], serde_json::json!({ "b": 10, "c.d": "x" }));
        assert_eq!(lines[3], serde_json::json!({ "b": 20, "c.d": "x" }));
    }

    #[test]
    fn test_unlimited_stream_with_separator() {
        let template = Node::from_yaml_str(TEMPLATE_YAML).unwrap();
        let options = RealizeOptions::with_separator("/");

        let mut out = Vec::new();
        let written =
            write_realizations(&mut out, &template, &options, None, false, OutputFormat::Json)
                .unwrap();
        assert_eq!(written, 6);

        let first: serde_json::Value =
            serde_json::from_str(String::from_utf8(out).unwrap().lines().next().unwrap())
                .unwrap();
        assert_eq!(first["specification"]["c/d"], "x");
        assert_eq!(first["realization"]["a"], 1);
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "realize",
            "--separator",
            "/",
            "list",
            "--limit",
            "2",
            "--spec-only",
        ])
        .unwrap();
        assert_eq!(cli.separator.as_deref(), Some("/"));
        match cli.command {
            Commands::List { limit, spec_only, .. } => {
                assert_eq!(limit, Some(2));
                assert!(spec_only);
            }
            _ => panic!("expected list"),
        }
    }
}
