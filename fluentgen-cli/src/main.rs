//! fluentgen CLI - builds fluent factory models from `.fluent.json` inputs.
//!
//! Features:
//! - Recursive input discovery with per-file failure isolation
//! - Rayon-powered parallel model building
//! - Plain, JSON and fingerprint reports
//! - Graphviz DOT export of the step graph

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use fluentgen_core::{
    init_structured_logging, load_config, log_error, log_event, log_info, print_fingerprints,
    print_json, print_plain, FluentGen, GenerationResult, StepGraph,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fluent factory model builder")]
pub struct Cli {
    /// Input document or directory containing `.fluent.json` files
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Only build the given root (qualified name); repeatable
    #[arg(long = "root")]
    roots: Vec<String>,

    /// Print one model fingerprint per root instead of the full report
    #[arg(long)]
    fingerprint: bool,

    /// Generate Graphviz DOT output for each step graph
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a specified file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,
}

/// Rejects output paths that are absolute or climb out of the working directory.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }
    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Directory holding `fluentgen.toml` for the given input path.
fn config_dir(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    }
}

fn render_dot(result: &GenerationResult) -> String {
    let mut out = String::new();
    for unit in &result.units {
        out.push_str(&format!("// === {} ===\n", unit.root.qualified_name()));
        out.push_str(&StepGraph::from_unit(unit).to_dot(unit));
    }
    out
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] fluentgen internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    let input = PathBuf::from(&cli.path);
    if !input.exists() {
        return Err(anyhow!("Input path does not exist: {}", cli.path));
    }

    // 1. Configuration
    let config = load_config(config_dir(&input))
        .with_context(|| format!("Failed to load configuration near {}", cli.path))?
        .unwrap_or_default();
    let json = cli.json || config.wants_json();

    // 2. Build
    log_info(&format!("building fluent models from {}", input.display()));
    let mut generator = FluentGen::new(&input).with_config(config);
    for root in &cli.roots {
        generator = generator.only_root(root.clone());
    }
    let result = generator
        .generate()
        .with_context(|| format!("Failed to build models from {}", cli.path))?;
    log_event(
        if result.has_errors() { "WARN" } else { "GENERATED" },
        &format!(
            "{} units, {} diagnostics ({} errors), {} skipped inputs",
            result.units.len(),
            result.diagnostic_count(),
            result.error_count(),
            result.failed_inputs.len()
        ),
    );

    // 3. Report
    if cli.fingerprint {
        print_fingerprints(&result);
    } else if json {
        print_json(&result);
    } else {
        print_plain(&result);
    }

    // 4. DOT/Graphviz output (write errors only warn)
    if cli.dot {
        let dot = render_dot(&result);
        if let Some(ref file) = cli.dot_file {
            match validate_output_path(file) {
                Ok(safe_path) => {
                    if let Err(e) = fs::write(&safe_path, &dot) {
                        log_error(&format!("DOT write failed to {}: {}", safe_path.display(), e));
                        eprintln!("[WARN] DOT write failed to {}: {}", safe_path.display(), e);
                    }
                }
                Err(e) => {
                    log_error(&format!("invalid output path: {}", e));
                    eprintln!("[ERROR] Invalid output path: {}", e);
                    std::process::exit(2);
                }
            }
        } else {
            println!("{}", dot);
        }
    }

    // 5. Exit code (CI-friendly)
    std::process::exit(if result.has_errors() { 1 } else { 0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_accepts_relative() {
        let p = validate_output_path("out/graph.dot").unwrap();
        assert_eq!(p, PathBuf::from("out/graph.dot"));
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../graph.dot").is_err());
        assert!(validate_output_path("out/../../graph.dot").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_absolute_and_nul() {
        #[cfg(unix)]
        assert!(validate_output_path("/tmp/graph.dot").is_err());
        assert!(validate_output_path("graph\0.dot").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_roots() {
        let cli = Cli::parse_from([
            "fluentgen",
            "inputs",
            "--root",
            "app::Factory",
            "--root",
            "app::Other",
            "--json",
        ]);
        assert_eq!(cli.path, "inputs");
        assert_eq!(cli.roots, vec!["app::Factory", "app::Other"]);
        assert!(cli.json);
        assert!(!cli.dot);
    }

    #[test]
    fn test_cli_defaults_to_current_dir() {
        let cli = Cli::parse_from(["fluentgen"]);
        assert_eq!(cli.path, ".");
        assert!(cli.roots.is_empty());
        assert!(cli.dot_file.is_none());
    }

    #[test]
    fn test_config_dir_of_missing_path_is_itself() {
        let p = Path::new("does/not/exist");
        assert_eq!(config_dir(p), p);
    }
}
