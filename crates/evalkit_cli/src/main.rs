//! evalkit CLI for running analyzers over JSON data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evalkit_core::Metrics;
use evalkit_eval::{analyze_many, AnalyzerConfig, AnalyzerRegistry, Columns};

#[derive(Parser)]
#[command(name = "evalkit")]
#[command(author, version)]
#[command(about = "Compute evaluation metrics over columnar JSON data")]
#[command(long_about = "evalkit: run declaratively configured analyzers over a JSON data file.

EXAMPLES:
  # List the analyzer tags
  evalkit metrics

  # Run the analyzers of analyzers.json over data.json
  evalkit analyze --data data.json --config analyzers.json

  # Decorate every metric name
  evalkit analyze --data data.json --config analyzers.json --prefix val_

DATA FORMAT:
  A JSON object mapping column names to arrays of numbers (null is NaN),
  e.g. {\"target\": [1, 0, 1], \"pred\": [1, 1, 1]}

CONFIG FORMAT:
  One analyzer object or a list of them,
  e.g. [{\"analyzer\": \"accuracy\", \"y_true\": \"target\", \"y_pred\": \"pred\"}]")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyzers over a data file and print their metrics
    Analyze {
        /// JSON data file
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        /// JSON analyzer configuration file
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Compute every output right after analysis
        #[arg(long, default_value = "false")]
        eager: bool,

        /// Prefix of every metric name
        #[arg(long, default_value = "", value_name = "PREFIX")]
        prefix: String,

        /// Suffix of every metric name
        #[arg(long, default_value = "", value_name = "SUFFIX")]
        suffix: String,
    },
    /// List the registered analyzer tags
    Metrics,
}

/// Result of one analyzer, as printed.
#[derive(Debug, Serialize)]
struct Report {
    analyzer: String,
    metrics: Metrics,
    #[serde(skip_serializing_if = "String::is_empty")]
    content: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Analyze {
            data,
            config,
            eager,
            prefix,
            suffix,
        } => {
            let reports = handle_analyze(&data, &config, eager, &prefix, &suffix)?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
            Ok(())
        }
        Commands::Metrics => {
            print!("{}", handle_metrics());
            Ok(())
        }
    }
}

fn read_json(path: &Path, what: &str) -> Result<String> {
    if !path.exists() {
        bail!("{what} file not found: {}", path.display());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))
}

fn handle_analyze(
    data: &Path,
    config: &Path,
    eager: bool,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<Report>> {
    let columns = Columns::from_json_str(&read_json(data, "data")?)
        .with_context(|| format!("Invalid data in {}", data.display()))?;
    let configs = AnalyzerConfig::list_from_json_str(&read_json(config, "config")?)
        .with_context(|| format!("Invalid analyzer configuration in {}", config.display()))?;
    if configs.is_empty() {
        bail!("No analyzer configured in {}", config.display());
    }
    info!("Loaded {} columns and {} analyzers", columns.len(), configs.len());

    let registry = AnalyzerRegistry::with_builtins();
    let analyzers = registry.build_all(&configs)?;
    let outputs = analyze_many(&analyzers, &columns, !eager)?;

    configs
        .iter()
        .zip(&outputs)
        .map(|(config, output)| {
            let metrics = output
                .evaluator()
                .evaluate(prefix, suffix)
                .with_context(|| format!("Failed to evaluate '{}'", config.analyzer))?;
            Ok(Report {
                analyzer: config.analyzer.clone(),
                metrics,
                content: output.content().generate_content()?,
            })
        })
        .collect()
}

fn handle_metrics() -> String {
    let registry = AnalyzerRegistry::with_builtins();
    let mut listing = String::new();
    for tag in registry.list() {
        let capability = registry
            .capability_of(tag)
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        listing.push_str(&format!("{tag:<35}{capability}\n"));
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "evalkit", "-vv", "analyze", "--data", "d.json", "--config", "c.json", "--eager",
            "--prefix", "val_",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze {
                eager, prefix, suffix, ..
            } => {
                assert!(eager);
                assert_eq!(prefix, "val_");
                assert_eq!(suffix, "");
            }
            Commands::Metrics => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_prints_metrics() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.json", r#"{"target": [1, 0, 0, 1], "pred": [1, 0, 1, 0]}"#);
        let config = write(
            &dir,
            "config.json",
            r#"[{"analyzer": "precision", "y_true": "target", "y_pred": "pred", "label_type": "binary"},
                {"analyzer": "accuracy", "y_true": "label", "y_pred": "pred", "missing_policy": "ignore"}]"#,
        );
        let reports = handle_analyze(&data, &config, false, "", "_test").unwrap();
        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json[0]["analyzer"], "precision");
        assert_eq!(json[0]["metrics"]["precision_test"], 0.5);
        assert_eq!(json[0]["metrics"]["count_test"], 4);
        assert_eq!(json[1]["metrics"], serde_json::json!({}));
    }

    #[test]
    fn test_nan_is_printed_as_null() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.json", r#"{"target": [1, null], "pred": [1, 0]}"#);
        let config = write(
            &dir,
            "config.json",
            r#"{"analyzer": "mean_absolute_error", "y_true": "target", "y_pred": "pred"}"#,
        );
        let reports = handle_analyze(&data, &config, true, "", "").unwrap();
        let printed = serde_json::to_string(&reports).unwrap();
        assert!(printed.contains(r#""mean_absolute_error":null"#));
    }

    #[test]
    fn test_missing_files_and_bad_config() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.json", r#"{"target": [1]}"#);
        let err = handle_analyze(&data, &dir.path().join("nope.json"), false, "", "").unwrap_err();
        assert!(err.to_string().starts_with("config file not found"));

        let config = write(&dir, "config.json", r#"{"analyzer": "bleu"}"#);
        let err = handle_analyze(&data, &config, false, "", "").unwrap_err();
        assert_eq!(err.to_string(), "Analyzer 'bleu' not found in registry");

        let empty = write(&dir, "empty.json", "[]");
        assert!(handle_analyze(&data, &empty, false, "", "").is_err());
    }

    #[test]
    fn test_metrics_listing() {
        let listing = handle_metrics();
        assert!(listing
            .lines()
            .any(|l| l.starts_with("accuracy") && l.ends_with("classification")));
        assert!(listing.lines().any(|l| l.starts_with("content") && l.ends_with('-')));
    }
}
