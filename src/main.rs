//! Pricefetch - Entry Point
//!
//! Reads identifiers from the command line (or stdin as a JSON array), runs
//! one batch and prints the outcome as JSON on stdout.

use std::io::{IsTerminal, Read};
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pricefetch::config::{Config, LogConfig};
use pricefetch::models::FetchMode;
use pricefetch::proxy::{HttpConnector, ProxySessionManager, RotationPolicy};
use pricefetch::services::{BatchRunner, FetchOrchestrator, FetchPolicy, ProbePolicy};
use pricefetch::PriceFetchError;

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Args {
    api: bool,
    json_input: bool,
    identifiers: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    for arg in args {
        match arg.as_str() {
            "--api" => parsed.api = true,
            "--json-input" => parsed.json_input = true,
            _ => {
                let id = arg.trim();
                if !id.is_empty() {
                    parsed.identifiers.push(id.to_string());
                }
            }
        }
    }
    parsed
}

/// Identifiers from a JSON array; numbers are accepted alongside strings
fn parse_identifier_list(input: &str) -> Vec<String> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(input.trim()) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn read_stdin_identifiers() -> Vec<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Vec::new();
    }
    let mut input = String::new();
    match stdin.read_to_string(&mut input) {
        Ok(_) => parse_identifier_list(&input),
        Err(_) => Vec::new(),
    }
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pricefetch={}", log.level).into());

    // stdout is reserved for the JSON outcome
    let json = log.format == "json";
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let pretty_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = parse_args(std::env::args().skip(1));
    if args.json_input || args.identifiers.is_empty() {
        let from_stdin = read_stdin_identifiers();
        if !from_stdin.is_empty() {
            args.identifiers = from_stdin;
        }
    }

    if args.identifiers.is_empty() {
        println!(
            "{}",
            serde_json::json!({
                "success": false,
                "error": PriceFetchError::NoIdentifiers.to_string(),
            })
        );
        std::process::exit(1);
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let mode = if args.api {
        FetchMode::Api
    } else {
        config.target.mode
    };
    let target = config.target_site();
    info!(
        "Starting batch of {} identifiers ({} mode) via {}",
        args.identifiers.len(),
        mode,
        config.proxy.address()
    );

    let connector = Arc::new(HttpConnector::new().context("Failed to build HTTP client")?);
    let manager = ProxySessionManager::new(
        config.proxy.clone(),
        connector,
        target.root_url(),
        RotationPolicy::default(),
    )
    .context("Failed to build proxy session")?;

    let orchestrator = FetchOrchestrator::new(manager, target, mode, FetchPolicy::default());
    let mut runner = BatchRunner::new(orchestrator, config.batch.delay, ProbePolicy::default());

    let outcome = runner.run(&args.identifiers).await?;
    println!("{}", serde_json::to_string(&outcome)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(strings(&["--api", "123", " ", "456"]));
        assert!(args.api);
        assert!(!args.json_input);
        assert_eq!(args.identifiers, strings(&["123", "456"]));

        assert_eq!(parse_args(Vec::new()), Args::default());
    }

    #[test]
    fn test_parse_identifier_list() {
        assert_eq!(
            parse_identifier_list(r#"["111", 222, "", null, " 333 "]"#),
            strings(&["111", "222", "333"])
        );
        assert!(parse_identifier_list("not json").is_empty());
        assert!(parse_identifier_list(r#"{"sku": "1"}"#).is_empty());
        assert!(parse_identifier_list("").is_empty());
    }
}
