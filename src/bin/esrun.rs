//! Command line runner for ECMAScript 5 scripts
//!
//! Usage: esrun [options] (<script.js> | -e <code>)
//!
//! Options:
//!   --max-depth <n>    Maximum call depth (default: 10000)
//!   --strict           Run the program as strict-mode code
//!   --config <file>    Load settings from a JSON file
//!   --json             Print the completion value as JSON
//!   -e <code>          Evaluate code from the command line
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::env;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use esrun::platform::{StdConsoleProvider, StdTimeProvider};
use esrun::{EvalResult, JsValue, Runtime, Settings, describe, to_json};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

enum Source {
    File(PathBuf),
    Inline(String),
}

/// CLI configuration
struct Config {
    source: Source,
    config_file: Option<PathBuf>,
    max_depth: Option<usize>,
    strict: bool,
    json: bool,
}

fn usage(program_name: &str) -> String {
    format!(
        "Usage: {program_name} [--max-depth <n>] [--strict] [--config <file>] [--json] (<script.js> | -e <code>)"
    )
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("esrun", |s| s.as_str());

    let mut source: Option<Source> = None;
    let mut config_file = None;
    let mut max_depth = None;
    let mut strict = false;
    let mut json = false;

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--max-depth" => {
                max_depth = Some(
                    rest.next()
                        .ok_or_else(|| "--max-depth requires a value".to_string())?
                        .parse::<usize>()
                        .map_err(|_| "--max-depth must be a positive integer".to_string())?,
                );
            }
            "--config" => {
                let path = rest
                    .next()
                    .ok_or_else(|| "--config requires a file".to_string())?;
                config_file = Some(PathBuf::from(path));
            }
            "--strict" => strict = true,
            "--json" => json = true,
            "-e" => {
                let code = rest.next().ok_or_else(|| "-e requires code".to_string())?;
                source = Some(Source::Inline(code.clone()));
            }
            "-h" | "--help" => return Err(usage(program_name)),
            other if other.starts_with('-') => return Err(format!("Unknown option: {other}")),
            path => source = Some(Source::File(PathBuf::from(path))),
        }
    }

    let source = source.ok_or_else(|| usage(program_name))?;
    Ok(Config {
        source,
        config_file,
        max_depth,
        strict,
        json,
    })
}

fn load_settings(config: &Config) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &config.config_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<Settings>(&text).map_err(esrun::JsError::from)?
        }
        None => Settings::default(),
    };
    if let Some(depth) = config.max_depth {
        settings.max_call_depth = depth;
    }
    settings.strict |= config.strict;
    Ok(settings)
}

/// Returns whether the program completed normally
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    let settings = load_settings(&config)?;
    tracing::debug!(?settings, "settings loaded");

    let source = match &config.source {
        Source::File(path) => fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?,
        Source::Inline(code) => code.clone(),
    };

    let mut runtime = Runtime::with_providers(
        settings,
        Rc::new(StdTimeProvider::new()),
        Rc::new(StdConsoleProvider::new()),
    );
    match runtime.eval(&source)? {
        EvalResult::Normal(value) => {
            if config.json {
                println!("{}", serde_json::to_string_pretty(&to_json(&value))?);
            } else if !value.is_undefined() {
                println!("{}", display(&value));
            }
            Ok(true)
        }
        EvalResult::Throw(value) => {
            eprintln!("Uncaught {}", describe(&value));
            Ok(false)
        }
    }
}

fn display(value: &JsValue) -> String {
    match value {
        JsValue::String(s) => s.to_string(),
        JsValue::Object(_) => serde_json::to_string(&to_json(value)).unwrap_or_else(|_| describe(value)),
        other => other.to_string_primitive().to_string(),
    }
}
