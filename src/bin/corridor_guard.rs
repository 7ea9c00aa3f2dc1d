//! Screens text through the guardrail pipeline from the command line.
//!
//! Usage:
//!
//! ```text
//! corridor-guard [--config corridor.yaml] [--phase input|output] [--all] [TEXT]
//! ```
//!
//! When `TEXT` is omitted it is read from stdin. Verdicts are printed to
//! stdout as a JSON array. The exit status is 0 when every verdict passed,
//! 1 when any failed, and 2 on usage or configuration errors.

use clap::{Parser, ValueEnum};
use corridor::config::CorridorConfig;
use corridor::guardrail::{
    CheckContext, Enforcement, GuardrailManager, GuardrailPhase, GuardrailVerdict,
};
use corridor::intent::IntentClassifier;
use corridor::telemetry::{TelemetryError, init_tracing};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum GuardError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] corridor::config::ConfigError),
    #[error("failed to build guardrails: {0}")]
    Guardrail(#[from] corridor::guardrail::GuardrailError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build intent rules: {0}")]
    Intent(#[from] corridor::intent::IntentRuleError),
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to write verdicts: {0}")]
    Output(#[source] io::Error),
    #[error("failed to encode verdicts: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhaseArg {
    Input,
    Output,
}

impl From<PhaseArg> for GuardrailPhase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Input => Self::Input,
            PhaseArg::Output => Self::Output,
        }
    }
}

/// Screen text with the corridor guardrail pipeline.
#[derive(Debug, Parser)]
#[command(name = "corridor-guard", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, env = "CORRIDOR_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Phase whose checks run.
    #[arg(short, long, value_enum, default_value = "input")]
    phase: PhaseArg,

    /// Report every check instead of stopping at the first failure.
    #[arg(long)]
    all: bool,

    /// Text to screen; read from stdin when omitted.
    text: Option<String>,
}

fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::from(1)),
        Err(err) => {
            writeln!(io::stderr(), "corridor-guard: {err}")?;
            Ok(ExitCode::from(2))
        }
    }
}

fn run(cli: Cli) -> Result<bool, GuardError> {
    let config = cli
        .config
        .as_ref()
        .map_or_else(|| Ok(CorridorConfig::default()), CorridorConfig::load)?;
    keep_existing_subscriber(init_tracing(&config.logging))?;

    let text = cli.text.map_or_else(read_stdin, Ok)?;
    let classifier = Arc::new(IntentClassifier::new()?);
    let configured = GuardrailManager::from_config(&config.guardrails, classifier)?;
    let manager = if cli.all {
        configured.with_fail_fast(false)
    } else {
        configured
    };
    let phase = GuardrailPhase::from(cli.phase);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(GuardError::RuntimeInit)?;
    let verdicts = runtime.block_on(manager.check(
        &text,
        phase,
        &CheckContext::new(),
        Enforcement::Enforced,
    ));

    write_verdicts(&verdicts)?;
    Ok(verdicts.iter().all(GuardrailVerdict::passed))
}

/// Tolerates a subscriber installed by a wrapper process; a malformed
/// filter is fatal.
fn keep_existing_subscriber(installed: Result<(), TelemetryError>) -> Result<(), GuardError> {
    match installed {
        Err(TelemetryError::AlreadyInitialised(_)) => {
            info!("using existing tracing subscriber");
            Ok(())
        }
        other => other.map_err(GuardError::from),
    }
}

fn read_stdin() -> Result<String, GuardError> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(GuardError::Stdin)?;
    Ok(text)
}

fn write_verdicts(verdicts: &[GuardrailVerdict]) -> Result<(), GuardError> {
    let json = serde_json::to_string_pretty(verdicts)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").map_err(GuardError::Output)
}
