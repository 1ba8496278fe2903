use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::prompts::Dependencies;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level for messages written to stderr
    #[arg(long = "log-level", value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask whether to install missing dependencies
    #[command()]
    Deps(DepsCommand),

    /// Ask for the project root and whether to add a .gitignore
    #[command()]
    Init,

    /// Ask for anonymous usage data consent
    #[command()]
    Telemetry(TimeoutArgs),

    /// Ask whether to install the editor extension
    #[command(visible_alias = "ext")]
    Extension(TimeoutArgs),

    /// Ask any yes/no question, giving up after a timeout
    #[command()]
    Ask(AskCommand),
}

#[derive(Parser)]
pub struct DepsCommand {
    /// Install with yarn instead of npm
    #[arg(long = "yarn", action = ArgAction::SetTrue)]
    pub yarn: bool,

    /// Packages as NAME or NAME@VERSION
    #[arg(required = true)]
    pub packages: Vec<String>,
}

impl DepsCommand {
    pub fn dependencies(&self) -> Dependencies {
        self.packages.iter().map(|p| parse_dependency(p)).collect()
    }
}

#[derive(Parser)]
pub struct TimeoutArgs {
    /// Milliseconds to wait for an answer (overrides the config file)
    #[arg(short = 't', long = "timeout-ms", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,
}

#[derive(Parser)]
pub struct AskCommand {
    /// Key the answer is recorded under
    #[arg()]
    pub name: String,

    /// Question shown to the operator
    #[arg()]
    pub message: String,

    #[command(flatten)]
    pub timeout: TimeoutArgs,
}

/// Split `NAME@VERSION`; a leading `@` belongs to a scoped package name.
/// A bare name gets the `*` constraint.
pub fn parse_dependency(spec: &str) -> (String, String) {
    match spec.rfind('@') {
        Some(at) if at > 0 => (spec[..at].to_string(), spec[at + 1..].to_string()),
        _ => (spec.to_string(), "*".to_string()),
    }
}
