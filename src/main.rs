use askyn::cli::*;
use askyn::config::{Settings, load_settings};
use askyn::prompts::Prompter;
use askyn::terminal::TerminalEngine;
use colored::Colorize;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::process::exit;
use std::time::Duration;

fn initialize_tracing(log_level: &LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_filter_directive()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_answer(name: &str, answer: Option<bool>) {
    let shown = match answer {
        Some(true) => "yes".green(),
        Some(false) => "no".red(),
        None => "no answer".yellow(),
    };
    println!("{}: {}", name.cyan(), shown);
}

fn with_timeout(
    prompter: Prompter<TerminalEngine>,
    args: &TimeoutArgs,
) -> Prompter<TerminalEngine> {
    match args.timeout_ms {
        Some(ms) => prompter.with_consent_timeout(Duration::from_millis(ms)),
        None => prompter,
    }
}

pub async fn deps(prompter: &Prompter<TerminalEngine>, settings: &Settings, cmd: DepsCommand) {
    let use_yarn = cmd.yarn || settings.package_manager.use_yarn();
    let answer = prompter
        .confirm_recommended_deps_installation(&cmd.dependencies(), use_yarn)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: dependency prompt failed: {}", e);
            exit(1);
        });
    print_answer("shouldInstallPlugin", Some(answer));
}

pub async fn init(prompter: &Prompter<TerminalEngine>) {
    let project = prompter.confirm_project_creation().await.unwrap_or_else(|e| {
        eprintln!("Error: project prompt failed: {}", e);
        exit(1);
    });
    println!("{}: {}", "projectRoot".cyan(), project.project_root.green());
    print_answer("shouldAddGitIgnore", Some(project.should_add_git_ignore));
}

pub async fn telemetry(prompter: &Prompter<TerminalEngine>) {
    let answer = prompter.confirm_telemetry_consent().await.unwrap_or_else(|e| {
        eprintln!("Error: telemetry prompt failed: {}", e);
        exit(1);
    });
    print_answer("telemetryConsent", answer);
}

pub async fn extension(prompter: &Prompter<TerminalEngine>) {
    let answer = prompter
        .confirm_editor_extension_installation()
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: extension prompt failed: {}", e);
            exit(1);
        });
    print_answer("shouldInstallExtension", answer);
}

pub async fn ask(prompter: &Prompter<TerminalEngine>, cmd: &AskCommand) {
    let answer = prompter
        .confirm_with_timeout(&cmd.name, &cmd.message)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: prompt {} failed: {}", cmd.name.red(), e);
            exit(1);
        });
    print_answer(&cmd.name, answer);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    let settings = load_settings().unwrap_or_else(|e| {
        eprintln!("Error: cannot load config: {}", e);
        exit(1);
    });
    let prompter = Prompter::from_settings(TerminalEngine::new(), &settings);

    match cli.command {
        Commands::Deps(d) => deps(&prompter, &settings, d).await,
        Commands::Init => init(&prompter).await,
        Commands::Telemetry(t) => telemetry(&with_timeout(prompter, &t)).await,
        Commands::Extension(t) => extension(&with_timeout(prompter, &t)).await,
        Commands::Ask(a) => ask(&with_timeout(prompter, &a.timeout), &a).await,
    }
}
