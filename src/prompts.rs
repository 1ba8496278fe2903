//! The confirmations asked during project setup.
//!
//! The opt-in questions (telemetry, editor extension) must never hang the
//! CLI, so they race the live prompt against a timer. The remaining prompts
//! wait for the operator as long as it takes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Settings;
use crate::descriptor::{ConfirmationDescriptor, InputDescriptor, Question};
use crate::engine::PromptEngine;
use crate::error::{PromptError, Result};

/// How long the opt-in questions wait for an answer.
pub const CONSENT_TIMEOUT: Duration = Duration::from_secs(10);

pub const TELEMETRY_CONSENT_NAME: &str = "telemetryConsent";
pub const TELEMETRY_CONSENT_MESSAGE: &str =
    "Help us improve this tool with anonymous crash reports & basic usage data?";

pub const EXTENSION_INSTALL_NAME: &str = "shouldInstallExtension";
pub const EXTENSION_INSTALL_MESSAGE: &str = "Would you like to install the editor extension? It adds advanced editing assistance for Solidity to VSCode";

const DEPS_INSTALL_NAME: &str = "shouldInstallPlugin";
const PROJECT_ROOT_NAME: &str = "projectRoot";
const GITIGNORE_NAME: &str = "shouldAddGitIgnore";

/// Result of a confirmation raced against a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Answered(bool),
    TimedOut,
}

impl PromptOutcome {
    pub fn answer(self) -> Option<bool> {
        match self {
            PromptOutcome::Answered(b) => Some(b),
            PromptOutcome::TimedOut => None,
        }
    }
}

impl From<PromptOutcome> for Option<bool> {
    fn from(outcome: PromptOutcome) -> Self {
        outcome.answer()
    }
}

/// Package name to version constraint, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(Vec<(String, String)>);

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-inserting a name replaces its version and keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        let version = version.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = version,
            None => self.0.push((name, version)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dependencies {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut deps = Dependencies::new();
        for (name, version) in iter {
            deps.insert(name, version);
        }
        deps
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreation {
    pub project_root: String,
    pub should_add_git_ignore: bool,
}

pub fn deps_installation_message(deps: &Dependencies, use_yarn: bool) -> String {
    let package_manager = if use_yarn { "yarn" } else { "npm" };
    format!(
        "Do you want to install this sample project's dependencies with {} ({})?",
        package_manager,
        deps.names().collect::<Vec<_>>().join(" ")
    )
}

/// Ask whether the missing dependencies should be installed.
///
/// A Ctrl-C counts as "no".
pub async fn confirm_recommended_deps_installation<E: PromptEngine + ?Sized>(
    engine: &E,
    deps: &Dependencies,
    use_yarn: bool,
) -> Result<bool> {
    let question = ConfirmationDescriptor::new(
        DEPS_INSTALL_NAME,
        deps_installation_message(deps, use_yarn),
    );

    match engine.prompt(&[question.into()]).await {
        Ok(answers) => answers.get_bool(DEPS_INSTALL_NAME),
        Err(PromptError::Interrupted) => {
            debug!("dependency installation prompt interrupted, treating as declined");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Ask for the project root (defaulting to the current directory) and
/// whether to add a `.gitignore`.
pub async fn confirm_project_creation<E: PromptEngine + ?Sized>(
    engine: &E,
) -> Result<ProjectCreation> {
    let cwd = std::env::current_dir()?;
    confirm_project_creation_in(engine, &cwd).await
}

pub async fn confirm_project_creation_in<E: PromptEngine + ?Sized>(
    engine: &E,
    default_root: &Path,
) -> Result<ProjectCreation> {
    let questions: [Question; 2] = [
        InputDescriptor::new(
            PROJECT_ROOT_NAME,
            "Project root:",
            default_root.display().to_string(),
        )
        .into(),
        ConfirmationDescriptor::new(GITIGNORE_NAME, "Do you want to add a .gitignore?").into(),
    ];

    engine.prompt(&questions).await?.into_typed()
}

/// `None` means the operator did not answer in time (or pressed Ctrl-C).
pub async fn confirm_telemetry_consent<E: PromptEngine + ?Sized>(
    engine: &E,
) -> Result<Option<bool>> {
    confirmation_prompt_with_timeout(
        engine,
        TELEMETRY_CONSENT_NAME,
        TELEMETRY_CONSENT_MESSAGE,
        CONSENT_TIMEOUT,
    )
    .await
}

/// `Some(true)` installs the extension, `Some(false)` means don't install
/// and don't ask again, `None` means don't install now but maybe ask next
/// time something changes.
pub async fn confirm_editor_extension_installation<E: PromptEngine + ?Sized>(
    engine: &E,
) -> Result<Option<bool>> {
    confirmation_prompt_with_timeout(
        engine,
        EXTENSION_INSTALL_NAME,
        EXTENSION_INSTALL_MESSAGE,
        CONSENT_TIMEOUT,
    )
    .await
}

/// Ask a yes/no question, giving up after `timeout`.
///
/// An interrupt is reported as `None`, the same as running out of time.
pub async fn confirmation_prompt_with_timeout<E: PromptEngine + ?Sized>(
    engine: &E,
    name: &str,
    message: &str,
    timeout: Duration,
) -> Result<Option<bool>> {
    match race_confirmation(engine, name, message, timeout).await {
        Ok(outcome) => Ok(outcome.answer()),
        Err(PromptError::Interrupted) => {
            debug!(prompt = name, "timed confirmation interrupted");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Race a live confirm prompt against a timer.
///
/// Must be called from within a tokio runtime. The prompt is polled inline
/// ahead of the timer, so when both are ready on the same tick the prompt
/// wins. A prompt that loses is moved onto a detached task and cancelled;
/// whatever it resolves to afterwards is dropped.
pub async fn race_confirmation<E: PromptEngine + ?Sized>(
    engine: &E,
    name: &str,
    message: &str,
    timeout: Duration,
) -> Result<PromptOutcome> {
    let prompt = engine.confirm(ConfirmationDescriptor::new(name, message));

    let runner = Arc::clone(&prompt);
    let mut run = Box::pin(async move { runner.run().await });

    let settled = tokio::select! {
        biased;
        answer = &mut run => Some(answer),
        _ = tokio::time::sleep(timeout) => None,
    };

    match settled {
        Some(answer) => {
            let answer = answer?;
            debug!(prompt = name, answer, "confirmation answered before timeout");
            Ok(PromptOutcome::Answered(answer))
        }
        None => {
            info!(
                prompt = name,
                timeout_ms = %timeout.as_millis(),
                "confirmation timed out"
            );
            // detached: the late result is never read
            drop(tokio::spawn(run));
            prompt.cancel().await?;
            Ok(PromptOutcome::TimedOut)
        }
    }
}

/// Owns an engine and the consent timeout used by the opt-in questions.
pub struct Prompter<E> {
    engine: E,
    consent_timeout: Duration,
}

impl<E: PromptEngine> Prompter<E> {
    pub fn new(engine: E) -> Self {
        Prompter {
            engine,
            consent_timeout: CONSENT_TIMEOUT,
        }
    }

    pub fn from_settings(engine: E, settings: &Settings) -> Self {
        Prompter::new(engine).with_consent_timeout(settings.consent_timeout())
    }

    pub fn with_consent_timeout(mut self, timeout: Duration) -> Self {
        self.consent_timeout = timeout;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn consent_timeout(&self) -> Duration {
        self.consent_timeout
    }

    pub async fn confirm_recommended_deps_installation(
        &self,
        deps: &Dependencies,
        use_yarn: bool,
    ) -> Result<bool> {
        confirm_recommended_deps_installation(&self.engine, deps, use_yarn).await
    }

    pub async fn confirm_project_creation(&self) -> Result<ProjectCreation> {
        confirm_project_creation(&self.engine).await
    }

    pub async fn confirm_telemetry_consent(&self) -> Result<Option<bool>> {
        self.confirm_with_timeout(TELEMETRY_CONSENT_NAME, TELEMETRY_CONSENT_MESSAGE)
            .await
    }

    pub async fn confirm_editor_extension_installation(&self) -> Result<Option<bool>> {
        self.confirm_with_timeout(EXTENSION_INSTALL_NAME, EXTENSION_INSTALL_MESSAGE)
            .await
    }

    pub async fn confirm_with_timeout(&self, name: &str, message: &str) -> Result<Option<bool>> {
        confirmation_prompt_with_timeout(&self.engine, name, message, self.consent_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Answers, LivePrompt};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers after `delay`, or never when `delay` is `None`.
    struct SlowPrompt {
        delay: Option<Duration>,
        answer: bool,
        cancels: AtomicUsize,
    }

    #[async_trait]
    impl LivePrompt for SlowPrompt {
        async fn run(&self) -> Result<bool> {
            match self.delay {
                Some(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(self.answer)
                }
                None => std::future::pending().await,
            }
        }

        async fn cancel(&self) -> Result<()> {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct SlowEngine {
        live: Arc<SlowPrompt>,
        asked: Mutex<Vec<ConfirmationDescriptor>>,
    }

    impl SlowEngine {
        fn new(delay: Option<Duration>, answer: bool) -> Self {
            SlowEngine {
                live: Arc::new(SlowPrompt {
                    delay,
                    answer,
                    cancels: AtomicUsize::new(0),
                }),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn cancels(&self) -> usize {
            self.live.cancels.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PromptEngine for SlowEngine {
        async fn prompt(&self, _questions: &[Question]) -> Result<Answers> {
            Err(PromptError::Engine("not scripted".to_string()))
        }

        fn confirm(&self, descriptor: ConfirmationDescriptor) -> Arc<dyn LivePrompt> {
            self.asked.lock().unwrap().push(descriptor);
            self.live.clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_wins_and_cancels_once() {
        let engine = SlowEngine::new(None, true);
        let start = tokio::time::Instant::now();

        let outcome = race_confirmation(&engine, "q", "Question?", Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(outcome, PromptOutcome::TimedOut);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(60), "{:?}", elapsed);
        assert_eq!(engine.cancels(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_wins_without_cancel() {
        let engine = SlowEngine::new(Some(Duration::from_millis(10)), true);

        let outcome = race_confirmation(&engine, "q", "Question?", Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(outcome, PromptOutcome::Answered(true));
        assert_eq!(engine.cancels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_on_the_deadline_tick_wins() {
        let engine = SlowEngine::new(Some(Duration::from_millis(50)), true);

        let outcome = race_confirmation(&engine, "q", "Question?", Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(outcome, PromptOutcome::Answered(true));
        assert_eq!(engine.cancels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_answer_does_not_change_result() {
        let engine = SlowEngine::new(Some(Duration::from_millis(80)), true);

        let answer = confirmation_prompt_with_timeout(
            &engine,
            "q",
            "Question?",
            Duration::from_millis(50),
        )
        .await
        .unwrap();
        assert_eq!(answer, None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.cancels(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_builds_descriptor_from_arguments() {
        let engine = SlowEngine::new(Some(Duration::from_millis(1)), false);

        let prompter = Prompter::new(engine).with_consent_timeout(Duration::from_millis(20));
        assert_eq!(prompter.confirm_telemetry_consent().await.unwrap(), Some(false));

        let asked = prompter.engine().asked.lock().unwrap().clone();
        assert_eq!(
            asked,
            vec![ConfirmationDescriptor::new(
                TELEMETRY_CONSENT_NAME,
                TELEMETRY_CONSENT_MESSAGE
            )]
        );
    }

    #[test]
    fn test_default_consent_timeout() {
        let prompter = Prompter::new(SlowEngine::new(None, true));
        assert_eq!(prompter.consent_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_dependencies_keep_insertion_order() {
        let mut deps: Dependencies = [("zod", "^3.0.0"), ("chai", "^4.2.0")].into_iter().collect();
        deps.insert("axios", "^1.0.0");
        deps.insert("zod", "^3.1.0");

        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["zod", "chai", "axios"]);
        assert_eq!(deps.iter().next(), Some(("zod", "^3.1.0")));
        assert_eq!(
            deps_installation_message(&deps, true),
            "Do you want to install this sample project's dependencies with yarn (zod chai axios)?"
        );
    }

    #[test]
    fn test_outcome_into_option() {
        assert_eq!(Option::<bool>::from(PromptOutcome::Answered(false)), Some(false));
        assert_eq!(Option::<bool>::from(PromptOutcome::TimedOut), None);
    }
}
