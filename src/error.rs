use thiserror::Error;

/// Failures raised by a prompt engine.
///
/// `Interrupted` is the only variant the caller-facing prompts recover from;
/// everything else is handed back to the caller untouched.
#[derive(Error, Debug)]
pub enum PromptError {
    /// The operator force-quit the prompt (Ctrl-C).
    #[error("prompt interrupted")]
    Interrupted,

    #[error("prompt cancelled")]
    Cancelled,

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed answers: {0}")]
    MalformedAnswers(#[from] serde_json::Error),

    #[error("no answer recorded for `{0}`")]
    MissingAnswer(String),

    #[error("prompt engine error: {0}")]
    Engine(String),
}

impl PromptError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, PromptError::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;
