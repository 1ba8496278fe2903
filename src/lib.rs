pub mod cli;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod prompts;
pub mod terminal;

pub use descriptor::{
    ConfirmationDescriptor, InputDescriptor, PromptRenderContext, Question, RawAnswer,
};
pub use engine::{Answers, LivePrompt, PromptEngine};
pub use error::{PromptError, Result};
pub use prompts::{
    CONSENT_TIMEOUT, Dependencies, ProjectCreation, PromptOutcome, Prompter,
    confirm_editor_extension_installation, confirm_project_creation,
    confirm_recommended_deps_installation, confirm_telemetry_consent,
    confirmation_prompt_with_timeout,
};
