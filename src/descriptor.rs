//! Declarative descriptions of the questions asked during setup.
//!
//! A descriptor carries everything an engine needs to show a question and to
//! interpret whatever the operator typed. Confirmation descriptors always
//! default to "yes".

use std::fmt;

/// Hint shown next to every confirmation question.
pub const CONFIRM_HINT: &str = "(Y/n)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Confirm,
    Input,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::Confirm => write!(f, "confirm"),
            PromptKind::Input => write!(f, "input"),
        }
    }
}

/// An answer as the engine received it, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAnswer {
    Bool(bool),
    Text(String),
}

impl From<bool> for RawAnswer {
    fn from(value: bool) -> Self {
        RawAnswer::Bool(value)
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        RawAnswer::Text(value.to_string())
    }
}

impl From<String> for RawAnswer {
    fn from(value: String) -> Self {
        RawAnswer::Text(value)
    }
}

/// What a descriptor may ask of the engine while rendering.
pub trait PromptRenderContext {
    fn is_submitted(&self) -> bool;
    fn current_value(&self) -> bool;
    fn style_submitted(&self, text: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationDescriptor {
    name: String,
    message: String,
}

impl ConfirmationDescriptor {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfirmationDescriptor {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        PromptKind::Confirm
    }

    /// Key under which the answer is recorded.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn initial(&self) -> bool {
        true
    }

    pub fn hint(&self) -> &'static str {
        CONFIRM_HINT
    }

    pub fn is_true(&self, raw: &RawAnswer) -> bool {
        match raw {
            RawAnswer::Bool(b) => *b,
            RawAnswer::Text(s) => s.to_lowercase() == "y",
        }
    }

    pub fn is_false(&self, raw: &RawAnswer) -> bool {
        match raw {
            RawAnswer::Bool(b) => !*b,
            RawAnswer::Text(s) => s.to_lowercase() == "n",
        }
    }

    /// `None` when the raw answer is neither a yes nor a no.
    pub fn classify(&self, raw: &RawAnswer) -> Option<bool> {
        if self.is_true(raw) {
            Some(true)
        } else if self.is_false(raw) {
            Some(false)
        } else {
            None
        }
    }

    pub fn render(&self, ctx: &dyn PromptRenderContext) -> String {
        let value = if ctx.current_value() { "y" } else { "n" };
        if ctx.is_submitted() {
            return ctx.style_submitted(value);
        }
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    name: String,
    message: String,
    initial: String,
}

impl InputDescriptor {
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        initial: impl Into<String>,
    ) -> Self {
        InputDescriptor {
            name: name.into(),
            message: message.into(),
            initial: initial.into(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        PromptKind::Input
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn initial(&self) -> &str {
        &self.initial
    }
}

/// One entry of a multi-question prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Confirm(ConfirmationDescriptor),
    Input(InputDescriptor),
}

impl Question {
    pub fn name(&self) -> &str {
        match self {
            Question::Confirm(d) => d.name(),
            Question::Input(d) => d.name(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        match self {
            Question::Confirm(_) => PromptKind::Confirm,
            Question::Input(_) => PromptKind::Input,
        }
    }
}

impl From<ConfirmationDescriptor> for Question {
    fn from(descriptor: ConfirmationDescriptor) -> Self {
        Question::Confirm(descriptor)
    }
}

impl From<InputDescriptor> for Question {
    fn from(descriptor: InputDescriptor) -> Self {
        Question::Input(descriptor)
    }
}
