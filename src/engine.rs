//! The seam between the setup prompts and whatever actually talks to the
//! operator.
//!
//! An engine can either answer a batch of declarative questions in one pass
//! or hand out a live confirm prompt that is run and cancelled explicitly.
//! The terminal implementation lives in [`crate::terminal`]; tests plug in
//! scripted engines.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::descriptor::{ConfirmationDescriptor, Question};
use crate::error::{PromptError, Result};

/// A running confirm prompt.
///
/// `run` suspends until the operator answers or the prompt is interrupted.
/// `cancel` may be called while `run` is still pending, from another task,
/// and must release the terminal before it returns.
#[async_trait]
pub trait LivePrompt: Send + Sync {
    async fn run(&self) -> Result<bool>;

    async fn cancel(&self) -> Result<()>;
}

#[async_trait]
pub trait PromptEngine: Send + Sync {
    /// Ask every question in order and collect the answers by name.
    async fn prompt(&self, questions: &[Question]) -> Result<Answers>;

    /// Build a live confirm prompt without starting it.
    fn confirm(&self, descriptor: ConfirmationDescriptor) -> Arc<dyn LivePrompt>;
}

/// Answers collected by [`PromptEngine::prompt`], keyed by question name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(Map<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match self.0.get(name) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(PromptError::Engine(format!(
                "answer `{}` is not a boolean: {}",
                name, other
            ))),
            None => Err(PromptError::MissingAnswer(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize the whole answer set into a typed result.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }
}

impl FromIterator<(String, Value)> for Answers {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Answers(iter.into_iter().collect())
    }
}
