use askyn::descriptor::{ConfirmationDescriptor, Question, RawAnswer};
use askyn::engine::{Answers, LivePrompt, PromptEngine};
use askyn::error::{PromptError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted operator does when asked something.
#[derive(Debug, Clone)]
pub enum Reply {
    Raw(RawAnswer),
    /// Accept the question's default.
    Default,
    Interrupt,
    Fail(String),
}

impl Reply {
    fn into_error(self) -> Option<PromptError> {
        match self {
            Reply::Interrupt => Some(PromptError::Interrupted),
            Reply::Fail(msg) => Some(PromptError::Engine(msg)),
            _ => None,
        }
    }
}

/// Behaviour of live prompts handed out by [`ScriptedEngine::confirm`].
#[derive(Debug, Clone)]
pub enum Live {
    After(Duration, Reply),
    Never,
}

pub struct ScriptedPrompt {
    descriptor: ConfirmationDescriptor,
    live: Live,
    cancels: Arc<AtomicUsize>,
}

#[async_trait]
impl LivePrompt for ScriptedPrompt {
    async fn run(&self) -> Result<bool> {
        let (delay, reply) = match &self.live {
            Live::After(delay, reply) => (*delay, reply.clone()),
            Live::Never => return std::future::pending().await,
        };
        tokio::time::sleep(delay).await;
        match reply {
            Reply::Raw(raw) => self
                .descriptor
                .classify(&raw)
                .ok_or_else(|| PromptError::Engine(format!("unrecognised answer {:?}", raw))),
            Reply::Default => Ok(self.descriptor.initial()),
            other => Err(other.into_error().expect("error reply")),
        }
    }

    async fn cancel(&self) -> Result<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Reply>>,
    live: Live,
    asked: Mutex<Vec<Question>>,
    cancels: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    /// Engine answering batch prompts from `replies`, in order.
    pub fn batch(replies: Vec<Reply>) -> Self {
        ScriptedEngine {
            replies: Mutex::new(replies.into()),
            live: Live::Never,
            asked: Mutex::new(Vec::new()),
            cancels: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine whose live confirm prompts behave as `live`.
    pub fn live(live: Live) -> Self {
        ScriptedEngine {
            live,
            ..ScriptedEngine::batch(Vec::new())
        }
    }

    pub fn asked(&self) -> Vec<Question> {
        self.asked.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptEngine for ScriptedEngine {
    async fn prompt(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();
        for question in questions {
            self.asked.lock().unwrap().push(question.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Default);

            match (question, reply) {
                (Question::Confirm(d), Reply::Raw(raw)) => {
                    let answer = d.classify(&raw).ok_or_else(|| {
                        PromptError::Engine(format!("unrecognised answer {:?}", raw))
                    })?;
                    answers.insert(d.name(), answer);
                }
                (Question::Confirm(d), Reply::Default) => answers.insert(d.name(), d.initial()),
                (Question::Input(d), Reply::Raw(RawAnswer::Text(text))) => {
                    answers.insert(d.name(), text)
                }
                (Question::Input(d), Reply::Raw(RawAnswer::Bool(b))) => answers.insert(d.name(), b),
                (Question::Input(d), Reply::Default) => answers.insert(d.name(), d.initial()),
                (_, other) => return Err(other.into_error().expect("error reply")),
            }
        }
        Ok(answers)
    }

    fn confirm(&self, descriptor: ConfirmationDescriptor) -> Arc<dyn LivePrompt> {
        self.asked
            .lock()
            .unwrap()
            .push(Question::Confirm(descriptor.clone()));
        Arc::new(ScriptedPrompt {
            descriptor,
            live: self.live.clone(),
            cancels: self.cancels.clone(),
        })
    }
}
