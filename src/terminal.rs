//! Prompt engine backed by the terminal.
//!
//! Keys are read on a blocking thread with the terminal in raw mode. The
//! reader polls a cancel flag between key events so a live confirm can be
//! torn down from another task.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use ratatui::crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use tokio::sync::watch;
use tracing::debug;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::descriptor::{
    ConfirmationDescriptor, InputDescriptor, PromptRenderContext, Question, RawAnswer,
};
use crate::engine::{Answers, LivePrompt, PromptEngine};
use crate::error::{PromptError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalEngine;

impl TerminalEngine {
    pub fn new() -> Self {
        TerminalEngine
    }
}

#[async_trait]
impl PromptEngine for TerminalEngine {
    async fn prompt(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();
        for question in questions {
            match question {
                Question::Confirm(descriptor) => {
                    let live = TerminalConfirm::new(descriptor.clone());
                    answers.insert(descriptor.name(), live.run().await?);
                }
                Question::Input(descriptor) => {
                    let descriptor = descriptor.clone();
                    let name = descriptor.name().to_string();
                    let text = tokio::task::spawn_blocking(move || read_input(&descriptor))
                        .await
                        .map_err(|e| PromptError::Engine(e.to_string()))??;
                    answers.insert(name, text);
                }
            }
        }
        Ok(answers)
    }

    fn confirm(&self, descriptor: ConfirmationDescriptor) -> Arc<dyn LivePrompt> {
        Arc::new(TerminalConfirm::new(descriptor))
    }
}

/// A confirm prompt drawn on the current terminal line.
pub struct TerminalConfirm {
    descriptor: ConfirmationDescriptor,
    cancelled: Arc<AtomicBool>,
    running: Arc<watch::Sender<bool>>,
}

impl TerminalConfirm {
    pub fn new(descriptor: ConfirmationDescriptor) -> Self {
        let (running, _) = watch::channel(false);
        TerminalConfirm {
            descriptor,
            cancelled: Arc::new(AtomicBool::new(false)),
            running: Arc::new(running),
        }
    }
}

#[async_trait]
impl LivePrompt for TerminalConfirm {
    async fn run(&self) -> Result<bool> {
        let descriptor = self.descriptor.clone();
        let cancelled = self.cancelled.clone();
        let running = self.running.clone();

        running.send_replace(true);
        tokio::task::spawn_blocking(move || {
            while_running(running, || read_confirm(&descriptor, &cancelled))
        })
        .await
        .map_err(|e| PromptError::Engine(e.to_string()))?
    }

    async fn cancel(&self) -> Result<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        let mut rx = self.running.subscribe();
        rx.wait_for(|running| !*running)
            .await
            .map_err(|e| PromptError::Engine(e.to_string()))?;
        debug!(prompt = self.descriptor.name(), "terminal confirm cancelled");
        Ok(())
    }
}

/// Clears the running flag when dropped, even if the reader panics.
struct RunningGuard(Arc<watch::Sender<bool>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

fn while_running<T>(running: Arc<watch::Sender<bool>>, read: impl FnOnce() -> T) -> T {
    let _running = RunningGuard(running);
    read()
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Submitted,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct ConfirmState {
    value: bool,
    status: Status,
}

impl PromptRenderContext for ConfirmState {
    fn is_submitted(&self) -> bool {
        self.status == Status::Submitted
    }

    fn current_value(&self) -> bool {
        self.value
    }

    fn style_submitted(&self, text: &str) -> String {
        text.cyan().to_string()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConfirmKey {
    Answer(bool),
    Submit,
    Interrupt,
    Ignore,
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn confirm_key(descriptor: &ConfirmationDescriptor, key: &KeyEvent) -> ConfirmKey {
    if is_interrupt(key) {
        return ConfirmKey::Interrupt;
    }
    match key.code {
        KeyCode::Enter => ConfirmKey::Submit,
        KeyCode::Char(c) => match descriptor.classify(&RawAnswer::Text(c.to_string())) {
            Some(answer) => ConfirmKey::Answer(answer),
            None => ConfirmKey::Ignore,
        },
        _ => ConfirmKey::Ignore,
    }
}

fn status_symbol(status: Status) -> colored::ColoredString {
    match status {
        Status::Pending => "?".cyan().bold(),
        Status::Submitted => "✔".green(),
        Status::Cancelled => "✖".red(),
    }
}

fn draw_confirm(
    out: &mut impl Write,
    descriptor: &ConfirmationDescriptor,
    state: &ConfirmState,
) -> io::Result<()> {
    execute!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!(
            "{} {} {} › {}",
            status_symbol(state.status),
            descriptor.message().bold(),
            descriptor.hint().dimmed(),
            descriptor.render(state)
        ))
    )
}

fn finish_line(out: &mut impl Write) -> io::Result<()> {
    execute!(out, Print("\r\n"))
}

fn read_confirm(descriptor: &ConfirmationDescriptor, cancelled: &AtomicBool) -> Result<bool> {
    if cancelled.load(Ordering::SeqCst) {
        return Err(PromptError::Cancelled);
    }

    let _guard = RawModeGuard::enable()?;
    let mut out = io::stdout();
    let mut state = ConfirmState {
        value: descriptor.initial(),
        status: Status::Pending,
    };
    draw_confirm(&mut out, descriptor, &state)?;

    loop {
        if cancelled.load(Ordering::SeqCst) {
            state.status = Status::Cancelled;
            draw_confirm(&mut out, descriptor, &state)?;
            finish_line(&mut out)?;
            return Err(PromptError::Cancelled);
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match confirm_key(descriptor, &key) {
            ConfirmKey::Answer(answer) => state.value = answer,
            ConfirmKey::Submit => {}
            ConfirmKey::Interrupt => {
                state.status = Status::Cancelled;
                draw_confirm(&mut out, descriptor, &state)?;
                finish_line(&mut out)?;
                return Err(PromptError::Interrupted);
            }
            ConfirmKey::Ignore => continue,
        }

        state.status = Status::Submitted;
        draw_confirm(&mut out, descriptor, &state)?;
        finish_line(&mut out)?;
        return Ok(state.value);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum InputStep {
    Pending,
    Submit(String),
    Interrupt,
}

/// Line editing for free-text questions. Submitting an empty line picks the
/// initial value.
#[derive(Debug)]
struct LineBuffer {
    initial: String,
    input: Input,
}

impl LineBuffer {
    fn new(initial: &str) -> Self {
        LineBuffer {
            initial: initial.to_string(),
            input: Input::default(),
        }
    }

    fn apply(&mut self, key: &KeyEvent) -> InputStep {
        if is_interrupt(key) {
            return InputStep::Interrupt;
        }
        if key.code == KeyCode::Enter {
            let value = self.input.value();
            if value.is_empty() {
                return InputStep::Submit(self.initial.clone());
            }
            return InputStep::Submit(value.to_string());
        }
        self.input.handle_event(&Event::Key(*key));
        InputStep::Pending
    }

    fn display(&self) -> String {
        if self.input.value().is_empty() {
            self.initial.dimmed().to_string()
        } else {
            self.input.value().to_string()
        }
    }

    /// Cursor offset in columns from the start of the typed text.
    fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }
}

fn draw_input(
    out: &mut impl Write,
    descriptor: &InputDescriptor,
    status: Status,
    shown: &str,
    cursor: usize,
) -> io::Result<()> {
    // "? " + message + " › "
    let prefix = 2 + descriptor.message().chars().count() + 3;
    let column = u16::try_from(prefix + cursor).unwrap_or(u16::MAX);
    execute!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!(
            "{} {} › {}",
            status_symbol(status),
            descriptor.message().bold(),
            shown
        )),
        MoveToColumn(column)
    )
}

fn read_input(descriptor: &InputDescriptor) -> Result<String> {
    let _guard = RawModeGuard::enable()?;
    let mut out = io::stdout();
    let mut buffer = LineBuffer::new(descriptor.initial());
    draw_input(&mut out, descriptor, Status::Pending, &buffer.display(), 0)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match buffer.apply(&key) {
            InputStep::Pending => {
                let cursor = buffer.cursor();
                draw_input(&mut out, descriptor, Status::Pending, &buffer.display(), cursor)?;
            }
            InputStep::Submit(text) => {
                let shown = text.cyan().to_string();
                draw_input(&mut out, descriptor, Status::Submitted, &shown, text.chars().count())?;
                finish_line(&mut out)?;
                return Ok(text);
            }
            InputStep::Interrupt => {
                let cursor = buffer.cursor();
                draw_input(&mut out, descriptor, Status::Cancelled, &buffer.display(), cursor)?;
                finish_line(&mut out)?;
                return Err(PromptError::Interrupted);
            }
        }
    }
}
