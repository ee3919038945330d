//! Quit detection for running countdowns
//!
//! A countdown samples its [`QuitSignal`] once per tick. The terminal
//! implementation looks at key presses that arrived since the previous
//! sample, so a press is noticed at most one tick late. It keeps the
//! terminal in raw mode from the first sample until [`QuitSignal::end_polling`]
//! so typed keys are not echoed over the countdown line.
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub trait QuitSignal {
    fn quit_requested(&mut self) -> bool;

    /// Called once the countdown stops sampling, before it prints anything
    /// past the countdown line.
    fn end_polling(&mut self) {}
}

/// Ctrl-C state shared with the process signal handler.
///
/// While armed, Ctrl-C is recorded so the running session can wind down
/// and print its summary. While disarmed it exits the process right away.
#[derive(Clone, Default)]
pub struct Interrupt {
    armed: Arc<AtomicBool>,
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::default();
        let handler_state = interrupt.clone();

        ctrlc::set_handler(move || {
            if handler_state.armed.load(Ordering::SeqCst) {
                handler_state.requested.store(true, Ordering::SeqCst);
            } else {
                println!("\nGoodbye!");
                process::exit(0);
            }
        })?;

        Ok(interrupt)
    }

    pub fn arm(&self) {
        self.requested.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    /// Returns whether Ctrl-C was pressed since the last call.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

/// Quits on `q` (or Ctrl-C) typed in the controlling terminal.
pub struct KeyboardQuit {
    interrupt: Interrupt,
    poll_failed: bool,
    raw_mode: bool,
}

impl KeyboardQuit {
    pub fn new(interrupt: Interrupt) -> Self {
        Self {
            interrupt,
            poll_failed: false,
            raw_mode: false,
        }
    }

    fn key_pressed(&mut self) -> io::Result<bool> {
        if !self.raw_mode {
            terminal::enable_raw_mode()?;
            self.raw_mode = true;
        }
        drain_quit_keys()
    }
}

impl Drop for KeyboardQuit {
    fn drop(&mut self) {
        self.end_polling();
    }
}

impl QuitSignal for KeyboardQuit {
    fn quit_requested(&mut self) -> bool {
        if self.interrupt.take() {
            tracing::debug!("ctrl-c received during countdown");
            return true;
        }

        if self.poll_failed {
            return false;
        }

        match self.key_pressed() {
            Ok(pressed) => pressed,
            Err(err) => {
                // Without a terminal only Ctrl-C can stop the timer.
                self.end_polling();
                tracing::warn!(error = %err, "keyboard polling unavailable");
                self.poll_failed = true;
                false
            }
        }
    }

    fn end_polling(&mut self) {
        if !self.raw_mode {
            return;
        }
        self.raw_mode = false;
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!(error = %err, "could not restore terminal mode");
        }
    }
}

fn drain_quit_keys() -> io::Result<bool> {
    let mut pressed = false;
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            pressed |= is_quit_key(&key);
        }
    }
    Ok(pressed)
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}
