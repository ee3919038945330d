//! Test doubles shared by the unit tests.
use crate::audio::{AudioError, AudioPlayer};
use crate::clock::Clock;
use crate::signal::QuitSignal;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Clock that only moves when slept on. Each sleep overshoots by `lag`.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    lag: Duration,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn with_lag(lag: Duration) -> Self {
        Self {
            lag,
            ..Self::default()
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.now.set(self.now.get() + duration + self.lag);
    }
}

/// Asks to quit on the given (1-based) query and never otherwise.
pub struct ScriptedQuit {
    quit_on: Option<usize>,
    pub queries: usize,
    /// Queries made before `end_polling` was called, per call.
    pub ended_after: Vec<usize>,
}

impl ScriptedQuit {
    pub fn never() -> Self {
        Self {
            quit_on: None,
            queries: 0,
            ended_after: Vec::new(),
        }
    }

    pub fn on_query(query: usize) -> Self {
        Self {
            quit_on: Some(query),
            queries: 0,
            ended_after: Vec::new(),
        }
    }
}

impl QuitSignal for ScriptedQuit {
    fn quit_requested(&mut self) -> bool {
        self.queries += 1;
        self.quit_on == Some(self.queries)
    }

    fn end_polling(&mut self) {
        self.ended_after.push(self.queries);
    }
}

#[derive(Default)]
pub struct RecordingPlayer {
    fail_load: bool,
    pub loaded: Vec<PathBuf>,
    pub plays: usize,
}

impl RecordingPlayer {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }
}

impl AudioPlayer for RecordingPlayer {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        if self.fail_load {
            return Err(AudioError::NotFound(path.to_path_buf()));
        }
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.plays += 1;
        Ok(())
    }
}
