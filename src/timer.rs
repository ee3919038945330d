//! Timer module for handling Pomodoro phases
use crate::audio::{AudioPlayer, Playback, play_alert};
use crate::clock::Clock;
use crate::signal::QuitSignal;
use std::io::{self, Write};
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

pub const TICK: Duration = Duration::from_secs(1);

/// Time given to the alert to start before control returns.
pub const ALERT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    StoppedEarly,
}

/// One labeled countdown.
#[derive(Debug, Clone)]
pub struct PhasePlan<'a> {
    pub minutes: NonZeroU32,
    pub label: &'a str,
    pub audio_path: &'a Path,
    pub header: Option<String>,
}

pub trait PhaseTimer {
    fn run_phase(&mut self, plan: &PhasePlan<'_>, out: &mut dyn Write) -> io::Result<Outcome>;
}

pub struct Timer<C, Q, A> {
    clock: C,
    quit: Q,
    audio: Option<A>,
}

impl<C: Clock, Q: QuitSignal, A: AudioPlayer> Timer<C, Q, A> {
    pub fn new(clock: C, quit: Q, audio: A) -> Self {
        Self {
            clock,
            quit,
            audio: Some(audio),
        }
    }

    /// Skips the completion alert and its delay.
    pub fn without_sound(mut self) -> Self {
        self.audio = None;
        self
    }

    /// Counts `plan.minutes` down to zero, one frame per tick.
    ///
    /// Remaining time is recomputed from the clock after every tick, so
    /// oversleeping shortens the number of frames instead of stretching
    /// the phase.
    pub fn countdown(&mut self, plan: &PhasePlan<'_>, out: &mut dyn Write) -> io::Result<Outcome> {
        let total = duration_from_minutes(plan.minutes);

        if let Some(header) = &plan.header {
            writeln!(out, "{header}")?;
        }
        tracing::info!(label = plan.label, minutes = plan.minutes.get(), "phase started");

        let start = self.clock.now();
        let mut remaining = remaining_seconds(total, Duration::ZERO);

        while remaining > 0 {
            if self.quit.quit_requested() {
                self.quit.end_polling();
                writeln!(out, "\nTimer stopped by user.")?;
                out.flush()?;
                tracing::info!(label = plan.label, remaining, "phase stopped early");
                return Ok(Outcome::StoppedEarly);
            }

            write_frame(out, plan.label, remaining)?;
            self.clock.sleep(TICK);

            let elapsed = self.clock.now().saturating_sub(start);
            remaining = remaining_seconds(total, elapsed);
        }
        self.quit.end_polling();

        write_frame(out, plan.label, 0)?;
        clear_frame(out, plan.label)?;
        writeln!(out, "{} complete!", plan.label)?;
        out.flush()?;
        tracing::info!(label = plan.label, "phase completed");

        if let Some(audio) = self.audio.as_mut() {
            match play_alert(audio, plan.audio_path) {
                Playback::Played => self.clock.sleep(ALERT_DELAY),
                Playback::PlaybackFailed(reason) => {
                    writeln!(out, "Could not play sound: {reason}")?;
                }
            }
        }

        Ok(Outcome::Completed)
    }
}

impl<C: Clock, Q: QuitSignal, A: AudioPlayer> PhaseTimer for Timer<C, Q, A> {
    fn run_phase(&mut self, plan: &PhasePlan<'_>, out: &mut dyn Write) -> io::Result<Outcome> {
        self.countdown(plan, out)
    }
}

pub fn duration_from_minutes(minutes: NonZeroU32) -> Duration {
    Duration::from_secs(u64::from(minutes.get()) * 60)
}

/// Whole seconds left, rounded up so a partially elapsed second still shows.
pub fn remaining_seconds(total: Duration, elapsed: Duration) -> u64 {
    let left = total.saturating_sub(elapsed);
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

fn frame(label: &str, remaining: u64) -> String {
    format!(
        "{}: {:02}:{:02} (Press 'q' to quit)",
        label,
        remaining / 60,
        remaining % 60
    )
}

fn write_frame(out: &mut dyn Write, label: &str, remaining: u64) -> io::Result<()> {
    write!(out, "\r{}", frame(label, remaining))?;
    out.flush()
}

fn clear_frame(out: &mut dyn Write, label: &str) -> io::Result<()> {
    let width = frame(label, 0).chars().count();
    write!(out, "\r{}\r", " ".repeat(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SystemPlayer;
    use crate::testing::{ManualClock, RecordingPlayer, ScriptedQuit};

    fn plan(minutes: u32) -> PhasePlan<'static> {
        PhasePlan {
            minutes: NonZeroU32::new(minutes).unwrap(),
            label: "Work Time",
            audio_path: Path::new("alert.mp3"),
            header: None,
        }
    }

    fn recording_timer(quit: ScriptedQuit) -> Timer<ManualClock, ScriptedQuit, RecordingPlayer> {
        Timer::new(ManualClock::default(), quit, RecordingPlayer::default())
    }

    /// Remaining seconds of every frame drawn, in order.
    fn frames(output: &str) -> Vec<u64> {
        output
            .split('\r')
            .filter_map(|segment| segment.strip_prefix("Work Time: "))
            .filter_map(|rest| rest.split(' ').next())
            .map(|clock| {
                let (minutes, seconds) = clock.split_once(':').unwrap();
                minutes.parse::<u64>().unwrap() * 60 + seconds.parse::<u64>().unwrap()
            })
            .collect()
    }

    fn ticks(clock: &ManualClock) -> usize {
        clock.sleeps.borrow().iter().filter(|d| **d == TICK).count()
    }

    #[test]
    fn remaining_rounds_partial_seconds_up() {
        let total = Duration::from_secs(60);

        assert_eq!(remaining_seconds(total, Duration::ZERO), 60);
        assert_eq!(remaining_seconds(total, Duration::from_millis(200)), 60);
        assert_eq!(remaining_seconds(total, Duration::from_secs(1)), 59);
        assert_eq!(remaining_seconds(total, Duration::from_millis(59_001)), 1);
        assert_eq!(remaining_seconds(total, Duration::from_secs(61)), 0);
    }

    #[test]
    fn frame_pads_minutes_and_seconds() {
        assert_eq!(frame("Short Break", 299), "Short Break: 04:59 (Press 'q' to quit)");
        assert_eq!(frame("Work Time", 0), "Work Time: 00:00 (Press 'q' to quit)");
    }

    #[test]
    fn uninterrupted_countdown_reaches_zero_and_alerts() {
        let mut timer = recording_timer(ScriptedQuit::never());
        let mut out = Vec::new();

        let outcome = timer.countdown(&plan(1), &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(frames(&output), (0..=60).rev().collect::<Vec<u64>>());
        assert!(output.contains("Work Time complete!"));
        assert!(!output.contains("Could not play sound"));
        assert_eq!(timer.audio.as_ref().unwrap().plays, 1);
        assert_eq!(ticks(&timer.clock), 60);
        assert_eq!(timer.clock.sleeps.borrow().last(), Some(&ALERT_DELAY));
    }

    #[test]
    fn countdown_never_scrolls() {
        let mut timer = recording_timer(ScriptedQuit::never());
        let mut out = Vec::new();

        timer.countdown(&plan(1), &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(output.matches('\n').count(), 1);
        assert!(output.ends_with("Work Time complete!\n"));
    }

    #[test]
    fn oversleeping_does_not_stretch_the_phase() {
        let clock = ManualClock::with_lag(Duration::from_millis(300));
        let mut timer = Timer::new(clock, ScriptedQuit::never(), RecordingPlayer::default());
        let mut out = Vec::new();

        let outcome = timer.countdown(&plan(1), &mut out).unwrap();
        let shown = frames(&String::from_utf8(out).unwrap());

        assert_eq!(outcome, Outcome::Completed);
        // 47 ticks of 1.3s cover the full minute.
        assert_eq!(ticks(&timer.clock), 47);
        assert_eq!(shown.first(), Some(&60));
        assert_eq!(shown.last(), Some(&0));
        assert!(shown.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn quit_stops_before_zero() {
        let mut timer = recording_timer(ScriptedQuit::on_query(3));
        let mut out = Vec::new();

        let outcome = timer.countdown(&plan(1), &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(outcome, Outcome::StoppedEarly);
        assert_eq!(frames(&output), vec![60, 59]);
        assert!(output.contains("Timer stopped by user."));
        assert!(!output.contains("complete!"));
        assert_eq!(timer.audio.as_ref().unwrap().plays, 0);
    }

    #[test]
    fn polling_ends_once_before_the_closing_lines() {
        let mut completed = recording_timer(ScriptedQuit::never());
        completed.countdown(&plan(1), &mut Vec::<u8>::new()).unwrap();
        assert_eq!(completed.quit.ended_after, vec![60]);

        let mut stopped = recording_timer(ScriptedQuit::on_query(3));
        stopped.countdown(&plan(1), &mut Vec::<u8>::new()).unwrap();
        assert_eq!(stopped.quit.ended_after, vec![3]);
    }

    #[test]
    fn quit_on_first_tick_shows_nothing() {
        let mut timer = recording_timer(ScriptedQuit::on_query(1));
        let mut out = Vec::new();

        let outcome = timer.countdown(&plan(25), &mut out).unwrap();

        assert_eq!(outcome, Outcome::StoppedEarly);
        assert!(frames(&String::from_utf8(out).unwrap()).is_empty());
        assert!(timer.clock.sleeps.borrow().is_empty());
    }

    #[test]
    fn header_is_printed_once_before_the_countdown() {
        let mut timer = recording_timer(ScriptedQuit::never());
        let mut out = Vec::new();
        let plan = PhasePlan {
            header: Some("Cycle 2 of 4".to_string()),
            ..plan(1)
        };

        timer.countdown(&plan, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.starts_with("Cycle 2 of 4\n"));
        assert_eq!(output.matches("Cycle 2 of 4").count(), 1);
    }

    #[test]
    fn missing_audio_file_still_completes() {
        let mut timer =
            Timer::new(ManualClock::default(), ScriptedQuit::never(), SystemPlayer::new());
        let mut out = Vec::new();
        let plan = PhasePlan {
            audio_path: Path::new("/no/such/alert.mp3"),
            ..plan(1)
        };

        let outcome = timer.countdown(&plan, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert!(output.contains("Work Time complete!"));
        assert!(output.contains("Could not play sound: audio file not found: /no/such/alert.mp3"));
        assert!(!timer.clock.sleeps.borrow().contains(&ALERT_DELAY));
    }

    #[test]
    fn muted_timer_skips_alert_and_delay() {
        let mut timer = recording_timer(ScriptedQuit::never()).without_sound();
        let mut out = Vec::new();

        timer.countdown(&plan(1), &mut out).unwrap();

        assert!(timer.audio.is_none());
        assert_eq!(timer.clock.sleeps.borrow().len(), 60);
    }
}
