//! Work/break cycle orchestration
use crate::config::Config;
use crate::timer::{Outcome, PhasePlan, PhaseTimer};
use std::io::{self, Write};

/// Every this many cycles the break is a long one.
pub const LONG_BREAK_EVERY: u32 = 4;

pub const WORK_LABEL: &str = "Work Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    pub fn after_cycle(cycle: u32) -> Self {
        if cycle % LONG_BREAK_EVERY == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BreakKind::Short => "Short Break",
            BreakKind::Long => "Long Break",
        }
    }

    pub fn announcement(self) -> &'static str {
        match self {
            BreakKind::Short => "Time for a short break!",
            BreakKind::Long => "Time for a long break!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Work { cycle: u32 },
    Break { cycle: u32, kind: BreakKind },
    Ended,
}

impl Phase {
    /// Next phase once the current one finished with `outcome`.
    pub fn next(self, outcome: Outcome, total_cycles: u32) -> Phase {
        match self {
            Phase::Idle => Phase::Work { cycle: 1 },
            Phase::Work { .. } | Phase::Break { .. } if outcome == Outcome::StoppedEarly => {
                Phase::Ended
            }
            Phase::Work { cycle } if cycle >= total_cycles => Phase::Ended,
            Phase::Work { cycle } => Phase::Break {
                cycle,
                kind: BreakKind::after_cycle(cycle),
            },
            Phase::Break { cycle, .. } => Phase::Work { cycle: cycle + 1 },
            Phase::Ended => Phase::Ended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub completed_cycles: u32,
    pub requested_cycles: u32,
}

impl SessionProgress {
    pub fn is_complete(&self) -> bool {
        self.completed_cycles == self.requested_cycles
    }
}

pub fn session_banner(config: &Config) -> String {
    format!(
        "Session: Work = {}m, Short Break = {}m, Long Break = {}m, Total Cycles = {}",
        config.work_minutes,
        config.short_break_minutes,
        config.long_break_minutes,
        config.total_cycles
    )
}

/// Runs work and break phases until every cycle is done or a phase is
/// stopped, then prints the summary.
pub fn run_session<T: PhaseTimer + ?Sized>(
    config: &Config,
    timer: &mut T,
    out: &mut dyn Write,
) -> io::Result<SessionProgress> {
    let total_cycles = config.total_cycles.get();
    let mut progress = SessionProgress {
        completed_cycles: 0,
        requested_cycles: total_cycles,
    };

    writeln!(out, "{}", session_banner(config))?;

    let mut phase = Phase::Idle.next(Outcome::Completed, total_cycles);
    while phase != Phase::Ended {
        let outcome = match phase {
            Phase::Work { cycle } => {
                let plan = PhasePlan {
                    minutes: config.work_minutes,
                    label: WORK_LABEL,
                    audio_path: &config.audio_path,
                    header: Some(format!("Cycle {cycle} of {total_cycles}")),
                };
                let outcome = timer.run_phase(&plan, out)?;
                if outcome == Outcome::Completed {
                    progress.completed_cycles += 1;
                }
                outcome
            }
            Phase::Break { kind, .. } => {
                writeln!(out, "{}", kind.announcement())?;
                let minutes = match kind {
                    BreakKind::Short => config.short_break_minutes,
                    BreakKind::Long => config.long_break_minutes,
                };
                let plan = PhasePlan {
                    minutes,
                    label: kind.label(),
                    audio_path: &config.audio_path,
                    header: None,
                };
                timer.run_phase(&plan, out)?
            }
            Phase::Idle | Phase::Ended => break,
        };

        tracing::debug!(?phase, ?outcome, "phase finished");
        phase = phase.next(outcome, total_cycles);
    }

    writeln!(
        out,
        "\nPomodoro session ended. You completed {} of {} cycles.",
        progress.completed_cycles, progress.requested_cycles
    )?;
    out.flush()?;
    tracing::info!(
        completed = progress.completed_cycles,
        requested = progress.requested_cycles,
        complete = progress.is_complete(),
        "session ended"
    );

    Ok(progress)
}
