//! Command-line arguments
use crate::config::Config;
use clap::Parser;
use std::num::NonZeroU32;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pomodoro timer for the terminal")]
pub struct Args {
    /// JSON file with default settings (defaults to ~/.config/pomodoro/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Work period in minutes
    #[arg(short, long)]
    pub work: Option<NonZeroU32>,

    /// Short break in minutes
    #[arg(short, long)]
    pub short_break: Option<NonZeroU32>,

    /// Long break in minutes
    #[arg(short, long)]
    pub long_break: Option<NonZeroU32>,

    /// Number of work cycles
    #[arg(short = 'n', long)]
    pub cycles: Option<NonZeroU32>,

    /// Sound played when a phase ends
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Don't play a sound when a phase ends
    #[arg(long)]
    pub no_sound: bool,

    /// Don't clear the terminal
    #[arg(long)]
    pub no_clear: bool,

    /// Skip the settings menu and start right away
    #[arg(short = 'y', long)]
    pub start: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Applies the flags given on the command line on top of `config`.
    pub fn apply(&self, config: Config) -> Config {
        Config {
            work_minutes: self.work.unwrap_or(config.work_minutes),
            short_break_minutes: self.short_break.unwrap_or(config.short_break_minutes),
            long_break_minutes: self.long_break.unwrap_or(config.long_break_minutes),
            total_cycles: self.cycles.unwrap_or(config.total_cycles),
            audio_path: self.audio.clone().unwrap_or(config.audio_path),
        }
    }
}
