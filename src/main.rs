use anyhow::{Context, Result};
use clap::Parser;
use pomodoro::audio::SystemPlayer;
use pomodoro::cli::Args;
use pomodoro::clock::SystemClock;
use pomodoro::config::{self, Config};
use pomodoro::session::run_session;
use pomodoro::settings::{MenuOutcome, SettingsMenu};
use pomodoro::signal::{Interrupt, KeyboardQuit};
use pomodoro::terminal;
use pomodoro::timer::Timer;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let loaded = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&config::get_config_path()),
    };
    let config = args.apply(loaded);

    // Ctrl-C exits until a session is running.
    let interrupt = Interrupt::install().context("Error setting Ctrl-C handler")?;

    println!("Welcome to the Pomodoro Timer!");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let config = if args.start {
        config
    } else {
        let menu = SettingsMenu::new(config).with_clear_screen(!args.no_clear);
        let config = match menu.run(&mut input, &mut stdout)? {
            MenuOutcome::Start(config) => config,
            MenuOutcome::Quit => process::exit(0),
        };
        confirm_start(&config, &mut input, &mut stdout)?;
        config
    };

    if !args.no_clear {
        terminal::clear_screen(&mut stdout)?;
    }

    let timer = Timer::new(
        SystemClock::new(),
        KeyboardQuit::new(interrupt.clone()),
        SystemPlayer::new(),
    );
    let mut timer = if args.no_sound {
        timer.without_sound()
    } else {
        timer
    };

    interrupt.arm();
    let progress = run_session(&config, &mut timer, &mut stdout);
    interrupt.disarm();
    progress?;

    Ok(())
}

fn confirm_start(config: &Config, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nStarting with:")?;
    writeln!(
        out,
        "Work = {} min, Short Break = {} min, Long Break = {} min",
        config.work_minutes, config.short_break_minutes, config.long_break_minutes
    )?;
    writeln!(
        out,
        "Total cycles: {}, Audio: {}",
        config.total_cycles,
        config.audio_path.display()
    )?;
    write!(out, "Press Enter to start...")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
