//! Interactive settings menu shown before a session starts
use crate::config::Config;
use crate::terminal;
use std::io::{self, BufRead, Write};
use std::num::NonZeroU32;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input. Please enter a number.")]
    NotANumber,

    #[error("value must be positive.")]
    NotPositive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Start(Config),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Work,
    ShortBreak,
    LongBreak,
    Cycles,
    Audio,
}

impl Field {
    fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Field::Work),
            "2" => Some(Field::ShortBreak),
            "3" => Some(Field::LongBreak),
            "4" => Some(Field::Cycles),
            "5" => Some(Field::Audio),
            _ => None,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Field::Work => "Work period",
            Field::ShortBreak => "Short break",
            Field::LongBreak => "Long break",
            Field::Cycles => "Total cycles",
            Field::Audio => "Enter audio file name (e.g., alert.mp3)",
        }
    }
}

pub struct SettingsMenu {
    config: Config,
    clear_screen: bool,
}

impl SettingsMenu {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clear_screen: true,
        }
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Shows the menu until the user starts or quits. End of input counts
    /// as quitting.
    pub fn run<R: BufRead, W: Write>(
        mut self,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<MenuOutcome> {
        let mut notice: Option<&str> = None;

        loop {
            if self.clear_screen {
                terminal::clear_screen(out)?;
            }
            self.render(out)?;
            if let Some(message) = notice.take() {
                writeln!(out, "{message}")?;
            }
            write!(out, "\nEnter your choice: ")?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(out)?;
                return self.quit(out);
            };

            let choice = line.trim().to_lowercase();
            match choice.as_str() {
                "s" => {
                    tracing::info!(config = ?self.config, "settings accepted");
                    return Ok(MenuOutcome::Start(self.config));
                }
                "q" => return self.quit(out),
                _ => match Field::from_choice(&choice) {
                    Some(field) => self.edit(field, input, out)?,
                    None => {
                        tracing::debug!(choice = %choice, "rejected menu choice");
                        notice = Some("Invalid choice. Try again.");
                    }
                },
            }
        }
    }

    fn quit<W: Write>(&self, out: &mut W) -> io::Result<MenuOutcome> {
        writeln!(out, "Goodbye!")?;
        out.flush()?;
        Ok(MenuOutcome::Quit)
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = &self.config;
        writeln!(out, "Current Settings:")?;
        writeln!(out, "1. Work period: {} minutes", config.work_minutes)?;
        writeln!(out, "2. Short break: {} minutes", config.short_break_minutes)?;
        writeln!(out, "3. Long break: {} minutes", config.long_break_minutes)?;
        writeln!(out, "4. Total cycles: {}", config.total_cycles)?;
        writeln!(out, "5. Audio file: {}", config.audio_path.display())?;
        writeln!(out, "\nOptions:")?;
        writeln!(out, "1-5: Modify a setting")?;
        writeln!(out, "s: Start with these settings")?;
        writeln!(out, "q: Quit")
    }

    fn edit<R: BufRead, W: Write>(
        &mut self,
        field: Field,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<()> {
        let config = &mut self.config;
        let slot = match field {
            Field::Work => &mut config.work_minutes,
            Field::ShortBreak => &mut config.short_break_minutes,
            Field::LongBreak => &mut config.long_break_minutes,
            Field::Cycles => &mut config.total_cycles,
            Field::Audio => {
                write!(out, "{}: ", field.prompt())?;
                out.flush()?;
                if let Some(line) = read_line(input)? {
                    let entered = line.trim_end_matches(['\r', '\n']);
                    if !entered.is_empty() {
                        config.audio_path = PathBuf::from(entered);
                    }
                }
                return Ok(());
            }
        };

        *slot = prompt_positive(input, out, field.prompt(), *slot)?;
        tracing::debug!(?field, value = slot.get(), "setting updated");
        Ok(())
    }
}

/// Asks until a positive whole number or an empty line is entered.
fn prompt_positive<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    current: NonZeroU32,
) -> io::Result<NonZeroU32> {
    loop {
        write!(out, "{prompt} (default {current}): ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out)?;
            return Ok(current);
        };

        match parse_positive(&line) {
            Ok(value) => return Ok(value.unwrap_or(current)),
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

/// Parses a setting value. An empty entry yields `None` (keep the default).
pub fn parse_positive(raw: &str) -> Result<Option<NonZeroU32>, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let value: i64 = raw.parse().map_err(|_| InputError::NotANumber)?;
    if value <= 0 {
        return Err(InputError::NotPositive);
    }

    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .map(Some)
        .ok_or(InputError::NotANumber)
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
