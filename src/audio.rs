//! Completion alerts
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long a freshly spawned player is watched for an early failure.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no audio file loaded")]
    NotLoaded,

    #[error("no audio player available (tried {0})")]
    NoPlayer(String),

    #[error("{player} could not play the file ({status})")]
    PlayerFailed {
        player: &'static str,
        status: ExitStatus,
    },
}

pub trait AudioPlayer {
    fn load(&mut self, path: &Path) -> Result<(), AudioError>;

    fn play(&mut self) -> Result<(), AudioError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Played,
    PlaybackFailed(String),
}

/// Loads and plays `path`. Failures are reported, never propagated.
pub fn play_alert<A: AudioPlayer + ?Sized>(player: &mut A, path: &Path) -> Playback {
    let result = player.load(path).and_then(|()| player.play());
    match result {
        Ok(()) => Playback::Played,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "alert playback failed");
            Playback::PlaybackFailed(err.to_string())
        }
    }
}

struct PlayerCommand {
    program: &'static str,
    args: &'static [&'static str],
}

/// Plays sound files through the platform's command-line player.
///
/// At most one player process is kept around; it is reaped before the
/// next alert starts and killed when the player is dropped.
pub struct SystemPlayer {
    loaded: Option<PathBuf>,
    players: Vec<PlayerCommand>,
    playing: Option<Child>,
}

impl SystemPlayer {
    pub fn new() -> Self {
        Self::with_players(platform_players())
    }

    fn with_players(players: Vec<PlayerCommand>) -> Self {
        Self {
            loaded: None,
            players,
            playing: None,
        }
    }

    fn stop_previous(&mut self) {
        if let Some(mut child) = self.playing.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Drop for SystemPlayer {
    fn drop(&mut self) {
        self.stop_previous();
    }
}

/// Waits up to `grace` for `child` to exit. `None` means it is still running.
fn exit_within(child: &mut Child, grace: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            Ok(None) => return None,
            Err(err) => {
                tracing::debug!(error = %err, "could not poll player");
                return None;
            }
        }
    }
}

impl Default for SystemPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn platform_players() -> Vec<PlayerCommand> {
    if cfg!(target_os = "macos") {
        vec![PlayerCommand {
            program: "afplay",
            args: &[],
        }]
    } else if cfg!(target_os = "linux") {
        vec![
            PlayerCommand {
                program: "ffplay",
                args: &["-nodisp", "-autoexit", "-loglevel", "quiet"],
            },
            PlayerCommand {
                program: "mpg123",
                args: &["-q"],
            },
            PlayerCommand {
                program: "paplay",
                args: &[],
            },
            PlayerCommand {
                program: "aplay",
                args: &["-q"],
            },
        ]
    } else {
        Vec::new()
    }
}

impl AudioPlayer for SystemPlayer {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        if !path.is_file() {
            self.loaded = None;
            return Err(AudioError::NotFound(path.to_path_buf()));
        }
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.stop_previous();
        let path = self.loaded.as_ref().ok_or(AudioError::NotLoaded)?;
        let mut failure = None;

        for player in &self.players {
            let spawned = Command::new(player.program)
                .args(player.args)
                .arg(path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            let mut child = match spawned {
                Ok(child) => child,
                Err(err) => {
                    tracing::debug!(player = player.program, error = %err, "player unavailable");
                    continue;
                }
            };

            match exit_within(&mut child, STARTUP_GRACE) {
                None => {
                    tracing::debug!(player = player.program, path = %path.display(), "alert started");
                    self.playing = Some(child);
                    return Ok(());
                }
                Some(status) if status.success() => {
                    tracing::debug!(player = player.program, "alert finished");
                    return Ok(());
                }
                Some(status) => {
                    tracing::debug!(player = player.program, %status, "player rejected the file");
                    failure = Some(AudioError::PlayerFailed {
                        player: player.program,
                        status,
                    });
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let tried: Vec<&str> = self.players.iter().map(|p| p.program).collect();
        let tried = if tried.is_empty() {
            "none on this platform".to_string()
        } else {
            tried.join(", ")
        };
        Err(AudioError::NoPlayer(tried))
    }
}
