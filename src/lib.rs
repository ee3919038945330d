pub mod audio;
pub mod cli;
pub mod clock;
pub mod config;
pub mod session;
pub mod settings;
pub mod signal;
pub mod terminal;
pub mod timer;

#[cfg(test)]
mod testing;
