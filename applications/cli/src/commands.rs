/// Interactive commands read from stdin during `watch`
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    /// `p`: play/pause the selected track
    PlayPause,
    /// `p N`: play playlist track N (1-based)
    PlayTrack(usize),
    /// `s SECONDS`: seek within the selected track
    Seek { position_ms: u64 },
    /// `l`: list the playlist
    List,
    /// `q`: quit
    Quit,
}

impl WatchCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(CliError::UnknownCommand(line.trim().to_string()));
        }

        let command = match (head, arg) {
            ("p", None) => WatchCommand::PlayPause,
            ("p", Some(n)) => match n.parse::<usize>() {
                Ok(index) if index > 0 => WatchCommand::PlayTrack(index),
                _ => return Err(CliError::UnknownCommand(line.trim().to_string())),
            },
            ("s", Some(secs)) => match secs.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => WatchCommand::Seek {
                    position_ms: (secs * 1000.0).round() as u64,
                },
                _ => return Err(CliError::UnknownCommand(line.trim().to_string())),
            },
            ("l", None) => WatchCommand::List,
            ("q", None) => WatchCommand::Quit,
            _ => return Err(CliError::UnknownCommand(line.trim().to_string())),
        };
        Ok(Some(command))
    }
}

/// Help text shown on unknown input
pub const HELP: &str = "commands: p | p N | s SECONDS | l | q";
