//! Console controller
//!
//! Line-oriented commands read from stdin by the `transync` binary, and the
//! text rendering of the segment window.

use crate::error::Result;
use crate::session::Session;
use crate::state::SharedTranscript;
use std::path::PathBuf;
use transync_common::human_time::format_segment_line;
use transync_common::Error as CommonError;

pub const HELP: &str = "\
commands:
  n, next            next segment
  p, prev            previous segment
  r, restart         restart current segment
  t, toggle          pause / resume
  j <index>          jump to segment
  e <index> <text>   replace segment text
  d <index>          clear segment text
  s [path]           save transcript
  w                  show segment window
  h, help            this help
  q, quit            save (if configured) and exit";

/// One console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Restart,
    Toggle,
    Jump(usize),
    Edit(usize, String),
    Clear(usize),
    Save(Option<PathBuf>),
    Window,
    Help,
    Quit,
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading commands, optionally printing a message
    Continue(Option<String>),
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Previous,
        "r" | "restart" => Command::Restart,
        "t" | "toggle" => Command::Toggle,
        "j" | "jump" => Command::Jump(parse_index(rest)?),
        "e" | "edit" => {
            let (index, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Edit(parse_index(index)?, text.trim().to_string())
        }
        "d" | "delete" => Command::Clear(parse_index(rest)?),
        "s" | "save" => Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "w" | "window" => Command::Window,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        other => {
            return Err(CommonError::InvalidInput(format!("unknown command: {}", other)).into())
        }
    };

    Ok(Some(command))
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|_| {
        CommonError::InvalidInput(format!("expected a segment index, got {:?}", raw)).into()
    })
}

/// Run a command against the session
pub fn execute(session: &Session, command: Command) -> Result<Outcome> {
    let message = match command {
        Command::Next => navigation_message(session.seek(1)?, "last segment"),
        Command::Previous => navigation_message(session.seek(-1)?, "first segment"),
        Command::Restart => navigation_message(session.seek(0)?, "empty transcript"),
        Command::Jump(index) => navigation_message(session.jump_to(index)?, "no such segment"),
        Command::Toggle => {
            let playing = session.pause_resume()?;
            Some(if playing { "playing" } else { "paused" }.to_string())
        }
        Command::Edit(index, text) => {
            session.edit_segment(index, &text)?;
            Some(format!("segment {} edited", index))
        }
        Command::Clear(index) => {
            session.clear_segment(index)?;
            Some(format!("segment {} cleared", index))
        }
        Command::Save(Some(path)) => {
            session.save(&path)?;
            Some(format!("saved to {}", path.display()))
        }
        Command::Save(None) => {
            let path = session.save_default()?;
            Some(format!("saved to {}", path.display()))
        }
        Command::Window => Some(render_window(
            session.transcript(),
            session.current_segment(),
            session.config().window_size,
        )),
        Command::Help => Some(HELP.to_string()),
        Command::Quit => return Ok(Outcome::Quit),
    };

    Ok(Outcome::Continue(message))
}

fn navigation_message(moved: bool, reason: &str) -> Option<String> {
    (!moved).then(|| format!("ignored: {}", reason))
}

/// Render the display window, marking the current segment with `>`
pub fn render_window(transcript: &SharedTranscript, current: usize, size: usize) -> String {
    transcript
        .window(current, size)
        .iter()
        .map(|(index, segment)| {
            let cursor = if *index == current { ">" } else { " " };
            format!("{} {:>4} {}", cursor, index, format_segment_line(segment))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
