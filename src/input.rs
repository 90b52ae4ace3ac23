//! Keyboard mapping for the terminal front end.

use crossterm::event::KeyCode;

use crate::game::{Action, Phase};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Play(Action),
    Start,
    TogglePause,
    Restart,
    Home,
    Quit,
}

/// Translates a key press into a command for the current phase.
pub fn map_key(code: KeyCode, phase: Phase) -> Option<Command> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Command::Quit),
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(Command::Home),
        _ => {}
    }

    match phase {
        Phase::Idle => match code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Start),
            _ => None,
        },
        Phase::GameOver => match code {
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
            _ => None,
        },
        Phase::Paused => match code {
            KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
            _ => None,
        },
        Phase::Running => match code {
            KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
            KeyCode::Left => Some(Command::Play(Action::MoveLeft)),
            KeyCode::Right => Some(Command::Play(Action::MoveRight)),
            KeyCode::Down => Some(Command::Play(Action::SoftDrop)),
            KeyCode::Up => Some(Command::Play(Action::Rotate)),
            KeyCode::Char(' ') => Some(Command::Play(Action::HardDrop)),
            _ => None,
        },
    }
}
