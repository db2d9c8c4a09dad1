//! Key bindings: arrows plus vim-style aliases.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Pause,
    Reset,
    /// The overlay button: Resume while paused, Play Again after game over.
    Confirm,
    Quit,
    None,
}

impl Action {
    /// Game command for this action, if it is one. `Confirm` depends on the overlay and is
    /// resolved by the app.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::MoveLeft => Some(Command::Left),
            Self::MoveRight => Some(Command::Right),
            Self::SoftDrop => Some(Command::Down),
            Self::Rotate => Some(Command::Rotate),
            Self::Pause => Some(Command::TogglePause),
            Self::Reset => Some(Command::Reset),
            Self::Confirm | Self::Quit | Self::None => None,
        }
    }
}

/// Map key event to game action. Supports both arrows and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Reset,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_map_to_moves() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Rotate);
    }

    #[test]
    fn test_vim_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::Rotate);
    }

    #[test]
    fn test_controls() {
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Reset);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Confirm);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_modified_keys_ignored() {
        let alt_left = KeyEvent::new(KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_left), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_action_commands() {
        assert_eq!(Action::MoveLeft.command(), Some(Command::Left));
        assert_eq!(Action::Pause.command(), Some(Command::TogglePause));
        assert_eq!(Action::Reset.command(), Some(Command::Reset));
        assert_eq!(Action::Confirm.command(), None);
        assert_eq!(Action::Quit.command(), None);
    }
}
