//! Key bindings: arrows or vim keys move the cursor, Space/Enter click the cell under it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    Click,
    Pause,
    ToggleDebug,
    NewBoard,
    Quit,
    None,
}

/// Map key event to an action. Supports both normal (arrows) and vim (hjkl) movement.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('d' | 'D') => Action::ToggleDebug,
        KeyCode::Char('r' | 'R') => Action::NewBoard,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Click,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_and_vim_keys_agree() {
        assert_eq!(key_to_action(press(KeyCode::Left)), Action::CursorLeft);
        assert_eq!(key_to_action(press(KeyCode::Char('h'))), Action::CursorLeft);
        assert_eq!(key_to_action(press(KeyCode::Down)), Action::CursorDown);
        assert_eq!(key_to_action(press(KeyCode::Char('j'))), Action::CursorDown);
    }

    #[test]
    fn test_click_keys() {
        assert_eq!(key_to_action(press(KeyCode::Enter)), Action::Click);
        assert_eq!(key_to_action(press(KeyCode::Char(' '))), Action::Click);
    }

    #[test]
    fn test_ctrl_c_quits_and_other_modifiers_are_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_r), Action::None);
    }
}
