//! Keyboard handling - translates key events into todo actions
//!
//! Two layers:
//! 1. Priority keys (Ctrl+C, Esc) always quit
//! 2. Control chords and navigation keys map to list actions; every other
//!    printable character goes to the input line

use crate::todo::TodoStore;
use flux_esse::Actions;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the store to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    InputChar(char),
    InputBackspace,
    Add,
    Toggle,
    Remove,
    SelectNext,
    SelectPrevious,
    CycleFilter,
    ClearCompleted,
}

pub fn command_for(key: KeyEvent) -> Option<KeyCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if (ctrl && key.code == KeyCode::Char('c')) || key.code == KeyCode::Esc {
        return Some(KeyCommand::Quit);
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('t') => Some(KeyCommand::Toggle),
            KeyCode::Char('d') => Some(KeyCommand::Remove),
            KeyCode::Char('f') => Some(KeyCommand::CycleFilter),
            KeyCode::Char('x') => Some(KeyCommand::ClearCompleted),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(KeyCommand::Add),
        KeyCode::Backspace => Some(KeyCommand::InputBackspace),
        KeyCode::Down => Some(KeyCommand::SelectNext),
        KeyCode::Up => Some(KeyCommand::SelectPrevious),
        KeyCode::Tab => Some(KeyCommand::CycleFilter),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(KeyCommand::InputChar(c))
        }
        _ => None,
    }
}

/// Dispatch the action matching `key`, if any
pub fn handle_key(key: KeyEvent, actions: &Actions<TodoStore>) {
    let Some(command) = command_for(key) else {
        log::trace!("Unbound key: {:?}", key);
        return;
    };
    log::debug!("Key {:?} -> {:?}", key.code, command);

    match command {
        KeyCommand::Quit => actions.dispatch("quit", ()),
        KeyCommand::InputChar(c) => actions.dispatch("input_char", c),
        KeyCommand::InputBackspace => actions.dispatch("input_backspace", ()),
        KeyCommand::Add => actions.dispatch("add", ()),
        KeyCommand::Toggle => actions.dispatch("toggle", ()),
        KeyCommand::Remove => actions.dispatch("remove", ()),
        KeyCommand::SelectNext => actions.dispatch("select_next", ()),
        KeyCommand::SelectPrevious => actions.dispatch("select_previous", ()),
        KeyCommand::CycleFilter => actions.dispatch("cycle_filter", ()),
        KeyCommand::ClearCompleted => actions.dispatch("clear_completed", ()),
    }
}
