use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    IncreasePeriod,
    DecreasePeriod,
    ToggleTheme,
    FocusPrev,
    FocusNext,
    ScrollUp,
    ScrollDown,
    None,
}

pub fn handle_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('r'), _) => Action::Refresh,
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Action::IncreasePeriod,
        (KeyCode::Char('-'), _) => Action::DecreasePeriod,
        (KeyCode::Char('t'), _) => Action::ToggleTheme,

        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Action::FocusPrev,
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::FocusNext,
        (KeyCode::PageUp, _) => Action::ScrollUp,
        (KeyCode::PageDown, _) => Action::ScrollDown,

        _ => Action::None,
    }
}

/// Footer hints, in display order.
pub const KEY_HINTS: [(&str, &str); 6] = [
    ("q", "Quit"),
    ("r", "Refresh"),
    ("+/-", "Period"),
    ("↑↓/jk", "Focus"),
    ("PgUp/PgDn", "Scroll"),
    ("t", "Theme"),
];
