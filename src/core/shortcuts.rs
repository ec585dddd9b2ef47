//! Global keyboard shortcuts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: char,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: char) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: char) -> Self {
        Self {
            key,
            ctrl: true,
            meta: false,
        }
    }

    pub fn meta(key: char) -> Self {
        Self {
            key,
            ctrl: false,
            meta: true,
        }
    }

    fn has_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Where keyboard focus currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    TextInput,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleRouter,
    NewConversation,
}

pub fn resolve_shortcut(press: KeyPress, focus: Focus) -> Option<Shortcut> {
    let key = press.key.to_ascii_lowercase();
    if press.has_modifier() {
        return (key == 'k').then_some(Shortcut::ToggleRouter);
    }
    if key == 'n' && focus == Focus::Elsewhere {
        return Some(Shortcut::NewConversation);
    }
    None
}

/// Decode an ASCII control character (as a line-based terminal delivers
/// Ctrl+letter) into a key press.
pub fn key_from_control_char(c: char) -> Option<KeyPress> {
    let code = c as u32;
    if (1..=26).contains(&code) {
        char::from_u32('a' as u32 + code - 1).map(KeyPress::ctrl)
    } else {
        None
    }
}
