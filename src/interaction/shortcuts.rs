use winit::keyboard::KeyCode;

use crate::gfx::gizmos::TransformMode;

/// Keyboard commands that act on the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    SetMode(TransformMode),
    DeleteSelection,
}

impl Shortcut {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyG => Some(Shortcut::SetMode(TransformMode::Translate)),
            KeyCode::KeyR => Some(Shortcut::SetMode(TransformMode::Rotate)),
            KeyCode::KeyS => Some(Shortcut::SetMode(TransformMode::Scale)),
            KeyCode::Delete | KeyCode::Backspace => Some(Shortcut::DeleteSelection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_mode_and_delete_keys() {
        assert_eq!(
            Shortcut::from_key(KeyCode::KeyR),
            Some(Shortcut::SetMode(TransformMode::Rotate))
        );
        assert_eq!(Shortcut::from_key(KeyCode::Backspace), Some(Shortcut::DeleteSelection));
        assert_eq!(Shortcut::from_key(KeyCode::KeyQ), None);
    }
}
