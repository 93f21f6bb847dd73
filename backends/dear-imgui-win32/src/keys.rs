//! Virtual-key code to Dear ImGui key mapping

use std::collections::HashMap;

use dear_imgui_rs::Key;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::*;

/// Lookup table from Win32 virtual-key codes to [`Key`]
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: HashMap<u16, Key>,
}

const BINDINGS: &[(VIRTUAL_KEY, Key)] = &[
    (VK_TAB, Key::Tab),
    (VK_LEFT, Key::LeftArrow),
    (VK_RIGHT, Key::RightArrow),
    (VK_UP, Key::UpArrow),
    (VK_DOWN, Key::DownArrow),
    (VK_PRIOR, Key::PageUp),
    (VK_NEXT, Key::PageDown),
    (VK_HOME, Key::Home),
    (VK_END, Key::End),
    (VK_INSERT, Key::Insert),
    (VK_DELETE, Key::Delete),
    (VK_BACK, Key::Backspace),
    (VK_SPACE, Key::Space),
    (VK_RETURN, Key::Enter),
    (VK_ESCAPE, Key::Escape),
    (VK_LSHIFT, Key::LeftShift),
    (VK_RSHIFT, Key::RightShift),
    (VK_LCONTROL, Key::LeftCtrl),
    (VK_RCONTROL, Key::RightCtrl),
    (VK_LMENU, Key::LeftAlt),
    (VK_RMENU, Key::RightAlt),
    (VK_LWIN, Key::LeftSuper),
    (VK_RWIN, Key::RightSuper),
    (VK_APPS, Key::Menu),
    (VK_0, Key::Key0),
    (VK_1, Key::Key1),
    (VK_2, Key::Key2),
    (VK_3, Key::Key3),
    (VK_4, Key::Key4),
    (VK_5, Key::Key5),
    (VK_6, Key::Key6),
    (VK_7, Key::Key7),
    (VK_8, Key::Key8),
    (VK_9, Key::Key9),
    (VK_A, Key::A),
    (VK_B, Key::B),
    (VK_C, Key::C),
    (VK_D, Key::D),
    (VK_E, Key::E),
    (VK_F, Key::F),
    (VK_G, Key::G),
    (VK_H, Key::H),
    (VK_I, Key::I),
    (VK_J, Key::J),
    (VK_K, Key::K),
    (VK_L, Key::L),
    (VK_M, Key::M),
    (VK_N, Key::N),
    (VK_O, Key::O),
    (VK_P, Key::P),
    (VK_Q, Key::Q),
    (VK_R, Key::R),
    (VK_S, Key::S),
    (VK_T, Key::T),
    (VK_U, Key::U),
    (VK_V, Key::V),
    (VK_W, Key::W),
    (VK_X, Key::X),
    (VK_Y, Key::Y),
    (VK_Z, Key::Z),
    (VK_F1, Key::F1),
    (VK_F2, Key::F2),
    (VK_F3, Key::F3),
    (VK_F4, Key::F4),
    (VK_F5, Key::F5),
    (VK_F6, Key::F6),
    (VK_F7, Key::F7),
    (VK_F8, Key::F8),
    (VK_F9, Key::F9),
    (VK_F10, Key::F10),
    (VK_F11, Key::F11),
    (VK_F12, Key::F12),
    (VK_OEM_7, Key::Apostrophe),
    (VK_OEM_COMMA, Key::Comma),
    (VK_OEM_MINUS, Key::Minus),
    (VK_OEM_PERIOD, Key::Period),
    (VK_OEM_2, Key::Slash),
    (VK_OEM_1, Key::Semicolon),
    (VK_OEM_PLUS, Key::Equal),
    (VK_OEM_4, Key::LeftBracket),
    (VK_OEM_5, Key::Backslash),
    (VK_OEM_6, Key::RightBracket),
    (VK_OEM_3, Key::GraveAccent),
    (VK_CAPITAL, Key::CapsLock),
    (VK_SCROLL, Key::ScrollLock),
    (VK_NUMLOCK, Key::NumLock),
    (VK_SNAPSHOT, Key::PrintScreen),
    (VK_PAUSE, Key::Pause),
    (VK_DECIMAL, Key::KeypadDecimal),
    (VK_DIVIDE, Key::KeypadDivide),
    (VK_MULTIPLY, Key::KeypadMultiply),
    (VK_SUBTRACT, Key::KeypadSubtract),
    (VK_ADD, Key::KeypadAdd),
];

impl KeyMap {
    pub fn new() -> Self {
        Self {
            keys: BINDINGS.iter().copied().collect(),
        }
    }

    /// Key for a virtual-key code.
    ///
    /// `extended` is bit 24 of the key message's `lParam`; it tells the
    /// keypad Enter apart from the main one.
    pub fn key_for(&self, vk: u16, extended: bool) -> Option<Key> {
        if vk == VK_RETURN && extended {
            return Some(Key::KeypadEnter);
        }
        self.keys.get(&vk).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}
