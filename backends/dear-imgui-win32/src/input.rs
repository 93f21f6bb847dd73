//! Window message parameter decoding

use dear_imgui_rs::{Io, Key};

/// Signed client coordinates packed in a mouse message's `lParam`
pub fn mouse_position(lparam: isize) -> [f32; 2] {
    let x = (lparam & 0xFFFF) as u16 as i16;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16;
    [f32::from(x), f32::from(y)]
}

/// Wheel rotation in notches from the high word of a wheel message's `wParam`
pub fn wheel_notches(wparam: usize) -> f32 {
    let delta = ((wparam >> 16) & 0xFFFF) as u16 as i16;
    f32::from(delta) / 120.0
}

/// Which X button a `WM_XBUTTON*` message refers to: `true` for the first
pub fn is_first_xbutton(wparam: usize) -> bool {
    ((wparam >> 16) & 0xFFFF) == 1
}

/// Virtual-key code carried by a key message
pub fn virtual_key(wparam: usize) -> u16 {
    (wparam & 0xFFFF) as u16
}

/// Bit 24 of a key message's `lParam`
pub fn is_extended_key(lparam: isize) -> bool {
    (lparam >> 24) & 1 == 1
}

/// Joins the UTF-16 units of `WM_CHAR` messages into characters
#[derive(Debug, Default, Clone)]
pub struct Utf16Decoder {
    high_surrogate: Option<u16>,
}

impl Utf16Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one code unit; returns a character once one is complete
    pub fn push(&mut self, unit: u16) -> Option<char> {
        if (0xD800..0xDC00).contains(&unit) {
            self.high_surrogate = Some(unit);
            return None;
        }
        match self.high_surrogate.take() {
            Some(high) => char::decode_utf16([high, unit]).next()?.ok(),
            None => char::decode_utf16([unit]).next()?.ok(),
        }
    }
}

/// Modifier state reported alongside key events.
///
/// Dear ImGui derives `KeyCtrl`/`KeyShift`/`KeyAlt`/`KeySuper` from the
/// `Mod*` keys only, so these are sent in addition to the left/right keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    /// Queue the state as `Key::Mod*` events
    pub fn submit(self, io: &mut Io) {
        io.add_key_event(Key::ModCtrl, self.ctrl);
        io.add_key_event(Key::ModShift, self.shift);
        io.add_key_event(Key::ModAlt, self.alt);
        io.add_key_event(Key::ModSuper, self.super_key);
    }
}

#[cfg(target_os = "windows")]
pub(crate) use self::messages::dispatch;

#[cfg(target_os = "windows")]
mod messages {
    use super::*;
    use crate::KeyMap;
    use dear_imgui_rs::Context;
    use dear_imgui_rs::input::MouseButton;
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
        GetKeyState, VK_CONTROL, VK_LSHIFT, VK_LWIN, VK_MENU, VK_RSHIFT, VK_RWIN, VK_SHIFT,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::*;

    fn key_down(vk: u16) -> bool {
        (unsafe { GetKeyState(i32::from(vk)) } as u16 & 0x8000) != 0
    }

    fn current_modifiers() -> Modifiers {
        Modifiers {
            ctrl: key_down(VK_CONTROL),
            shift: key_down(VK_SHIFT),
            alt: key_down(VK_MENU),
            super_key: key_down(VK_LWIN) || key_down(VK_RWIN),
        }
    }

    fn add_key(imgui: &mut Context, key_map: &KeyMap, wparam: usize, lparam: isize, down: bool) {
        let vk = virtual_key(wparam);
        let extended = is_extended_key(lparam);
        let io = imgui.io_mut();
        current_modifiers().submit(io);
        match vk {
            // The generic modifier codes do not say which side was pressed.
            VK_SHIFT => {
                io.add_key_event(Key::LeftShift, key_down(VK_LSHIFT));
                io.add_key_event(Key::RightShift, key_down(VK_RSHIFT));
            }
            VK_CONTROL => {
                let key = if extended { Key::RightCtrl } else { Key::LeftCtrl };
                io.add_key_event(key, down);
            }
            VK_MENU => {
                let key = if extended { Key::RightAlt } else { Key::LeftAlt };
                io.add_key_event(key, down);
            }
            _ => {
                if let Some(key) = key_map.key_for(vk, extended) {
                    io.add_key_event(key, down);
                }
            }
        }
    }

    /// Forward one window message; `None` for messages that carry no input
    pub(crate) fn dispatch(
        imgui: &mut Context,
        key_map: &KeyMap,
        utf16: &mut Utf16Decoder,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Option<bool> {
        let mouse_button = |imgui: &mut Context, button, down| {
            imgui.io_mut().add_mouse_button_event(button, down);
            imgui.io().want_capture_mouse()
        };

        let captured = match msg {
            WM_MOUSEMOVE => {
                imgui.io_mut().add_mouse_pos_event(mouse_position(lparam));
                imgui.io().want_capture_mouse()
            }
            WM_LBUTTONDOWN | WM_LBUTTONDBLCLK => mouse_button(imgui, MouseButton::Left, true),
            WM_LBUTTONUP => mouse_button(imgui, MouseButton::Left, false),
            WM_RBUTTONDOWN | WM_RBUTTONDBLCLK => mouse_button(imgui, MouseButton::Right, true),
            WM_RBUTTONUP => mouse_button(imgui, MouseButton::Right, false),
            WM_MBUTTONDOWN | WM_MBUTTONDBLCLK => mouse_button(imgui, MouseButton::Middle, true),
            WM_MBUTTONUP => mouse_button(imgui, MouseButton::Middle, false),
            WM_XBUTTONDOWN | WM_XBUTTONDBLCLK | WM_XBUTTONUP => {
                let button = if is_first_xbutton(wparam) {
                    MouseButton::Extra1
                } else {
                    MouseButton::Extra2
                };
                mouse_button(imgui, button, msg != WM_XBUTTONUP)
            }
            WM_MOUSEWHEEL => {
                imgui.io_mut().add_mouse_wheel_event([0.0, wheel_notches(wparam)]);
                imgui.io().want_capture_mouse()
            }
            WM_MOUSEHWHEEL => {
                imgui.io_mut().add_mouse_wheel_event([-wheel_notches(wparam), 0.0]);
                imgui.io().want_capture_mouse()
            }
            WM_KEYDOWN | WM_SYSKEYDOWN | WM_KEYUP | WM_SYSKEYUP => {
                let down = matches!(msg, WM_KEYDOWN | WM_SYSKEYDOWN);
                add_key(imgui, key_map, wparam, lparam, down);
                imgui.io().want_capture_keyboard()
            }
            WM_CHAR => {
                if let Some(ch) = utf16.push(wparam as u16) {
                    if !ch.is_control() || matches!(ch, '\t' | '\n' | '\r') {
                        imgui.io_mut().add_input_character(ch);
                    }
                }
                imgui.io().want_capture_keyboard()
            }
            _ => return None,
        };
        Some(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_lparam(x: i16, y: i16) -> isize {
        ((y as u16 as isize) << 16) | (x as u16 as isize)
    }

    #[test]
    fn mouse_position_is_signed() {
        assert_eq!(mouse_position(make_lparam(120, 45)), [120.0, 45.0]);
        assert_eq!(mouse_position(make_lparam(-5, -300)), [-5.0, -300.0]);
    }

    #[test]
    fn wheel_uses_high_word() {
        assert_eq!(wheel_notches(120 << 16), 1.0);
        assert_eq!(wheel_notches(((-240i16 as u16) as usize) << 16), -2.0);
        assert_eq!(wheel_notches(0x0008), 0.0);
    }

    #[test]
    fn xbutton_and_key_fields() {
        assert!(is_first_xbutton(1 << 16));
        assert!(!is_first_xbutton(2 << 16));
        assert_eq!(virtual_key(0x0001_000D), 0x0D);
        assert!(is_extended_key(1 << 24));
        assert!(!is_extended_key(0x00FF_FFFF));
    }

    #[test]
    fn utf16_decoder_joins_surrogates() {
        let mut decoder = Utf16Decoder::new();
        assert_eq!(decoder.push(u16::from(b'a')), Some('a'));
        let mut units = [0u16; 2];
        '🎮'.encode_utf16(&mut units);
        assert_eq!(decoder.push(units[0]), None);
        assert_eq!(decoder.push(units[1]), Some('🎮'));
    }

    fn frame_context() -> dear_imgui_rs::Context {
        let mut imgui = dear_imgui_rs::Context::create();
        imgui.set_ini_filename(None::<String>).ok();
        let io = imgui.io_mut();
        io.set_display_size([128.0, 128.0]);
        io.set_delta_time(1.0 / 60.0);
        let flags = io.backend_flags() | dear_imgui_rs::BackendFlags::RENDERER_HAS_TEXTURES;
        io.set_backend_flags(flags);
        imgui
    }

    #[test]
    fn modifiers_drive_io_key_mods() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = frame_context();

        imgui.io_mut().add_key_event(Key::LeftCtrl, true);
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
        .submit(imgui.io_mut());
        imgui.frame();
        assert!(imgui.io().key_ctrl());
        assert!(!imgui.io().key_shift());
        imgui.render();

        imgui.io_mut().add_key_event(Key::LeftCtrl, false);
        Modifiers::default().submit(imgui.io_mut());
        imgui.frame();
        assert!(!imgui.io().key_ctrl());
        imgui.render();
    }

    #[test]
    fn utf16_decoder_drops_lone_low_surrogate() {
        let mut decoder = Utf16Decoder::new();
        assert_eq!(decoder.push(0xDC00), None);
        assert_eq!(decoder.push(u16::from(b'z')), Some('z'));
    }
}
