//! Per-frame platform bootstrap

use dear_imgui_rs::{Context, Key};

use crate::{FrameClock, HostWindow, Modifiers, PlatformOptions, Utf16Decoder};
#[cfg(target_os = "windows")]
use crate::KeyMap;

const MODIFIER_KEYS: [Key; 8] = [
    Key::LeftShift,
    Key::RightShift,
    Key::LeftCtrl,
    Key::RightCtrl,
    Key::LeftAlt,
    Key::RightAlt,
    Key::LeftSuper,
    Key::RightSuper,
];

/// Feeds Dear ImGui the host window's size, frame timing and input
pub struct Win32Platform<W> {
    window: W,
    clock: FrameClock,
    has_focus: bool,
    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    utf16: Utf16Decoder,
    #[cfg(target_os = "windows")]
    key_map: KeyMap,
}

impl<W: HostWindow> Win32Platform<W> {
    /// Attach to `window` and register the platform with `imgui`
    ///
    /// ```no_run
    /// # #[cfg(target_os = "windows")]
    /// # fn attach(hdc: isize) -> Result<(), dear_imgui_win32::PlatformError> {
    /// use dear_imgui_rs::Context;
    /// use dear_imgui_win32::{PlatformOptions, Win32Platform, Win32Window};
    ///
    /// let mut imgui = Context::create();
    /// let window = Win32Window::from_hdc(hdc)?;
    /// let mut platform = Win32Platform::new(&mut imgui, window, PlatformOptions::default());
    /// platform.prepare_frame(&mut imgui);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(imgui: &mut Context, window: W, options: PlatformOptions) -> Self {
        let _ = imgui.set_platform_name(Some(format!(
            "dear-imgui-win32 {}",
            env!("CARGO_PKG_VERSION")
        )));

        let platform = Self {
            window,
            clock: FrameClock::new(options),
            has_focus: true,
            utf16: Utf16Decoder::new(),
            #[cfg(target_os = "windows")]
            key_map: KeyMap::new(),
        };
        platform.update_display_size(imgui);
        platform
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Call once per frame before `imgui.frame()`
    pub fn prepare_frame(&mut self, imgui: &mut Context) {
        self.update_display_size(imgui);
        let delta = self.clock.tick();
        imgui.io_mut().set_delta_time(delta);

        let focused = self.window.is_focused();
        if self.has_focus && !focused {
            // Key-up messages go to whichever window took focus.
            let io = imgui.io_mut();
            for key in MODIFIER_KEYS {
                io.add_key_event(key, false);
            }
            Modifiers::default().submit(io);
            tracing::trace!(target: "dear-imgui-win32", "focus lost; released modifiers");
        }
        self.has_focus = focused;
    }

    fn update_display_size(&self, imgui: &mut Context) {
        let [width, height] = self.window.client_size().unwrap_or([0, 0]);
        let io = imgui.io_mut();
        io.set_display_size([width as f32, height as f32]);
        io.set_display_framebuffer_scale([1.0, 1.0]);
    }

    /// Feed one window message to Dear ImGui.
    ///
    /// Returns `true` when Dear ImGui wants the event for itself, so the host
    /// should not act on it.
    #[cfg(target_os = "windows")]
    pub fn handle_message(
        &mut self,
        imgui: &mut Context,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> bool {
        crate::input::dispatch(imgui, &self.key_map, &mut self.utf16, msg, wparam, lparam)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeWindow {
        size: Cell<Option<[u32; 2]>>,
        focused: Cell<bool>,
    }

    impl FakeWindow {
        fn new(size: [u32; 2]) -> Self {
            Self {
                size: Cell::new(Some(size)),
                focused: Cell::new(true),
            }
        }
    }

    impl HostWindow for FakeWindow {
        fn client_size(&self) -> Option<[u32; 2]> {
            self.size.get()
        }

        fn is_focused(&self) -> bool {
            self.focused.get()
        }
    }

    #[test]
    fn display_size_follows_client_rect() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = Context::create();
        let window = FakeWindow::new([800, 600]);
        let mut platform = Win32Platform::new(&mut imgui, &window, PlatformOptions::default());
        assert_eq!(imgui.io().display_size(), [800.0, 600.0]);

        window.size.set(Some([1280, 720]));
        platform.prepare_frame(&mut imgui);
        assert_eq!(imgui.io().display_size(), [1280.0, 720.0]);

        window.size.set(None);
        platform.prepare_frame(&mut imgui);
        assert_eq!(imgui.io().display_size(), [0.0, 0.0]);
    }

    #[test]
    fn first_frame_delta_is_configured_value() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = Context::create();
        let options = PlatformOptions::default().with_first_frame_delta(0.25);
        let mut platform = Win32Platform::new(&mut imgui, FakeWindow::new([64, 64]), options);

        platform.prepare_frame(&mut imgui);
        approx::assert_relative_eq!(imgui.io().delta_time(), 0.25);

        platform.prepare_frame(&mut imgui);
        assert!(imgui.io().delta_time() > 0.0);
    }

    #[test]
    fn focus_loss_is_tracked() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = Context::create();
        let window = FakeWindow::new([64, 64]);
        let mut platform = Win32Platform::new(&mut imgui, &window, PlatformOptions::default());

        window.focused.set(false);
        platform.prepare_frame(&mut imgui);
        assert!(!platform.has_focus);
        window.focused.set(true);
        platform.prepare_frame(&mut imgui);
        assert!(platform.has_focus);
    }

    #[test]
    fn focus_loss_releases_held_modifiers() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = Context::create();
        imgui.set_ini_filename(None::<String>).ok();
        let flags = imgui.io().backend_flags() | dear_imgui_rs::BackendFlags::RENDERER_HAS_TEXTURES;
        imgui.io_mut().set_backend_flags(flags);
        let window = FakeWindow::new([64, 64]);
        let mut platform = Win32Platform::new(&mut imgui, &window, PlatformOptions::default());

        imgui.io_mut().add_key_event(Key::LeftShift, true);
        Modifiers {
            shift: true,
            ..Modifiers::default()
        }
        .submit(imgui.io_mut());
        platform.prepare_frame(&mut imgui);
        imgui.frame();
        assert!(imgui.io().key_shift());
        imgui.render();

        window.focused.set(false);
        platform.prepare_frame(&mut imgui);
        imgui.frame();
        assert!(!imgui.io().key_shift());
        imgui.render();
    }
}
