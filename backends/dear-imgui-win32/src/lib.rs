//! Win32 platform backend for Dear ImGui
//!
//! Supplies what Dear ImGui needs from the host each frame when it is drawn
//! into an existing window: the display size (the window's client rectangle),
//! the delta time from a monotonic clock, and keyboard/mouse input translated
//! from window messages.
//!
//! The window is reached through [`HostWindow`]. On Windows, [`Win32Window`]
//! implements it for the window behind a device context or a
//! `raw-window-handle` provider; elsewhere hosts can provide their own.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(target_os = "windows")]
//! # fn run(hdc: isize) -> Result<(), dear_imgui_win32::PlatformError> {
//! use dear_imgui_rs::Context;
//! use dear_imgui_win32::{PlatformOptions, Win32Platform, Win32Window};
//!
//! let mut imgui = Context::create();
//! let mut platform = Win32Platform::new(
//!     &mut imgui,
//!     Win32Window::from_hdc(hdc)?,
//!     PlatformOptions::default(),
//! );
//!
//! // From the window procedure:
//! // if platform.handle_message(&mut imgui, msg, wparam, lparam) { return 0; }
//!
//! // Each frame:
//! platform.prepare_frame(&mut imgui);
//! let _ui = imgui.frame();
//! # Ok(())
//! # }
//! ```

mod clock;
mod error;
mod input;
#[cfg(target_os = "windows")]
mod keys;
mod options;
mod platform;
mod window;

pub use clock::FrameClock;
pub use error::{PlatformError, PlatformResult};
pub use input::{
    Modifiers, Utf16Decoder, is_extended_key, is_first_xbutton, mouse_position, virtual_key, wheel_notches,
};
#[cfg(target_os = "windows")]
pub use keys::KeyMap;
pub use options::PlatformOptions;
pub use platform::Win32Platform;
pub use window::HostWindow;
#[cfg(target_os = "windows")]
pub use window::Win32Window;

#[cfg(test)]
pub(crate) mod test_util {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard};

    static CTX_TEST_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    pub fn lock_context() -> MutexGuard<'static, ()> {
        CTX_TEST_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
