//! The host window the overlay draws into

/// What the platform needs to know about the host window each frame
pub trait HostWindow {
    /// Client area size in pixels, `None` if the window is gone
    fn client_size(&self) -> Option<[u32; 2]>;

    /// Whether the window currently has keyboard focus
    fn is_focused(&self) -> bool {
        true
    }
}

impl<W: HostWindow + ?Sized> HostWindow for &W {
    fn client_size(&self) -> Option<[u32; 2]> {
        (**self).client_size()
    }

    fn is_focused(&self) -> bool {
        (**self).is_focused()
    }
}

#[cfg(target_os = "windows")]
pub use self::win32::Win32Window;

#[cfg(target_os = "windows")]
mod win32 {
    use super::HostWindow;
    use crate::{PlatformError, PlatformResult};
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use windows_sys::Win32::Foundation::{HWND, RECT};
    use windows_sys::Win32::Graphics::Gdi::{HDC, WindowFromDC};
    use windows_sys::Win32::UI::WindowsAndMessaging::{GetClientRect, GetForegroundWindow, IsWindow};

    /// A native window, usually found from the device context the host
    /// renders to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Win32Window {
        hwnd: HWND,
    }

    impl Win32Window {
        /// Window owning `hdc`
        pub fn from_hdc(hdc: HDC) -> PlatformResult<Self> {
            let hwnd = unsafe { WindowFromDC(hdc) };
            if hwnd == 0 {
                return Err(PlatformError::NoWindowForDc(hdc));
            }
            tracing::debug!(target: "dear-imgui-win32", "attached to window {:#x} from dc {:#x}", hwnd, hdc);
            Ok(Self { hwnd })
        }

        pub fn from_raw_handle(handle: RawWindowHandle) -> PlatformResult<Self> {
            match handle {
                RawWindowHandle::Win32(handle) => Ok(Self {
                    hwnd: handle.hwnd.get(),
                }),
                other => Err(PlatformError::UnsupportedHandle(format!("{other:?}"))),
            }
        }

        /// Window behind any `raw-window-handle` provider
        pub fn from_window(window: &impl HasWindowHandle) -> PlatformResult<Self> {
            Self::from_raw_handle(window.window_handle()?.as_raw())
        }

        pub fn hwnd(&self) -> HWND {
            self.hwnd
        }
    }

    impl HostWindow for Win32Window {
        fn client_size(&self) -> Option<[u32; 2]> {
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
            };
            unsafe {
                if IsWindow(self.hwnd) == 0 || GetClientRect(self.hwnd, &mut rect) == 0 {
                    return None;
                }
            }
            let width = u32::try_from(rect.right - rect.left).unwrap_or(0);
            let height = u32::try_from(rect.bottom - rect.top).unwrap_or(0);
            Some([width, height])
        }

        fn is_focused(&self) -> bool {
            unsafe { GetForegroundWindow() == self.hwnd }
        }
    }
}
