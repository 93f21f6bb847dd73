//! Dear ImGui overlay for an existing OpenGL 3.3 window
//!
//! Ties the GL3 renderer and the Win32 platform backend together behind the
//! handful of calls a host needs: set up once against the window's device
//! context, begin each frame, render the draw data, and shut down.
//!
//! The host owns the window and the GL context. Every call must happen on the
//! thread where that context is current.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(target_os = "windows")]
//! # fn run(hdc: isize) -> dear_overlay::OverlayResult<()> {
//! use dear_imgui_rs::Context;
//! use dear_overlay::{Overlay, OverlayConfig};
//!
//! let mut imgui = Context::create();
//! let mut overlay = Overlay::from_hdc(&mut imgui, hdc, OverlayConfig::default())?;
//!
//! // Each frame, after the host has drawn its own scene:
//! let ui = overlay.new_frame(&mut imgui)?;
//! ui.text("Hello from the overlay");
//! overlay.render(&mut imgui)?;
//!
//! // Before the GL context goes away:
//! overlay.shutdown(&mut imgui);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
#[cfg(target_os = "windows")]
mod gl_loader;

pub use config::OverlayConfig;
pub use error::{OverlayError, OverlayResult};

pub use dear_imgui_gl3 as gl3;
pub use dear_imgui_win32 as win32;

use dear_imgui_gl3::GlRenderer;
use dear_imgui_rs::{BackendFlags, Context, Ui};
use dear_imgui_win32::{HostWindow, Win32Platform};

/// Renderer and platform state for one window
pub struct Overlay<W: HostWindow> {
    renderer: GlRenderer,
    platform: Win32Platform<W>,
}

impl<W: HostWindow> Overlay<W> {
    /// Set up both backends.
    ///
    /// `gl` must wrap the context current on this thread. Device objects and
    /// the font atlas texture are created before this returns.
    pub fn initialize(
        imgui: &mut Context,
        gl: glow::Context,
        window: W,
        config: OverlayConfig,
    ) -> OverlayResult<Self> {
        imgui
            .set_ini_filename(config.ini_filename.clone())
            .map_err(|err| OverlayError::Config(err.to_string()))?;

        let renderer = GlRenderer::new(gl, imgui, config.renderer)?;
        let platform = Win32Platform::new(imgui, window, config.platform);

        tracing::info!(
            target: "dear-overlay",
            "overlay initialized on {}",
            renderer.gl_version()
        );
        Ok(Self { renderer, platform })
    }

    pub fn renderer(&self) -> &GlRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut GlRenderer {
        &mut self.renderer
    }

    pub fn platform(&self) -> &Win32Platform<W> {
        &self.platform
    }

    /// Begin a frame.
    ///
    /// Recreates device objects if they were invalidated, refreshes the
    /// display size and delta time, then starts the Dear ImGui frame.
    pub fn new_frame<'a>(&mut self, imgui: &'a mut Context) -> OverlayResult<&'a mut Ui> {
        self.renderer.new_frame(imgui)?;
        self.platform.prepare_frame(imgui);
        Ok(imgui.frame())
    }

    /// Finish the current frame and draw it into the current framebuffer
    pub fn render(&mut self, imgui: &mut Context) -> OverlayResult<()> {
        let draw_data = imgui.render();
        self.renderer.render(draw_data)?;
        Ok(())
    }

    /// Release GPU objects, e.g. before the host recreates its GL context.
    ///
    /// The next [`new_frame`](Self::new_frame) creates them again.
    pub fn invalidate_device_objects(&mut self, imgui: &mut Context) {
        self.renderer.invalidate_device_objects(imgui);
    }

    /// Release everything and detach from `imgui`.
    ///
    /// Must run while the GL context is still current.
    pub fn shutdown(mut self, imgui: &mut Context) {
        self.renderer.invalidate_device_objects(imgui);

        let _ = imgui.set_renderer_name(None::<String>);
        let _ = imgui.set_platform_name(None::<String>);
        let io = imgui.io_mut();
        let mut flags = io.backend_flags();
        flags.remove(BackendFlags::RENDERER_HAS_VTX_OFFSET | BackendFlags::RENDERER_HAS_TEXTURES);
        io.set_backend_flags(flags);

        tracing::info!(target: "dear-overlay", "overlay shut down");
    }

    /// Feed one window message to Dear ImGui.
    ///
    /// Returns `true` when Dear ImGui wants the event, in which case the host
    /// should not act on it.
    #[cfg(target_os = "windows")]
    pub fn handle_message(
        &mut self,
        imgui: &mut Context,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> bool {
        self.platform.handle_message(imgui, msg, wparam, lparam)
    }
}

#[cfg(target_os = "windows")]
impl Overlay<dear_imgui_win32::Win32Window> {
    /// Set up the overlay for the window behind `hdc`, using the GL context
    /// that is current on this thread.
    pub fn from_hdc(imgui: &mut Context, hdc: isize, config: OverlayConfig) -> OverlayResult<Self> {
        let window = dear_imgui_win32::Win32Window::from_hdc(hdc)?;
        let gl = gl_loader::load_current_context();
        Self::initialize(imgui, gl, window, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dear_imgui_gl3::InitError;
    use dear_imgui_win32::PlatformError;

    #[test]
    fn errors_convert_and_describe_their_source() {
        let err: OverlayError = InitError::UnsupportedVersion("OpenGL 2.1".into()).into();
        assert!(matches!(err, OverlayError::Init(_)));
        assert!(err.to_string().contains("OpenGL 2.1"));

        let err: OverlayError = PlatformError::NoWindowForDc(0x1234).into();
        assert!(matches!(err, OverlayError::Platform(_)));
        assert!(err.to_string().contains("0x1234"));
    }
}
