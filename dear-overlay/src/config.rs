use std::path::PathBuf;

use dear_imgui_gl3::RendererOptions;
use dear_imgui_win32::PlatformOptions;

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    pub renderer: RendererOptions,
    pub platform: PlatformOptions,
    /// Where Dear ImGui persists window layout; `None` disables the ini file
    pub ini_filename: Option<PathBuf>,
}

impl OverlayConfig {
    pub fn with_renderer(mut self, renderer: RendererOptions) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_platform(mut self, platform: PlatformOptions) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_ini_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.ini_filename = Some(path.into());
        self
    }
}
