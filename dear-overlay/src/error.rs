use thiserror::Error;

/// Errors surfaced by [`Overlay`](crate::Overlay)
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Renderer initialization failed: {0}")]
    Init(#[from] dear_imgui_gl3::InitError),

    #[error("Rendering failed: {0}")]
    Render(#[from] dear_imgui_gl3::RenderError),

    #[error("Platform error: {0}")]
    Platform(#[from] dear_imgui_win32::PlatformError),

    /// The Dear ImGui context rejected a configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
