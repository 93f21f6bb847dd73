//! Error types for the Dear ImGui OpenGL 3 renderer

use thiserror::Error;

/// Errors that can occur while creating device objects
#[derive(Error, Debug)]
pub enum InitError {
    /// Failed to create OpenGL buffer object
    #[error("Failed to create buffer object: {0}")]
    CreateBufferObject(String),

    /// Failed to create OpenGL texture
    #[error("Failed to create texture: {0}")]
    CreateTexture(String),

    /// Failed to create OpenGL shader or program object
    #[error("Failed to create shader: {0}")]
    CreateShader(String),

    /// Shader stage failed to compile; carries the GL info log
    #[error("Failed to compile {stage} shader: {log}")]
    CompileShader { stage: &'static str, log: String },

    /// Program failed to link; carries the GL info log
    #[error("Failed to link program: {0}")]
    LinkProgram(String),

    /// Vertex attribute missing from the linked program
    #[error("Attribute `{0}` not found in shader program")]
    MissingAttribute(&'static str),

    /// Failed to create vertex array object
    #[error("Failed to create vertex array: {0}")]
    CreateVertexArray(String),

    /// OpenGL version not supported
    #[error("Unsupported OpenGL version: {0}")]
    UnsupportedVersion(String),

    /// Font atlas has no CPU-side pixels to upload
    #[error("Font atlas has no pixel data")]
    FontAtlasUnavailable,
}

/// Errors that can occur during rendering
#[derive(Error, Debug)]
pub enum RenderError {
    /// OpenGL error
    #[error("OpenGL error: {0}")]
    OpenGLError(String),

    /// Texture id does not name a GL texture
    #[error("Invalid texture: {0}")]
    InvalidTexture(String),

    /// Device objects were invalidated and not recreated
    #[error("Device objects are not created")]
    DeviceObjectsMissing,

    /// A texture request from Dear ImGui could not be serviced
    #[error("Texture upload failed: {0}")]
    TextureUpload(String),

    /// Recreating device objects failed
    #[error(transparent)]
    Init(#[from] InitError),
}

/// Result type for initialization operations
pub type InitResult<T> = Result<T, InitError>;

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
