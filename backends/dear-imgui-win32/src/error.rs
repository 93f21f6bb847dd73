//! Error types for the Win32 platform backend

use thiserror::Error;

/// Errors raised while attaching to a native window
#[derive(Error, Debug)]
pub enum PlatformError {
    /// `WindowFromDC` returned no window for the device context
    #[error("No window is associated with device context {0:#x}")]
    NoWindowForDc(isize),

    /// The raw window handle is not a Win32 handle
    #[error("Unsupported window handle: {0}")]
    UnsupportedHandle(String),

    /// The windowing library could not provide a handle
    #[error(transparent)]
    Handle(#[from] raw_window_handle::HandleError),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
