//! OpenGL 3.3 renderer for Dear ImGui
//!
//! This crate renders Dear ImGui draw data with a GLSL 330 program through
//! the [`glow`] OpenGL abstraction. It is meant to be called from inside a
//! host application's own render loop: every piece of GL state the renderer
//! touches is captured before drawing and restored afterwards.
//!
//! # Features
//!
//! - **Draw-list rendering**: stream-uploads vertex/index buffers per command
//!   list, clips with scissor rectangles and honours user callbacks
//! - **Font atlas upload**: uploads the atlas once and hands the GL texture
//!   name back to Dear ImGui
//! - **Dynamic textures** (opt-in): services Dear ImGui 1.92 texture requests
//! - **Device object lifecycle**: lazy creation and idempotent teardown
//!
//! # Example
//!
//! ```rust,no_run
//! use dear_imgui_rs::Context;
//! use dear_imgui_gl3::{GlRenderer, RendererOptions};
//!
//! let gl = unsafe {
//!     glow::Context::from_loader_function(|_symbol| std::ptr::null())
//! };
//! let mut imgui = Context::create();
//! let mut renderer = GlRenderer::new(gl, &mut imgui, RendererOptions::default()).unwrap();
//!
//! // In your render loop:
//! // renderer.new_frame(&mut imgui)?;
//! // let ui = imgui.frame();
//! // ... build your UI ...
//! // let draw_data = imgui.render();
//! // renderer.render(draw_data)?;
//! ```

// Re-export glow so hosts can build the context with the matching version.
pub use glow;
use glow::{Context, HasContext};

mod error;
mod font_atlas;
mod options;
mod renderer;
mod shaders;
mod state;
mod texture;
mod versions;

pub use error::*;
pub use font_atlas::{FontAtlasImage, expand_alpha8_to_rgba};
pub use options::RendererOptions;
pub use renderer::*;
pub use shaders::{FRAGMENT_SHADER_SOURCE, VERTEX_SHADER_SOURCE};
pub use state::GlStateBackup;
pub use texture::*;
pub use versions::*;

pub type GlBuffer = <Context as HasContext>::Buffer;
pub type GlTexture = <Context as HasContext>::Texture;
pub type GlVertexArray = <Context as HasContext>::VertexArray;
pub type GlProgram = <Context as HasContext>::Program;
pub type GlUniformLocation = <Context as HasContext>::UniformLocation;

/// Reinterpret a slice of plain vertex/index data as bytes for upload
#[inline]
fn to_byte_slice<T>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

#[cfg(feature = "debug_message_insert_support")]
fn gl_debug_message(gl: &Context, message: &str) {
    unsafe {
        gl.debug_message_insert(
            glow::DEBUG_SOURCE_APPLICATION,
            glow::DEBUG_TYPE_MARKER,
            0,
            glow::DEBUG_SEVERITY_NOTIFICATION,
            message,
        );
    }
}

#[cfg(not(feature = "debug_message_insert_support"))]
fn gl_debug_message(_gl: &Context, _message: &str) {}

#[cfg(test)]
pub(crate) mod test_util {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard};

    // Only one Dear ImGui context may be alive at a time.
    static CTX_TEST_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    pub fn lock_context() -> MutexGuard<'static, ()> {
        CTX_TEST_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
