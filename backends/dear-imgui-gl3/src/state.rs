//! Snapshot of the host's GL state around a render call

use crate::{GlBuffer, GlProgram, GlTexture, GlVersion, GlVertexArray};
use glow::{Context, HasContext};
use std::num::NonZeroU32;

/// Everything [`GlRenderer::render`](crate::GlRenderer::render) changes.
///
/// Captured before drawing and written back afterwards so the host's next
/// draw call sees exactly what it left behind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlStateBackup {
    blend_enabled: bool,
    blend_src_rgb: u32,
    blend_dst_rgb: u32,
    blend_src_alpha: u32,
    blend_dst_alpha: u32,
    blend_equation_rgb: u32,
    blend_equation_alpha: u32,

    viewport: [i32; 4],
    scissor_test_enabled: bool,
    scissor_box: [i32; 4],

    array_buffer: Option<GlBuffer>,
    element_array_buffer: Option<GlBuffer>,
    vertex_array: Option<GlVertexArray>,

    active_texture: u32,
    texture_2d: Option<GlTexture>,
    program: Option<GlProgram>,

    cull_face_enabled: bool,
    depth_test_enabled: bool,
    stencil_test_enabled: bool,

    sampler: Option<<Context as HasContext>::Sampler>,
}

fn gl_name(value: i32) -> Option<NonZeroU32> {
    NonZeroU32::new(value as u32)
}

impl GlStateBackup {
    #[cfg_attr(
        not(any(feature = "bind_vertex_array_support", feature = "bind_sampler_support")),
        allow(unused_variables)
    )]
    pub fn backup(&mut self, gl: &Context, gl_version: GlVersion) {
        unsafe {
            self.blend_enabled = gl.is_enabled(glow::BLEND);
            self.blend_src_rgb = gl.get_parameter_i32(glow::BLEND_SRC_RGB) as u32;
            self.blend_dst_rgb = gl.get_parameter_i32(glow::BLEND_DST_RGB) as u32;
            self.blend_src_alpha = gl.get_parameter_i32(glow::BLEND_SRC_ALPHA) as u32;
            self.blend_dst_alpha = gl.get_parameter_i32(glow::BLEND_DST_ALPHA) as u32;
            self.blend_equation_rgb = gl.get_parameter_i32(glow::BLEND_EQUATION_RGB) as u32;
            self.blend_equation_alpha = gl.get_parameter_i32(glow::BLEND_EQUATION_ALPHA) as u32;

            gl.get_parameter_i32_slice(glow::VIEWPORT, &mut self.viewport);
            self.scissor_test_enabled = gl.is_enabled(glow::SCISSOR_TEST);
            gl.get_parameter_i32_slice(glow::SCISSOR_BOX, &mut self.scissor_box);

            self.array_buffer =
                gl_name(gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING)).map(glow::NativeBuffer);
            self.element_array_buffer =
                gl_name(gl.get_parameter_i32(glow::ELEMENT_ARRAY_BUFFER_BINDING))
                    .map(glow::NativeBuffer);

            self.vertex_array = None;
            #[cfg(feature = "bind_vertex_array_support")]
            if gl_version.bind_vertex_array_support() {
                self.vertex_array = gl_name(gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING))
                    .map(glow::NativeVertexArray);
            }

            self.active_texture = gl.get_parameter_i32(glow::ACTIVE_TEXTURE) as u32;
            // Texture and sampler bindings are per unit; read unit 0, the one we draw with.
            gl.active_texture(glow::TEXTURE0);
            self.texture_2d =
                gl_name(gl.get_parameter_i32(glow::TEXTURE_BINDING_2D)).map(glow::NativeTexture);
            self.sampler = None;
            #[cfg(feature = "bind_sampler_support")]
            if gl_version.bind_sampler_support() {
                self.sampler =
                    gl_name(gl.get_parameter_i32(glow::SAMPLER_BINDING)).map(glow::NativeSampler);
            }
            gl.active_texture(self.active_texture);
            self.program =
                gl_name(gl.get_parameter_i32(glow::CURRENT_PROGRAM)).map(glow::NativeProgram);

            self.cull_face_enabled = gl.is_enabled(glow::CULL_FACE);
            self.depth_test_enabled = gl.is_enabled(glow::DEPTH_TEST);
            self.stencil_test_enabled = gl.is_enabled(glow::STENCIL_TEST);
        }
    }

    #[cfg_attr(
        not(any(feature = "bind_vertex_array_support", feature = "bind_sampler_support")),
        allow(unused_variables)
    )]
    pub fn restore(&self, gl: &Context, gl_version: GlVersion) {
        unsafe {
            gl.use_program(self.program);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.texture_2d);
            #[cfg(feature = "bind_sampler_support")]
            if gl_version.bind_sampler_support() {
                gl.bind_sampler(0, self.sampler);
            }
            gl.active_texture(self.active_texture);

            #[cfg(feature = "bind_vertex_array_support")]
            if gl_version.bind_vertex_array_support() {
                gl.bind_vertex_array(self.vertex_array);
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
            // Element binding is VAO state; restore it after the VAO.
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.element_array_buffer);

            gl.blend_equation_separate(self.blend_equation_rgb, self.blend_equation_alpha);
            gl.blend_func_separate(
                self.blend_src_rgb,
                self.blend_dst_rgb,
                self.blend_src_alpha,
                self.blend_dst_alpha,
            );

            set_capability(gl, glow::BLEND, self.blend_enabled);
            set_capability(gl, glow::CULL_FACE, self.cull_face_enabled);
            set_capability(gl, glow::DEPTH_TEST, self.depth_test_enabled);
            set_capability(gl, glow::STENCIL_TEST, self.stencil_test_enabled);
            set_capability(gl, glow::SCISSOR_TEST, self.scissor_test_enabled);

            let [x, y, w, h] = self.viewport;
            gl.viewport(x, y, w, h);
            let [x, y, w, h] = self.scissor_box;
            gl.scissor(x, y, w, h);
        }
    }

    /// Whether the host had blending enabled when the snapshot was taken
    pub fn blend_enabled(&self) -> bool {
        self.blend_enabled
    }

    /// Host viewport at snapshot time
    pub fn viewport(&self) -> [i32; 4] {
        self.viewport
    }
}

unsafe fn set_capability(gl: &Context, capability: u32, enabled: bool) {
    unsafe {
        if enabled {
            gl.enable(capability);
        } else {
            gl.disable(capability);
        }
    }
}
