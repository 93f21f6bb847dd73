//! Draw-list renderer and device object lifecycle

use std::mem::size_of;
use std::rc::Rc;

use dear_imgui_rs::{
    BackendFlags, Context as ImGuiContext, TextureData, TextureId, TextureStatus,
    render::{DrawCmd, DrawData, DrawIdx, DrawList, DrawVert},
};
use glow::{Context, HasContext};

use crate::{
    GlBuffer, GlTexture, GlVertexArray, RendererOptions,
    error::{InitError, InitResult, RenderError, RenderResult},
    font_atlas::{clear_font_atlas_id, upload_font_atlas},
    gl_debug_message,
    shaders::Shaders,
    state::GlStateBackup,
    texture::{
        SimpleTextureMap, TextureMap, clamp_rect, create_texture_rgba, gl_texture_for,
        texture_data_to_rgba, texture_data_to_rgba_subrect, texture_id_for, update_texture_rgba,
    },
    to_byte_slice,
    versions::GlVersion,
};

/// GPU objects shared by every draw call
#[derive(Debug)]
struct DeviceObjects {
    shaders: Shaders,
    vbo: GlBuffer,
    ebo: GlBuffer,
    vao: Option<GlVertexArray>,
}

impl DeviceObjects {
    #[cfg_attr(
        not(feature = "bind_vertex_array_support"),
        allow(unused_variables, unused_mut)
    )]
    fn create(gl: &Context, gl_version: GlVersion) -> InitResult<Self> {
        let shaders = Shaders::new(gl)?;

        let (vbo, ebo) = match unsafe { (gl.create_buffer(), gl.create_buffer()) } {
            (Ok(vbo), Ok(ebo)) => (vbo, ebo),
            (vbo, ebo) => {
                let mut reason = String::new();
                for result in [vbo, ebo] {
                    match result {
                        Ok(buffer) => unsafe { gl.delete_buffer(buffer) },
                        Err(err) => reason = err,
                    }
                }
                shaders.destroy(gl);
                return Err(InitError::CreateBufferObject(reason));
            }
        };

        let mut vao = None;
        #[cfg(feature = "bind_vertex_array_support")]
        if gl_version.bind_vertex_array_support() {
            match unsafe { gl.create_vertex_array() } {
                Ok(array) => vao = Some(array),
                Err(err) => {
                    unsafe {
                        gl.delete_buffer(vbo);
                        gl.delete_buffer(ebo);
                    }
                    shaders.destroy(gl);
                    return Err(InitError::CreateVertexArray(err));
                }
            }
        }

        Ok(Self {
            shaders,
            vbo,
            ebo,
            vao,
        })
    }

    fn destroy(self, gl: &Context) {
        unsafe {
            if let Some(vao) = self.vao {
                gl.delete_vertex_array(vao);
            }
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
        self.shaders.destroy(gl);
    }
}

/// OpenGL 3.3 renderer for Dear ImGui draw data
///
/// The renderer owns a shared handle to the GL context and must only be used
/// while that context is current on the calling thread.
pub struct GlRenderer {
    gl: Rc<Context>,
    options: RendererOptions,
    gl_version: GlVersion,
    device: Option<DeviceObjects>,
    font_texture: Option<GlTexture>,
    managed_textures: SimpleTextureMap,
    user_textures: SimpleTextureMap,
    state_backup: GlStateBackup,
}

impl GlRenderer {
    /// Create a renderer that takes ownership of `gl`
    pub fn new(
        gl: Context,
        imgui: &mut ImGuiContext,
        options: RendererOptions,
    ) -> InitResult<Self> {
        Self::with_shared_context(Rc::new(gl), imgui, options)
    }

    /// Create a renderer on a GL context the host also keeps a handle to.
    ///
    /// Fails with [`InitError::UnsupportedVersion`] below desktop OpenGL 3.3.
    pub fn with_shared_context(
        gl: Rc<Context>,
        imgui: &mut ImGuiContext,
        options: RendererOptions,
    ) -> InitResult<Self> {
        let gl_version = GlVersion::read(&gl);
        gl_version.ensure_supported()?;

        let mut renderer = Self {
            gl,
            options,
            gl_version,
            device: None,
            font_texture: None,
            managed_textures: SimpleTextureMap::new(),
            user_textures: SimpleTextureMap::new(),
            state_backup: GlStateBackup::default(),
        };
        renderer.configure_context(imgui);
        renderer.create_device_objects(imgui)?;

        tracing::debug!(
            target: "dear-imgui-gl3",
            "renderer initialized on {} (vertex offset: {}, dynamic textures: {})",
            gl_version,
            renderer.uses_vertex_offset(),
            options.dynamic_textures
        );
        Ok(renderer)
    }

    fn configure_context(&self, imgui: &mut ImGuiContext) {
        let _ = imgui.set_renderer_name(Some(format!(
            "dear-imgui-gl3 {}",
            env!("CARGO_PKG_VERSION")
        )));

        let io = imgui.io_mut();
        let mut flags = io.backend_flags();
        flags.set(BackendFlags::RENDERER_HAS_VTX_OFFSET, self.uses_vertex_offset());
        flags.set(
            BackendFlags::RENDERER_HAS_TEXTURES,
            self.options.dynamic_textures,
        );
        io.set_backend_flags(flags);
    }

    fn uses_vertex_offset(&self) -> bool {
        cfg!(feature = "vertex_offset_support")
            && self.options.vertex_offset
            && self.gl_version.vertex_offset_support()
    }

    pub fn gl_context(&self) -> &Rc<Context> {
        &self.gl
    }

    pub fn gl_version(&self) -> GlVersion {
        self.gl_version
    }

    pub fn options(&self) -> RendererOptions {
        self.options
    }

    /// GL texture holding the font atlas, when the atlas is uploaded once
    pub fn font_texture(&self) -> Option<GlTexture> {
        self.font_texture
    }

    /// Whether the program, buffers and (in one-shot atlas mode) the font
    /// texture currently exist
    pub fn has_device_objects(&self) -> bool {
        self.device.is_some() && (self.options.dynamic_textures || self.font_texture.is_some())
    }

    /// Call once per frame before `imgui.frame()`; recreates device objects
    /// after [`invalidate_device_objects`](Self::invalidate_device_objects).
    pub fn new_frame(&mut self, imgui: &mut ImGuiContext) -> InitResult<()> {
        if !self.has_device_objects() {
            self.create_device_objects(imgui)?;
        }
        Ok(())
    }

    /// Create whatever device objects are missing
    pub fn create_device_objects(&mut self, imgui: &mut ImGuiContext) -> InitResult<()> {
        if self.device.is_none() {
            self.device = Some(DeviceObjects::create(&self.gl, self.gl_version)?);
        }
        if !self.options.dynamic_textures && self.font_texture.is_none() {
            self.font_texture = Some(upload_font_atlas(&self.gl, imgui)?);
        }
        tracing::debug!(target: "dear-imgui-gl3", "device objects created");
        Ok(())
    }

    /// Delete all GL objects and clear the atlas texture id.
    ///
    /// Calling this again, or before anything was created, does nothing.
    pub fn invalidate_device_objects(&mut self, imgui: &mut ImGuiContext) {
        let had_font_texture = self.font_texture.is_some();
        self.destroy_device_objects();
        if had_font_texture {
            clear_font_atlas_id(imgui);
        }

        if self.options.dynamic_textures {
            // Textures Dear ImGui owns are re-requested once marked destroyed.
            for mut td in imgui.platform_io_mut().textures() {
                if td.ref_count() == 1 && td.status() != TextureStatus::Destroyed {
                    td.set_tex_id(TextureId::new(0));
                    td.set_status(TextureStatus::Destroyed);
                }
            }
        }
    }

    /// Delete all GL objects without touching the Dear ImGui context.
    ///
    /// Textures added with [`register_texture`](Self::register_texture) stay
    /// alive until [`unregister_texture`](Self::unregister_texture) or drop.
    pub fn destroy_device_objects(&mut self) {
        let gl = &self.gl;
        let mut destroyed = false;
        if let Some(device) = self.device.take() {
            device.destroy(gl);
            destroyed = true;
        }
        if let Some(texture) = self.font_texture.take() {
            unsafe { gl.delete_texture(texture) };
            destroyed = true;
        }
        for texture in self.managed_textures.drain() {
            unsafe { gl.delete_texture(texture) };
            destroyed = true;
        }
        if destroyed {
            tracing::debug!(target: "dear-imgui-gl3", "device objects destroyed");
        }
    }

    /// Upload an RGBA8 image and return the id to draw it with
    pub fn register_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> InitResult<TextureId> {
        let texture = create_texture_rgba(&self.gl, width, height, rgba)?;
        let texture_id = texture_id_for(texture);
        self.user_textures.insert(texture_id, texture);
        Ok(texture_id)
    }

    /// Delete a texture created by [`register_texture`](Self::register_texture)
    pub fn unregister_texture(&mut self, texture_id: TextureId) -> bool {
        match self.user_textures.remove(texture_id) {
            Some(texture) => {
                unsafe { self.gl.delete_texture(texture) };
                true
            }
            None => false,
        }
    }

    /// Service one texture request from Dear ImGui
    pub fn update_texture(&mut self, td: &mut TextureData) -> RenderResult<()> {
        match td.status() {
            TextureStatus::WantCreate => self.create_managed_texture(td),
            TextureStatus::WantUpdates => {
                let Some(texture) = self.managed_textures.get(td.tex_id()) else {
                    return self.create_managed_texture(td);
                };
                let (tw, th) = (
                    u32::try_from(td.width()).unwrap_or(0),
                    u32::try_from(td.height()).unwrap_or(0),
                );
                let (x, y, w, h) = clamp_rect(td.update_rect(), tw, th);
                if let Some(pixels) = texture_data_to_rgba_subrect(td, x, y, w, h) {
                    update_texture_rgba(&self.gl, texture, x, y, w, h, &pixels);
                }
                td.set_status(TextureStatus::OK);
                Ok(())
            }
            TextureStatus::WantDestroy => {
                if let Some(texture) = self.managed_textures.remove(td.tex_id()) {
                    unsafe { self.gl.delete_texture(texture) };
                }
                td.set_tex_id(TextureId::new(0));
                td.set_status(TextureStatus::Destroyed);
                Ok(())
            }
            TextureStatus::OK | TextureStatus::Destroyed => Ok(()),
        }
    }

    fn create_managed_texture(&mut self, td: &mut TextureData) -> RenderResult<()> {
        let (Ok(width), Ok(height)) = (u32::try_from(td.width()), u32::try_from(td.height()))
        else {
            return Err(RenderError::TextureUpload(format!(
                "invalid texture size {}x{}",
                td.width(),
                td.height()
            )));
        };
        let Some(pixels) = texture_data_to_rgba(td) else {
            tracing::warn!(
                target: "dear-imgui-gl3",
                "skipping texture request {}x{} without pixel data",
                width,
                height
            );
            return Ok(());
        };

        if let Some(old) = self.managed_textures.remove(td.tex_id()) {
            unsafe { self.gl.delete_texture(old) };
        }
        let texture = create_texture_rgba(&self.gl, width, height, &pixels)
            .map_err(|err| RenderError::TextureUpload(err.to_string()))?;
        let texture_id = texture_id_for(texture);
        self.managed_textures.insert(texture_id, texture);
        td.set_tex_id(texture_id);
        td.set_status(TextureStatus::OK);
        tracing::trace!(target: "dear-imgui-gl3", "created texture {}x{} as {}", width, height, texture.0);
        Ok(())
    }

    /// Draw a frame's draw data into the current framebuffer.
    ///
    /// Returns without touching GL when the framebuffer is empty. GL state
    /// is restored before returning, on success and on error.
    pub fn render(&mut self, draw_data: &DrawData) -> RenderResult<()> {
        for mut td in draw_data.textures() {
            if td.status() != TextureStatus::OK {
                self.update_texture(&mut td)?;
            }
        }

        let Some([fb_width, fb_height]) =
            framebuffer_size(draw_data.display_size, draw_data.framebuffer_scale)
        else {
            return Ok(());
        };
        if self.device.is_none() {
            return Err(RenderError::DeviceObjectsMissing);
        }

        let gl = Rc::clone(&self.gl);
        gl_debug_message(&gl, "dear-imgui-gl3: start render");
        self.state_backup.backup(&gl, self.gl_version);
        let result = self.render_draw_lists(&gl, draw_data, fb_width, fb_height);
        self.state_backup.restore(&gl, self.gl_version);
        gl_debug_message(&gl, "dear-imgui-gl3: end render");
        result
    }

    fn render_draw_lists(
        &self,
        gl: &Context,
        draw_data: &DrawData,
        fb_width: f32,
        fb_height: f32,
    ) -> RenderResult<()> {
        let device = self.device.as_ref().ok_or(RenderError::DeviceObjectsMissing)?;
        self.set_up_render_state(gl, device, draw_data, fb_width, fb_height);

        for draw_list in draw_data.draw_lists() {
            unsafe {
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    to_byte_slice(draw_list.vtx_buffer()),
                    glow::STREAM_DRAW,
                );
                gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    to_byte_slice(draw_list.idx_buffer()),
                    glow::STREAM_DRAW,
                );
            }

            for command in draw_list.commands() {
                match command {
                    DrawCmd::Elements {
                        count,
                        cmd_params,
                        raw_cmd,
                    } => {
                        // The atlas may be referenced through its TexData; ask ImGui
                        // for the effective id rather than the cached one.
                        let texture_id = TextureId::new(unsafe {
                            let mut cmd_copy = *raw_cmd;
                            dear_imgui_rs::sys::ImDrawCmd_GetTexID(&mut cmd_copy)
                        } as u64);
                        let Some(scissor) = scissor_rect(
                            cmd_params.clip_rect,
                            draw_data.display_pos,
                            draw_data.framebuffer_scale,
                            fb_height,
                        ) else {
                            continue;
                        };
                        self.draw_elements(
                            gl,
                            self.resolve_texture(texture_id)?,
                            scissor,
                            count,
                            cmd_params.idx_offset,
                            cmd_params.vtx_offset,
                        );
                    }
                    DrawCmd::ResetRenderState => {
                        self.set_up_render_state(gl, device, draw_data, fb_width, fb_height);
                    }
                    DrawCmd::RawCallback { callback, raw_cmd } => {
                        run_callback(draw_list, callback, raw_cmd);
                    }
                }
            }
        }
        Ok(())
    }

    /// GL texture a draw command with `texture_id` samples.
    ///
    /// Renderer-owned ids are looked up first; any other id must name a live
    /// GL texture, otherwise the font atlas is used.
    pub fn resolve_texture(&self, texture_id: TextureId) -> RenderResult<GlTexture> {
        if !texture_id.is_null() {
            if let Some(texture) = self
                .managed_textures
                .get(texture_id)
                .or_else(|| self.user_textures.get(texture_id))
                .or_else(|| {
                    gl_texture_for(texture_id)
                        .filter(|&texture| unsafe { self.gl.is_texture(texture) })
                })
            {
                return Ok(texture);
            }
            tracing::warn!(
                target: "dear-imgui-gl3",
                "texture id {} is not a GL texture name; drawing with the font atlas",
                texture_id.id()
            );
        }
        self.font_texture.ok_or_else(|| {
            RenderError::InvalidTexture(format!("no texture for id {}", texture_id.id()))
        })
    }

    fn set_up_render_state(
        &self,
        gl: &Context,
        device: &DeviceObjects,
        draw_data: &DrawData,
        fb_width: f32,
        fb_height: f32,
    ) {
        let shaders = &device.shaders;
        let projection = ortho_projection(draw_data.display_pos, draw_data.display_size);
        let stride = size_of::<DrawVert>() as i32;

        unsafe {
            gl.enable(glow::BLEND);
            gl.blend_equation(glow::FUNC_ADD);
            gl.blend_func_separate(
                glow::SRC_ALPHA,
                glow::ONE_MINUS_SRC_ALPHA,
                glow::ONE,
                glow::ONE_MINUS_SRC_ALPHA,
            );
            gl.disable(glow::CULL_FACE);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::STENCIL_TEST);
            gl.enable(glow::SCISSOR_TEST);

            gl.viewport(0, 0, fb_width as i32, fb_height as i32);
            gl.use_program(Some(shaders.program));
            gl.active_texture(glow::TEXTURE0);
            if let Some(location) = &shaders.uniform_texture {
                gl.uniform_1_i32(Some(location), 0);
            }
            if let Some(location) = &shaders.uniform_proj_mtx {
                gl.uniform_matrix_4_f32_slice(Some(location), false, &projection.concat());
            }

            #[cfg(feature = "bind_sampler_support")]
            if self.gl_version.bind_sampler_support() {
                gl.bind_sampler(0, None);
            }

            #[cfg(feature = "bind_vertex_array_support")]
            if let Some(vao) = device.vao {
                gl.bind_vertex_array(Some(vao));
            }

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(device.vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(device.ebo));
            gl.enable_vertex_attrib_array(shaders.attrib_position);
            gl.enable_vertex_attrib_array(shaders.attrib_uv);
            gl.enable_vertex_attrib_array(shaders.attrib_color);
            gl.vertex_attrib_pointer_f32(
                shaders.attrib_position,
                2,
                glow::FLOAT,
                false,
                stride,
                memoffset::offset_of!(DrawVert, pos) as i32,
            );
            gl.vertex_attrib_pointer_f32(
                shaders.attrib_uv,
                2,
                glow::FLOAT,
                false,
                stride,
                memoffset::offset_of!(DrawVert, uv) as i32,
            );
            // Packed RGBA8, normalized to [0, 1].
            gl.vertex_attrib_pointer_f32(
                shaders.attrib_color,
                4,
                glow::UNSIGNED_BYTE,
                true,
                stride,
                memoffset::offset_of!(DrawVert, col) as i32,
            );
        }
    }

    #[cfg_attr(not(feature = "vertex_offset_support"), allow(unused_variables))]
    fn draw_elements(
        &self,
        gl: &Context,
        texture: GlTexture,
        [x, y, w, h]: [i32; 4],
        count: usize,
        idx_offset: usize,
        vtx_offset: usize,
    ) {
        let byte_offset = (idx_offset * size_of::<DrawIdx>()) as i32;
        unsafe {
            gl.scissor(x, y, w, h);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            #[cfg(feature = "vertex_offset_support")]
            if self.uses_vertex_offset() {
                gl.draw_elements_base_vertex(
                    glow::TRIANGLES,
                    count as i32,
                    index_type(),
                    byte_offset,
                    vtx_offset as i32,
                );
                return;
            }
            gl.draw_elements(glow::TRIANGLES, count as i32, index_type(), byte_offset);
        }
    }
}

impl Drop for GlRenderer {
    fn drop(&mut self) {
        self.destroy_device_objects();
        for texture in self.user_textures.drain() {
            unsafe { self.gl.delete_texture(texture) };
        }
    }
}

fn run_callback(
    draw_list: &DrawList,
    callback: unsafe extern "C" fn(*const dear_imgui_rs::sys::ImDrawList, *const dear_imgui_rs::sys::ImDrawCmd),
    raw_cmd: *const dear_imgui_rs::sys::ImDrawCmd,
) {
    // SAFETY: both pointers come from the draw data being rendered and stay
    // valid for the duration of the render call.
    unsafe { callback((draw_list as *const DrawList).cast(), raw_cmd) };
}

/// GL index type matching the size of [`DrawIdx`]
pub fn index_type() -> u32 {
    if size_of::<DrawIdx>() == 2 {
        glow::UNSIGNED_SHORT
    } else {
        glow::UNSIGNED_INT
    }
}

/// Framebuffer size in pixels, `None` when either side is empty
pub fn framebuffer_size(display_size: [f32; 2], framebuffer_scale: [f32; 2]) -> Option<[f32; 2]> {
    let width = display_size[0] * framebuffer_scale[0];
    let height = display_size[1] * framebuffer_scale[1];
    (width > 0.0 && height > 0.0).then_some([width, height])
}

/// Column-major orthographic projection mapping the display rectangle to
/// clip space with Y pointing down
pub fn ortho_projection(display_pos: [f32; 2], display_size: [f32; 2]) -> [[f32; 4]; 4] {
    let l = display_pos[0];
    let r = display_pos[0] + display_size[0];
    let t = display_pos[1];
    let b = display_pos[1] + display_size[1];
    [
        [2.0 / (r - l), 0.0, 0.0, 0.0],
        [0.0, 2.0 / (t - b), 0.0, 0.0],
        [0.0, 0.0, -1.0, 0.0],
        [(r + l) / (l - r), (t + b) / (b - t), 0.0, 1.0],
    ]
}

/// `glScissor` arguments for a clip rectangle, with GL's bottom-left origin.
///
/// `None` when the projected rectangle is empty.
pub fn scissor_rect(
    clip_rect: [f32; 4],
    display_pos: [f32; 2],
    framebuffer_scale: [f32; 2],
    fb_height: f32,
) -> Option<[i32; 4]> {
    let min_x = (clip_rect[0] - display_pos[0]) * framebuffer_scale[0];
    let min_y = (clip_rect[1] - display_pos[1]) * framebuffer_scale[1];
    let max_x = (clip_rect[2] - display_pos[0]) * framebuffer_scale[0];
    let max_y = (clip_rect[3] - display_pos[1]) * framebuffer_scale[1];
    if max_x <= min_x || max_y <= min_y {
        return None;
    }
    Some([
        min_x as i32,
        (fb_height - max_y) as i32,
        (max_x - min_x) as i32,
        (max_y - min_y) as i32,
    ])
}
