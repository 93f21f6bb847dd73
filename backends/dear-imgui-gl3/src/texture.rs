//! Texture objects and the mapping between Dear ImGui ids and GL names
//!
//! A [`TextureId`] handed to Dear ImGui by this renderer is always the GL
//! texture name itself, so host code can draw its own textures with
//! `ui.image(texture_id_for(tex), ...)` without going through a lookup table.

use crate::{GlTexture, InitError, InitResult};
use dear_imgui_rs::texture::TextureRect;
use dear_imgui_rs::{TextureData, TextureFormat, TextureId};
use glow::{Context, HasContext};
use std::collections::HashMap;
use std::num::NonZeroU32;

/// Dear ImGui id for a GL texture
pub fn texture_id_for(texture: GlTexture) -> TextureId {
    TextureId::new(u64::from(texture.0.get()))
}

/// GL texture named by a Dear ImGui id, `None` for the null id or an id
/// outside the GL name range
pub fn gl_texture_for(texture_id: TextureId) -> Option<GlTexture> {
    let name = u32::try_from(texture_id.id()).ok()?;
    NonZeroU32::new(name).map(glow::NativeTexture)
}

/// Textures owned by the renderer, keyed by the id Dear ImGui sees
pub trait TextureMap {
    fn get(&self, texture_id: TextureId) -> Option<GlTexture>;

    fn insert(&mut self, texture_id: TextureId, texture: GlTexture) -> Option<GlTexture>;

    fn remove(&mut self, texture_id: TextureId) -> Option<GlTexture>;

    /// Remove every entry, returning the textures so the caller can delete them
    fn drain(&mut self) -> Vec<GlTexture>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`TextureMap`] backed by a `HashMap`
#[derive(Debug, Default)]
pub struct SimpleTextureMap {
    textures: HashMap<TextureId, GlTexture>,
}

impl SimpleTextureMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextureMap for SimpleTextureMap {
    fn get(&self, texture_id: TextureId) -> Option<GlTexture> {
        self.textures.get(&texture_id).copied()
    }

    fn insert(&mut self, texture_id: TextureId, texture: GlTexture) -> Option<GlTexture> {
        self.textures.insert(texture_id, texture)
    }

    fn remove(&mut self, texture_id: TextureId) -> Option<GlTexture> {
        self.textures.remove(&texture_id)
    }

    fn drain(&mut self) -> Vec<GlTexture> {
        self.textures.drain().map(|(_, texture)| texture).collect()
    }

    fn len(&self) -> usize {
        self.textures.len()
    }
}

/// Texture binding and pixel unpack parameters touched by an upload
struct UploadState {
    texture: i32,
    row_length: i32,
    alignment: i32,
}

impl UploadState {
    unsafe fn capture(gl: &Context) -> Self {
        unsafe {
            Self {
                texture: gl.get_parameter_i32(glow::TEXTURE_BINDING_2D),
                row_length: gl.get_parameter_i32(glow::UNPACK_ROW_LENGTH),
                alignment: gl.get_parameter_i32(glow::UNPACK_ALIGNMENT),
            }
        }
    }

    unsafe fn prepare_tight_rows(gl: &Context) {
        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ROW_LENGTH, 0);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }
    }

    unsafe fn restore(&self, gl: &Context) {
        let texture = NonZeroU32::new(self.texture as u32).map(glow::NativeTexture);
        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ROW_LENGTH, self.row_length);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, self.alignment);
            gl.bind_texture(glow::TEXTURE_2D, texture);
        }
    }
}

/// Create an RGBA8 texture with linear filtering and clamped edges.
///
/// The host's `TEXTURE_BINDING_2D` and pixel unpack parameters are left as found.
pub fn create_texture_rgba(
    gl: &Context,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> InitResult<GlTexture> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() < expected {
        return Err(InitError::CreateTexture(format!(
            "{width}x{height} RGBA upload needs {expected} bytes, got {}",
            pixels.len()
        )));
    }

    unsafe {
        let texture = gl.create_texture().map_err(InitError::CreateTexture)?;
        let saved = UploadState::capture(gl);

        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        UploadState::prepare_tight_rows(gl);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&pixels[..expected])),
        );

        saved.restore(gl);
        Ok(texture)
    }
}

/// Overwrite a sub-rectangle of an RGBA8 texture
pub fn update_texture_rgba(
    gl: &Context,
    texture: GlTexture,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    pixels: &[u8],
) {
    unsafe {
        let saved = UploadState::capture(gl);
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        UploadState::prepare_tight_rows(gl);
        gl.tex_sub_image_2d(
            glow::TEXTURE_2D,
            0,
            x as i32,
            y as i32,
            width as i32,
            height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(pixels)),
        );
        saved.restore(gl);
    }
}

/// Full contents of `td` as tightly packed RGBA8
pub fn texture_data_to_rgba(td: &TextureData) -> Option<Vec<u8>> {
    let (w, h) = (u32::try_from(td.width()).ok()?, u32::try_from(td.height()).ok()?);
    texture_data_to_rgba_subrect(td, 0, 0, w, h)
}

/// A sub-rectangle of `td` as tightly packed RGBA8.
///
/// Alpha8 texels become opaque white with the texel as alpha. The rectangle
/// is clipped to the texture; `None` when nothing remains or there are no
/// CPU-side pixels.
pub fn texture_data_to_rgba_subrect(
    td: &TextureData,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> Option<Vec<u8>> {
    let pixels = td.pixels()?;
    let tex_w = usize::try_from(td.width()).ok()?;
    let tex_h = usize::try_from(td.height()).ok()?;
    let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
    if w == 0 || h == 0 || x >= tex_w || y >= tex_h {
        return None;
    }
    let w = w.min(tex_w - x);
    let h = h.min(tex_h - y);
    let bpp = usize::try_from(td.bytes_per_pixel()).ok()?;

    let mut out = Vec::with_capacity(w.checked_mul(h)?.checked_mul(4)?);
    for row in y..y + h {
        let start = (row * tex_w + x) * bpp;
        let src = pixels.get(start..start + w * bpp)?;
        match td.format() {
            TextureFormat::RGBA32 => out.extend_from_slice(src),
            TextureFormat::Alpha8 => out.extend(src.iter().flat_map(|&a| [255, 255, 255, a])),
        }
    }
    Some(out)
}

/// Clip an update rectangle to a `tw` x `th` texture
pub fn clamp_rect(rect: TextureRect, tw: u32, th: u32) -> (u32, u32, u32, u32) {
    let x = u32::from(rect.x).min(tw);
    let y = u32::from(rect.y).min(th);
    let (w, h) = (u32::from(rect.w), u32::from(rect.h));
    if w == 0 || h == 0 || x >= tw || y >= th {
        return (x, y, 0, 0);
    }
    (x, y, w.min(tw - x), h.min(th - y))
}
