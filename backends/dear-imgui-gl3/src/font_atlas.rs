//! One-shot font atlas upload

use crate::texture::{create_texture_rgba, texture_id_for};
use crate::{GlTexture, InitError, InitResult};
use dear_imgui_rs::{Context, TextureId};
use glow::Context as GlContext;

/// CPU copy of the built font atlas, always RGBA8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FontAtlasImage {
    /// Wrap atlas pixels of `bytes_per_pixel` 1 (Alpha8) or 4 (RGBA32).
    ///
    /// `None` for an empty atlas, an unknown format, or a short buffer.
    pub fn from_raw(width: u32, height: u32, bytes_per_pixel: u32, src: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let texels = (width as usize).checked_mul(height as usize)?;
        let src = src.get(..texels.checked_mul(bytes_per_pixel as usize)?)?;
        let pixels = match bytes_per_pixel {
            4 => src.to_vec(),
            1 => expand_alpha8_to_rgba(src),
            _ => return None,
        };
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build the atlas if needed and copy its pixels out of `imgui`
    pub fn from_context(imgui: &mut Context) -> Option<Self> {
        let mut fonts = imgui.font_atlas_mut();
        if !fonts.is_built() {
            fonts.build();
        }

        let raw_tex = fonts.get_tex_data();
        if raw_tex.is_null() {
            return None;
        }
        // SAFETY: the atlas is built, so TexData owns `Width * Height * BytesPerPixel`
        // bytes at `Pixels` until the next rebuild; we copy them before returning.
        unsafe {
            let width = u32::try_from((*raw_tex).Width).ok()?;
            let height = u32::try_from((*raw_tex).Height).ok()?;
            let bpp = u32::try_from((*raw_tex).BytesPerPixel).ok()?;
            let px_ptr = (*raw_tex).Pixels as *const u8;
            if px_ptr.is_null() {
                return None;
            }
            let len = (width as usize)
                .checked_mul(height as usize)?
                .checked_mul(bpp as usize)?;
            Self::from_raw(width, height, bpp, std::slice::from_raw_parts(px_ptr, len))
        }
    }
}

/// Alpha8 texels as white RGBA8 with the texel as alpha
pub fn expand_alpha8_to_rgba(alpha: &[u8]) -> Vec<u8> {
    alpha.iter().flat_map(|&a| [255, 255, 255, a]).collect()
}

/// Upload the atlas as a linear-filtered texture and record its GL name as
/// the atlas texture id.
pub(crate) fn upload_font_atlas(gl: &GlContext, imgui: &mut Context) -> InitResult<GlTexture> {
    let image = FontAtlasImage::from_context(imgui).ok_or(InitError::FontAtlasUnavailable)?;
    let texture = create_texture_rgba(gl, image.width, image.height, &image.pixels)?;
    imgui.font_atlas_mut().set_texture_id(texture_id_for(texture));

    tracing::debug!(
        target: "dear-imgui-gl3",
        "uploaded font atlas {}x{} as texture {}",
        image.width,
        image.height,
        texture.0
    );
    Ok(texture)
}

/// Clear the atlas texture id after its GL texture has been deleted
pub(crate) fn clear_font_atlas_id(imgui: &mut Context) {
    imgui.font_atlas_mut().set_texture_id(TextureId::new(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alpha8_expansion() {
        assert_eq!(
            expand_alpha8_to_rgba(&[0, 128]),
            vec![255, 255, 255, 0, 255, 255, 255, 128]
        );
        assert!(expand_alpha8_to_rgba(&[]).is_empty());
    }

    #[test]
    fn from_raw_accepts_both_formats() {
        let alpha = FontAtlasImage::from_raw(2, 1, 1, &[10, 20]).unwrap();
        assert_eq!(alpha.pixels, vec![255, 255, 255, 10, 255, 255, 255, 20]);

        let rgba = FontAtlasImage::from_raw(1, 1, 4, &[1, 2, 3, 4, 99]).unwrap();
        assert_eq!(rgba.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn from_raw_rejects_bad_input() {
        assert!(FontAtlasImage::from_raw(0, 4, 4, &[]).is_none());
        assert!(FontAtlasImage::from_raw(2, 2, 1, &[0; 3]).is_none());
        assert!(FontAtlasImage::from_raw(1, 1, 3, &[0; 3]).is_none());
    }

    #[test]
    fn built_default_atlas_is_readable() {
        let _guard = crate::test_util::lock_context();
        let mut imgui = Context::create();
        let image = FontAtlasImage::from_context(&mut imgui).expect("atlas pixels");
        assert!(image.width > 0 && image.height > 0);
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
    }
}
