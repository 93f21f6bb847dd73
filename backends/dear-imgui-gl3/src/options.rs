//! Renderer configuration

/// Knobs for [`GlRenderer`](crate::GlRenderer) construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RendererOptions {
    /// Service Dear ImGui 1.92 texture requests (`RENDERER_HAS_TEXTURES`)
    /// instead of building and uploading the font atlas once.
    pub dynamic_textures: bool,
    /// Draw with `glDrawElementsBaseVertex` when the context supports it,
    /// which lets Dear ImGui emit meshes above 64k vertices.
    pub vertex_offset: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            dynamic_textures: false,
            vertex_offset: cfg!(feature = "vertex_offset_support"),
        }
    }
}

impl RendererOptions {
    /// Options for hosts that let Dear ImGui drive texture creation
    pub fn with_dynamic_textures(mut self, enabled: bool) -> Self {
        self.dynamic_textures = enabled;
        self
    }

    /// Enable or disable base-vertex draws
    pub fn with_vertex_offset(mut self, enabled: bool) -> Self {
        self.vertex_offset = enabled;
        self
    }
}
