//! GLSL 330 program used for every draw call

use crate::{GlProgram, GlUniformLocation, InitError, InitResult};
use glow::{Context, HasContext};

/// Vertex stage: transforms `Position` by `ProjMtx` and forwards UV/colour.
pub const VERTEX_SHADER_SOURCE: &str = r#"#version 330 core
uniform mat4 ProjMtx;
in vec2 Position;
in vec2 UV;
in vec4 Color;
out vec2 Frag_UV;
out vec4 Frag_Color;
void main()
{
    Frag_UV = UV;
    Frag_Color = Color;
    gl_Position = ProjMtx * vec4(Position.xy, 0, 1);
}
"#;

/// Fragment stage: vertex colour modulated by the bound texture.
pub const FRAGMENT_SHADER_SOURCE: &str = r#"#version 330 core
uniform sampler2D Texture;
in vec2 Frag_UV;
in vec4 Frag_Color;
out vec4 Out_Color;
void main()
{
    Out_Color = Frag_Color * texture(Texture, Frag_UV.st);
}
"#;

/// Linked program plus the locations the renderer binds every frame
#[derive(Debug)]
pub struct Shaders {
    pub program: GlProgram,
    pub uniform_texture: Option<GlUniformLocation>,
    pub uniform_proj_mtx: Option<GlUniformLocation>,
    pub attrib_position: u32,
    pub attrib_uv: u32,
    pub attrib_color: u32,
}

impl Shaders {
    /// Compile both stages, link, and look up locations.
    ///
    /// Partially created GL objects are deleted on every error path.
    pub fn new(gl: &Context) -> InitResult<Self> {
        unsafe {
            let vertex_shader = compile_stage(gl, glow::VERTEX_SHADER, "vertex", VERTEX_SHADER_SOURCE)?;
            let fragment_shader = match compile_stage(
                gl,
                glow::FRAGMENT_SHADER,
                "fragment",
                FRAGMENT_SHADER_SOURCE,
            ) {
                Ok(shader) => shader,
                Err(err) => {
                    gl.delete_shader(vertex_shader);
                    return Err(err);
                }
            };

            let program = match gl.create_program() {
                Ok(program) => program,
                Err(err) => {
                    gl.delete_shader(vertex_shader);
                    gl.delete_shader(fragment_shader);
                    return Err(InitError::CreateShader(err));
                }
            };
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);
            let linked = gl.get_program_link_status(program);

            gl.detach_shader(program, vertex_shader);
            gl.detach_shader(program, fragment_shader);
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(InitError::LinkProgram(log));
            }

            let attrib = |name: &'static str| {
                gl.get_attrib_location(program, name)
                    .ok_or(InitError::MissingAttribute(name))
            };
            let locations = (attrib("Position"), attrib("UV"), attrib("Color"));
            let (attrib_position, attrib_uv, attrib_color) = match locations {
                (Ok(position), Ok(uv), Ok(color)) => (position, uv, color),
                (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => {
                    gl.delete_program(program);
                    return Err(err);
                }
            };

            Ok(Self {
                program,
                uniform_texture: gl.get_uniform_location(program, "Texture"),
                uniform_proj_mtx: gl.get_uniform_location(program, "ProjMtx"),
                attrib_position,
                attrib_uv,
                attrib_color,
            })
        }
    }

    /// Delete the program object
    pub fn destroy(self, gl: &Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

unsafe fn compile_stage(
    gl: &Context,
    kind: u32,
    stage: &'static str,
    source: &str,
) -> InitResult<<Context as HasContext>::Shader> {
    unsafe {
        let shader = gl.create_shader(kind).map_err(InitError::CreateShader)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(InitError::CompileShader { stage, log });
        }
        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_target_glsl_330_core() {
        assert!(VERTEX_SHADER_SOURCE.starts_with("#version 330 core\n"));
        assert!(FRAGMENT_SHADER_SOURCE.starts_with("#version 330 core\n"));
    }

    #[test]
    fn vertex_stage_declares_expected_interface() {
        for needle in [
            "uniform mat4 ProjMtx;",
            "in vec2 Position;",
            "in vec2 UV;",
            "in vec4 Color;",
            "out vec2 Frag_UV;",
            "out vec4 Frag_Color;",
        ] {
            assert!(VERTEX_SHADER_SOURCE.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn fragment_stage_modulates_texture_by_colour() {
        assert!(FRAGMENT_SHADER_SOURCE.contains("uniform sampler2D Texture;"));
        assert!(FRAGMENT_SHADER_SOURCE.contains("out vec4 Out_Color;"));
        assert!(FRAGMENT_SHADER_SOURCE.contains("Frag_Color * texture(Texture, Frag_UV.st)"));
    }
}
