//! Tests that need a live OpenGL 3.3 context.
//!
//! They create a headless EGL context on the first available device and are
//! ignored by default: `cargo test -p dear-imgui-gl3 -- --ignored`.
#![cfg(target_os = "linux")]

use std::rc::Rc;
use std::sync::Mutex;

use dear_imgui_gl3::{
    GlRenderer, GlStateBackup, RendererOptions, create_texture_rgba, texture_id_for,
    update_texture_rgba,
};
use dear_imgui_rs::{Context, TextureId};
use glow::HasContext;
use glutin::api::egl::context::PossiblyCurrentContext;
use glutin::api::egl::device::Device;
use glutin::api::egl::display::Display;
use glutin::config::{ConfigSurfaceTypes, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::GlDisplay;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

static TEST_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct HeadlessGl {
    gl: Rc<glow::Context>,
    _context: PossiblyCurrentContext,
}

fn headless_gl() -> HeadlessGl {
    let device = Device::query_devices()
        .expect("EGL device enumeration")
        .next()
        .expect("an EGL device");
    let display = unsafe { Display::with_device(&device, None) }.expect("EGL display");

    let template = ConfigTemplateBuilder::default()
        .with_alpha_size(8)
        .with_surface_type(ConfigSurfaceTypes::empty())
        .build();
    let config = unsafe { display.find_configs(template) }
        .expect("EGL configs")
        .next()
        .expect("an offscreen EGL config");

    let attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(None);
    let context = unsafe { display.create_context(&config, &attributes) }
        .expect("GL 3.3 core context")
        .make_current_surfaceless()
        .expect("current context");

    let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s).cast()) };
    HeadlessGl {
        gl: Rc::new(gl),
        _context: context,
    }
}

fn imgui_context() -> Context {
    let mut imgui = Context::create();
    imgui.set_ini_filename(None::<String>).ok();
    let io = imgui.io_mut();
    io.set_display_size([64.0, 64.0]);
    io.set_delta_time(1.0 / 60.0);
    imgui
}

/// Bind a 64x64 color target so draws have somewhere to go
fn bind_offscreen_target(gl: &glow::Context) {
    unsafe {
        let framebuffer = gl.create_framebuffer().expect("framebuffer");
        let color = gl.create_renderbuffer().expect("renderbuffer");
        gl.bind_renderbuffer(glow::RENDERBUFFER, Some(color));
        gl.renderbuffer_storage(glow::RENDERBUFFER, glow::RGBA8, 64, 64);
        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
        gl.framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0,
            glow::RENDERBUFFER,
            Some(color),
        );
    }
}

#[test]
#[ignore = "needs an EGL device with OpenGL 3.3"]
fn device_objects_recreate_after_invalidate() {
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let headless = headless_gl();
    let mut imgui = imgui_context();
    let mut renderer =
        GlRenderer::with_shared_context(headless.gl.clone(), &mut imgui, RendererOptions::default())
            .expect("renderer");
    assert!(renderer.has_device_objects());
    assert!(renderer.font_texture().is_some());

    renderer.invalidate_device_objects(&mut imgui);
    renderer.invalidate_device_objects(&mut imgui);
    assert!(!renderer.has_device_objects());
    assert!(renderer.font_texture().is_none());

    renderer.new_frame(&mut imgui).expect("recreate");
    assert!(renderer.has_device_objects());
    assert!(renderer.font_texture().is_some());
}

#[test]
#[ignore = "needs an EGL device with OpenGL 3.3"]
fn render_leaves_host_state_untouched() {
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let headless = headless_gl();
    let gl = headless.gl.clone();
    let mut imgui = imgui_context();
    let mut renderer =
        GlRenderer::with_shared_context(gl.clone(), &mut imgui, RendererOptions::default())
            .expect("renderer");
    let version = renderer.gl_version();

    bind_offscreen_target(&gl);
    unsafe {
        let vao = gl.create_vertex_array().expect("host vao");
        gl.bind_vertex_array(Some(vao));
        let host_texture = gl.create_texture().expect("host texture");
        gl.active_texture(glow::TEXTURE3);
        gl.bind_texture(glow::TEXTURE_2D, Some(host_texture));
        gl.viewport(1, 2, 30, 40);
        gl.scissor(3, 4, 5, 6);
        gl.disable(glow::BLEND);
        gl.enable(glow::DEPTH_TEST);
        gl.enable(glow::CULL_FACE);
        gl.blend_func(glow::ONE, glow::ZERO);
    }

    let mut before = GlStateBackup::default();
    before.backup(&gl, version);

    for _ in 0..3 {
        renderer.new_frame(&mut imgui).expect("frame");
        let ui = imgui.frame();
        ui.window("Overlay").build(|| ui.text("state"));
        let draw_data = imgui.render();
        renderer.render(draw_data).expect("render");
    }

    let mut after = GlStateBackup::default();
    after.backup(&gl, version);
    assert_eq!(before, after);
    assert!(!after.blend_enabled());
    assert_eq!(after.viewport(), [1, 2, 30, 40]);
    assert_eq!(unsafe { gl.get_error() }, glow::NO_ERROR);
}

#[test]
#[ignore = "needs an EGL device with OpenGL 3.3"]
fn uploads_keep_pixel_unpack_state() {
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let headless = headless_gl();
    let gl = &*headless.gl;

    unsafe {
        let host_texture = gl.create_texture().expect("host texture");
        gl.bind_texture(glow::TEXTURE_2D, Some(host_texture));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 8);
        gl.pixel_store_i32(glow::UNPACK_ROW_LENGTH, 16);

        let texture = create_texture_rgba(gl, 2, 2, &[255; 16]).expect("texture");
        update_texture_rgba(gl, texture, 1, 1, 1, 1, &[0, 0, 0, 255]);

        assert_eq!(gl.get_parameter_i32(glow::UNPACK_ALIGNMENT), 8);
        assert_eq!(gl.get_parameter_i32(glow::UNPACK_ROW_LENGTH), 16);
        assert_eq!(
            gl.get_parameter_i32(glow::TEXTURE_BINDING_2D) as u32,
            host_texture.0.get()
        );
        gl.delete_texture(texture);
    }
}

#[test]
#[ignore = "needs an EGL device with OpenGL 3.3"]
fn unknown_texture_ids_draw_with_font_atlas() {
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let headless = headless_gl();
    let gl = headless.gl.clone();
    let mut imgui = imgui_context();
    let mut renderer =
        GlRenderer::with_shared_context(gl.clone(), &mut imgui, RendererOptions::default())
            .expect("renderer");
    let font = renderer.font_texture().expect("font texture");

    assert_eq!(renderer.resolve_texture(TextureId::null()).expect("null id"), font);
    assert_eq!(renderer.resolve_texture(TextureId::new(0xDEAD)).expect("unknown id"), font);

    let registered = renderer.register_texture(1, 1, &[1, 2, 3, 4]).expect("register");
    assert_ne!(renderer.resolve_texture(registered).expect("registered id"), font);

    let host_texture = unsafe {
        let texture = gl.create_texture().expect("host texture");
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        texture
    };
    assert_eq!(
        renderer.resolve_texture(texture_id_for(host_texture)).expect("host id"),
        host_texture
    );
}
