use std::rc::Rc;

use forward_ngin::{
    Context, Material, Renderer,
    cgmath::{Deg, Vector3},
    Camera, DirectionalLight, Scene, capture, resources,
};
use image::{Rgba, RgbaImage};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 64;

pub const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to start the async runtime")
}

pub fn headless(rt: &tokio::runtime::Runtime) -> (Context, Renderer) {
    let ctx = rt
        .block_on(Context::headless(WIDTH, HEIGHT))
        .expect("A GPU adapter is required for the integration tests");
    let source = rt
        .block_on(resources::load_shader("shaders/forward.wgsl"))
        .expect("bundled shader");
    let renderer = rt
        .block_on(Renderer::new(&ctx, &source, CLEAR))
        .expect("bundled shader builds");
    (ctx, renderer)
}

pub fn white_material(ctx: &Context) -> Rc<Material> {
    white_material_with_alpha(ctx, 255)
}

pub fn white_material_with_alpha(ctx: &Context, alpha: u8) -> Rc<Material> {
    let albedo = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, alpha]));
    let specular = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let material = Material::new(&ctx.device, &ctx.queue, "white", albedo, specular, 32.0)
        .expect("4x4 texture fits any device");
    Rc::new(material)
}

/// Renders one frame of `scene` and reads it back.
pub fn render_to_image(rt: &tokio::runtime::Runtime, ctx: &Context, renderer: &mut Renderer, scene: &Scene) -> RgbaImage {
    let frame = scene.render(renderer, ctx).expect("headless frame");
    let img = rt
        .block_on(capture::read_texture(&ctx.device, &ctx.queue, frame.texture()))
        .expect("frame read-back");
    renderer.end_frame(frame);
    img
}

pub fn empty_scene(ctx: &Context) -> Scene {
    let mut camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), ctx.aspect_ratio(), Deg(90.0));
    camera.update();
    Scene::new(camera, DirectionalLight::new(Vector3::new(-0.2, -1.0, -0.3), 1.0))
}

pub fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn close_to(pixel: &Rgba<u8>, expected: [u8; 4]) -> bool {
    pixel
        .0
        .iter()
        .zip(expected)
        .all(|(a, b)| (*a as i16 - b as i16).abs() <= 1)
}
