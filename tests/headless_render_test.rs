#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use common::*;

    let rt = runtime();
    let (ctx, mut renderer) = headless(&rt);
    let scene = empty_scene(&ctx);

    let img = render_to_image(&rt, &ctx, &mut renderer, &scene);

    let expected = [to_u8(CLEAR.r), to_u8(CLEAR.g), to_u8(CLEAR.b), to_u8(CLEAR.a)];
    assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    for pixel in img.pixels() {
        assert!(close_to(pixel, expected), "{:?} != {:?}", pixel, expected);
    }
    assert_eq!(renderer.draw_count(), 0);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_cube_in_the_centre() {
    use common::*;
    use forward_ngin::{Entity, cgmath::Vector3};

    let rt = runtime();
    let (ctx, mut renderer) = headless(&rt);
    let mut scene = empty_scene(&ctx);
    scene.add(Entity::cube(
        &ctx.device,
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
        white_material(&ctx),
    ));

    let img = render_to_image(&rt, &ctx, &mut renderer, &scene);

    let clear = [to_u8(CLEAR.r), to_u8(CLEAR.g), to_u8(CLEAR.b), to_u8(CLEAR.a)];
    assert_eq!(renderer.draw_count(), 1);
    assert!(close_to(img.get_pixel(0, 0), clear));
    assert!(close_to(img.get_pixel(WIDTH - 1, HEIGHT - 1), clear));
    let centre = img.get_pixel(WIDTH / 2, HEIGHT / 2);
    assert!(!close_to(centre, clear), "cube not visible, centre is {:?}", centre);
    // lit white surface is brighter than the clear colour
    assert!(centre.0[0] > clear[0]);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_blend_translucent_albedo_over_the_background() {
    use common::*;
    use forward_ngin::{Entity, cgmath::Vector3};

    let rt = runtime();
    let (ctx, mut renderer) = headless(&rt);

    let mut opaque = empty_scene(&ctx);
    opaque.add(Entity::cube(
        &ctx.device,
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
        white_material(&ctx),
    ));
    let mut translucent = empty_scene(&ctx);
    translucent.add(Entity::cube(
        &ctx.device,
        [0.0_f32, 0.0, 0.0],
        Vector3::new(0.0, 0.0, 0.0),
        white_material_with_alpha(&ctx, 128),
    ));

    let solid = *render_to_image(&rt, &ctx, &mut renderer, &opaque).get_pixel(WIDTH / 2, HEIGHT / 2);
    let mixed = *render_to_image(&rt, &ctx, &mut renderer, &translucent).get_pixel(WIDTH / 2, HEIGHT / 2);

    let clear = [to_u8(CLEAR.r), to_u8(CLEAR.g), to_u8(CLEAR.b)];
    let alpha = 128.0 / 255.0;
    for channel in 0..3 {
        let expected = solid.0[channel] as f64 * alpha + clear[channel] as f64 * (1.0 - alpha);
        let actual = mixed.0[channel] as f64;
        assert!(
            (actual - expected).abs() <= 2.0,
            "channel {channel}: {actual} != {expected} (solid {:?}, mixed {:?})",
            solid,
            mixed
        );
    }
    assert!(mixed.0[0] < solid.0[0]);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_upload_uniforms_only_when_they_change() {
    use common::*;
    use forward_ngin::{Entity, cgmath::Vector3};

    let rt = runtime();
    let (ctx, mut renderer) = headless(&rt);
    let mut scene = empty_scene(&ctx);
    scene.add(Entity::cube(
        &ctx.device,
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
        white_material(&ctx),
    ));

    let frame = scene.render(&mut renderer, &ctx).expect("first frame");
    assert_eq!(renderer.upload_count(), 1);
    renderer.end_frame(frame);

    let frame = scene.render(&mut renderer, &ctx).expect("second frame");
    assert_eq!(renderer.draw_count(), 1);
    assert_eq!(renderer.upload_count(), 0);
    renderer.end_frame(frame);

    scene.entities[0].set_rotation(0.0, 45.0, 0.0);
    let frame = scene.render(&mut renderer, &ctx).expect("third frame");
    assert_eq!(renderer.upload_count(), 1);
    renderer.end_frame(frame);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_load_bundled_material() {
    use common::*;
    use forward_ngin::{Material, StridePolicy};

    let rt = runtime();
    let (ctx, _) = headless(&rt);
    let material = rt
        .block_on(Material::load(
            &ctx,
            "textures/container.png",
            "textures/container_specular.png",
            32.0,
            StridePolicy::Repack,
        ))
        .unwrap();
    assert_eq!(material.shininess(), 32.0);
    assert!(material.albedo().texture.mip_level_count() > 1);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_reject_texture_larger_than_the_device_allows() {
    use common::*;
    use forward_ngin::{TextureError, data_structures::texture::{ColorSpace, Texture}};
    use image::RgbaImage;

    let rt = runtime();
    let (ctx, _) = headless(&rt);
    let max = ctx.device.limits().max_texture_dimension_2d;

    let result = Texture::from_rgba(
        &ctx.device,
        &ctx.queue,
        RgbaImage::new(max + 1, 1),
        "too wide",
        ColorSpace::Linear,
    );
    match result {
        Err(TextureError::TooLarge { width, height, max: limit, .. }) => {
            assert_eq!((width, height, limit), (max + 1, 1, max));
        }
        other => panic!("expected TooLarge, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_report_pipeline_rejected_by_the_device() {
    use common::*;
    use forward_ngin::{
        Renderer, ShaderError,
        pipelines::shader::ShaderSource,
    };

    let rt = runtime();
    let (ctx, _) = headless(&rt);
    // valid WGSL, but group 2 is not part of the forward pipeline layout
    let source = ShaderSource::parse(
        "\
#vertex
@vertex fn vs_main(@location(0) position: vec3f) -> @builtin(position) vec4f {
    return vec4f(position, 1.0);
}
#fragment
@group(2) @binding(0) var<uniform> tint: vec4f;
@fragment fn fs_main() -> @location(0) vec4f {
    return tint;
}
",
    )
    .unwrap();

    let result = rt.block_on(Renderer::new(&ctx, &source, CLEAR));
    assert!(matches!(result, Err(ShaderError::Compile(_))), "{:?}", result.err());
}
