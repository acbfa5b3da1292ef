//! End-to-end rendering on a headless adapter.
//!
//! Every test returns early when no adapter is available.

use glam::{Vec3, Vec4};
use umbra_core::constants::SUPPORTED_SAMPLE_COUNTS;
use umbra_core::reference::resolve_texel;
use umbra_core::{LightFrustum, SceneConfig, TransformBuilder};
use umbra_renderer::constants::formats;
use umbra_renderer::{
    GpuContext, RendererError, RgbaImage, ShadowRenderer, TargetError, capture,
};

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

fn context() -> Option<GpuContext> {
    match GpuContext::headless() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

fn small_config(samples: u32) -> SceneConfig {
    let mut config = SceneConfig::default();
    config.window.width = WIDTH;
    config.window.height = HEIGHT;
    config.shadow.map_width = 512;
    config.shadow.map_height = 512;
    config.msaa.sample_count = samples;
    config
}

/// Everything moved behind the look-at target and past the far plane
fn empty_config(samples: u32) -> SceneConfig {
    let mut config = small_config(samples);
    config.ground.transform.translation = [1000.0, 0.0, 1000.0];
    config.cube.transform.translation = [1000.0, 0.0, 1000.0];
    config
}

/// Whether `samples` renders correctly on this adapter.
///
/// Some software adapters accept multisampled targets but read back zeros,
/// so a one-pixel empty frame must resolve to the scene clear color.
fn msaa_works(ctx: &GpuContext, samples: u32) -> bool {
    if samples == 1 {
        return true;
    }
    if !ctx.supports_sample_count(formats::SCENE_COLOR, samples)
        || !ctx.supports_sample_count(formats::SCENE_DEPTH_STENCIL, samples)
    {
        eprintln!("skipping {samples}x: not supported by the adapter");
        return false;
    }

    let mut config = empty_config(samples);
    config.window.width = 1;
    config.window.height = 1;
    config.shadow.map_width = 16;
    config.shadow.map_height = 16;
    let Ok(mut renderer) = ShadowRenderer::init(ctx, config, formats::OUTPUT) else {
        eprintln!("skipping {samples}x: renderer init failed");
        return false;
    };
    let output = renderer.create_output_target(ctx);
    let works = renderer.try_draw_frame(ctx, output.view()).is_ok()
        && ShadowRenderer::read_back_output(ctx, output.texture())
            .is_ok_and(|image| image.pixel(0, 0) == [255, 255, 255, 0]);
    renderer.shutdown(ctx);
    if !works {
        eprintln!("skipping {samples}x: multisampled rendering is broken on this adapter");
    }
    works
}

/// Cube floating over the middle of the ground, lit from +X so its shadow
/// falls to the left of it.
fn side_lit_config(samples: u32) -> SceneConfig {
    let mut config = small_config(samples);
    config.cube.transform.translation = [3.0, 0.0, 5.0];
    config.light.position = [12.0, 10.0, 5.0];
    config.light.target = [3.0, -2.0, 5.0];
    config.camera.position = [3.0, 10.0, 18.0];
    config.camera.target = [3.0, -2.0, 5.0];
    config
}

fn render(ctx: &GpuContext, config: SceneConfig, frames: usize) -> Vec<RgbaImage> {
    let mut renderer = ShadowRenderer::init(ctx, config, formats::OUTPUT).unwrap();
    let output = renderer.create_output_target(ctx);
    let images = (0..frames)
        .map(|_| {
            renderer.try_draw_frame(ctx, output.view()).unwrap();
            ShadowRenderer::read_back_output(ctx, output.texture()).unwrap()
        })
        .collect();
    renderer.shutdown(ctx);
    images
}

/// Pixel that a world-space point lands on
fn project(config: &SceneConfig, point: Vec3) -> (u32, u32) {
    let builder = TransformBuilder::new(config, &umbra_core::BoundingBox::empty());
    let view_proj = builder.projection(config.window.aspect()) * builder.eye_view();
    let clip: Vec4 = view_proj * point.extend(1.0);
    let ndc = clip / clip.w;
    let x = (ndc.x * 0.5 + 0.5) * config.window.width as f32;
    let y = (0.5 - ndc.y * 0.5) * config.window.height as f32;
    (x as u32, y as u32)
}

#[test]
fn test_shadow_map_has_no_color_attachment() {
    let Some(ctx) = context() else { return };
    let renderer = ShadowRenderer::init(&ctx, small_config(1), formats::OUTPUT).unwrap();
    let layout = renderer.shadow_map().layout();
    assert_eq!(layout.color, None);
    assert_eq!(layout.depth, Some(formats::SHADOW_DEPTH));
    assert_eq!(renderer.shadow_map().size(), (512, 512));
    assert_eq!(renderer.scene_target().size(), (WIDTH, HEIGHT));
    renderer.shutdown(&ctx);
}

#[test]
fn test_empty_view_resolves_to_clear_color() {
    let Some(ctx) = context() else { return };
    for samples in [1, 4] {
        if !msaa_works(&ctx, samples) {
            continue;
        }
        let image = render(&ctx, empty_config(samples), 1).remove(0);
        assert_eq!((image.width, image.height), (WIDTH, HEIGHT));
        assert!(
            image.pixels().all(|p| p == [255, 255, 255, 0]),
            "{samples}x: expected only the scene clear color"
        );
    }
}

#[test]
fn test_default_scene_shows_cube() {
    let Some(ctx) = context() else { return };
    if !msaa_works(&ctx, 4) {
        return;
    }
    let image = render(&ctx, small_config(4), 1).remove(0);
    let red = image
        .pixels()
        .filter(|p| p[0] > 200 && p[1] < 40 && p[2] < 40)
        .count();
    assert!(red > 0, "no cube pixels in the default scene");
}

#[test]
fn test_cube_casts_shadow_on_ground() {
    let Some(ctx) = context() else { return };
    for samples in [1, 4] {
        if !msaa_works(&ctx, samples) {
            continue;
        }
        let config = side_lit_config(samples);
        // The cube's center projects onto the ground here along the light direction
        let shadowed = project(&config, Vec3::new(1.5, -2.0, 5.0));
        let lit = project(&config, Vec3::new(6.0, -2.0, 8.0));

        let image = render(&ctx, config, 1).remove(0);

        let p = image.pixel(shadowed.0, shadowed.1);
        assert!(p[0] < 40 && p[1] < 40 && p[2] < 40, "{samples}x: expected shadow, got {p:?}");

        // 0.9 gray, fully lit
        let p = image.pixel(lit.0, lit.1);
        for channel in &p[..3] {
            assert!((224..=235).contains(channel), "{samples}x: expected lit ground, got {p:?}");
        }
        assert_eq!(p[3], 255);
    }
}

#[test]
fn test_fit_scene_frustum_renders() {
    let Some(ctx) = context() else { return };
    if !msaa_works(&ctx, 4) {
        return;
    }
    let mut config = side_lit_config(4);
    config.shadow.light_frustum = LightFrustum::FitScene { margin: 0.5 };
    let shadowed = project(&config, Vec3::new(1.5, -2.0, 5.0));

    let image = render(&ctx, config, 1).remove(0);
    let p = image.pixel(shadowed.0, shadowed.1);
    assert!(p[0] < 40, "expected shadow, got {p:?}");
}

#[test]
fn test_frames_are_deterministic() {
    let Some(ctx) = context() else { return };
    if !msaa_works(&ctx, 4) {
        return;
    }
    let images = render(&ctx, side_lit_config(4), 3);
    assert_eq!(images[0], images[1]);
    assert_eq!(images[1], images[2]);

    let again = render(&ctx, side_lit_config(4), 1);
    assert_eq!(images[0], again[0]);
}

#[test]
fn test_resolve_averages_partial_coverage() {
    let Some(ctx) = context() else { return };
    for samples in SUPPORTED_SAMPLE_COUNTS {
        if !msaa_works(&ctx, samples) {
            continue;
        }
        // Cube alone against the clear color. Cube samples have zero green
        // and blue whatever their shading, clear samples have full green
        // and blue, so every pixel is the mean of k cube samples and
        // samples - k clear samples.
        let mut config = small_config(samples);
        config.ground.transform.translation = [1000.0, 0.0, 1000.0];
        let clear = config.scene_clear_color;
        let cube = [0.0, 0.0, 0.0, 1.0];
        let expected_green: Vec<f32> = (0..=samples)
            .map(|covered| {
                let texel: Vec<[f32; 4]> = (0..samples)
                    .map(|i| if i < covered { cube } else { clear })
                    .collect();
                resolve_texel(&texel).map_or(f32::NAN, |mean| mean[1] * 255.0)
            })
            .collect();

        let image = render(&ctx, config, 1).remove(0);

        let mut partial = 0;
        for p in image.pixels() {
            assert!(
                p[1].abs_diff(p[2]) <= 1,
                "{samples}x: green and blue differ in {p:?}"
            );
            let covered = expected_green
                .iter()
                .position(|g| (p[1] as f32 - g).abs() <= 1.0)
                .unwrap_or_else(|| panic!("{samples}x: {p:?} is not a mean of samples"));
            if covered != 0 && covered != samples as usize {
                assert!(p[1] > 0 && p[1] < 255);
                partial += 1;
            }
        }

        if samples == 1 {
            assert_eq!(partial, 0, "single-sample output must not blend");
        } else {
            assert!(partial > 0, "{samples}x: no partially covered edge pixels");
        }
    }
}

#[test]
fn test_output_target_has_display_view() {
    let Some(ctx) = context() else { return };
    let renderer = ShadowRenderer::init(&ctx, small_config(1), formats::OUTPUT).unwrap();
    let output = capture(&ctx.device, "create output target", || {
        renderer.create_output_target(&ctx)
    })
    .unwrap();
    assert_eq!(output.texture().format(), formats::OUTPUT);
    assert_eq!(
        output.texture().usage(),
        wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
    );
    renderer.shutdown(&ctx);
}

#[test]
fn test_invalid_config_is_fatal() {
    let Some(ctx) = context() else { return };
    let result = ShadowRenderer::init(&ctx, small_config(3), formats::OUTPUT);
    assert!(matches!(result, Err(RendererError::Config(_))));
}

#[test]
fn test_oversized_target_is_fatal() {
    let Some(ctx) = context() else { return };
    let mut config = small_config(1);
    config.shadow.map_width = ctx.device.limits().max_texture_dimension_2d + 1;
    let result = ShadowRenderer::init(&ctx, config, formats::OUTPUT);
    assert!(matches!(
        result,
        Err(RendererError::Target(TargetError::Incomplete {
            target: "shadow map",
            ..
        }))
    ));
}
