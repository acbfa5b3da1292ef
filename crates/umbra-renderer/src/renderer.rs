//! Shadow renderer: owns every GPU resource of the pipeline
//!
//! Creation runs once in dependency order (buffers, textures, render
//! targets, programs, bind groups). Each frame rebuilds the transforms,
//! uploads them, and records the shadow, scene and resolve passes. Teardown
//! releases the shadow-map bindings before the shadow texture itself.

use umbra_core::{FrameTransforms, SceneConfig, SceneMeshes, TransformBuilder};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::error::{GraphicsError, RendererError, capture, checked};
use crate::mesh::{FullscreenQuad, GpuMesh};
use crate::passes::{
    MeshDraw, ResolvePassParams, ScenePassParams, ShadowPassParams, clear_color,
    render_resolve_pass, render_scene_pass, render_shadow_pass,
};
use crate::programs::{
    ResolveProgram, SceneProgram, ShadowDepthProgram, create_object_layout, shadow_depth_bias,
};
use crate::readback::{RgbaImage, read_texture_rgba8};
use crate::targets::{OutputTarget, SceneColorTarget, ShadowMapTarget};
use crate::uniforms::{ObjectUniform, ResolveUniform, ShadowSamplingUniform};

/// Per-object uniform buffer and its bind group
struct ObjectBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ObjectBinding {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        uniform: ObjectUniform,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Object Uniform Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Object Bind Group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, uniform: ObjectUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

/// Shadow-mapping renderer with a shader-side MSAA resolve
pub struct ShadowRenderer {
    config: SceneConfig,
    transforms: TransformBuilder,
    frame: FrameTransforms,
    output_format: wgpu::TextureFormat,

    // ========== Buffers ==========
    ground: GpuMesh,
    cube: GpuMesh,
    quad: FullscreenQuad,
    ground_object: ObjectBinding,
    cube_object: ObjectBinding,
    sampling_buffer: wgpu::Buffer,
    resolve_buffer: wgpu::Buffer,

    // ========== Render targets ==========
    shadow_map: ShadowMapTarget,
    scene_target: SceneColorTarget,

    // ========== Programs ==========
    shadow_program: ShadowDepthProgram,
    scene_program: SceneProgram,
    resolve_program: ResolveProgram,
    shadow_bind_group: wgpu::BindGroup,
    resolve_bind_group: wgpu::BindGroup,
}

impl ShadowRenderer {
    /// Creates every resource of the pipeline.
    ///
    /// Any failure is fatal and nothing is left half-initialized; resources
    /// created before the failure are dropped on return.
    pub fn init(
        ctx: &GpuContext,
        config: SceneConfig,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, RendererError> {
        config.validate().inspect_err(|e| {
            tracing::error!("Rejected renderer configuration: {}", e);
        })?;

        let device = &ctx.device;
        let (width, height) = (config.window.width, config.window.height);
        let samples = config.msaa.sample_count;
        tracing::info!(
            "Initializing shadow renderer: output {}x{}, shadow map {}x{}, {}x MSAA",
            width,
            height,
            config.shadow.map_width,
            config.shadow.map_height,
            samples
        );

        let meshes = SceneMeshes::generate(&config);
        let transforms = TransformBuilder::new(&config, &meshes.world_bounds(&config));
        let frame = transforms.build(config.window.aspect());
        tracing::debug!("Light frustum: {:?}", transforms.light_box());

        let object_layout = create_object_layout(device);

        // Buffers
        let (ground, cube, quad, ground_object, cube_object, sampling_buffer, resolve_buffer) =
            capture(device, "create buffers", || {
                let SceneMeshes { ground, cube } = meshes;
                let ground = GpuMesh::upload(device, "Ground", ground);
                let cube = GpuMesh::upload(device, "Cube", cube);
                let quad = FullscreenQuad::new(device);
                let ground_object = ObjectBinding::new(
                    device,
                    &object_layout,
                    "Ground",
                    ObjectUniform::new(&frame.ground, config.ground.color),
                );
                let cube_object = ObjectBinding::new(
                    device,
                    &object_layout,
                    "Cube",
                    ObjectUniform::new(&frame.cube, config.cube.color),
                );
                let sampling_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Shadow Sampling Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[ShadowSamplingUniform::new(
                        &config.shadow,
                        &config.pcf,
                    )]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let resolve_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Resolve Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[ResolveUniform::new(samples)]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                (
                    ground,
                    cube,
                    quad,
                    ground_object,
                    cube_object,
                    sampling_buffer,
                    resolve_buffer,
                )
            })
            .inspect_err(|e| tracing::error!("Buffer creation failed: {}", e))?;

        // Render targets
        let shadow_map = ShadowMapTarget::new(ctx, config.shadow.map_width, config.shadow.map_height)
            .inspect_err(|e| tracing::error!("{}", e))?;
        let scene_target = SceneColorTarget::new(ctx, width, height, samples)
            .inspect_err(|e| tracing::error!("{}", e))?;

        // Programs
        let shadow_program =
            ShadowDepthProgram::new(device, &object_layout, shadow_depth_bias(&config.shadow))?;
        let scene_program = SceneProgram::new(device, &object_layout, samples)?;
        let resolve_program = ResolveProgram::new(device, output_format, samples)?;

        let (shadow_bind_group, resolve_bind_group) = capture(device, "create bind groups", || {
            (
                scene_program.create_shadow_bind_group(device, &sampling_buffer, &shadow_map),
                resolve_program.create_bind_group(device, &scene_target, &resolve_buffer),
            )
        })
        .inspect_err(|e| tracing::error!("Bind group creation failed: {}", e))?;

        tracing::info!("Shadow renderer ready");
        Ok(Self {
            config,
            transforms,
            frame,
            output_format,
            ground,
            cube,
            quad,
            ground_object,
            cube_object,
            sampling_buffer,
            resolve_buffer,
            shadow_map,
            scene_target,
            shadow_program,
            scene_program,
            resolve_program,
            shadow_bind_group,
            resolve_bind_group,
        })
    }

    /// Renders one frame into `output_view`.
    ///
    /// `output_view` must have the configured window size and the output
    /// format given to [`ShadowRenderer::init`]. Device errors are logged,
    /// never returned.
    pub fn draw_frame(&mut self, ctx: &GpuContext, output_view: &wgpu::TextureView) {
        if let Err(e) = self.try_draw_frame(ctx, output_view) {
            tracing::warn!("{}", e);
        }
    }

    /// Same as [`ShadowRenderer::draw_frame`] but returns the first device
    /// error. Errors are only detected in debug builds.
    pub fn try_draw_frame(
        &mut self,
        ctx: &GpuContext,
        output_view: &wgpu::TextureView,
    ) -> Result<(), GraphicsError> {
        self.frame = self.transforms.build(self.config.window.aspect());

        let upload = checked(&ctx.device, "upload transforms", || {
            self.ground_object.write(
                &ctx.queue,
                ObjectUniform::new(&self.frame.ground, self.config.ground.color),
            );
            self.cube_object.write(
                &ctx.queue,
                ObjectUniform::new(&self.frame.cube, self.config.cube.color),
            );
        });

        let submit = checked(&ctx.device, "record frame", || {
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
            self.record(&mut encoder, output_view);
            ctx.queue.submit(Some(encoder.finish()));
        });

        upload.and(submit)
    }

    fn record(&self, encoder: &mut wgpu::CommandEncoder, output_view: &wgpu::TextureView) {
        let draws = [
            MeshDraw {
                mesh: &self.ground,
                object: &self.ground_object.bind_group,
            },
            MeshDraw {
                mesh: &self.cube,
                object: &self.cube_object.bind_group,
            },
        ];

        render_shadow_pass(
            encoder,
            &ShadowPassParams {
                target: &self.shadow_map,
                program: &self.shadow_program,
                draws: &draws,
            },
        );

        render_scene_pass(
            encoder,
            &ScenePassParams {
                target: &self.scene_target,
                program: &self.scene_program,
                shadow_bind_group: &self.shadow_bind_group,
                draws: &draws,
                clear_color: clear_color(self.config.scene_clear_color),
            },
        );

        render_resolve_pass(
            encoder,
            output_view,
            &ResolvePassParams {
                program: &self.resolve_program,
                bind_group: &self.resolve_bind_group,
                quad: &self.quad,
                viewport: self.output_size(),
                clear_color: clear_color(self.config.output_clear_color),
            },
        );
    }

    /// Releases every resource in dependency order.
    pub fn shutdown(self, ctx: &GpuContext) {
        let Self {
            ground,
            cube,
            quad,
            ground_object,
            cube_object,
            sampling_buffer,
            resolve_buffer,
            shadow_map,
            scene_target,
            shadow_program,
            scene_program,
            resolve_program,
            shadow_bind_group,
            resolve_bind_group,
            ..
        } = self;

        let result = checked(&ctx.device, "shutdown", || {
            // Detach the shadow map before freeing it
            drop(shadow_bind_group);
            shadow_map.destroy();

            drop(resolve_bind_group);
            scene_target.destroy();

            ground.destroy();
            cube.destroy();
            quad.destroy();
            for object in [ground_object, cube_object] {
                drop(object.bind_group);
                object.buffer.destroy();
            }
            sampling_buffer.destroy();
            resolve_buffer.destroy();

            drop(shadow_program);
            drop(scene_program);
            drop(resolve_program);
        });
        if let Err(e) = result {
            tracing::warn!("{}", e);
        }
        tracing::info!("Shadow renderer shut down");
    }

    /// Creates a presentable texture matching the output size and format
    pub fn create_output_target(&self, ctx: &GpuContext) -> OutputTarget {
        let (width, height) = self.output_size();
        OutputTarget::new(&ctx.device, width, height, self.output_format)
    }

    /// Copies a rendered output texture back to the CPU
    pub fn read_back_output(
        ctx: &GpuContext,
        texture: &wgpu::Texture,
    ) -> Result<RgbaImage, GraphicsError> {
        read_texture_rgba8(ctx, texture)
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Transforms of the most recent frame
    pub fn frame_transforms(&self) -> &FrameTransforms {
        &self.frame
    }

    /// Shadow map target
    pub fn shadow_map(&self) -> &ShadowMapTarget {
        &self.shadow_map
    }

    /// Multisampled scene target
    pub fn scene_target(&self) -> &SceneColorTarget {
        &self.scene_target
    }

    /// Output (window) size in pixels
    pub fn output_size(&self) -> (u32, u32) {
        (self.config.window.width, self.config.window.height)
    }

    /// Format the resolve pass writes
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }
}
