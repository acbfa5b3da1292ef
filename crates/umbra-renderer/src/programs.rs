//! Shader programs: shadow depth, shaded scene and MSAA resolve
//!
//! Each program owns its pipeline and the bind group layouts it declares.
//! Layouts are created once with the pipeline and reused for every bind group.

use umbra_core::ShadowConfig;

use crate::constants::formats;
use crate::error::{GraphicsError, RendererError, capture};
use crate::mesh::{FullscreenQuad, GpuMesh};
use crate::targets::{SceneColorTarget, ShadowMapTarget};

const RESOLVE_TEMPLATE: &str = include_str!("shaders/resolve.wgsl");

/// Fills in the resolve shader for a sample count.
///
/// A single-sample texture cannot be bound as `texture_multisampled_2d`, so
/// `S = 1` reads mip level 0 of a plain `texture_2d` instead. The averaging
/// loop is the same for every count.
pub fn resolve_shader_source(sample_count: u32) -> String {
    let (texture_type, sample_index) = if sample_count > 1 {
        ("texture_multisampled_2d<f32>", "i")
    } else {
        ("texture_2d<f32>", "0")
    };
    RESOLVE_TEMPLATE
        .replace("{{TEXTURE_TYPE}}", texture_type)
        .replace("{{SAMPLE_INDEX}}", sample_index)
}

/// Polygon offset applied by the shadow pipeline only
pub fn shadow_depth_bias(config: &ShadowConfig) -> wgpu::DepthBiasState {
    wgpu::DepthBiasState {
        constant: config.constant_bias,
        slope_scale: config.slope_bias,
        clamp: 0.0,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Layout of the per-object uniform group
pub fn object_layout_entries() -> [wgpu::BindGroupLayoutEntry; 1] {
    [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)]
}

/// Layout of the scene program's shadow group: PCF uniform, depth texture, comparison sampler
pub fn shadow_sampling_layout_entries() -> [wgpu::BindGroupLayoutEntry; 3] {
    [
        uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
            count: None,
        },
    ]
}

/// Layout of the resolve group: scene color texture and sample-count uniform
///
/// Multisampled textures cannot be filtered, so the texture is declared
/// non-filterable for every sample count.
pub fn resolve_layout_entries(sample_count: u32) -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: sample_count > 1,
            },
            count: None,
        },
        uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
    ]
}

fn program_error(program: &'static str) -> impl FnOnce(GraphicsError) -> RendererError {
    move |source| {
        tracing::error!("Failed to build {} program: {}", program, source);
        RendererError::Program { program, source }
    }
}

/// Creates the per-object uniform layout shared by the shadow and scene programs
pub fn create_object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Object Bind Group Layout"),
        entries: &object_layout_entries(),
    })
}

/// Depth-only program rendering from the light
pub struct ShadowDepthProgram {
    pipeline: wgpu::RenderPipeline,
}

impl ShadowDepthProgram {
    /// Builds the pipeline. It has no fragment stage and no color targets.
    pub fn new(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        bias: wgpu::DepthBiasState,
    ) -> Result<Self, RendererError> {
        let pipeline = capture(device, "create shadow depth program", || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Shadow Depth Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow_depth.wgsl").into()),
            });

            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Depth Pipeline Layout"),
                bind_group_layouts: &[object_layout],
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Shadow Depth Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[GpuMesh::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: formats::SHADOW_DEPTH,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias,
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })
        .map_err(program_error("shadow depth"))?;

        tracing::debug!(
            "Shadow depth program ready (bias constant={}, slope={})",
            bias.constant,
            bias.slope_scale
        );
        Ok(Self { pipeline })
    }

    /// Render pipeline
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

/// Shaded scene program with PCF shadow lookup
pub struct SceneProgram {
    pipeline: wgpu::RenderPipeline,
    shadow_layout: wgpu::BindGroupLayout,
}

impl SceneProgram {
    /// Builds the pipeline for a multisampled target with `sample_count` samples
    pub fn new(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        sample_count: u32,
    ) -> Result<Self, RendererError> {
        let (pipeline, shadow_layout) = capture(device, "create scene program", || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Scene Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
            });

            let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Sampling Bind Group Layout"),
                entries: &shadow_sampling_layout_entries(),
            });

            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Scene Pipeline Layout"),
                bind_group_layouts: &[object_layout, &shadow_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Scene Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[GpuMesh::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: formats::SCENE_COLOR,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: formats::SCENE_DEPTH_STENCIL,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

            (pipeline, shadow_layout)
        })
        .map_err(program_error("scene"))?;

        tracing::debug!("Scene program ready ({}x MSAA)", sample_count);
        Ok(Self {
            pipeline,
            shadow_layout,
        })
    }

    /// Render pipeline
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Binds the PCF uniform, the shadow depth view and its comparison sampler
    pub fn create_shadow_bind_group(
        &self,
        device: &wgpu::Device,
        sampling_buffer: &wgpu::Buffer,
        shadow_map: &ShadowMapTarget,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Sampling Bind Group"),
            layout: &self.shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: sampling_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_map.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow_map.sampler()),
                },
            ],
        })
    }
}

/// Full-screen program averaging every sample of the scene color target
pub struct ResolveProgram {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sample_count: u32,
}

impl ResolveProgram {
    /// Builds the pipeline for a source with `sample_count` samples,
    /// writing to `output_format`
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Result<Self, RendererError> {
        let (pipeline, layout) = capture(device, "create resolve program", || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Resolve Shader"),
                source: wgpu::ShaderSource::Wgsl(resolve_shader_source(sample_count).into()),
            });

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Resolve Bind Group Layout"),
                entries: &resolve_layout_entries(sample_count),
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Resolve Pipeline Layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Resolve Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[FullscreenQuad::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: output_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            (pipeline, layout)
        })
        .map_err(program_error("resolve"))?;

        tracing::debug!(
            "Resolve program ready ({} samples -> {:?})",
            sample_count,
            output_format
        );
        Ok(Self {
            pipeline,
            layout,
            sample_count,
        })
    }

    /// Render pipeline
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Sample count the shader was generated for
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Binds the scene color view and the sample-count uniform
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        scene: &SceneColorTarget,
        params_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Resolve Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene.color_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_source_multisampled() {
        for samples in [2, 4, 8] {
            let source = resolve_shader_source(samples);
            assert!(source.contains("var scene_color: texture_multisampled_2d<f32>;"));
            assert!(source.contains("textureLoad(scene_color, texel, i)"));
            assert!(!source.contains("{{"));
        }
    }

    #[test]
    fn test_resolve_source_single_sample() {
        let source = resolve_shader_source(1);
        assert!(source.contains("var scene_color: texture_2d<f32>;"));
        assert!(source.contains("textureLoad(scene_color, texel, 0)"));
        assert!(!source.contains("multisampled"));
        assert!(!source.contains("{{"));
    }

    #[test]
    fn test_resolve_layout_tracks_sample_count() {
        for (samples, multisampled) in [(1, false), (2, true), (4, true), (8, true)] {
            let [texture, uniform] = resolve_layout_entries(samples);
            assert_eq!(
                texture.ty,
                wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled,
                }
            );
            assert_eq!(uniform.binding, 1);
        }
    }

    #[test]
    fn test_shadow_sampling_layout_uses_comparison() {
        let [uniform, texture, sampler] = shadow_sampling_layout_entries();
        assert_eq!(uniform.binding, 0);
        assert!(matches!(
            texture.ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                ..
            }
        ));
        assert_eq!(
            sampler.ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        );
    }

    #[test]
    fn test_shadow_bias_from_config() {
        let bias = shadow_depth_bias(&ShadowConfig::default());
        assert_eq!(bias.constant, 100);
        assert_eq!(bias.slope_scale, 5.0);
        assert_eq!(bias.clamp, 0.0);
    }
}
