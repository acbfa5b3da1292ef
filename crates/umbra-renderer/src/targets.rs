//! Offscreen render targets
//!
//! - [`ShadowMapTarget`]: single-sample depth texture sampled with a
//!   comparison sampler, no color attachment
//! - [`SceneColorTarget`]: multisampled color plus depth/stencil at window size
//! - [`OutputTarget`]: single-sample presentable texture for offscreen callers
//!
//! A target is checked against the adapter before allocation and its creation
//! runs inside a device error scope. Any failure is fatal.

use crate::constants::formats;
use crate::context::GpuContext;
use crate::error::{TargetError, capture};

/// Attachment set of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    /// Debug name
    pub name: &'static str,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color attachment format, if any
    pub color: Option<wgpu::TextureFormat>,
    /// Depth (or depth/stencil) attachment format, if any
    pub depth: Option<wgpu::TextureFormat>,
    /// Samples per pixel of every attachment
    pub sample_count: u32,
}

impl TargetLayout {
    /// Depth-only, single-sample shadow map
    pub fn shadow_map(width: u32, height: u32) -> Self {
        Self {
            name: "shadow map",
            width,
            height,
            color: None,
            depth: Some(formats::SHADOW_DEPTH),
            sample_count: 1,
        }
    }

    /// Multisampled color with a matching depth/stencil buffer
    pub fn scene_color(width: u32, height: u32, sample_count: u32) -> Self {
        Self {
            name: "scene color",
            width,
            height,
            color: Some(formats::SCENE_COLOR),
            depth: Some(formats::SCENE_DEPTH_STENCIL),
            sample_count,
        }
    }

    /// Texture extent of every attachment
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Checks the layout against the device limits and format capabilities
    pub fn validate(&self, ctx: &GpuContext) -> Result<(), TargetError> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(self.incomplete(format!(
                "extent {}x{} outside 1..={max}",
                self.width, self.height
            )));
        }
        if self.color.is_none() && self.depth.is_none() {
            return Err(self.incomplete("no attachments".to_string()));
        }
        for format in self.color.iter().chain(self.depth.iter()) {
            if !ctx.supports_sample_count(*format, self.sample_count) {
                return Err(TargetError::UnsupportedSampleCount {
                    format: *format,
                    samples: self.sample_count,
                });
            }
        }
        Ok(())
    }

    fn incomplete(&self, reason: String) -> TargetError {
        TargetError::Incomplete {
            target: self.name,
            reason,
        }
    }

    fn create_texture(
        &self,
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
    }
}

/// Runs target allocation in an error scope, mapping failures to `Incomplete`
fn allocate<T>(
    ctx: &GpuContext,
    layout: &TargetLayout,
    create: impl FnOnce() -> T,
) -> Result<T, TargetError> {
    layout.validate(ctx)?;
    capture(&ctx.device, layout.name, create).map_err(|e| layout.incomplete(e.to_string()))
}

/// Depth-only target rendered from the light
pub struct ShadowMapTarget {
    layout: TargetLayout,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl ShadowMapTarget {
    /// Allocates the depth texture and its comparison sampler
    pub fn new(ctx: &GpuContext, width: u32, height: u32) -> Result<Self, TargetError> {
        let layout = TargetLayout::shadow_map(width, height);
        let (texture, view, sampler) = allocate(ctx, &layout, || {
            let texture = layout.create_texture(
                &ctx.device,
                "Shadow Map Texture",
                formats::SHADOW_DEPTH,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            // Linear filtering blends four comparison results per tap
            let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Shadow Map Comparison Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                compare: Some(wgpu::CompareFunction::LessEqual),
                ..Default::default()
            });
            (texture, view, sampler)
        })?;

        tracing::info!("Created shadow map target: {}x{}", width, height);
        Ok(Self {
            layout,
            texture,
            view,
            sampler,
        })
    }

    /// Attachment layout (never has a color attachment)
    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    /// Depth view, written by the shadow pass and sampled by the scene pass
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Comparison sampler
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Size in texels
    pub fn size(&self) -> (u32, u32) {
        (self.layout.width, self.layout.height)
    }

    /// Releases the view, then frees the texture.
    ///
    /// Bind groups referencing the view must already be dropped.
    pub fn destroy(self) {
        let Self { view, texture, .. } = self;
        drop(view);
        texture.destroy();
    }
}

/// Multisampled color and depth/stencil target rendered from the eye
pub struct SceneColorTarget {
    layout: TargetLayout,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl SceneColorTarget {
    /// Allocates both attachments with `sample_count` samples
    pub fn new(
        ctx: &GpuContext,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Result<Self, TargetError> {
        let layout = TargetLayout::scene_color(width, height, sample_count);
        let (color_texture, color_view, depth_texture, depth_view) =
            allocate(ctx, &layout, || {
                let color_texture = layout.create_texture(
                    &ctx.device,
                    "Scene Color Texture",
                    formats::SCENE_COLOR,
                    wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                );
                let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
                let depth_texture = layout.create_texture(
                    &ctx.device,
                    "Scene Depth Stencil Texture",
                    formats::SCENE_DEPTH_STENCIL,
                    wgpu::TextureUsages::RENDER_ATTACHMENT,
                );
                let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
                (color_texture, color_view, depth_texture, depth_view)
            })?;

        tracing::info!(
            "Created scene color target: {}x{} with {}x MSAA",
            width,
            height,
            sample_count
        );
        Ok(Self {
            layout,
            color_texture,
            color_view,
            depth_texture,
            depth_view,
        })
    }

    /// Attachment layout
    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    /// Multisampled color view, written by the scene pass and read by the resolve pass
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    /// Depth/stencil view
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Samples per pixel
    pub fn sample_count(&self) -> u32 {
        self.layout.sample_count
    }

    /// Size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.layout.width, self.layout.height)
    }

    /// Releases the views, then frees both textures
    pub fn destroy(self) {
        let Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            ..
        } = self;
        drop(color_view);
        drop(depth_view);
        color_texture.destroy();
        depth_texture.destroy();
    }
}

/// Format egui samples the output through
///
/// The resolve pass writes display-ready values. Reading them through the
/// sRGB variant makes egui decode them to linear before it re-encodes for
/// the window, so colors reach the screen unchanged.
pub fn display_view_format(format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    format.add_srgb_suffix()
}

/// Single-sample texture standing in for the presentable surface
pub struct OutputTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    display_view: wgpu::TextureView,
}

impl OutputTarget {
    /// Creates a texture that can be rendered to, sampled and copied out
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let display_format = display_view_format(format);
        let view_formats: &[wgpu::TextureFormat] = if display_format == format {
            &[]
        } else {
            std::slice::from_ref(&display_format)
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Output Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats,
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let display_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Output Display View"),
            format: Some(display_format),
            ..Default::default()
        });
        Self {
            texture,
            view,
            display_view,
        }
    }

    /// Underlying texture
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Render view
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// View for displaying the output in egui, see [`display_view_format`]
    pub fn display_view(&self) -> &wgpu::TextureView {
        &self.display_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_map_layout_is_depth_only() {
        let layout = TargetLayout::shadow_map(2560, 1392);
        assert_eq!(layout.color, None);
        assert_eq!(layout.depth, Some(wgpu::TextureFormat::Depth32Float));
        assert_eq!(layout.sample_count, 1);
    }

    #[test]
    fn test_display_view_format_is_srgb() {
        assert_eq!(
            display_view_format(crate::constants::formats::OUTPUT),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            display_view_format(wgpu::TextureFormat::Bgra8UnormSrgb),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
    }

    #[test]
    fn test_scene_color_layout() {
        let layout = TargetLayout::scene_color(800, 600, 4);
        assert_eq!(layout.color, Some(wgpu::TextureFormat::Rgba8Unorm));
        assert_eq!(
            layout.depth,
            Some(wgpu::TextureFormat::Depth24PlusStencil8)
        );
        assert_eq!(layout.sample_count, 4);
        assert_eq!(layout.extent().width, 800);
        assert_eq!(layout.extent().height, 600);
        assert_eq!(layout.extent().depth_or_array_layers, 1);
    }
}
