//! Resolve pass: averages the scene samples onto the presentable surface

use crate::constants::bindings;
use crate::mesh::FullscreenQuad;
use crate::programs::ResolveProgram;

/// Resolve pass parameters.
pub struct ResolvePassParams<'a> {
    /// Resolve program.
    pub program: &'a ResolveProgram,
    /// Scene color view + sample-count uniform.
    pub bind_group: &'a wgpu::BindGroup,
    /// Full-screen quad.
    pub quad: &'a FullscreenQuad,
    /// Viewport size (the window, not the shadow map).
    pub viewport: (u32, u32),
    /// Clear color.
    pub clear_color: wgpu::Color,
}

/// Execute the resolve pass into `view`.
pub fn render_resolve_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    params: &ResolvePassParams<'_>,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Resolve Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(params.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let (width, height) = params.viewport;
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    pass.set_pipeline(params.program.pipeline());
    pass.set_bind_group(bindings::RESOLVE_GROUP, params.bind_group, &[]);
    params.quad.draw(&mut pass);
}
