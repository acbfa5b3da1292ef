//! Shadow pass: depth from the light's viewpoint

use crate::constants::{DEPTH_CLEAR, bindings};
use crate::programs::ShadowDepthProgram;
use crate::targets::ShadowMapTarget;

use super::MeshDraw;

/// Shadow pass parameters.
pub struct ShadowPassParams<'a> {
    /// Depth target written by this pass.
    pub target: &'a ShadowMapTarget,
    /// Depth-only program (carries the polygon offset).
    pub program: &'a ShadowDepthProgram,
    /// Objects to rasterize.
    pub draws: &'a [MeshDraw<'a>],
}

/// Execute the shadow pass.
///
/// Only the depth attachment is bound and cleared. The depth bias lives in
/// the shadow pipeline, so it ends with this pass.
pub fn render_shadow_pass(encoder: &mut wgpu::CommandEncoder, params: &ShadowPassParams<'_>) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Shadow Pass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: params.target.view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let (width, height) = params.target.size();
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    pass.set_pipeline(params.program.pipeline());

    for draw in params.draws {
        pass.set_bind_group(bindings::OBJECT_GROUP, draw.object, &[]);
        draw.mesh.draw(&mut pass);
    }
}
