//! Scene pass: shaded geometry from the eye into the multisampled target

use crate::constants::{DEPTH_CLEAR, bindings};
use crate::programs::SceneProgram;
use crate::targets::SceneColorTarget;

use super::MeshDraw;

/// Scene pass parameters.
pub struct ScenePassParams<'a> {
    /// Multisampled color + depth/stencil target.
    pub target: &'a SceneColorTarget,
    /// Shaded scene program.
    pub program: &'a SceneProgram,
    /// PCF uniform, shadow depth view and comparison sampler.
    pub shadow_bind_group: &'a wgpu::BindGroup,
    /// Objects to shade.
    pub draws: &'a [MeshDraw<'a>],
    /// Clear color.
    pub clear_color: wgpu::Color,
}

/// Execute the scene pass.
pub fn render_scene_pass(encoder: &mut wgpu::CommandEncoder, params: &ScenePassParams<'_>) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Scene Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: params.target.color_view(),
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(params.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: params.target.depth_view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Discard,
            }),
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let (width, height) = params.target.size();
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    pass.set_pipeline(params.program.pipeline());
    pass.set_bind_group(bindings::SHADOW_GROUP, params.shadow_bind_group, &[]);

    for draw in params.draws {
        pass.set_bind_group(bindings::OBJECT_GROUP, draw.object, &[]);
        draw.mesh.draw(&mut pass);
    }
}
