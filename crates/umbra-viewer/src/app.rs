//! Viewer application

use umbra_core::{ConfigError, SceneConfig};
use umbra_renderer::constants::formats;
use umbra_renderer::{GpuContext, OutputTarget, RendererError, ShadowRenderer};

/// Renderer plus the egui texture it draws into
struct Viewport {
    render_state: egui_wgpu::RenderState,
    ctx: GpuContext,
    renderer: Option<ShadowRenderer>,
    output: OutputTarget,
    texture_id: egui::TextureId,
}

impl Viewport {
    fn new(
        render_state: &egui_wgpu::RenderState,
        config: SceneConfig,
    ) -> Result<Self, RendererError> {
        let ctx = GpuContext::new(
            wgpu::Adapter::clone(&render_state.adapter),
            wgpu::Device::clone(&render_state.device),
            wgpu::Queue::clone(&render_state.queue),
        );

        let renderer = ShadowRenderer::init(&ctx, config, formats::OUTPUT)?;
        let output = renderer.create_output_target(&ctx);
        // egui expects sRGB-encoded textures, like its own
        let texture_id = render_state.renderer.write().register_native_texture(
            &ctx.device,
            output.display_view(),
            wgpu::FilterMode::Linear,
        );

        Ok(Self {
            render_state: render_state.clone(),
            ctx,
            renderer: Some(renderer),
            output,
            texture_id,
        })
    }

    fn draw(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.draw_frame(&self.ctx, self.output.view());
        }
    }

    fn shutdown(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            self.render_state
                .renderer
                .write()
                .free_texture(&self.texture_id);
            renderer.shutdown(&self.ctx);
        }
    }
}

/// Viewer application state
pub struct ViewerApp {
    /// Running viewport, or the fatal error that prevented it
    viewport: Result<Viewport, String>,
}

impl ViewerApp {
    /// Create the app, initializing the renderer on egui's device
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Result<SceneConfig, ConfigError>,
    ) -> Self {
        let viewport = match cc.wgpu_render_state.as_ref() {
            Some(render_state) => config
                .map_err(RendererError::from)
                .and_then(|config| Viewport::new(render_state, config))
                .map_err(|e| {
                    tracing::error!("Renderer initialization failed: {}", e);
                    e.to_string()
                }),
            None => {
                tracing::error!("eframe started without a wgpu render state");
                Err("wgpu backend unavailable".to_string())
            }
        };

        Self { viewport }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| match &mut self.viewport {
                Ok(viewport) => {
                    viewport.draw();
                    let size = ui.available_size();
                    ui.add(egui::Image::new(egui::load::SizedTexture::new(
                        viewport.texture_id,
                        size,
                    )));
                }
                Err(message) => {
                    ui.centered_and_justified(|ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, message.as_str());
                    });
                }
            });

        if self.viewport.is_ok() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self) {
        if let Ok(viewport) = &mut self.viewport {
            viewport.shutdown();
        }
    }
}
