//! Umbra viewer main entry point

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "umbra_viewer=debug,umbra_renderer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Umbra viewer");

    let config = umbra_viewer::load_config();
    let window = config
        .as_ref()
        .map(|c| c.window.clone())
        .unwrap_or_default();

    let wgpu_options = egui_wgpu::WgpuConfiguration {
        wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
            instance_descriptor: wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            },
            power_preference: wgpu::PowerPreference::HighPerformance,
            device_descriptor: std::sync::Arc::new(|adapter| wgpu::DeviceDescriptor {
                label: Some("umbra device"),
                required_features: umbra_renderer::GpuContext::required_features(adapter),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    // Render targets have a fixed size, so the window does too
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width as f32, window.height as f32])
            .with_resizable(false)
            .with_title(window.title.as_str()),
        wgpu_options,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "umbra",
        native_options,
        Box::new(|cc| Ok(Box::new(umbra_viewer::ViewerApp::new(cc, config)))),
    )
}
