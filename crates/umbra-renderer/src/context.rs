//! GPU context: adapter, device and queue
//!
//! The viewer wraps the handles owned by egui-wgpu. Tests and offscreen
//! callers create their own with [`GpuContext::headless`].

use crate::error::RendererError;

/// Device handles the renderer draws with
#[derive(Debug, Clone)]
pub struct GpuContext {
    /// Adapter the device was created from (used for format capability queries)
    pub adapter: wgpu::Adapter,
    /// Logical device
    pub device: wgpu::Device,
    /// Command queue
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Wraps existing handles
    pub fn new(adapter: wgpu::Adapter, device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            adapter,
            device,
            queue,
        }
    }

    /// Features to request so every supported sample count can be queried
    pub fn required_features(adapter: &wgpu::Adapter) -> wgpu::Features {
        adapter.features() & wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
    }

    /// Creates a context without a surface, blocking on adapter and device requests
    pub fn headless() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| RendererError::NoAdapter(e.to_string()))?;

        let info = adapter.get_info();
        tracing::info!(
            "Headless adapter: {} ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Umbra Headless Device"),
            required_features: Self::required_features(&adapter),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
        }))
        .map_err(|e| RendererError::RequestDevice(e.to_string()))?;

        Ok(Self::new(adapter, device, queue))
    }

    /// Whether `format` can be rendered with `samples` samples per pixel
    ///
    /// Without adapter-specific format features only the WebGPU guaranteed
    /// counts (1 and 4) are available.
    pub fn supports_sample_count(&self, format: wgpu::TextureFormat, samples: u32) -> bool {
        if samples == 1 {
            return true;
        }
        let features = if self
            .device
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        {
            self.adapter.get_texture_format_features(format)
        } else {
            format.guaranteed_format_features(self.device.features())
        };
        features.flags.sample_count_supported(samples)
    }
}
