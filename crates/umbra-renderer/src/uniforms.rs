//! Uniform buffer layouts shared with the WGSL sources

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use umbra_core::{PcfConfig, ShadowConfig, TransformSet};

/// Per-object uniform (group 0 of the shadow and scene programs)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Model, eye view and perspective projection
    pub mvp_eye: [[f32; 4]; 4],
    /// Model, light view and orthographic projection
    pub mvp_light: [[f32; 4]; 4],
    /// Flat object color (RGBA)
    pub color: [f32; 4],
}

impl ObjectUniform {
    /// Builds the uniform for one object
    pub fn new(transforms: &TransformSet, color: [f32; 4]) -> Self {
        Self {
            mvp_eye: transforms.mvp_eye.to_cols_array_2d(),
            mvp_light: transforms.mvp_light.to_cols_array_2d(),
            color,
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            mvp_eye: Mat4::IDENTITY.to_cols_array_2d(),
            mvp_light: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
        }
    }
}

/// PCF parameters (group 1, binding 0 of the scene program)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowSamplingUniform {
    /// One shadow-map texel in texture coordinates
    pub texel_size: [f32; 2],
    /// Distance between taps in texels
    pub tap_spacing: f32,
    /// Comparison depth offset, scaled by w in the shader
    pub depth_bias: f32,
    /// Taps on each side of the center
    pub kernel_radius: i32,
    /// Normalization applied to the tap sum
    pub tap_weight: f32,
    /// Padding for alignment
    pub _pad: [f32; 2],
}

impl ShadowSamplingUniform {
    /// Builds the uniform from the shadow and PCF settings
    pub fn new(shadow: &ShadowConfig, pcf: &PcfConfig) -> Self {
        Self {
            texel_size: shadow.texel_size(),
            tap_spacing: pcf.tap_spacing,
            depth_bias: pcf.depth_bias,
            kernel_radius: pcf.kernel_radius as i32,
            tap_weight: pcf.tap_weight(),
            _pad: [0.0; 2],
        }
    }
}

/// Resolve parameters (group 0, binding 1 of the resolve program)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ResolveUniform {
    /// Samples per pixel of the scene-color target
    pub samples: u32,
    /// Padding for alignment
    pub _pad0: u32,
    /// Padding for alignment
    pub _pad1: u32,
    /// Padding for alignment
    pub _pad2: u32,
}

impl ResolveUniform {
    /// Builds the uniform for a sample count
    pub fn new(samples: u32) -> Self {
        Self {
            samples,
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        }
    }
}
