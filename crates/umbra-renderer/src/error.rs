//! Renderer errors and device error-scope helpers
//!
//! Two classes of failure exist. Initialization failures ([`RendererError`])
//! abort setup and no partial pipeline runs. Per-frame failures are captured
//! as [`GraphicsError`] by [`checked`] and only logged.

use umbra_core::ConfigError;

/// An error reported by the device inside an error scope
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphicsError {
    /// API misuse detected by wgpu validation
    #[error("{operation}: validation error: {description}")]
    Validation {
        /// Operation that raised the error
        operation: String,
        /// Message reported by wgpu
        description: String,
    },
    /// Allocation failure
    #[error("{operation}: out of memory")]
    OutOfMemory {
        /// Operation that raised the error
        operation: String,
    },
    /// Driver or backend failure
    #[error("{operation}: internal error: {description}")]
    Internal {
        /// Operation that raised the error
        operation: String,
        /// Message reported by wgpu
        description: String,
    },
    /// Mapping a readback buffer failed
    #[error("{operation}: buffer mapping failed: {description}")]
    Readback {
        /// Operation that raised the error
        operation: String,
        /// Message reported by wgpu
        description: String,
    },
}

impl GraphicsError {
    fn from_wgpu(operation: &str, error: wgpu::Error) -> Self {
        let operation = operation.to_string();
        match error {
            wgpu::Error::OutOfMemory { .. } => Self::OutOfMemory { operation },
            wgpu::Error::Validation { description, .. } => Self::Validation {
                operation,
                description,
            },
            wgpu::Error::Internal { description, .. } => Self::Internal {
                operation,
                description,
            },
        }
    }
}

/// Render target failures, always fatal
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    /// Attachments could not be created or combined
    #[error("{target} target is incomplete: {reason}")]
    Incomplete {
        /// Target name
        target: &'static str,
        /// What went wrong
        reason: String,
    },
    /// The adapter cannot multisample the format at this count
    #[error("{format:?} does not support {samples}x multisampling on this adapter")]
    UnsupportedSampleCount {
        /// Attachment format
        format: wgpu::TextureFormat,
        /// Requested sample count
        samples: u32,
    },
}

/// Fatal initialization errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RendererError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Render target creation failed
    #[error(transparent)]
    Target(#[from] TargetError),
    /// Shader module or pipeline creation failed
    #[error("failed to build the {program} program: {source}")]
    Program {
        /// Program name
        program: &'static str,
        /// Underlying device error
        source: GraphicsError,
    },
    /// Any other device error during setup
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
    /// No adapter matched the request
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),
    /// The adapter refused to create a device
    #[error("failed to create device: {0}")]
    RequestDevice(String),
}

/// Runs `op` inside validation and out-of-memory error scopes.
///
/// This is the always-on form of [`checked`], used where a failure must be
/// detected in release builds too (render target and program creation).
pub fn capture<T>(
    device: &wgpu::Device,
    operation: &str,
    op: impl FnOnce() -> T,
) -> Result<T, GraphicsError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = op();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(error) => Err(GraphicsError::from_wgpu(operation, error)),
        None => Ok(value),
    }
}

/// Runs `op` and reports any device error it raised.
///
/// Scopes are only pushed in debug builds. Release builds run `op` directly
/// and always return `Ok`.
pub fn checked<T>(
    device: &wgpu::Device,
    operation: &str,
    op: impl FnOnce() -> T,
) -> Result<T, GraphicsError> {
    if cfg!(debug_assertions) {
        capture(device, operation, op)
    } else {
        Ok(op())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_operation() {
        let err = GraphicsError::Validation {
            operation: "shadow pass".to_string(),
            description: "bad bind group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "shadow pass: validation error: bad bind group"
        );

        let err = RendererError::Program {
            program: "resolve",
            source: GraphicsError::OutOfMemory {
                operation: "create pipeline".to_string(),
            },
        };
        assert!(err.to_string().contains("resolve program"));
    }

    #[test]
    fn test_target_error_converts_to_renderer_error() {
        let err: RendererError = TargetError::UnsupportedSampleCount {
            format: wgpu::TextureFormat::Rgba8Unorm,
            samples: 8,
        }
        .into();
        assert!(matches!(
            err,
            RendererError::Target(TargetError::UnsupportedSampleCount { samples: 8, .. })
        ));
    }
}
