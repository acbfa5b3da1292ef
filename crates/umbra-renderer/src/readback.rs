//! Texture readback for verifying rendered output

use std::sync::mpsc;

use crate::context::GpuContext;
use crate::error::GraphicsError;

const BYTES_PER_PIXEL: u32 = 4;

/// Tightly packed 8-bit RGBA image, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// Pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * BYTES_PER_PIXEL) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Iterator over every pixel, row by row
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL as usize)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Row pitch of the staging buffer, padded to the copy alignment
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copies a 4-byte-per-pixel texture into a mapped buffer and unpads it.
///
/// Blocks until the GPU has finished all submitted work.
pub fn read_texture_rgba8(
    ctx: &GpuContext,
    texture: &wgpu::Texture,
) -> Result<RgbaImage, GraphicsError> {
    let operation = "read back texture";
    if texture.format().block_copy_size(None) != Some(BYTES_PER_PIXEL) {
        return Err(GraphicsError::Readback {
            operation: operation.to_string(),
            description: format!("{:?} is not a 4-byte color format", texture.format()),
        });
    }

    let width = texture.width();
    let height = texture.height();
    let padded_row = padded_bytes_per_row(width);

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (padded_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    ctx.queue.submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| GraphicsError::Readback {
            operation: operation.to_string(),
            description: e.to_string(),
        })?;

    let mapped = receiver
        .recv()
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()));
    if let Err(description) = mapped {
        return Err(GraphicsError::Readback {
            operation: operation.to_string(),
            description,
        });
    }

    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let mut data = Vec::with_capacity(row_bytes * height as usize);
    {
        let view = slice.get_mapped_range();
        for row in view.chunks(padded_row as usize) {
            data.extend_from_slice(&row[..row_bytes]);
        }
    }
    buffer.unmap();
    buffer.destroy();

    Ok(RgbaImage {
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(2560), 10240);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn test_pixel_indexing() {
        let image = RgbaImage {
            width: 2,
            height: 2,
            data: (0..16).collect(),
        };
        assert_eq!(image.pixel(0, 0), [0, 1, 2, 3]);
        assert_eq!(image.pixel(1, 1), [12, 13, 14, 15]);
        assert_eq!(image.pixels().count(), 4);
    }
}
