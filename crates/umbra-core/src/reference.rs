//! CPU reference model of the shader math
//!
//! Mirrors what the scene and resolve shaders compute so that shadow lookup,
//! PCF weighting and the MSAA resolve can be checked without a GPU. The
//! comparison sampler is modelled the way wgpu configures it: bilinear
//! filtering of the comparison results, clamp-to-edge addressing, and the
//! `LessEqual` function (a tap passes when `reference <= stored`).

use glam::{UVec2, Vec2, Vec4};

use crate::config::PcfConfig;

/// Single-channel depth image, row-major, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    depths: Vec<f32>,
}

impl DepthImage {
    /// Image with every texel set to `depth`
    pub fn filled(width: u32, height: u32, depth: f32) -> Self {
        Self::from_fn(width, height, |_, _| depth)
    }

    /// Image whose texel `(x, y)` is `f(x, y)`
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Self {
        let depths = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            depths,
        }
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stored depth at a texel, with clamp-to-edge addressing
    pub fn texel(&self, x: i32, y: i32) -> f32 {
        let cx = x.clamp(0, self.width as i32 - 1) as usize;
        let cy = y.clamp(0, self.height as i32 - 1) as usize;
        self.depths[cy * self.width as usize + cx]
    }

    /// Hardware-style filtered depth comparison at `uv`
    ///
    /// Returns the bilinear blend of the four neighbouring pass/fail results.
    pub fn sample_compare(&self, uv: Vec2, reference: f32) -> f32 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as i32, y0 as i32);

        let pass = |tx: i32, ty: i32| {
            if reference <= self.texel(tx, ty) {
                1.0
            } else {
                0.0
            }
        };

        let top = pass(ix, iy) * (1.0 - fx) + pass(ix + 1, iy) * fx;
        let bottom = pass(ix, iy + 1) * (1.0 - fx) + pass(ix + 1, iy + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Maps a light clip-space position to shadow-map coordinates
///
/// x and y go from [-w, w] to [0, w] with y flipped to texture rows. Depth is
/// already in [0, w]. The result stays homogeneous; divide by w per tap.
pub fn shadow_coord(light_clip: Vec4) -> Vec4 {
    Vec4::new(
        light_clip.x * 0.5 + light_clip.w * 0.5,
        light_clip.y * -0.5 + light_clip.w * 0.5,
        light_clip.z,
        light_clip.w,
    )
}

/// Fraction of PCF taps that see the light, in [0, 1]
pub fn pcf_lit_fraction(
    map: &DepthImage,
    coord: Vec4,
    pcf: &PcfConfig,
    texel_size: [f32; 2],
) -> f32 {
    let sum: f32 = pcf
        .tap_offsets()
        .map(|(ox, oy)| {
            let tap = coord
                + Vec4::new(
                    ox * texel_size[0] * coord.w,
                    oy * texel_size[1] * coord.w,
                    pcf.depth_bias * coord.w,
                    0.0,
                );
            map.sample_compare(Vec2::new(tap.x, tap.y) / tap.w, tap.z / tap.w)
        })
        .sum();
    sum * pcf.tap_weight()
}

/// Texel addressed by the resolve pass for a given texture coordinate
pub fn resolve_coord(uv: Vec2, size: UVec2) -> UVec2 {
    let texel = (uv * size.as_vec2()).max(Vec2::ZERO).as_uvec2();
    texel.min(size.saturating_sub(UVec2::ONE))
}

/// Unweighted mean of a pixel's samples, or `None` for no samples
pub fn resolve_texel(samples: &[[f32; 4]]) -> Option<[f32; 4]> {
    if samples.is_empty() {
        return None;
    }
    let sum = samples.iter().fold(Vec4::ZERO, |acc, s| acc + Vec4::from_array(*s));
    Some((sum / samples.len() as f32).to_array())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SIZE: u32 = 64;

    fn texel_size() -> [f32; 2] {
        [1.0 / SIZE as f32, 1.0 / SIZE as f32]
    }

    #[test]
    fn test_shadow_coord_maps_clip_corners() {
        let top_left = shadow_coord(Vec4::new(-1.0, 1.0, 0.25, 1.0));
        assert_eq!(top_left, Vec4::new(0.0, 0.0, 0.25, 1.0));
        let bottom_right = shadow_coord(Vec4::new(2.0, -2.0, 1.0, 2.0));
        assert_eq!(bottom_right / bottom_right.w, Vec4::new(1.0, 1.0, 0.5, 1.0));
    }

    #[test]
    fn test_unoccluded_fragment_is_fully_lit() {
        let map = DepthImage::filled(SIZE, SIZE, 1.0);
        let coord = Vec4::new(0.5, 0.5, 0.4, 1.0);
        let lit = pcf_lit_fraction(&map, coord, &PcfConfig::default(), texel_size());
        assert_relative_eq!(lit, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_occluded_fragment_is_fully_shadowed() {
        let map = DepthImage::filled(SIZE, SIZE, 0.3);
        let coord = Vec4::new(0.5, 0.5, 0.7, 1.0);
        let lit = pcf_lit_fraction(&map, coord, &PcfConfig::default(), texel_size());
        assert_relative_eq!(lit, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_homogeneous_coordinates_match_divided() {
        let map = DepthImage::from_fn(SIZE, SIZE, |x, _| if x < SIZE / 2 { 0.2 } else { 1.0 });
        let pcf = PcfConfig::default();
        let coord = Vec4::new(0.49, 0.5, 0.5, 1.0);
        let scaled = coord * 3.0;
        assert_relative_eq!(
            pcf_lit_fraction(&map, coord, &pcf, texel_size()),
            pcf_lit_fraction(&map, scaled, &pcf, texel_size()),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_lit_fraction_is_monotonic_across_shadow_edge() {
        // Occluder covers the left half of the map.
        let map = DepthImage::from_fn(SIZE, SIZE, |x, _| if x < SIZE / 2 { 0.2 } else { 1.0 });
        let pcf = PcfConfig::default();

        let mut previous = 0.0;
        let mut saw_partial = false;
        for step in 0..=64 {
            let u = 0.4 + 0.2 * step as f32 / 64.0;
            let lit = pcf_lit_fraction(&map, Vec4::new(u, 0.5, 0.5, 1.0), &pcf, texel_size());
            assert!((0.0..=1.0).contains(&lit));
            assert!(lit + 1e-6 >= previous, "lit fraction decreased at u={u}");
            saw_partial |= lit > 0.0 && lit < 1.0;
            previous = lit;
        }
        assert!(saw_partial, "expected a soft edge");
        assert_relative_eq!(previous, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_depth_bias_prevents_self_shadowing() {
        let map = DepthImage::filled(SIZE, SIZE, 0.5);
        let coord = Vec4::new(0.5, 0.5, 0.5, 1.0);
        let lit = pcf_lit_fraction(&map, coord, &PcfConfig::default(), texel_size());
        assert_relative_eq!(lit, 1.0, epsilon = 1e-6);

        let unbiased = PcfConfig {
            depth_bias: 0.001,
            ..PcfConfig::default()
        };
        assert_relative_eq!(
            pcf_lit_fraction(&map, coord, &unbiased, texel_size()),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_sample_compare_clamps_to_edge() {
        let map = DepthImage::from_fn(4, 4, |x, _| if x == 0 { 0.1 } else { 1.0 });
        assert_relative_eq!(map.sample_compare(Vec2::new(-0.5, 0.5), 0.5), 0.0);
        assert_relative_eq!(map.sample_compare(Vec2::new(1.5, 0.5), 0.5), 1.0);
    }

    #[test]
    fn test_resolve_is_mean_of_samples() {
        for count in [1usize, 2, 4, 8] {
            let samples: Vec<[f32; 4]> = (0..count)
                .map(|i| {
                    let t = i as f32 / count as f32;
                    [t, 1.0 - t, 0.5, if i % 2 == 0 { 1.0 } else { 0.0 }]
                })
                .collect();
            let resolved = resolve_texel(&samples).unwrap();
            for channel in 0..4 {
                let mean =
                    samples.iter().map(|s| s[channel]).sum::<f32>() / count as f32;
                assert_relative_eq!(resolved[channel], mean, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_uniform_samples_resolve_exactly() {
        let clear = [1.0, 1.0, 1.0, 0.0];
        let red = [1.0, 0.0, 0.0, 1.0];
        for count in [1usize, 2, 4, 8] {
            assert_eq!(resolve_texel(&vec![clear; count]), Some(clear));
            assert_eq!(resolve_texel(&vec![red; count]), Some(red));
        }
        assert_eq!(resolve_texel(&[]), None);
    }

    #[test]
    fn test_resolve_coord_clamps_last_texel() {
        let size = UVec2::new(2560, 1392);
        assert_eq!(resolve_coord(Vec2::ZERO, size), UVec2::ZERO);
        assert_eq!(resolve_coord(Vec2::ONE, size), UVec2::new(2559, 1391));
        assert_eq!(resolve_coord(Vec2::new(0.5, 0.5), size), UVec2::new(1280, 696));
    }
}
