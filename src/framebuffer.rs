use std::path::Path;

use cgmath::Vector3 as Vec3;
use rayon::prelude::*;

use crate::error::AppError;

/// 深度缓冲的清空值（NDC 深度映射到 [0,1] 后的远平面）
pub const FAR_DEPTH: f32 = 1.0;

/// 0xAARRGGBB，与窗口缓冲区格式一致
pub fn pack_color(color: Vec3<f32>) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF000000 | channel(color.x) << 16 | channel(color.y) << 8 | channel(color.z)
}

pub fn unpack_color(color: u32) -> Vec3<f32> {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    )
}

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0xFF000000; width * height],
            depth: vec![FAR_DEPTH; width * height],
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.data.par_iter_mut().for_each(|px| *px = color);
        self.depth.par_iter_mut().for_each(|d| *d = FAR_DEPTH);
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// 深度测试通过则写入颜色和深度，返回是否写入
    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.depth[idx] {
                self.data[idx] = color;
                self.depth[idx] = depth;
                return true;
            }
        }
        false
    }

    /// 半透明写入：做深度测试但不写深度，按 alpha 与已有颜色混合
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Vec3<f32>, alpha: f32, depth: f32) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.depth[idx] {
                let dst = unpack_color(self.data[idx]);
                self.data[idx] = pack_color(color * alpha + dst * (1.0 - alpha));
                return true;
            }
        }
        false
    }

    /// 超采样降分辨率：每 factor x factor 个像素取平均
    pub fn ssaa(&self, factor: usize) -> Self {
        let factor = factor.max(1);
        let new_width = self.width / factor;
        let new_height = self.height / factor;
        let mut new_data = vec![0; new_width * new_height];
        if new_width == 0 {
            return Self::new(new_width, new_height);
        }
        let count = (factor * factor) as u32;

        new_data
            .par_chunks_mut(new_width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
                    for dy in 0..factor {
                        for dx in 0..factor {
                            let src_idx = (y * factor + dy) * self.width + x * factor + dx;
                            let color = self.data[src_idx];
                            r += (color >> 16) & 0xFF;
                            g += (color >> 8) & 0xFF;
                            b += color & 0xFF;
                        }
                    }
                    *out = 0xFF000000 | (r / count) << 16 | (g / count) << 8 | (b / count);
                }
            });

        Self {
            width: new_width,
            height: new_height,
            data: new_data,
            depth: vec![FAR_DEPTH; new_width * new_height],
        }
    }

    pub fn save_to_image(&self, filepath: &Path) -> Result<(), AppError> {
        let mut img = image::RgbaImage::new(self.width as u32, self.height as u32);
        img.par_chunks_mut(4)
            .zip(self.data.par_iter())
            .for_each(|(px, &color)| {
                px[0] = ((color >> 16) & 0xFF) as u8;
                px[1] = ((color >> 8) & 0xFF) as u8;
                px[2] = (color & 0xFF) as u8;
                px[3] = 0xFF;
            });
        img.save(filepath)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nearest_fragment_wins() {
        let mut fb = FrameBuffer::new(4, 4);
        assert!(fb.put_pixel(1, 1, 0xFFFF0000, 0.5));
        assert!(!fb.put_pixel(1, 1, 0xFF00FF00, 0.7));
        assert!(fb.put_pixel(1, 1, 0xFF0000FF, 0.2));
        assert_eq!(fb.pixel(1, 1), Some(0xFF0000FF));
        assert!(!fb.put_pixel(9, 9, 0xFF0000FF, 0.0));
    }

    #[test]
    fn blending_mixes_and_keeps_depth() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.clear(pack_color(Vec3::new(0.0, 0.0, 1.0)));
        assert!(fb.blend_pixel(0, 0, Vec3::new(1.0, 0.0, 0.0), 0.5, 0.3));
        let mixed = unpack_color(fb.pixel(0, 0).unwrap());
        assert_relative_eq!(mixed.x, 0.5, epsilon = 0.01);
        assert_relative_eq!(mixed.z, 0.5, epsilon = 0.01);
        assert_eq!(fb.depth[0], FAR_DEPTH);

        // 被不透明物体挡住时不混合
        fb.put_pixel(1, 0, 0xFF000000, 0.1);
        assert!(!fb.blend_pixel(1, 0, Vec3::new(1.0, 1.0, 1.0), 0.5, 0.3));
    }

    #[test]
    fn ssaa_averages_blocks() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.clear(0xFF000000);
        fb.data[0] = 0xFFFFFFFF;
        fb.data[1] = 0xFFFFFFFF;
        let small = fb.ssaa(2);
        assert_eq!((small.width, small.height), (2, 1));
        assert_eq!(small.data[0], 0xFF7F7F7F);
        assert_eq!(small.data[1], 0xFF000000);
    }

    #[test]
    fn clear_resets_depth() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.put_pixel(0, 0, 0xFFFFFFFF, 0.1);
        fb.clear(0xFF102030);
        assert!(fb.depth.iter().all(|&d| d == FAR_DEPTH));
        assert!(fb.data.iter().all(|&c| c == 0xFF102030));
    }

    #[test]
    fn colour_packing_round_trips_extremes() {
        assert_eq!(pack_color(Vec3::new(1.0, 0.0, 2.0)), 0xFFFF00FF);
        assert_eq!(unpack_color(0xFFFF0000), Vec3::new(1.0, 0.0, 0.0));
    }
}
