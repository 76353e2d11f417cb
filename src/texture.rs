use cgmath::{Vector2 as Vec2, Vector3 as Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// CPU 纹理，像素按 0xRRGGBBAA 存储
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
}

fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xFF
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0xFFFFFFFF; width * height],
        }
    }

    /// 地面马赛克：8 像素棋盘格，两种棕色加随机噪声
    pub fn mosaic(width: usize, height: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tex = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let noise: u8 = rng.random_range(0..=40);
                let color = if (x / 8 + y / 8) % 2 == 0 {
                    pack_rgb(90 + noise, 80 + noise, 70 + noise)
                } else {
                    pack_rgb(70 + noise, 60 + noise, 50 + noise)
                };
                tex.data[y * width + x] = color;
            }
        }
        tex
    }

    /// 砖墙：每 8 行一层砖，隔层错开半块，灰色灰缝
    pub fn brick(width: usize, height: usize) -> Self {
        let mut tex = Self::new(width, height);
        for y in 0..height {
            let shift = if (y / 8) % 2 == 0 { 0 } else { 4 };
            for x in 0..width {
                let color = if y % 8 == 0 || (x + shift) % 16 == 0 {
                    pack_rgb(150, 150, 150)
                } else if ((x + shift) / 16) % 2 == 0 {
                    pack_rgb(120, 60, 40)
                } else {
                    pack_rgb(100, 50, 30)
                };
                tex.data[y * width + x] = color;
            }
        }
        tex
    }

    /// 最近邻采样，uv 超出 [0,1) 时重复平铺
    pub fn sample(&self, uv: Vec2<f32>) -> Vec3<f32> {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();

        let x = (u * self.width as f32) as usize;
        let y = ((1.0 - v) * self.height as f32) as usize; // 翻转V轴，使UV(0,0)对应纹理左下角

        // 防止坐标越界
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);

        self.get_pixel_color(x, y)
    }

    fn get_pixel_color(&self, x: usize, y: usize) -> Vec3<f32> {
        let color = self.data[y * self.width + x];
        Vec3::new(
            ((color >> 24) & 0xFF) as f32 / 255.0,
            ((color >> 16) & 0xFF) as f32 / 255.0,
            ((color >> 8) & 0xFF) as f32 / 255.0,
        )
    }
}

/// 场景里用到的纹理集合
pub struct TextureSet {
    pub floor: Texture,
    pub wall: Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureId {
    Floor,
    Wall,
}

impl TextureSet {
    pub fn generate(seed: u64) -> Self {
        Self {
            floor: Texture::mosaic(128, 128, seed),
            wall: Texture::brick(64, 64),
        }
    }

    pub fn get(&self, id: TextureId) -> &Texture {
        match id {
            TextureId::Floor => &self.floor,
            TextureId::Wall => &self.wall,
        }
    }
}
