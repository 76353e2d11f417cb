use cgmath::Vector3 as Vec3;

/// 固定管线风格的材质：颜色同时作为环境光和漫反射反射率
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3<f32>,
    pub specular: Vec3<f32>,
    pub shininess: f32,
    pub emission: Vec3<f32>,
    /// 小于 1 时走半透明通道
    pub alpha: f32,
}

impl Material {
    fn new(color: [f32; 3], specular: f32, shininess: f32) -> Self {
        Self {
            color: Vec3::new(color[0], color[1], color[2]),
            specular: Vec3::new(specular, specular, specular),
            shininess,
            emission: Vec3::new(0.0, 0.0, 0.0),
            alpha: 1.0,
        }
    }

    fn translucent(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    fn glowing(mut self, emission: [f32; 3]) -> Self {
        self.emission = Vec3::new(emission[0], emission[1], emission[2]);
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    CarPaint,
    SteeringLeather,
    DoorInner,
    Seat,
    InnerBlack,
    GarageMetal,
    GarageInnerWall,
    Glass,
    Rubber,
    Wood,
    Stone,
    Roof,
    Foliage,
    Chrome,
    BulbOff,
    BulbOn,
    TailLightOff,
    TailLightOn,
    HouseWhite,
    HouseBrick,
    HouseRoof,
    HouseWindow,
}

impl MaterialKind {
    #[rustfmt::skip]
    pub fn material(self) -> Material {
        match self {
            MaterialKind::CarPaint        => Material::new([0.0, 0.3, 0.9], 1.0, 20.0),
            MaterialKind::SteeringLeather => Material::new([0.7, 0.7, 0.75], 0.5, 20.0),
            MaterialKind::DoorInner       => Material::new([0.15, 0.15, 0.15], 0.1, 0.0),
            MaterialKind::Seat            => Material::new([0.1, 0.1, 0.1], 0.3, 10.0),
            MaterialKind::InnerBlack      => Material::new([0.05, 0.05, 0.05], 0.3, 30.0),
            MaterialKind::GarageMetal     => Material::new([0.7, 0.7, 0.8], 0.9, 80.0),
            MaterialKind::GarageInnerWall => Material::new([0.3, 0.3, 0.3], 0.0, 0.0),
            MaterialKind::Glass           => Material::new([0.6, 0.85, 0.95], 1.0, 128.0).translucent(0.3),
            MaterialKind::Rubber          => Material::new([0.15, 0.15, 0.15], 0.1, 0.0),
            MaterialKind::Wood            => Material::new([0.4, 0.25, 0.1], 0.1, 0.0),
            MaterialKind::Stone           => Material::new([0.6, 0.6, 0.6], 0.0, 0.0),
            MaterialKind::Roof            => Material::new([0.3, 0.3, 0.3], 0.0, 0.0),
            MaterialKind::Foliage         => Material::new([0.0, 0.4, 0.0], 0.0, 0.0),
            MaterialKind::Chrome          => Material::new([0.9, 0.9, 0.9], 0.98, 128.0),
            MaterialKind::BulbOff         => Material::new([0.3, 0.3, 0.1], 0.5, 0.0),
            MaterialKind::BulbOn          => Material::new([1.0, 1.0, 0.9], 0.5, 0.0).glowing([1.0, 1.0, 0.9]),
            MaterialKind::TailLightOff    => Material::new([0.4, 0.0, 0.0], 0.3, 0.0),
            MaterialKind::TailLightOn     => Material::new([1.0, 0.0, 0.0], 0.3, 0.0).glowing([1.0, 0.0, 0.0]),
            MaterialKind::HouseWhite      => Material::new([0.95, 0.95, 0.95], 0.2, 0.0),
            MaterialKind::HouseBrick      => Material::new([0.7, 0.3, 0.2], 0.1, 0.0),
            MaterialKind::HouseRoof       => Material::new([0.2, 0.2, 0.25], 0.1, 0.0),
            MaterialKind::HouseWindow     => Material::new([0.4, 0.6, 0.8], 0.9, 100.0).translucent(0.6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_glass_like_materials_are_translucent() {
        assert!(MaterialKind::Glass.material().is_translucent());
        assert!(MaterialKind::HouseWindow.material().is_translucent());
        assert!(!MaterialKind::CarPaint.material().is_translucent());
    }

    #[test]
    fn lit_lamps_glow() {
        assert_eq!(MaterialKind::BulbOff.material().emission, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(MaterialKind::TailLightOn.material().emission, Vec3::new(1.0, 0.0, 0.0));
    }
}
