use cgmath::{ElementWise, InnerSpace, Vector3 as Vec3, Zero};

use crate::material::Material;
use crate::vehicle::VehicleState;

/// 全局环境光（对应固定管线的默认值）
const GLOBAL_AMBIENT: f32 = 0.2;

const HEADLIGHT_OFFSETS: [[f32; 3]; 2] = [[-0.7, 0.35, -2.6], [0.7, 0.35, -2.6]];
const HEADLIGHT_AIM: [f32; 3] = [0.0, -0.2, -1.0];
const HEADLIGHT_CUTOFF_DEG: f32 = 35.0;
const HEADLIGHT_EXPONENT: f32 = 20.0;
const GARAGE_LAMP_POS: [f32; 3] = [0.0, 6.0, -15.0];

pub const DAY_SKY: [f32; 3] = [0.6, 0.8, 1.0];
pub const NIGHT_SKY: [f32; 3] = [0.05, 0.05, 0.1];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSource {
    /// 平行光，向量指向光源
    Directional(Vec3<f32>),
    Point(Vec3<f32>),
    Spot {
        position: Vec3<f32>,
        direction: Vec3<f32>,
        cos_cutoff: f32,
        exponent: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub source: LightSource,
    pub color: Vec3<f32>,
    pub specular: Vec3<f32>,
    pub ambient: Vec3<f32>,
    /// 常数、线性、二次衰减
    pub attenuation: [f32; 3],
    pub enabled: bool,
}

impl Light {
    fn point(position: Vec3<f32>, color: Vec3<f32>) -> Self {
        Self {
            source: LightSource::Point(position),
            color,
            specular: color,
            ambient: Vec3::zero(),
            attenuation: [1.0, 0.0, 0.0],
            enabled: true,
        }
    }

    fn sun(is_night: bool) -> Self {
        if is_night {
            let moon = Vec3::new(0.2, 0.3, 0.4);
            Self {
                source: LightSource::Directional(Vec3::new(-20.0, 40.0, -20.0).normalize()),
                color: moon,
                specular: moon,
                ambient: Vec3::new(0.05, 0.05, 0.1),
                attenuation: [1.0, 0.0, 0.0],
                enabled: true,
            }
        } else {
            Self {
                specular: Vec3::new(1.0, 1.0, 1.0),
                ambient: Vec3::new(0.3, 0.3, 0.3),
                ..Self::point(Vec3::new(0.0, 50.0, 0.0), Vec3::new(1.0, 0.9, 0.8))
            }
        }
    }

    fn headlight(vehicle: &VehicleState, offset: [f32; 3]) -> Self {
        let body = vehicle.body_matrix();
        let position = (body * Vec3::from(offset).extend(1.0)).truncate();
        let direction = (body * Vec3::from(HEADLIGHT_AIM).extend(0.0)).truncate().normalize();
        Self {
            source: LightSource::Spot {
                position,
                direction,
                cos_cutoff: HEADLIGHT_CUTOFF_DEG.to_radians().cos(),
                exponent: HEADLIGHT_EXPONENT,
            },
            color: Vec3::new(1.0, 1.0, 0.8),
            specular: Vec3::zero(),
            ambient: Vec3::zero(),
            attenuation: [1.0, 0.002, 0.0],
            enabled: vehicle.headlights_on,
        }
    }

    /// 单个光源对一个片元的贡献（环境 + 漫反射 + 高光）
    pub fn contribution(
        &self,
        material: &Material,
        world_pos: Vec3<f32>,
        normal: Vec3<f32>,
        view_dir: Vec3<f32>,
    ) -> Vec3<f32> {
        if !self.enabled {
            return Vec3::zero();
        }

        let (to_light, distance) = match self.source {
            LightSource::Directional(dir) => (dir, 0.0),
            LightSource::Point(position) | LightSource::Spot { position, .. } => {
                let delta = position - world_pos;
                let distance = delta.magnitude();
                if distance < 1e-6 {
                    return Vec3::zero();
                }
                (delta / distance, distance)
            }
        };

        let [kc, kl, kq] = self.attenuation;
        let mut factor = 1.0 / (kc + kl * distance + kq * distance * distance);

        if let LightSource::Spot {
            direction,
            cos_cutoff,
            exponent,
            ..
        } = self.source
        {
            let cos_angle = (-to_light).dot(direction);
            if cos_angle < cos_cutoff {
                return Vec3::zero();
            }
            factor *= cos_angle.max(0.0).powf(exponent);
        }

        let ambient = self.ambient.mul_element_wise(material.color);

        let n_dot_l = normal.dot(to_light);
        let mut diffuse = Vec3::zero();
        let mut specular = Vec3::zero();
        if n_dot_l > 0.0 {
            diffuse = self.color.mul_element_wise(material.color) * n_dot_l;

            let half_dir = (to_light + view_dir).normalize();
            let spec = normal.dot(half_dir).max(0.0).powf(material.shininess);
            specular = self.specular.mul_element_wise(material.specular) * spec;
        }

        (ambient + diffuse + specular) * factor
    }
}

/// 一帧使用的全部光源：太阳/月亮、车库灯、两个车灯
#[derive(Debug, Clone)]
pub struct LightRig {
    pub global_ambient: f32,
    pub sun: Light,
    pub lamp: Light,
    pub headlights: [Light; 2],
}

impl LightRig {
    pub fn new(vehicle: &VehicleState, is_night: bool) -> Self {
        Self {
            global_ambient: GLOBAL_AMBIENT,
            sun: Light::sun(is_night),
            lamp: Light::point(Vec3::from(GARAGE_LAMP_POS), Vec3::new(0.4, 0.35, 0.25)),
            headlights: HEADLIGHT_OFFSETS.map(|offset| Light::headlight(vehicle, offset)),
        }
    }

    /// 暂时关闭两个车灯（绘制车库内墙前调用）
    pub fn suspend_headlights(&mut self) {
        for light in &mut self.headlights {
            light.enabled = false;
        }
    }

    /// 内墙画完之后恢复：只有车灯总开关打开时才重新点亮
    pub fn restore_headlights(&mut self, headlights_on: bool) {
        for light in &mut self.headlights {
            light.enabled = headlights_on;
        }
    }

    pub fn headlights_enabled(&self) -> bool {
        self.headlights.iter().any(|l| l.enabled)
    }

    /// 计算片元最终颜色（未乘纹理），各分量钳制在 [0,1]
    pub fn shade(
        &self,
        material: &Material,
        world_pos: Vec3<f32>,
        normal: Vec3<f32>,
        camera_pos: Vec3<f32>,
    ) -> Vec3<f32> {
        let view_dir = (camera_pos - world_pos).normalize();
        let mut color = material.emission + material.color * self.global_ambient;
        for light in [&self.sun, &self.lamp, &self.headlights[0], &self.headlights[1]] {
            color += light.contribution(material, world_pos, normal, view_dir);
        }
        Vec3::new(
            color.x.clamp(0.0, 1.0),
            color.y.clamp(0.0, 1.0),
            color.z.clamp(0.0, 1.0),
        )
    }
}

pub fn clear_color(is_night: bool) -> Vec3<f32> {
    Vec3::from(if is_night { NIGHT_SKY } else { DAY_SKY })
}
