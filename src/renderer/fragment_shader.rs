use cgmath::{ElementWise, InnerSpace, Vector2 as Vec2, Vector3 as Vec3};

use crate::lighting::LightRig;
use crate::material::Material;
use crate::texture::Texture;

#[derive(Debug, Clone, Copy)]
pub struct FragmentData {
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

// 定义 Shader 的通用行为
pub trait FragmentShader {
    // 输入插值后的片元数据，输出最终的颜色 (0.0 ~ 1.0 范围的 Vec3)
    fn shade(&self, data: FragmentData) -> Vec3<f32>;
}

/// 逐片元 Blinn-Phong：光源来自 LightRig，纹理颜色与光照结果相乘
pub struct LitShader<'a> {
    pub lights: &'a LightRig,
    pub material: Material,
    pub texture: Option<&'a Texture>,
    pub camera_pos: Vec3<f32>,
    /// 不剔除背面的物体从背面看时翻转法线
    pub two_sided: bool,
}

impl FragmentShader for LitShader<'_> {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        let mut normal = if data.normal.magnitude2() > 0.0 {
            data.normal.normalize()
        } else {
            Vec3::unit_y()
        };
        if self.two_sided && normal.dot(self.camera_pos - data.world_pos) < 0.0 {
            normal = -normal;
        }

        let lit = self
            .lights
            .shade(&self.material, data.world_pos, normal, self.camera_pos);

        match self.texture {
            Some(tex) => lit.mul_element_wise(tex.sample(data.uv)),
            None => lit,
        }
    }
}
