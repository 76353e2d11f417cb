use crate::vertex::{ClipSpaceVertex, Triangle};
use cgmath::{InnerSpace, Matrix4 as Mat4};

pub struct VertexShaderUniforms<'a> {
    pub model_matrix: &'a Mat4<f32>,
    pub mvp_matrix: &'a Mat4<f32>,
    pub normal_matrix: &'a Mat4<f32>,
}

pub trait VertexShader {
    // 接收一个模型空间的三角形和uniforms
    // 返回一个裁剪空间的三角形
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3];
}

pub struct DefaultVertexShader;

impl VertexShader for DefaultVertexShader {
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3] {
        triangle.vertices.map(|v| {
            let normal = (*uniforms.normal_matrix * v.normal.extend(0.0)).truncate();
            ClipSpaceVertex {
                position: *uniforms.mvp_matrix * v.pos.extend(1.0),
                world_pos: (*uniforms.model_matrix * v.pos.extend(1.0)).truncate(),
                // 缩放为 0 的轴会让法线退化，保留原值
                normal: if normal.magnitude2() > 0.0 { normal.normalize() } else { v.normal },
                uv: v.uv,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Vertex;
    use approx::assert_relative_eq;
    use cgmath::{Matrix, SquareMatrix, Vector2 as Vec2, Vector3 as Vec3};

    #[test]
    fn normals_survive_non_uniform_scale() {
        let model = Mat4::from_nonuniform_scale(4.0, 1.0, 1.0);
        let normal_matrix = model.invert().map(|m| m.transpose()).unwrap_or(model);
        let mvp = Mat4::identity();
        let uniforms = VertexShaderUniforms {
            model_matrix: &model,
            mvp_matrix: &mvp,
            normal_matrix: &normal_matrix,
        };

        // 斜面法线 (1,1,0)，x 方向拉长后应更接近 +y
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let v = |x: f32, y: f32, z: f32| Vertex::new(Vec3::new(x, y, z), n, Vec2::new(0.0, 0.0));
        let tri = Triangle::new(v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 1.0, 1.0));
        let out = DefaultVertexShader.shade_triangle(&tri, &uniforms);

        assert_relative_eq!(out[0].normal.magnitude(), 1.0, epsilon = 1e-6);
        assert!(out[0].normal.y > out[0].normal.x);
        assert_relative_eq!(out[0].world_pos.x, 4.0);
    }
}
