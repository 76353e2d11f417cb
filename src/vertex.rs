use cgmath::{InnerSpace, Matrix4 as Mat4, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4, Zero};

/// 模型空间顶点
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

impl Vertex {
    pub fn new(pos: Vec3<f32>, normal: Vec3<f32>, uv: Vec2<f32>) -> Self {
        Self { pos, normal, uv }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            pos: Vec3::zero(),
            normal: Vec3::new(0.0, 1.0, 0.0),
            uv: Vec2::zero(),
        }
    }
}

/// 顶点着色之后、透视除法之前的顶点
#[derive(Debug, Clone, Copy)]
pub struct ClipSpaceVertex {
    pub position: Vec4<f32>,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

impl ClipSpaceVertex {
    /// 裁剪时在两个顶点之间线性插值（裁剪空间里插值是正确的）
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            world_pos: self.world_pos + (other.world_pos - self.world_pos) * t,
            normal: self.normal + (other.normal - self.normal) * t,
            uv: self.uv + (other.uv - self.uv) * t,
        }
    }
}

/// 光栅化阶段的屏幕空间点
#[derive(Debug, Clone, Copy)]
pub struct RasterPoint {
    pub pos: Vec2<f32>,
    /// 深度，范围 [0, 1]
    pub z: f32,
    /// 1/w，用于透视校正插值
    pub inv_w: f32,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterTriangle {
    pub vertices: [RasterPoint; 3],
}

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub normal: Vec3<f32>,
}

impl Triangle {
    fn compute_normal(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> Vec3<f32> {
        let edge1 = v1.pos - v0.pos;
        let edge2 = v2.pos - v0.pos;
        let n = edge1.cross(edge2);
        if n.magnitude2() > 0.0 { n.normalize() } else { Vec3::zero() }
    }

    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        let normal = Self::compute_normal(&v0, &v1, &v2);
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }

    #[cfg(test)]
    pub fn get_center(&self) -> Vec3<f32> {
        (self.vertices[0].pos + self.vertices[1].pos + self.vertices[2].pos) / 3.0
    }

    pub fn is_backface_world_space(&self, camera_pos: Vec3<f32>, model_matrix: &Mat4<f32>) -> bool {
        // 将三角形变换到世界空间
        let world_vertices = [
            (*model_matrix * self.vertices[0].pos.extend(1.0)).truncate(),
            (*model_matrix * self.vertices[1].pos.extend(1.0)).truncate(),
            (*model_matrix * self.vertices[2].pos.extend(1.0)).truncate(),
        ];

        // 世界空间法线
        let edge1 = world_vertices[1] - world_vertices[0];
        let edge2 = world_vertices[2] - world_vertices[0];
        let world_normal = edge1.cross(edge2);

        // 视线方向（从三角形指向相机）
        let view_dir = camera_pos - world_vertices[0];

        world_normal.dot(view_dir) <= 0.0
    }
}
