use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3, Zero};
use std::f32::consts::{PI, TAU};

use crate::vertex::{Triangle, Vertex};

/// 一组三角形。所有几何体都在代码里程序化生成，不读取外部模型文件。
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

fn v(pos: Vec3<f32>, normal: Vec3<f32>) -> Vertex {
    Vertex::new(pos, normal, Vec2::zero())
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// 按顶点法线调整绕序：几何法线与顶点法线同向时为正面。退化三角形直接丢弃。
    pub fn push_triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) {
        let tri = Triangle::new(v0, v1, v2);
        if tri.normal == Vec3::zero() {
            return;
        }
        let shading = v0.normal + v1.normal + v2.normal;
        if tri.normal.dot(shading) < 0.0 {
            self.triangles.push(Triangle::new(v0, v2, v1));
        } else {
            self.triangles.push(tri);
        }
    }

    pub fn push_quad(&mut self, corners: [Vertex; 4]) {
        let [a, b, c, d] = corners;
        self.push_triangle(a, b, c);
        self.push_triangle(a, c, d);
    }

    /// 凸多边形，扇形三角化
    pub fn push_polygon(&mut self, points: &[Vertex]) {
        for i in 1..points.len().saturating_sub(1) {
            self.push_triangle(points[0], points[i], points[i + 1]);
        }
    }

    /// 平面四边形，四个顶点共用一个法线
    pub fn push_flat_quad(&mut self, normal: Vec3<f32>, corners: [Vec3<f32>; 4]) {
        let n = normal.normalize();
        self.push_quad(corners.map(|p| v(p, n)));
    }

    pub fn push_textured_quad(&mut self, normal: Vec3<f32>, corners: [Vec3<f32>; 4], uvs: [[f32; 2]; 4]) {
        let n = normal.normalize();
        let mut quad = [Vertex::default(); 4];
        for (i, vertex) in quad.iter_mut().enumerate() {
            *vertex = Vertex::new(corners[i], n, Vec2::from(uvs[i]));
        }
        self.push_quad(quad);
    }

    /// 两列顶点之间的条带，对应固定管线里的 QUAD_STRIP
    pub fn push_strip(&mut self, left: &[Vertex], right: &[Vertex]) {
        for i in 0..left.len().min(right.len()).saturating_sub(1) {
            self.push_quad([left[i], right[i], right[i + 1], left[i + 1]]);
        }
    }

    pub fn append(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    /// 以原点为中心、边长为 1 的立方体
    pub fn cube() -> Self {
        let axes = [
            (Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()),
            (-Vec3::unit_x(), Vec3::unit_z(), Vec3::unit_y()),
            (Vec3::unit_y(), Vec3::unit_z(), Vec3::unit_x()),
            (-Vec3::unit_y(), Vec3::unit_x(), Vec3::unit_z()),
            (Vec3::unit_z(), Vec3::unit_x(), Vec3::unit_y()),
            (-Vec3::unit_z(), Vec3::unit_y(), Vec3::unit_x()),
        ];
        let mut mesh = Mesh::new();
        for (n, a, b) in axes {
            let c = n * 0.5;
            let (a, b) = (a * 0.5, b * 0.5);
            let uv = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
            let corners = [c - a - b, c + a - b, c + a + b, c - a + b];
            let mut quad = [Vertex::default(); 4];
            for i in 0..4 {
                quad[i] = Vertex::new(corners[i], n, Vec2::new(uv[i].0, uv[i].1));
            }
            mesh.push_quad(quad);
        }
        mesh
    }

    /// 单位球，y 轴为极轴
    pub fn sphere(slices: usize, stacks: usize) -> Self {
        let point = |i: usize, j: usize| {
            let phi = PI * i as f32 / stacks as f32;
            let theta = TAU * j as f32 / slices as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            v(n, n)
        };
        let mut mesh = Mesh::new();
        for i in 0..stacks {
            for j in 0..slices {
                mesh.push_quad([point(i, j), point(i + 1, j), point(i + 1, j + 1), point(i, j + 1)]);
            }
        }
        mesh
    }

    /// 圆锥：底面圆心在原点，尖端在 +z
    pub fn cone(radius: f32, height: f32, slices: usize) -> Self {
        let mut mesh = Mesh::new();
        let apex = Vec3::new(0.0, 0.0, height);
        let slant = |theta: f32| Vec3::new(theta.cos() * height, theta.sin() * height, radius).normalize();
        let rim = |theta: f32| Vec3::new(theta.cos() * radius, theta.sin() * radius, 0.0);
        let mut base = Vec::with_capacity(slices);
        for j in 0..slices {
            let t0 = TAU * j as f32 / slices as f32;
            let t1 = TAU * (j + 1) as f32 / slices as f32;
            let mid = slant((t0 + t1) * 0.5);
            mesh.push_triangle(v(rim(t0), slant(t0)), v(rim(t1), slant(t1)), v(apex, mid));
            base.push(v(rim(t0), -Vec3::unit_z()));
        }
        mesh.push_polygon(&base);
        mesh
    }

    /// 圆柱：沿 +z 从 0 延伸到 length，两端封口
    pub fn cylinder(radius: f32, length: f32, slices: usize) -> Self {
        let mut mesh = Mesh::new();
        let mut near_cap = Vec::with_capacity(slices);
        let mut far_cap = Vec::with_capacity(slices);
        for j in 0..slices {
            let t0 = TAU * j as f32 / slices as f32;
            let t1 = TAU * (j + 1) as f32 / slices as f32;
            let n0 = Vec3::new(t0.cos(), t0.sin(), 0.0);
            let n1 = Vec3::new(t1.cos(), t1.sin(), 0.0);
            let p0 = n0 * radius;
            let p1 = n1 * radius;
            let lift = Vec3::new(0.0, 0.0, length);
            mesh.push_quad([v(p0, n0), v(p1, n1), v(p1 + lift, n1), v(p0 + lift, n0)]);
            near_cap.push(v(p0, -Vec3::unit_z()));
            far_cap.push(v(p0 + lift, Vec3::unit_z()));
        }
        mesh.push_polygon(&near_cap);
        mesh.push_polygon(&far_cap);
        mesh
    }

    /// 圆环，位于 XY 平面，绕 z 轴
    pub fn torus(inner_radius: f32, outer_radius: f32, sides: usize, rings: usize) -> Self {
        let point = |i: usize, j: usize| {
            let theta = TAU * i as f32 / rings as f32;
            let phi = TAU * j as f32 / sides as f32;
            let r = outer_radius + inner_radius * phi.cos();
            let pos = Vec3::new(r * theta.cos(), r * theta.sin(), inner_radius * phi.sin());
            let n = Vec3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());
            v(pos, n)
        };
        let mut mesh = Mesh::new();
        for i in 0..rings {
            for j in 0..sides {
                mesh.push_quad([point(i, j), point(i + 1, j), point(i + 1, j + 1), point(i, j + 1)]);
            }
        }
        mesh
    }

    /// 正十二面体，外接球半径 sqrt(3)。由正二十面体取对偶得到：
    /// 二十面体每个面的中心是十二面体的一个顶点，每个顶点对应十二面体的一个五边形面。
    pub fn dodecahedron() -> Self {
        let phi = (1.0 + 5.0f32.sqrt()) / 2.0;
        let mut ico = Vec::with_capacity(12);
        for a in [-1.0, 1.0] {
            for b in [-phi, phi] {
                ico.push(Vec3::new(0.0, a, b));
                ico.push(Vec3::new(a, b, 0.0));
                ico.push(Vec3::new(b, 0.0, a));
            }
        }

        // 棱长为 2 的三个顶点构成一个面
        let is_edge = |p: Vec3<f32>, q: Vec3<f32>| ((p - q).magnitude() - 2.0).abs() < 1e-3;
        let mut faces = Vec::new();
        for i in 0..ico.len() {
            for j in i + 1..ico.len() {
                for k in j + 1..ico.len() {
                    if is_edge(ico[i], ico[j]) && is_edge(ico[j], ico[k]) && is_edge(ico[i], ico[k]) {
                        faces.push([i, j, k]);
                    }
                }
            }
        }

        let radius = 3.0f32.sqrt();
        let mut mesh = Mesh::new();
        for (index, axis) in ico.iter().enumerate() {
            let n = axis.normalize();
            let mut ring: Vec<Vec3<f32>> = faces
                .iter()
                .filter(|f| f.contains(&index))
                .map(|f| ((ico[f[0]] + ico[f[1]] + ico[f[2]]) / 3.0).normalize() * radius)
                .collect();

            // 绕法线按角度排序，得到凸五边形
            let tangent = (ring[0] - n * ring[0].dot(n)).normalize();
            let bitangent = n.cross(tangent);
            ring.sort_by(|a, b| {
                let angle = |p: &Vec3<f32>| p.dot(bitangent).atan2(p.dot(tangent));
                angle(a).total_cmp(&angle(b))
            });
            let polygon: Vec<Vertex> = ring.into_iter().map(|p| v(p, n)).collect();
            mesh.push_polygon(&polygon);
        }
        mesh
    }

    /// 三棱柱：截面是底边 [-0.5, 0.5]、顶点在 (0, 1) 的三角形，沿 z 从 -0.5 到 0.5
    pub fn prism() -> Self {
        let mut mesh = Mesh::new();
        let profile = [Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let front = Vec3::new(0.0, 0.0, 0.5);
        let back = -front;
        mesh.push_polygon(&profile.map(|p| v(p + front, Vec3::unit_z())));
        mesh.push_polygon(&profile.map(|p| v(p + back, -Vec3::unit_z())));
        for i in 0..3 {
            let (a, b) = (profile[i], profile[(i + 1) % 3]);
            let edge = b - a;
            let n = Vec3::new(edge.y, -edge.x, 0.0).normalize();
            mesh.push_flat_quad(n, [a + back, b + back, b + front, a + front]);
        }
        mesh
    }

    /// 平铺地面，uv 随世界坐标增长，每 uv_period 个单位重复一次纹理
    pub fn floor(half_size: f32, steps: usize, uv_period: f32) -> Self {
        let mut mesh = Mesh::new();
        let step = half_size * 2.0 / steps as f32;
        let up = Vec3::unit_y();
        let corner = |x: f32, z: f32| Vertex::new(Vec3::new(x, 0.0, z), up, Vec2::new(x / uv_period, z / uv_period));
        for i in 0..steps {
            for j in 0..steps {
                let x1 = -half_size + i as f32 * step;
                let z1 = -half_size + j as f32 * step;
                let (x2, z2) = (x1 + step, z1 + step);
                mesh.push_quad([corner(x1, z1), corner(x1, z2), corner(x2, z2), corner(x2, z1)]);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 闭合网格每个三角形的几何法线都应朝外
    fn assert_outward(mesh: &Mesh) {
        for tri in &mesh.triangles {
            let center = tri.get_center();
            assert!(tri.normal.dot(center) > 0.0, "inward face at {:?}", center);
        }
    }

    #[test]
    fn cube_has_twelve_outward_triangles() {
        let cube = Mesh::cube();
        assert_eq!(cube.len(), 12);
        assert_outward(&cube);
    }

    #[test]
    fn sphere_is_closed_and_outward() {
        let sphere = Mesh::sphere(12, 8);
        assert!(!sphere.is_empty());
        assert_outward(&sphere);
        for tri in &sphere.triangles {
            for vert in &tri.vertices {
                assert_relative_eq!(vert.pos.magnitude(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn dodecahedron_has_twelve_pentagons() {
        let d = Mesh::dodecahedron();
        // 每个五边形 3 个三角形
        assert_eq!(d.len(), 36);
        assert_outward(&d);
        for tri in &d.triangles {
            assert_relative_eq!(tri.vertices[0].pos.magnitude(), 3.0f32.sqrt(), epsilon = 1e-4);
        }
    }

    #[test]
    fn floor_faces_up_and_repeats_uv() {
        let floor = Mesh::floor(10.0, 4, 2.0);
        assert_eq!(floor.len(), 32);
        assert!(floor.triangles.iter().all(|t| t.normal.y > 0.99));
        let corner = floor.triangles[0].vertices[0];
        assert_eq!(corner.uv, Vec2::new(-5.0, -5.0));
    }

    #[test]
    fn cylinder_caps_point_along_axis() {
        let cyl = Mesh::cylinder(0.5, 2.0, 8);
        assert_eq!(cyl.len(), 8 * 2 + 6 * 2);
        let far_cap = cyl.triangles.iter().filter(|t| t.normal.z > 0.99).count();
        assert_eq!(far_cap, 6);
    }

    #[test]
    fn prism_is_closed_and_outward() {
        let prism = Mesh::prism();
        assert_eq!(prism.len(), 2 + 6);
        for tri in &prism.triangles {
            let c = tri.get_center() - Vec3::new(0.0, 1.0 / 3.0, 0.0);
            assert!(tri.normal.dot(c) > 0.0);
        }
    }

    #[test]
    fn torus_lies_in_xy_plane() {
        let torus = Mesh::torus(0.04, 0.25, 6, 12);
        for tri in &torus.triangles {
            for vert in &tri.vertices {
                assert!(vert.pos.z.abs() <= 0.04 + 1e-6);
            }
        }
    }
}
