use crate::vertex::RasterPoint;
use cgmath::{Vector2 as Vec2, Vector3 as Vec3};

/// 有向面积的两倍：p 在 a->b 左侧时为正
fn edge_function(a: Vec2<f32>, b: Vec2<f32>, p: Vec2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// 屏幕空间重心坐标，依次对应三个顶点的权重。
/// 两种绕序都适用：在三角形内部时三个权重都非负。
pub fn get_barycentric_coords(
    vertices: &[Vec2<f32>; 3],
    p: &Vec2<f32>,
) -> Option<(f32, f32, f32)> {
    let area = edge_function(vertices[0], vertices[1], vertices[2]);
    if area.abs() < 1e-8 {
        return None; // 三角形面积为零，无法计算重心坐标
    }

    let w0 = edge_function(vertices[1], vertices[2], *p) / area;
    let w1 = edge_function(vertices[2], vertices[0], *p) / area;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

pub fn is_inside_triangle(bary: (f32, f32, f32)) -> bool {
    let (w0, w1, w2) = bary;
    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
}

/// 屏幕空间权重换算成透视校正权重（除以 w 后再归一化）
pub fn perspective_weights(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> (f32, f32, f32) {
    let (b0, b1, b2) = bary;
    let w0 = b0 * points[0].inv_w;
    let w1 = b1 * points[1].inv_w;
    let w2 = b2 * points[2].inv_w;
    let sum = w0 + w1 + w2;
    if sum.abs() < f32::EPSILON {
        return bary;
    }
    (w0 / sum, w1 / sum, w2 / sum)
}

/// 深度在屏幕空间里本来就是线性的，直接用屏幕权重
pub fn interpolate_depth(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> f32 {
    let (b0, b1, b2) = bary;
    points[0].z * b0 + points[1].z * b1 + points[2].z * b2
}

pub fn interpolate_vec3(values: [Vec3<f32>; 3], weights: (f32, f32, f32)) -> Vec3<f32> {
    let (w0, w1, w2) = weights;
    values[0] * w0 + values[1] * w1 + values[2] * w2
}

pub fn interpolate_uv(points: &[RasterPoint; 3], weights: (f32, f32, f32)) -> Vec2<f32> {
    let (w0, w1, w2) = weights;
    points[0].uv * w0 + points[1].uv * w1 + points[2].uv * w2
}

/// 像素包围盒，已裁到 [0, width) x [0, height)。完全在屏幕外时返回 None
pub fn get_box(vertices: &[Vec2<f32>; 3], width: usize, height: usize) -> Option<(i32, i32, i32, i32)> {
    let mut min_x = vertices[0].x;
    let mut max_x = vertices[0].x;
    let mut min_y = vertices[0].y;
    let mut max_y = vertices[0].y;

    for v in vertices.iter().skip(1) {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }

    let min_x = (min_x.floor() as i32).max(0);
    let min_y = (min_y.floor() as i32).max(0);
    let max_x = (max_x.ceil() as i32).min(width as i32 - 1);
    let max_y = (max_y.ceil() as i32).min(height as i32 - 1);

    if min_x > max_x || min_y > max_y {
        return None;
    }
    Some((min_x, min_y, max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(x: f32, y: f32, inv_w: f32, u: f32) -> RasterPoint {
        RasterPoint {
            pos: Vec2::new(x, y),
            z: 0.5,
            inv_w,
            world_pos: Vec3::new(0.0, 0.0, 0.0),
            normal: Vec3::unit_y(),
            uv: Vec2::new(u, 0.0),
        }
    }

    #[test]
    fn barycentric_weights_match_vertices() {
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let at_v1 = get_barycentric_coords(&tri, &Vec2::new(10.0, 0.0)).unwrap();
        assert_relative_eq!(at_v1.1, 1.0);
        let center = get_barycentric_coords(&tri, &Vec2::new(10.0 / 3.0, 10.0 / 3.0)).unwrap();
        assert_relative_eq!(center.0, 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(center.2, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn inside_test_ignores_winding() {
        let ccw = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let cw = [ccw[0], ccw[2], ccw[1]];
        let p = Vec2::new(2.0, 2.0);
        assert!(is_inside_triangle(get_barycentric_coords(&ccw, &p).unwrap()));
        assert!(is_inside_triangle(get_barycentric_coords(&cw, &p).unwrap()));
        let outside = Vec2::new(8.0, 8.0);
        assert!(!is_inside_triangle(get_barycentric_coords(&ccw, &outside).unwrap()));
    }

    #[test]
    fn degenerate_triangle_has_no_coords() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert!(get_barycentric_coords(&line, &Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn perspective_correction_pulls_towards_near_vertex() {
        // v0 很近（w=1），v1 很远（w=10），屏幕中点在透视下更靠近近端
        let pts = [point(0.0, 0.0, 1.0, 0.0), point(10.0, 0.0, 0.1, 1.0), point(0.0, 10.0, 1.0, 0.0)];
        let screen = (0.5, 0.5, 0.0);
        let corrected = perspective_weights(&pts, screen);
        let uv = interpolate_uv(&pts, corrected);
        assert!(uv.x < 0.5);
        assert_relative_eq!(corrected.0 + corrected.1 + corrected.2, 1.0, epsilon = 1e-6);
        assert_relative_eq!(interpolate_depth(&pts, screen), 0.5);
    }

    #[test]
    fn box_is_clamped_to_viewport() {
        let tri = [Vec2::new(-5.0, -5.0), Vec2::new(50.0, 2.0), Vec2::new(3.0, 70.0)];
        assert_eq!(get_box(&tri, 20, 30), Some((0, 0, 19, 29)));

        let off = [Vec2::new(-9.0, -9.0), Vec2::new(-5.0, -9.0), Vec2::new(-9.0, -5.0)];
        assert_eq!(get_box(&off, 20, 30), None);
    }
}
