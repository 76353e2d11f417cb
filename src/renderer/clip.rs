use crate::vertex::ClipSpaceVertex;

pub trait Clipper {
    // 接收一个裁剪空间的三角形
    // 返回一个 Vec，其中包含裁剪后产生的零个、一个或多个三角形
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]>;
}

/// 近平面裁剪器。
///
/// 近平面 (z >= -w) 用 Sutherland-Hodgman 真正切割，切出的多边形再按扇形拆回三角形；
/// 其余五个平面只做整体剔除，部分越界的三角形交给光栅化阶段的包围盒裁剪。
pub struct NearPlaneClipper;

impl NearPlaneClipper {
    /// 三个顶点都在同一个平面外侧就整体丢弃
    fn outside_any_plane(triangle: &[ClipSpaceVertex; 3]) -> bool {
        let planes: [fn(&ClipSpaceVertex) -> bool; 5] = [
            |v| v.position.x < -v.position.w,
            |v| v.position.x > v.position.w,
            |v| v.position.y < -v.position.w,
            |v| v.position.y > v.position.w,
            |v| v.position.z > v.position.w,
        ];
        planes.iter().any(|outside| triangle.iter().all(outside))
    }

    /// 到近平面的有符号距离，非负表示在内侧
    fn near_distance(v: &ClipSpaceVertex) -> f32 {
        v.position.z + v.position.w
    }
}

impl Clipper for NearPlaneClipper {
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]> {
        if Self::outside_any_plane(triangle) {
            return vec![];
        }

        let distances = triangle.map(|v| Self::near_distance(&v));
        if distances.iter().all(|&d| d >= 0.0) {
            return vec![*triangle];
        }
        if distances.iter().all(|&d| d < 0.0) {
            return vec![];
        }

        let mut polygon = Vec::with_capacity(4);
        for i in 0..3 {
            let j = (i + 1) % 3;
            let (current, next) = (&triangle[i], &triangle[j]);
            let (d_current, d_next) = (distances[i], distances[j]);

            if d_current >= 0.0 {
                polygon.push(*current);
            }
            // 边跨过近平面时插入交点
            if (d_current >= 0.0) != (d_next >= 0.0) {
                let t = d_current / (d_current - d_next);
                let mut hit = current.lerp(next, t);
                // 浮点误差可能让交点略微落在外侧
                hit.position.z = hit.position.z.max(-hit.position.w);
                polygon.push(hit);
            }
        }

        (1..polygon.len().saturating_sub(1))
            .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
            .collect()
    }
}
