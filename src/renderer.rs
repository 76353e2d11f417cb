pub mod clip;
pub mod fragment_shader;
pub mod vertex_shader;

use crate::camera::Camera;
use crate::framebuffer::{FrameBuffer, pack_color};
use crate::lighting::LightRig;
use crate::rasterizer;
use crate::scene::{DrawItem, LightGroup};
use crate::texture::TextureSet;
use crate::vertex::{ClipSpaceVertex, RasterPoint, RasterTriangle};
use cgmath::{InnerSpace, Matrix, SquareMatrix, Vector2 as Vec2};
use tracing::trace;

use self::clip::{Clipper, NearPlaneClipper};
use self::fragment_shader::{FragmentData, FragmentShader, LitShader};
use self::vertex_shader::{DefaultVertexShader, VertexShader, VertexShaderUniforms};

pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// 一帧的光照状态：光源、车灯总开关，以及车灯能否照进车库内部
pub struct FrameLighting {
    pub rig: LightRig,
    pub headlights_on: bool,
    pub interior_lit: bool,
}

pub struct Renderer {
    pub(crate) camera: Camera,
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) viewport: Viewport,
}

impl Renderer {
    pub fn new(camera: Camera, w: usize, h: usize) -> Self {
        let framebuffer = FrameBuffer::new(w, h);
        Self {
            camera,
            framebuffer,
            viewport: Viewport {
                x: 0,
                y: 0,
                w: w as i32,
                h: h as i32,
            },
        }
    }

    /// 先画不透明物体（写深度），再从远到近画半透明物体（混合、不写深度）
    pub fn render_frame(&mut self, items: &[DrawItem], lighting: &mut FrameLighting, textures: &TextureSet) {
        let (opaque, mut translucent): (Vec<&DrawItem>, Vec<&DrawItem>) =
            items.iter().partition(|item| !item.material.material().is_translucent());

        let eye = self.camera.eye;
        let distance = |item: &&DrawItem| (item.transform.w.truncate() - eye).magnitude2();
        translucent.sort_by(|a, b| distance(b).total_cmp(&distance(a)));

        trace!(
            opaque = opaque.len(),
            translucent = translucent.len(),
            triangles = items.iter().map(|item| item.mesh.len()).sum::<usize>(),
            "render frame"
        );

        for item in opaque.into_iter().chain(translucent) {
            // 车不在车库里、门又没开够时，内墙绘制期间关掉车灯
            let shielded = item.group == LightGroup::GarageInterior && !lighting.interior_lit;
            if shielded {
                lighting.rig.suspend_headlights();
            }
            self.render_item(item, &lighting.rig, textures);
            if shielded {
                lighting.rig.restore_headlights(lighting.headlights_on);
            }
        }
    }

    //完整渲染管线
    pub fn render_item(&mut self, item: &DrawItem, lights: &LightRig, textures: &TextureSet) {
        if item.mesh.is_empty() {
            return;
        }
        let model = item.transform;
        // 不可逆（某个轴缩放为 0）的物体看不见
        let Some(normal_matrix) = model.invert().map(|m| m.transpose()) else {
            return;
        };
        let mvp_matrix = self.camera.get_view_proj_mat() * model;

        let vertex_shader = DefaultVertexShader;
        let clipper = NearPlaneClipper;
        let material = item.material.material();
        let fragment_shader = LitShader {
            lights,
            material,
            texture: item.texture.map(|id| textures.get(id)),
            camera_pos: self.camera.eye,
            two_sided: !item.cull,
        };

        let uniforms = VertexShaderUniforms {
            model_matrix: &model,
            mvp_matrix: &mvp_matrix,
            normal_matrix: &normal_matrix,
        };

        for triangle in &item.mesh.triangles {
            //管线阶段 1: 背面剔除
            if item.cull && triangle.is_backface_world_space(self.camera.eye, &model) {
                continue;
            }

            //管线阶段 2: 顶点着色
            let clip_space_triangle = vertex_shader.shade_triangle(triangle, &uniforms);

            //管线阶段 3: 裁剪
            for clipped in clipper.clip_triangle(&clip_space_triangle) {
                // 阶段 4: 屏幕映射
                let raster_triangle = self.viewport_transform(&clipped);

                // 阶段 5: 光栅化和像素着色
                self.rasterize_triangle(&raster_triangle, &fragment_shader, material.alpha);
            }
        }
    }

    //视口变换
    fn viewport_transform(&self, clip_triangle: &[ClipSpaceVertex; 3]) -> RasterTriangle {
        let raster_vertices = clip_triangle.map(|clip_v| {
            let inv_w = 1.0 / clip_v.position.w;
            // 透视除法
            let ndc_pos = clip_v.position * inv_w;

            // 转换到屏幕空间
            let screen_x = (ndc_pos.x + 1.0) * 0.5 * self.viewport.w as f32 + self.viewport.x as f32;
            let screen_y = self.viewport.h as f32 - (ndc_pos.y + 1.0) * 0.5 * self.viewport.h as f32
                + self.viewport.y as f32;

            RasterPoint {
                pos: Vec2::new(screen_x, screen_y),
                z: (ndc_pos.z + 1.0) * 0.5,
                inv_w,
                world_pos: clip_v.world_pos,
                normal: clip_v.normal,
                uv: clip_v.uv,
            }
        });

        RasterTriangle {
            vertices: raster_vertices,
        }
    }

    // 进行光栅化；alpha 小于 1 时走混合写入
    pub fn rasterize_triangle(&mut self, triangle: &RasterTriangle, shader: &dyn FragmentShader, alpha: f32) {
        let points = &triangle.vertices;
        let screen = [points[0].pos, points[1].pos, points[2].pos];
        let Some((min_x, min_y, max_x, max_y)) =
            rasterizer::get_box(&screen, self.framebuffer.width, self.framebuffer.height)
        else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = rasterizer::get_barycentric_coords(&screen, &p) else {
                    return;
                };
                if !rasterizer::is_inside_triangle(bary) {
                    continue;
                }

                let depth = rasterizer::interpolate_depth(points, bary);
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let idx = y as usize * self.framebuffer.width + x as usize;
                if depth >= self.framebuffer.depth[idx] {
                    continue;
                }

                // 插值所有属性
                let weights = rasterizer::perspective_weights(points, bary);
                let fragment_data = FragmentData {
                    world_pos: rasterizer::interpolate_vec3(points.map(|v| v.world_pos), weights),
                    normal: rasterizer::interpolate_vec3(points.map(|v| v.normal), weights),
                    uv: rasterizer::interpolate_uv(points, weights),
                };

                let color = shader.shade(fragment_data);

                if alpha < 1.0 {
                    self.framebuffer
                        .blend_pixel(x as usize, y as usize, color, alpha, depth);
                } else {
                    self.framebuffer
                        .put_pixel(x as usize, y as usize, pack_color(color), depth);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FAR_PLANE, NEAR_PLANE};
    use crate::framebuffer::unpack_color;
    use crate::material::MaterialKind;
    use crate::mesh::Mesh;
    use crate::vehicle::VehicleState;
    use cgmath::{Deg, Matrix4 as Mat4, Vector3 as Vec3};
    use std::rc::Rc;

    const W: usize = 64;
    const H: usize = 48;

    fn renderer_looking_at(eye: Vec3<f32>, at: Vec3<f32>) -> Renderer {
        let mut camera = Camera::new(NEAR_PLANE, FAR_PLANE, W as f32 / H as f32, Deg(45.0).into());
        camera.look_at(eye, at);
        let mut renderer = Renderer::new(camera, W, H);
        renderer.framebuffer.clear(0xFF000000);
        renderer
    }

    fn lit_car_at(z: f32) -> VehicleState {
        let mut car = VehicleState::default();
        car.position = Vec3::new(0.0, 0.0, z);
        car.headlights_on = true;
        car
    }

    /// 一面朝 +z 的墙，正对车头
    fn wall(group: LightGroup) -> DrawItem {
        let mut item = DrawItem::new(
            Rc::new(Mesh::cube()),
            Mat4::from_translation(Vec3::new(0.0, 1.0, -8.0)) * Mat4::from_nonuniform_scale(6.0, 2.0, 0.1),
            MaterialKind::GarageInnerWall,
        );
        item.group = group;
        item
    }

    fn center_brightness(renderer: &Renderer) -> f32 {
        let c = unpack_color(renderer.framebuffer.pixel(W / 2, H / 2).unwrap_or(0));
        c.x + c.y + c.z
    }

    fn render_wall(group: LightGroup, interior_lit: bool) -> f32 {
        let car = lit_car_at(0.0);
        let mut renderer = renderer_looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -8.0));
        let mut lighting = FrameLighting {
            rig: LightRig::new(&car, true),
            headlights_on: car.headlights_on,
            interior_lit,
        };
        renderer.render_frame(&[wall(group)], &mut lighting, &TextureSet::generate(1));
        assert!(lighting.rig.headlights_enabled(), "switch restored after the frame");
        center_brightness(&renderer)
    }

    #[test]
    fn cube_in_front_of_camera_is_drawn() {
        let mut renderer = renderer_looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 0.0));
        let item = DrawItem::new(Rc::new(Mesh::cube()), Mat4::from_scale(2.0), MaterialKind::CarPaint);
        renderer.render_item(&item, &LightRig::new(&VehicleState::default(), false), &TextureSet::generate(1));
        assert_ne!(renderer.framebuffer.pixel(W / 2, H / 2), Some(0xFF000000));
        assert_eq!(renderer.framebuffer.pixel(0, 0), Some(0xFF000000));
        assert!(renderer.framebuffer.depth[H / 2 * W + W / 2] < 1.0);
    }

    #[test]
    fn geometry_crossing_the_near_plane_still_renders() {
        // 相机站在一个大地面上，地面有一部分在相机背后
        let mut renderer = renderer_looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -10.0));
        let floor = DrawItem::new(Rc::new(Mesh::floor(50.0, 1, 2.0)), Mat4::from_scale(1.0), MaterialKind::Stone);
        renderer.render_item(&floor, &LightRig::new(&VehicleState::default(), false), &TextureSet::generate(1));
        assert_ne!(renderer.framebuffer.pixel(W / 2, H - 2), Some(0xFF000000));
    }

    #[test]
    fn shielded_interior_wall_ignores_headlights() {
        let exterior = render_wall(LightGroup::Full, false);
        let shielded = render_wall(LightGroup::GarageInterior, false);
        let admitted = render_wall(LightGroup::GarageInterior, true);
        assert!(exterior > shielded + 0.05);
        assert!((exterior - admitted).abs() < 1e-6);
    }

    #[test]
    fn glass_blends_over_what_is_behind() {
        let mut renderer = renderer_looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 0.0));
        renderer.framebuffer.clear(pack_color(Vec3::new(0.0, 0.0, 0.0)));
        let glass = DrawItem::new(Rc::new(Mesh::cube()), Mat4::from_scale(2.0), MaterialKind::Glass);
        let mut lighting = FrameLighting {
            rig: LightRig::new(&VehicleState::default(), false),
            headlights_on: false,
            interior_lit: false,
        };
        renderer.render_frame(&[glass], &mut lighting, &TextureSet::generate(1));
        let c = unpack_color(renderer.framebuffer.pixel(W / 2, H / 2).unwrap_or(0));
        assert!(c.z > 0.0 && c.z < 1.0);
        // 半透明不写深度
        assert_eq!(renderer.framebuffer.depth[H / 2 * W + W / 2], 1.0);
    }
}
