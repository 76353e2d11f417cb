use std::rc::Rc;

use cgmath::{Deg, InnerSpace, Matrix4 as Mat4, SquareMatrix, Vector2 as Vec2, Vector3 as Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::garage::{
    DOOR_SLATS, GARAGE_DEPTH, GARAGE_HEIGHT, GARAGE_ORIGIN_Z, GARAGE_ROOF_THICKNESS, GARAGE_WIDTH, GarageState,
};
use crate::material::MaterialKind;
use crate::mesh::Mesh;
use crate::texture::TextureId;
use crate::vehicle::VehicleState;
use crate::vertex::Vertex;

const FLOOR_HALF_SIZE: f32 = 150.0;
const FLOOR_STEPS: usize = 20;
const FLOOR_UV_PERIOD: f32 = 2.0;

const TREE_COUNT: usize = 15;
const TREE_SPREAD: i32 = 40;
const ROCK_COUNT: usize = 10;
const ROCK_SPREAD: i32 = 30;
/// 出生点周围不放树和石头
const CLEARING: f32 = 8.0;

const MODERN_HOUSE_POS: (f32, f32) = (-15.0, -10.0);
const COTTAGE_POS: (f32, f32) = (15.0, -10.0);

const BODY_HALF_WIDTH: f32 = 0.95;
const ROOF_HALF_WIDTH: f32 = 0.65;
const STEERING_WHEEL_RATIO: f32 = 1.5;

/// 绘制时采用的光照组。GarageInterior 的物体在车灯照不进车库时不受车灯影响
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightGroup {
    #[default]
    Full,
    GarageInterior,
}

/// 绘制表里的一项：网格 + 模型矩阵 + 材质
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub mesh: Rc<Mesh>,
    pub transform: Mat4<f32>,
    pub material: MaterialKind,
    pub texture: Option<TextureId>,
    /// 是否剔除背面；不剔除时按双面光照着色
    pub cull: bool,
    pub group: LightGroup,
}

impl DrawItem {
    pub fn new(mesh: Rc<Mesh>, transform: Mat4<f32>, material: MaterialKind) -> Self {
        Self {
            mesh,
            transform,
            material,
            texture: None,
            cull: false,
            group: LightGroup::Full,
        }
    }

    fn textured(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    fn culled(mut self) -> Self {
        self.cull = true;
        self
    }

    fn garage_interior(mut self) -> Self {
        self.group = LightGroup::GarageInterior;
        self
    }
}

fn translate(x: f32, y: f32, z: f32) -> Mat4<f32> {
    Mat4::from_translation(Vec3::new(x, y, z))
}

fn scale(x: f32, y: f32, z: f32) -> Mat4<f32> {
    Mat4::from_nonuniform_scale(x, y, z)
}

fn rot_x(deg: f32) -> Mat4<f32> {
    Mat4::from_angle_x(Deg(deg))
}

fn rot_y(deg: f32) -> Mat4<f32> {
    Mat4::from_angle_y(Deg(deg))
}

fn rot_z(deg: f32) -> Mat4<f32> {
    Mat4::from_angle_z(Deg(deg))
}

fn vert(x: f32, y: f32, z: f32, normal: Vec3<f32>) -> Vertex {
    Vertex::new(Vec3::new(x, y, z), normal.normalize(), Vec2::new(0.0, 0.0))
}

/// 共享的基本体，变换矩阵负责缩放到实际尺寸
struct Primitives {
    cube: Rc<Mesh>,
    sphere: Rc<Mesh>,
    cylinder: Rc<Mesh>,
    cone: Rc<Mesh>,
    dodecahedron: Rc<Mesh>,
    prism: Rc<Mesh>,
    steering_rim: Rc<Mesh>,
}

impl Primitives {
    fn new() -> Self {
        Self {
            cube: Rc::new(Mesh::cube()),
            sphere: Rc::new(Mesh::sphere(20, 10)),
            cylinder: Rc::new(Mesh::cylinder(1.0, 1.0, 20)),
            cone: Rc::new(Mesh::cone(1.0, 1.0, 12)),
            dodecahedron: Rc::new(Mesh::dodecahedron()),
            prism: Rc::new(Mesh::prism()),
            steering_rim: Rc::new(Mesh::torus(0.04, 0.25, 12, 24)),
        }
    }
}

/// 车身外壳的一段：左右两半各一条带，法线从侧面渐变到顶部，两侧用多边形封口
fn body_shell(mesh: &mut Mesh, profile: &[(f32, f32)], cap_tail: [(f32, f32); 2]) {
    let w = BODY_HALF_WIDTH;
    let up = Vec3::unit_y();
    let left: Vec<Vertex> = profile.iter().map(|&(z, y)| vert(-w, y, z, Vec3::new(-0.7, 0.5, 0.0))).collect();
    let center: Vec<Vertex> = profile.iter().map(|&(z, y)| vert(0.0, y, z, up)).collect();
    let right: Vec<Vertex> = profile.iter().map(|&(z, y)| vert(w, y, z, Vec3::new(0.7, 0.5, 0.0))).collect();
    mesh.push_strip(&left, &center);
    mesh.push_strip(&center, &right);

    for side in [-1.0, 1.0] {
        let n = Vec3::new(side, 0.0, 0.0);
        let cap: Vec<Vertex> = profile
            .iter()
            .chain(cap_tail.iter())
            .map(|&(z, y)| vert(side * w, y, z, n))
            .collect();
        mesh.push_polygon(&cap);
    }
}

fn cross_section(mesh: &mut Mesh, z: f32, normal_z: f32) {
    let w = BODY_HALF_WIDTH;
    mesh.push_flat_quad(
        Vec3::new(0.0, 0.0, normal_z),
        [
            Vec3::new(-w, 0.65, z),
            Vec3::new(w, 0.65, z),
            Vec3::new(w, 0.1, z),
            Vec3::new(-w, 0.1, z),
        ],
    );
}

/// 车身上不随状态变化的网格（车身坐标）
struct CarBody {
    paint: Rc<Mesh>,
    inner_black: Rc<Mesh>,
    glass: Rc<Mesh>,
    /// 下标 0 为左门，1 为右门；原点在铰链处
    door_outer: [Rc<Mesh>; 2],
    door_inner: [Rc<Mesh>; 2],
}

impl CarBody {
    fn new() -> Self {
        let mut paint = Mesh::new();
        body_shell(
            &mut paint,
            &[(-2.4, 0.1), (-2.4, 0.4), (-2.0, 0.55), (-0.9, 0.65)],
            [(-0.9, 0.1), (-2.4, 0.1)],
        );
        body_shell(&mut paint, &[(1.3, 0.65), (2.1, 0.7), (2.1, 0.2)], [(2.1, 0.1), (1.3, 0.1)]);
        paint.append(Self::rear_fender());

        let mut inner_black = Mesh::new();
        cross_section(&mut inner_black, -0.9, 1.0);
        cross_section(&mut inner_black, 1.3, -1.0);
        inner_black.push_flat_quad(
            Vec3::unit_y(),
            [
                Vec3::new(-0.95, 0.1, 1.4),
                Vec3::new(0.95, 0.1, 1.4),
                Vec3::new(0.95, 0.1, -0.9),
                Vec3::new(-0.95, 0.1, -0.9),
            ],
        );

        Self {
            paint: Rc::new(paint),
            inner_black: Rc::new(inner_black),
            glass: Rc::new(Self::glass_cabin()),
            door_outer: [-1.0, 1.0].map(|side| Rc::new(Self::door_outer(side))),
            door_inner: [-1.0, 1.0].map(|side| Rc::new(Self::door_inner(side))),
        }
    }

    fn rear_fender() -> Mesh {
        let (z0, z1, top, bottom) = (0.7, 1.3, 0.65, 0.1);
        let w = BODY_HALF_WIDTH;
        let mut mesh = Mesh::new();
        mesh.push_flat_quad(
            Vec3::new(-0.5, 0.8, 0.0),
            [
                Vec3::new(-w, top, z1),
                Vec3::new(0.0, top, z1),
                Vec3::new(0.0, top, z0),
                Vec3::new(-w, top, z0),
            ],
        );
        mesh.push_flat_quad(
            Vec3::new(0.5, 0.8, 0.0),
            [
                Vec3::new(0.0, top, z1),
                Vec3::new(w, top, z1),
                Vec3::new(w, top, z0),
                Vec3::new(0.0, top, z0),
            ],
        );
        for side in [-1.0, 1.0] {
            let x = side * w;
            mesh.push_flat_quad(
                Vec3::new(side, 0.0, 0.0),
                [
                    Vec3::new(x, top, z0),
                    Vec3::new(x, top, z1),
                    Vec3::new(x, bottom, z1),
                    Vec3::new(x, bottom, z0),
                ],
            );
        }
        mesh
    }

    fn glass_cabin() -> Mesh {
        let profile = [(-0.9, 0.65), (-0.2, 1.05), (0.6, 1.05), (1.4, 0.65)];
        // 前后挡风玻璃底边和车身同宽，车顶收窄
        let half_width = |i: usize| if i == 1 || i == 2 { ROOF_HALF_WIDTH } else { BODY_HALF_WIDTH * 0.95 };
        let up = Vec3::unit_y();

        let mut mesh = Mesh::new();
        let edge = |side: f32| -> Vec<Vertex> {
            profile
                .iter()
                .enumerate()
                .map(|(i, &(z, y))| vert(side * half_width(i), y, z, Vec3::new(side * 0.5, 0.8, 0.0)))
                .collect()
        };
        let center: Vec<Vertex> = profile.iter().map(|&(z, y)| vert(0.0, y, z, up)).collect();
        mesh.push_strip(&edge(-1.0), &center);
        mesh.push_strip(&center, &edge(1.0));

        for side in [-1.0, 1.0] {
            let n = Vec3::new(side, 0.0, 0.0);
            let window: Vec<Vertex> = profile
                .iter()
                .enumerate()
                .map(|(i, &(z, y))| vert(side * half_width(i), y, z, n))
                .collect();
            mesh.push_polygon(&window);
        }
        mesh
    }

    fn door_outer(side: f32) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.push_flat_quad(
            Vec3::new(side, 0.2, 0.0),
            [
                Vec3::new(0.0, 0.65, 0.0),
                Vec3::new(0.0, 0.1, 0.0),
                Vec3::new(0.0, 0.1, 1.6),
                Vec3::new(0.0, 0.65, 1.6),
            ],
        );
        mesh
    }

    fn door_inner(side: f32) -> Mesh {
        let x = -side * 0.05;
        let mut mesh = Mesh::new();
        mesh.push_flat_quad(
            Vec3::new(-side, 0.0, 0.0),
            [
                Vec3::new(x, 0.65, 1.6),
                Vec3::new(x, 0.1, 1.6),
                Vec3::new(x, 0.1, 0.0),
                Vec3::new(x, 0.65, 0.0),
            ],
        );
        mesh
    }
}

/// 树和石头的摆放位置（整数网格），由种子决定
#[derive(Debug, Clone, PartialEq)]
pub struct Scenery {
    pub trees: Vec<(f32, f32)>,
    pub rocks: Vec<(f32, f32)>,
}

impl Scenery {
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let trees = scatter(&mut rng, TREE_COUNT, TREE_SPREAD);
        let rocks = scatter(&mut rng, ROCK_COUNT, ROCK_SPREAD);
        Self { trees, rocks }
    }
}

fn in_clearing(x: f32, z: f32) -> bool {
    x.abs() <= CLEARING && z.abs() <= CLEARING
}

fn scatter(rng: &mut StdRng, count: usize, spread: i32) -> Vec<(f32, f32)> {
    (0..count)
        .map(|_| {
            let x = rng.random_range(-spread..=spread) as f32;
            let z = rng.random_range(-spread..=spread) as f32;
            (x, z)
        })
        .filter(|&(x, z)| !in_clearing(x, z))
        .collect()
}

fn garage_exterior_walls() -> Mesh {
    let (w, h, d) = (GARAGE_WIDTH, GARAGE_HEIGHT, GARAGE_DEPTH);
    let uvs = [[0.0, 0.0], [4.0, 0.0], [4.0, 2.0], [0.0, 2.0]];
    let mut mesh = Mesh::new();
    mesh.push_textured_quad(
        -Vec3::unit_z(),
        [
            Vec3::new(w / 2.0, 0.0, -d),
            Vec3::new(-w / 2.0, 0.0, -d),
            Vec3::new(-w / 2.0, h, -d),
            Vec3::new(w / 2.0, h, -d),
        ],
        uvs,
    );
    mesh.push_textured_quad(
        -Vec3::unit_x(),
        [
            Vec3::new(-w / 2.0, 0.0, -d),
            Vec3::new(-w / 2.0, 0.0, 0.0),
            Vec3::new(-w / 2.0, h, 0.0),
            Vec3::new(-w / 2.0, h, -d),
        ],
        uvs,
    );
    mesh.push_textured_quad(
        Vec3::unit_x(),
        [
            Vec3::new(w / 2.0, 0.0, 0.0),
            Vec3::new(w / 2.0, 0.0, -d),
            Vec3::new(w / 2.0, h, -d),
            Vec3::new(w / 2.0, h, 0.0),
        ],
        uvs,
    );
    mesh
}

/// 与外墙共面、法线相反。背面剔除保证从外面只看得到外墙
fn garage_interior_walls() -> Mesh {
    let (w, h, d) = (GARAGE_WIDTH, GARAGE_HEIGHT, GARAGE_DEPTH);
    let mut mesh = Mesh::new();
    mesh.push_flat_quad(
        Vec3::unit_z(),
        [
            Vec3::new(-w / 2.0, 0.0, -d),
            Vec3::new(w / 2.0, 0.0, -d),
            Vec3::new(w / 2.0, h, -d),
            Vec3::new(-w / 2.0, h, -d),
        ],
    );
    mesh.push_flat_quad(
        Vec3::unit_x(),
        [
            Vec3::new(-w / 2.0, 0.0, 0.0),
            Vec3::new(-w / 2.0, 0.0, -d),
            Vec3::new(-w / 2.0, h, -d),
            Vec3::new(-w / 2.0, h, 0.0),
        ],
    );
    mesh.push_flat_quad(
        -Vec3::unit_x(),
        [
            Vec3::new(w / 2.0, 0.0, -d),
            Vec3::new(w / 2.0, 0.0, 0.0),
            Vec3::new(w / 2.0, h, 0.0),
            Vec3::new(w / 2.0, h, -d),
        ],
    );
    mesh
}

/// 贴在立面上的矩形（门、窗），朝 +z
fn facade_quad(mesh: &mut Mesh, x: (f32, f32), y: (f32, f32), z: f32) {
    mesh.push_flat_quad(
        Vec3::unit_z(),
        [
            Vec3::new(x.0, y.1, z),
            Vec3::new(x.1, y.1, z),
            Vec3::new(x.1, y.0, z),
            Vec3::new(x.0, y.0, z),
        ],
    );
}

/// 小屋的两片坡屋顶，带屋檐外挑
fn cottage_roof_slopes(w: f32, h: f32, d: f32, rise: f32, overhang: f32) -> Mesh {
    let (eave, ridge) = (h - 0.2, h + rise);
    let (front, back) = (d / 2.0 + overhang, -d / 2.0 - overhang);
    let outer = w / 2.0 + overhang;
    let mut mesh = Mesh::new();
    mesh.push_flat_quad(
        Vec3::new(-rise, w / 2.0, 0.0),
        [
            Vec3::new(-outer, eave, front),
            Vec3::new(0.0, ridge, front),
            Vec3::new(0.0, ridge, back),
            Vec3::new(-outer, eave, back),
        ],
    );
    mesh.push_flat_quad(
        Vec3::new(rise, w / 2.0, 0.0),
        [
            Vec3::new(0.0, ridge, front),
            Vec3::new(outer, eave, front),
            Vec3::new(outer, eave, back),
            Vec3::new(0.0, ridge, back),
        ],
    );
    mesh
}

/// 整个场景的绘制表：静态部分只生成一次，车和车库门每帧重新生成
pub struct Scene {
    shapes: Primitives,
    car: CarBody,
    static_items: Vec<DrawItem>,
}

impl Scene {
    pub fn build(seed: u64) -> Self {
        let mut scene = Self {
            shapes: Primitives::new(),
            car: CarBody::new(),
            static_items: Vec::new(),
        };
        scene.static_items = scene.build_static(&Scenery::generate(seed));
        scene
    }

    pub fn static_items(&self) -> &[DrawItem] {
        &self.static_items
    }

    fn build_static(&self, scenery: &Scenery) -> Vec<DrawItem> {
        let shapes = &self.shapes;
        let mut items = vec![
            DrawItem::new(
                Rc::new(Mesh::floor(FLOOR_HALF_SIZE, FLOOR_STEPS, FLOOR_UV_PERIOD)),
                Mat4::identity(),
                MaterialKind::Stone,
            )
            .textured(TextureId::Floor)
            .culled(),
        ];

        for &(x, z) in &scenery.trees {
            let base = translate(x, 0.0, z);
            items.push(
                DrawItem::new(shapes.cylinder.clone(), base * rot_x(-90.0) * scale(0.4, 0.4, 1.5), MaterialKind::Wood)
                    .culled(),
            );
            for i in 0..3 {
                let radius = 2.5 - i as f32 * 0.6;
                let transform = base * translate(0.0, 1.5 + i as f32 * 1.2, 0.0) * rot_x(-90.0) * scale(radius, radius, 2.5);
                items.push(DrawItem::new(shapes.cone.clone(), transform, MaterialKind::Foliage).culled());
            }
        }

        for &(x, z) in &scenery.rocks {
            let transform = translate(x, 0.5, z) * rot_y(x * 10.0) * rot_x(z * 10.0) * scale(1.2, 0.8, 1.2);
            items.push(DrawItem::new(shapes.dodecahedron.clone(), transform, MaterialKind::Stone).culled());
        }

        let garage = translate(0.0, 0.0, GARAGE_ORIGIN_Z);
        items.push(
            DrawItem::new(Rc::new(garage_exterior_walls()), garage, MaterialKind::Stone)
                .textured(TextureId::Wall)
                .culled(),
        );
        items.push(
            DrawItem::new(Rc::new(garage_interior_walls()), garage, MaterialKind::GarageInnerWall)
                .culled()
                .garage_interior(),
        );
        let roof = garage
            * translate(0.0, GARAGE_HEIGHT, -GARAGE_DEPTH / 2.0)
            * scale(GARAGE_WIDTH + 1.0, GARAGE_ROOF_THICKNESS, GARAGE_DEPTH + 1.0);
        items.push(DrawItem::new(shapes.cube.clone(), roof, MaterialKind::Roof).culled());

        items.extend(self.modern_house(MODERN_HOUSE_POS));
        items.extend(self.cottage(COTTAGE_POS));
        items
    }

    fn modern_house(&self, (x, z): (f32, f32)) -> Vec<DrawItem> {
        let base = translate(x, 0.0, z);
        let cube = &self.shapes.cube;

        let mut window = Mesh::new();
        facade_quad(&mut window, (-2.5, 2.5), (0.1, 3.5), 3.01);
        let mut door = Mesh::new();
        facade_quad(&mut door, (1.5, 2.5), (0.1, 2.2), 3.02);

        vec![
            DrawItem::new(cube.clone(), base * translate(0.0, 2.0, 0.0) * scale(6.0, 4.0, 6.0), MaterialKind::HouseWhite)
                .culled(),
            DrawItem::new(cube.clone(), base * translate(-1.5, 5.0, 0.0) * scale(4.0, 2.0, 5.0), MaterialKind::HouseWhite)
                .culled(),
            DrawItem::new(Rc::new(window), base, MaterialKind::HouseWindow).culled(),
            DrawItem::new(Rc::new(door), base, MaterialKind::Wood).culled(),
        ]
    }

    fn cottage(&self, (x, z): (f32, f32)) -> Vec<DrawItem> {
        let (w, h, d) = (5.0, 3.0, 4.0);
        let (rise, overhang) = (2.0, 0.4);
        let base = translate(x, 0.0, z);
        let front = d / 2.0 + 0.01;

        let mut door = Mesh::new();
        facade_quad(&mut door, (-0.5, 0.5), (0.0, 2.0), front);
        let mut windows = Mesh::new();
        facade_quad(&mut windows, (-1.8, -1.0), (1.0, 2.0), front);
        facade_quad(&mut windows, (1.0, 1.8), (1.0, 2.0), front);

        vec![
            DrawItem::new(self.shapes.cube.clone(), base * translate(0.0, h / 2.0, 0.0) * scale(w, h, d), MaterialKind::HouseBrick)
                .culled(),
            DrawItem::new(self.shapes.prism.clone(), base * translate(0.0, h, 0.0) * scale(w, rise, d), MaterialKind::HouseRoof)
                .culled(),
            DrawItem::new(Rc::new(cottage_roof_slopes(w, h, d, rise, overhang)), base, MaterialKind::HouseRoof),
            DrawItem::new(Rc::new(door), base, MaterialKind::Wood).culled(),
            DrawItem::new(Rc::new(windows), base, MaterialKind::HouseWindow).culled(),
        ]
    }

    /// 车库门：每块门板随门高上移，升到顶的不画
    pub fn garage_door_items(&self, garage: &GarageState) -> Vec<DrawItem> {
        let slat_h = GARAGE_HEIGHT / DOOR_SLATS as f32;
        garage
            .visible_slats()
            .map(|y| {
                let transform = translate(0.0, y + slat_h / 2.0, GARAGE_ORIGIN_Z)
                    * scale(GARAGE_WIDTH - 0.4, slat_h * 1.02, 0.1);
                DrawItem::new(self.shapes.cube.clone(), transform, MaterialKind::GarageMetal).culled()
            })
            .collect()
    }

    pub fn car_items(&self, vehicle: &VehicleState) -> Vec<DrawItem> {
        let body = vehicle.body_matrix();
        let shapes = &self.shapes;
        let mut items = Vec::new();
        let mut part = |mesh: &Rc<Mesh>, local: Mat4<f32>, material: MaterialKind| {
            items.push(DrawItem::new(mesh.clone(), body * local, material));
        };
        let identity = Mat4::identity();

        part(&self.car.paint, identity, MaterialKind::CarPaint);
        part(&self.car.inner_black, identity, MaterialKind::InnerBlack);

        // 车门绕前端铰链转动，左门负角、右门正角
        for (i, side) in [-1.0f32, 1.0].into_iter().enumerate() {
            let hinge = translate(side * BODY_HALF_WIDTH, 0.0, -0.9) * rot_y(side * vehicle.door_angle_deg);
            part(&self.car.door_outer[i], hinge, MaterialKind::CarPaint);
            part(&self.car.door_inner[i], hinge, MaterialKind::DoorInner);
        }

        // 尾翼
        let spoiler = translate(0.0, 0.75, 1.9);
        for x in [-0.5, 0.5] {
            part(&shapes.cube, spoiler * translate(x, 0.0, 0.0) * scale(0.1, 0.3, 0.2), MaterialKind::InnerBlack);
        }
        part(
            &shapes.sphere,
            spoiler * translate(0.0, 0.15, 0.0) * scale(2.2, 0.1, 0.5) * scale(0.5, 0.5, 0.5),
            MaterialKind::InnerBlack,
        );

        for side in [-1.0f32, 1.0] {
            let mirror = translate(side * 0.9, 0.8, -0.7) * rot_y(side * -15.0) * scale(0.25, 0.15, 0.15);
            part(&shapes.sphere, mirror, MaterialKind::CarPaint);
        }

        let (bulb, tail) = if vehicle.headlights_on {
            (MaterialKind::BulbOn, MaterialKind::TailLightOn)
        } else {
            (MaterialKind::BulbOff, MaterialKind::TailLightOff)
        };
        for x in [-0.7, 0.7] {
            part(&shapes.sphere, translate(x, 0.3, -2.35) * scale(0.25, 0.1, 0.1) * scale(0.8, 0.8, 0.8), bulb);
        }
        for x in [-0.6, 0.6] {
            part(&shapes.cube, translate(x, 0.5, 2.1) * scale(0.3, 0.1, 0.05), tail);
        }

        // 座椅后面的隔板，挡住后备箱
        part(&shapes.cube, translate(0.0, 0.4, 0.75) * scale(1.8, 0.4, 0.05), MaterialKind::InnerBlack);

        for x in [-0.45, 0.45] {
            let seat = translate(x, 0.1, 0.35);
            part(&shapes.cube, seat * scale(0.5, 0.15, 0.6), MaterialKind::Seat);
            part(&shapes.cube, seat * translate(0.0, 0.4, 0.25) * rot_x(-10.0) * scale(0.5, 0.7, 0.1), MaterialKind::Seat);
            part(&shapes.cube, seat * translate(0.0, 0.8, 0.3) * scale(0.3, 0.2, 0.1), MaterialKind::Seat);
        }

        let wheel = translate(-0.45, 0.55, -0.5) * rot_x(20.0) * rot_z(vehicle.steering_deg * STEERING_WHEEL_RATIO);
        part(&shapes.steering_rim, wheel, MaterialKind::SteeringLeather);
        part(&shapes.sphere, wheel * scale(1.0, 1.0, 0.5) * scale(0.08, 0.08, 0.08), MaterialKind::Chrome);
        for angle in [90.0, 210.0, 330.0] {
            let spoke = wheel * rot_z(angle) * translate(0.12, 0.0, 0.0) * scale(0.24, 0.04, 0.02);
            part(&shapes.cube, spoke, MaterialKind::SteeringLeather);
        }

        let mut road_wheel = |mount: Mat4<f32>, radius: f32, width: f32| {
            let base = mount * translate(0.0, 0.0, -width / 2.0);
            part(&shapes.cylinder, base * scale(radius, radius, width), MaterialKind::Rubber);
            let hub = base * translate(0.0, 0.0, width / 2.0) * scale(radius * 1.6, radius * 0.3, width * 1.1);
            part(&shapes.cube, hub, MaterialKind::Chrome);
        };
        for side in [-1.0f32, 1.0] {
            let front = translate(side * 1.0, 0.0, -1.3)
                * rot_y(vehicle.steering_deg)
                * rot_x(-vehicle.wheel_spin_deg)
                * rot_y(90.0);
            road_wheel(front, 0.33, 0.25);
        }
        for side in [-1.0f32, 1.0] {
            let rear = translate(side * 1.05, 0.15, 1.2) * rot_x(-vehicle.rear_wheel_spin_deg()) * rot_y(90.0);
            road_wheel(rear, 0.5, 0.35);
        }

        part(&self.car.glass, identity, MaterialKind::Glass);
        items
    }

    /// 一帧要画的全部物体
    pub fn frame_items(&self, vehicle: &VehicleState, garage: &GarageState) -> Vec<DrawItem> {
        let mut items = self.static_items.clone();
        items.extend(self.garage_door_items(garage));
        items.extend(self.car_items(vehicle));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scenery_is_seeded_and_keeps_the_clearing() {
        let a = Scenery::generate(123);
        assert_eq!(a, Scenery::generate(123));
        assert!(a.trees.len() <= TREE_COUNT && a.rocks.len() <= ROCK_COUNT);
        for &(x, z) in a.trees.iter().chain(&a.rocks) {
            assert!(!in_clearing(x, z), "object at ({x}, {z}) blocks the spawn point");
        }
        for &(x, z) in &a.rocks {
            assert!(x.abs() <= 30.0 && z.abs() <= 30.0);
        }
    }

    #[test]
    fn only_interior_walls_are_shielded() {
        let scene = Scene::build(123);
        let shielded: Vec<_> = scene
            .static_items()
            .iter()
            .filter(|item| item.group == LightGroup::GarageInterior)
            .collect();
        assert_eq!(shielded.len(), 1);
        assert_eq!(shielded[0].material, MaterialKind::GarageInnerWall);
        assert!(shielded[0].cull);
        // 内墙法线朝车库内部
        let back_wall = &shielded[0].mesh.triangles[0];
        assert!(back_wall.normal.z > 0.99);
    }

    #[test]
    fn exterior_walls_carry_the_brick_texture() {
        let scene = Scene::build(1);
        let wall = scene
            .static_items()
            .iter()
            .find(|item| item.texture == Some(TextureId::Wall))
            .expect("garage exterior");
        assert_eq!(wall.mesh.len(), 6);
        assert_relative_eq!(wall.transform.w.z, GARAGE_ORIGIN_Z);
    }

    #[test]
    fn door_slats_disappear_as_the_door_rises() {
        let scene = Scene::build(1);
        let mut garage = GarageState::default();
        assert_eq!(scene.garage_door_items(&garage).len(), DOOR_SLATS);
        for _ in 0..100 {
            garage.raise_door();
        }
        assert!(scene.garage_door_items(&garage).is_empty());
    }

    #[test]
    fn lamps_follow_the_headlight_switch() {
        let scene = Scene::build(1);
        let mut car = VehicleState::default();
        let count = |items: &[DrawItem], kind| items.iter().filter(|i| i.material == kind).count();
        let off = scene.car_items(&car);
        assert_eq!(count(&off, MaterialKind::BulbOff), 2);
        assert_eq!(count(&off, MaterialKind::TailLightOff), 2);

        car.toggle_headlights();
        let on = scene.car_items(&car);
        assert_eq!(count(&on, MaterialKind::BulbOn), 2);
        assert_eq!(count(&on, MaterialKind::TailLightOn), 2);
        assert_eq!(count(&on, MaterialKind::BulbOff), 0);
    }

    #[test]
    fn car_parts_move_with_the_car() {
        let scene = Scene::build(1);
        let mut car = VehicleState::default();
        let before = scene.car_items(&car);
        car.position = Vec3::new(3.0, 0.0, -4.0);
        let after = scene.car_items(&car);
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_relative_eq!(b.transform.w.x - a.transform.w.x, 3.0, epsilon = 1e-4);
            assert_relative_eq!(b.transform.w.z - a.transform.w.z, -4.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn open_door_swings_outward() {
        let scene = Scene::build(1);
        let mut car = VehicleState::default();
        car.door_angle_deg = 60.0;
        let items = scene.car_items(&car);
        let right_door = items
            .iter()
            .filter(|i| i.material == MaterialKind::DoorInner)
            .nth(1)
            .expect("right door");
        // 门尾 (0, 0.4, 1.6) 转 60° 后向 +x 摆出
        let tail = right_door.transform * Vec3::new(0.0, 0.4, 1.6).extend(1.0);
        assert!(tail.x > BODY_HALF_WIDTH + 1.0);
    }

    #[test]
    fn steering_wheel_follows_the_steering() {
        let scene = Scene::build(1);
        let mut car = VehicleState::default();
        let rim = |items: &[DrawItem]| {
            items
                .iter()
                .find(|i| i.material == MaterialKind::SteeringLeather)
                .map(|i| i.transform)
                .expect("steering wheel")
        };
        let straight = rim(&scene.car_items(&car));
        car.steer_left();
        let turned = rim(&scene.car_items(&car));
        assert_ne!(straight, turned);
    }

    #[test]
    fn frame_contains_everything() {
        let scene = Scene::build(1);
        let car = VehicleState::default();
        let garage = GarageState::default();
        let frame = scene.frame_items(&car, &garage);
        assert_eq!(
            frame.len(),
            scene.static_items().len() + DOOR_SLATS + scene.car_items(&car).len()
        );
        assert_eq!(frame.iter().filter(|i| i.material == MaterialKind::Glass).count(), 1);
    }
}
