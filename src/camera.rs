use cgmath::{Deg, Matrix4 as Mat4, Point3, Rad, Vector3 as Vec3};
use serde::Deserialize;

use crate::config::CameraConfig;
use crate::vehicle::VehicleState;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 300.0;

const DRAG_SENSITIVITY: f32 = 0.005;
const PITCH_LIMIT: f32 = 1.0;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 50.0;
const SWITCH_PITCH: f32 = 0.4;
const ORBIT_MIN_EYE_Y: f32 = 0.5;
const FOLLOW_RADIUS: f32 = 15.0;
const FOLLOW_LIFT: f32 = 2.0;

#[derive(Debug)]
pub struct Frustum {
    near: f32,
    aspect: f32,
    fovy: Rad<f32>,
    far: f32,
    mat: Mat4<f32>,
}

impl Frustum {
    #[rustfmt::skip]
    pub fn new(near: f32, aspect: f32, far: f32, fovy: Rad<f32>) -> Self {
        let tan_half_fovy = (fovy.0 / 2.0).tan();
        let a = 1.0 / (aspect * tan_half_fovy);
        let b = 1.0 / tan_half_fovy;
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        // projection
        let mat = Mat4::new(
            a,    0.0,   0.0,   0.0,
            0.0,  b,     0.0,   0.0,
            0.0,  0.0,   c,    -1.0,
            0.0,  0.0,   d,     0.0,
        );

        Self {
            near,
            aspect,
            fovy,
            far,
            mat,
        }
    }

    pub fn get_mat(&self) -> &Mat4<f32> {
        &self.mat
    }
}

pub struct Camera {
    frustum: Frustum,
    pub(crate) eye: Vec3<f32>,
    pub(crate) at: Vec3<f32>,
    pub(crate) up: Vec3<f32>,
}

impl Camera {
    pub fn new(near: f32, far: f32, aspect: f32, fovy: Rad<f32>) -> Self {
        Self {
            frustum: Frustum::new(near, aspect, far, fovy),
            eye: Vec3::new(0.0, 0.0, 5.0),
            at: Vec3::new(0.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    pub fn get_frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// 视角变化时重建投影矩阵
    pub fn set_fovy(&mut self, fovy: Rad<f32>) {
        if (self.frustum.fovy.0 - fovy.0).abs() > f32::EPSILON {
            self.frustum = Frustum::new(self.frustum.near, self.frustum.aspect, self.frustum.far, fovy);
        }
    }

    pub fn look_at(&mut self, eye: Vec3<f32>, at: Vec3<f32>) {
        self.eye = eye;
        self.at = at;
    }

    pub fn get_view_mat(&self) -> Mat4<f32> {
        Mat4::look_at_rh(
            Point3::new(self.eye.x, self.eye.y, self.eye.z),
            Point3::new(self.at.x, self.at.y, self.at.z),
            self.up,
        )
    }

    pub fn get_view_proj_mat(&self) -> Mat4<f32> {
        self.frustum.get_mat() * self.get_view_mat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// 围绕车辆旋转
    #[default]
    Orbital,
    /// 跟随车尾
    Follow,
    /// 驾驶员视角
    Driver,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Orbital => CameraMode::Follow,
            CameraMode::Follow => CameraMode::Driver,
            CameraMode::Driver => CameraMode::Orbital,
        }
    }

    pub fn fovy(self) -> Rad<f32> {
        match self {
            CameraMode::Driver => Deg(65.0).into(),
            _ => Deg(45.0).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3<f32>,
    pub target: Vec3<f32>,
    pub fovy: Rad<f32>,
}

/// 用户可控的相机状态：模式、偏航、俯仰、距离，以及鼠标拖拽
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub mode: CameraMode,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    drag_origin: Option<(f32, f32)>,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            mode: config.mode,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: config.distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            drag_origin: None,
        }
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.yaw = 0.0;
        self.pitch = SWITCH_PITCH;
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
    }

    pub fn drag_to(&mut self, x: f32, y: f32) {
        let Some((last_x, last_y)) = self.drag_origin else {
            return;
        };
        self.yaw += (x - last_x) * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + (y - last_y) * DRAG_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.drag_origin = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// 滚轮向上（正数）拉近
    pub fn zoom(&mut self, notches: f32) {
        self.distance = (self.distance - notches).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn pose(&self, vehicle: &VehicleState) -> CameraPose {
        let car = vehicle.position;
        let (eye, target) = match self.mode {
            CameraMode::Orbital => {
                let mut eye = Vec3::new(
                    car.x + self.distance * self.yaw.sin() * self.pitch.cos(),
                    car.y + self.distance * self.pitch.sin(),
                    car.z + self.distance * self.yaw.cos() * self.pitch.cos(),
                );
                eye.y = eye.y.max(ORBIT_MIN_EYE_Y);
                (eye, car)
            }
            CameraMode::Follow => {
                let angle = vehicle.heading + self.yaw;
                let eye = Vec3::new(
                    car.x + FOLLOW_RADIUS * angle.sin() * self.pitch.cos(),
                    car.y + FOLLOW_RADIUS * self.pitch.sin() + FOLLOW_LIFT,
                    car.z + FOLLOW_RADIUS * angle.cos() * self.pitch.cos(),
                );
                (eye, car)
            }
            CameraMode::Driver => {
                let (offset_right, offset_up, offset_back) = (-0.42, 1.35, 0.45);
                let target_dist = 50.0;
                let (s, c) = vehicle.heading.sin_cos();
                let eye = Vec3::new(
                    car.x + offset_right * c + offset_back * s,
                    car.y + offset_up,
                    car.z - offset_right * s + offset_back * c,
                );
                let target = Vec3::new(eye.x - target_dist * s, eye.y - 3.0, eye.z - target_dist * c);
                (eye, target)
            }
        };
        CameraPose {
            eye,
            target,
            fovy: self.mode.fovy(),
        }
    }

    pub fn apply_to(&self, camera: &mut Camera, vehicle: &VehicleState) {
        let pose = self.pose(vehicle);
        camera.set_fovy(pose.fovy);
        camera.look_at(pose.eye, pose.target);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
