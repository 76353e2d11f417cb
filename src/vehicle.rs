use cgmath::{Matrix4 as Mat4, Rad, Vector3 as Vec3};

use crate::config::VehicleConfig;

/// 车门完全打开时的角度（度）
pub const DOOR_OPEN_ANGLE: f32 = 60.0;
/// 每帧车门动画逼近目标角度的比例
const DOOR_EASE: f32 = 0.1;
/// 前轮半径 / 后轮半径，后轮转得更慢
const REAR_SPIN_RATIO: f32 = 0.33 / 0.55;
/// 车身原点离地高度
pub const RIDE_HEIGHT: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VehicleParams {
    pub wheelbase: f32,
    pub max_steer_deg: f32,
    pub steer_step_deg: f32,
    pub move_speed: f32,
    pub wheel_spin_step_deg: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            wheelbase: 2.8,
            max_steer_deg: 35.0,
            steer_step_deg: 3.0,
            move_speed: 0.5,
            wheel_spin_step_deg: 15.0,
        }
    }
}

impl From<&VehicleConfig> for VehicleParams {
    fn from(config: &VehicleConfig) -> Self {
        Self {
            wheelbase: config.wheelbase,
            max_steer_deg: config.max_steer_deg,
            steer_step_deg: config.steer_step_deg,
            move_speed: config.move_speed,
            wheel_spin_step_deg: config.wheel_spin_step_deg,
        }
    }
}

/// 车辆状态：位置在地面 (x, z) 上，y 恒为 0
#[derive(Debug, Clone)]
pub struct VehicleState {
    pub params: VehicleParams,
    pub position: Vec3<f32>,
    /// 朝向（弧度），0 时车头指向 -z
    pub heading: f32,
    /// 前轮转向角（度），始终在 ±max_steer 之内
    pub steering_deg: f32,
    /// 车轮滚动角（度），不做归一化
    pub wheel_spin_deg: f32,
    pub door_open: bool,
    pub door_angle_deg: f32,
    pub headlights_on: bool,
}

impl VehicleState {
    pub fn new(params: VehicleParams) -> Self {
        Self {
            params,
            position: Vec3::new(0.0, 0.0, 0.0),
            heading: 0.0,
            steering_deg: 0.0,
            wheel_spin_deg: 0.0,
            door_open: false,
            door_angle_deg: 0.0,
            headlights_on: false,
        }
    }

    pub fn steer_left(&mut self) {
        self.steering_deg =
            (self.steering_deg + self.params.steer_step_deg).min(self.params.max_steer_deg);
    }

    pub fn steer_right(&mut self) {
        self.steering_deg =
            (self.steering_deg - self.params.steer_step_deg).max(-self.params.max_steer_deg);
    }

    pub fn reset_steering(&mut self) {
        self.steering_deg = 0.0;
    }

    /// 自行车模型积分一步。每个按键事件调用一次，与真实时间无关。
    pub fn drive(&mut self, direction: Direction) {
        let dir = direction.sign();
        let speed = self.params.move_speed;

        self.wheel_spin_deg += dir * self.params.wheel_spin_step_deg;

        // 先沿旧朝向前进，再转向
        self.position.x -= dir * speed * self.heading.sin();
        self.position.z -= dir * speed * self.heading.cos();
        self.heading +=
            dir * (speed / self.params.wheelbase) * self.steering_deg.to_radians().tan();
    }

    pub fn toggle_door(&mut self) {
        self.door_open = !self.door_open;
    }

    pub fn toggle_headlights(&mut self) {
        self.headlights_on = !self.headlights_on;
    }

    /// 每帧调用：车门角度向目标角度缓动
    pub fn tick(&mut self) {
        let target = if self.door_open { DOOR_OPEN_ANGLE } else { 0.0 };
        self.door_angle_deg += (target - self.door_angle_deg) * DOOR_EASE;
    }

    pub fn rear_wheel_spin_deg(&self) -> f32 {
        self.wheel_spin_deg * REAR_SPIN_RATIO
    }

    /// 车身局部坐标到世界坐标
    pub fn body_matrix(&self) -> Mat4<f32> {
        Mat4::from_translation(Vec3::new(self.position.x, RIDE_HEIGHT, self.position.z))
            * Mat4::from_angle_y(Rad(self.heading))
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new(VehicleParams::default())
    }
}
