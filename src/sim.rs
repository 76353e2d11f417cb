use tracing::{debug, info};

use crate::camera::CameraRig;
use crate::config::SceneConfig;
use crate::garage::{GarageParams, GarageState};
use crate::input::InputEvent;
use crate::lighting::LightRig;
use crate::vehicle::{VehicleParams, VehicleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// 全部可变的模拟状态，显式传给输入处理、逐帧更新和渲染
#[derive(Debug, Clone)]
pub struct SimState {
    pub vehicle: VehicleState,
    pub garage: GarageState,
    pub camera: CameraRig,
    pub is_night: bool,
}

impl SimState {
    pub fn new(config: &SceneConfig) -> Self {
        let mut vehicle = VehicleState::new(VehicleParams::from(&config.vehicle));
        vehicle.headlights_on = config.headlights_on;
        Self {
            vehicle,
            garage: GarageState::new(GarageParams::from(&config.garage)),
            camera: CameraRig::new(&config.camera),
            is_night: config.night,
        }
    }

    pub fn apply(&mut self, event: InputEvent) -> Control {
        match event {
            InputEvent::SteerLeft => self.vehicle.steer_left(),
            InputEvent::SteerRight => self.vehicle.steer_right(),
            InputEvent::Drive(direction) => {
                self.vehicle.drive(direction);
                debug!(
                    x = self.vehicle.position.x,
                    z = self.vehicle.position.z,
                    heading = self.vehicle.heading,
                    "car moved"
                );
            }
            InputEvent::ResetSteering => self.vehicle.reset_steering(),
            InputEvent::ToggleCarDoor => {
                self.vehicle.toggle_door();
                debug!(open = self.vehicle.door_open, "car door");
            }
            InputEvent::RaiseGarageDoor => self.garage.raise_door(),
            InputEvent::LowerGarageDoor => self.garage.lower_door(),
            InputEvent::ToggleHeadlights => {
                self.vehicle.toggle_headlights();
                info!(on = self.vehicle.headlights_on, "headlights");
            }
            InputEvent::ToggleDayNight => {
                self.is_night = !self.is_night;
                info!(night = self.is_night, "day/night switched");
            }
            InputEvent::CycleCamera => {
                self.camera.cycle_mode();
                info!(mode = ?self.camera.mode, "camera mode");
            }
            InputEvent::DragStart { x, y } => self.camera.begin_drag(x, y),
            InputEvent::DragMove { x, y } => self.camera.drag_to(x, y),
            InputEvent::DragEnd => self.camera.end_drag(),
            InputEvent::Zoom(notches) => self.camera.zoom(notches),
            InputEvent::Quit => return Control::Quit,
        }
        Control::Continue
    }

    /// 固定节拍调用一次，只推进动画，不移动车辆
    pub fn tick(&mut self) {
        self.vehicle.tick();
    }

    /// 当前帧车灯能否照进车库内部
    pub fn interior_lit(&self) -> bool {
        self.garage.light_may_enter_interior(self.vehicle.position)
    }

    pub fn light_rig(&self) -> LightRig {
        LightRig::new(&self.vehicle, self.is_night)
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}
