use serde::Deserialize;
use serde_json::from_reader;
use std::{fs::File, io::BufReader, path::Path};
use tracing::info;

use crate::camera::CameraMode;
use crate::error::AppError;

/// 场景配置。所有字段都有默认值，JSON 只需写出要覆盖的部分。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub vehicle: VehicleConfig,
    pub garage: GarageConfig,
    pub camera: CameraConfig,
    pub night: bool,
    pub headlights_on: bool,
    pub scenery_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub tick_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tick_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub wheelbase: f32,
    pub max_steer_deg: f32,
    pub steer_step_deg: f32,
    pub move_speed: f32,
    pub wheel_spin_step_deg: f32,
}

impl Default for VehicleConfig {
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

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GarageConfig {
    pub max_door_height: f32,
    pub door_step: f32,
    pub door_open_threshold: f32,
}

impl Default for GarageConfig {
    fn default() -> Self {
        Self {
            max_door_height: 5.0,
            door_step: 0.1,
            door_open_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub mode: CameraMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.2,
            distance: 22.0,
            mode: CameraMode::Orbital,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            vehicle: VehicleConfig::default(),
            garage: GarageConfig::default(),
            camera: CameraConfig::default(),
            night: false,
            headlights_on: false,
            scenery_seed: 123,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let config: SceneConfig =
            from_reader(BufReader::new(file)).map_err(|e| AppError::Config {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
        config.validate()?;
        info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    #[cfg(test)]
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let config: SceneConfig = serde_json::from_str(json).map_err(|e| AppError::Config {
            path: "<inline>".into(),
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(AppError::invalid("window size must be non-zero"));
        }
        if self.window.tick_ms == 0 {
            return Err(AppError::invalid("tick_ms must be non-zero"));
        }
        let v = &self.vehicle;
        for (name, value) in [
            ("wheelbase", v.wheelbase),
            ("max_steer_deg", v.max_steer_deg),
            ("steer_step_deg", v.steer_step_deg),
            ("move_speed", v.move_speed),
        ] {
            if !(value > 0.0) {
                return Err(AppError::invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if v.max_steer_deg >= 90.0 {
            return Err(AppError::invalid("max_steer_deg must be below 90"));
        }
        let g = &self.garage;
        if !(g.max_door_height > 0.0) || !(g.door_step > 0.0) {
            return Err(AppError::invalid("garage door height and step must be positive"));
        }
        if !(self.camera.distance > 0.0) {
            return Err(AppError::invalid("camera distance must be positive"));
        }
        Ok(())
    }
}
