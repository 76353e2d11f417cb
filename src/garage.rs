use cgmath::Vector3 as Vec3;

use crate::config::GarageConfig;

/// 车库尺寸：宽、高、深、屋顶厚度
pub const GARAGE_WIDTH: f32 = 8.0;
pub const GARAGE_HEIGHT: f32 = 5.0;
pub const GARAGE_DEPTH: f32 = 10.0;
pub const GARAGE_ROOF_THICKNESS: f32 = 0.5;
/// 车库门所在的世界 z 坐标，车库向 -z 延伸
pub const GARAGE_ORIGIN_Z: f32 = -15.0;
pub const DOOR_SLATS: usize = 10;

/// 地面上的开区间矩形（边界不算在内）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl GroundRect {
    pub fn contains(&self, position: Vec3<f32>) -> bool {
        self.min_x < position.x
            && position.x < self.max_x
            && self.min_z < position.z
            && position.z < self.max_z
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GarageParams {
    pub max_door_height: f32,
    pub door_step: f32,
    pub door_open_threshold: f32,
    /// 车库内部（留有余量）
    pub interior: GroundRect,
    /// 门前的接近区域
    pub approach: GroundRect,
}

impl Default for GarageParams {
    fn default() -> Self {
        Self {
            max_door_height: GARAGE_HEIGHT,
            door_step: 0.1,
            door_open_threshold: 1.0,
            interior: GroundRect {
                min_x: -5.0,
                max_x: 5.0,
                min_z: -26.0,
                max_z: -14.0,
            },
            approach: GroundRect {
                min_x: -10.0,
                max_x: 10.0,
                min_z: -10.0,
                max_z: f32::INFINITY,
            },
        }
    }
}

impl From<&GarageConfig> for GarageParams {
    fn from(config: &GarageConfig) -> Self {
        Self {
            max_door_height: config.max_door_height,
            door_step: config.door_step,
            door_open_threshold: config.door_open_threshold,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct GarageState {
    pub params: GarageParams,
    /// 门已升起的高度，0 <= door_height <= max_door_height
    pub door_height: f32,
}

impl GarageState {
    pub fn new(params: GarageParams) -> Self {
        Self {
            params,
            door_height: 0.0,
        }
    }

    pub fn raise_door(&mut self) {
        self.door_height = (self.door_height + self.params.door_step).min(self.params.max_door_height);
    }

    pub fn lower_door(&mut self) {
        self.door_height = (self.door_height - self.params.door_step).max(0.0);
    }

    /// 车灯能否照进车库内部。每帧根据当前位置和门高重新计算，不保存状态。
    pub fn light_may_enter_interior(&self, vehicle_pos: Vec3<f32>) -> bool {
        light_may_enter_interior(&self.params, vehicle_pos, self.door_height)
    }

    /// 仍然可见的门板底边高度（局部坐标）
    pub fn visible_slats(&self) -> impl Iterator<Item = f32> + '_ {
        let slat_h = GARAGE_HEIGHT / DOOR_SLATS as f32;
        (0..DOOR_SLATS)
            .map(move |i| i as f32 * slat_h + self.door_height)
            .filter(|y| *y < GARAGE_HEIGHT)
    }
}

impl Default for GarageState {
    fn default() -> Self {
        Self::new(GarageParams::default())
    }
}

pub fn light_may_enter_interior(params: &GarageParams, vehicle_pos: Vec3<f32>, door_height: f32) -> bool {
    let inside = params.interior.contains(vehicle_pos);
    let in_front = params.approach.contains(vehicle_pos);
    let door_open = door_height > params.door_open_threshold;
    inside || (in_front && door_open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, z: f32) -> Vec3<f32> {
        Vec3::new(x, 0.0, z)
    }

    #[test]
    fn door_height_stays_in_range() {
        let mut garage = GarageState::default();
        for _ in 0..10 {
            garage.lower_door();
            assert!(garage.door_height >= 0.0);
        }
        assert_eq!(garage.door_height, 0.0);
        for _ in 0..80 {
            garage.raise_door();
            assert!(garage.door_height <= garage.params.max_door_height);
        }
        assert_eq!(garage.door_height, garage.params.max_door_height);
        garage.lower_door();
        assert!(garage.door_height < garage.params.max_door_height);
    }

    #[test]
    fn inside_is_lit_for_any_door_height() {
        let params = GarageParams::default();
        for h in [0.0, 0.5, 1.0, 2.5, 5.0] {
            assert!(light_may_enter_interior(&params, at(0.0, -20.0), h));
            assert!(light_may_enter_interior(&params, at(4.9, -14.1), h));
        }
    }

    #[test]
    fn far_away_is_never_lit() {
        let params = GarageParams::default();
        for h in [0.0, 1.5, 5.0] {
            assert!(!light_may_enter_interior(&params, at(30.0, 0.0), h));
            assert!(!light_may_enter_interior(&params, at(0.0, -40.0), h));
            // 门口和接近区之间的空隙
            assert!(!light_may_enter_interior(&params, at(0.0, -12.0), h));
        }
    }

    #[test]
    fn approach_needs_an_open_door() {
        let params = GarageParams::default();
        assert!(!light_may_enter_interior(&params, at(0.0, 0.0), 0.0));
        assert!(!light_may_enter_interior(&params, at(0.0, 0.0), 1.0));
        assert!(light_may_enter_interior(&params, at(0.0, 0.0), 1.1));
        assert!(light_may_enter_interior(&params, at(-9.5, 20.0), 3.0));
    }

    #[test]
    fn bounds_are_exclusive() {
        let params = GarageParams::default();
        assert!(!light_may_enter_interior(&params, at(5.0, -20.0), 0.0));
        assert!(!light_may_enter_interior(&params, at(10.0, 0.0), 5.0));
        assert!(!light_may_enter_interior(&params, at(0.0, -10.0), 5.0));
    }

    #[test]
    fn raised_door_hides_top_slats() {
        let mut garage = GarageState::default();
        assert_eq!(garage.visible_slats().count(), DOOR_SLATS);
        for _ in 0..12 {
            garage.raise_door();
        }
        // 升起约 1.2，顶部两块已经进入屋顶
        assert_eq!(garage.visible_slats().count(), 8);
        for _ in 0..60 {
            garage.raise_door();
        }
        assert_eq!(garage.visible_slats().count(), 0);
    }
}
