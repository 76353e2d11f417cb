use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window};

use crate::vehicle::Direction;

/// 用户输入统一转换成的事件。模拟只认这些事件，不直接接触窗口后端
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    SteerLeft,
    SteerRight,
    Drive(Direction),
    ResetSteering,
    ToggleCarDoor,
    RaiseGarageDoor,
    LowerGarageDoor,
    ToggleHeadlights,
    ToggleDayNight,
    CycleCamera,
    Quit,
    DragStart { x: f32, y: f32 },
    DragMove { x: f32, y: f32 },
    DragEnd,
    /// 正数拉近
    Zoom(f32),
}

pub const CONTROLS: &str = "\
Controls:
  Left/Right  steer        Up/Down  drive forward / reverse
  Space       centre wheel O        car door
  G / F       garage door up / down
  H           headlights   N        day / night
  V           camera mode  Esc      quit
  Mouse drag  orbit camera Wheel    zoom";

pub fn map_key(key: Key) -> Option<InputEvent> {
    let event = match key {
        Key::Left => InputEvent::SteerLeft,
        Key::Right => InputEvent::SteerRight,
        Key::Up => InputEvent::Drive(Direction::Forward),
        Key::Down => InputEvent::Drive(Direction::Reverse),
        Key::Space => InputEvent::ResetSteering,
        Key::O => InputEvent::ToggleCarDoor,
        Key::G => InputEvent::RaiseGarageDoor,
        Key::F => InputEvent::LowerGarageDoor,
        Key::H => InputEvent::ToggleHeadlights,
        Key::N => InputEvent::ToggleDayNight,
        Key::V => InputEvent::CycleCamera,
        Key::Escape => InputEvent::Quit,
        _ => return None,
    };
    Some(event)
}

/// 左键拖拽的状态机：按下开始、移动时更新、松开结束
#[derive(Debug, Default)]
pub struct PointerState {
    dragging: bool,
    last: Option<(f32, f32)>,
}

impl PointerState {
    pub fn update(&mut self, pos: Option<(f32, f32)>, left_down: bool) -> Option<InputEvent> {
        match (self.dragging, left_down, pos) {
            (false, true, Some((x, y))) => {
                self.dragging = true;
                self.last = Some((x, y));
                Some(InputEvent::DragStart { x, y })
            }
            (true, true, Some((x, y))) if self.last != Some((x, y)) => {
                self.last = Some((x, y));
                Some(InputEvent::DragMove { x, y })
            }
            (true, false, _) => {
                self.dragging = false;
                self.last = None;
                Some(InputEvent::DragEnd)
            }
            _ => None,
        }
    }
}

pub fn zoom_from_scroll(scroll_y: f32) -> Option<InputEvent> {
    (scroll_y != 0.0).then(|| InputEvent::Zoom(scroll_y.signum()))
}

/// 收集本帧的全部输入。方向键按住时由 minifb 按窗口设置的延迟和间隔重复产生事件
pub fn poll_events(window: &Window, pointer: &mut PointerState) -> Vec<InputEvent> {
    let mut events: Vec<InputEvent> = window
        .get_keys_pressed(KeyRepeat::Yes)
        .into_iter()
        .filter_map(map_key)
        .collect();

    let pos = window.get_mouse_pos(MouseMode::Pass);
    events.extend(pointer.update(pos, window.get_mouse_down(MouseButton::Left)));

    if let Some((_, scroll_y)) = window.get_scroll_wheel() {
        events.extend(zoom_from_scroll(scroll_y));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_events() {
        assert_eq!(map_key(Key::Up), Some(InputEvent::Drive(Direction::Forward)));
        assert_eq!(map_key(Key::Down), Some(InputEvent::Drive(Direction::Reverse)));
        assert_eq!(map_key(Key::G), Some(InputEvent::RaiseGarageDoor));
        assert_eq!(map_key(Key::F), Some(InputEvent::LowerGarageDoor));
        assert_eq!(map_key(Key::Escape), Some(InputEvent::Quit));
        assert_eq!(map_key(Key::Q), None);
    }

    #[test]
    fn drag_lifecycle() {
        let mut pointer = PointerState::default();
        assert_eq!(pointer.update(Some((1.0, 1.0)), false), None);
        assert_eq!(
            pointer.update(Some((1.0, 1.0)), true),
            Some(InputEvent::DragStart { x: 1.0, y: 1.0 })
        );
        assert_eq!(pointer.update(Some((1.0, 1.0)), true), None);
        assert_eq!(
            pointer.update(Some((4.0, 2.0)), true),
            Some(InputEvent::DragMove { x: 4.0, y: 2.0 })
        );
        assert_eq!(pointer.update(None, false), Some(InputEvent::DragEnd));
        assert_eq!(pointer.update(None, false), None);
    }

    #[test]
    fn scroll_is_reduced_to_notches() {
        assert_eq!(zoom_from_scroll(120.0), Some(InputEvent::Zoom(1.0)));
        assert_eq!(zoom_from_scroll(-0.5), Some(InputEvent::Zoom(-1.0)));
        assert_eq!(zoom_from_scroll(0.0), None);
    }
}
