use std::path::Path;

use minifb::{Window, WindowOptions};
use tracing::{debug, info};

use crate::camera::{Camera, FAR_PLANE, NEAR_PLANE};
use crate::config::SceneConfig;
use crate::error::AppError;
use crate::framebuffer::{FrameBuffer, pack_color};
use crate::input::{CONTROLS, PointerState, poll_events};
use crate::lighting::clear_color;
use crate::renderer::{FrameLighting, Renderer};
use crate::scene::Scene;
use crate::sim::{Control, SimState};
use crate::texture::TextureSet;

const WINDOW_TITLE: &str = "Garage Drive";
const MAX_SSAA: usize = 8;
/// 按住方向键后开始重复前的等待，以及重复间隔（秒）
const KEY_REPEAT_DELAY: f32 = 0.25;
const KEY_REPEAT_RATE: f32 = 0.05;

/// 模拟状态 + 场景 + 渲染器，窗口模式和离屏截图共用
pub struct App {
    pub sim: SimState,
    scene: Scene,
    textures: TextureSet,
    renderer: Renderer,
}

impl App {
    pub fn new(config: &SceneConfig, width: usize, height: usize) -> Self {
        let sim = SimState::new(config);
        let camera = Camera::new(NEAR_PLANE, FAR_PLANE, width as f32 / height as f32, sim.camera.mode.fovy());
        let scene = Scene::build(config.scenery_seed);
        debug!(static_items = scene.static_items().len(), "scene built");
        Self {
            sim,
            scene,
            textures: TextureSet::generate(config.scenery_seed),
            renderer: Renderer::new(camera, width, height),
        }
    }

    pub fn render(&mut self) {
        self.sim
            .camera
            .apply_to(&mut self.renderer.camera, &self.sim.vehicle);
        self.renderer
            .framebuffer
            .clear(pack_color(clear_color(self.sim.is_night)));

        let items = self.scene.frame_items(&self.sim.vehicle, &self.sim.garage);
        let mut lighting = FrameLighting {
            rig: self.sim.light_rig(),
            headlights_on: self.sim.vehicle.headlights_on,
            interior_lit: self.sim.interior_lit(),
        };
        self.renderer
            .render_frame(&items, &mut lighting, &self.textures);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.renderer.framebuffer
    }
}

/// 交互窗口：每个节拍处理输入、推进动画、重画一帧
pub fn run_window(config: &SceneConfig) -> Result<(), AppError> {
    let (width, height) = (config.window.width, config.window.height);
    let mut window = Window::new(WINDOW_TITLE, width, height, WindowOptions::default())?;
    window.set_target_fps((1000 / config.window.tick_ms).max(1) as usize);
    window.set_key_repeat_delay(KEY_REPEAT_DELAY);
    window.set_key_repeat_rate(KEY_REPEAT_RATE);
    info!(width, height, tick_ms = config.window.tick_ms, "window opened");
    info!("\n{CONTROLS}");

    let mut app = App::new(config, width, height);
    let mut pointer = PointerState::default();

    while window.is_open() {
        for event in poll_events(&window, &mut pointer) {
            if app.sim.apply(event) == Control::Quit {
                info!("quit requested");
                return Ok(());
            }
        }
        app.sim.tick();
        app.render();

        let fb = app.framebuffer();
        window.update_with_buffer(&fb.data, fb.width, fb.height)?;
    }
    info!("window closed");
    Ok(())
}

/// 离屏渲染一帧：按 ssaa 倍数放大渲染，缩小后写 PNG
pub fn run_snapshot(config: &SceneConfig, path: &Path, ssaa: usize) -> Result<(), AppError> {
    if !(1..=MAX_SSAA).contains(&ssaa) {
        return Err(AppError::invalid(format!("ssaa factor must be between 1 and {MAX_SSAA}")));
    }
    let mut app = App::new(config, config.window.width * ssaa, config.window.height * ssaa);
    app.sim.tick();
    app.render();
    app.framebuffer().ssaa(ssaa).save_to_image(path)?;
    info!(
        path = %path.display(),
        ssaa,
        night = app.sim.is_night,
        headlights = app.sim.light_rig().headlights_enabled(),
        "snapshot written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::unpack_color;

    fn small_config(night: bool) -> SceneConfig {
        let mut config = SceneConfig::default();
        config.window.width = 80;
        config.window.height = 60;
        config.night = night;
        config
    }

    fn mean_brightness(fb: &FrameBuffer) -> f32 {
        let total: f32 = fb
            .data
            .iter()
            .map(|&c| {
                let v = unpack_color(c);
                v.x + v.y + v.z
            })
            .sum();
        total / fb.data.len() as f32
    }

    #[test]
    fn frame_shows_the_car_in_the_middle() {
        let config = small_config(false);
        let mut app = App::new(&config, 80, 60);
        app.render();
        let sky = pack_color(clear_color(false));
        // 默认轨道相机对准车辆
        assert_ne!(app.framebuffer().pixel(40, 30), Some(sky));
    }

    #[test]
    fn night_frames_are_darker() {
        let mut day = App::new(&small_config(false), 80, 60);
        day.render();
        let mut night = App::new(&small_config(true), 80, 60);
        night.render();
        assert!(mean_brightness(night.framebuffer()) < mean_brightness(day.framebuffer()));
    }

    #[test]
    fn snapshot_writes_a_png() {
        let path = std::env::temp_dir().join("garage-drive-snapshot-test.png");
        run_snapshot(&small_config(false), &path, 2).expect("snapshot");
        let img = image::open(&path).expect("png readable");
        assert_eq!((img.width(), img.height()), (80, 60));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn out_of_range_ssaa_is_rejected() {
        let path = std::env::temp_dir().join("never-written.png");
        for ssaa in [0, MAX_SSAA + 1, usize::MAX] {
            assert!(matches!(
                run_snapshot(&small_config(false), &path, ssaa),
                Err(AppError::InvalidConfig(_))
            ));
        }
        assert!(!path.exists());
    }
}
