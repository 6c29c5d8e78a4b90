//! Integration tests for the application driven by an external device
//!
//! The device below implements `GraphicsDevice` outside the crate, the way
//! a backend does, and reports no multiple-render-target support.
//!
//! Run with: cargo test --test fallback_integration_tests

use mrt_engine::glam::Vec4;
use mrt_engine::mrt::{Engine, Error, Result};
use mrt_engine::mrt::app::{AppState, MrtApp, MrtConfig, ShaderSources};
use mrt_engine::mrt::device::*;
use mrt_engine::mrt::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// SINGLE-TARGET DEVICE
// ============================================================================

/// Screen-only device: counts creations and collects filled rectangles
#[derive(Default)]
struct ScreenOnlyDevice {
    created: usize,
    in_pass: bool,
    clear_colors: Vec<Vec4>,
    filled: Vec<ViewportRect>,
    frames: usize,
    quit: bool,
}

impl ScreenOnlyDevice {
    fn refuse<T>(&mut self) -> Result<T> {
        self.created += 1;
        Err(Error::InitializationFailed("screen-only device".to_string()))
    }
}

impl GraphicsDevice for ScreenOnlyDevice {
    fn features(&self) -> DeviceFeatures {
        DeviceFeatures::empty()
    }

    fn max_color_attachments(&self) -> u32 {
        1
    }

    fn display_attributes(&self) -> DisplayAttributes {
        DisplayAttributes {
            framebuffer_width: 640,
            framebuffer_height: 480,
            color_format: TextureFormat::B8G8R8A8_SRGB,
            depth_format: None,
            sample_count: 1,
        }
    }

    fn create_texture(&mut self, _desc: &TextureDesc) -> Result<TextureId> {
        self.refuse()
    }

    fn create_mesh(&mut self, _desc: &MeshDesc) -> Result<MeshId> {
        self.refuse()
    }

    fn create_shader(&mut self, _desc: &ShaderDesc) -> Result<ShaderId> {
        self.refuse()
    }

    fn create_pipeline(&mut self, _desc: &PipelineDesc) -> Result<PipelineId> {
        self.refuse()
    }

    fn create_pass(&mut self, _desc: &RenderPassDesc) -> Result<PassId> {
        self.refuse()
    }

    fn destroy(&mut self, id: ResourceId) -> Result<()> {
        Err(Error::InvalidResource(format!("{:?}", id)))
    }

    fn begin_pass(&mut self, pass: Option<PassId>, action: &PassAction) -> Result<()> {
        assert!(pass.is_none() && !self.in_pass);
        self.in_pass = true;
        self.clear_colors.extend(action.color);
        Ok(())
    }

    fn apply_viewport(&mut self, _rect: ViewportRect, _origin_top_left: bool) -> Result<()> {
        unreachable!("fallback never sets a viewport")
    }

    fn apply_draw_state(&mut self, _state: &DrawState) -> Result<()> {
        unreachable!("fallback never draws meshes")
    }

    fn apply_uniforms(&mut self, _stage: ShaderStage, _data: &[u8]) -> Result<()> {
        unreachable!("fallback never uploads uniforms")
    }

    fn draw(&mut self, _primitive_group: usize) -> Result<()> {
        unreachable!("fallback never draws meshes")
    }

    fn fill_rects(&mut self, _color: Vec4, rects: &[ViewportRect]) -> Result<()> {
        assert!(self.in_pass);
        self.filled.extend_from_slice(rects);
        Ok(())
    }

    fn end_pass(&mut self) -> Result<()> {
        self.in_pass = false;
        Ok(())
    }

    fn commit_frame(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn request_quit(&mut self) {
        self.quit = true;
    }
}

struct CaptureLogger(Arc<Mutex<Vec<LogEntry>>>);

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source.starts_with("mrt::") {
            self.0.lock().unwrap().push(entry.clone());
        }
    }
}

fn shaders() -> ShaderSources {
    let spirv = 0x0723_0203u32.to_le_bytes().to_vec();
    ShaderSources {
        offscreen: ShaderDesc::from_spirv("offscreen", spirv.clone(), spirv.clone()),
        quad: ShaderDesc::from_spirv("quad", spirv.clone(), spirv),
    }
}

// ============================================================================
// FALLBACK TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_fallback_lifecycle() {
    let mut device = ScreenOnlyDevice::default();
    let mut app = MrtApp::new(MrtConfig::default(), shaders());

    assert_eq!(app.tick(&mut device).unwrap(), AppState::Running);
    assert_eq!(app.tick(&mut device).unwrap(), AppState::Running);
    device.request_quit();
    assert_eq!(app.tick(&mut device).unwrap(), AppState::Cleanup);
    assert_eq!(app.tick(&mut device).unwrap(), AppState::Destroy);

    assert_eq!(device.created, 0);
    assert_eq!(device.frames, 2);
    assert!(device.clear_colors.iter().all(|c| *c == Vec4::new(0.5, 0.0, 0.0, 1.0)));
    assert!(!device.filled.is_empty());
}

#[test]
#[serial]
fn test_integration_fallback_text_stays_on_screen() {
    let mut device = ScreenOnlyDevice::default();
    let mut app = MrtApp::new(MrtConfig::default(), shaders());
    app.tick(&mut device).unwrap();
    app.tick(&mut device).unwrap();

    for rect in &device.filled {
        assert!(rect.x >= 0 && rect.right() <= 640);
        assert!(rect.y >= 0 && rect.bottom() <= 480);
    }
}

#[test]
#[serial]
fn test_integration_fallback_decision_is_logged() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger(entries.clone()));

    let mut device = ScreenOnlyDevice::default();
    let mut app = MrtApp::new(MrtConfig::default(), shaders());
    app.tick(&mut device).unwrap();

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert!(captured
        .iter()
        .any(|e| e.severity == LogSeverity::Warn && e.source == "mrt::capability"));
    assert!(captured.iter().any(|e| e.source == "mrt::app" && e.message.contains("Running")));
}
