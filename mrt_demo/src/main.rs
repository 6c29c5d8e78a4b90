//! MRT sample executable
//!
//! Opens the window, creates the Vulkan device and drives [`MrtApp`] once per
//! redraw until it reaches `AppState::Destroy`.
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `MRT_SHADER_DIR`: directory holding the compiled `.spv` files
//! - `MRT_DISABLE_MRT`: set to `1` to hide multi-target support and show the fallback screen

mod log_bridge;
mod shaders;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use mrt_engine::mrt::app::{AppState, MrtApp, MrtConfig};
use mrt_engine::mrt::device::{DeviceFeatures, GraphicsDevice};
use mrt_engine_renderer_vulkan::{print_validation_stats_report, VulkanConfig, VulkanGraphicsDevice};

const DISABLE_MRT_VAR: &str = "MRT_DISABLE_MRT";

fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name).as_deref(), Ok("1") | Ok("true") | Ok("yes"))
}

/// Window, device and application, created together on the first resume
struct Running {
    app: MrtApp,
    device: VulkanGraphicsDevice,
    window: Window,
}

struct DemoRunner {
    config: MrtConfig,
    vulkan: VulkanConfig,
    running: Option<Running>,
    failure: Option<anyhow::Error>,
}

impl DemoRunner {
    fn new(config: MrtConfig, vulkan: VulkanConfig) -> Self {
        Self { config, vulkan, running: None, failure: None }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(self.config.display_width, self.config.display_height));
        let window = event_loop.create_window(attrs).context("failed to create window")?;

        let size = window.inner_size();
        let device = VulkanGraphicsDevice::new(&window, size.width, size.height, self.vulkan.clone())
            .map_err(|e| anyhow!("failed to create Vulkan device: {e}"))?;

        let dir = shaders::shader_dir(std::env::var(shaders::SHADER_DIR_VAR).ok().as_deref());
        let sources = shaders::load_shader_sources(&dir).map_err(|e| anyhow!("{e}"))?;

        Ok(Running { app: MrtApp::new(self.config.clone(), sources), device, window })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        // device before window: the surface belongs to the window
        if let Some(Running { app, device, window }) = self.running.take() {
            drop(app);
            drop(device);
            drop(window);
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        match running.app.tick(&mut running.device) {
            Ok(AppState::Destroy) => {
                log::info!("sample finished");
                self.shutdown(event_loop);
            }
            Ok(_) => {}
            Err(e) => self.fail(event_loop, anyhow!("frame failed: {e}")),
        }
    }
}

impl ApplicationHandler for DemoRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(running) = self.running.as_mut() {
                    running.device.request_quit();
                    running.window.request_redraw();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.device.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_ref() {
            running.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    log_bridge::init_logging();

    let mut vulkan = VulkanConfig::default();
    if env_flag(DISABLE_MRT_VAR) {
        log::info!("{DISABLE_MRT_VAR} set, hiding multiple render target support");
        vulkan = vulkan.with_disabled_features(DeviceFeatures::MULTIPLE_RENDER_TARGET);
    }

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = DemoRunner::new(MrtConfig::default(), vulkan);
    event_loop.run_app(&mut runner).context("winit event loop terminated with error")?;

    if cfg!(feature = "vulkan-validation") {
        print_validation_stats_report();
    }

    match runner.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
