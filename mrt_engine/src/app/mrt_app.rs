/// Frame driver: Init -> Running -> Cleanup -> Destroy

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, ShaderDesc};
use crate::app::{
    MrtConfig, ResourceArena, MrtPassBuilder, MrtTargets, OffscreenStage, CompositeStage,
    FallbackDisplay, mrt_supported, effective_sample_count,
};
use crate::{engine_info, engine_error};

/// Application state returned by every [`MrtApp::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init,
    Running,
    Cleanup,
    /// Terminal: all resources are released
    Destroy,
}

/// Compiled shader programs used by the multi-target path
#[derive(Debug, Clone)]
pub struct ShaderSources {
    /// Writes three color outputs
    pub offscreen: ShaderDesc,
    /// Samples one texture onto a full-screen quad
    pub quad: ShaderDesc,
}

/// Resources of the multi-target path
pub struct MrtScene {
    pub targets: MrtTargets,
    pub offscreen: OffscreenStage,
    pub composite: CompositeStage,
}

/// Rendering path chosen once at init
pub enum RenderMode {
    Mrt(MrtScene),
    Fallback(FallbackDisplay),
}

/// The MRT sample application
///
/// # Example
///
/// ```ignore
/// let mut app = MrtApp::new(MrtConfig::default(), shaders);
/// while app.tick(&mut device)? != AppState::Destroy {}
/// ```
pub struct MrtApp {
    config: MrtConfig,
    shaders: ShaderSources,
    state: AppState,
    mode: Option<RenderMode>,
    arena: ResourceArena,
}

impl MrtApp {
    pub fn new(config: MrtConfig, shaders: ShaderSources) -> Self {
        Self {
            config,
            shaders,
            state: AppState::Init,
            mode: None,
            arena: ResourceArena::new(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn config(&self) -> &MrtConfig {
        &self.config
    }

    /// None before init and after cleanup
    pub fn mode(&self) -> Option<&RenderMode> {
        self.mode.as_ref()
    }

    pub fn scene(&self) -> Option<&MrtScene> {
        match &self.mode {
            Some(RenderMode::Mrt(scene)) => Some(scene),
            _ => None,
        }
    }

    /// Resources currently owned by the application
    pub fn owned_resources(&self) -> usize {
        self.arena.len()
    }

    /// Run one step of the state machine and return the new state
    pub fn tick(&mut self, device: &mut dyn GraphicsDevice) -> Result<AppState> {
        let next = match self.state {
            AppState::Init => {
                if let Err(e) = self.on_init(device) {
                    self.state = AppState::Destroy;
                    return Err(e);
                }
                AppState::Running
            }
            AppState::Running => self.on_running(device)?,
            AppState::Cleanup => {
                self.on_cleanup(device)?;
                AppState::Destroy
            }
            AppState::Destroy => AppState::Destroy,
        };
        if next != self.state {
            engine_info!("mrt::app", "state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
        Ok(next)
    }

    /// Create every resource of the chosen path
    ///
    /// On failure everything created so far is released before the error is returned.
    pub fn on_init(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if !mrt_supported(device) {
            self.mode = Some(RenderMode::Fallback(FallbackDisplay::new(&self.config)));
            return Ok(());
        }

        match self.create_scene(device) {
            Ok(scene) => {
                engine_info!("mrt::app", "initialized with {} resources", self.arena.len());
                self.mode = Some(RenderMode::Mrt(scene));
                Ok(())
            }
            Err(e) => {
                engine_error!("mrt::app", "initialization failed: {}", e);
                if let Err(release_error) = self.arena.release_all(device) {
                    engine_error!("mrt::app", "release after failed init failed: {}", release_error);
                }
                Err(e)
            }
        }
    }

    fn create_scene(&mut self, device: &mut dyn GraphicsDevice) -> Result<MrtScene> {
        let config = &self.config;
        let sample_count = effective_sample_count(device, config.sample_count);
        let targets = MrtPassBuilder::new(config.offscreen_width, config.offscreen_height, sample_count)
            .with_clear_colors(config.attachment_clear_colors)
            .build(device, &mut self.arena)?;
        let offscreen = OffscreenStage::create(device, &mut self.arena, &self.shaders.offscreen, &targets, config)?;
        let composite = CompositeStage::create(device, &mut self.arena, &self.shaders.quad, &targets, config)?;
        Ok(MrtScene { targets, offscreen, composite })
    }

    /// Render one frame and report whether to keep running
    pub fn on_running(&mut self, device: &mut dyn GraphicsDevice) -> Result<AppState> {
        match self.mode.as_mut() {
            Some(RenderMode::Mrt(scene)) => {
                scene.offscreen.draw(device, &scene.targets)?;
                scene.composite.draw(device)?;
            }
            Some(RenderMode::Fallback(fallback)) => fallback.draw(device)?,
            None => {}
        }
        device.commit_frame()?;

        if device.quit_requested() {
            Ok(AppState::Cleanup)
        } else {
            Ok(AppState::Running)
        }
    }

    /// Release everything created at init. Calling it again releases nothing.
    pub fn on_cleanup(&mut self, device: &mut dyn GraphicsDevice) -> Result<usize> {
        if self.mode.take().is_none() && self.arena.is_empty() {
            return Ok(0);
        }
        let released = self.arena.release_all(device)?;
        engine_info!("mrt::app", "released {} resources", released);
        Ok(released)
    }
}

#[cfg(test)]
#[path = "mrt_app_tests.rs"]
mod tests;
