//! Precompiled SPIR-V loading
//!
//! The GLSL sources next to this crate are compiled offline with `glslc`
//! (see `shaders/README.md`). At startup the `.spv` files are read from
//! `MRT_SHADER_DIR`, or from `shaders/` in the crate directory.

use std::path::{Path, PathBuf};

use mrt_engine::mrt::app::ShaderSources;
use mrt_engine::mrt::device::ShaderDesc;
use mrt_engine::mrt::{Error, Result};

pub const SHADER_DIR_VAR: &str = "MRT_SHADER_DIR";

/// Directory the `.spv` files are read from
pub fn shader_dir(override_dir: Option<&str>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"),
    }
}

fn read_spirv(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        Error::InitializationFailed(format!("cannot read shader {}: {}", path.display(), e))
    })
}

fn load_program(dir: &Path, name: &str) -> Result<ShaderDesc> {
    let vertex = read_spirv(&dir.join(format!("{name}.vert.spv")))?;
    let fragment = read_spirv(&dir.join(format!("{name}.frag.spv")))?;
    Ok(ShaderDesc::from_spirv(name, vertex, fragment))
}

/// Load both programs of the sample from `dir`
pub fn load_shader_sources(dir: &Path) -> Result<ShaderSources> {
    log::debug!("loading shaders from {}", dir.display());
    Ok(ShaderSources {
        offscreen: load_program(dir, "offscreen")?,
        quad: load_program(dir, "quad")?,
    })
}

#[cfg(test)]
#[path = "shaders_tests.rs"]
mod tests;
