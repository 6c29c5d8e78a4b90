/// Shader program descriptor (SPIR-V vertex + fragment stage)

use crate::error::{Error, Result};

/// SPIR-V magic number (first word of every module)
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// One compiled shader stage
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderModuleDesc {
    /// SPIR-V bytes (little-endian words)
    pub code: Vec<u8>,
    pub entry_point: String,
}

impl ShaderModuleDesc {
    pub fn spirv(code: Vec<u8>) -> Self {
        Self { code, entry_point: "main".to_string() }
    }

    /// Decode the byte stream into SPIR-V words
    pub fn words(&self) -> Result<Vec<u32>> {
        if self.code.is_empty() || self.code.len() % 4 != 0 {
            return Err(Error::InvalidResource(format!(
                "SPIR-V size {} is not a non-zero multiple of 4", self.code.len()
            )));
        }
        let words: Vec<u32> = self
            .code
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if words[0] != SPIRV_MAGIC {
            return Err(Error::InvalidResource(format!(
                "bad SPIR-V magic 0x{:08x}", words[0]
            )));
        }
        Ok(words)
    }
}

/// Descriptor for creating a shader program
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDesc {
    pub name: String,
    pub vertex: ShaderModuleDesc,
    pub fragment: ShaderModuleDesc,
}

impl ShaderDesc {
    pub fn from_spirv(name: impl Into<String>, vertex: Vec<u8>, fragment: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            vertex: ShaderModuleDesc::spirv(vertex),
            fragment: ShaderModuleDesc::spirv(fragment),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.vertex.words().map_err(|e| stage_error(&self.name, ShaderStage::Vertex, e))?;
        self.fragment.words().map_err(|e| stage_error(&self.name, ShaderStage::Fragment, e))?;
        Ok(())
    }
}

fn stage_error(name: &str, stage: ShaderStage, err: Error) -> Error {
    Error::InvalidResource(format!("shader '{}' {:?} stage: {}", name, stage, err))
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
