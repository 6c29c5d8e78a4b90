/// Shader - vertex/fragment modules plus what SPIR-V reflection says about them
///
/// Uniform blocks are push-constant blocks. Both stages address the same
/// push-constant bytes starting at offset 0; textures are combined image
/// samplers in descriptor set 0.

use ash::vk;
use mrt_engine::mrt::Result;
use mrt_engine::mrt::device::{ShaderDesc, ShaderModuleDesc, ShaderStage};
use mrt_engine::{engine_bail, engine_debug, engine_err};
use std::ffi::CString;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Resources one stage uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReflection {
    /// Size of the push-constant block in bytes (0 when absent)
    pub push_constant_size: u32,

    /// Bindings of combined image samplers in set 0, ascending
    pub sampled_bindings: Vec<u32>,
}

/// Reflect the entry point `entry_point` of a SPIR-V module
pub fn reflect_stage(words: &[u32], entry_point: &str) -> Result<StageReflection> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| engine_err!("mrt::vulkan", "SPIR-V reflection failed: {:?}", e))?;

    let Some(entry) = entry_points
        .iter()
        .find(|ep| ep.name == entry_point)
        .or_else(|| entry_points.first())
    else {
        engine_bail!("mrt::vulkan", "SPIR-V module has no entry point");
    };

    let mut reflection = StageReflection::default();
    for var in entry.vars.iter() {
        match var {
            spirq::var::Variable::PushConstant { ty, .. } => {
                let size = ty.nbyte().unwrap_or(0) as u32;
                reflection.push_constant_size = reflection.push_constant_size.max(size);
            }
            spirq::var::Variable::Descriptor { desc_bind, desc_ty, .. } => {
                use spirq::ty::DescriptorType;
                let sampled = matches!(
                    desc_ty,
                    DescriptorType::CombinedImageSampler() | DescriptorType::SampledImage()
                );
                if sampled && desc_bind.set() == 0 {
                    reflection.sampled_bindings.push(desc_bind.bind());
                }
            }
            _ => {}
        }
    }
    reflection.sampled_bindings.sort_unstable();
    reflection.sampled_bindings.dedup();
    Ok(reflection)
}

pub struct ShaderModule {
    pub(crate) module: vk::ShaderModule,
    pub(crate) entry_point: CString,
    pub(crate) reflection: StageReflection,
}

impl ShaderModule {
    fn new(ctx: &GpuContext, shader_name: &str, stage: ShaderStage, desc: &ShaderModuleDesc) -> Result<Self> {
        let words = desc.words()?;
        let reflection = reflect_stage(&words, &desc.entry_point)?;
        let entry_point = CString::new(desc.entry_point.as_str())
            .map_err(|_| engine_err!("mrt::vulkan", "shader '{}' entry point contains a NUL byte", shader_name))?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);
        let module = unsafe { ctx.device.create_shader_module(&create_info, None) }
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to create {:?} module of shader '{}': {:?}", stage, shader_name, e))?;

        Ok(Self { module, entry_point, reflection })
    }
}

pub struct VulkanShader {
    ctx: Arc<GpuContext>,
    pub(crate) name: String,
    pub(crate) vertex: ShaderModule,
    pub(crate) fragment: ShaderModule,
}

impl VulkanShader {
    pub fn new(ctx: &Arc<GpuContext>, desc: &ShaderDesc) -> Result<Self> {
        desc.validate()?;
        let vertex = ShaderModule::new(ctx, &desc.name, ShaderStage::Vertex, &desc.vertex)?;
        let fragment = match ShaderModule::new(ctx, &desc.name, ShaderStage::Fragment, &desc.fragment) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { ctx.device.destroy_shader_module(vertex.module, None) };
                return Err(e);
            }
        };

        engine_debug!("mrt::vulkan", "Shader '{}': vs uniforms {} bytes, fs uniforms {} bytes, {} texture(s)",
            desc.name,
            vertex.reflection.push_constant_size,
            fragment.reflection.push_constant_size,
            fragment.reflection.sampled_bindings.len());

        Ok(Self {
            ctx: Arc::clone(ctx),
            name: desc.name.clone(),
            vertex,
            fragment,
        })
    }

    pub fn stage(&self, stage: ShaderStage) -> &ShaderModule {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.vertex.module, None);
            self.ctx.device.destroy_shader_module(self.fragment.module, None);
        }
    }
}
