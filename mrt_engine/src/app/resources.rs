/// Application-owned resource arena

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, ResourceId};
use crate::{engine_debug, engine_error};

/// Every device resource created by the application, in creation order
///
/// Resources live from Init to Cleanup. Releasing happens in reverse
/// creation order, and a released arena is empty so releasing twice is harmless.
#[derive(Debug, Default)]
pub struct ResourceArena {
    owned: Vec<ResourceId>,
}

impl ResourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `id` and hand it back
    pub fn track<T>(&mut self, id: T) -> T
    where
        T: Into<ResourceId> + Copy,
    {
        let resource = id.into();
        engine_debug!("mrt::resources", "created {:?}", resource);
        self.owned.push(resource);
        id
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.owned.contains(&id)
    }

    /// Position to roll back to with [`rollback_to`](Self::rollback_to)
    pub fn mark(&self) -> usize {
        self.owned.len()
    }

    /// Release everything tracked after `mark`
    pub fn rollback_to(&mut self, device: &mut dyn GraphicsDevice, mark: usize) -> Result<usize> {
        let tail = self.owned.split_off(mark.min(self.owned.len()));
        release(device, tail)
    }

    /// Release every tracked resource and return how many were released
    ///
    /// All resources are attempted even if one fails. The first failure is returned.
    pub fn release_all(&mut self, device: &mut dyn GraphicsDevice) -> Result<usize> {
        let owned = std::mem::take(&mut self.owned);
        release(device, owned)
    }
}

fn release(device: &mut dyn GraphicsDevice, resources: Vec<ResourceId>) -> Result<usize> {
    let mut first_error = None;
    let mut released = 0;
    for id in resources.into_iter().rev() {
        match device.destroy(id) {
            Ok(()) => released += 1,
            Err(e) => {
                engine_error!("mrt::resources", "failed to release {:?}: {}", id, e);
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(released),
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
