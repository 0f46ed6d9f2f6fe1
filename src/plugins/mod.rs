//! Demo plugins shipped with the host.

pub mod hello_cube;
pub mod picking;

use crate::error::Result;
use crate::plugin::PluginRegistry;

/// Registers every bundled plugin.
pub fn register_all(registry: &mut PluginRegistry) -> Result<()> {
    registry.register_plugin::<hello_cube::HelloCube>()?;
    registry.register_plugin::<picking::Picking>()?;
    Ok(())
}
