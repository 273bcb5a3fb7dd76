use globe_scene::Ellipsoid;

use crate::config::{DebugProperties, GeneralProperties, GlobeConfig};
use crate::layer::LayerManager;

/// Globe state that chunks, evaluators and cullers read while the tree is updated.
#[derive(Debug, Clone)]
pub struct GlobeContext {
    pub ellipsoid: Ellipsoid,
    pub layer_manager: LayerManager,
    pub general: GeneralProperties,
    pub debug: DebugProperties,
    pub min_split_depth: u32,
    pub max_split_depth: u32,
}
impl GlobeContext {
    pub fn new(config: &GlobeConfig, layer_manager: LayerManager) -> Self {
        Self {
            ellipsoid: Ellipsoid::from_vec3(config.radii()),
            layer_manager,
            general: config.general.clone(),
            debug: config.debug.clone(),
            min_split_depth: config.min_split_depth,
            max_split_depth: config.max_split_depth,
        }
    }
}
impl Default for GlobeContext {
    fn default() -> Self {
        return GlobeContext::new(&GlobeConfig::default(), LayerManager::new());
    }
}
