use std::marker::PhantomData;

use bevy::prelude::*;

use crate::chunked_lod_globe::ChunkedLodGlobe;
use crate::render_data::RenderData;
use crate::renderer::GlobeRenderer;
use crate::stats::RenderStats;

/// Camera and model transform the globe is drawn with this frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct GlobeView(pub RenderData);

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LastRenderStats(pub RenderStats);

/// Updates and renders the `ChunkedLodGlobe` resource every frame with the `R`
/// resource as renderer. Both resources are inserted by the app.
pub struct GlobePlugin<R> {
    _renderer: PhantomData<fn() -> R>,
}
impl<R> Default for GlobePlugin<R> {
    fn default() -> Self {
        Self {
            _renderer: PhantomData,
        }
    }
}
impl<R: GlobeRenderer + Resource> Plugin for GlobePlugin<R> {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeView>()
            .init_resource::<LastRenderStats>()
            .add_systems(Update, render_globe_system::<R>);
    }
    fn name(&self) -> &str {
        "globe_lod_plugin"
    }
}

pub fn render_globe_system<R: GlobeRenderer + Resource>(
    view: Res<GlobeView>,
    globe: Option<ResMut<ChunkedLodGlobe>>,
    renderer: Option<ResMut<R>>,
    mut last_stats: ResMut<LastRenderStats>,
) {
    let (Some(mut globe), Some(mut renderer)) = (globe, renderer) else {
        return;
    };
    let renderer: &mut R = &mut renderer;
    globe.update(&view.0, &mut *renderer);
    last_stats.0 = globe.render(&view.0, &mut *renderer);
}
