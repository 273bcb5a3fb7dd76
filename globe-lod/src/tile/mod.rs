use std::sync::Arc;

use bevy::math::{DVec2, UVec2};
use globe_scene::TileIndex;

mod memory_tile_provider;
pub use memory_tile_provider::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileStatus {
    Ok,
    Pending,
    #[default]
    Unavailable,
}

/// Row-major texels, row 0 is the southern edge of the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileTexture {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}
impl TileTexture {
    pub fn new(width: u32, height: u32, texels: Vec<f32>) -> Self {
        Self {
            width,
            height,
            texels,
        }
    }
    pub fn dimensions(&self) -> UVec2 {
        return UVec2::new(self.width, self.height);
    }
    /// NaN when the coordinate is outside the texture.
    pub fn texel_as_float(&self, position: UVec2) -> f32 {
        if position.x >= self.width || position.y >= self.height {
            return f32::NAN;
        }
        let index = position.y as usize * self.width as usize + position.x as usize;
        return self.texels.get(index).copied().unwrap_or(f32::NAN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMetaData {
    pub min_value: f32,
    pub max_value: f32,
    pub has_missing_data: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub status: TileStatus,
    pub texture: Option<Arc<TileTexture>>,
    pub meta_data: Option<TileMetaData>,
}
impl Tile {
    pub fn ok(texture: TileTexture, meta_data: Option<TileMetaData>) -> Self {
        Self {
            status: TileStatus::Ok,
            texture: Some(Arc::new(texture)),
            meta_data,
        }
    }
    pub fn pending() -> Self {
        Self {
            status: TileStatus::Pending,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileUvTransform {
    pub uv_offset: DVec2,
    pub uv_scale: DVec2,
}
impl Default for TileUvTransform {
    fn default() -> Self {
        Self {
            uv_offset: DVec2::ZERO,
            uv_scale: DVec2::ONE,
        }
    }
}
impl TileUvTransform {
    /// Moves the transform from `index` to its parent.
    pub fn ascend(&mut self, index: &TileIndex) {
        self.uv_offset = self.uv_offset * 0.5 + index.position_relative_parent();
        self.uv_scale *= 0.5;
    }
    pub fn apply(&self, uv: DVec2) -> DVec2 {
        return self.uv_offset + self.uv_scale * uv;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChunkTile {
    pub tile: Tile,
    pub uv_transform: TileUvTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDepthTransform {
    pub depth_scale: f32,
    pub depth_offset: f32,
}
impl Default for TileDepthTransform {
    fn default() -> Self {
        Self {
            depth_scale: 1.0,
            depth_offset: 0.0,
        }
    }
}
impl TileDepthTransform {
    pub fn apply(&self, raw: f32) -> f32 {
        return self.depth_offset + self.depth_scale * raw;
    }
}

/// Non-blocking view of pre-fetched tile state owned by a streaming subsystem.
pub trait TileProvider: Send + Sync {
    fn tile(&self, index: &TileIndex) -> Tile;
    fn tile_status(&self, index: &TileIndex) -> TileStatus {
        return self.tile(index).status;
    }
    fn depth_transform(&self) -> TileDepthTransform;
    fn no_data_value_as_float(&self) -> f32 {
        return f32::MIN;
    }
    fn max_level(&self) -> u32;
    /// Tile to use for `index`, possibly an ancestor's with the uv transform that
    /// maps the chunk into it.
    fn chunk_tile(&self, index: &TileIndex) -> ChunkTile {
        let mut index = *index;
        let mut uv_transform = TileUvTransform::default();
        let max_level = self.max_level().max(1);
        while index.level > max_level {
            let Some(parent) = index.parent() else {
                break;
            };
            uv_transform.ascend(&index);
            index = parent;
        }
        loop {
            let tile = self.tile(&index);
            if tile.status == TileStatus::Ok {
                return ChunkTile { tile, uv_transform };
            }
            match index.parent() {
                Some(parent) => {
                    uv_transform.ascend(&index);
                    index = parent;
                }
                None => {
                    return ChunkTile {
                        tile: Tile::default(),
                        uv_transform,
                    };
                }
            }
        }
    }
}
