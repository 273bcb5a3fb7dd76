use std::collections::HashMap;

use globe_scene::TileIndex;

use super::{Tile, TileDepthTransform, TileMetaData, TileProvider, TileStatus, TileTexture};

/// Provider over tiles that are already resident in memory.
#[derive(Debug, Clone)]
pub struct MemoryTileProvider {
    tiles: HashMap<TileIndex, Tile>,
    depth_transform: TileDepthTransform,
    no_data_value: f32,
    max_level: u32,
}
impl Default for MemoryTileProvider {
    fn default() -> Self {
        Self {
            tiles: HashMap::new(),
            depth_transform: TileDepthTransform::default(),
            no_data_value: f32::MIN,
            max_level: 22,
        }
    }
}
impl MemoryTileProvider {
    pub fn new() -> Self {
        return Self::default();
    }
    pub fn with_depth_transform(mut self, depth_transform: TileDepthTransform) -> Self {
        self.depth_transform = depth_transform;
        return self;
    }
    pub fn with_no_data_value(mut self, no_data_value: f32) -> Self {
        self.no_data_value = no_data_value;
        return self;
    }
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        return self;
    }
    pub fn insert(&mut self, index: TileIndex, tile: Tile) {
        self.tiles.insert(index, tile);
    }
    /// Inserts a ready tile, deriving its value range from the texels.
    pub fn insert_texture(&mut self, index: TileIndex, texture: TileTexture) {
        let meta_data = self.compute_meta_data(&texture);
        self.insert(index, Tile::ok(texture, meta_data));
    }
    pub fn insert_pending(&mut self, index: TileIndex) {
        self.insert(index, Tile::pending());
    }
    pub fn remove(&mut self, index: &TileIndex) -> Option<Tile> {
        return self.tiles.remove(index);
    }
    pub fn len(&self) -> usize {
        return self.tiles.len();
    }
    pub fn is_empty(&self) -> bool {
        return self.tiles.is_empty();
    }
    fn compute_meta_data(&self, texture: &TileTexture) -> Option<TileMetaData> {
        let mut min_value = f32::MAX;
        let mut max_value = f32::MIN;
        let mut has_missing_data = false;
        for texel in texture.texels.iter().copied() {
            if texel.is_nan() || texel == self.no_data_value {
                has_missing_data = true;
                continue;
            }
            min_value = min_value.min(texel);
            max_value = max_value.max(texel);
        }
        if min_value > max_value {
            return None;
        }
        Some(TileMetaData {
            min_value,
            max_value,
            has_missing_data,
        })
    }
}
impl TileProvider for MemoryTileProvider {
    fn tile(&self, index: &TileIndex) -> Tile {
        if index.level > self.max_level {
            return Tile::default();
        }
        return self.tiles.get(index).cloned().unwrap_or_default();
    }
    fn tile_status(&self, index: &TileIndex) -> TileStatus {
        if index.level > self.max_level {
            return TileStatus::Unavailable;
        }
        return self
            .tiles
            .get(index)
            .map(|tile| tile.status)
            .unwrap_or(TileStatus::Unavailable);
    }
    fn depth_transform(&self) -> TileDepthTransform {
        return self.depth_transform;
    }
    fn no_data_value_as_float(&self) -> f32 {
        return self.no_data_value;
    }
    fn max_level(&self) -> u32 {
        return self.max_level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_data_skips_missing_texels() {
        let mut provider = MemoryTileProvider::new().with_no_data_value(-9999.0);
        let index = TileIndex::new(0, 0, 2);
        provider.insert_texture(
            index,
            TileTexture::new(2, 2, vec![5.0, -9999.0, f32::NAN, -3.0]),
        );
        let tile = provider.tile(&index);
        assert_eq!(tile.status, TileStatus::Ok);
        let meta = tile.meta_data.unwrap();
        assert_eq!(meta.min_value, -3.0);
        assert_eq!(meta.max_value, 5.0);
        assert!(meta.has_missing_data);
    }
    #[test]
    fn statuses() {
        let mut provider = MemoryTileProvider::new().with_max_level(3);
        let pending = TileIndex::new(1, 0, 2);
        provider.insert_pending(pending);
        assert_eq!(provider.tile_status(&pending), TileStatus::Pending);
        assert_eq!(
            provider.tile_status(&TileIndex::new(0, 0, 2)),
            TileStatus::Unavailable
        );
        let too_deep = TileIndex::new(0, 0, 4);
        provider.insert_texture(too_deep, TileTexture::new(1, 1, vec![1.0]));
        assert_eq!(provider.tile_status(&too_deep), TileStatus::Unavailable);
        assert_eq!(provider.len(), 2);
    }
}
