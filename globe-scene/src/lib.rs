pub mod axis_aligned_bounding_box;
pub mod ellipsoid;
pub mod geodetic;
pub mod geodetic_patch;
pub mod math;
pub mod tile_index;

pub use axis_aligned_bounding_box::*;
pub use ellipsoid::*;
pub use geodetic::*;
pub use geodetic_patch::*;
pub use tile_index::*;
