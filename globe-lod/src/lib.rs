pub mod chunk;
pub mod chunked_lod_globe;
pub mod config;
pub mod context;
pub mod error;
pub mod labels;
pub mod layer;
pub mod plugin;
pub mod render_data;
pub mod renderer;
pub mod stats;
pub mod tile;

pub use chunked_lod_globe::*;
pub use config::*;
pub use context::*;
pub use error::{Error, Result};
pub use plugin::*;
pub use render_data::*;
pub use renderer::*;
pub use stats::*;
