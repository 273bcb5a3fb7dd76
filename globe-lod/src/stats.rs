use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStats {
    pub chunk_nodes: usize,
    pub leaf_chunk_nodes: usize,
    pub rendered_chunks: usize,
    pub culled_chunks: usize,
    pub max_rendered_level: u32,
    pub rendered_labels: usize,
    pub culled_labels: usize,
    pub render_time: Duration,
}
impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes {} leaves {} rendered {} culled {} max level {} labels {}/{} in {:?}",
            self.chunk_nodes,
            self.leaf_chunk_nodes,
            self.rendered_chunks,
            self.culled_chunks,
            self.max_rendered_level,
            self.rendered_labels,
            self.rendered_labels + self.culled_labels,
            self.render_time
        )
    }
}
