use crate::data::types::PointVertex;
use anyhow::{Context, Result};
use plyxyz::PointCloud;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Read a PLY file from disk. The typed `plyxyz::FormatError` stays reachable
/// through `anyhow::Error::downcast_ref`.
pub fn load_point_cloud(path: &Path) -> Result<Arc<PointCloud>> {
    let cloud = plyxyz::read_file(path)
        .with_context(|| format!("failed to load point cloud {}", path.display()))?;

    let b = cloud.bounds();
    let (c, e) = (b.center(), b.extent());
    log::info!(
        "PLY {:?}: pts={}, AABB=min({:.3},{:.3},{:.3}) max({:.3},{:.3},{:.3}), center=({:.3},{:.3},{:.3}), extent=({:.3},{:.3},{:.3})",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("?"),
        cloud.len(),
        b.min[0], b.min[1], b.min[2],
        b.max[0], b.max[1], b.max[2],
        c[0], c[1], c[2],
        e[0], e[1], e[2],
    );

    Ok(Arc::new(cloud))
}

/// Flatten the cloud into the vertex layout the point pipeline consumes.
pub fn build_vertex_buffer(cloud: &PointCloud) -> Vec<PointVertex> {
    cloud
        .points()
        .par_iter()
        .map(|p| PointVertex {
            position: plyxyz::narrow(p.position),
            row_index: p.row_index as f32,
        })
        .collect()
}
