//! Core data types for the inspector, focused on GPU data representation.

/// Per-point vertex data. The row index is stored as a float so the whole
/// record is a single `vec4` attribute.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct PointVertex {
    /// Point position in world units.
    pub position: [f32; 3],
    /// 0-based row in the source file, used for color-by-row.
    pub row_index: f32,
}

/// A colored vertex for overlay geometry: pick markers, the measurement
/// segment, and the axis gizmo.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct MarkerVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Per-frame uniform block, laid out with 16-byte rows (std140 compatible).
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct FrameUniform {
    /// Combined `projection * camera * world` matrix, column-major.
    pub view: [[f32; 4]; 4],
    pub bounds_min: [f32; 3],
    pub point_count: f32,
    pub bounds_max: [f32; 3],
    /// Point sprite size in pixels.
    pub point_size: f32,
    /// Plane `(0, 0, 1, front)`; points with a negative distance are clipped.
    pub front_clip_plane: [f32; 4],
    /// Plane `(0, 0, -1, rear)`.
    pub rear_clip_plane: [f32; 4],
    /// `ColorMode` discriminant.
    pub color_mode: f32,
    pub _pad: [f32; 3],
}
