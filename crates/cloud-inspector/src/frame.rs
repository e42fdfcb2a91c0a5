//! Per-frame assembly of everything a rendering backend draws.

use crate::camera::CameraState;
use crate::data::point_cloud::build_vertex_buffer;
use crate::data::types::{FrameUniform, MarkerVertex, PointVertex};
use crate::picker::PointPicker;
use crate::projector::ViewportProjector;
use plyxyz::{narrow, Point, PointCloud};
use std::sync::Arc;

pub const MIN_POINT_SIZE: u32 = 1;
pub const MAX_POINT_SIZE: u32 = 20;

const PICKED_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
const HIGHLIGHT_COLOR: [f32; 3] = [0.0, 1.0, 1.0];

/// Axis gizmo as a line list: X red, Y green, Z blue, each 0.05 long.
pub static AXIS_LINES: [MarkerVertex; 6] = [
    MarkerVertex { position: [0.0, 0.0, 0.0], color: [1.0, 0.0, 0.0] },
    MarkerVertex { position: [0.05, 0.0, 0.0], color: [1.0, 0.0, 0.0] },
    MarkerVertex { position: [0.0, 0.0, 0.0], color: [0.0, 1.0, 0.0] },
    MarkerVertex { position: [0.0, 0.05, 0.0], color: [0.0, 1.0, 0.0] },
    MarkerVertex { position: [0.0, 0.0, 0.0], color: [0.0, 0.0, 1.0] },
    MarkerVertex { position: [0.0, 0.0, 0.05], color: [0.0, 0.0, 1.0] },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[value(name = "row")]
    ByRow = 0,
    #[default]
    #[value(name = "z")]
    ByZ = 1,
}

/// Everything needed to draw one frame. Coordinates are world space unless
/// noted; the backend applies `uniform.view`.
#[derive(Debug)]
pub struct Frame<'a> {
    pub uniform: FrameUniform,
    pub points: &'a [PointVertex],
    /// 0–2 picked points, in pick order.
    pub picked: Vec<MarkerVertex>,
    /// Segment between the two picked points, when there are two.
    pub measure_segment: Option<[MarkerVertex; 2]>,
    pub highlight: Option<MarkerVertex>,
    pub axes: &'static [MarkerVertex],
}

/// A consumer of composed frames, e.g. a GPU renderer.
pub trait RenderBackend {
    fn draw(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;
}

fn marker(point: &Point, color: [f32; 3]) -> MarkerVertex {
    MarkerVertex {
        position: narrow(point.position),
        color,
    }
}

#[derive(Debug)]
pub struct FrameComposer {
    cloud: Arc<PointCloud>,
    vertices: Vec<PointVertex>,
    point_size: u32,
    color_mode: ColorMode,
}

impl FrameComposer {
    pub fn new(cloud: Arc<PointCloud>) -> Self {
        let vertices = build_vertex_buffer(&cloud);
        Self {
            cloud,
            vertices,
            point_size: MIN_POINT_SIZE,
            color_mode: ColorMode::default(),
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[PointVertex] {
        &self.vertices
    }

    #[inline]
    pub fn point_size(&self) -> u32 {
        self.point_size
    }

    /// Clamped to `MIN_POINT_SIZE..=MAX_POINT_SIZE`.
    pub fn set_point_size(&mut self, size: u32) {
        self.point_size = size.clamp(MIN_POINT_SIZE, MAX_POINT_SIZE);
    }

    #[inline]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub fn compose(
        &self,
        projector: &ViewportProjector,
        camera: &CameraState,
        picker: &PointPicker,
    ) -> Frame<'_> {
        let bounds = self.cloud.bounds();
        let uniform = FrameUniform {
            view: projector.view().as_mat4().to_cols_array_2d(),
            bounds_min: narrow(bounds.min),
            point_count: self.cloud.len() as f32,
            bounds_max: narrow(bounds.max),
            point_size: self.point_size as f32,
            front_clip_plane: [0.0, 0.0, 1.0, camera.front_clip_distance as f32],
            rear_clip_plane: [0.0, 0.0, -1.0, camera.rear_clip_distance as f32],
            color_mode: self.color_mode as u32 as f32,
            _pad: [0.0; 3],
        };

        let picked: Vec<MarkerVertex> = picker
            .history()
            .iter()
            .map(|p| marker(p, PICKED_COLOR))
            .collect();

        let measure_segment = match picked.as_slice() {
            [a, b] => Some([*a, *b]),
            _ => None,
        };

        Frame {
            uniform,
            points: &self.vertices,
            picked,
            measure_segment,
            highlight: picker.highlighted().map(|p| marker(&p, HIGHLIGHT_COLOR)),
            axes: &AXIS_LINES,
        }
    }
}

/// Backend that draws nothing and logs a one-line summary per frame.
#[derive(Debug, Default)]
pub struct LogBackend {
    frames: u64,
}

impl LogBackend {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for LogBackend {
    fn draw(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        self.frames += 1;
        log::debug!(
            "frame {}: points={}, picked={}, highlight={}, point_size={}",
            self.frames,
            frame.points.len(),
            frame.picked.len(),
            frame.highlight.is_some(),
            frame.uniform.point_size,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::PickerConfig;
    use crate::projector::ProjectionConfig;
    use glam::DVec3;

    fn fixture() -> (Arc<PointCloud>, ViewportProjector, CameraState) {
        let cloud = Arc::new(
            plyxyz::parse_ply(
                "ply\nelement vertex 3\nend_header\n0 0 0\n0.5 0 0\n-1 2 -3\n".as_bytes(),
            )
            .unwrap(),
        );
        let state = CameraState {
            position: DVec3::new(0.0, 0.0, -2.0),
            rotation: DVec3::ZERO,
            front_clip_distance: -0.25,
            rear_clip_distance: 0.75,
        };
        let mut projector = ViewportProjector::new(ProjectionConfig::default(), 800, 600);
        projector.update(&state);
        (cloud, projector, state)
    }

    #[test]
    fn uniform_carries_view_bounds_and_clip_planes() {
        let (cloud, projector, state) = fixture();
        let picker = PointPicker::new(cloud.clone(), PickerConfig::default());
        let mut composer = FrameComposer::new(cloud);
        composer.set_point_size(4);
        composer.set_color_mode(ColorMode::ByRow);

        let frame = composer.compose(&projector, &state, &picker);
        let u = frame.uniform;

        assert_eq!(u.view, projector.view().as_mat4().to_cols_array_2d());
        assert_eq!(u.bounds_min, [-1.0, 0.0, -3.0]);
        assert_eq!(u.bounds_max, [0.5, 2.0, 0.0]);
        assert_eq!(u.point_count, 3.0);
        assert_eq!(u.point_size, 4.0);
        assert_eq!(u.color_mode, 0.0);
        assert_eq!(u.front_clip_plane, [0.0, 0.0, 1.0, -0.25]);
        assert_eq!(u.rear_clip_plane, [0.0, 0.0, -1.0, 0.75]);
        assert_eq!(frame.points.len(), 3);
        assert_eq!(frame.axes.len(), 6);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }

    #[test]
    fn markers_follow_pick_state() {
        let (cloud, projector, state) = fixture();
        let mut picker = PointPicker::new(cloud.clone(), PickerConfig::default());
        let composer = FrameComposer::new(cloud.clone());

        let frame = composer.compose(&projector, &state, &picker);
        assert!(frame.picked.is_empty());
        assert!(frame.measure_segment.is_none());
        assert!(frame.highlight.is_none());

        for p in &cloud.points()[..2] {
            let s = projector.project(DVec3::from(p.position)).unwrap();
            picker.pick_at(&projector, s.x, s.y);
        }
        let s = projector.project(DVec3::ZERO).unwrap();
        picker.highlight_at(&projector, s.x, s.y);

        let frame = composer.compose(&projector, &state, &picker);
        assert_eq!(frame.picked.len(), 2);
        let segment = frame.measure_segment.unwrap();
        assert_eq!(segment[1].position, [0.5, 0.0, 0.0]);
        assert_eq!(segment[0].color, PICKED_COLOR);
        assert_eq!(frame.highlight.unwrap().color, HIGHLIGHT_COLOR);
    }

    #[test]
    fn point_size_is_clamped() {
        let (cloud, _, _) = fixture();
        let mut composer = FrameComposer::new(cloud);
        composer.set_point_size(0);
        assert_eq!(composer.point_size(), MIN_POINT_SIZE);
        composer.set_point_size(99);
        assert_eq!(composer.point_size(), MAX_POINT_SIZE);
    }

    #[test]
    fn log_backend_counts_frames() {
        let (cloud, projector, state) = fixture();
        let picker = PointPicker::new(cloud.clone(), PickerConfig::default());
        let composer = FrameComposer::new(cloud);
        let mut backend = LogBackend::default();

        backend
            .draw(&composer.compose(&projector, &state, &picker))
            .unwrap();
        assert_eq!(backend.frames(), 1);
    }
}
