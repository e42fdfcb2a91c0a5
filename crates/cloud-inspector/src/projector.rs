//! Perspective projection, view transform, and screen <-> world mapping.

use crate::camera::CameraState;
use glam::{DMat4, DVec3, DVec4};

#[derive(Debug, Clone, Copy)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 70.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

/// A projected point in viewport pixels (top-left origin) plus its NDC depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Builds `T(position) * Rx * Ry * Rz` from a camera snapshot.
pub fn camera_transform(state: &CameraState) -> DMat4 {
    DMat4::from_translation(state.position)
        * DMat4::from_rotation_x(state.rotation.x.to_radians())
        * DMat4::from_rotation_y(state.rotation.y.to_radians())
        * DMat4::from_rotation_z(state.rotation.z.to_radians())
}

/// Intersects the line through `start` and `end` with the world `z = 0` plane.
/// `None` when the line runs parallel to the plane.
pub fn intersect_ground(start: DVec3, end: DVec3) -> Option<DVec3> {
    let direction = end - start;
    if direction.z == 0.0 {
        return None;
    }

    let t = -start.z / direction.z;
    let hit = start + direction * t;
    hit.is_finite().then_some(hit)
}

#[derive(Debug, Clone)]
pub struct ViewportProjector {
    config: ProjectionConfig,
    width: u32,
    height: u32,
    projection: DMat4,
    camera: DMat4,
    world: DMat4,
    view: DMat4,
}

impl ViewportProjector {
    pub fn new(config: ProjectionConfig, width: u32, height: u32) -> Self {
        let mut projector = Self {
            config,
            width: 0,
            height: 0,
            projection: DMat4::IDENTITY,
            camera: DMat4::IDENTITY,
            world: DMat4::IDENTITY,
            view: DMat4::IDENTITY,
        };
        projector.resize(width, height);
        projector
    }

    /// Recomputes the projection for a new viewport size. Zero-sized
    /// viewports (e.g. a minimized window) are ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::warn!("ignoring zero-sized viewport {}x{}", width, height);
            return false;
        }

        self.width = width;
        self.height = height;
        self.projection = DMat4::perspective_rh_gl(
            self.config.fov_y_deg.to_radians(),
            width as f64 / height as f64,
            self.config.near,
            self.config.far,
        );
        self.recompute();

        log::debug!("viewport resized to {}x{}", width, height);
        true
    }

    /// Refreshes the view transform from the latest camera snapshot.
    pub fn update(&mut self, state: &CameraState) {
        self.camera = camera_transform(state);
        self.recompute();
    }

    /// Replaces the world (model) transform. Identity unless a caller composes one.
    pub fn set_world_transform(&mut self, world: DMat4) {
        self.world = world;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = self.projection * self.camera * self.world;
    }

    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn projection(&self) -> DMat4 {
        self.projection
    }

    #[inline]
    pub fn camera_matrix(&self) -> DMat4 {
        self.camera
    }

    /// Combined `projection * camera * world`.
    #[inline]
    pub fn view(&self) -> DMat4 {
        self.view
    }

    /// Applies the view transform and the perspective divide.
    pub fn project_ndc(&self, world: DVec3) -> Option<DVec3> {
        let clip = self.view * world.extend(1.0);
        if clip.w == 0.0 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    pub fn project(&self, world: DVec3) -> Option<ScreenPoint> {
        let ndc = self.project_ndc(world)?;
        let (w, h) = (self.width as f64, self.height as f64);
        Some(ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * w,
            y: h - (ndc.y + 1.0) * 0.5 * h,
            depth: ndc.z,
        })
    }

    /// Maps a viewport pixel to the point where its view ray crosses the
    /// world `z = 0` plane.
    ///
    /// The ray runs from NDC depth `+1` to `-1`. Returns `None` for an unset
    /// viewport, a singular view transform, a homogeneous `w` of zero at
    /// either end, or a ray parallel to the plane.
    pub fn unproject(&self, x: f64, y: f64) -> Option<DVec3> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        if self.view.determinant() == 0.0 {
            return None;
        }

        let inverted = self.view.inverse();
        let (w, h) = (self.width as f64, self.height as f64);
        let ndc_x = 2.0 * x / w - 1.0;
        let ndc_y = 2.0 * (h - y) / h - 1.0;

        let start4 = inverted * DVec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let end4 = inverted * DVec4::new(ndc_x, ndc_y, -1.0, 1.0);
        if start4.w == 0.0 || end4.w == 0.0 {
            return None;
        }

        intersect_ground(start4.truncate() / start4.w, end4.truncate() / end4.w)
    }
}
