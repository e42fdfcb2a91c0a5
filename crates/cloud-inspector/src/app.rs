use crate::{
    camera::{clip_from_slider, CameraController, CameraEvent, CameraModel, CLIP_SLIDER_RANGE},
    config::{InspectorConfig, SessionConfig},
    data::point_cloud::load_point_cloud,
    frame::{ColorMode, FrameComposer, RenderBackend},
    input::{InputEvent, PointerButton},
    observers::SubscriptionId,
    picker::{MeasureReport, PointPicker},
    projector::ViewportProjector,
};
use anyhow::Result;
use glam::DVec3;
use plyxyz::{Point, PointCloud};
use std::{cell::Cell, rc::Rc, sync::Arc};

/// Initial camera position: slightly below and behind the origin.
pub const INITIAL_POSITION: DVec3 = DVec3::new(0.0, -0.1, -0.2);
/// Initial yaw (about Y), in degrees.
pub const INITIAL_YAW_DEG: f64 = 50.0;

/// One viewer session over a single loaded cloud.
pub struct InspectorSession {
    camera: Rc<CameraModel>,
    camera_subscription: SubscriptionId,
    controller: CameraController,
    projector: ViewportProjector,
    picker: PointPicker,
    composer: FrameComposer,
    cloud: Arc<PointCloud>,
    dirty: Rc<Cell<bool>>,
}

impl InspectorSession {
    pub fn open(config: &InspectorConfig) -> Result<Self> {
        let cloud = load_point_cloud(&config.ply_path)?;
        Ok(Self::with_cloud(cloud, &config.session()))
    }

    pub fn with_cloud(cloud: Arc<PointCloud>, config: &SessionConfig) -> Self {
        let camera = Rc::new(CameraModel::new(config.camera));

        let dirty = Rc::new(Cell::new(true));
        let camera_subscription = {
            let dirty = dirty.clone();
            camera.subscribe(move |event| {
                if let CameraEvent::Changed(_) = event {
                    dirty.set(true);
                }
            })
        };

        // Clip sliders start at their extremes: front nearly at the eye, rear at 1.0.
        camera.set_clip_distances(
            -clip_from_slider(1, CLIP_SLIDER_RANGE),
            clip_from_slider(CLIP_SLIDER_RANGE, CLIP_SLIDER_RANGE),
        );
        camera.set_position(INITIAL_POSITION);
        camera.rotate(0.0, INITIAL_YAW_DEG, 0.0);

        let mut projector = ViewportProjector::new(config.projection, config.width, config.height);
        projector.update(&camera.snapshot());

        let mut picker = PointPicker::new(cloud.clone(), config.picker);
        picker.set_enabled(false);

        let mut composer = FrameComposer::new(cloud.clone());
        composer.set_point_size(config.point_size);
        composer.set_color_mode(config.color_mode);

        log::debug!(
            "session ready: {} points, viewport {}x{}",
            cloud.len(),
            config.width,
            config.height
        );

        Self {
            camera,
            camera_subscription,
            controller: CameraController::new(),
            projector,
            picker,
            composer,
            cloud,
            dirty,
        }
    }

    /// Shared handle for UI collaborators (sliders, key bindings).
    pub fn camera(&self) -> Rc<CameraModel> {
        Rc::clone(&self.camera)
    }

    pub fn cloud(&self) -> &Arc<PointCloud> {
        &self.cloud
    }

    pub fn projector(&self) -> &ViewportProjector {
        &self.projector
    }

    pub fn picker(&self) -> &PointPicker {
        &self.picker
    }

    /// For subscribing to pick events.
    pub fn picker_mut(&mut self) -> &mut PointPicker {
        &mut self.picker
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty.get()
    }

    /// Brings the projector up to date with the latest camera pose.
    fn sync_projector(&mut self) {
        self.projector.update(&self.camera.snapshot());
    }

    pub fn set_picking_enabled(&mut self, enabled: bool) {
        self.picker.set_enabled(enabled);
        self.dirty.set(true);
    }

    pub fn clear_picks(&mut self) {
        self.picker.clear();
        self.dirty.set(true);
    }

    pub fn set_point_size(&mut self, size: u32) {
        self.composer.set_point_size(size);
        self.dirty.set(true);
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.composer.set_color_mode(mode);
        self.dirty.set(true);
    }

    pub fn pick_at(&mut self, x: f64, y: f64) -> Option<Point> {
        self.sync_projector();
        let picked = self.picker.pick_at(&self.projector, x, y);
        if picked.is_some() {
            self.dirty.set(true);
        }
        picked
    }

    pub fn measure(&self) -> MeasureReport {
        self.picker.report()
    }

    /// Routes one input event. Returns `true` if it was consumed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Resized { width, height } => {
                if self.projector.resize(width, height) {
                    self.dirty.set(true);
                }
                true
            }
            InputEvent::PointerPressed { x, y, button } => {
                self.controller.handle_event(event, &self.camera);
                if button == PointerButton::Left && self.picker.is_enabled() {
                    self.pick_at(x, y);
                }
                true
            }
            InputEvent::PointerMoved { x, y, .. } => {
                let consumed = self.controller.handle_event(event, &self.camera);
                if self.picker.is_enabled() {
                    self.sync_projector();
                    self.picker.highlight_at(&self.projector, x, y);
                    self.dirty.set(true);
                    return true;
                }
                consumed
            }
            _ => self.controller.handle_event(event, &self.camera),
        }
    }

    /// Draws one frame from the latest camera snapshot.
    pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        let state = self.camera.snapshot();
        self.projector.update(&state);

        let frame = self.composer.compose(&self.projector, &state, &self.picker);
        backend.draw(&frame)?;

        self.dirty.set(false);
        Ok(())
    }
}

impl Drop for InspectorSession {
    fn drop(&mut self) {
        self.camera.unsubscribe(self.camera_subscription);
    }
}
