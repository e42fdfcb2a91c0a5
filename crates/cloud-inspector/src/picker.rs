//! Screen-space point picking and the two-point measuring tool.

use crate::observers::{Observers, SubscriptionId};
use crate::projector::ViewportProjector;
use glam::DVec3;
use plyxyz::{Point, PointCloud};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_PICK_THRESHOLD: f64 = 0.1;

/// Picks are kept in pairs; accepting a third starts a new pair.
pub const MAX_PICKED: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct PickerConfig {
    /// A point must lie strictly closer than this (world units) to be picked.
    pub threshold: f64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PICK_THRESHOLD,
        }
    }
}

/// Full pick history after a pick or a clear.
#[derive(Debug, Clone, PartialEq)]
pub struct PickEvent {
    pub history: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureReport {
    Empty,
    Single(Point),
    Pair {
        first: Point,
        second: Point,
        distance: f64,
    },
}

impl MeasureReport {
    pub fn distance(&self) -> Option<f64> {
        match self {
            MeasureReport::Pair { distance, .. } => Some(*distance),
            _ => None,
        }
    }
}

fn write_coords(f: &mut fmt::Formatter<'_>, p: &Point) -> fmt::Result {
    let [x, y, z] = p.position;
    writeln!(f, "({},  {},  {})", x, y, z)
}

impl fmt::Display for MeasureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureReport::Empty => Ok(()),
            MeasureReport::Single(p) => write_coords(f, p),
            MeasureReport::Pair {
                first,
                second,
                distance,
            } => {
                write_coords(f, first)?;
                write_coords(f, second)?;
                write!(f, "Distance:  {}", distance)
            }
        }
    }
}

/// Straight-line distance for exactly two points, coordinates for one, nothing otherwise.
pub fn distance_report(history: &[Point]) -> MeasureReport {
    match history {
        [p] => MeasureReport::Single(*p),
        [a, b] => MeasureReport::Pair {
            first: *a,
            second: *b,
            distance: DVec3::from(a.position).distance(DVec3::from(b.position)),
        },
        _ => MeasureReport::Empty,
    }
}

#[derive(Debug)]
pub struct PointPicker {
    cloud: Arc<PointCloud>,
    config: PickerConfig,
    enabled: bool,
    history: Vec<Point>,
    highlighted: Option<Point>,
    observers: Observers<PickEvent>,
}

impl PointPicker {
    /// Picking starts enabled.
    pub fn new(cloud: Arc<PointCloud>, config: PickerConfig) -> Self {
        Self {
            cloud,
            config,
            enabled: true,
            history: Vec::with_capacity(MAX_PICKED),
            highlighted: None,
            observers: Observers::new(),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PickEvent) + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops the hover highlight.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.highlighted = None;
        }
    }

    #[inline]
    pub fn history(&self) -> &[Point] {
        &self.history
    }

    #[inline]
    pub fn highlighted(&self) -> Option<Point> {
        self.highlighted
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub fn report(&self) -> MeasureReport {
        distance_report(&self.history)
    }

    /// Linear scan for the closest point strictly within the threshold.
    /// On equal distances the earlier point in file order wins.
    pub fn nearest(&self, query: DVec3) -> Option<Point> {
        let mut best_distance = self.config.threshold;
        let mut best = None;

        for point in self.cloud.points() {
            let distance = DVec3::from(point.position).distance(query);
            if distance < best_distance {
                best_distance = distance;
                best = Some(*point);
            }
        }

        best
    }

    /// Resolves a viewport pixel against the projector's current view.
    pub fn find_at(&self, projector: &ViewportProjector, x: f64, y: f64) -> Option<Point> {
        let query = projector.unproject(x, y)?;
        self.nearest(query)
    }

    /// Picks the point under `(x, y)` and appends it to the history.
    pub fn pick_at(&mut self, projector: &ViewportProjector, x: f64, y: f64) -> Option<Point> {
        if !self.enabled {
            return None;
        }

        let point = self.find_at(projector, x, y)?;
        if self.history.len() >= MAX_PICKED {
            self.history.clear();
        }
        self.history.push(point);

        log::debug!(
            "picked row {} at {:?} ({} in history)",
            point.row_index,
            point.position,
            self.history.len()
        );
        self.notify();
        Some(point)
    }

    /// Replaces the hover highlight with whatever is under `(x, y)`, possibly nothing.
    pub fn highlight_at(&mut self, projector: &ViewportProjector, x: f64, y: f64) -> Option<Point> {
        if !self.enabled {
            return None;
        }

        self.highlighted = self.find_at(projector, x, y);
        self.highlighted
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.notify();
    }

    fn notify(&self) {
        self.observers.emit(&PickEvent {
            history: self.history.clone(),
        });
    }
}
