use crate::camera::{CameraConfig, CAMERA_STEP};
use crate::frame::ColorMode;
use crate::picker::{PickerConfig, DEFAULT_PICK_THRESHOLD};
use crate::projector::ProjectionConfig;
use clap::Parser;
use std::path::PathBuf;

/// `cloud-inspector` - headless point-cloud inspection.
///
/// Loads an ASCII PLY file, sets up the default camera, and optionally
/// picks points at the given viewport pixels, printing the measuring-tool
/// readout.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct InspectorConfig {
    /// The ASCII PLY file to inspect.
    #[arg(env = "INSPECTOR_PLY_PATH")]
    pub ply_path: PathBuf,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Rotation precision: internal angle units per degree.
    #[arg(long, env = "INSPECTOR_PRECISION", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub precision: u32,

    /// Translation applied by one camera step, in world units.
    #[arg(long, default_value_t = CAMERA_STEP)]
    pub camera_step: f64,

    /// Maximum world distance between the picking ray hit and a point.
    #[arg(long, env = "INSPECTOR_PICK_THRESHOLD", default_value_t = DEFAULT_PICK_THRESHOLD)]
    pub pick_threshold: f64,

    /// Point sprite size in pixels.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub point_size: u32,

    /// Coloring of the cloud.
    #[arg(long, value_enum, default_value_t = ColorMode::ByZ)]
    pub color_mode: ColorMode,

    /// Viewport pixel `x,y` to pick; repeat for several picks.
    #[arg(long = "pick", value_parser = parse_pixel)]
    pub picks: Vec<(f64, f64)>,
}

fn parse_pixel(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok((x, y))
}

/// Settings for one inspector session, independent of how they were supplied.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub picker: PickerConfig,
    pub point_size: u32,
    pub color_mode: ColorMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            picker: PickerConfig::default(),
            point_size: 1,
            color_mode: ColorMode::ByZ,
        }
    }
}

impl InspectorConfig {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            width: self.width,
            height: self.height,
            camera: CameraConfig {
                precision: self.precision,
                step: self.camera_step,
            },
            projection: ProjectionConfig::default(),
            picker: PickerConfig {
                threshold: self.pick_threshold,
            },
            point_size: self.point_size,
            color_mode: self.color_mode,
        }
    }
}
