/// Tuning constants and data directory resolution

use std::path::PathBuf;

/// Zoom multiplier bounds applied on top of the fit-to-stage scale
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom factor per wheel tick
pub const ZOOM_STEP: f32 = 1.05;

/// Clones are shifted by this many image pixels on both axes
pub const CLONE_OFFSET_PX: f32 = 20.0;

/// Smallest on-screen size a resize gesture may produce, in stage pixels
pub const MIN_ITEM_STAGE_SIZE: f32 = 10.0;

/// Stage size assumed until the canvas reports its bounds
pub const DEFAULT_STAGE_WIDTH: f32 = 800.0;
pub const DEFAULT_STAGE_HEIGHT: f32 = 600.0;

pub const DEFAULT_ITEM_COLOR: &str = "#6496FF";
pub const DEFAULT_ITEM_OPACITY: f32 = 0.7;

pub const LAYOUT_VERSION: u32 = 1;

/// Calibration clicks this far outside the image (in display pixels) are still clamped onto it
pub const CALIBRATION_TOLERANCE_PX: f32 = 1.0;

/// Pointer travel (stage pixels) before a background press becomes a pan
pub const PAN_THRESHOLD_PX: f32 = 3.0;

const DATA_DIR_ENV: &str = "FLOORPLAN_DATA_DIR";
const APP_DIR: &str = "floorplan-arranger";
const DB_FILE: &str = "floorplan.db";

/// Directory holding the catalog database
///
/// - `$FLOORPLAN_DATA_DIR` when set
/// - Linux: ~/.local/share/floorplan-arranger
/// - macOS: ~/Library/Application Support/floorplan-arranger
/// - Windows: %APPDATA%\floorplan-arranger
pub fn data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }

    let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
    path.push(APP_DIR);
    Some(path)
}

/// Full path of the catalog database file
pub fn db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DB_FILE))
}
