//! PNG export of a [`Grid`].
//!
//! Feature-gated behind `png` (default on) so embedders that only need the
//! simulation do not pull in the `image` crate.

use physarum_core::{EngineError, Grid};
use std::path::Path;

use crate::pixel::grid_to_rgba;

/// Writes a grid as a grayscale PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the grid dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(grid: &Grid, path: &Path) -> Result<(), EngineError> {
    let rgba = grid_to_rgba(grid);
    let w = u32::try_from(grid.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(grid.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}
