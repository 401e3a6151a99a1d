//! Grayscale pixel buffer conversion from a byte [`Grid`].
//!
//! Always available (no feature gate) so callers that hand frames to their
//! own display layer can share the conversion with the `png` snapshot path.

use physarum_core::Grid;

/// Expands each cell intensity into an opaque gray RGBA8 pixel.
///
/// The buffer length is `width * height * 4`.
pub fn grid_to_rgba(grid: &Grid) -> Vec<u8> {
    grid.data().iter().flat_map(|&v| [v, v, v, 255u8]).collect()
}
