//! Two-dimensional byte grid handed to rendering and export collaborators.
//!
//! A `Grid` stores `width * height` intensities in `0..=255` using row-major
//! layout. Unlike a toroidal field, coordinates are bounds-checked: reads
//! outside the grid return `None` and writes return
//! [`EngineError::OutOfBounds`].

use crate::error::EngineError;

/// A flat row-major grid of 8-bit intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Validates grid dimensions and returns the cell count.
///
/// Returns `EngineError::InvalidDimensions` if either dimension is zero or
/// if `width * height` overflows `usize`.
pub fn checked_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}

impl Grid {
    /// Creates a zero-filled grid.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, 0)
    }

    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Wraps an existing row-major buffer, validating its length.
    pub fn from_data(width: usize, height: usize, data: Vec<u8>) -> Result<Self, EngineError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the row-major cells.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the row-major cells.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Returns the intensity at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Sets the intensity at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Result<(), EngineError> {
        let i = self.index(x, y).ok_or(EngineError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.data[i] = value;
        Ok(())
    }

    /// Number of cells with non-zero intensity.
    pub fn lit_cells(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0).count()
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}
