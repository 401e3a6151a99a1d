//! The shared trail field agents deposit into and sense from.
//!
//! Two flat row-major buffers of `AtomicU8` hold the current intensities and
//! a scratch copy for the diffusion pass. Deposits and samples take `&self`
//! and use relaxed atomics, so agents on different threads can write the same
//! cell: every deposit stores 255, so the outcome never depends on order.
//! [`TrailField::diffuse`] takes `&mut self`, which the borrow checker keeps
//! from overlapping with any stepping agent.

use physarum_core::grid::checked_len;
use physarum_core::{EngineError, Grid};
use std::sync::atomic::{AtomicU8, Ordering};

/// Intensity written by a deposit.
pub const DEPOSIT: u8 = 255;

/// Sample value for probes too close to an edge to trust.
pub const OUT_OF_RANGE: i32 = -1;

/// Distance from every edge inside which [`TrailField::sample`] reports
/// [`OUT_OF_RANGE`].
pub const SENSOR_MARGIN: i64 = 10;

/// Default decay constant subtracted from the neighbour sum before averaging.
pub const DEFAULT_DECAY: u32 = 16;

/// Double-buffered intensity grid with a decay-then-average diffusion pass.
#[derive(Debug)]
pub struct TrailField {
    width: usize,
    height: usize,
    decay: u32,
    current: Vec<AtomicU8>,
    scratch: Vec<AtomicU8>,
}

fn zeroed(len: usize) -> Vec<AtomicU8> {
    std::iter::repeat_with(|| AtomicU8::new(0)).take(len).collect()
}

#[inline]
fn cell(buf: &[AtomicU8], i: usize) -> u32 {
    u32::from(buf[i].load(Ordering::Relaxed))
}

impl TrailField {
    /// Creates an all-zero field.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize, decay: u32) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            decay,
            current: zeroed(len),
            scratch: zeroed(len),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The decay constant `S` applied by [`TrailField::diffuse`].
    pub fn decay(&self) -> u32 {
        self.decay
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let inside = x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64;
        inside.then(|| y as usize * self.width + x as usize)
    }

    /// Sets `(x, y)` to [`DEPOSIT`] if it lies inside the grid.
    pub fn deposit(&self, x: i64, y: i64) {
        if let Some(i) = self.index(x, y) {
            self.current[i].store(DEPOSIT, Ordering::Relaxed);
        }
    }

    /// Reads `(x, y)` for steering.
    ///
    /// Returns [`OUT_OF_RANGE`] unless the cell lies at least
    /// [`SENSOR_MARGIN`] cells inside every edge.
    pub fn sample(&self, x: i64, y: i64) -> i32 {
        let (w, h) = (self.width as i64, self.height as i64);
        let trusted = x >= SENSOR_MARGIN
            && x < w - SENSOR_MARGIN
            && y >= SENSOR_MARGIN
            && y < h - SENSOR_MARGIN;
        match self.index(x, y) {
            Some(i) if trusted => cell(&self.current, i) as i32,
            _ => OUT_OF_RANGE,
        }
    }

    /// Raw bounds-checked read with no edge margin.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height)
            .then(|| self.current[y * self.width + x].load(Ordering::Relaxed))
    }

    /// Runs one decay-then-average pass and swaps the buffers.
    ///
    /// Every interior cell becomes `(N - S) / 4`, where `N` is the sum of its
    /// four orthogonal neighbours and `S` the decay constant, or 0 when
    /// `N <= S`. Every border cell becomes 0.
    pub fn diffuse(&mut self) {
        let (w, h) = (self.width, self.height);
        let decay = self.decay;
        let src = &self.current;
        let dst = &mut self.scratch;

        if w >= 3 && h >= 3 {
            for y in 1..h - 1 {
                let row = y * w;
                for x in 1..w - 1 {
                    let i = row + x;
                    let n = cell(src, i - w) + cell(src, i + w) + cell(src, i - 1) + cell(src, i + 1);
                    // n <= 4 * 255, so the quotient always fits in a byte.
                    *dst[i].get_mut() = (n.saturating_sub(decay) / 4) as u8;
                }
            }
        }

        for x in 0..w {
            *dst[x].get_mut() = 0;
            *dst[(h - 1) * w + x].get_mut() = 0;
        }
        for y in 0..h {
            *dst[y * w].get_mut() = 0;
            *dst[y * w + w - 1].get_mut() = 0;
        }

        std::mem::swap(&mut self.current, &mut self.scratch);
    }

    /// Replaces the current intensities with the contents of `grid`.
    pub fn load(&mut self, grid: &Grid) -> Result<(), EngineError> {
        self.check_dimensions(grid)?;
        for (c, &v) in self.current.iter_mut().zip(grid.data()) {
            *c.get_mut() = v;
        }
        Ok(())
    }

    /// Copies the current intensities into `grid`, reusing its allocation.
    pub fn copy_into(&self, grid: &mut Grid) -> Result<(), EngineError> {
        self.check_dimensions(grid)?;
        for (out, c) in grid.data_mut().iter_mut().zip(&self.current) {
            *out = c.load(Ordering::Relaxed);
        }
        Ok(())
    }

    /// Returns a fresh [`Grid`] holding the current intensities.
    pub fn snapshot(&self) -> Result<Grid, EngineError> {
        let data = self
            .current
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect();
        Grid::from_data(self.width, self.height, data)
    }

    /// Number of cells with non-zero intensity.
    pub fn lit_cells(&self) -> usize {
        self.current
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) > 0)
            .count()
    }

    fn check_dimensions(&self, grid: &Grid) -> Result<(), EngineError> {
        if grid.width() != self.width || grid.height() != self.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: grid.width(),
                rhs_h: grid.height(),
            });
        }
        Ok(())
    }
}
