//! Occupancy rasters holding skeleton traces.

mod thinning;

pub use thinning::thin;

use crate::error::{Result, TopologyError};
use crate::math::Voxel;

/// A 3D boolean occupancy grid of size `nx * ny * nz`.
///
/// `y` is the vertical axis. Planar masks are rasters with `ny == 1`,
/// rows running along `z` and columns along `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    dims: [usize; 3],
    cells: Vec<bool>,
}

impl Raster {
    /// Creates an empty raster.
    #[must_use]
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            dims: [nx, ny, nz],
            cells: vec![false; nx * ny * nz],
        }
    }

    /// Creates a raster from cells in `x`-fastest, then `y`, then `z` order.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidRaster` if the cell count does not
    /// match the dimensions.
    pub fn from_cells(dims: [usize; 3], cells: Vec<bool>) -> Result<Self> {
        let expected = dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .ok_or_else(|| TopologyError::InvalidRaster("dimensions overflow".into()))?;
        if cells.len() != expected {
            return Err(TopologyError::InvalidRaster(format!(
                "expected {expected} cells for {dims:?}, got {}",
                cells.len()
            ))
            .into());
        }
        Ok(Self { dims, cells })
    }

    /// Creates a planar raster (`ny == 1`) from rows along `z`.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidRaster` if the rows have unequal lengths.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let nx = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != nx) {
            return Err(TopologyError::InvalidRaster("rows have unequal lengths".into()).into());
        }
        let cells = rows.iter().flatten().copied().collect();
        Self::from_cells([nx, 1, rows.len()], cells)
    }

    /// Parses a planar raster from text: `#` marks foreground, anything else
    /// is background. Each non-blank line is one row along `z`; short lines
    /// are padded with background.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Raster::from_rows`].
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<Vec<bool>> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().map(|c| c == '#').collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let padded: Vec<Vec<bool>> = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, false);
                r
            })
            .collect();
        Self::from_rows(&padded)
    }

    /// Grid dimensions `[nx, ny, nz]`.
    #[must_use]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Returns `true` when no cell is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Number of foreground cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Linear index of `(x, y, z)`, or `None` when out of bounds.
    #[must_use]
    pub fn index(&self, x: i64, y: i64, z: i64) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        let x = usize::try_from(x).ok().filter(|&v| v < nx)?;
        let y = usize::try_from(y).ok().filter(|&v| v < ny)?;
        let z = usize::try_from(z).ok().filter(|&v| v < nz)?;
        Some(x + nx * (y + ny * z))
    }

    /// Grid position of a linear index.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn position(&self, index: usize) -> Voxel {
        let [nx, ny, _] = self.dims;
        let x = index % nx;
        let y = (index / nx) % ny;
        let z = index / (nx * ny);
        Voxel::new(x as i64, y as i64, z as i64)
    }

    /// Returns whether `(x, y, z)` is foreground; out-of-bounds is background.
    #[must_use]
    pub fn get(&self, x: i64, y: i64, z: i64) -> bool {
        self.index(x, y, z).is_some_and(|i| self.cells[i])
    }

    /// Sets `(x, y, z)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i64, y: i64, z: i64, value: bool) {
        if let Some(i) = self.index(x, y, z) {
            self.cells[i] = value;
        }
    }

    /// Iterates over foreground positions in linear index order.
    pub fn foreground(&self) -> impl Iterator<Item = Voxel> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(|(i, _)| self.position(i))
    }
}
