use serde::Serialize;

use crate::geometry::{Bounds, Point};

/// Sampled signal field
///
/// Row-major grid of cell values in dBm. `None` marks cells that no active
/// emitter reaches. Cell `(col, row)` covers
/// `[origin + col·cell_size, origin + (col+1)·cell_size)` horizontally and
/// is sampled at its centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    bounds: Bounds,
    cell_size: f64,
    columns: usize,
    rows: usize,
    values: Vec<Option<f64>>,
}

impl Grid {
    pub(crate) fn new(
        bounds: Bounds,
        cell_size: f64,
        columns: usize,
        rows: usize,
        values: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(values.len(), columns * rows);
        Self {
            bounds,
            cell_size,
            columns,
            rows,
            values,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value of a cell; `None` when out of range or without signal
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.values[row * self.columns + col]
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            self.bounds.origin_x + (col as f64 + 0.5) * self.cell_size,
            self.bounds.origin_y + (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Cell containing `point`, if it lies inside the grid
    pub fn cell_at(&self, point: &Point) -> Option<(usize, usize)> {
        let fx = (point.x - self.bounds.origin_x) / self.cell_size;
        let fy = (point.y - self.bounds.origin_y) / self.cell_size;
        if !(fx >= 0.0 && fy >= 0.0) {
            return None;
        }
        let (col, row) = (fx.floor() as usize, fy.floor() as usize);
        (col < self.columns && row < self.rows).then_some((col, row))
    }

    /// Nearest-cell lookup
    pub fn sample(&self, point: &Point) -> Option<f64> {
        self.cell_at(point).and_then(|(col, row)| self.get(col, row))
    }

    /// `(col, row, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Option<f64>)> + '_ {
        let columns = self.columns;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % columns, i / columns, *v))
    }

    /// True when no cell carries a signal value
    pub fn has_no_signal(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}
