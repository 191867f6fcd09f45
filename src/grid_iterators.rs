use std::fmt;

use crate::cells::Cartesian2DCoordinate;
use crate::units::{ColumnIndex, ColumnLength, RowIndex, RowLength};

/// Row-major iteration over every coordinate of a grid, row 0 first.
#[derive(Clone)]
pub struct CellIter {
    row_length: RowLength,
    current_cell_number: usize,
    cells_count: usize,
}

impl CellIter {
    pub(crate) fn new(row_length: RowLength, column_length: ColumnLength) -> CellIter {
        CellIter {
            row_length,
            current_cell_number: 0,
            cells_count: row_length.0 * column_length.0,
        }
    }
}

impl fmt::Debug for CellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Cartesian2DCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = Cartesian2DCoordinate::from_row_major_index(self.current_cell_number,
                                                                    self.row_length);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

/// Iteration over whole rows of a grid, row 0 first, each row west to east.
#[derive(Debug, Copy, Clone)]
pub struct RowIter {
    current_index: usize,
    row_length: RowLength,
    column_length: ColumnLength,
}

impl RowIter {
    pub(crate) fn new(row_length: RowLength, column_length: ColumnLength) -> RowIter {
        RowIter {
            current_index: 0,
            row_length,
            column_length,
        }
    }
}

impl ExactSizeIterator for RowIter {}
impl Iterator for RowIter {
    type Item = Vec<Cartesian2DCoordinate>;

    fn next(&mut self) -> Option<Self::Item> {
        let ColumnLength(rows_count) = self.column_length;
        if self.current_index < rows_count {
            let RowLength(length) = self.row_length;
            let row = self.current_index;
            let coords = (0..length)
                .map(|i| Cartesian2DCoordinate::from_row_column_indices(ColumnIndex(i), RowIndex(row)))
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.column_length.0 - self.current_index;
        (remaining, Some(remaining))
    }
}
