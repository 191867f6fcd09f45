use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

use crate::units::{ColumnIndex, ColumnLength, LayerId, RowIndex, RowLength};

/// A cell position on the grid. `x` is the column, `y` the row.
///
/// Row 0 is the southern edge of the grid and rows grow northward.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;
pub type CoordinateOptionSmallVec = SmallVec<[Option<Cartesian2DCoordinate>; 4]>;
pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, row_length: RowLength) -> Cartesian2DCoordinate {
        let RowLength(width) = row_length;
        Cartesian2DCoordinate::new((index % width) as u32, (index / width) as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Self {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Cartesian2DCoordinate::new(col as u32, row as u32)
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cartesian2DCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

impl CompassPrimary {
    /// Every direction in the order neighbours are visited and random choices are drawn.
    pub const ALL: [CompassPrimary; 4] = [
        CompassPrimary::North,
        CompassPrimary::South,
        CompassPrimary::East,
        CompassPrimary::West,
    ];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    /// Creates a new coordinate offset 1 cell away in this direction.
    /// Returns None if the offset leaves a `width` * `height` grid.
    pub fn offset_coordinate(self,
                             coord: Cartesian2DCoordinate,
                             width: RowLength,
                             height: ColumnLength)
                             -> Option<Cartesian2DCoordinate> {
        let (x, y) = (coord.x as usize, coord.y as usize);
        let (RowLength(w), ColumnLength(h)) = (width, height);
        if x >= w || y >= h {
            return None;
        }
        match self {
            CompassPrimary::North if y + 1 < h => Some(Cartesian2DCoordinate::new(coord.x, coord.y + 1)),
            CompassPrimary::South if y > 0 => Some(Cartesian2DCoordinate::new(coord.x, coord.y - 1)),
            CompassPrimary::East if x + 1 < w => Some(Cartesian2DCoordinate::new(coord.x + 1, coord.y)),
            CompassPrimary::West if x > 0 => Some(Cartesian2DCoordinate::new(coord.x - 1, coord.y)),
            _ => None,
        }
    }
}

/// The layer tag of a cell.
///
/// `Excluded` cells are invisible to every query. `Unassigned` cells belong to no layer
/// but are still valid cells of the grid.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub enum Mask {
    Excluded,
    Unassigned,
    Layer(LayerId),
}

impl Mask {
    /// Negative indices are excluded, 0 is unassigned and anything else names a layer.
    pub fn from_index(index: i32) -> Mask {
        match index {
            i if i < 0 => Mask::Excluded,
            0 => Mask::Unassigned,
            i => Mask::Layer(LayerId(i as u32)),
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Mask::Excluded => -1,
            Mask::Unassigned => 0,
            Mask::Layer(LayerId(id)) => id as i32,
        }
    }

    #[inline]
    pub fn is_excluded(self) -> bool {
        self == Mask::Excluded
    }

    pub fn layer(self) -> Option<LayerId> {
        match self {
            Mask::Layer(id) => Some(id),
            _ => None,
        }
    }
}

/// Restricts a grid query to a set of cells.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum MaskFilter {
    /// Every cell that is not excluded.
    Any,
    /// Only the cells tagged with this layer.
    Layer(LayerId),
}

impl MaskFilter {
    #[inline]
    pub fn admits(self, mask: Mask) -> bool {
        match self {
            MaskFilter::Any => !mask.is_excluded(),
            MaskFilter::Layer(id) => mask == Mask::Layer(id),
        }
    }
}

impl fmt::Display for MaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MaskFilter::Any => write!(f, "all layers"),
            MaskFilter::Layer(LayerId(id)) => write!(f, "layer {}", id),
        }
    }
}

/// A node of the grid graph.
///
/// Structural adjacency lives here as indices into the grid's cell arena, one slot per
/// `CompassPrimary` direction. Passages between cells live in the grid's passage graph.
#[derive(Clone, Debug)]
pub struct Cell {
    coordinate: Cartesian2DCoordinate,
    pub(crate) neighbours: [Option<usize>; 4],
    pub(crate) visited: bool,
    pub(crate) mask: Mask,
    pub(crate) region: Mask,
    pub(crate) in_room: bool,
    pub(crate) is_door: bool,
}

impl Cell {
    pub(crate) fn new(coordinate: Cartesian2DCoordinate, mask: Mask) -> Cell {
        Cell {
            coordinate,
            neighbours: [None; 4],
            visited: false,
            mask,
            region: mask,
            in_room: false,
            is_door: false,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Cartesian2DCoordinate {
        self.coordinate
    }

    #[inline]
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// The merged region label. Matches `mask` until regions are connected, after which
    /// every cell of a merged set carries the lowest mask of that set.
    #[inline]
    pub fn region(&self) -> Mask {
        self.region
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn in_room(&self) -> bool {
        self.in_room
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.is_door
    }

    #[inline]
    pub fn has_neighbour(&self, direction: CompassPrimary) -> bool {
        self.neighbours[direction.slot()].is_some()
    }

    #[inline]
    pub(crate) fn neighbour_index(&self, direction: CompassPrimary) -> Option<usize> {
        self.neighbours[direction.slot()]
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn opposite_directions() {
        for dir in CompassPrimary::ALL.iter() {
            assert_ne!(*dir, dir.opposite());
            assert_eq!(*dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn north_grows_the_row() {
        let (w, h) = (RowLength(3), ColumnLength(3));
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert_eq!(CompassPrimary::North.offset_coordinate(gc(1, 1), w, h), Some(gc(1, 2)));
        assert_eq!(CompassPrimary::South.offset_coordinate(gc(1, 1), w, h), Some(gc(1, 0)));
        assert_eq!(CompassPrimary::East.offset_coordinate(gc(1, 1), w, h), Some(gc(2, 1)));
        assert_eq!(CompassPrimary::West.offset_coordinate(gc(1, 1), w, h), Some(gc(0, 1)));
    }

    #[test]
    fn offsets_off_the_grid_are_none() {
        let (w, h) = (RowLength(2), ColumnLength(2));
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert_eq!(CompassPrimary::South.offset_coordinate(gc(0, 0), w, h), None);
        assert_eq!(CompassPrimary::West.offset_coordinate(gc(0, 0), w, h), None);
        assert_eq!(CompassPrimary::North.offset_coordinate(gc(1, 1), w, h), None);
        assert_eq!(CompassPrimary::East.offset_coordinate(gc(1, 1), w, h), None);
        assert_eq!(CompassPrimary::East.offset_coordinate(gc(5, 5), w, h), None);
    }

    #[test]
    fn mask_index_round_trip() {
        assert_eq!(Mask::from_index(-1), Mask::Excluded);
        assert_eq!(Mask::from_index(-7), Mask::Excluded);
        assert_eq!(Mask::from_index(0), Mask::Unassigned);
        assert_eq!(Mask::from_index(3), Mask::Layer(LayerId(3)));
        assert_eq!(Mask::Layer(LayerId(3)).index(), 3);
        assert_eq!(Mask::Excluded.index(), -1);
    }

    #[test]
    fn filters_never_admit_excluded_cells() {
        assert!(!MaskFilter::Any.admits(Mask::Excluded));
        assert!(!MaskFilter::Layer(LayerId(1)).admits(Mask::Excluded));
        assert!(MaskFilter::Any.admits(Mask::Unassigned));
        assert!(MaskFilter::Any.admits(Mask::Layer(LayerId(2))));
        assert!(!MaskFilter::Layer(LayerId(1)).admits(Mask::Unassigned));
        assert!(!MaskFilter::Layer(LayerId(1)).admits(Mask::Layer(LayerId(2))));
        assert!(MaskFilter::Layer(LayerId(2)).admits(Mask::Layer(LayerId(2))));
    }

    #[test]
    fn coordinate_from_row_major_index() {
        let c = Cartesian2DCoordinate::from_row_major_index(7, RowLength(3));
        assert_eq!(c, Cartesian2DCoordinate::new(1, 2));
    }
}
