//! Classification of finished cells into the tile shapes a renderer would place.

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, DirectionSmallVec, MaskFilter};
use crate::grid::Grid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TileShape {
    Isolated,
    DeadEnd,
    Corner,
    ThroughPassage,
    TJunction,
    CrossJunction,
    RoomDeadEnd,
    RoomCorner,
    RoomWall,
    RoomOpen,
    /// A fully open room cell with a doorway out of the room.
    RoomDoor,
    /// A room edge cell with a doorway out of the room.
    RoomCornerDoor,
}

/// The shape of a cell plus the direction it faces.
///
/// Facing depends on the shape: the open side of a dead end, the first open side clockwise of
/// a corner, North or East for a through passage, the closed side of a T-junction or room wall,
/// and the doorway side of a door. Fully open and isolated cells face nowhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub shape: TileShape,
    pub facing: Option<CompassPrimary>,
    pub open: DirectionSmallVec,
}

const CLOCKWISE: [CompassPrimary; 4] = [CompassPrimary::North,
                                        CompassPrimary::East,
                                        CompassPrimary::South,
                                        CompassPrimary::West];

fn clockwise_next(dir: CompassPrimary) -> CompassPrimary {
    match dir {
        CompassPrimary::North => CompassPrimary::East,
        CompassPrimary::East => CompassPrimary::South,
        CompassPrimary::South => CompassPrimary::West,
        CompassPrimary::West => CompassPrimary::North,
    }
}

/// The tile for a valid cell, None for coordinates off the grid or excluded.
pub fn tile_at(grid: &Grid, coord: Cartesian2DCoordinate) -> Option<Tile> {
    let cell = grid.cell_at(coord, MaskFilter::Any)?;
    let open: DirectionSmallVec = CLOCKWISE.iter()
        .cloned()
        .filter(|dir| grid.is_neighbour_linked(coord, *dir))
        .collect();
    let is_open = |dir: CompassPrimary| open.contains(&dir);

    let corner_facing = || open.iter().cloned().find(|dir| is_open(clockwise_next(*dir)));
    let closed_side = || CLOCKWISE.iter().cloned().find(|dir| !is_open(*dir));
    let doorway_side = || {
        open.iter().cloned().find(|dir| {
            grid.neighbour_at_direction(coord, *dir)
                .and_then(|n| grid.cell(n))
                .map_or(false, |n| !n.in_room())
        })
    };

    let (shape, facing) = match (cell.in_room(), cell.is_door(), open.len()) {
        (_, _, 0) => (TileShape::Isolated, None),
        (false, _, 1) => (TileShape::DeadEnd, open.first().cloned()),
        (false, _, 2) => {
            if is_open(CompassPrimary::North) && is_open(CompassPrimary::South) {
                (TileShape::ThroughPassage, Some(CompassPrimary::North))
            } else if is_open(CompassPrimary::East) && is_open(CompassPrimary::West) {
                (TileShape::ThroughPassage, Some(CompassPrimary::East))
            } else {
                (TileShape::Corner, corner_facing())
            }
        }
        (false, _, 3) => (TileShape::TJunction, closed_side()),
        (false, _, _) => (TileShape::CrossJunction, None),
        (true, true, 4) => (TileShape::RoomDoor, doorway_side()),
        (true, true, 3) => (TileShape::RoomCornerDoor, doorway_side()),
        (true, _, 1) => (TileShape::RoomDeadEnd, open.first().cloned()),
        (true, _, 2) => (TileShape::RoomCorner, corner_facing()),
        (true, _, 3) => (TileShape::RoomWall, closed_side()),
        (true, _, _) => (TileShape::RoomOpen, None),
    };

    Some(Tile { shape, facing, open })
}

/// Tiles for every valid cell, row-major.
pub fn tiles(grid: &Grid) -> Vec<(Cartesian2DCoordinate, Tile)> {
    grid.iter().filter_map(|coord| tile_at(grid, coord).map(|tile| (coord, tile))).collect()
}
