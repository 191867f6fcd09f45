use std::fmt;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec, MaskFilter};
use crate::grid::Grid;
use crate::pathing::{Distances, MaxDistance};
use crate::utils::{self, FnvHashSet};

/// Supplies the three character body of each cell when a grid is rendered as text.
pub trait GridDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String;
}

impl<MaxDistanceT> GridDisplay for Distances<MaxDistanceT>
    where MaxDistanceT: MaxDistance
{
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if let Some(d) = self.distance_from_start_to(coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Cartesian2DCoordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Cartesian2DCoordinate]) -> Self {
        let mut on_path_coordinates = utils::fnv_hashset(path.len());
        on_path_coordinates.extend(path.iter().cloned());
        PathDisplay { on_path_coordinates }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if self.start_coordinates.contains(&coord) {
            String::from(" S ")
        } else if self.end_coordinates.contains(&coord) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

/// A grid paired with an optional cell body overlay, ready for text output.
pub struct DisplayedGrid<'a> {
    grid: &'a Grid,
    display: Option<&'a dyn GridDisplay>,
}

impl<'a> DisplayedGrid<'a> {
    pub fn new(grid: &'a Grid, display: Option<&'a dyn GridDisplay>) -> DisplayedGrid<'a> {
        DisplayedGrid { grid, display }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&DisplayedGrid::new(self, None), f)
    }
}

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";
const EXCLUDED_BODY: &str = "▒▒▒";

/// The box drawing glyph joining the wall segments that leave a corner.
fn corner_glyph(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => WALL_LRUD,
        (true, true, true, false) => WALL_LRU,
        (true, true, false, true) => WALL_LRD,
        (true, false, true, true) => WALL_LUD,
        (false, true, true, true) => WALL_RUD,
        (true, true, false, false) => WALL_LR,
        (false, false, true, true) => WALL_UD,
        (false, true, true, false) => WALL_RU,
        (true, false, false, true) => WALL_LD,
        (true, false, true, false) => WALL_LU,
        (false, true, false, true) => WALL_RD,
        (true, false, false, false) => WALL_L,
        (false, true, false, false) => WALL_R,
        (false, false, true, false) => WALL_U,
        (false, false, false, true) => WALL_D,
        (false, false, false, false) => " ",
    }
}

/// North is drawn at the top, so rows are written from the highest row down to row 0.
/// Each cell draws its body, its eastern wall and its southern wall with the south east
/// corner; the northern boundary and western boundary are drawn once for the whole grid.
impl<'a> fmt::Display for DisplayedGrid<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let grid = self.grid;
        let columns_count = grid.width().0;
        let rows: Vec<Vec<Cartesian2DCoordinate>> = grid.iter_row().collect();
        let linked = |coord, dir| grid.is_neighbour_linked(coord, dir);

        // Northern boundary
        let mut output = String::from(WALL_RD);
        if let Some(north_row) = rows.last() {
            for (index, coord) in north_row.iter().enumerate() {
                output.push_str(WALL_LR_3);
                if linked(*coord, CompassPrimary::East) {
                    output.push_str(WALL_LR);
                } else if index == columns_count - 1 {
                    output.push_str(WALL_LD);
                } else {
                    output.push_str(WALL_LRD);
                }
            }
        }
        output.push('\n');

        for row in rows.iter().rev() {
            let is_south_row = row.first().map_or(true, |c| c.y == 0);
            let mut middle_section = String::from(WALL_UD);
            let mut bottom_section = String::new();

            for (index_column, cell_coord) in row.iter().cloned().enumerate() {
                let is_last_column = index_column == columns_count - 1;
                let east_open = linked(cell_coord, CompassPrimary::East);
                let south_open = linked(cell_coord, CompassPrimary::South);

                let body = if grid.cell_at(cell_coord, MaskFilter::Any).is_none() {
                    String::from(EXCLUDED_BODY)
                } else {
                    self.display.map_or_else(|| String::from("   "), |d| d.render_cell_body(cell_coord))
                };
                middle_section.push_str(&body);
                middle_section.push_str(if east_open { " " } else { WALL_UD });

                if index_column == 0 {
                    bottom_section.push_str(if is_south_row {
                        WALL_RU
                    } else if south_open {
                        WALL_UD
                    } else {
                        WALL_RUD
                    });
                }
                bottom_section.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_south_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        let access_se_from_east = grid.neighbour_at_direction(cell_coord, CompassPrimary::East)
                            .map_or(false, |c| linked(c, CompassPrimary::South));
                        let access_se_from_south = grid.neighbour_at_direction(cell_coord, CompassPrimary::South)
                            .map_or(false, |c| linked(c, CompassPrimary::East));
                        corner_glyph(!south_open, !access_se_from_east, !east_open, !access_se_from_south)
                    }
                };
                bottom_section.push_str(corner);
            }

            output.push_str(&middle_section);
            output.push('\n');
            output.push_str(&bottom_section);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}
