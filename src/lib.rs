//! **layered_mazes** builds mazes over rectangular grids whose cells may be split into layers,
//! each layer generated with its own algorithm and then stitched into one maze.

pub mod cells;
pub mod config;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod layers;
pub mod maze;
pub mod pathing;
pub mod regions;
pub mod tiles;
pub mod units;
pub mod utils;
