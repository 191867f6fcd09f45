use docopt::Docopt;
use log::{info, warn};
use serde_derive::Deserialize;
use layered_mazes::{
    cells::{Cartesian2DCoordinate, CoordinateSmallVec, MaskFilter},
    config::{MazeConfig, ShapeConfig},
    generators::Algorithm,
    grid::Grid,
    grid_displays::{DisplayedGrid, GridDisplay, PathDisplay, StartEndPointsDisplay},
    maze,
    pathing,
};
use std::fs;

const USAGE: &str = "Layered Mazes

Usage:
    layered_mazes_driver -h | --help
    layered_mazes_driver --config=<path> [options]
    layered_mazes_driver [--algorithm=<name>] [(--grid-size=<n>|--grid-width=<w> --grid-height=<h>|--layout-file=<path>)] [options]

Options:
    -h --help              Show this screen.
    --config=<path>        TOML maze configuration. Command line seed, braid and pruning flags override it.
    --algorithm=<name>     binary-tree, sidewinder, aldous-broder, wilson, hunt-and-kill, recursive-backtracker
                           or link-all [default: recursive-backtracker].
    --grid-size=<n>        The grid size is n * n.
    --grid-width=<w>       The grid width in a w*h grid [default: 20].
    --grid-height=<h>      The grid height in a w*h grid [default: 20].
    --layout-file=<path>   Text layer layout, one character per cell, northern row first.
                           '#' excluded, '.' unassigned, '1'-'9' and 'a'-'z' layers.
    --seed=<n>             Seed for the random number generator. Random if not given.
    --braid=<percent>      Link this percentage of dead ends to a neighbour.
    --remove-dead-ends     Prune every dead end corridor back to its junction.
    --step-limit=<n>       Give up random walk generation after n steps.
    --text-out=<path>      Output file path for the textual rendering of the maze.
    --show-distances       Show the distance from the start point to all other points on the grid.
    --show-path            Show the path from the start to end point.
    --mark-start-end       Mark the start 'S' and end 'E' points.
    --start-point-x=<x>    x coordinate of the path start
    --start-point-y=<y>    y coordinate of the path start
    --end-point-x=<e1>     x coordinate of the path end
    --end-point-y=<e2>     y coordinate of the path end
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_config: Option<String>,
    flag_algorithm: String,
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_layout_file: Option<String>,
    flag_seed: Option<u64>,
    flag_braid: Option<u8>,
    flag_remove_dead_ends: bool,
    flag_step_limit: Option<usize>,
    flag_text_out: String,
    flag_show_distances: bool,
    flag_show_path: bool,
    flag_mark_start_end: bool,
    flag_start_point_x: Option<u32>,
    flag_start_point_y: Option<u32>,
    flag_end_point_x: Option<u32>,
    flag_end_point_y: Option<u32>,
}

// The driver's own errors, chaining the library's.
mod errors {
    #![allow(deprecated)]
    use error_chain::*;
    error_chain! {
        links {
            Maze(::layered_mazes::errors::Error, ::layered_mazes::errors::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let config = maze_config_from_args(&args)?;

    let generated = maze::generate(&config)?;
    info!("Generated maze with seed {}", generated.seed);
    let maze_grid = &generated.grid;

    let (start, end) = path_end_points(&args, maze_grid)?;
    let path = match (start, end) {
        (Some(s), Some(e)) if args.flag_show_path => match pathing::shortest_path(maze_grid, s, e) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("No path to show: {}", err);
                None
            }
        },
        _ => None,
    };
    let distances = match start {
        Some(s) if args.flag_show_distances => Some(pathing::Distances::<u32>::for_grid(maze_grid, s)?),
        _ => None,
    };
    let path_display = path.as_ref().map(|p| PathDisplay::new(p));
    let start_end_display = StartEndPointsDisplay::new(as_coordinate_smallvec(start), as_coordinate_smallvec(end));

    // Distances win over the path, which wins over the bare start and end markers.
    let display: Option<&dyn GridDisplay> = if let Some(ref d) = distances {
        Some(d as &dyn GridDisplay)
    } else if let Some(ref p) = path_display {
        Some(p as &dyn GridDisplay)
    } else if args.flag_mark_start_end {
        Some(&start_end_display as &dyn GridDisplay)
    } else {
        None
    };

    let text = DisplayedGrid::new(maze_grid, display).to_string();
    if args.flag_text_out.is_empty() {
        println!("{}", text);
    } else {
        fs::write(&args.flag_text_out, text)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn maze_config_from_args(args: &MazeArgs) -> Result<MazeConfig> {
    let mut config = if let Some(ref path) = args.flag_config {
        MazeConfig::from_file(path)?
    } else {
        let algorithm: Algorithm = args.flag_algorithm.parse()?;
        let shape = if let Some(ref layout_path) = args.flag_layout_file {
            let layout = fs::read_to_string(layout_path)
                .chain_err(|| format!("Failed to read layout file {}", layout_path))?;
            ShapeConfig::Layout { layout }
        } else if let Some(size) = args.flag_grid_size {
            ShapeConfig::Dimensions { width: size, height: size }
        } else {
            ShapeConfig::Dimensions { width: args.flag_grid_width, height: args.flag_grid_height }
        };
        MazeConfig {
            shape,
            ..MazeConfig::with_dimensions(1, 1, algorithm)
        }
    };

    if args.flag_seed.is_some() {
        config.seed = args.flag_seed;
    }
    if args.flag_braid.is_some() {
        config.braid_percentage = args.flag_braid;
    }
    if args.flag_step_limit.is_some() {
        config.step_limit = args.flag_step_limit;
    }
    config.remove_dead_ends |= args.flag_remove_dead_ends;
    config.validate()?;
    Ok(config)
}

/// The start and end of the path to display. Points not given on the command line come from
/// the longest path in the maze when any path output is asked for.
fn path_end_points(args: &MazeArgs,
                   maze_grid: &Grid)
                   -> Result<(Option<Cartesian2DCoordinate>, Option<Cartesian2DCoordinate>)> {
    let given_start = match (args.flag_start_point_x, args.flag_start_point_y) {
        (Some(x), Some(y)) => Some(Cartesian2DCoordinate::new(x, y)),
        _ => None,
    };
    let given_end = match (args.flag_end_point_x, args.flag_end_point_y) {
        (Some(x), Some(y)) => Some(Cartesian2DCoordinate::new(x, y)),
        _ => None,
    };

    let needs_points = args.flag_show_distances || args.flag_show_path || args.flag_mark_start_end;
    if !needs_points || (given_start.is_some() && given_end.is_some()) {
        return Ok((given_start, given_end));
    }

    let longest_path = match given_start.or_else(|| first_valid_cell(maze_grid)) {
        Some(origin) if given_start.is_some() => {
            let distances = pathing::Distances::<u32>::for_grid(maze_grid, origin)?;
            vec![origin, distances.furthest()]
        }
        Some(origin) => pathing::longest_path(maze_grid, origin)?,
        None => vec![],
    };

    Ok((given_start.or_else(|| longest_path.first().cloned()),
        given_end.or_else(|| longest_path.last().cloned())))
}

fn first_valid_cell(maze_grid: &Grid) -> Option<Cartesian2DCoordinate> {
    maze_grid.iter().find(|coord| maze_grid.cell_at(*coord, MaskFilter::Any).is_some())
}

fn as_coordinate_smallvec(coord: Option<Cartesian2DCoordinate>) -> CoordinateSmallVec {
    coord.into_iter().collect()
}
