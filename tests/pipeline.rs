use layered_mazes::{
    cells::{Cartesian2DCoordinate, MaskFilter},
    config::MazeConfig,
    generators::Algorithm,
    grid_displays::{DisplayedGrid, PathDisplay},
    maze,
    pathing,
    tiles::{self, TileShape},
};

const LAYERED_CONFIG: &str = r#"
seed = 2024
algorithm = "hunt-and-kill"

[shape]
layout = """
1111##2222
1111##2222
1111#.2222
3333333333
3333333333
"""

[[layers]]
layer = 1
algorithm = "wilson"

[[layers]]
layer = 2
algorithm = "link-all"

[[layers]]
layer = 3
algorithm = "sidewinder"
"#;

#[test]
fn layered_layout_becomes_one_connected_maze() {
    let config = MazeConfig::from_toml_str(LAYERED_CONFIG).unwrap();
    let generated = maze::generate(&config).unwrap();
    let grid = &generated.grid;

    assert_eq!(generated.seed, 2024);
    assert_eq!(grid.cell_count(MaskFilter::Any), 45);
    assert!(grid.is_connected(MaskFilter::Any));
    // layers 1, 2, 3 and the unassigned cell
    assert_eq!(generated.regions.regions, 4);
    assert_eq!(generated.regions.doorways, 3);
    assert_eq!(generated.regions.remaining, 1);

    // the link-all room keeps its interior fully open
    let room_centre = Cartesian2DCoordinate::new(7, 3);
    let tile = tiles::tile_at(grid, room_centre).unwrap();
    assert!(matches!(tile.shape, TileShape::RoomOpen | TileShape::RoomDoor));

    // excluded cells get no tile
    assert!(tiles::tile_at(grid, Cartesian2DCoordinate::new(4, 4)).is_none());
}

#[test]
fn every_algorithm_yields_a_perfect_maze_on_a_plain_grid() {
    for algorithm in Algorithm::ALL.iter().cloned().filter(|a| a.is_perfect()) {
        let mut config = MazeConfig::with_dimensions(9, 7, algorithm);
        config.seed = Some(17);
        let generated = maze::generate(&config).unwrap();
        assert_eq!(generated.grid.links_count(), 62, "{} is not a spanning tree", algorithm);
        assert!(generated.grid.is_connected(MaskFilter::Any), "{} left cells unreached", algorithm);
    }
}

#[test]
fn braided_and_pruned_mazes_still_have_a_longest_path() {
    let mut config = MazeConfig::with_dimensions(12, 12, Algorithm::RecursiveBacktracker);
    config.seed = Some(5);
    config.braid_percentage = Some(100);
    config.remove_dead_ends = true;

    let generated = maze::generate(&config).unwrap();
    let grid = &generated.grid;
    let braid = generated.braid.unwrap();
    assert_eq!(braid.target, braid.dead_ends);
    assert!(braid.removed > 0);
    assert!(braid.removed + braid.unbraidable <= braid.dead_ends);
    assert!(grid.dead_ends(MaskFilter::Any).is_empty());

    let origin = grid.iter().find(|c| grid.cell_at(*c, MaskFilter::Any).is_some()).unwrap();
    let path = pathing::longest_path(grid, origin).unwrap();
    assert!(path.len() >= 2);
    for pair in path.windows(2) {
        assert!(grid.is_linked(pair[0], pair[1]));
    }

    let shortest = pathing::shortest_path(grid, path[0], path[path.len() - 1]).unwrap();
    assert_eq!(shortest.len(), path.len());

    let display = PathDisplay::new(&shortest);
    let text = DisplayedGrid::new(grid, Some(&display)).to_string();
    assert_eq!(text.matches(" . ").count(), shortest.len());
}

#[test]
fn config_errors_surface_before_generation() {
    let missing_layer = r#"
        [shape]
        layout = "112"
        [[layers]]
        layer = 1
        algorithm = "binary-tree"
    "#;
    let config = MazeConfig::from_toml_str(missing_layer).unwrap();
    assert!(maze::generate(&config).is_err());

    assert!(MazeConfig::from_toml_str("[shape]\nlayout = \"1!1\"\n")
        .and_then(|c| maze::generate(&c))
        .is_err());
}
