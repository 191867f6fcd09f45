use bit_set::BitSet;
use error_chain::bail;
use log::{debug, warn};
use rand::Rng;
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::cells::{CompassPrimary, MaskFilter};
use crate::errors::*;
use crate::grid::{Grid, IndexSmallVec};

/// A maze generation strategy.
///
/// A generator links the cells a filter admits into a spanning structure. Every random
/// draw comes from `rng`, so equal seeds give equal mazes.
pub trait Generator {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()>;
}

/// The available generation algorithms, as named in configuration files and on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "binary-tree", alias = "binary")]
    BinaryTree,
    #[serde(rename = "sidewinder")]
    Sidewinder,
    #[serde(rename = "aldous-broder")]
    AldousBroder,
    #[serde(rename = "wilson")]
    Wilson,
    #[serde(rename = "hunt-and-kill", alias = "hunt-kill")]
    HuntAndKill,
    #[serde(rename = "recursive-backtracker")]
    RecursiveBacktracker,
    #[serde(rename = "link-all", alias = "room")]
    LinkAllCells,
    /// Leaves a layer unlinked. Its cells only gain passages when regions are connected.
    #[serde(rename = "ignore")]
    IgnoreLayer,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [Algorithm::BinaryTree,
                                     Algorithm::Sidewinder,
                                     Algorithm::AldousBroder,
                                     Algorithm::Wilson,
                                     Algorithm::HuntAndKill,
                                     Algorithm::RecursiveBacktracker,
                                     Algorithm::LinkAllCells,
                                     Algorithm::IgnoreLayer];

    /// The strategy for this algorithm, None for `IgnoreLayer`.
    /// `step_limit` caps the walk length of Aldous-Broder and Wilson.
    pub fn generator(self, step_limit: Option<usize>) -> Option<Box<dyn Generator>> {
        match self {
            Algorithm::BinaryTree => Some(Box::new(BinaryTree)),
            Algorithm::Sidewinder => Some(Box::new(Sidewinder)),
            Algorithm::AldousBroder => Some(Box::new(AldousBroder { step_limit })),
            Algorithm::Wilson => Some(Box::new(Wilson { step_limit })),
            Algorithm::HuntAndKill => Some(Box::new(HuntAndKill)),
            Algorithm::RecursiveBacktracker => Some(Box::new(RecursiveBacktracker)),
            Algorithm::LinkAllCells => Some(Box::new(LinkAllCells)),
            Algorithm::IgnoreLayer => None,
        }
    }

    /// Does the algorithm produce a spanning tree over a connected region.
    pub fn is_perfect(self) -> bool {
        !matches!(self, Algorithm::LinkAllCells | Algorithm::IgnoreLayer)
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BinaryTree => "binary-tree",
            Algorithm::Sidewinder => "sidewinder",
            Algorithm::AldousBroder => "aldous-broder",
            Algorithm::Wilson => "wilson",
            Algorithm::HuntAndKill => "hunt-and-kill",
            Algorithm::RecursiveBacktracker => "recursive-backtracker",
            Algorithm::LinkAllCells => "link-all",
            Algorithm::IgnoreLayer => "ignore",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Algorithm> {
        match s.trim().to_lowercase().as_str() {
            "binary-tree" | "binary" => Ok(Algorithm::BinaryTree),
            "sidewinder" => Ok(Algorithm::Sidewinder),
            "aldous-broder" => Ok(Algorithm::AldousBroder),
            "wilson" => Ok(Algorithm::Wilson),
            "hunt-and-kill" | "hunt-kill" => Ok(Algorithm::HuntAndKill),
            "recursive-backtracker" => Ok(Algorithm::RecursiveBacktracker),
            "link-all" | "room" => Ok(Algorithm::LinkAllCells),
            "ignore" => Ok(Algorithm::IgnoreLayer),
            _ => Err(ErrorKind::UnknownAlgorithm(s.to_string()).into()),
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct BinaryTree;

#[derive(Debug, Copy, Clone, Default)]
pub struct Sidewinder;

#[derive(Debug, Copy, Clone, Default)]
pub struct AldousBroder {
    pub step_limit: Option<usize>,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Wilson {
    pub step_limit: Option<usize>,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct HuntAndKill;

#[derive(Debug, Copy, Clone, Default)]
pub struct RecursiveBacktracker;

#[derive(Debug, Copy, Clone, Default)]
pub struct LinkAllCells;

impl Generator for BinaryTree {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        binary_tree(grid, filter, rng)
    }
}

impl Generator for Sidewinder {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        sidewinder(grid, filter, rng)
    }
}

impl Generator for AldousBroder {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        aldous_broder(grid, filter, rng, self.step_limit)
    }
}

impl Generator for Wilson {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        wilson(grid, filter, rng, self.step_limit)
    }
}

impl Generator for HuntAndKill {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        hunt_and_kill(grid, filter, rng)
    }
}

impl Generator for RecursiveBacktracker {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
        recursive_backtracker(grid, filter, rng)
    }
}

impl Generator for LinkAllCells {
    fn generate(&self, grid: &mut Grid, filter: MaskFilter, _: &mut XorShiftRng) -> Result<()> {
        link_all_cells(grid, filter);
        Ok(())
    }
}

/// Apply the binary tree maze generation algorithm to a grid.
/// It works simply by visiting each cell in the grid and choosing to carve a passage
/// in one of two perpendicular directions, here North or East.
/// Only neighbours with the same mask as the cell are candidates, so layers stay separate
/// even when the filter admits several of them.
pub fn binary_tree(grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
    grid.reset_visited(filter);
    let cells = grid.filtered_indices(filter).to_vec();

    for index in cells {
        let neighbours = same_mask_neighbours(grid,
                                              index,
                                              &[CompassPrimary::North, CompassPrimary::East]);

        // Unless there are no neighbours, randomly choose a neighbour to connect.
        if !neighbours.is_empty() {
            let link_index = neighbours[rng.gen_range(0..neighbours.len())];
            grid.link_indices(index, link_index);
        }
        grid.cell_by_index_mut(index).visited = true;
    }

    debug!("Binary tree over {} linked {} passages", filter, grid.links_count());
    Ok(())
}

/// Apply the sidewinder maze generation algorithm to the grid.
/// Cells are visited row by row, west to east. Each cell joins the current run; the run either
/// carries on by carving east or is closed out by carving north from one random run member.
/// A run always closes at the eastern edge of its region and never closes where no cell
/// lies to the north, so the northern edge becomes one long corridor.
pub fn sidewinder(grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
    grid.reset_visited(filter);
    let cells = grid.filtered_indices(filter).to_vec();
    let mut run: Vec<usize> = vec![];

    for index in cells {
        run.push(index);
        grid.cell_by_index_mut(index).visited = true;

        let east = same_mask_neighbours(grid, index, &[CompassPrimary::East]).first().cloned();
        let at_east_boundary = east.is_none();
        let at_north_boundary = same_mask_neighbours(grid, index, &[CompassPrimary::North])
            .is_empty();

        // coin flip, drawn for every cell to keep the random sequence stable
        let coin = rng.gen_range(0..2);
        let should_close_out = at_east_boundary || (!at_north_boundary && coin == 0);

        match east {
            Some(east_index) if !should_close_out => grid.link_indices(index, east_index),
            _ => {
                let closers: Vec<usize> = run.iter()
                    .cloned()
                    .filter(|member| {
                        !same_mask_neighbours(grid, *member, &[CompassPrimary::North]).is_empty()
                    })
                    .collect();
                if !closers.is_empty() {
                    let member = closers[rng.gen_range(0..closers.len())];
                    let north = same_mask_neighbours(grid, member, &[CompassPrimary::North])[0];
                    grid.link_indices(member, north);
                }
                run.clear();
            }
        }
    }

    debug!("Sidewinder over {} linked {} passages", filter, grid.links_count());
    Ok(())
}

/// Apply the Aldous-Broder maze generation algorithm to the grid.
/// An unbiased random walk: step to any neighbour at random and carve a passage whenever the
/// step lands on a cell not seen before. Finishes once every admitted cell has been seen.
/// The walk length is only bounded probabilistically, `step_limit` turns that into an error.
pub fn aldous_broder(grid: &mut Grid,
                     filter: MaskFilter,
                     rng: &mut XorShiftRng,
                     step_limit: Option<usize>)
                     -> Result<()> {
    grid.reset_visited(filter);
    if !grid.is_connected(filter) {
        bail!(ErrorKind::DisconnectedMask(filter));
    }
    let mut current = match grid.random_index(rng, filter) {
        Some(start) => start,
        None => return Ok(()),
    };
    grid.cell_by_index_mut(current).visited = true;

    let mut unvisited = grid.cell_count(filter) - 1;
    let mut steps = 0;
    while unvisited > 0 {
        check_step_limit(steps, step_limit)?;
        steps += 1;

        let next = random_neighbour(grid, current, filter, rng)?;
        if !grid.cell_by_index(next).is_visited() {
            grid.link_indices(current, next);
            grid.cell_by_index_mut(next).visited = true;
            unvisited -= 1;
        }
        current = next;
    }

    debug!("Aldous-Broder over {} finished after {} steps", filter, steps);
    Ok(())
}

/// Apply Wilson's maze generation algorithm to the grid.
/// One random cell seeds the maze. Loop-erased random walks then start from random unvisited
/// cells; when a walk meets the maze it is carved in, and when it crosses itself the loop is
/// erased back to the repeated cell.
pub fn wilson(grid: &mut Grid,
              filter: MaskFilter,
              rng: &mut XorShiftRng,
              step_limit: Option<usize>)
              -> Result<()> {
    grid.reset_visited(filter);
    if !grid.is_connected(filter) {
        bail!(ErrorKind::DisconnectedMask(filter));
    }

    let mut unvisited = IndexPool::new(grid.filtered_indices(filter), grid.size());
    let first = match unvisited.choose(rng) {
        Some(first) => first,
        None => return Ok(()),
    };
    unvisited.remove(first);
    grid.cell_by_index_mut(first).visited = true;

    let mut path: Vec<usize> = Vec::new();
    let mut in_path = BitSet::with_capacity(grid.size());
    let mut steps = 0;

    while let Some(start) = unvisited.choose(rng) {
        path.clear();
        in_path.clear();
        path.push(start);
        in_path.insert(start);

        let mut current = start;
        while !grid.cell_by_index(current).is_visited() {
            check_step_limit(steps, step_limit)?;
            steps += 1;

            let next = random_neighbour(grid, current, filter, rng)?;
            if in_path.contains(next) {
                // erase the loop, leaving `next` at the end of the walk
                while let Some(&last) = path.last() {
                    if last == next {
                        break;
                    }
                    path.pop();
                    in_path.remove(last);
                }
            } else {
                path.push(next);
                in_path.insert(next);
            }
            current = next;
        }

        for pair in path.windows(2) {
            grid.link_indices(pair[0], pair[1]);
        }
        for &index in &path[..path.len() - 1] {
            grid.cell_by_index_mut(index).visited = true;
            unvisited.remove(index);
        }
    }

    debug!("Wilson over {} finished after {} steps", filter, steps);
    Ok(())
}

/// Apply the hunt and kill maze generation algorithm to the grid.
/// A random walk that only steps onto unvisited cells. When it gets stuck the grid is scanned
/// row-major for the first unvisited cell next to a visited one, which is linked to a random
/// visited neighbour and the walk resumes from there.
pub fn hunt_and_kill(grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
    grid.reset_visited(filter);
    let mut current = match grid.random_index(rng, filter) {
        Some(start) => start,
        None => return Ok(()),
    };
    grid.cell_by_index_mut(current).visited = true;
    let mut hunts = 0;

    loop {
        let fresh = neighbours_by_visit(grid, current, filter, false);
        if !fresh.is_empty() {
            let next = fresh[rng.gen_range(0..fresh.len())];
            grid.link_indices(current, next);
            grid.cell_by_index_mut(next).visited = true;
            current = next;
            continue;
        }

        match grid.unvisited_index(true, filter) {
            Some(hunted) => {
                let visited = neighbours_by_visit(grid, hunted, filter, true);
                let partner = visited[rng.gen_range(0..visited.len())];
                grid.link_indices(hunted, partner);
                grid.cell_by_index_mut(hunted).visited = true;
                current = hunted;
                hunts += 1;
            }
            None => break,
        }
    }

    warn_if_unreached(grid, filter, "Hunt and kill");
    debug!("Hunt and kill over {} needed {} hunts", filter, hunts);
    Ok(())
}

/// Apply the recursive backtracker maze generation algorithm to the grid.
/// A depth first search from a random cell using an explicit stack: carve into a random
/// unvisited neighbour of the top cell, or pop it when none remain.
pub fn recursive_backtracker(grid: &mut Grid, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<()> {
    grid.reset_visited(filter);
    let start = match grid.random_index(rng, filter) {
        Some(start) => start,
        None => return Ok(()),
    };
    grid.cell_by_index_mut(start).visited = true;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let fresh = neighbours_by_visit(grid, current, filter, false);
        if fresh.is_empty() {
            stack.pop();
        } else {
            let next = fresh[rng.gen_range(0..fresh.len())];
            grid.link_indices(current, next);
            grid.cell_by_index_mut(next).visited = true;
            stack.push(next);
        }
    }

    warn_if_unreached(grid, filter, "Recursive backtracker");
    debug!("Recursive backtracker over {} linked {} passages", filter, grid.links_count());
    Ok(())
}

/// Turns the admitted cells into one open room: every admitted neighbour pair is linked and
/// every cell is flagged as part of a room.
pub fn link_all_cells(grid: &mut Grid, filter: MaskFilter) {
    grid.reset_visited(filter);
    let cells = grid.filtered_indices(filter).to_vec();
    for index in cells {
        for neighbour in grid.neighbour_indices(index, filter) {
            grid.link_indices(index, neighbour);
        }
        let cell = grid.cell_by_index_mut(index);
        cell.in_room = true;
        cell.visited = true;
    }
    debug!("Room fill over {} linked {} passages", filter, grid.links_count());
}

fn same_mask_neighbours(grid: &Grid, index: usize, dirs: &[CompassPrimary]) -> IndexSmallVec {
    let cell = grid.cell_by_index(index);
    dirs.iter()
        .filter_map(|dir| cell.neighbour_index(*dir))
        .filter(|n| grid.cell_by_index(*n).mask() == cell.mask())
        .collect()
}

fn neighbours_by_visit(grid: &Grid, index: usize, filter: MaskFilter, visited: bool) -> IndexSmallVec {
    grid.neighbour_indices(index, filter)
        .into_iter()
        .filter(|n| grid.cell_by_index(*n).is_visited() == visited)
        .collect()
}

fn random_neighbour(grid: &Grid, index: usize, filter: MaskFilter, rng: &mut XorShiftRng) -> Result<usize> {
    let neighbours = grid.neighbour_indices(index, filter);
    if neighbours.is_empty() {
        bail!(ErrorKind::StrandedWalk(grid.coordinate_of(index)));
    }
    Ok(neighbours[rng.gen_range(0..neighbours.len())])
}

#[inline]
fn check_step_limit(steps: usize, step_limit: Option<usize>) -> Result<()> {
    match step_limit {
        Some(limit) if steps >= limit => Err(ErrorKind::StepLimitExceeded(limit).into()),
        _ => Ok(()),
    }
}

fn warn_if_unreached(grid: &Grid, filter: MaskFilter, algorithm: &str) {
    if let Some(stranded) = grid.unvisited_cell(false, filter) {
        warn!("{} could not reach {} from its start, {} is not connected", algorithm, stranded, filter);
    }
}

/// Set of cell indices with O(1) insertion order independent removal and uniform sampling.
struct IndexPool {
    items: Vec<usize>,
    positions: Vec<Option<usize>>,
}

impl IndexPool {
    fn new(indices: &[usize], capacity: usize) -> IndexPool {
        let mut positions = vec![None; capacity];
        for (position, index) in indices.iter().enumerate() {
            positions[*index] = Some(position);
        }
        IndexPool {
            items: indices.to_vec(),
            positions,
        }
    }

    fn choose(&self, rng: &mut XorShiftRng) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items[rng.gen_range(0..self.items.len())])
        }
    }

    fn remove(&mut self, index: usize) {
        if let Some(position) = self.positions[index].take() {
            self.items.swap_remove(position);
            if let Some(moved) = self.items.get(position) {
                self.positions[*moved] = Some(position);
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use quickcheck::{quickcheck, TestResult};

    use super::*;
    use crate::cells::{Cartesian2DCoordinate, Mask};
    use crate::layers::LayerMap;
    use crate::units::{ColumnLength, LayerId, RowLength};
    use crate::utils::seeded_rng;

    const TREE_ALGORITHMS: [Algorithm; 6] = [Algorithm::BinaryTree,
                                             Algorithm::Sidewinder,
                                             Algorithm::AldousBroder,
                                             Algorithm::Wilson,
                                             Algorithm::HuntAndKill,
                                             Algorithm::RecursiveBacktracker];

    fn generated(algorithm: Algorithm, w: usize, h: usize, seed: u64) -> Grid {
        let mut g = Grid::new(RowLength(w), ColumnLength(h)).unwrap();
        let mut rng = seeded_rng(seed);
        algorithm.generator(None)
            .unwrap()
            .generate(&mut g, MaskFilter::Any, &mut rng)
            .unwrap();
        g
    }

    fn is_link_connected(g: &Grid) -> bool {
        let start = match g.iter().find(|c| g.cell_at(*c, MaskFilter::Any).is_some()) {
            Some(start) => start,
            None => return true,
        };
        let mut seen = vec![start];
        let mut frontier = vec![start];
        while let Some(c) = frontier.pop() {
            for n in g.links(c).unwrap() {
                if !seen.contains(&n) {
                    seen.push(n);
                    frontier.push(n);
                }
            }
        }
        seen.len() == g.cell_count(MaskFilter::Any)
    }

    #[test]
    fn tree_algorithms_span_the_grid() {
        fn p(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            for algorithm in TREE_ALGORITHMS.iter() {
                let g = generated(*algorithm, w, h, seed);
                if g.links_count() != w * h - 1 || !is_link_connected(&g) {
                    return TestResult::error(format!("{} failed on {}x{}", algorithm, w, h));
                }
            }
            TestResult::passed()
        }
        quickcheck(p as fn(u8, u8, u64) -> TestResult);
    }

    #[test]
    fn same_seed_same_maze() {
        fn p(seed: u64) -> bool {
            Algorithm::ALL.iter().filter(|a| a.generator(None).is_some()).all(|algorithm| {
                let a = generated(*algorithm, 9, 7, seed);
                let b = generated(*algorithm, 9, 7, seed);
                a.iter_links().collect::<Vec<_>>() == b.iter_links().collect::<Vec<_>>()
            })
        }
        quickcheck(p as fn(u64) -> bool);
    }

    #[test]
    fn full_braid_clears_every_dead_end_of_a_tree() {
        fn p(w: u8, h: u8, seed: u64) -> bool {
            let (w, h) = (w as usize % 10 + 2, h as usize % 10 + 2);
            TREE_ALGORITHMS.iter().all(|algorithm| {
                let mut g = generated(*algorithm, w, h, seed);
                let mut rng = seeded_rng(seed);
                let summary = g.braid(100, &mut rng).unwrap();
                summary.unbraidable == 0 && g.dead_ends(MaskFilter::Any).is_empty()
            })
        }
        quickcheck(p as fn(u8, u8, u64) -> bool);
    }

    #[test]
    fn pruning_twice_changes_nothing() {
        fn p(w: u8, h: u8, seed: u64, percentage: u8) -> bool {
            let (w, h) = (w as usize % 10 + 1, h as usize % 10 + 1);
            let mut g = generated(Algorithm::Wilson, w, h, seed);
            let mut rng = seeded_rng(seed);
            g.braid(percentage % 101, &mut rng).unwrap();
            g.remove_dead_ends();
            let links: Vec<_> = g.iter_links().collect();
            let cells = g.cell_count(MaskFilter::Any);
            g.remove_dead_ends() == 0 && g.iter_links().collect::<Vec<_>>() == links &&
            g.cell_count(MaskFilter::Any) == cells
        }
        quickcheck(p as fn(u8, u8, u64, u8) -> bool);
    }

    #[test]
    fn recursive_backtracker_seed_scenario() {
        let origin = Cartesian2DCoordinate::new(0, 0);
        let first = generated(Algorithm::RecursiveBacktracker, 4, 4, 1234);
        assert_eq!(first.links_count(), 15);
        for _ in 0..5 {
            let again = generated(Algorithm::RecursiveBacktracker, 4, 4, 1234);
            assert_eq!(again.links_count(), 15);
            assert_eq!(again.links(origin), first.links(origin));
        }
    }

    #[test]
    fn binary_tree_only_carves_north_or_east() {
        let g = generated(Algorithm::BinaryTree, 6, 6, 42);
        let north_east = Cartesian2DCoordinate::new(5, 5);
        assert!(g.links(north_east).unwrap().len() >= 1);
        for (a, b) in g.iter_links() {
            assert!((a.x == b.x && a.y + 1 == b.y) || (a.y == b.y && a.x + 1 == b.x) ||
                    (b.x == a.x && b.y + 1 == a.y) || (b.y == a.y && b.x + 1 == a.x));
        }
        // the top row and east column are single corridors
        for x in 0..5 {
            assert!(g.is_neighbour_linked(Cartesian2DCoordinate::new(x, 5), CompassPrimary::East));
        }
        for y in 0..5 {
            assert!(g.is_neighbour_linked(Cartesian2DCoordinate::new(5, y), CompassPrimary::North));
        }
    }

    #[test]
    fn sidewinder_top_row_is_a_corridor() {
        let g = generated(Algorithm::Sidewinder, 7, 5, 9);
        for x in 0..6 {
            assert!(g.is_neighbour_linked(Cartesian2DCoordinate::new(x, 4), CompassPrimary::East));
        }
    }

    #[test]
    fn generation_stays_inside_its_layer() {
        let layout: LayerMap = "1111\n1122\n2222".parse().unwrap();
        for algorithm in TREE_ALGORITHMS.iter() {
            let mut g = Grid::from_layer_map(&layout);
            let mut rng = seeded_rng(5);
            let generator = algorithm.generator(None).unwrap();
            for layer in g.layers() {
                generator.generate(&mut g, MaskFilter::Layer(layer), &mut rng).unwrap();
            }
            // two trees, one per layer
            assert_eq!(g.links_count(), (6 - 1) + (6 - 1), "{}", algorithm);
            for (a, b) in g.iter_links() {
                assert_eq!(g.cell(a).unwrap().mask(), g.cell(b).unwrap().mask());
            }
        }
    }

    #[test]
    fn grids_with_holes_still_get_trees() {
        let layout: LayerMap = "111#1\n1#111\n11111".parse().unwrap();
        for algorithm in TREE_ALGORITHMS.iter().filter(|a| !matches!(a, Algorithm::BinaryTree | Algorithm::Sidewinder)) {
            let mut g = Grid::from_layer_map(&layout);
            let mut rng = seeded_rng(11);
            algorithm.generator(None).unwrap().generate(&mut g, MaskFilter::Any, &mut rng).unwrap();
            assert_eq!(g.links_count(), 12, "{}", algorithm);
            assert!(is_link_connected(&g));
        }
    }

    #[test]
    fn random_walks_refuse_disconnected_layers() {
        let layout: LayerMap = "1#1\n1#1".parse().unwrap();
        for algorithm in &[Algorithm::AldousBroder, Algorithm::Wilson] {
            let mut g = Grid::from_layer_map(&layout);
            let mut rng = seeded_rng(1);
            let err = algorithm.generator(None)
                .unwrap()
                .generate(&mut g, MaskFilter::Layer(LayerId(1)), &mut rng)
                .unwrap_err();
            match *err.kind() {
                ErrorKind::DisconnectedMask(MaskFilter::Layer(LayerId(1))) => {}
                ref other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn step_limits_bound_random_walks() {
        for algorithm in &[Algorithm::AldousBroder, Algorithm::Wilson] {
            let mut g = Grid::new(RowLength(20), ColumnLength(20)).unwrap();
            let mut rng = seeded_rng(2);
            let err = algorithm.generator(Some(10))
                .unwrap()
                .generate(&mut g, MaskFilter::Any, &mut rng)
                .unwrap_err();
            match *err.kind() {
                ErrorKind::StepLimitExceeded(10) => {}
                ref other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn empty_layers_generate_nothing() {
        let mut g = Grid::new(RowLength(3), ColumnLength(3)).unwrap();
        let mut rng = seeded_rng(3);
        for algorithm in Algorithm::ALL.iter().filter_map(|a| a.generator(None)) {
            algorithm.generate(&mut g, MaskFilter::Layer(LayerId(8)), &mut rng).unwrap();
        }
        assert_eq!(g.links_count(), 0);
    }

    #[test]
    fn single_cell_layers_are_trivially_done() {
        for algorithm in TREE_ALGORITHMS.iter() {
            let g = generated(*algorithm, 1, 1, 3);
            assert_eq!(g.links_count(), 0);
        }
    }

    #[test]
    fn link_all_cells_makes_rooms() {
        let layout: LayerMap = "222\n211".parse().unwrap();
        let mut g = Grid::from_layer_map(&layout);
        let mut rng = seeded_rng(3);
        LinkAllCells.generate(&mut g, MaskFilter::Layer(LayerId(2)), &mut rng).unwrap();
        // (0, 0) (0, 1) (1, 1) (2, 1): an L of three passages
        assert_eq!(g.links_count(), 3);
        let room_cells = g.iter().filter(|c| g.cell(*c).unwrap().in_room()).count();
        assert_eq!(room_cells, 4);
        assert_eq!(g.cell(Cartesian2DCoordinate::new(1, 0)).unwrap().mask(), Mask::Layer(LayerId(1)));
        assert!(!g.cell(Cartesian2DCoordinate::new(1, 0)).unwrap().in_room());
    }

    #[test]
    fn algorithm_names() {
        for algorithm in Algorithm::ALL.iter() {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), *algorithm);
        }
        assert_eq!("hunt-kill".parse::<Algorithm>().unwrap(), Algorithm::HuntAndKill);
        assert_eq!("Binary".parse::<Algorithm>().unwrap(), Algorithm::BinaryTree);
        assert!("prims".parse::<Algorithm>().is_err());
        assert!(Algorithm::IgnoreLayer.generator(None).is_none());
    }

    #[test]
    fn index_pool_removal() {
        let mut pool = IndexPool::new(&[2, 5, 7], 8);
        pool.remove(2);
        pool.remove(2);
        pool.remove(7);
        let mut rng = seeded_rng(0);
        assert_eq!(pool.choose(&mut rng), Some(5));
        pool.remove(5);
        assert_eq!(pool.choose(&mut rng), None);
    }
}
