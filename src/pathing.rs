use error_chain::bail;
use log::debug;
use num::traits::{Bounded, One, Unsigned, Zero};
use smallvec::SmallVec;
use std::fmt::{Debug, Display, LowerHex};
use std::ops::Add;

use crate::cells::{Cartesian2DCoordinate, MaskFilter};
use crate::errors::*;
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap};

// Trait (hack) used purely as a generic type parameter alias because it looks ugly to type this out each time
// Note generic parameter type aliases are not in the langauge.
// `type X = Y;` only works with concrete types.
pub trait MaxDistance
    : Zero + One + Bounded + Unsigned + Add<Output = Self> + Debug + Clone + Copy + Display + LowerHex + Ord
    {
}
impl<T> MaxDistance for T
    where T: Zero + One + Bounded + Unsigned + Add<Output = T> + Debug + Clone + Copy + Display + LowerHex + Ord
{
}

/// Breadth first distance field over the passages of a grid.
///
/// Holds the hop count from the start cell to every cell reachable from it. Cells that cannot
/// be reached have no entry. `MaxDistanceT` must be able to hold the longest distance found.
#[derive(Debug, Clone)]
pub struct Distances<MaxDistanceT = u32> {
    start_coordinate: Cartesian2DCoordinate,
    distances: FnvHashMap<Cartesian2DCoordinate, MaxDistanceT>,
    max_distance: MaxDistanceT,
    furthest_coordinate: Cartesian2DCoordinate,
}

impl<MaxDistanceT> Distances<MaxDistanceT>
    where MaxDistanceT: MaxDistance
{
    pub fn for_grid(grid: &Grid, start_coordinate: Cartesian2DCoordinate) -> Result<Distances<MaxDistanceT>> {
        if grid.cell_at(start_coordinate, MaskFilter::Any).is_none() {
            bail!(ErrorKind::InvalidCoordinate(start_coordinate));
        }

        let mut max = Zero::zero();
        let mut furthest = start_coordinate;
        let mut distances = utils::fnv_hashmap(grid.cell_count(MaskFilter::Any));
        distances.insert(start_coordinate, Zero::zero());

        // Every link is one step, so the first time a cell is reached is by a shortest route
        // and the distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell: MaxDistanceT = distances[cell_coord];
                let next_distance = distance_to_cell + One::one();

                for link_coordinate in grid.links(*cell_coord).unwrap_or_default() {
                    if !distances.contains_key(&link_coordinate) {
                        distances.insert(link_coordinate, next_distance);
                        new_frontier.push(link_coordinate);
                    }
                }
            }
            if let Some(first) = new_frontier.first() {
                max = distances[first];
                furthest = *first;
            }
            frontier = new_frontier;
        }

        Ok(Distances {
            start_coordinate,
            distances,
            max_distance: max,
            furthest_coordinate: furthest,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> MaxDistanceT {
        self.max_distance
    }

    /// The first cell reached at the maximum distance.
    #[inline(always)]
    pub fn furthest(&self) -> Cartesian2DCoordinate {
        self.furthest_coordinate
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Cartesian2DCoordinate) -> Option<MaxDistanceT> {
        self.distances.get(&coord).cloned()
    }

    /// Number of cells reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// Every cell at the maximum distance, sorted.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[Cartesian2DCoordinate; 8]> {
        let furthest_distance = self.max();
        let mut furthest: SmallVec<[Cartesian2DCoordinate; 8]> = self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .collect();
        furthest.sort();
        furthest
    }

    /// Walks back from `end_point` to the start, each step to a linked neighbour one closer
    /// to the start. The path runs from the start to `end_point`, both included.
    pub fn path_to(&self, grid: &Grid, end_point: Cartesian2DCoordinate) -> Result<Vec<Cartesian2DCoordinate>> {
        let unreachable = || ErrorKind::Unreachable(self.start_coordinate, end_point);
        let mut current_distance = match self.distance_from_start_to(end_point) {
            Some(distance) => distance,
            None => bail!(unreachable()),
        };

        let mut path = vec![end_point];
        let mut current_coord = end_point;
        while current_coord != self.start_coordinate {
            let closer = grid.links(current_coord)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| self.distance_from_start_to(c).map(|d| (c, d)))
                .find(|&(_, d)| d + One::one() == current_distance);

            match closer {
                Some((closer_coord, closer_distance)) => {
                    current_coord = closer_coord;
                    current_distance = closer_distance;
                    path.push(current_coord);
                }
                // The grid changed since the distances were worked out.
                None => bail!(unreachable()),
            }
        }

        path.reverse();
        Ok(path)
    }
}

/// The shortest run of linked cells from `origin` to `destination`, both included.
pub fn shortest_path(grid: &Grid,
                     origin: Cartesian2DCoordinate,
                     destination: Cartesian2DCoordinate)
                     -> Result<Vec<Cartesian2DCoordinate>> {
    if grid.cell_at(destination, MaskFilter::Any).is_none() {
        bail!(ErrorKind::InvalidCoordinate(destination));
    }
    Distances::<u32>::for_grid(grid, origin)?.path_to(grid, destination)
}

/// An approximation of the longest path through the part of the maze `origin` belongs to.
///
/// Finds the cell furthest from `origin`, then the cell furthest from that one, and returns
/// the path between the two. On a perfect maze this is a longest path.
pub fn longest_path(grid: &Grid, origin: Cartesian2DCoordinate) -> Result<Vec<Cartesian2DCoordinate>> {
    let first_distances = Distances::<u32>::for_grid(grid, origin)?;
    let long_path_start = first_distances.furthest();

    let distances_from_start = Distances::<u32>::for_grid(grid, long_path_start)?;
    let end_point = distances_from_start.furthest();
    debug!("Longest path from {} runs {} -> {} over {} steps",
           origin, long_path_start, end_point, distances_from_start.max());

    distances_from_start.path_to(grid, end_point)
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;

    use super::*;
    use crate::generators::Algorithm;
    use crate::layers::LayerMap;
    use crate::units::{ColumnLength, RowLength};
    use crate::utils::seeded_rng;

    type SmallDistances = Distances<u8>;

    static OUT_OF_GRID_COORDINATE: Cartesian2DCoordinate = Cartesian2DCoordinate {
        x: u32::MAX,
        y: u32::MAX,
    };

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn small_grid(size: usize) -> Grid {
        Grid::new(RowLength(size), ColumnLength(size)).unwrap()
    }

    fn open_two_by_two() -> Grid {
        let mut g = small_grid(2);
        g.link(gc(0, 0), gc(1, 0)).expect("Link Failed");
        g.link(gc(0, 0), gc(0, 1)).expect("Link Failed");
        g.link(gc(1, 0), gc(1, 1)).expect("Link Failed");
        g.link(gc(0, 1), gc(1, 1)).expect("Link Failed");
        g
    }

    fn maze(algorithm: Algorithm, w: usize, h: usize, seed: u64) -> Grid {
        let mut g = Grid::new(RowLength(w), ColumnLength(h)).unwrap();
        let mut rng = seeded_rng(seed);
        algorithm.generator(None).unwrap().generate(&mut g, MaskFilter::Any, &mut rng).unwrap();
        g
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let g = small_grid(3);
        assert!(SmallDistances::for_grid(&g, OUT_OF_GRID_COORDINATE).is_err());

        let holed = Grid::from_layer_map(&"1#".parse::<LayerMap>().unwrap());
        assert!(SmallDistances::for_grid(&holed, gc(1, 0)).is_err());
    }

    #[test]
    fn start() {
        let g = small_grid(3);
        let start_coordinate = gc(1, 1);
        let distances = SmallDistances::for_grid(&g, start_coordinate).unwrap();
        assert_eq!(start_coordinate, distances.start());
        assert_eq!(start_coordinate, distances.furthest());
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let g = small_grid(3);
        let start_coordinate = gc(0, 0);
        let distances = SmallDistances::for_grid(&g, start_coordinate).unwrap();
        for coord in g.iter() {
            let d = distances.distance_from_start_to(coord);
            if coord != start_coordinate {
                assert!(d.is_none());
            } else {
                assert_eq!(d, Some(0));
            }
        }
        assert_eq!(distances.reachable_count(), 1);
    }

    #[test]
    fn distance_to_invalid_coordinate_is_none() {
        let g = small_grid(3);
        let distances = SmallDistances::for_grid(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.distance_from_start_to(OUT_OF_GRID_COORDINATE), None);
    }

    #[test]
    fn distances_on_open_grid() {
        let g = open_two_by_two();
        let distances = SmallDistances::for_grid(&g, gc(0, 0)).unwrap();

        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), Some(2));
    }

    #[test]
    fn max_distance() {
        let g = open_two_by_two();
        let distances = SmallDistances::for_grid(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.max(), 2);
        assert_eq!(distances.furthest(), gc(1, 1));
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(1, 1)]);
    }

    #[test]
    fn shortest_path_on_a_corridor() {
        let mut g = Grid::new(RowLength(4), ColumnLength(1)).unwrap();
        for x in 0..3 {
            g.link(gc(x, 0), gc(x + 1, 0)).unwrap();
        }
        let path = shortest_path(&g, gc(0, 0), gc(3, 0)).unwrap();
        assert_eq!(path, vec![gc(0, 0), gc(1, 0), gc(2, 0), gc(3, 0)]);
        assert_eq!(shortest_path(&g, gc(2, 0), gc(2, 0)).unwrap(), vec![gc(2, 0)]);
    }

    #[test]
    fn shortest_path_needs_a_passage() {
        let g = small_grid(2);
        let err = shortest_path(&g, gc(0, 0), gc(1, 1)).unwrap_err();
        match *err.kind() {
            ErrorKind::Unreachable(from, to) => assert_eq!((from, to), (gc(0, 0), gc(1, 1))),
            ref other => panic!("unexpected error {:?}", other),
        }
        assert!(shortest_path(&g, gc(0, 0), OUT_OF_GRID_COORDINATE).is_err());
    }

    #[test]
    fn longest_path_on_an_l_shape() {
        let mut g = small_grid(3);
        g.link(gc(0, 2), gc(0, 1)).unwrap();
        g.link(gc(0, 1), gc(0, 0)).unwrap();
        g.link(gc(0, 0), gc(1, 0)).unwrap();
        g.link(gc(1, 0), gc(2, 0)).unwrap();
        let path = longest_path(&g, gc(0, 0)).unwrap();
        assert_eq!(path.len(), 5);
        let ends = [path[0], path[4]];
        assert!(ends.contains(&gc(0, 2)) && ends.contains(&gc(2, 0)));
    }

    #[test]
    fn shortest_paths_match_distances_both_ways() {
        fn p(seed: u64, a: u8, b: u8) -> bool {
            let g = maze(Algorithm::Wilson, 8, 6, seed);
            let cells: Vec<_> = g.iter().collect();
            let (from, to) = (cells[a as usize % cells.len()], cells[b as usize % cells.len()]);

            let there = shortest_path(&g, from, to).unwrap();
            let back = shortest_path(&g, to, from).unwrap();
            let distance = Distances::<u32>::for_grid(&g, from).unwrap().distance_from_start_to(to).unwrap();

            there.len() == back.len() && there.len() == distance as usize + 1 &&
            there.first() == Some(&from) && there.last() == Some(&to)
        }
        quickcheck(p as fn(u64, u8, u8) -> bool);
    }

    #[test]
    fn longest_path_endpoints_are_mutually_furthest() {
        fn p(seed: u64, a: u8, b: u8) -> bool {
            let g = maze(Algorithm::RecursiveBacktracker, 7, 7, seed);
            let cells: Vec<_> = g.iter().collect();
            let path = longest_path(&g, cells[a as usize % cells.len()]).unwrap();
            let (first, last) = (path[0], path[path.len() - 1]);
            let length = path.len() as u32 - 1;

            let from_first = Distances::<u32>::for_grid(&g, first).unwrap();
            let from_last = Distances::<u32>::for_grid(&g, last).unwrap();
            let other = shortest_path(&g, cells[a as usize % cells.len()], cells[b as usize % cells.len()])
                .unwrap();

            from_first.max() == length && from_last.max() == length && other.len() <= path.len()
        }
        quickcheck(p as fn(u64, u8, u8) -> bool);
    }
}
