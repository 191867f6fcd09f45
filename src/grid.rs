use bit_set::BitSet;
use error_chain::bail;
use log::{debug, warn};
use petgraph::graph::{self, NodeIndex};
use petgraph::{Graph, Undirected};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use std::slice;

use crate::cells::{Cartesian2DCoordinate, Cell, CompassPrimary, CoordinateOptionSmallVec,
                   CoordinateSmallVec, Mask, MaskFilter};
use crate::errors::*;
use crate::grid_iterators::{CellIter, RowIter};
use crate::layers::LayerMap;
use crate::regions::Connector;
use crate::units::{ColumnLength, LayerId, RowLength};
use crate::utils::{self, FnvHashMap};

pub(crate) type IndexSmallVec = SmallVec<[usize; 4]>;

/// The maze grid: an arena of cells plus the passage graph linking them.
///
/// Cell `i` of the arena is node `i` of the passage graph and sits at the row-major
/// position `i` of the grid.
#[derive(Clone)]
pub struct Grid {
    width: RowLength,
    height: ColumnLength,
    cells: Vec<Cell>,
    passages: Graph<(), (), Undirected, u32>,
    valid_cells: Vec<usize>,
    mask_cells: FnvHashMap<Mask, Vec<usize>>,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    InvalidGridCoordinate,
    SelfLink,
    NotNeighbours,
}

/// What a call to `Grid::braid` managed to do.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct BraidSummary {
    /// Dead ends present before braiding.
    pub dead_ends: usize,
    /// How many dead ends the percentage asked to remove.
    pub target: usize,
    /// Dead ends actually removed.
    pub removed: usize,
    /// Dead ends picked that had no neighbour left to link to.
    pub unbraidable: usize,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: passages: {:?}, width: {:?}, height: {:?}",
               self.passages, self.width, self.height)
    }
}

impl Grid {
    /// A `width` * `height` grid where every cell belongs to layer 1.
    pub fn new(width: RowLength, height: ColumnLength) -> Result<Grid> {
        let (RowLength(w), ColumnLength(h)) = (width, height);
        if w == 0 || h == 0 {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        let layer_map = LayerMap::uniform(width, height, Mask::Layer(LayerId(1)))?;
        Ok(Grid::from_layer_map(&layer_map))
    }

    /// A grid shaped by a layer map, one cell per map entry.
    pub fn from_layer_map(layer_map: &LayerMap) -> Grid {
        let (width, height) = (layer_map.width(), layer_map.height());
        let nodes = width.0 * height.0;

        let mut cells = Vec::with_capacity(nodes);
        let mut passages = Graph::with_capacity(nodes, 2 * nodes);
        for (index, mask) in layer_map.masks().iter().enumerate() {
            cells.push(Cell::new(Cartesian2DCoordinate::from_row_major_index(index, width), *mask));
            let _ = passages.add_node(());
        }

        let mut grid = Grid {
            width,
            height,
            cells,
            passages,
            valid_cells: vec![],
            mask_cells: utils::fnv_hashmap(8),
        };
        grid.configure_neighbours();
        grid.rebuild_mask_index();
        debug!("Built {}x{} grid with {} valid cells", width.0, height.0, grid.valid_cells.len());
        grid
    }

    /// Wires each valid cell to its valid neighbours to the North and East, and the
    /// symmetric South and West slots of those neighbours.
    fn configure_neighbours(&mut self) {
        for index in 0..self.cells.len() {
            if self.cells[index].mask.is_excluded() {
                continue;
            }
            let coord = self.cells[index].coordinate();
            for dir in [CompassPrimary::North, CompassPrimary::East].iter().cloned() {
                let neighbour = dir.offset_coordinate(coord, self.width, self.height)
                    .and_then(|c| self.index_of(c))
                    .filter(|n| !self.cells[*n].mask.is_excluded());
                if let Some(n) = neighbour {
                    self.cells[index].neighbours[dir.slot()] = Some(n);
                    self.cells[n].neighbours[dir.opposite().slot()] = Some(index);
                }
            }
        }
    }

    fn rebuild_mask_index(&mut self) {
        self.valid_cells.clear();
        self.mask_cells.clear();
        for (index, cell) in self.cells.iter().enumerate() {
            if !cell.mask.is_excluded() {
                self.valid_cells.push(index);
                self.mask_cells.entry(cell.mask).or_insert_with(Vec::new).push(index);
            }
        }
    }

    #[inline]
    pub fn width(&self) -> RowLength {
        self.width
    }

    #[inline]
    pub fn height(&self) -> ColumnLength {
        self.height
    }

    /// Every cell position of the grid, including excluded cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// The number of cells a filter admits.
    #[inline]
    pub fn cell_count(&self, filter: MaskFilter) -> usize {
        self.filtered_indices(filter).len()
    }

    /// The number of cells tagged with exactly this mask. Excluded cells are never counted.
    pub fn mask_count(&self, mask: Mask) -> usize {
        self.mask_cells.get(&mask).map_or(0, Vec::len)
    }

    /// The layers that still own at least one cell, lowest first.
    pub fn layers(&self) -> Vec<LayerId> {
        let mut layers: Vec<LayerId> = self.mask_cells.keys().filter_map(|m| m.layer()).collect();
        layers.sort();
        layers
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.passages.edge_count()
    }

    /// The cell at a coordinate whatever its mask, None if out of bounds.
    pub fn cell(&self, coord: Cartesian2DCoordinate) -> Option<&Cell> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    /// The cell at a coordinate if it is in bounds and admitted by the filter.
    pub fn cell_at(&self, coord: Cartesian2DCoordinate, filter: MaskFilter) -> Option<&Cell> {
        self.cell(coord).filter(|cell| filter.admits(cell.mask))
    }

    /// Is the grid coordinate within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        self.index_of(coord)
    }

    /// A uniformly sampled cell admitted by the filter, None when the filter admits nothing.
    pub fn random_cell(&self, rng: &mut XorShiftRng, filter: MaskFilter) -> Option<Cartesian2DCoordinate> {
        self.random_index(rng, filter).map(|index| self.coordinate_of(index))
    }

    /// The first unvisited cell in row-major order, optionally one that has a visited
    /// neighbour admitted by the same filter.
    pub fn unvisited_cell(&self,
                          require_visited_neighbour: bool,
                          filter: MaskFilter)
                          -> Option<Cartesian2DCoordinate> {
        self.unvisited_index(require_visited_neighbour, filter).map(|index| self.coordinate_of(index))
    }

    /// All cells admitted by the filter with exactly one passage, row-major.
    pub fn dead_ends(&self, filter: MaskFilter) -> Vec<Cartesian2DCoordinate> {
        self.dead_end_indices(filter).into_iter().map(|index| self.coordinate_of(index)).collect()
    }

    /// Link two adjacent cells with a passage. Linking already linked cells is a no-op.
    pub fn link(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> ::std::result::Result<(), CellLinkError> {
        if a == b {
            return Err(CellLinkError::SelfLink);
        }
        match (self.index_of(a), self.index_of(b)) {
            (Some(a_index), Some(b_index)) => {
                if self.cells[a_index].neighbours.contains(&Some(b_index)) {
                    self.link_indices(a_index, b_index);
                    Ok(())
                } else {
                    Err(CellLinkError::NotNeighbours)
                }
            }
            _ => Err(CellLinkError::InvalidGridCoordinate),
        }
    }

    /// Unlink two cells, if the grid coordinates are valid and a link exists between them.
    /// Returns true if an unlink occurred.
    pub fn unlink(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a_index), Some(b_index)) => self.unlink_indices(a_index, b_index),
            _ => false,
        }
    }

    /// Cells that are linked to a particular cell by a passage, in North, South, East, West order.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<CoordinateSmallVec> {
        self.index_of(coord).map(|index| {
            self.passage_indices(index).into_iter().map(|i| self.coordinate_of(i)).collect()
        })
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a_index), Some(b_index)) => self.is_linked_indices(a_index, b_index),
            _ => false,
        }
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.index_of(coord)
            .and_then(|index| self.cells[index].neighbour_index(direction).map(|n| (index, n)))
            .map_or(false, |(index, n)| self.is_linked_indices(index, n))
    }

    /// Cells to the North, South, East or West of a particular cell that the filter admits,
    /// linked by a passage or not.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate, filter: MaskFilter) -> CoordinateSmallVec {
        self.index_of(coord)
            .map(|index| {
                self.neighbour_indices(index, filter).into_iter().map(|n| self.coordinate_of(n)).collect()
            })
            .unwrap_or_default()
    }

    pub fn neighbours_at_directions(&self,
                                    coord: Cartesian2DCoordinate,
                                    dirs: &[CompassPrimary])
                                    -> CoordinateOptionSmallVec {
        dirs.iter()
            .map(|direction| self.neighbour_at_direction(coord, *direction))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        self.index_of(coord)
            .and_then(|index| self.cells[index].neighbour_index(direction))
            .map(|n| self.coordinate_of(n))
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.width, self.height)
    }

    #[inline]
    pub fn iter_row(&self) -> RowIter {
        RowIter::new(self.width, self.height)
    }

    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            graph_edge_iter: self.passages.raw_edges().iter(),
            row_length: self.width,
        }
    }

    /// Can every cell the filter admits reach every other one through neighbours the
    /// filter also admits. Vacuously true for an empty selection.
    pub fn is_connected(&self, filter: MaskFilter) -> bool {
        let selection = self.filtered_indices(filter);
        let start = match selection.first() {
            Some(start) => *start,
            None => return true,
        };

        let mut seen = BitSet::with_capacity(self.cells.len());
        let mut frontier = VecDeque::new();
        seen.insert(start);
        frontier.push_back(start);
        while let Some(index) = frontier.pop_front() {
            for n in self.neighbour_indices(index, filter) {
                if seen.insert(n) {
                    frontier.push_back(n);
                }
            }
        }
        seen.len() == selection.len()
    }

    /// Clears the generation visit flag of every cell the filter admits.
    pub fn reset_visited(&mut self, filter: MaskFilter) {
        for cell in self.cells.iter_mut().filter(|c| filter.admits(c.mask)) {
            cell.visited = false;
        }
    }

    /// Finds the dead ends of the grid and links some of them to unlinked neighbouring cells
    /// so they're no longer dead ends.
    ///
    /// `percentage` of the dead ends found are targeted. A neighbour that is itself a dead end
    /// is preferred, which removes two dead ends with one passage. Dead ends without any
    /// unlinked neighbour are skipped and reported in the summary.
    pub fn braid(&mut self, percentage: u8, rng: &mut XorShiftRng) -> Result<BraidSummary> {
        if percentage > 100 {
            bail!(ErrorKind::InvalidBraidPercentage(percentage));
        }

        let mut dead_ends = self.dead_end_indices(MaskFilter::Any);
        let mut summary = BraidSummary {
            dead_ends: dead_ends.len(),
            target: dead_ends.len() * percentage as usize / 100,
            ..BraidSummary::default()
        };

        let mut remaining = summary.target;
        while remaining > 0 && !dead_ends.is_empty() {
            let index = dead_ends.swap_remove(rng.gen_range(0..dead_ends.len()));

            let candidates: IndexSmallVec = self.neighbour_indices(index, MaskFilter::Any)
                .into_iter()
                .filter(|n| !self.is_linked_indices(index, *n))
                .collect();
            if candidates.is_empty() {
                summary.unbraidable += 1;
                continue;
            }

            let dead_end_candidates: IndexSmallVec = candidates.iter()
                .cloned()
                .filter(|n| self.link_degree(*n) == 1)
                .collect();
            let pool = if dead_end_candidates.is_empty() { &candidates } else { &dead_end_candidates };
            let chosen = pool[rng.gen_range(0..pool.len())];
            let chosen_was_dead_end = self.link_degree(chosen) == 1;

            self.link_indices(index, chosen);
            summary.removed += 1;
            remaining -= 1;

            if chosen_was_dead_end {
                if let Some(position) = dead_ends.iter().position(|d| *d == chosen) {
                    dead_ends.swap_remove(position);
                }
                summary.removed += 1;
                remaining = remaining.saturating_sub(1);
            }
        }

        if summary.removed < summary.target {
            warn!("Braiding removed {} of the {} targeted dead ends", summary.removed, summary.target);
        }
        Ok(summary)
    }

    /// Prunes every dead end corridor back to its nearest junction.
    ///
    /// Starting from each cell with one passage, the cell is cut out of the grid (passages
    /// and neighbours removed, mask excluded) and the walk continues into its former passage
    /// partner while that partner is left with one passage. Cells left with no passages are
    /// excluded too. Returns the number of cells excluded.
    pub fn remove_dead_ends(&mut self) -> usize {
        let mut removed = 0;
        for index in 0..self.cells.len() {
            if self.cells[index].mask.is_excluded() {
                continue;
            }
            match self.link_degree(index) {
                0 => {
                    self.exclude(index);
                    removed += 1;
                }
                1 => removed += self.delete_corridor(index),
                _ => {}
            }
        }
        if removed > 0 {
            self.rebuild_mask_index();
        }
        removed
    }

    fn delete_corridor(&mut self, start: usize) -> usize {
        let mut removed = 0;
        let mut index = start;
        while self.link_degree(index) == 1 {
            let partner = self.passage_indices(index)[0];
            self.exclude(index);
            removed += 1;
            index = partner;
        }
        if self.link_degree(index) == 0 {
            self.exclude(index);
            removed += 1;
        }
        removed
    }

    /// Detaches a cell from the lattice. The mask index is left stale for the caller to rebuild.
    fn exclude(&mut self, index: usize) {
        for partner in self.passage_indices(index) {
            self.unlink_indices(index, partner);
        }
        for dir in CompassPrimary::ALL.iter() {
            if let Some(n) = self.cells[index].neighbours[dir.slot()].take() {
                self.cells[n].neighbours[dir.opposite().slot()] = None;
            }
        }
        let cell = &mut self.cells[index];
        cell.mask = Mask::Excluded;
        cell.region = Mask::Excluded;
    }

    /// Every pair of adjacent valid cells with different masks, at most one per cell: the
    /// first such neighbour in North, South, East, West order. Row-major.
    pub fn connecting_cells(&self) -> Vec<Connector> {
        self.valid_cells
            .iter()
            .filter_map(|index| {
                let mask = self.cells[*index].mask;
                self.neighbour_indices(*index, MaskFilter::Any)
                    .into_iter()
                    .find(|n| self.cells[*n].mask != mask)
                    .map(|n| Connector::new(self.coordinate_of(*index), self.coordinate_of(n)))
            })
            .collect()
    }

    // Index level access used by the generators, the region connector and pathing.

    #[inline]
    pub(crate) fn index_of(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn coordinate_of(&self, index: usize) -> Cartesian2DCoordinate {
        self.cells[index].coordinate()
    }

    #[inline]
    pub(crate) fn cell_by_index(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    pub(crate) fn cell_by_index_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Row-major indices of the cells a filter admits.
    pub(crate) fn filtered_indices(&self, filter: MaskFilter) -> &[usize] {
        match filter {
            MaskFilter::Any => &self.valid_cells,
            MaskFilter::Layer(id) => self.mask_cells.get(&Mask::Layer(id)).map_or(&[][..], Vec::as_slice),
        }
    }

    pub(crate) fn random_index(&self, rng: &mut XorShiftRng, filter: MaskFilter) -> Option<usize> {
        self.filtered_indices(filter).choose(rng).cloned()
    }

    pub(crate) fn unvisited_index(&self, require_visited_neighbour: bool, filter: MaskFilter) -> Option<usize> {
        self.filtered_indices(filter).iter().cloned().find(|index| {
            !self.cells[*index].visited &&
            (!require_visited_neighbour ||
             self.neighbour_indices(*index, filter).into_iter().any(|n| self.cells[n].visited))
        })
    }

    pub(crate) fn dead_end_indices(&self, filter: MaskFilter) -> Vec<usize> {
        self.filtered_indices(filter)
            .iter()
            .cloned()
            .filter(|index| self.link_degree(*index) == 1)
            .collect()
    }

    /// Neighbours admitted by the filter in North, South, East, West order.
    pub(crate) fn neighbour_indices(&self, index: usize, filter: MaskFilter) -> IndexSmallVec {
        self.cells[index]
            .neighbours
            .iter()
            .filter_map(|n| *n)
            .filter(|n| filter.admits(self.cells[*n].mask))
            .collect()
    }

    /// Passage partners in North, South, East, West order.
    pub(crate) fn passage_indices(&self, index: usize) -> IndexSmallVec {
        self.cells[index]
            .neighbours
            .iter()
            .filter_map(|n| *n)
            .filter(|n| self.is_linked_indices(index, *n))
            .collect()
    }

    #[inline]
    pub(crate) fn link_degree(&self, index: usize) -> usize {
        self.passages.edges(node(index)).count()
    }

    /// Links two cells that are known to be neighbours.
    pub(crate) fn link_indices(&mut self, a: usize, b: usize) {
        debug_assert!(self.cells[a].neighbours.contains(&Some(b)), "passages only join neighbours");
        let _ = self.passages.update_edge(node(a), node(b), ());
    }

    pub(crate) fn unlink_indices(&mut self, a: usize, b: usize) -> bool {
        match self.passages.find_edge(node(a), node(b)) {
            Some(edge) => {
                // Invalidates the last edge index of the graph, which nothing holds on to.
                self.passages.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub(crate) fn is_linked_indices(&self, a: usize, b: usize) -> bool {
        self.passages.find_edge(node(a), node(b)).is_some()
    }
}

#[inline]
fn node(index: usize) -> NodeIndex<u32> {
    NodeIndex::new(index)
}

pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
    row_length: RowLength,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (Cartesian2DCoordinate, Cartesian2DCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        let row_length = self.row_length;
        self.graph_edge_iter.next().map(|edge| {
            (Cartesian2DCoordinate::from_row_major_index(edge.source().index(), row_length),
             Cartesian2DCoordinate::from_row_major_index(edge.target().index(), row_length))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}
