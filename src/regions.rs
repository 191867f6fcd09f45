use log::{debug, info};
use petgraph::unionfind::UnionFind;
use rand::Rng;
use rand_xorshift::XorShiftRng;

use crate::cells::{Cartesian2DCoordinate, Mask, MaskFilter};
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap};

/// A candidate doorway: a valid cell and a neighbour of it with a different mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connector {
    pub cell: Cartesian2DCoordinate,
    pub neighbour: Cartesian2DCoordinate,
}

impl Connector {
    pub fn new(cell: Cartesian2DCoordinate, neighbour: Cartesian2DCoordinate) -> Connector {
        Connector { cell, neighbour }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct RegionSummary {
    /// Distinct masks present before connecting.
    pub regions: usize,
    /// Connectors found along region borders.
    pub connectors: usize,
    /// Passages carved between regions, one per merge.
    pub doorways: usize,
    /// Regions left once every possible merge was made.
    pub remaining: usize,
}

/// Joins independently generated regions into one maze.
///
/// Connectors are drawn at random. A connector whose two sides already belong to the same
/// merged region is thrown away, otherwise its cells are linked and the two regions merge.
/// Where a room borders the doorway, the room side cell is flagged as a door. Once done every
/// cell's `region` holds the lowest mask of the merged region it ended up in.
pub fn connect_regions(grid: &mut Grid, rng: &mut XorShiftRng) -> RegionSummary {
    let mut masks: Vec<Mask> = grid.filtered_indices(MaskFilter::Any)
        .iter()
        .map(|index| grid.cell_by_index(*index).mask())
        .collect();
    masks.sort();
    masks.dedup();

    let mut labels: FnvHashMap<Mask, usize> = utils::fnv_hashmap(masks.len());
    for (label, mask) in masks.iter().enumerate() {
        labels.insert(*mask, label);
    }
    let label_of = |mask: Mask| labels.get(&mask).cloned().unwrap_or(0);

    let mut connectors = grid.connecting_cells();
    let mut summary = RegionSummary {
        regions: masks.len(),
        connectors: connectors.len(),
        ..RegionSummary::default()
    };

    let mut sets = UnionFind::<usize>::new(masks.len());
    let mut merges_left = masks.len().saturating_sub(1);
    while merges_left > 0 && !connectors.is_empty() {
        let connector = connectors.swap_remove(rng.gen_range(0..connectors.len()));
        let (a, b) = match (grid.index_of(connector.cell), grid.index_of(connector.neighbour)) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let (a_mask, b_mask) = (grid.cell_by_index(a).mask(), grid.cell_by_index(b).mask());
        if !sets.union(label_of(a_mask), label_of(b_mask)) {
            continue;
        }

        grid.link_indices(a, b);
        if grid.cell_by_index(a).in_room() {
            grid.cell_by_index_mut(a).is_door = true;
        } else if grid.cell_by_index(b).in_room() {
            grid.cell_by_index_mut(b).is_door = true;
        }
        debug!("Doorway {} -> {} joins {:?} and {:?}", connector.cell, connector.neighbour, a_mask, b_mask);
        summary.doorways += 1;
        merges_left -= 1;
    }

    // masks are sorted so the first mask met for a set is its lowest
    let mut lowest: FnvHashMap<usize, Mask> = utils::fnv_hashmap(masks.len());
    for (label, mask) in masks.iter().enumerate() {
        lowest.entry(sets.find(label)).or_insert(*mask);
    }
    for index in grid.filtered_indices(MaskFilter::Any).to_vec() {
        let mask = grid.cell_by_index(index).mask();
        if let Some(region) = lowest.get(&sets.find(label_of(mask))) {
            grid.cell_by_index_mut(index).region = *region;
        }
    }

    summary.remaining = lowest.len();
    info!("Connected {} regions with {} doorways, {} regions remain",
          summary.regions, summary.doorways, summary.remaining);
    summary
}
