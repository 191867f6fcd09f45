use log::{debug, info};
use rand_xorshift::XorShiftRng;

use crate::cells::{Mask, MaskFilter};
use crate::config::MazeConfig;
use crate::errors::*;
use crate::grid::{BraidSummary, Grid};
use crate::regions::{self, RegionSummary};
use crate::utils;

/// A finished maze and what each stage of its generation did.
#[derive(Debug)]
pub struct GeneratedMaze {
    pub grid: Grid,
    /// The seed used, either the configured one or a freshly drawn one.
    pub seed: u64,
    pub regions: RegionSummary,
    pub braid: Option<BraidSummary>,
    /// Cells excluded by dead end pruning.
    pub pruned: usize,
}

/// Runs the whole pipeline: build the grid, generate each layer, connect the regions, then
/// optionally braid and prune dead ends. All random draws come from one generator seeded once.
pub fn generate(config: &MazeConfig) -> Result<GeneratedMaze> {
    config.validate()?;
    let layer_map = config.layer_map()?;
    let seed = config.seed.unwrap_or_else(utils::random_seed);
    let mut rng = utils::seeded_rng(seed);

    let mut grid = Grid::from_layer_map(&layer_map);
    info!("Built {}x{} grid with {} valid cells over {} layers, seed {}",
          grid.width().0,
          grid.height().0,
          grid.cell_count(MaskFilter::Any),
          grid.layers().len(),
          seed);

    generate_layers(&mut grid, config, &mut rng)?;

    let regions = regions::connect_regions(&mut grid, &mut rng);

    let braid = match config.braid_percentage {
        Some(percentage) => {
            let summary = grid.braid(percentage, &mut rng)?;
            info!("Braided {} of {} dead ends", summary.removed, summary.dead_ends);
            Some(summary)
        }
        None => None,
    };

    let pruned = if config.remove_dead_ends {
        let removed = grid.remove_dead_ends();
        info!("Pruned {} dead end cells", removed);
        removed
    } else {
        0
    };

    Ok(GeneratedMaze {
        grid,
        seed,
        regions,
        braid,
        pruned,
    })
}

/// Generates every layer in ascending layer order with its configured algorithm.
pub fn generate_layers(grid: &mut Grid, config: &MazeConfig, rng: &mut XorShiftRng) -> Result<()> {
    for layer in grid.layers() {
        let algorithm = config.algorithm_for(layer)?;
        match algorithm.generator(config.step_limit) {
            Some(generator) => {
                generator.generate(grid, MaskFilter::Layer(layer), rng)
                    .chain_err(|| format!("Failed to generate layer {} with {}", layer.0, algorithm))?;
                info!("Generated layer {} with {}", layer.0, algorithm);
            }
            None => debug!("Layer {} left for region connection", layer.0),
        }
    }

    let unassigned = grid.mask_count(Mask::Unassigned);
    if unassigned > 0 {
        debug!("{} unassigned cells are only joined by region connection", unassigned);
    }
    Ok(())
}
