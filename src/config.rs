use error_chain::bail;
use serde_derive::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cells::Mask;
use crate::errors::*;
use crate::generators::Algorithm;
use crate::layers::{self, LayerMap};
use crate::units::{ColumnLength, LayerId, RowLength};

/// Everything one generation run needs.
///
/// Loaded from TOML, e.g.
///
/// ```toml
/// seed = 42
/// braid_percentage = 50
/// algorithm = "wilson"
///
/// [shape]
/// layout = """
/// 1111
/// 1#22
/// 1122
/// """
///
/// [[layers]]
/// layer = 2
/// algorithm = "link-all"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MazeConfig {
    pub shape: ShapeConfig,
    /// Used for every layer without an entry in `layers`.
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub layers: Vec<LayerAssignment>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub braid_percentage: Option<u8>,
    #[serde(default)]
    pub remove_dead_ends: bool,
    /// Caps the walk length of the random walk algorithms.
    #[serde(default)]
    pub step_limit: Option<usize>,
}

/// Where the grid's shape and layers come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ShapeConfig {
    /// A plain rectangle, every cell on layer 1.
    Dimensions { width: usize, height: usize },
    /// A text layout, see `LayerMap`'s `FromStr`.
    Layout { layout: String },
    /// An image whose pixel colours pick the layer of each cell.
    /// `palette[0]` is the excluded colour, `palette[i]` layer `i`.
    Image { image: PathBuf, palette: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LayerAssignment {
    pub layer: LayerId,
    pub algorithm: Algorithm,
}

fn default_algorithm() -> Algorithm {
    Algorithm::RecursiveBacktracker
}

impl MazeConfig {
    /// A plain `width` * `height` maze with default settings.
    pub fn with_dimensions(width: usize, height: usize, algorithm: Algorithm) -> MazeConfig {
        MazeConfig {
            shape: ShapeConfig::Dimensions { width, height },
            algorithm,
            layers: vec![],
            seed: None,
            braid_percentage: None,
            remove_dead_ends: false,
            step_limit: None,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<MazeConfig> {
        let config: MazeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MazeConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .chain_err(|| format!("Failed to read maze config {}", path.display()))?;
        MazeConfig::from_toml_str(&text)
            .chain_err(|| format!("Invalid maze config {}", path.display()))
    }

    /// Checks the settings that can be checked without building anything.
    pub fn validate(&self) -> Result<()> {
        if let ShapeConfig::Dimensions { width, height } = self.shape {
            if width == 0 || height == 0 {
                bail!(ErrorKind::InvalidDimensions(width, height));
            }
        }
        if let ShapeConfig::Image { ref palette, .. } = self.shape {
            if palette.is_empty() {
                bail!(ErrorKind::InvalidPalette("at least the excluded colour is required".into()));
            }
        }
        if let Some(assignment) = self.layers.iter().find(|assignment| assignment.layer.0 == 0) {
            bail!(ErrorKind::InvalidLayerAssignment(assignment.layer));
        }
        if let Some(percentage) = self.braid_percentage {
            if percentage > 100 {
                bail!(ErrorKind::InvalidBraidPercentage(percentage));
            }
        }
        Ok(())
    }

    /// Resolves the shape into a layer map, reading the image file if there is one.
    pub fn layer_map(&self) -> Result<LayerMap> {
        match self.shape {
            ShapeConfig::Dimensions { width, height } => {
                LayerMap::uniform(RowLength(width), ColumnLength(height), Mask::Layer(LayerId(1)))
            }
            ShapeConfig::Layout { ref layout } => layout.parse(),
            ShapeConfig::Image { ref image, ref palette } => {
                let colours = layers::parse_palette(&palette.join(","))?;
                let data_image = ::image::open(image)
                    .chain_err(|| format!("Failed to open layer image {}", image.display()))?;
                LayerMap::from_image(&data_image, &colours)
            }
        }
    }

    /// The algorithm for a layer: its own assignment, else the default algorithm.
    /// When assignments are given every layer must have one.
    pub fn algorithm_for(&self, layer: LayerId) -> Result<Algorithm> {
        if self.layers.is_empty() {
            return Ok(self.algorithm);
        }
        match self.layers.iter().find(|assignment| assignment.layer == layer) {
            Some(assignment) => Ok(assignment.algorithm),
            None => bail!(ErrorKind::MissingLayerAlgorithm(layer)),
        }
    }
}
