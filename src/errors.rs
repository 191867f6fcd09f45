// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get access to everything `error_chain!` creates.
#![allow(deprecated)]

use error_chain::error_chain;

use crate::cells::{Cartesian2DCoordinate, MaskFilter};
use crate::units::LayerId;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        ImageLoadError(::image::ImageError);
        ConfigParseError(::toml::de::Error);
    }

    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid grid dimensions")
            display("invalid grid dimensions {}x{}: width and height must be positive", width, height)
        }

        EmptyLayerMap {
            description("empty layer map")
            display("the layer map has no cells")
        }

        RaggedLayerMap(row: usize, expected: usize, found: usize) {
            description("layer map rows differ in length")
            display("layer map row {} has {} cells, expected {}", row, found, expected)
        }

        LayerMapSizeMismatch(expected: usize, found: usize) {
            description("layer map size does not match its dimensions")
            display("layer map holds {} cells, its dimensions need {}", found, expected)
        }

        InvalidLayerSymbol(symbol: char) {
            description("unrecognised layer symbol")
            display("unrecognised layer symbol '{}'", symbol)
        }

        InvalidPalette(reason: String) {
            description("invalid layer colour palette")
            display("invalid layer colour palette: {}", reason)
        }

        InvalidCoordinate(coord: Cartesian2DCoordinate) {
            description("coordinate is not a valid grid cell")
            display("coordinate {} is not a valid grid cell", coord)
        }

        Unreachable(from: Cartesian2DCoordinate, to: Cartesian2DCoordinate) {
            description("no passage between cells")
            display("there is no passage from {} to {}", from, to)
        }

        DisconnectedMask(filter: MaskFilter) {
            description("mask region is not connected")
            display("the cells of {} do not form one connected region", filter)
        }

        StrandedWalk(coord: Cartesian2DCoordinate) {
            description("random walk stranded")
            display("random walk reached {} which has no admissible neighbour", coord)
        }

        StepLimitExceeded(limit: usize) {
            description("random walk step limit exceeded")
            display("random walk did not finish within {} steps", limit)
        }

        InvalidBraidPercentage(percentage: u8) {
            description("braid percentage out of range")
            display("braid percentage {} is not within 0..=100", percentage)
        }

        UnknownAlgorithm(name: String) {
            description("unknown maze generation algorithm")
            display("unknown maze generation algorithm '{}'", name)
        }

        InvalidLayerAssignment(layer: LayerId) {
            description("algorithm assigned to layer 0")
            display("layer {} cannot take an algorithm, layers start at 1", layer.0)
        }

        MissingLayerAlgorithm(layer: LayerId) {
            description("layer has no algorithm assigned")
            display("layer {} has no algorithm assigned", layer.0)
        }
    }
}
