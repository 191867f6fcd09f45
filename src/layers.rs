use error_chain::bail;
use image::{DynamicImage, Rgba};
use itertools::Itertools;
use std::str::FromStr;

use crate::cells::{Cartesian2DCoordinate, Mask};
use crate::errors::*;
use crate::units::{ColumnLength, LayerId, RowLength};

/// Per cell layer tags for a rectangular grid, stored row-major with row 0 the southern row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMap {
    width: usize,
    height: usize,
    masks: Vec<Mask>,
}

impl LayerMap {
    pub fn new(width: RowLength, height: ColumnLength, masks: Vec<Mask>) -> Result<LayerMap> {
        let (RowLength(w), ColumnLength(h)) = (width, height);
        if w == 0 || h == 0 {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        if masks.len() != w * h {
            bail!(ErrorKind::LayerMapSizeMismatch(w * h, masks.len()));
        }
        Ok(LayerMap { width: w, height: h, masks })
    }

    /// A map where every cell shares one mask.
    pub fn uniform(width: RowLength, height: ColumnLength, mask: Mask) -> Result<LayerMap> {
        LayerMap::new(width, height, vec![mask; width.0 * height.0])
    }

    /// Builds a map from rows of layer indices. `rows[0]` is grid row 0.
    /// Negative indices exclude a cell, 0 leaves it unassigned.
    pub fn from_rows(rows: &[Vec<i32>]) -> Result<LayerMap> {
        let width = rows.first().map_or(0, |row| row.len());
        if rows.is_empty() || width == 0 {
            bail!(ErrorKind::EmptyLayerMap);
        }
        if let Some((row, found)) = rows.iter().map(|r| r.len()).find_position(|len| *len != width) {
            bail!(ErrorKind::RaggedLayerMap(row, width, found));
        }
        let masks = rows.iter().flatten().cloned().map(Mask::from_index).collect();
        LayerMap::new(RowLength(width), ColumnLength(rows.len()), masks)
    }

    /// Decodes an image into layers by exact colour match against `palette`.
    ///
    /// `palette[0]` marks excluded cells and `palette[i]` marks layer `i`. Pixels matching no
    /// palette entry stay unassigned. The bottom image row becomes grid row 0.
    pub fn from_image(data_image: &DynamicImage, palette: &[Rgba<u8>]) -> Result<LayerMap> {
        if palette.is_empty() {
            bail!(ErrorKind::InvalidPalette("at least the excluded colour is required".into()));
        }
        let rgba = data_image.to_rgba8();
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        if w == 0 || h == 0 {
            bail!(ErrorKind::EmptyLayerMap);
        }

        let mut masks = Vec::with_capacity(w * h);
        for row in 0..h {
            let y = (h - 1 - row) as u32;
            for x in 0..w {
                let pixel = rgba.get_pixel(x as u32, y);
                let mask = match palette.iter().position(|colour| colour == pixel) {
                    Some(0) => Mask::Excluded,
                    Some(i) => Mask::Layer(LayerId(i as u32)),
                    None => Mask::Unassigned,
                };
                masks.push(mask);
            }
        }
        LayerMap::new(RowLength(w), ColumnLength(h), masks)
    }

    #[inline]
    pub fn width(&self) -> RowLength {
        RowLength(self.width)
    }

    #[inline]
    pub fn height(&self) -> ColumnLength {
        ColumnLength(self.height)
    }

    pub fn mask_at(&self, coord: Cartesian2DCoordinate) -> Option<Mask> {
        let (x, y) = (coord.x as usize, coord.y as usize);
        if x < self.width && y < self.height {
            Some(self.masks[y * self.width + x])
        } else {
            None
        }
    }

    /// Row-major masks, row 0 first.
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// The distinct layers present, lowest first.
    pub fn layers(&self) -> Vec<LayerId> {
        self.masks.iter().filter_map(|m| m.layer()).sorted().dedup().collect()
    }

    pub fn count(&self, mask: Mask) -> usize {
        self.masks.iter().filter(|m| **m == mask).count()
    }
}

/// Text layouts draw the northern row first, one character per cell:
/// `#` excluded, `.` unassigned, `1`-`9` and `a`-`z` layers 1 to 35.
impl FromStr for LayerMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<LayerMap> {
        let mut rows = s.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(symbol_layer_index).collect::<Result<Vec<i32>>>())
            .collect::<Result<Vec<_>>>()?;
        rows.reverse();
        LayerMap::from_rows(&rows)
    }
}

fn symbol_layer_index(symbol: char) -> Result<i32> {
    match symbol {
        '#' => Ok(-1),
        '.' => Ok(0),
        '1'..='9' | 'a'..='z' => Ok(symbol.to_digit(36).map_or(0, |d| d as i32)),
        other => Err(ErrorKind::InvalidLayerSymbol(other).into()),
    }
}

/// Parses a comma separated list of `rrggbb` or `rrggbbaa` hex colours, `#` prefix optional.
pub fn parse_palette(text: &str) -> Result<Vec<Rgba<u8>>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_hex_colour)
        .collect()
}

fn parse_hex_colour(entry: &str) -> Result<Rgba<u8>> {
    let hex = entry.trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        bail!(ErrorKind::InvalidPalette(format!("'{}' is not an rrggbb or rrggbbaa colour", entry)));
    }
    let mut channels = [255u8; 4];
    for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| ErrorKind::InvalidPalette(format!("'{}' has a non hex digit", entry)))?;
    }
    Ok(Rgba(channels))
}
