//! Map rasterizer: turns the black/white frontline map PNG into a [`Grid`].
//! White (red channel above the threshold) is water, everything else land.

use std::path::Path;

use image::RgbaImage;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DistanceError, Result};
use crate::map::grid::Grid;
use crate::map::spot::BitLayout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// World map size in map units; `scale = png_width / map_size`.
    pub map_size: f64,
    /// Red channel values above this are water.
    pub water_threshold: u8,
    /// Fail instead of warn when the image has anti-aliased pixels.
    pub strict_bitonal: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            map_size: 8192.0,
            water_threshold: 127,
            strict_bitonal: false,
        }
    }
}

/// Pixels whose red channel is neither pure black nor pure white. These are
/// classified by the threshold like any other pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TonalAudit {
    pub pixels: usize,
    pub intermediate: usize,
}

impl TonalAudit {
    pub fn of(image: &RgbaImage) -> Self {
        let intermediate = image
            .pixels()
            .filter(|p| p.0[0] != 0 && p.0[0] != u8::MAX)
            .count();
        Self {
            pixels: image.width() as usize * image.height() as usize,
            intermediate,
        }
    }

    pub fn is_bitonal(&self) -> bool {
        self.intermediate == 0
    }
}

#[derive(Debug, Clone)]
pub struct RasterMap {
    pub grid: Grid,
    pub audit: TonalAudit,
}

/// Classify an already decoded image.
pub fn rasterize(
    image: &RgbaImage,
    layout: BitLayout,
    options: &RasterOptions,
) -> Result<RasterMap> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DistanceError::MapTooSmall { width, height });
    }

    let audit = TonalAudit::of(image);
    if !audit.is_bitonal() {
        if options.strict_bitonal {
            return Err(DistanceError::NotBiTonal {
                count: audit.intermediate,
            });
        }
        warn!(
            intermediate = audit.intermediate,
            pixels = audit.pixels,
            threshold = options.water_threshold,
            "map image is not strictly black/white, classifying grey pixels by threshold"
        );
    }

    let scale = f64::from(width) / options.map_size;
    let threshold = options.water_threshold;
    let grid = Grid::from_fn(width, height, scale, layout, |row, column| {
        image.get_pixel(column, row).0[0] > threshold
    });

    info!(width, height, scale, row_offset = grid.row_offset(), "map rasterized");
    Ok(RasterMap { grid, audit })
}

/// Decode the PNG at `path` and rasterize it.
pub fn load_map(path: &Path, layout: BitLayout, options: &RasterOptions) -> Result<RasterMap> {
    let image = image::open(path)
        .map_err(|source| DistanceError::MapDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    rasterize(&image, layout, options)
}
