use crate::{ExtractError, HogExtractor, Result};
use image::GrayImage;
use log::*;
use ndarray::{s, Array2, Array3, Array5};
use std::fmt;
use std::str::FromStr;

/// Regularisation term used by every normalisation scheme.
const NORM_EPSILON: f32 = 1e-5;
/// Values above this are clipped between the two passes of `L2-Hys`.
const HYS_CLIP: f32 = 0.2;

/// The block normalisation scheme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockNorm {
    /// Divide by the L1 norm.
    L1,
    /// Square root of the L1-normalised block.
    L1Sqrt,
    /// Divide by the L2 norm.
    L2,
    /// L2 normalisation, clip at 0.2, then L2 normalisation again.
    L2Hys,
}

impl BlockNorm {
    pub fn name(self) -> &'static str {
        match self {
            BlockNorm::L1 => "L1",
            BlockNorm::L1Sqrt => "L1-sqrt",
            BlockNorm::L2 => "L2",
            BlockNorm::L2Hys => "L2-Hys",
        }
    }

    /// Normalise a block in place.
    pub fn apply(self, block: &mut [f32]) {
        match self {
            BlockNorm::L1 => l1(block),
            BlockNorm::L1Sqrt => {
                l1(block);
                block.iter_mut().for_each(|v| *v = v.sqrt());
            }
            BlockNorm::L2 => l2(block),
            BlockNorm::L2Hys => {
                l2(block);
                block.iter_mut().for_each(|v| *v = v.min(HYS_CLIP));
                l2(block);
            }
        }
    }
}

fn l1(block: &mut [f32]) {
    let norm = block.iter().map(|v| v.abs()).sum::<f32>() + NORM_EPSILON;
    block.iter_mut().for_each(|v| *v /= norm);
}

fn l2(block: &mut [f32]) {
    let norm = (block.iter().map(|v| v * v).sum::<f32>() + NORM_EPSILON * NORM_EPSILON).sqrt();
    block.iter_mut().for_each(|v| *v /= norm);
}

impl fmt::Display for BlockNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockNorm {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L1" => Ok(BlockNorm::L1),
            "L1-sqrt" => Ok(BlockNorm::L1Sqrt),
            "L2" => Ok(BlockNorm::L2),
            "L2-Hys" => Ok(BlockNorm::L2Hys),
            other => Err(ExtractError::InvalidConfig(format!(
                "unknown block normalisation `{}`",
                other
            ))),
        }
    }
}

/// How many cells and blocks fit in an image for a given configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Layout {
    pub cells_wide: usize,
    pub cells_high: usize,
    pub blocks_wide: usize,
    pub blocks_high: usize,
}

impl HogExtractor {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.orientations == 0 || self.pixels_per_cell == 0 || self.cells_per_block == 0 {
            return Err(ExtractError::InvalidConfig(format!(
                "orientations ({}), pixels per cell ({}) and cells per block ({}) must be non-zero",
                self.orientations, self.pixels_per_cell, self.cells_per_block
            )));
        }
        Ok(())
    }

    /// Compute the cell and block grid for an image of the given size.
    ///
    /// Only whole cells are used; pixels past the last whole cell are ignored.
    pub fn layout(&self, width: u32, height: u32) -> Result<Layout> {
        self.validate()?;
        let cells_wide = width as usize / self.pixels_per_cell;
        let cells_high = height as usize / self.pixels_per_cell;
        if cells_wide < self.cells_per_block || cells_high < self.cells_per_block {
            return Err(ExtractError::IncompatibleImage {
                width,
                height,
                reason: format!(
                    "at least one block of {0}x{0} cells of {1}x{1} pixels is required",
                    self.cells_per_block, self.pixels_per_cell
                ),
            });
        }
        Ok(Layout {
            cells_wide,
            cells_high,
            blocks_wide: cells_wide - self.cells_per_block + 1,
            blocks_high: cells_high - self.cells_per_block + 1,
        })
    }

    /// Compute the block-normalised descriptor of an intensity image.
    ///
    /// The result is indexed as
    /// `[block_row, block_col, cell_row_in_block, cell_col_in_block, orientation]`.
    pub fn descriptor(&self, image: &GrayImage) -> Result<Array5<f32>> {
        let layout = self.layout(image.width(), image.height())?;
        trace!("HOG layout {:?}", layout);
        let cells = self.cell_histograms(image, &layout);
        trace!("Cell histograms finished.");

        let cpb = self.cells_per_block;
        let mut out = Array5::zeros((
            layout.blocks_high,
            layout.blocks_wide,
            cpb,
            cpb,
            self.orientations,
        ));
        let mut block = Vec::with_capacity(cpb * cpb * self.orientations);
        for by in 0..layout.blocks_high {
            for bx in 0..layout.blocks_wide {
                block.clear();
                block.extend(
                    cells
                        .slice(s![by..by + cpb, bx..bx + cpb, ..])
                        .iter()
                        .copied(),
                );
                self.block_norm.apply(&mut block);
                for (dst, &src) in out.slice_mut(s![by, bx, .., .., ..]).iter_mut().zip(&block) {
                    *dst = src;
                }
            }
        }
        debug!(
            "Computed {} blocks with {} normalisation",
            layout.blocks_wide * layout.blocks_high,
            self.block_norm
        );
        Ok(out)
    }

    /// Orientation histograms per cell, indexed `[cell_row, cell_col, orientation]`.
    ///
    /// Each bin holds the gradient magnitude falling into it averaged over the
    /// cell area. Orientations are unsigned, so bins cover `[0, 180)` degrees.
    fn cell_histograms(&self, image: &GrayImage, layout: &Layout) -> Array3<f32> {
        let (magnitude, orientation) = gradients(image);
        let side = self.pixels_per_cell;
        let bin_width = 180.0 / self.orientations as f32;
        let area = (side * side) as f32;
        let mut cells = Array3::zeros((layout.cells_high, layout.cells_wide, self.orientations));
        for cy in 0..layout.cells_high {
            for cx in 0..layout.cells_wide {
                for y in cy * side..(cy + 1) * side {
                    for x in cx * side..(cx + 1) * side {
                        let bin = ((orientation[(y, x)] / bin_width) as usize)
                            .min(self.orientations - 1);
                        cells[(cy, cx, bin)] += magnitude[(y, x)];
                    }
                }
            }
        }
        cells.mapv_inplace(|v| v / area);
        cells
    }
}

/// Central difference gradient magnitude and unsigned orientation in degrees.
///
/// The outermost rows and columns have zero gradient along their axis.
fn gradients(image: &GrayImage) -> (Array2<f32>, Array2<f32>) {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let at = |x: usize, y: usize| f32::from(image.get_pixel(x as u32, y as u32)[0]);
    let mut magnitude = Array2::zeros((height, width));
    let mut orientation = Array2::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let gx = if x > 0 && x + 1 < width {
                at(x + 1, y) - at(x - 1, y)
            } else {
                0.0
            };
            let gy = if y > 0 && y + 1 < height {
                at(x, y + 1) - at(x, y - 1)
            } else {
                0.0
            };
            magnitude[(y, x)] = gx.hypot(gy);
            orientation[(y, x)] = gy.atan2(gx).to_degrees().rem_euclid(180.0);
        }
    }
    (magnitude, orientation)
}
