//! Histogram of oriented gradients (HOG) feature extraction.
//!
//! [`HogExtractor`] turns a batch of images into one [`HogResult`] per image,
//! in input order. Colour images are reduced to intensity first; gray images
//! are used as they are. The [`projection`] and [`plot`] modules provide a
//! diagnostic view of a batch of descriptors as a labelled 2-D scatter plot.

mod descriptor;
mod error;
mod intensity;
pub mod plot;
pub mod projection;
mod result;

pub use descriptor::{BlockNorm, Layout};
pub use error::{ExtractError, Result};
pub use intensity::{to_intensity, SourceKind};
pub use projection::Projection;
pub use result::{ExtractedResult, HogResult};

use image::{imageops, DynamicImage, GrayImage, RgbImage};
use imageproc::hog::{cell_histograms, render_hist_grid, HogOptions, HogSpec};
use log::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::path::Path;

/// A batch feature extractor.
pub trait FeatureExtractor {
    type Output: ExtractedResult;

    /// Extract one result per input image, preserving order.
    fn transform(&self, batch: &[DynamicImage]) -> Result<Vec<Self::Output>>;
}

/// Contains the configuration parameters of the HOG extractor.
///
/// The configuration is fixed at construction and applies to every image
/// passed to [`FeatureExtractor::transform`]. The defaults produce coarse
/// descriptors: 8 orientations over 16x16 pixel cells, one cell per block,
/// L2 block normalisation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HogExtractor {
    /// Number of unsigned orientation bins over 180 degrees.
    pub orientations: usize,

    /// Width and height of a cell in pixels.
    pub pixels_per_cell: usize,

    /// Width and height of a block in cells.
    pub cells_per_block: usize,

    /// How each block is normalised.
    pub block_norm: BlockNorm,

    /// Also render the cell histograms as an image.
    pub visualize: bool,

    /// Return the descriptor as a flat vector instead of the block grid.
    pub feature_vector: bool,
}

impl Default for HogExtractor {
    fn default() -> Self {
        Self {
            orientations: 8,
            pixels_per_cell: 16,
            cells_per_block: 1,
            block_norm: BlockNorm::L2,
            visualize: true,
            feature_vector: true,
        }
    }
}

impl HogExtractor {
    /// Convenience constructor for the three grid parameters, everything else
    /// left at its default.
    pub fn new(orientations: usize, pixels_per_cell: usize, cells_per_block: usize) -> Self {
        Self {
            orientations,
            pixels_per_cell,
            cells_per_block,
            ..Default::default()
        }
    }

    /// The classic Dalal-Triggs configuration: 9 orientations, 8x8 cells,
    /// 2x2 blocks, `L2-Hys`.
    pub fn dalal_triggs() -> Self {
        Self {
            orientations: 9,
            pixels_per_cell: 8,
            cells_per_block: 2,
            block_norm: BlockNorm::L2Hys,
            ..Default::default()
        }
    }

    /// Extract the HOG descriptor of a single image.
    ///
    /// # Errors
    /// * [`ExtractError::InvalidInputKind`] if the image carries an alpha channel.
    /// * [`ExtractError::IncompatibleImage`] if the image is smaller than one block.
    pub fn extract(&self, image: &DynamicImage) -> Result<HogResult> {
        let (gray, kind) = to_intensity(image)?;
        let blocks = self.descriptor(&gray)?;
        let descriptor = if self.feature_vector {
            let len = blocks.len();
            blocks
                .into_shape(len)
                .map_err(|e| ExtractError::InvalidConfig(e.to_string()))?
                .into_dyn()
        } else {
            blocks.into_dyn()
        };
        let visualization = if self.visualize {
            Some(self.render(&gray)?)
        } else {
            None
        };
        Ok(HogResult::new(image.clone(), kind, descriptor, visualization))
    }

    /// Extract the HOG descriptor of an image on disk.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<HogResult> {
        self.extract(&image::open(path)?)
    }

    /// Render the cell histograms of the cell-aligned part of `gray` as star glyphs,
    /// one glyph per cell, at the original pixel scale.
    fn render(&self, gray: &GrayImage) -> Result<GrayImage> {
        let layout = self.layout(gray.width(), gray.height())?;
        let side = self.pixels_per_cell as u32;
        let (width, height) = (
            layout.cells_wide as u32 * side,
            layout.cells_high as u32 * side,
        );
        let cropped = imageops::crop_imm(gray, 0, 0, width, height).to_image();
        let options = HogOptions {
            orientations: self.orientations,
            signed: false,
            cell_side: self.pixels_per_cell,
            block_side: self.cells_per_block,
            block_stride: 1,
        };
        let spec = HogSpec::from_options(width, height, options).map_err(|reason| {
            ExtractError::IncompatibleImage {
                width,
                height,
                reason,
            }
        })?;
        let mut histograms = cell_histograms(&cropped, spec);
        trace!("Rendering {}x{} histogram grid", layout.cells_wide, layout.cells_high);
        Ok(render_hist_grid(side, &histograms.view_mut(), false))
    }

    /// Project the descriptors of a labelled batch into two dimensions and
    /// render them as a scatter plot coloured by label.
    pub fn eval(
        &self,
        batch: &[DynamicImage],
        labels: &[String],
        projection: Projection,
    ) -> Result<RgbImage> {
        if batch.len() != labels.len() {
            return Err(ExtractError::LabelMismatch {
                images: batch.len(),
                labels: labels.len(),
            });
        }
        let features = self
            .transform(batch)?
            .iter()
            .map(HogResult::to_vec)
            .collect::<Vec<_>>();
        let points = projection::project(&features, projection)?;
        info!(
            "Projected {} descriptors with {}",
            points.len(),
            projection.name()
        );
        for line in plot::legend(labels) {
            info!("Legend {}", line);
        }
        Ok(plot::render_scatter(&points, labels))
    }
}

impl FeatureExtractor for HogExtractor {
    type Output = HogResult;

    fn transform(&self, batch: &[DynamicImage]) -> Result<Vec<HogResult>> {
        self.validate()?;
        #[cfg(not(feature = "rayon"))]
        let results = batch
            .iter()
            .map(|image| self.extract(image))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(feature = "rayon")]
        let results = batch
            .par_iter()
            .map(|image| self.extract(image))
            .collect::<Result<Vec<_>>>()?;
        info!("Extracted {} HOG descriptors", results.len());
        Ok(results)
    }
}
