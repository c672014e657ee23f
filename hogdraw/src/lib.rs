use hogex::{ExtractedResult, FeatureExtractor, HogExtractor, Projection, Result};
use image::DynamicImage;
use log::*;
use std::path::{Path, PathBuf};

/// `<out>/<stem>_hog.png`.
pub fn comparison_path(output_dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    output_dir.join(format!("{}_hog.png", stem))
}

/// `<out>/hog_<projection>.png`.
pub fn plot_path(output_dir: &Path, projection: Projection) -> PathBuf {
    output_dir.join(format!("hog_{}.png", projection))
}

pub fn load_images(paths: &[PathBuf]) -> Result<Vec<DynamicImage>> {
    paths
        .iter()
        .map(|path| image::open(path).map_err(Into::into))
        .collect()
}

/// Save the input/visualization comparison of every image. Returns the written
/// paths in input order.
pub fn render_comparisons(
    extractor: &HogExtractor,
    paths: &[PathBuf],
    images: &[DynamicImage],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let extractor = HogExtractor {
        visualize: true,
        ..*extractor
    };
    let results = extractor.transform(images)?;
    let mut written = vec![];
    for (path, result) in paths.iter().zip(&results) {
        let out = comparison_path(output_dir, path);
        if let Some(comparison) = result.render_comparison() {
            comparison.save(&out)?;
            debug!(
                "{}: {} descriptor values",
                path.display(),
                result.descriptor().len()
            );
            written.push(out);
        }
    }
    Ok(written)
}

/// Save the labelled scatter plot of the batch projection.
pub fn render_plot(
    extractor: &HogExtractor,
    images: &[DynamicImage],
    labels: &[String],
    projection: Projection,
    output_dir: &Path,
) -> Result<PathBuf> {
    let extractor = HogExtractor {
        visualize: false,
        ..*extractor
    };
    let plot = extractor.eval(images, labels, projection)?;
    let out = plot_path(output_dir, projection);
    plot.save(&out)?;
    info!("wrote {}", out.display());
    Ok(out)
}
