use hogex::{BlockNorm, HogExtractor, Projection};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "hogdraw",
    about = "A tool to show HOG descriptors of images and how a labelled set of them separates"
)]
struct Opt {
    /// Number of orientation bins.
    #[structopt(long, default_value = "8")]
    orientations: usize,
    /// Side of a cell in pixels.
    #[structopt(long, default_value = "16")]
    pixels_per_cell: usize,
    /// Side of a block in cells.
    #[structopt(long, default_value = "1")]
    cells_per_block: usize,
    /// Block normalisation: L1, L1-sqrt, L2 or L2-Hys.
    #[structopt(long, default_value = "L2")]
    block_norm: BlockNorm,
    /// Output directory.
    #[structopt(short = "O", long, parse(from_os_str), default_value = ".")]
    output: PathBuf,
    /// One label per image, comma separated.
    ///
    /// When given, the projection plot of the whole set is written as well.
    #[structopt(long, use_delimiter = true)]
    labels: Vec<String>,
    /// Projection used for the plot: pca or tsne.
    #[structopt(long, default_value = "pca")]
    plot: Projection,
    /// The image files.
    #[structopt(parse(from_os_str), required = true)]
    images: Vec<PathBuf>,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();
    let extractor = HogExtractor {
        block_norm: opt.block_norm,
        ..HogExtractor::new(opt.orientations, opt.pixels_per_cell, opt.cells_per_block)
    };

    std::fs::create_dir_all(&opt.output).expect("failed to create output directory");
    let images = hogdraw::load_images(&opt.images).expect("failed to open image file");
    for path in hogdraw::render_comparisons(&extractor, &opt.images, &images, &opt.output)
        .expect("failed to extract HOG descriptors")
    {
        println!("{}", path.display());
    }
    if !opt.labels.is_empty() {
        let path = hogdraw::render_plot(&extractor, &images, &opt.labels, opt.plot, &opt.output)
            .expect("failed to render the projection plot");
        println!("{}", path.display());
    }
}
