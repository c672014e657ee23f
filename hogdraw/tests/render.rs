use hogex::{HogExtractor, Projection};
use image::{DynamicImage, GrayImage, Luma};
use std::path::PathBuf;

fn stripes(period: u32, vertical: bool) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(32, 32, |x, y| {
        let t = if vertical { x } else { y };
        Luma([if (t / period) % 2 == 0 { 30 } else { 220 }])
    }))
}

#[test]
fn writes_comparisons_and_plot() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = vec![];
    let mut images = vec![];
    for (i, vertical) in [true, false, true, false].iter().enumerate() {
        let image = stripes(4 + i as u32, *vertical);
        let path = dir.path().join(format!("img{}.png", i));
        image.save(&path).unwrap();
        paths.push(path);
        images.push(image);
    }
    let loaded = hogdraw::load_images(&paths).unwrap();
    assert_eq!(loaded.len(), 4);

    let extractor = HogExtractor::new(9, 8, 2);
    let written = hogdraw::render_comparisons(&extractor, &paths, &loaded, dir.path()).unwrap();
    assert_eq!(
        written,
        (0..4)
            .map(|i| dir.path().join(format!("img{}_hog.png", i)))
            .collect::<Vec<PathBuf>>()
    );
    let comparison = image::open(&written[0]).unwrap();
    assert_eq!(comparison.width(), 64);

    let labels: Vec<String> = ["v", "h", "v", "h"].iter().map(|s| s.to_string()).collect();
    let plot = hogdraw::render_plot(&extractor, &images, &labels, Projection::Pca, dir.path()).unwrap();
    assert_eq!(plot, dir.path().join("hog_pca.png"));
    assert_eq!(image::open(&plot).unwrap().width(), 640);
}

#[test]
fn mismatched_labels_fail() {
    let dir = tempfile::tempdir().unwrap();
    let images = vec![stripes(4, true), stripes(4, false)];
    let labels = vec!["only".to_owned()];
    assert!(hogdraw::render_plot(
        &HogExtractor::default(),
        &images,
        &labels,
        Projection::Tsne,
        dir.path()
    )
    .is_err());
}
