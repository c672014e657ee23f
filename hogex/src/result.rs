use crate::SourceKind;
use image::{imageops, DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::stretch_contrast;
use ndarray::{Array1, ArrayD};

/// The result of running a feature extractor on one image.
pub trait ExtractedResult: Sized {
    /// The input image, exactly as it was given to the extractor.
    fn image(&self) -> &DynamicImage;

    /// The extracted features.
    fn descriptor(&self) -> &ArrayD<f32>;

    /// Reshape the descriptor into the 1-D vector a classifier consumes.
    fn flatten(self) -> Self;
}

/// Output of [`HogExtractor`](crate::HogExtractor) for a single image.
#[derive(Debug, Clone)]
pub struct HogResult {
    image: DynamicImage,
    source_kind: SourceKind,
    descriptor: ArrayD<f32>,
    visualization: Option<GrayImage>,
}

impl HogResult {
    pub(crate) fn new(
        image: DynamicImage,
        source_kind: SourceKind,
        descriptor: ArrayD<f32>,
        visualization: Option<GrayImage>,
    ) -> Self {
        Self {
            image,
            source_kind,
            descriptor,
            visualization,
        }
    }

    /// Whether the input was used as intensity directly or converted from colour.
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// A rendering of the cell histograms, if the extractor was asked for one.
    pub fn visualization(&self) -> Option<&GrayImage> {
        self.visualization.as_ref()
    }

    /// The descriptor values in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.descriptor.iter().copied().collect()
    }

    /// Put the intensity image and the contrast-stretched visualization side by side.
    ///
    /// Returns `None` when no visualization was computed.
    pub fn render_comparison(&self) -> Option<GrayImage> {
        let visualization = self.visualization.as_ref()?;
        let input = self.image.to_luma8();
        let stretched = stretch_to_full_range(visualization);
        let mut canvas = ImageBuffer::from_pixel(
            input.width() + stretched.width(),
            input.height().max(stretched.height()),
            Luma([0u8]),
        );
        imageops::replace(&mut canvas, &input, 0, 0);
        imageops::replace(&mut canvas, &stretched, input.width() as i64, 0);
        Some(canvas)
    }
}

fn stretch_to_full_range(image: &GrayImage) -> GrayImage {
    let (lower, upper) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if upper > lower {
        stretch_contrast(image, lower, upper)
    } else {
        image.clone()
    }
}

impl ExtractedResult for HogResult {
    fn image(&self) -> &DynamicImage {
        &self.image
    }

    fn descriptor(&self) -> &ArrayD<f32> {
        &self.descriptor
    }

    fn flatten(self) -> Self {
        let descriptor = self.descriptor.iter().copied().collect::<Array1<f32>>().into_dyn();
        Self { descriptor, ..self }
    }
}
