use crate::{ExtractError, Result};
use image::{DynamicImage, GrayImage};
use log::*;

/// How the pixel data of an input image was laid out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A single intensity channel, used as-is.
    Gray,
    /// Three colour channels, reduced to intensity before extraction.
    Color,
}

/// Reduce an input image to the 8-bit intensity plane the descriptor is
/// computed on.
///
/// Single-channel images are passed through without any colour conversion
/// (16-bit data is only rescaled to 8 bits). Three-channel images are
/// converted with Rec. 709 luma weights. Images with an alpha channel are
/// rejected.
pub fn to_intensity(image: &DynamicImage) -> Result<(GrayImage, SourceKind)> {
    let kind = match image {
        DynamicImage::ImageLuma8(gray) => {
            trace!("Using {}x{} 8-bit gray image as-is", gray.width(), gray.height());
            return Ok((gray.clone(), SourceKind::Gray));
        }
        DynamicImage::ImageLuma16(_) => SourceKind::Gray,
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
            SourceKind::Color
        }
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            return Err(ExtractError::InvalidInputKind {
                kind: "gray with alpha",
            })
        }
        DynamicImage::ImageRgba8(_) | DynamicImage::ImageRgba16(_) | DynamicImage::ImageRgba32F(_) => {
            return Err(ExtractError::InvalidInputKind {
                kind: "color with alpha",
            })
        }
        _ => return Err(ExtractError::InvalidInputKind { kind: "unknown" }),
    };
    debug!(
        "Reducing {}x{} {:?} image to 8-bit intensity",
        image.width(),
        image.height(),
        kind
    );
    Ok((image.to_luma8(), kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, LumaA, Rgb, Rgba};

    #[test]
    fn gray_passes_through_unchanged() {
        let gray = ImageBuffer::from_fn(7, 5, |x, y| Luma([(x * 30 + y) as u8]));
        let (out, kind) = to_intensity(&DynamicImage::ImageLuma8(gray.clone())).unwrap();
        assert_eq!(kind, SourceKind::Gray);
        assert_eq!(out, gray);
    }

    #[test]
    fn color_is_reduced() {
        let rgb = ImageBuffer::from_pixel(4, 4, Rgb([255u8, 0, 0]));
        let (out, kind) = to_intensity(&DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(kind, SourceKind::Color);
        // Red only carries about a fifth of the luma.
        assert!(out.pixels().all(|p| (50..=60).contains(&p[0])));
    }

    #[test]
    fn alpha_is_rejected() {
        let rgba = ImageBuffer::from_pixel(2, 2, Rgba([1u8, 2, 3, 4]));
        assert!(matches!(
            to_intensity(&DynamicImage::ImageRgba8(rgba)),
            Err(ExtractError::InvalidInputKind { .. })
        ));
        let la = ImageBuffer::from_pixel(2, 2, LumaA([1u8, 255]));
        assert!(matches!(
            to_intensity(&DynamicImage::ImageLumaA8(la)),
            Err(ExtractError::InvalidInputKind { .. })
        ));
    }
}
