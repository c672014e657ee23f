//! The image operators behind the processing commands.

use crate::hough::{hough_circles, Circle};
use crate::kernels::{derivative, filter_2d, gaussian_blur};
use crate::{DispatchError, Operator, OperatorKey, ProcParameters, Result, SobelAxis};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::map::map_colors;
use log::{debug, trace};

/// Circle outline colour.
pub const MARKER_OUTLINE: Rgb<u8> = Rgb([255, 0, 255]);
/// Circle centre colour.
pub const MARKER_CENTER: Rgb<u8> = Rgb([100, 100, 0]);

/// What an operator produced for its target region.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A replacement for the target region.
    Image(RgbImage),
    /// Circles found in the target region, in target coordinates.
    Markers(Vec<Circle>),
}

fn check(key: OperatorKey, validation: std::result::Result<(), String>) -> Result<()> {
    validation.map_err(|reason| DispatchError::InvalidParameter {
        operator: key,
        reason,
    })
}

/// Fixed-point BT.601 luma. The weights sum to `1 << 14`, so a gray pixel maps
/// to itself.
fn luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    ((r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + 8192) >> 14) as u8
}

/// Intensity of an RGB image.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    map_colors(image, |p| Luma([luma(p)]))
}

/// Replicate an intensity image over three channels.
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    map_colors(gray, |Luma([l])| Rgb([l, l, l]))
}

fn sobel(image: &RgbImage, axis: SobelAxis, params: &ProcParameters) -> Result<RgbImage> {
    let key = axis.config_key();
    let sobel = params.get_sobel(key)?;
    check(key, sobel.validate())?;
    if axis == SobelAxis::XY && (sobel.dx == 0 || sobel.dy == 0) {
        return Err(DispatchError::InvalidParameter {
            operator: key,
            reason: "the gradient magnitude needs both dx and dy".to_owned(),
        });
    }
    debug!(
        "{} dx {} dy {} ksize {} scale {} delta {}",
        key, sobel.dx, sobel.dy, sobel.ksize, sobel.scale, sobel.delta
    );

    let gray = to_gray(&gaussian_blur(image, 3, 0.0));
    let gradient = match axis {
        SobelAxis::X | SobelAxis::Y => derivative(&gray, sobel.dx, sobel.dy, sobel.ksize),
        SobelAxis::XY => {
            let gx = derivative(&gray, sobel.dx, 0, sobel.ksize);
            let mut gy = derivative(&gray, 0, sobel.dy, sobel.ksize);
            for (y, x) in gy.iter_mut().zip(gx.iter()) {
                *y = x.hypot(*y);
            }
            gy
        }
    };
    let out = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let g = gradient.get_pixel(x, y)[0].abs() * sobel.scale + sobel.delta;
        Luma([g.round().max(0.0).min(255.0) as u8])
    });
    Ok(gray_to_rgb(&out))
}

fn circles(image: &RgbImage, params: &ProcParameters) -> Result<Vec<Circle>> {
    let hough = params.get_hough_circles()?;
    check(OperatorKey::HoughCircles, hough.validate())?;
    let gray = median_filter(&to_gray(image), 2, 2);
    let min_dist = (image.height() as f32 / 40.0).max(1.0);
    let circles = hough_circles(&gray, min_dist, hough);
    debug!("found {} circles", circles.len());
    Ok(circles)
}

/// Run `operator` over `image` with its parameter entry.
pub fn apply(operator: Operator, image: &RgbImage, params: &ProcParameters) -> Result<Output> {
    trace!("applying {} to {}x{}", operator, image.width(), image.height());
    let out = match operator {
        Operator::Grayscale => map_colors(image, |p| {
            let l = luma(p);
            Rgb([l, l, l])
        }),
        Operator::Blur => {
            let blur = params.get_gaussian_blur()?;
            check(OperatorKey::GaussianBlur, blur.validate())?;
            gaussian_blur(image, blur.ksize, blur.sigma)
        }
        Operator::Sharpen => {
            let filter = params.get_filter_2d()?;
            check(OperatorKey::Filter2D, filter.validate())?;
            let (data, width, height) = filter.flattened();
            filter_2d(image, &data, width, height)
        }
        Operator::Sobel(axis) => sobel(image, axis, params)?,
        Operator::Canny => {
            let thresholds = params.get_canny()?;
            check(OperatorKey::Canny, thresholds.validate())?;
            let edges = canny(
                &to_gray(image),
                thresholds.lower_threshold,
                thresholds.upper_threshold,
            );
            gray_to_rgb(&edges)
        }
        Operator::Circles => return circles(image, params).map(Output::Markers),
    };
    Ok(Output::Image(out))
}

/// Draw circle markers onto `frame`, shifting them by `offset`.
pub fn draw_circles(frame: &mut RgbImage, circles: &[Circle], offset: (u32, u32)) {
    for circle in circles {
        let center = (
            (circle.x + offset.0 as f32).round() as i32,
            (circle.y + offset.1 as f32).round() as i32,
        );
        let radius = circle.radius as i32;
        draw_filled_circle_mut(frame, center, 2, MARKER_CENTER);
        for r in (radius - 1).max(1)..=radius + 1 {
            draw_hollow_circle_mut(frame, center, r, MARKER_OUTLINE);
        }
    }
}
