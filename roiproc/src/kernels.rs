//! Separable smoothing and derivative kernels applied with `imageproc` filters.

use image::{GrayImage, Luma, Pixel};
use imageproc::definitions::{Clamp, Image};
use imageproc::filter::{separable_filter_equal, Kernel};

/// Normalised 1-D Gaussian of `ksize` taps.
///
/// A `sigma` of zero or less is derived from the size as
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (ksize as f32 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Multiply two polynomials given by their coefficients, lowest first.
fn convolve(a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// 1-D kernel taking the derivative of the given `order` with an aperture of
/// `ksize` taps.
///
/// The kernel is a binomial smoother convolved `order` times with a forward
/// difference, so `(1, 3)` gives `[-1, 0, 1]` and `(0, 3)` gives `[1, 2, 1]`.
/// With `ksize == 1` there is no smoothing: order 0 is `[1]` and higher orders
/// use a 3-tap difference.
pub fn derivative_kernel(order: u32, ksize: u32) -> Vec<f32> {
    let ksize = if ksize == 1 {
        if order == 0 {
            return vec![1.0];
        }
        3
    } else {
        ksize
    };
    let smoothing = (ksize - 1).saturating_sub(order);
    let mut kernel = vec![1.0];
    for _ in 0..smoothing {
        kernel = convolve(&kernel, &[1.0, 1.0]);
    }
    for _ in 0..order {
        kernel = convolve(&kernel, &[-1.0, 1.0]);
    }
    kernel
}

/// The `(horizontal, vertical)` kernels of a `(dx, dy)` derivative.
pub fn derivative_kernels(dx: u32, dy: u32, ksize: u32) -> (Vec<f32>, Vec<f32>) {
    (derivative_kernel(dx, ksize), derivative_kernel(dy, ksize))
}

/// Row-major outer product `vertical * horizontal^T`.
fn outer(horizontal: &[f32], vertical: &[f32]) -> Vec<f32> {
    vertical
        .iter()
        .flat_map(|&v| horizontal.iter().map(move |&h| v * h))
        .collect()
}

/// Gaussian smoothing with a square `ksize` kernel.
pub fn gaussian_blur<P>(image: &Image<P>, ksize: u32, sigma: f32) -> Image<P>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let kernel = gaussian_kernel(ksize, sigma);
    separable_filter_equal(image, &kernel)
}

/// Correlate every channel with a row-major kernel, rounding and saturating
/// back to 8 bits. Borders are padded by continuity.
pub fn filter_2d<P>(image: &Image<P>, data: &[f32], width: u32, height: u32) -> Image<P>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    Kernel::new(data, width, height).filter(image, |channel, acc: f32| {
        *channel = <u8 as Clamp<f32>>::clamp(acc.round());
    })
}

/// Signed `(dx, dy)` derivative of an intensity image.
pub fn derivative(gray: &GrayImage, dx: u32, dy: u32, ksize: u32) -> Image<Luma<f32>> {
    let (horizontal, vertical) = derivative_kernels(dx, dy, ksize);
    let data = outer(&horizontal, &vertical);
    Kernel::new(&data, horizontal.len() as u32, vertical.len() as u32)
        .filter(gray, |channel, acc: f32| *channel = acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_is_normalised_and_symmetric() {
        for (ksize, sigma) in [(3, 0.0), (5, 1.0), (7, -1.0), (9, 2.5)] {
            let kernel = gaussian_kernel(ksize, sigma);
            assert_eq!(kernel.len(), ksize as usize);
            assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            for i in 0..kernel.len() / 2 {
                assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn derived_sigma_for_three_taps() {
        // sigma 0.8 for ksize 3.
        let kernel = gaussian_kernel(3, 0.0);
        let ratio = kernel[0] / kernel[1];
        assert!((ratio - (-0.5f32 / 0.64).exp()).abs() < 1e-5);
    }

    #[test]
    fn sobel_kernels() {
        assert_eq!(derivative_kernel(1, 3), vec![-1.0, 0.0, 1.0]);
        assert_eq!(derivative_kernel(0, 3), vec![1.0, 2.0, 1.0]);
        assert_eq!(derivative_kernel(2, 3), vec![1.0, -2.0, 1.0]);
        assert_eq!(derivative_kernel(1, 5), vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert_eq!(derivative_kernel(0, 1), vec![1.0]);
        assert_eq!(derivative_kernel(1, 1), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn derivative_of_a_ramp() {
        let gray = GrayImage::from_fn(8, 6, |x, _| Luma([(10 * x) as u8]));
        let gx = derivative(&gray, 1, 0, 3);
        let gy = derivative(&gray, 0, 1, 3);
        // Away from the border the ramp gives 2 * 10 * (1 + 2 + 1).
        assert_eq!(gx.get_pixel(4, 3)[0], 80.0);
        assert_eq!(gy.get_pixel(4, 3)[0], 0.0);
    }

    #[test]
    fn identity_filter_keeps_image() {
        let image = GrayImage::from_fn(5, 5, |x, y| Luma([(x * 40 + y) as u8]));
        let out = filter_2d(&image, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0], 3, 3);
        assert_eq!(out, image);
    }

    #[test]
    fn blur_keeps_flat_image() {
        let image = GrayImage::from_pixel(6, 6, Luma([77]));
        let out = gaussian_blur(&image, 5, 0.0);
        for p in out.pixels() {
            assert!((76..=77).contains(&p[0]));
        }
    }
}
