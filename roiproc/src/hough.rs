//! Circle detection with the gradient Hough transform.

use crate::kernels::derivative;
use crate::HoughCirclesParams;
use image::GrayImage;
use imageproc::edges::canny;
use log::trace;

/// A detected circle in image coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: u32,
    /// Accumulator votes of the centre.
    pub votes: u32,
}

/// Detect circles in an intensity image, strongest centre first.
///
/// Every Canny edge pixel votes for centres along its gradient, in both
/// directions, for every radius in range. Centres are accumulator local maxima
/// with more than `param2` votes; a centre closer than `min_dist` to a stronger
/// one is dropped. The radius is the distance shared by most edge pixels, and it
/// needs at least `param2` of them.
pub fn hough_circles(gray: &GrayImage, min_dist: f32, params: &HoughCirclesParams) -> Vec<Circle> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return vec![];
    }
    // No circle with a centre in the image reaches further than the diagonal.
    let diagonal = (width as f32).hypot(height as f32).ceil() as u32;
    let min_radius = params.min_radius.max(1).min(diagonal);
    let max_radius = if params.max_radius == 0 {
        (width.min(height) / 2).max(min_radius)
    } else {
        params.max_radius.min(diagonal)
    };
    let min_dist = min_dist.max(1.0);
    let dp = params.dp;

    let edges = canny(gray, params.param1 / 2.0, params.param1);
    let gx = derivative(gray, 1, 0, 3);
    let gy = derivative(gray, 0, 1, 3);

    // Cell `a` collects the votes closest to `a * dp`.
    let acc_width = ((width - 1) as f32 / dp).round() as usize + 1;
    let acc_height = ((height - 1) as f32 / dp).round() as usize + 1;
    let mut accumulator = vec![0u32; acc_width * acc_height];
    let mut edge_points = vec![];

    for (x, y, edge) in edges.enumerate_pixels() {
        if edge[0] == 0 {
            continue;
        }
        let (dx, dy) = (gx.get_pixel(x, y)[0], gy.get_pixel(x, y)[0]);
        let magnitude = dx.hypot(dy);
        if magnitude == 0.0 {
            continue;
        }
        edge_points.push((x as f32, y as f32));
        let (ux, uy) = (dx / magnitude, dy / magnitude);
        for sign in [1.0f32, -1.0] {
            for r in min_radius..=max_radius {
                let cx = x as f32 + sign * r as f32 * ux;
                let cy = y as f32 + sign * r as f32 * uy;
                if cx < 0.0 || cy < 0.0 || cx >= width as f32 || cy >= height as f32 {
                    break;
                }
                let ax = ((cx / dp).round() as usize).min(acc_width - 1);
                let ay = ((cy / dp).round() as usize).min(acc_height - 1);
                accumulator[ay * acc_width + ax] += 1;
            }
        }
    }
    trace!("{} edge pixels voted", edge_points.len());

    let mut centers = vec![];
    for ay in 0..acc_height {
        for ax in 0..acc_width {
            let index = ay * acc_width + ax;
            let votes = accumulator[index];
            if votes as f32 <= params.param2 {
                continue;
            }
            let left = if ax > 0 { accumulator[index - 1] } else { 0 };
            let right = if ax + 1 < acc_width { accumulator[index + 1] } else { 0 };
            let up = if ay > 0 { accumulator[index - acc_width] } else { 0 };
            let down = if ay + 1 < acc_height { accumulator[index + acc_width] } else { 0 };
            if votes > left && votes >= right && votes > up && votes >= down {
                centers.push((ax, ay, votes));
            }
        }
    }
    // Stable, so equal votes keep raster order.
    centers.sort_by(|a, b| b.2.cmp(&a.2));
    trace!("{} candidate centres", centers.len());

    let mut histogram = vec![0u32; max_radius as usize + 1];
    let mut circles: Vec<Circle> = vec![];
    for (ax, ay, votes) in centers {
        let x = ax as f32 * dp;
        let y = ay as f32 * dp;
        if circles
            .iter()
            .any(|c| (c.x - x).hypot(c.y - y) < min_dist)
        {
            continue;
        }

        histogram.iter_mut().for_each(|count| *count = 0);
        for &(ex, ey) in &edge_points {
            let r = (ex - x).hypot(ey - y).round() as u32;
            if (min_radius..=max_radius).contains(&r) {
                histogram[r as usize] += 1;
            }
        }
        let best = (min_radius..=max_radius)
            .map(|r| (r, histogram[r as usize]))
            .fold((0, 0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });
        if best.1 > 0 && best.1 as f32 >= params.param2 {
            circles.push(Circle {
                x,
                y,
                radius: best.0,
                votes,
            });
        }
    }
    circles
}
