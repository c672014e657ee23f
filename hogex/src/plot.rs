//! Scatter plot rendering for projected descriptors.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::collections::BTreeMap;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN: f32 = 40.0;
const POINT_RADIUS: i32 = 4;
const LEGEND_SWATCH: u32 = 12;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const PALETTE: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

/// Colour assigned to each distinct label, in sorted label order.
pub fn label_colors(labels: &[String]) -> BTreeMap<&str, Rgb<u8>> {
    let mut colors = BTreeMap::new();
    for label in labels {
        colors.entry(label.as_str()).or_insert(Rgb([0, 0, 0]));
    }
    for (index, color) in colors.values_mut().enumerate() {
        *color = PALETTE[index % PALETTE.len()];
    }
    colors
}

/// One `label: #rrggbb` line per legend swatch, left to right.
pub fn legend(labels: &[String]) -> Vec<String> {
    label_colors(labels)
        .into_iter()
        .map(|(label, Rgb([r, g, b]))| format!("{}: #{:02x}{:02x}{:02x}", label, r, g, b))
        .collect()
}

/// Draw `points` scaled to fill the plot area, coloured by `labels`, with a
/// row of legend swatches in the top margin.
///
/// The swatches carry no text; [`legend`] names them in the same order.
/// `labels` must have one entry per point.
pub fn render_scatter(points: &[[f32; 2]], labels: &[String]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let (left, right) = (MARGIN, WIDTH as f32 - MARGIN);
    let (top, bottom) = (MARGIN, HEIGHT as f32 - MARGIN);
    draw_line_segment_mut(&mut canvas, (left, bottom), (right, bottom), AXIS);
    draw_line_segment_mut(&mut canvas, (left, bottom), (left, top), AXIS);

    let colors = label_colors(labels);
    for (index, color) in colors.values().enumerate() {
        let x = MARGIN as i32 + index as i32 * (LEGEND_SWATCH as i32 + 4);
        let y = (MARGIN as i32 - LEGEND_SWATCH as i32) / 2;
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(x, y).of_size(LEGEND_SWATCH, LEGEND_SWATCH),
            *color,
        );
    }

    let span = |axis: usize| {
        let (lo, hi) = points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        if hi > lo {
            (lo, hi - lo)
        } else {
            (lo - 0.5, 1.0)
        }
    };
    let ((x_min, x_span), (y_min, y_span)) = (span(0), span(1));
    let inset = POINT_RADIUS as f32 * 2.0;
    for (point, label) in points.iter().zip(labels) {
        let x = left + inset + (point[0] - x_min) / x_span * (right - left - 2.0 * inset);
        let y = bottom - inset - (point[1] - y_min) / y_span * (bottom - top - 2.0 * inset);
        draw_filled_circle_mut(
            &mut canvas,
            (x.round() as i32, y.round() as i32),
            POINT_RADIUS,
            colors[label.as_str()],
        );
    }
    canvas
}
