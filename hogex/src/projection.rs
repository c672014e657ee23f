//! Two-dimensional projections of descriptor batches.
//!
//! These exist for eyeballing how separable a set of descriptors is, not for
//! feeding a classifier.

use crate::{ExtractError, Result};
use log::*;
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::fmt;
use std::str::FromStr;

const TSNE_ITERATIONS: usize = 500;
const TSNE_EXAGGERATION: f64 = 4.0;
const TSNE_EXAGGERATION_ITERATIONS: usize = 100;
const TSNE_LEARNING_RATE: f64 = 200.0;
const TSNE_MAX_PERPLEXITY: f64 = 30.0;
const TSNE_SEED: [u8; 32] = [7; 32];
const PROBABILITY_FLOOR: f64 = 1e-12;

/// The dimensionality reduction used to project descriptors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Principal component analysis, a linear projection.
    Pca,
    /// t-distributed stochastic neighbour embedding, a manifold projection.
    Tsne,
}

impl Projection {
    pub fn name(self) -> &'static str {
        match self {
            Projection::Pca => "pca",
            Projection::Tsne => "tsne",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pca" => Ok(Projection::Pca),
            "tsne" | "t-sne" => Ok(Projection::Tsne),
            other => Err(ExtractError::InvalidConfig(format!(
                "unknown projection `{}`",
                other
            ))),
        }
    }
}

/// Project equally sized feature vectors to 2-D points, one per input.
pub fn project(features: &[Vec<f32>], projection: Projection) -> Result<Vec<[f32; 2]>> {
    let Some(first) = features.first() else {
        return Ok(vec![]);
    };
    let dims = first.len();
    if let Some((index, found)) = features
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != dims)
    {
        return Err(ExtractError::DescriptorLength {
            index,
            expected: dims,
            found,
        });
    }
    let data = DMatrix::from_fn(features.len(), dims, |r, c| f64::from(features[r][c]));
    debug!(
        "Projecting {} samples of dimension {} with {}",
        features.len(),
        dims,
        projection
    );
    let points = match projection {
        Projection::Pca => pca(data),
        Projection::Tsne => tsne(&data),
    };
    Ok(points
        .into_iter()
        .map(|[x, y]| [x as f32, y as f32])
        .collect())
}

/// Coordinates along the two principal axes of the centred data.
fn pca(mut data: DMatrix<f64>) -> Vec<[f64; 2]> {
    let samples = data.nrows();
    for mut column in data.column_iter_mut() {
        let mean = column.mean();
        column.add_scalar_mut(-mean);
    }
    if samples < 2 || data.ncols() == 0 {
        return vec![[0.0; 2]; samples];
    }
    let svd = data.clone().svd(false, true);
    let v_t = match svd.v_t {
        Some(v_t) => v_t,
        None => {
            warn!("SVD did not produce right singular vectors");
            return vec![[0.0; 2]; samples];
        }
    };
    // Singular values are not guaranteed to come out sorted.
    let mut order = (0..svd.singular_values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));
    let axis = |k: usize, row: usize| match order.get(k) {
        Some(&component) => data.row(row).dot(&v_t.row(component)),
        None => 0.0,
    };
    (0..samples).map(|row| [axis(0, row), axis(1, row)]).collect()
}

/// Exact t-SNE with a fixed seed, so the same batch always gives the same plot.
fn tsne(data: &DMatrix<f64>) -> Vec<[f64; 2]> {
    let n = data.nrows();
    if n < 2 {
        return vec![[0.0; 2]; n];
    }
    let distances = DMatrix::from_fn(n, n, |i, j| (data.row(i) - data.row(j)).norm_squared());
    let perplexity = TSNE_MAX_PERPLEXITY.min((n - 1) as f64 / 3.0).max(1.0);
    trace!("t-SNE over {} samples with perplexity {}", n, perplexity);

    let mut conditional = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let row = conditional_row(&distances, i, perplexity);
        conditional.row_mut(i).copy_from_slice(&row);
    }
    let joint = (&conditional + conditional.transpose()) / (2.0 * n as f64);
    let joint = joint.map(|v| v.max(PROBABILITY_FLOOR));

    let mut rng = Pcg64::from_seed(TSNE_SEED);
    let mut y = (0..n)
        .map(|_| [rng.gen_range(-1e-4..1e-4), rng.gen_range(-1e-4..1e-4)])
        .collect::<Vec<[f64; 2]>>();
    let mut velocity = vec![[0.0f64; 2]; n];
    let mut gains = vec![[1.0f64; 2]; n];

    for iteration in 0..TSNE_ITERATIONS {
        let exaggeration = if iteration < TSNE_EXAGGERATION_ITERATIONS {
            TSNE_EXAGGERATION
        } else {
            1.0
        };
        let momentum = if iteration < 250 { 0.5 } else { 0.8 };

        let affinity = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                let (dx, dy) = (y[i][0] - y[j][0], y[i][1] - y[j][1]);
                1.0 / (1.0 + dx * dx + dy * dy)
            }
        });
        let total = affinity.sum().max(PROBABILITY_FLOOR);

        for i in 0..n {
            let mut gradient = [0.0f64; 2];
            for j in 0..n {
                let q = (affinity[(i, j)] / total).max(PROBABILITY_FLOOR);
                let force = (exaggeration * joint[(i, j)] - q) * affinity[(i, j)];
                gradient[0] += 4.0 * force * (y[i][0] - y[j][0]);
                gradient[1] += 4.0 * force * (y[i][1] - y[j][1]);
            }
            for axis in 0..2 {
                let same_sign = (gradient[axis] > 0.0) == (velocity[i][axis] > 0.0);
                gains[i][axis] = if same_sign {
                    (gains[i][axis] * 0.8).max(0.01)
                } else {
                    gains[i][axis] + 0.2
                };
                velocity[i][axis] = momentum * velocity[i][axis]
                    - TSNE_LEARNING_RATE * gains[i][axis] * gradient[axis];
            }
        }
        for (point, step) in y.iter_mut().zip(&velocity) {
            point[0] += step[0];
            point[1] += step[1];
        }
        let mean = y.iter().fold([0.0; 2], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
        for point in y.iter_mut() {
            point[0] -= mean[0] / n as f64;
            point[1] -= mean[1] / n as f64;
        }
    }
    y
}

/// Gaussian neighbour probabilities of row `i`, with the precision found by
/// bisection so that the row entropy matches `ln(perplexity)`.
fn conditional_row(distances: &DMatrix<f64>, i: usize, perplexity: f64) -> Vec<f64> {
    let n = distances.nrows();
    let target = perplexity.ln();
    let mut beta = 1.0f64;
    let (mut lower, mut upper) = (f64::NEG_INFINITY, f64::INFINITY);
    let mut row = vec![0.0; n];
    for _ in 0..64 {
        let mut sum = 0.0;
        let mut weighted = 0.0;
        for j in 0..n {
            row[j] = if j == i {
                0.0
            } else {
                (-distances[(i, j)] * beta).exp()
            };
            sum += row[j];
            weighted += distances[(i, j)] * row[j];
        }
        let sum = sum.max(PROBABILITY_FLOOR);
        row.iter_mut().for_each(|p| *p /= sum);
        let entropy = sum.ln() + beta * weighted / sum;
        let diff = entropy - target;
        if diff.abs() < 1e-5 {
            break;
        }
        if diff > 0.0 {
            lower = beta;
            beta = if upper.is_finite() {
                (beta + upper) / 2.0
            } else {
                beta * 2.0
            };
        } else {
            upper = beta;
            beta = if lower.is_finite() {
                (beta + lower) / 2.0
            } else {
                beta / 2.0
            };
        }
    }
    row
}
