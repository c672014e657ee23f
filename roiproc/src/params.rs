use crate::{DispatchError, OperatorKey, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Parameters of the `:blur` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBlurParams {
    /// Side of the square kernel. Must be odd.
    pub ksize: u32,
    /// Standard deviation. Zero or negative derives it from `ksize`.
    pub sigma: f32,
}

impl Default for GaussianBlurParams {
    fn default() -> Self {
        Self {
            ksize: 5,
            sigma: 1.0,
        }
    }
}

impl GaussianBlurParams {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ksize == 0 || self.ksize % 2 == 0 {
            return Err(format!("ksize must be odd and positive, got {}", self.ksize));
        }
        if !self.sigma.is_finite() {
            return Err("sigma must be finite".to_owned());
        }
        Ok(())
    }
}

/// Parameters of the `:sharpen` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter2DParams {
    /// Correlation kernel, row major.
    pub kernel: Vec<Vec<f32>>,
}

impl Default for Filter2DParams {
    fn default() -> Self {
        Self {
            kernel: vec![
                vec![0.0, -1.0, 0.0],
                vec![-1.0, 5.0, -1.0],
                vec![0.0, -1.0, 0.0],
            ],
        }
    }
}

impl Filter2DParams {
    pub fn validate(&self) -> std::result::Result<(), String> {
        let width = self.kernel.first().map_or(0, Vec::len);
        if width == 0 {
            return Err("kernel is empty".to_owned());
        }
        if self.kernel.iter().any(|row| row.len() != width) {
            return Err("kernel rows differ in length".to_owned());
        }
        if self.kernel.iter().flatten().any(|v| !v.is_finite()) {
            return Err("kernel holds a non-finite value".to_owned());
        }
        Ok(())
    }

    /// Kernel data flattened row by row with its width and height.
    pub fn flattened(&self) -> (Vec<f32>, u32, u32) {
        let height = self.kernel.len() as u32;
        let width = self.kernel.first().map_or(0, Vec::len) as u32;
        (self.kernel.concat(), width, height)
    }
}

fn default_scale() -> f32 {
    1.0
}

/// Parameters of the `:sobelX`, `:sobelY` and `:sobelXY` commands.
///
/// Keys the operator does not use (such as an output depth) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobelParams {
    /// Derivative order along x.
    pub dx: u32,
    /// Derivative order along y.
    pub dy: u32,
    /// Aperture, 1 or an odd number up to 31.
    pub ksize: u32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub delta: f32,
}

impl SobelParams {
    pub fn new(dx: u32, dy: u32, ksize: u32) -> Self {
        Self {
            dx,
            dy,
            ksize,
            scale: 1.0,
            delta: 0.0,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ksize == 0 || self.ksize % 2 == 0 || self.ksize > 31 {
            return Err(format!("ksize must be 1, 3, 5, ... 31, got {}", self.ksize));
        }
        if self.dx + self.dy == 0 {
            return Err("dx and dy cannot both be zero".to_owned());
        }
        let limit = self.ksize.max(3);
        if self.dx >= limit || self.dy >= limit {
            return Err(format!(
                "derivative order ({}, {}) too high for ksize {}",
                self.dx, self.dy, self.ksize
            ));
        }
        if !self.scale.is_finite() || !self.delta.is_finite() {
            return Err("scale and delta must be finite".to_owned());
        }
        Ok(())
    }
}

/// Parameters of the `:canny` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannyParams {
    pub lower_threshold: f32,
    pub upper_threshold: f32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            lower_threshold: 100.0,
            upper_threshold: 200.0,
        }
    }
}

impl CannyParams {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.lower_threshold >= 0.0) {
            return Err("lower_threshold must be non-negative".to_owned());
        }
        if !(self.upper_threshold >= self.lower_threshold) {
            return Err(format!(
                "upper_threshold {} is below lower_threshold {}",
                self.upper_threshold, self.lower_threshold
            ));
        }
        Ok(())
    }
}

/// Parameters of the `:circle` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoughCirclesParams {
    /// Inverse accumulator resolution: 1 votes per pixel, 2 per 2x2 block.
    pub dp: f32,
    /// Upper Canny threshold. The lower one is half of it.
    pub param1: f32,
    /// Minimum votes for a centre and minimum edge support for a radius.
    pub param2: f32,
    #[serde(rename = "minRadius", default)]
    pub min_radius: u32,
    /// Zero means half the smaller image side.
    #[serde(rename = "maxRadius", default)]
    pub max_radius: u32,
}

impl Default for HoughCirclesParams {
    fn default() -> Self {
        Self {
            dp: 1.0,
            param1: 100.0,
            param2: 30.0,
            min_radius: 1,
            max_radius: 0,
        }
    }
}

impl HoughCirclesParams {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.dp >= 1.0) || !self.dp.is_finite() {
            return Err(format!("dp must be at least 1, got {}", self.dp));
        }
        if !(self.param1 > 0.0) {
            return Err("param1 must be positive".to_owned());
        }
        if !(self.param2 > 0.0) {
            return Err("param2 must be positive".to_owned());
        }
        if self.max_radius != 0 && self.max_radius < self.min_radius {
            return Err(format!(
                "maxRadius {} is below minRadius {}",
                self.max_radius, self.min_radius
            ));
        }
        Ok(())
    }
}

/// The parameter set, keyed by operator name.
///
/// Every entry is optional; a command whose entry is absent fails with
/// [`DispatchError::MissingOperatorConfiguration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcParameters {
    #[serde(rename = "GaussianBlur", default, skip_serializing_if = "Option::is_none")]
    pub gaussian_blur: Option<GaussianBlurParams>,
    #[serde(rename = "Filter2D", default, skip_serializing_if = "Option::is_none")]
    pub filter_2d: Option<Filter2DParams>,
    #[serde(rename = "SobelX", default, skip_serializing_if = "Option::is_none")]
    pub sobel_x: Option<SobelParams>,
    #[serde(rename = "SobelY", default, skip_serializing_if = "Option::is_none")]
    pub sobel_y: Option<SobelParams>,
    #[serde(rename = "SobelXY", default, skip_serializing_if = "Option::is_none")]
    pub sobel_xy: Option<SobelParams>,
    #[serde(rename = "Canny", default, skip_serializing_if = "Option::is_none")]
    pub canny: Option<CannyParams>,
    #[serde(rename = "HoughCircles", default, skip_serializing_if = "Option::is_none")]
    pub hough_circles: Option<HoughCirclesParams>,
}

impl Default for ProcParameters {
    fn default() -> Self {
        Self {
            gaussian_blur: Some(GaussianBlurParams::default()),
            filter_2d: Some(Filter2DParams::default()),
            sobel_x: Some(SobelParams::new(1, 0, 3)),
            sobel_y: Some(SobelParams::new(0, 1, 3)),
            sobel_xy: Some(SobelParams::new(1, 1, 3)),
            canny: Some(CannyParams::default()),
            hough_circles: Some(HoughCirclesParams::default()),
        }
    }
}

fn entry<T>(value: &Option<T>, key: OperatorKey) -> Result<&T> {
    value
        .as_ref()
        .ok_or(DispatchError::MissingOperatorConfiguration(key))
}

impl ProcParameters {
    /// A parameter set without any entry.
    pub fn empty() -> Self {
        Self {
            gaussian_blur: None,
            filter_2d: None,
            sobel_x: None,
            sobel_y: None,
            sobel_xy: None,
            canny: None,
            hough_circles: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let params = serde_json::from_reader(BufReader::new(file))?;
        debug!("loaded processing parameters from {}", path.display());
        Ok(params)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Writes the default parameter set to `path` unless a file already exists
    /// there. Returns whether it wrote.
    pub fn create_default(path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(false);
        }
        Self::default().save(path)?;
        info!("wrote default processing parameters to {}", path.display());
        Ok(true)
    }

    pub fn contains(&self, key: OperatorKey) -> bool {
        match key {
            OperatorKey::GaussianBlur => self.gaussian_blur.is_some(),
            OperatorKey::Filter2D => self.filter_2d.is_some(),
            OperatorKey::SobelX => self.sobel_x.is_some(),
            OperatorKey::SobelY => self.sobel_y.is_some(),
            OperatorKey::SobelXY => self.sobel_xy.is_some(),
            OperatorKey::Canny => self.canny.is_some(),
            OperatorKey::HoughCircles => self.hough_circles.is_some(),
        }
    }

    /// Fails with [`DispatchError::MissingOperatorConfiguration`] unless the
    /// entry for `key` is present.
    pub fn require(&self, key: OperatorKey) -> Result<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(DispatchError::MissingOperatorConfiguration(key))
        }
    }

    pub fn get_gaussian_blur(&self) -> Result<&GaussianBlurParams> {
        entry(&self.gaussian_blur, OperatorKey::GaussianBlur)
    }

    pub fn get_filter_2d(&self) -> Result<&Filter2DParams> {
        entry(&self.filter_2d, OperatorKey::Filter2D)
    }

    /// The entry of one of the three Sobel keys.
    pub fn get_sobel(&self, key: OperatorKey) -> Result<&SobelParams> {
        match key {
            OperatorKey::SobelX => entry(&self.sobel_x, key),
            OperatorKey::SobelY => entry(&self.sobel_y, key),
            OperatorKey::SobelXY => entry(&self.sobel_xy, key),
            _ => Err(DispatchError::MissingOperatorConfiguration(key)),
        }
    }

    pub fn get_canny(&self) -> Result<&CannyParams> {
        entry(&self.canny, OperatorKey::Canny)
    }

    pub fn get_hough_circles(&self) -> Result<&HoughCirclesParams> {
        entry(&self.hough_circles, OperatorKey::HoughCircles)
    }
}
