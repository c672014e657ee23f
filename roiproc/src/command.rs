//! The textual command vocabulary and the operators behind it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Name of an entry in the parameter set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorKey {
    GaussianBlur,
    Filter2D,
    SobelX,
    SobelY,
    SobelXY,
    Canny,
    HoughCircles,
}

impl OperatorKey {
    pub const ALL: [OperatorKey; 7] = [
        OperatorKey::GaussianBlur,
        OperatorKey::Filter2D,
        OperatorKey::SobelX,
        OperatorKey::SobelY,
        OperatorKey::SobelXY,
        OperatorKey::Canny,
        OperatorKey::HoughCircles,
    ];

    /// The key used in the persisted parameter document.
    pub fn name(self) -> &'static str {
        match self {
            OperatorKey::GaussianBlur => "GaussianBlur",
            OperatorKey::Filter2D => "Filter2D",
            OperatorKey::SobelX => "SobelX",
            OperatorKey::SobelY => "SobelY",
            OperatorKey::SobelXY => "SobelXY",
            OperatorKey::Canny => "Canny",
            OperatorKey::HoughCircles => "HoughCircles",
        }
    }
}

impl fmt::Display for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which directional gradient a Sobel command asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SobelAxis {
    /// Derivative along x.
    X,
    /// Derivative along y.
    Y,
    /// Gradient magnitude combining both axes.
    XY,
}

impl SobelAxis {
    pub fn config_key(self) -> OperatorKey {
        match self {
            SobelAxis::X => OperatorKey::SobelX,
            SobelAxis::Y => OperatorKey::SobelY,
            SobelAxis::XY => OperatorKey::SobelXY,
        }
    }
}

/// An image operator a processing command applies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Grayscale,
    Blur,
    Sharpen,
    Sobel(SobelAxis),
    Canny,
    Circles,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Grayscale,
        Operator::Blur,
        Operator::Sharpen,
        Operator::Sobel(SobelAxis::X),
        Operator::Sobel(SobelAxis::Y),
        Operator::Sobel(SobelAxis::XY),
        Operator::Canny,
        Operator::Circles,
    ];

    /// The parameter set entry the operator reads, if it takes parameters.
    pub fn config_key(self) -> Option<OperatorKey> {
        match self {
            Operator::Grayscale => None,
            Operator::Blur => Some(OperatorKey::GaussianBlur),
            Operator::Sharpen => Some(OperatorKey::Filter2D),
            Operator::Sobel(axis) => Some(axis.config_key()),
            Operator::Canny => Some(OperatorKey::Canny),
            Operator::Circles => Some(OperatorKey::HoughCircles),
        }
    }

    /// Whether the operator output replaces the region of interest.
    ///
    /// Operators that do not composite draw their result straight onto the
    /// full frame instead.
    pub fn composites_via_roi(self) -> bool {
        !matches!(self, Operator::Circles)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Grayscale => "Grayscale",
            Operator::Blur => "GaussianBlur",
            Operator::Sharpen => "Filter2D",
            Operator::Sobel(SobelAxis::X) => "SobelX",
            Operator::Sobel(SobelAxis::Y) => "SobelY",
            Operator::Sobel(SobelAxis::XY) => "SobelXY",
            Operator::Canny => "Canny",
            Operator::Circles => "HoughCircles",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single user command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Apply an operator to the region of interest (or the whole frame).
    Process(Operator),
    /// `:r`, restore the frame as it was loaded.
    Rollback,
    /// `:d`, drop the region of interest.
    DeleteRoi,
    /// `:h`, list the commands.
    Help,
    /// `:q`, stop the player.
    Quit,
    /// Anything else. Never an error, it just does nothing.
    Unknown(String),
}

impl Command {
    pub fn token(&self) -> &str {
        match self {
            Command::Process(Operator::Grayscale) => ":gray",
            Command::Process(Operator::Blur) => ":blur",
            Command::Process(Operator::Sharpen) => ":sharpen",
            Command::Process(Operator::Sobel(SobelAxis::X)) => ":sobelX",
            Command::Process(Operator::Sobel(SobelAxis::Y)) => ":sobelY",
            Command::Process(Operator::Sobel(SobelAxis::XY)) => ":sobelXY",
            Command::Process(Operator::Canny) => ":canny",
            Command::Process(Operator::Circles) => ":circle",
            Command::Rollback => ":r",
            Command::DeleteRoi => ":d",
            Command::Help => ":h",
            Command::Quit => ":q",
            Command::Unknown(token) => token,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Command::Process(operator) => Some(*operator),
            _ => None,
        }
    }
}

impl FromStr for Command {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        let token = s.trim();
        Ok(match token {
            ":gray" => Command::Process(Operator::Grayscale),
            ":blur" => Command::Process(Operator::Blur),
            ":sharpen" => Command::Process(Operator::Sharpen),
            ":sobelX" => Command::Process(Operator::Sobel(SobelAxis::X)),
            ":sobelY" => Command::Process(Operator::Sobel(SobelAxis::Y)),
            ":sobelXY" => Command::Process(Operator::Sobel(SobelAxis::XY)),
            ":canny" => Command::Process(Operator::Canny),
            ":circle" => Command::Process(Operator::Circles),
            ":r" => Command::Rollback,
            ":d" => Command::DeleteRoi,
            ":h" => Command::Help,
            ":q" => Command::Quit,
            other => Command::Unknown(other.to_owned()),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The listing shown for `:h`.
pub fn help_lines() -> Vec<String> {
    [
        (":d", "Delete the ROI"),
        (":q", "Exit the player"),
        (":gray", "Image to grayscale"),
        (":blur", "Gaussian blur"),
        (":sharpen", "Sharpen with the configured kernel"),
        (":sobelX", "Sobel edges along x"),
        (":sobelY", "Sobel edges along y"),
        (":sobelXY", "Sobel gradient magnitude"),
        (":canny", "Canny edge detection"),
        (":circle", "Hough circle detection"),
        (":r", "Rollback to the original frame"),
    ]
    .iter()
    .map(|(token, text)| format!("{:<9}:{}", token, text))
    .collect()
}
