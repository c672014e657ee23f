//! Region-of-interest image processing driven by textual commands.
//!
//! A [`Session`] holds the current frame, the [`Selection`] and the
//! [`ProcParameters`]. Each [`Command`] goes through [`process`], which applies
//! the operator to the active [`Roi`] (or the full frame) and composites the
//! result back.

mod command;
mod dispatch;
mod error;
pub mod hough;
pub mod kernels;
pub mod operators;
mod params;
mod roi;
mod session;

pub use command::{help_lines, Command, Operator, OperatorKey, SobelAxis};
pub use dispatch::{process, FrameContext};
pub use error::{DispatchError, Result};
pub use hough::Circle;
pub use params::{
    CannyParams, Filter2DParams, GaussianBlurParams, HoughCirclesParams, ProcParameters,
    SobelParams,
};
pub use roi::{Roi, Selection};
pub use session::Session;
