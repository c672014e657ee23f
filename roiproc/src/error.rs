use crate::OperatorKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// A command needs parameters that the parameter set does not contain.
    #[error("no parameters configured for operator `{0}`")]
    MissingOperatorConfiguration(OperatorKey),
    /// The configured parameters cannot be applied by the operator.
    #[error("invalid `{operator}` parameters: {reason}")]
    InvalidParameter {
        operator: OperatorKey,
        reason: String,
    },
    #[error("region of interest is empty")]
    EmptyRoi,
    #[error("region of interest ({x0}, {y0})-({x1}, {y1}) exceeds the {width}x{height} frame")]
    RoiOutOfBounds {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
