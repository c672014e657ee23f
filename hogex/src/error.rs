use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The image layout cannot be reduced to a single intensity channel.
    #[error("unsupported input image kind: {kind}")]
    InvalidInputKind { kind: &'static str },
    #[error("image of {width}x{height} is incompatible with the descriptor layout: {reason}")]
    IncompatibleImage {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("invalid extractor configuration: {0}")]
    InvalidConfig(String),
    #[error("descriptor {index} has {found} values, expected {expected}")]
    DescriptorLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("{images} images were given with {labels} labels")]
    LabelMismatch { images: usize, labels: usize },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
