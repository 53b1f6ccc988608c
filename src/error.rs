use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("cue block {block} has a timing line but no image reference")]
    MissingImage { block: usize },
    #[error("cue block {block} has a malformed #xywh region: '{reference}'")]
    MalformedRegion { block: usize, reference: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
