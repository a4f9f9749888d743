/// Error types for the arranger
///
/// Every fallible operation returns `Result<T>`. Errors are terminal to
/// the single operation that raised them; the caller reports them on the
/// status line and leaves the previous state intact.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// A length string that is not bare inches, feet, or feet+inches
    #[error("'{0}' is not a valid length. Use 120, 10', 5'6\" or 66\"")]
    InvalidLength(String),

    #[error("Width and height must be positive lengths")]
    InvalidDimensions,

    #[error("'{0}' is not a valid colour. Use #RRGGBB")]
    InvalidColor(String),

    #[error("Opacity must be between 0 and 1")]
    InvalidOpacity,

    #[error("Item name cannot be empty")]
    EmptyName,

    #[error("Please set the scale before placing furniture")]
    MissingScale,

    #[error("Please upload a floor plan image first")]
    MissingImage,

    /// Scale line has zero length or no second point yet
    #[error("Draw a scale line with two distinct points first")]
    MissingScaleLine,

    #[error("This layout belongs to a different floor plan ({found}), current image is {expected}")]
    ImageMismatch { expected: String, found: String },

    #[error("No furniture item with id '{0}'")]
    UnknownItem(String),

    #[error("Malformed layout file: {0}")]
    MalformedLayout(#[from] serde_json::Error),

    #[error("Invalid layout file: {0}")]
    InvalidLayout(String),

    #[error("Catalog error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
