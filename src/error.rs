use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by study construction and report writing.
///
/// Contract violations in the arithmetic layer (negative floats, decrementing
/// zero, out-of-range magnitudes) are bugs in the caller and panic instead;
/// see the `# Panics` sections on the respective operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("precision must be in [4..18] range, got {0}")]
    InvalidPrecision(u32),
}
